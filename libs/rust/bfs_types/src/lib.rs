//! On-disk format of the Bootdisk File System (BFS).
//!
//! A BFS image is a flat array of fixed-size sectors. Sector 0 doubles as a
//! legacy boot sector: the [`header::Header`] sits at byte 500 so that its
//! last field is the `0xaa55` boot signature at byte 510. Everything else is
//! either a directory listing (an array of directory entries) or raw file
//! contents.
#![cfg_attr(not(test), no_std)]

pub mod dirent;
pub mod error;
pub mod header;
