//! Builds Bootdisk File System (BFS) images out of a host directory tree.
//!
//! The whole image lives in memory. [`pack_root`] walks the source tree
//! depth-first and lays out every directory listing and file right after
//! the previous one, so a single pass decides the final placement of
//! everything.
//!
//! Unix only: file names are stored as their raw OS bytes.

pub mod dir;
pub mod error;
pub mod file;
pub mod host;
pub mod image;

pub use dir::pack_directory;
pub use error::Error;
pub use error::Result;
pub use file::pack_file;
pub use host::FsDir;
pub use host::HostDir;
pub use image::Image;
pub use image::Slot;

/// Packs `root` as the root directory, right after the header. Returns the
/// number of sectors used by the tree.
pub fn pack_root<D: HostDir>(image: &mut Image, root: &mut D) -> Result<u32> {
    let start_sector = image.first_free_sector();
    pack_directory(image, start_sector, root, None, None)
}
