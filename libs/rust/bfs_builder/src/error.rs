use std::io;

use bfs_types::error::ErrorCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("image size {size} is not divisible by sector size {sector_size}")]
    NotDivisible { size: usize, sector_size: usize },
    #[error("unsupported word size: {0}")]
    UnsupportedWordSize(u8),
    #[error("image size {0} is out of range")]
    ImageSize(usize),
    #[error("file name is too long: {0}")]
    NameTooLong(String),
    #[error("no space left on disk")]
    NoSpace,
    #[error("file I/O error: {0}")]
    FileIo(#[from] io::Error),
}

impl Error {
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::NotDivisible { .. } => ErrorCode::NotDivisible,
            Error::UnsupportedWordSize(_) => ErrorCode::WordSize,
            Error::ImageSize(_) => ErrorCode::ImageSize,
            Error::NameTooLong(_) => ErrorCode::LongName,
            Error::NoSpace => ErrorCode::NoSpace,
            Error::FileIo(_) => ErrorCode::FileIo,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
