use bytes::Buf;
use bytes::BufMut;

use crate::dirent::DIR_ENTRY16_SIZE;
use crate::dirent::DIR_ENTRY32_SIZE;

pub const BFS_MAGIC: [u8; 3] = *b"BFS";

/// Where the header lives inside sector 0.
pub const HEADER_OFFSET: usize = 500;
pub const HEADER_SIZE: usize = 12;

/// The legacy PC boot signature, stored little-endian (`55 aa`).
pub const BOOT_SIGNATURE: u16 = 0xaa55;
pub const BOOT_SIGNATURE_OFFSET: usize = 510;

/// Bytes at the start of the image that belong to the boot sector / header.
pub const RESERVED_BYTES: usize = HEADER_OFFSET + HEADER_SIZE;

// The header's trailing field must be the boot signature.
const _: () = assert!(RESERVED_BYTES - size_of::<u16>() == BOOT_SIGNATURE_OFFSET);

/// Selects the directory entry record shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WordSize {
    Bits16 = 16,
    /// Declared by the format, but no record encoder exists for it yet.
    Bits32 = 32,
}

impl WordSize {
    pub const fn entry_size(self) -> usize {
        match self {
            WordSize::Bits16 => DIR_ENTRY16_SIZE,
            WordSize::Bits32 => DIR_ENTRY32_SIZE,
        }
    }

    /// The number of distinct sector indices a directory entry can record.
    pub const fn addressable_sectors(self) -> u64 {
        match self {
            WordSize::Bits16 => 1 << 16,
            WordSize::Bits32 => 1 << 32,
        }
    }
}

impl TryFrom<u8> for WordSize {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            16 => Ok(WordSize::Bits16),
            32 => Ok(WordSize::Bits32),
            _ => Err(value),
        }
    }
}

/// The sector size in bytes. On disk it is a `u16` where 0 means 65536.
pub const fn sector_bytes(raw: u16) -> usize {
    if raw == 0 { 1 << 16 } else { raw as usize }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub word_size: WordSize,
    pub n_sectors: u32,
    /// Raw on-disk value. Use [`Header::sector_bytes`] for arithmetic.
    pub sector_size: u16,
}

impl Header {
    pub const fn sector_bytes(&self) -> usize {
        sector_bytes(self.sector_size)
    }

    /// Serializes the header into `buf`, which must be at least
    /// [`HEADER_SIZE`] bytes long.
    pub fn encode(&self, buf: &mut [u8]) {
        let mut buf = &mut buf[..HEADER_SIZE];
        buf.put_slice(&BFS_MAGIC);
        buf.put_u8(self.word_size as u8);
        buf.put_u32_le(self.n_sectors);
        buf.put_u16_le(self.sector_size);
        buf.put_u16_le(BOOT_SIGNATURE);
    }

    /// Parses a header previously written by [`Header::encode`]. Returns
    /// `None` if the magic, word size, or boot signature is wrong.
    pub fn decode(buf: &[u8]) -> Option<Header> {
        if buf.len() < HEADER_SIZE {
            return None;
        }

        let mut buf = &buf[..HEADER_SIZE];
        let mut magic = [0; 3];
        buf.copy_to_slice(&mut magic);
        if magic != BFS_MAGIC {
            return None;
        }

        let word_size = WordSize::try_from(buf.get_u8()).ok()?;
        let n_sectors = buf.get_u32_le();
        let sector_size = buf.get_u16_le();
        if buf.get_u16_le() != BOOT_SIGNATURE {
            return None;
        }

        Some(Header {
            word_size,
            n_sectors,
            sector_size,
        })
    }
}
