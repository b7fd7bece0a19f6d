use bfs_types::dirent::DirEntry16;
use bfs_types::dirent::Placement;
use bfs_types::dirent::patch_placement16;
use bfs_types::header::HEADER_OFFSET;
use bfs_types::header::Header;
use bfs_types::header::RESERVED_BYTES;
use bfs_types::header::WordSize;
use bfs_types::header::sector_bytes;

use crate::error::Error;
use crate::error::Result;

/// A directory entry slot, identified by its byte offset in the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot(usize);

impl Slot {
    pub fn offset(self) -> usize {
        self.0
    }

    /// The slot `index` records after this one.
    pub fn nth(self, index: usize) -> Slot {
        Slot(self.0 + index * DirEntry16::SIZE)
    }
}

/// An in-memory BFS image.
pub struct Image {
    buf: Vec<u8>,
    header: Header,
}

impl Image {
    /// Allocates a zeroed image of `size` bytes and writes the header.
    ///
    /// `sector_size` uses the on-disk encoding: 0 means 65536.
    pub fn create(size: usize, sector_size: u16, word_size: u8) -> Result<Image> {
        let sector_bytes = sector_bytes(sector_size);
        if size % sector_bytes != 0 {
            return Err(Error::NotDivisible {
                size,
                sector_size: sector_bytes,
            });
        }

        let word_size = WordSize::try_from(word_size).map_err(Error::UnsupportedWordSize)?;
        if size < RESERVED_BYTES {
            return Err(Error::ImageSize(size));
        }

        let n_sectors = u32::try_from(size / sector_bytes).map_err(|_| Error::ImageSize(size))?;
        let header = Header {
            word_size,
            n_sectors,
            sector_size,
        };

        let mut buf = vec![0; size];
        header.encode(&mut buf[HEADER_OFFSET..RESERVED_BYTES]);
        Ok(Image { buf, header })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn word_size(&self) -> WordSize {
        self.header.word_size
    }

    pub fn sector_size(&self) -> usize {
        self.header.sector_bytes()
    }

    pub fn n_sectors(&self) -> u32 {
        self.header.n_sectors
    }

    /// Sectors that packers may hand out: the image size, capped by what a
    /// directory entry of this word size can address.
    pub fn addressable_sectors(&self) -> u32 {
        let cap = self.header.word_size.addressable_sectors();
        (self.header.n_sectors as u64).min(cap) as u32
    }

    /// The first sector not overlapping the header.
    pub fn first_free_sector(&self) -> u32 {
        RESERVED_BYTES.div_ceil(self.sector_size()) as u32
    }

    pub fn sector_offset(&self, index: u32) -> usize {
        index as usize * self.sector_size()
    }

    pub fn sector(&self, index: u32) -> &[u8] {
        let offset = self.sector_offset(index);
        &self.buf[offset..offset + self.sector_size()]
    }

    pub fn sector_mut(&mut self, index: u32) -> &mut [u8] {
        let offset = self.sector_offset(index);
        let len = self.sector_size();
        &mut self.buf[offset..offset + len]
    }

    /// The `index`-th entry of the listing that starts at `sector`.
    pub fn slot(&self, sector: u32, index: usize) -> Slot {
        Slot(self.sector_offset(sector)).nth(index)
    }

    pub fn read_entry(&self, slot: Slot) -> DirEntry16 {
        DirEntry16::decode(&self.buf[slot.0..])
    }

    pub fn write_entry(&mut self, slot: Slot, entry: &DirEntry16) {
        entry.encode(&mut self.buf[slot.0..]);
    }

    pub fn placement(&self, slot: Slot) -> Placement {
        self.read_entry(slot).placement
    }

    pub fn set_placement(&mut self, slot: Slot, placement: &Placement) {
        patch_placement16(&mut self.buf[slot.0..], placement);
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }
}
