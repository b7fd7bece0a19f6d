use bfs_types::header::sector_bytes;

/// Shape of the image to build.
#[derive(Debug, Clone, Copy)]
pub struct Geometry {
    pub word_size: u8,
    pub n_sectors: u32,
    /// On-disk encoding: 0 means 65536.
    pub sector_size: u16,
    pub outfile: &'static str,
}

impl Geometry {
    /// A 1.44MB floppy.
    pub const FLOPPY_1440K: Geometry = Geometry {
        word_size: 16,
        n_sectors: 2880,
        sector_size: 512,
        outfile: "floppy.img",
    };

    pub fn image_size(&self) -> usize {
        self.n_sectors as usize * sector_bytes(self.sector_size)
    }
}
