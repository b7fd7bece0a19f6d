use bitflags::bitflags;
use bytes::Buf;
use bytes::BufMut;

/// Width of the name field in a 16-bit entry, including the terminator.
pub const NAME_LEN_MAX: usize = 24;
pub const DIR_ENTRY16_SIZE: usize = NAME_LEN_MAX + 4 * size_of::<u16>();

pub const DIR_ENTRY32_NAME_LEN_MAX: usize = 52;
pub const DIR_ENTRY32_SIZE: usize =
    DIR_ENTRY32_NAME_LEN_MAX + 2 * size_of::<u32>() + 2 * size_of::<u16>();

/// The `.` and `..` entries at the head of every listing.
pub const SPECIAL_ENTRIES: usize = 2;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EntryFlags: u16 {
        const DIRECTORY = 1 << 0;
        const HARDLINK = 1 << 1;
        const SYMLINK = 1 << 2;
    }
}

/// Where an entry's contents live and how much of the last sector is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub start: u16,
    pub sectors: u16,
    /// Meaningful bytes in the last sector. 0 means the sector is full.
    pub bytes_rem: u16,
    pub flags: EntryFlags,
}

impl Placement {
    /// Not placed yet: zero sectors.
    pub const EMPTY: Placement = Placement {
        start: 0,
        sectors: 0,
        bytes_rem: 0,
        flags: EntryFlags::empty(),
    };

    pub fn is_dir(&self) -> bool {
        self.flags.contains(EntryFlags::DIRECTORY)
    }

    /// The content length in bytes.
    pub fn byte_len(&self, sector_size: usize) -> usize {
        let sectors = self.sectors as usize;
        match (sectors, self.bytes_rem) {
            (0, _) => 0,
            (n, 0) => n * sector_size,
            (n, rem) => (n - 1) * sector_size + rem as usize,
        }
    }
}

/// A directory entry in the 16-bit record shape:
///
/// ```text
/// [0..24]  name, NUL padded
/// [24..26] start sector
/// [26..28] number of sectors
/// [28..30] bytes used in the last sector
/// [30..32] flags
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry16 {
    name: [u8; NAME_LEN_MAX],
    pub placement: Placement,
}

impl DirEntry16 {
    pub const SIZE: usize = DIR_ENTRY16_SIZE;

    /// Returns `None` if `name` does not fit with its terminator.
    pub fn new(name: &[u8], placement: Placement) -> Option<DirEntry16> {
        // Subtract 1 for the null terminator.
        if name.len() > NAME_LEN_MAX - 1 {
            return None;
        }

        let mut buf = [0; NAME_LEN_MAX];
        buf[..name.len()].copy_from_slice(name);
        Some(DirEntry16 {
            name: buf,
            placement,
        })
    }

    /// The `.` entry heading every listing.
    pub fn dot(placement: Placement) -> DirEntry16 {
        let mut name = [0; NAME_LEN_MAX];
        name[0] = b'.';
        DirEntry16 { name, placement }
    }

    /// The `..` entry, second in every listing.
    pub fn dot_dot(placement: Placement) -> DirEntry16 {
        let mut name = [0; NAME_LEN_MAX];
        name[..2].copy_from_slice(b"..");
        DirEntry16 { name, placement }
    }

    pub fn name(&self) -> &[u8] {
        let len = self
            .name
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(NAME_LEN_MAX);
        &self.name[..len]
    }

    pub fn encode(&self, buf: &mut [u8]) {
        let mut buf = &mut buf[..Self::SIZE];
        buf.put_slice(&self.name);
        encode_placement(&mut buf, &self.placement);
    }

    pub fn decode(buf: &[u8]) -> DirEntry16 {
        let mut buf = &buf[..Self::SIZE];
        let mut name = [0; NAME_LEN_MAX];
        buf.copy_to_slice(&mut name);
        DirEntry16 {
            name,
            placement: decode_placement(&mut buf),
        }
    }
}

/// Overwrites only the placement fields of the 16-bit entry in `buf`,
/// leaving its name alone.
pub fn patch_placement16(buf: &mut [u8], placement: &Placement) {
    let mut buf = &mut buf[NAME_LEN_MAX..DIR_ENTRY16_SIZE];
    encode_placement(&mut buf, placement);
}

fn encode_placement(buf: &mut impl BufMut, placement: &Placement) {
    buf.put_u16_le(placement.start);
    buf.put_u16_le(placement.sectors);
    buf.put_u16_le(placement.bytes_rem);
    buf.put_u16_le(placement.flags.bits());
}

fn decode_placement(buf: &mut impl Buf) -> Placement {
    Placement {
        start: buf.get_u16_le(),
        sectors: buf.get_u16_le(),
        bytes_rem: buf.get_u16_le(),
        flags: EntryFlags::from_bits_retain(buf.get_u16_le()),
    }
}
