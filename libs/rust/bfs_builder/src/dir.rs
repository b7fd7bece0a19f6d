use std::os::unix::ffi::OsStrExt;

use bfs_types::dirent::DirEntry16;
use bfs_types::dirent::EntryFlags;
use bfs_types::dirent::Placement;
use bfs_types::dirent::SPECIAL_ENTRIES;
use bfs_types::header::WordSize;
use log::debug;

use crate::error::Error;
use crate::error::Result;
use crate::file::pack_file;
use crate::host::HostDir;
use crate::image::Image;
use crate::image::Slot;

/// Packs the directory `dir` with its listing at `start_sector`, followed by
/// the contents of its children in listing order.
///
/// `parent` is the parent's `.` entry, used to fill in this directory's
/// `..`. `parent_slot` is the entry naming this directory in the parent's
/// listing; it is patched with this directory's placement. Both are `None`
/// for the root, whose `..` points at itself.
///
/// Returns the number of sectors used by the directory and everything
/// beneath it.
pub fn pack_directory<D: HostDir>(
    image: &mut Image,
    start_sector: u32,
    dir: &mut D,
    parent: Option<Slot>,
    parent_slot: Option<Slot>,
) -> Result<u32> {
    match image.word_size() {
        WordSize::Bits16 => pack_directory16(image, start_sector, dir, parent, parent_slot),
        WordSize::Bits32 => Err(Error::UnsupportedWordSize(WordSize::Bits32 as u8)),
    }
}

fn pack_directory16<D: HostDir>(
    image: &mut Image,
    start_sector: u32,
    dir: &mut D,
    parent: Option<Slot>,
    parent_slot: Option<Slot>,
) -> Result<u32> {
    let sector_size = image.sector_size();
    let budget = image.addressable_sectors() as usize;

    // Fails if the listing's `index`-th entry would end past the last sector.
    let check_room = |index: usize| {
        let last_byte = (index + 1) * DirEntry16::SIZE - 1;
        let sector = start_sector as usize + last_byte / sector_size;
        if sector < budget {
            Ok(())
        } else {
            Err(Error::NoSpace)
        }
    };

    check_room(SPECIAL_ENTRIES - 1)?;
    let start = image.slot(start_sector, 0);

    let mut names = Vec::new();
    for name in dir.children()? {
        if name == "." || name == ".." {
            continue;
        }

        let index = SPECIAL_ENTRIES + names.len();
        let entry = DirEntry16::new(name.as_bytes(), Placement::EMPTY)
            .ok_or_else(|| Error::NameTooLong(name.to_string_lossy().into_owned()))?;
        check_room(index)?;
        image.write_entry(start.nth(index), &entry);
        names.push(name);
    }

    let listing_bytes = (SPECIAL_ENTRIES + names.len()) * DirEntry16::SIZE;
    let n_sectors = listing_bytes.div_ceil(sector_size);
    let bytes_rem = listing_bytes % sector_size;
    let own = Placement {
        start: u16::try_from(start_sector).map_err(|_| Error::NoSpace)?,
        sectors: u16::try_from(n_sectors).map_err(|_| Error::NoSpace)?,
        bytes_rem: u16::try_from(bytes_rem).map_err(|_| Error::NoSpace)?,
        flags: EntryFlags::DIRECTORY,
    };

    image.write_entry(start, &DirEntry16::dot(own));
    if let Some(slot) = parent_slot {
        image.set_placement(slot, &own);
    }

    // The root is its own parent.
    let up = match parent {
        Some(slot) => image.placement(slot),
        None => own,
    };
    image.write_entry(start.nth(1), &DirEntry16::dot_dot(up));

    debug!(
        "packed directory listing at sector {} ({} entries, {} sectors)",
        start_sector,
        names.len(),
        n_sectors
    );

    let mut sector = start_sector + n_sectors as u32;
    for (i, name) in names.iter().enumerate() {
        let slot = start.nth(SPECIAL_ENTRIES + i);
        let advance_by = if dir.is_dir(name) {
            let mut child = dir.open_dir(name)?;
            pack_directory16(image, sector, &mut child, Some(start), Some(slot))?
        } else {
            let mut file = dir.open_file(name)?;
            pack_file(image, sector, &mut file, slot)?
        };

        sector += advance_by;
    }

    Ok(sector - start_sector)
}
