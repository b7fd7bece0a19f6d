use std::io;
use std::io::ErrorKind;
use std::io::Read;

use bfs_types::dirent::EntryFlags;
use bfs_types::dirent::Placement;
use log::debug;

use crate::error::Error;
use crate::error::Result;
use crate::image::Image;
use crate::image::Slot;

/// Reads until `buf` is full or the stream ends.
fn read_up_to(src: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match src.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        }
    }

    Ok(filled)
}

fn at_eof(src: &mut impl Read) -> io::Result<bool> {
    let mut probe = [0u8; 1];
    Ok(read_up_to(src, &mut probe)? == 0)
}

/// Copies `src` into consecutive sectors starting at `start_sector` and
/// records where it went in `slot`. Returns the number of sectors used.
///
/// An empty file still takes one sector. The slot is only updated once the
/// whole file has been copied.
pub fn pack_file<R: Read>(
    image: &mut Image,
    start_sector: u32,
    src: &mut R,
    slot: Slot,
) -> Result<u32> {
    let sector_size = image.sector_size();
    let budget = image.addressable_sectors();

    let mut sector = start_sector;
    let bytes_rem = loop {
        if sector >= budget {
            // Out of sectors. Fine only if the previous sector was full and
            // was also the last one.
            if sector > start_sector && at_eof(src)? {
                break 0;
            }

            return Err(Error::NoSpace);
        }

        let n = read_up_to(src, image.sector_mut(sector))?;
        if n == 0 && sector > start_sector {
            // The previous sector ended exactly on the end of the file.
            break 0;
        }

        sector += 1;
        if n < sector_size {
            break n;
        }
    };

    let n_sectors = sector - start_sector;
    let placement = Placement {
        start: u16::try_from(start_sector).map_err(|_| Error::NoSpace)?,
        sectors: u16::try_from(n_sectors).map_err(|_| Error::NoSpace)?,
        bytes_rem: u16::try_from(bytes_rem).map_err(|_| Error::NoSpace)?,
        flags: EntryFlags::empty(),
    };

    image.set_placement(slot, &placement);
    debug!(
        "packed file at sector {} ({} sectors, {} bytes in last)",
        start_sector, n_sectors, bytes_rem
    );

    Ok(n_sectors)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bfs_types::dirent::DirEntry16;

    use super::*;
    use crate::host::mem::BrokenReader;

    fn floppy() -> Image {
        Image::create(2880 * 512, 512, 16).unwrap()
    }

    fn pack(image: &mut Image, start: u32, data: &[u8]) -> (Result<u32>, Placement) {
        let slot = image.slot(1, 2);
        image.write_entry(slot, &DirEntry16::new(b"file", Placement::EMPTY).unwrap());
        let result = pack_file(image, start, &mut Cursor::new(data), slot);
        (result, image.placement(slot))
    }

    #[test]
    fn empty_file_takes_one_sector() {
        let mut image = floppy();
        let (result, placement) = pack(&mut image, 10, &[]);
        assert_eq!(result.unwrap(), 1);
        assert_eq!(placement.start, 10);
        assert_eq!(placement.sectors, 1);
        assert_eq!(placement.bytes_rem, 0);
        assert!(!placement.is_dir());
    }

    #[test]
    fn partial_last_sector() {
        let mut image = floppy();
        let data: Vec<u8> = (0..600).map(|i| i as u8).collect();
        let (result, placement) = pack(&mut image, 5, &data);
        assert_eq!(result.unwrap(), 2);
        assert_eq!(placement.sectors, 2);
        assert_eq!(placement.bytes_rem, 88);
        assert_eq!(placement.byte_len(512), 600);
        assert_eq!(&image.as_bytes()[5 * 512..5 * 512 + 600], &data[..]);
    }

    #[test]
    fn exact_multiple_has_no_extra_sector() {
        let mut image = floppy();
        let data = vec![0x5a; 1024];
        let (result, placement) = pack(&mut image, 5, &data);
        assert_eq!(result.unwrap(), 2);
        assert_eq!(placement.sectors, 2);
        assert_eq!(placement.bytes_rem, 0);
        assert_eq!(placement.byte_len(512), 1024);
        assert!(image.sector(7).iter().all(|&b| b == 0));
    }

    #[test]
    fn fills_image_exactly() {
        let mut image = Image::create(8 * 512, 512, 16).unwrap();
        let (result, placement) = pack(&mut image, 6, &[1; 1024]);
        assert_eq!(result.unwrap(), 2);
        assert_eq!(placement.sectors, 2);
        assert_eq!(placement.bytes_rem, 0);
    }

    #[test]
    fn no_space() {
        let mut image = Image::create(8 * 512, 512, 16).unwrap();
        let (result, placement) = pack(&mut image, 6, &[1; 1025]);
        assert!(matches!(result, Err(Error::NoSpace)));
        assert_eq!(placement, Placement::EMPTY);
    }

    #[test]
    fn start_past_end() {
        let mut image = Image::create(8 * 512, 512, 16).unwrap();
        let (result, _) = pack(&mut image, 8, &[]);
        assert!(matches!(result, Err(Error::NoSpace)));
    }

    #[test]
    fn read_error() {
        let mut image = floppy();
        let slot = image.slot(1, 2);
        let result = pack_file(&mut image, 5, &mut BrokenReader, slot);
        assert!(matches!(result, Err(Error::FileIo(_))));
        assert_eq!(image.placement(slot), Placement::EMPTY);
    }
}
