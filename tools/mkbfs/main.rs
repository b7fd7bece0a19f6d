use std::io::Write;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use bfs_builder::FsDir;
use bfs_builder::Image;
use bfs_types::error::ErrorCode;
use log::info;

#[macro_use]
mod print;

mod geometry;
mod logger;

use geometry::Geometry;

/// Packs `srcdir` into an image written to `outfile`.
fn run(geometry: &Geometry, srcdir: &Path, outfile: &Path) -> Result<()> {
    let mut image = Image::create(
        geometry.image_size(),
        geometry.sector_size,
        geometry.word_size,
    )
    .context("failed to create image")?;

    let mut srcdir = FsDir::open(srcdir)
        .map_err(bfs_builder::Error::from)
        .context("failed to open source directory")?;

    let used = bfs_builder::pack_root(&mut image, &mut srcdir)
        .with_context(|| format!("failed to pack {}", srcdir.path().display()))?;
    info!(
        "packed {} of {} sectors ({} bytes each)",
        used,
        image.n_sectors(),
        image.sector_size()
    );

    let outdir = match outfile.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmpfile =
        tempfile::NamedTempFile::new_in(outdir).context("failed to create temporary file")?;
    tmpfile
        .write_all(image.as_bytes())
        .context("failed to write image")?;
    tmpfile
        .persist(outfile)
        .with_context(|| format!("failed to persist {}", outfile.display()))?;

    info!("wrote {}", outfile.display());
    Ok(())
}

/// The exit status for `err`. Failures outside the packer are I/O errors.
fn exit_code(err: &anyhow::Error) -> ErrorCode {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<bfs_builder::Error>())
        .map(|err| err.code())
        .unwrap_or(ErrorCode::FileIo)
}

/// The one-line diagnostic for `err`: the code's message, then the details.
fn diagnostic(err: &anyhow::Error) -> String {
    format!("{} ({:#})", exit_code(err), err)
}

fn main() {
    logger::init();

    let geometry = Geometry::FLOPPY_1440K;
    if let Err(err) = run(&geometry, Path::new("."), Path::new(geometry.outfile)) {
        error!("{}", diagnostic(&err));
        std::process::exit(exit_code(&err) as i32);
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io;

    use bfs_types::dirent::DirEntry16;
    use bfs_types::header::HEADER_OFFSET;
    use bfs_types::header::Header;
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn writes_floppy_image() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("hello.txt"), b"hello").unwrap();
        let out = TempDir::new().unwrap();
        let outfile = out.path().join("floppy.img");

        run(&Geometry::FLOPPY_1440K, src.path(), &outfile).unwrap();

        let bytes = fs::read(&outfile).unwrap();
        assert_eq!(bytes.len(), Geometry::FLOPPY_1440K.image_size());
        let header = Header::decode(&bytes[HEADER_OFFSET..]).unwrap();
        assert_eq!(header.n_sectors, 2880);
        assert_eq!(header.sector_size, 512);

        let entry = DirEntry16::decode(&bytes[512 + 2 * DirEntry16::SIZE..]);
        assert_eq!(entry.name(), b"hello.txt");
        assert_eq!(entry.placement.start, 2);
        assert_eq!(entry.placement.bytes_rem, 5);
        assert_eq!(&bytes[1024..1029], b"hello");
    }

    #[test]
    fn full_image_is_not_written() {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("big"), vec![0xee; 4096]).unwrap();
        let out = TempDir::new().unwrap();
        let outfile = out.path().join("floppy.img");
        let geometry = Geometry {
            n_sectors: 4,
            ..Geometry::FLOPPY_1440K
        };

        let err = run(&geometry, src.path(), &outfile).unwrap_err();
        assert_eq!(exit_code(&err), ErrorCode::NoSpace);
        assert!(diagnostic(&err).starts_with("No space left on disk ("));
        assert!(!outfile.exists());
    }

    #[test]
    fn diagnostic_leads_with_code_message() {
        let err = anyhow::Error::new(bfs_builder::Error::NoSpace).context("failed to pack .");
        assert_eq!(
            diagnostic(&err),
            "No space left on disk (failed to pack .: no space left on disk)"
        );

        let err = anyhow::Error::new(io::Error::other("disk gone")).context("failed to write image");
        assert_eq!(
            diagnostic(&err),
            "File I/O error (failed to write image: disk gone)"
        );
    }

    #[test]
    fn exit_code_from_packer_error() {
        let err = anyhow::Error::new(bfs_builder::Error::NoSpace).context("failed to pack .");
        assert_eq!(exit_code(&err), ErrorCode::NoSpace);
        assert_eq!(exit_code(&err) as i32, -4);
    }

    #[test]
    fn exit_code_for_other_errors() {
        let err = anyhow::Error::new(io::Error::other("disk gone")).context("failed to write image");
        assert_eq!(exit_code(&err), ErrorCode::FileIo);
    }
}
