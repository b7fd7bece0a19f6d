//! Access to the host directory tree being packed.

use std::ffi::OsStr;
use std::ffi::OsString;
use std::fs;
use std::fs::File;
use std::io;
use std::io::Read;
use std::path::Path;
use std::path::PathBuf;

/// An open host directory.
///
/// Every lookup is relative to this directory, never to the process's
/// working directory.
pub trait HostDir: Sized {
    type File: Read;

    /// Child names in host iteration order.
    fn children(&mut self) -> io::Result<Vec<OsString>>;
    fn is_dir(&self, name: &OsStr) -> bool;
    fn open_dir(&self, name: &OsStr) -> io::Result<Self>;
    fn open_file(&self, name: &OsStr) -> io::Result<Self::File>;
}

/// A directory on the host filesystem.
#[derive(Debug)]
pub struct FsDir {
    path: PathBuf,
}

impl FsDir {
    pub fn open(path: impl Into<PathBuf>) -> io::Result<FsDir> {
        let path = path.into();
        if !fs::metadata(&path)?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", path.display()),
            ));
        }

        Ok(FsDir { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HostDir for FsDir {
    type File = File;

    fn children(&mut self) -> io::Result<Vec<OsString>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.path)? {
            names.push(entry?.file_name());
        }

        Ok(names)
    }

    fn is_dir(&self, name: &OsStr) -> bool {
        // Follows symlinks, so a link to a directory is packed as one.
        fs::metadata(self.path.join(name))
            .map(|meta| meta.is_dir())
            .unwrap_or(false)
    }

    fn open_dir(&self, name: &OsStr) -> io::Result<FsDir> {
        FsDir::open(self.path.join(name))
    }

    fn open_file(&self, name: &OsStr) -> io::Result<File> {
        File::open(self.path.join(name))
    }
}

#[cfg(test)]
pub(crate) mod mem {
    use std::io::Cursor;

    use super::*;

    #[derive(Debug, Clone)]
    enum Node {
        File(Vec<u8>),
        Dir(MemDir),
        /// A file whose reads fail.
        Broken,
    }

    /// An in-memory directory tree.
    #[derive(Debug, Clone, Default)]
    pub struct MemDir {
        children: Vec<(OsString, Node)>,
    }

    impl MemDir {
        pub fn new() -> MemDir {
            MemDir::default()
        }

        pub fn file(mut self, name: &str, data: impl Into<Vec<u8>>) -> MemDir {
            self.children.push((name.into(), Node::File(data.into())));
            self
        }

        pub fn dir(mut self, name: &str, dir: MemDir) -> MemDir {
            self.children.push((name.into(), Node::Dir(dir)));
            self
        }

        pub fn broken_file(mut self, name: &str) -> MemDir {
            self.children.push((name.into(), Node::Broken));
            self
        }

        fn lookup(&self, name: &OsStr) -> io::Result<&Node> {
            self.children
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, node)| node)
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
        }
    }

    pub struct BrokenReader;

    impl Read for BrokenReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("device error"))
        }
    }

    impl HostDir for MemDir {
        type File = Box<dyn Read>;

        fn children(&mut self) -> io::Result<Vec<OsString>> {
            Ok(self.children.iter().map(|(name, _)| name.clone()).collect())
        }

        fn is_dir(&self, name: &OsStr) -> bool {
            matches!(self.lookup(name), Ok(Node::Dir(_)))
        }

        fn open_dir(&self, name: &OsStr) -> io::Result<MemDir> {
            match self.lookup(name)? {
                Node::Dir(dir) => Ok(dir.clone()),
                _ => Err(io::Error::from(io::ErrorKind::NotADirectory)),
            }
        }

        fn open_file(&self, name: &OsStr) -> io::Result<Box<dyn Read>> {
            match self.lookup(name)? {
                Node::File(data) => Ok(Box::new(Cursor::new(data.clone()))),
                Node::Broken => Ok(Box::new(BrokenReader)),
                Node::Dir(_) => Err(io::Error::from(io::ErrorKind::IsADirectory)),
            }
        }
    }
}
