//! File access for archive readers.
//!
//! [`ResourceStore`](crate::store::ResourceStore) never touches the file system directly; it
//! goes through a [`FileAccess`] implementation. [`DirectoryStorage`] reads a game directory
//! on disk, [`MemoryStorage`] serves files held in memory.

use std::fs::{self, File};
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::warn;

pub trait FileAccess {
    fn exists(&self, name: &str) -> bool;

    /// Size in bytes; `NotFound` when the file does not exist
    fn size(&self, name: &str) -> io::Result<usize>;

    /// Reads exactly `length` bytes at `offset`. A short file is `UnexpectedEof`.
    fn read(&self, name: &str, offset: usize, length: usize) -> io::Result<Vec<u8>>;

    fn read_all(&self, name: &str) -> io::Result<Vec<u8>> {
        let size = self.size(name)?;
        self.read(name, 0, size)
    }

    /// File names, sorted
    fn list(&self) -> io::Result<Vec<String>>;

    /// `blake3:<hex>` digest of a file's contents
    fn content_hash(&self, name: &str) -> io::Result<String> {
        let bytes = self.read_all(name)?;
        Ok(format!("blake3:{}", blake3::hash(&bytes).to_hex()))
    }

    /// Diagnostics for non-fatal anomalies
    fn log(&self, message: &str) {
        warn!("{}", message);
    }
}

fn not_found(name: &str) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("{}: no such file", name))
}

fn short_read(name: &str, offset: usize, length: usize, size: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!(
            "{}: read of {} bytes at {} runs past the end ({} bytes)",
            name, length, offset, size
        ),
    )
}

/// A game directory on disk. Names are resolved case-insensitively since archives
/// ship both as `LOGDIR` and `logdir`.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> DirectoryStorage {
        DirectoryStorage {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, name: &str) -> io::Result<PathBuf> {
        let exact = self.root.join(name);
        if exact.is_file() {
            return Ok(exact);
        }
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().eq_ignore_ascii_case(name)
                && entry.path().is_file()
            {
                return Ok(entry.path());
            }
        }
        Err(not_found(name))
    }
}

impl FileAccess for DirectoryStorage {
    fn exists(&self, name: &str) -> bool {
        self.resolve(name).is_ok()
    }

    fn size(&self, name: &str) -> io::Result<usize> {
        let path = self.resolve(name)?;
        Ok(fs::metadata(path)?.len() as usize)
    }

    fn read(&self, name: &str, offset: usize, length: usize) -> io::Result<Vec<u8>> {
        let path = self.resolve(name)?;
        let mut f = File::open(path)?;
        let size = f.metadata()?.len() as usize;
        if offset.checked_add(length).map_or(true, |end| end > size) {
            return Err(short_read(name, offset, length, size));
        }
        f.seek(SeekFrom::Start(offset as u64))?;
        let mut buf = vec![0u8; length];
        f.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn list(&self) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if entry.path().is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

/// Files held in memory, keyed by exact name
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    files: IndexMap<String, Vec<u8>>,
}

impl MemoryStorage {
    pub fn new() -> MemoryStorage {
        MemoryStorage::default()
    }

    pub fn insert(&mut self, name: &str, bytes: Vec<u8>) {
        self.files.insert(name.to_string(), bytes);
    }

    pub fn with_file(mut self, name: &str, bytes: Vec<u8>) -> MemoryStorage {
        self.insert(name, bytes);
        self
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.files.shift_remove(name)
    }

    fn get(&self, name: &str) -> io::Result<&Vec<u8>> {
        self.files.get(name).ok_or_else(|| not_found(name))
    }
}

impl FileAccess for MemoryStorage {
    fn exists(&self, name: &str) -> bool {
        self.files.contains_key(name)
    }

    fn size(&self, name: &str) -> io::Result<usize> {
        Ok(self.get(name)?.len())
    }

    fn read(&self, name: &str, offset: usize, length: usize) -> io::Result<Vec<u8>> {
        let bytes = self.get(name)?;
        match offset.checked_add(length) {
            Some(end) if end <= bytes.len() => Ok(bytes[offset..end].to_vec()),
            _ => Err(short_read(name, offset, length, bytes.len())),
        }
    }

    fn list(&self) -> io::Result<Vec<String>> {
        let mut names: Vec<String> = self.files.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
