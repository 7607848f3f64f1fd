//! Byte-stream storage used by filter save/load.
//!
//! A writer publishes its bytes only on `commit`; dropping it first discards
//! everything written, so a failed save never leaves a half-written filter
//! behind under the target name.

use crate::errors::{MddError, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

pub trait StoreWrite: Write {
    /// Publishes the written bytes under the writer's name.
    fn commit(self: Box<Self>) -> Result<()>;
}

pub trait FilterStore {
    fn reader(&self, name: &str) -> Result<Box<dyn Read + '_>>;
    fn writer(&self, name: &str) -> Result<Box<dyn StoreWrite + '_>>;
    fn exists(&self, name: &str) -> bool;
}

/// Files under a directory; writes go through a temp file and an atomic rename.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    /// Splits a filter file path into the store holding it and its name.
    pub fn for_path(path: impl AsRef<Path>) -> Result<(Self, String)> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| MddError::NotFound(path.display().to_string()))?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        Ok((Self::new(dir), name))
    }

    pub fn root(&self) -> &Path { &self.root }

    pub fn path_of(&self, name: &str) -> PathBuf { self.root.join(name) }

    /// Fails when no file can be created in the store directory.
    pub fn check_writable(&self) -> Result<()> {
        let probe = tempfile::Builder::new().prefix(".mdd_probe_").tempfile_in(&self.root)?;
        drop(probe);
        Ok(())
    }
}

struct FsWriter {
    target: PathBuf,
    tmp: NamedTempFile,
}

impl Write for FsWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { self.tmp.as_file_mut().write(buf) }
    fn flush(&mut self) -> io::Result<()> { self.tmp.as_file_mut().flush() }
}

impl StoreWrite for FsWriter {
    fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.tmp.as_file().sync_all()?;
        this.tmp.persist(&this.target)?;
        debug!(path = %this.target.display(), "published");
        Ok(())
    }
}

impl FilterStore for FsStore {
    fn reader(&self, name: &str) -> Result<Box<dyn Read + '_>> {
        let f = File::open(self.path_of(name))?;
        Ok(Box::new(BufReader::new(f)))
    }

    fn writer(&self, name: &str) -> Result<Box<dyn StoreWrite + '_>> {
        let tmp = tempfile::Builder::new().prefix("mdd_flt_").tempfile_in(&self.root)?;
        Ok(Box::new(FsWriter { target: self.path_of(name), tmp }))
    }

    fn exists(&self, name: &str) -> bool { self.path_of(name).is_file() }
}

/// In-memory store. Single-threaded, like the filters it holds.
#[derive(Debug, Default)]
pub struct MemStore {
    blobs: RefCell<HashMap<String, Vec<u8>>>,
}

impl MemStore {
    pub fn new() -> Self { Self::default() }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> { self.blobs.borrow().get(name).cloned() }

    pub fn insert(&self, name: &str, bytes: Vec<u8>) {
        self.blobs.borrow_mut().insert(name.to_string(), bytes);
    }
}

struct MemWriter<'a> {
    store: &'a MemStore,
    name: String,
    buf: Vec<u8>,
}

impl Write for MemWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { self.buf.write(buf) }
    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl StoreWrite for MemWriter<'_> {
    fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.store.insert(&this.name, this.buf);
        Ok(())
    }
}

impl FilterStore for MemStore {
    fn reader(&self, name: &str) -> Result<Box<dyn Read + '_>> {
        let bytes = self.get(name).ok_or_else(|| MddError::NotFound(name.to_string()))?;
        Ok(Box::new(Cursor::new(bytes)))
    }

    fn writer(&self, name: &str) -> Result<Box<dyn StoreWrite + '_>> {
        Ok(Box::new(MemWriter { store: self, name: name.to_string(), buf: Vec::new() }))
    }

    fn exists(&self, name: &str) -> bool { self.blobs.borrow().contains_key(name) }
}
