//! cache::fs
//!
//! Filesystem capability used by the deployment cache.
//!
//! # Design
//!
//! The hash store, content verifier and sync writer never touch `std::fs`
//! directly. They receive a [`FileSystem`] so tests can substitute the
//! in-memory [`MemoryFileSystem`], which records every operation and can be
//! told to fail specific calls.
//!
//! # Example
//!
//! ```
//! use legacy_bridge::cache::fs::{FileSystem, MemoryFileSystem};
//! use std::path::Path;
//!
//! let fs = MemoryFileSystem::new();
//! fs.write(Path::new("/c/a"), b"abc").unwrap();
//!
//! assert_eq!(fs.metadata(Path::new("/c/a")).unwrap().len, 3);
//! assert_eq!(fs.write_count(Path::new("/c/a")), 1);
//! ```

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::fs::{self, OpenOptions};
use std::io::{self, Cursor, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

/// Subset of file metadata the cache relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    /// Length of the file in bytes.
    pub len: u64,
}

/// Filesystem operations needed by the deployment cache.
///
/// Implementations must report a missing file as `io::ErrorKind::NotFound`
/// so callers can tell "needs write" apart from real failures.
pub trait FileSystem: Send + Sync + Debug {
    /// Open a file for streaming reads.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Stat a file.
    fn metadata(&self, path: &Path) -> io::Result<FileStat>;

    /// Write `contents` to `path`, creating or truncating it.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    /// Rename `from` to `to`, replacing `to` if it exists.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Remove a file.
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// Create a directory and all of its parents.
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Ensure the file can be executed by its owner.
    fn make_executable(&self, path: &Path) -> io::Result<()>;
}

/// [`FileSystem`] backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        Ok(Box::new(fs::File::open(path)?))
    }

    fn metadata(&self, path: &Path) -> io::Result<FileStat> {
        let metadata = fs::metadata(path)?;
        Ok(FileStat {
            len: metadata.len(),
        })
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o644);

        let mut file = options.open(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    #[cfg(unix)]
    fn make_executable(&self, path: &Path) -> io::Result<()> {
        let mut permissions = fs::metadata(path)?.permissions();
        let mode = permissions.mode();
        if mode & 0o100 != 0 {
            return Ok(());
        }
        permissions.set_mode(mode | 0o755);
        fs::set_permissions(path, permissions)
    }

    #[cfg(not(unix))]
    fn make_executable(&self, _path: &Path) -> io::Result<()> {
        Ok(())
    }
}

/// Operation kinds that can be configured to fail in [`MemoryFileSystem`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FsOp {
    Open,
    Metadata,
    Write,
    Rename,
    Remove,
    CreateDir,
}

/// In-memory [`FileSystem`] for deterministic tests.
///
/// Clones share state, so a test can keep a handle while the code under
/// test owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
    inner: Arc<Mutex<MemoryInner>>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    dirs: BTreeSet<PathBuf>,
    executable: BTreeSet<PathBuf>,
    writes: BTreeMap<PathBuf, usize>,
    reads: BTreeMap<PathBuf, usize>,
    failures: BTreeMap<(FsOp, PathBuf), io::ErrorKind>,
}

impl MemoryFileSystem {
    /// Create an empty filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        // A panicking test thread must not hide the state from the others.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Place a file without counting it as a write.
    pub fn insert_file(&self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.lock().files.insert(path.into(), contents.into());
    }

    /// Current contents of a file, if it exists.
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.lock().files.get(path).cloned()
    }

    /// Paths of all files, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.lock().files.keys().cloned().collect()
    }

    /// Whether a file exists.
    pub fn exists(&self, path: &Path) -> bool {
        self.lock().files.contains_key(path)
    }

    /// Whether a directory was created.
    pub fn dir_exists(&self, path: &Path) -> bool {
        self.lock().dirs.contains(path)
    }

    /// Whether `make_executable` was applied to the file.
    pub fn is_executable(&self, path: &Path) -> bool {
        self.lock().executable.contains(path)
    }

    /// Number of writes (including rename targets) to a path.
    pub fn write_count(&self, path: &Path) -> usize {
        self.lock().writes.get(path).copied().unwrap_or(0)
    }

    /// Number of writes across all paths.
    pub fn total_writes(&self) -> usize {
        self.lock().writes.values().sum()
    }

    /// Number of times a file was opened for reading.
    pub fn read_count(&self, path: &Path) -> usize {
        self.lock().reads.get(path).copied().unwrap_or(0)
    }

    /// Make every `op` on `path` fail with `kind` until cleared.
    pub fn fail_on(&self, op: FsOp, path: impl Into<PathBuf>, kind: io::ErrorKind) {
        self.lock().failures.insert((op, path.into()), kind);
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    fn check(inner: &MemoryInner, op: FsOp, path: &Path) -> io::Result<()> {
        match inner.failures.get(&(op, path.to_path_buf())) {
            Some(kind) => Err(io::Error::new(
                *kind,
                format!("injected {:?} failure for {}", op, path.display()),
            )),
            None => Ok(()),
        }
    }

    fn not_found(path: &Path) -> io::Error {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("{}: no such file", path.display()),
        )
    }
}

impl FileSystem for MemoryFileSystem {
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let mut inner = self.lock();
        Self::check(&inner, FsOp::Open, path)?;
        let contents = inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| Self::not_found(path))?;
        *inner.reads.entry(path.to_path_buf()).or_default() += 1;
        Ok(Box::new(Cursor::new(contents)))
    }

    fn metadata(&self, path: &Path) -> io::Result<FileStat> {
        let inner = self.lock();
        Self::check(&inner, FsOp::Metadata, path)?;
        inner
            .files
            .get(path)
            .map(|contents| FileStat {
                len: contents.len() as u64,
            })
            .ok_or_else(|| Self::not_found(path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut inner = self.lock();
        Self::check(&inner, FsOp::Write, path)?;
        inner.files.insert(path.to_path_buf(), contents.to_vec());
        *inner.writes.entry(path.to_path_buf()).or_default() += 1;
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut inner = self.lock();
        Self::check(&inner, FsOp::Rename, from)?;
        Self::check(&inner, FsOp::Rename, to)?;
        let contents = inner
            .files
            .remove(from)
            .ok_or_else(|| Self::not_found(from))?;
        inner.files.insert(to.to_path_buf(), contents);
        *inner.writes.entry(to.to_path_buf()).or_default() += 1;
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.lock();
        Self::check(&inner, FsOp::Remove, path)?;
        inner
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| Self::not_found(path))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.lock();
        Self::check(&inner, FsOp::CreateDir, path)?;
        for ancestor in path.ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            inner.dirs.insert(ancestor.to_path_buf());
        }
        Ok(())
    }

    fn make_executable(&self, path: &Path) -> io::Result<()> {
        let mut inner = self.lock();
        if !inner.files.contains_key(path) {
            return Err(Self::not_found(path));
        }
        inner.executable.insert(path.to_path_buf());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    mod memory {
        use super::*;

        #[test]
        fn missing_file_is_not_found() {
            let fs = MemoryFileSystem::new();
            let err = fs.metadata(Path::new("/absent")).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::NotFound);
            let err = fs.open(Path::new("/absent")).err().unwrap();
            assert_eq!(err.kind(), io::ErrorKind::NotFound);
        }

        #[test]
        fn insert_does_not_count_as_write() {
            let fs = MemoryFileSystem::new();
            fs.insert_file("/a", "abc");
            assert_eq!(fs.total_writes(), 0);
            assert_eq!(fs.contents(Path::new("/a")), Some(b"abc".to_vec()));
        }

        #[test]
        fn rename_moves_and_counts_target() {
            let fs = MemoryFileSystem::new();
            fs.write(Path::new("/a.tmp"), b"x").unwrap();
            fs.rename(Path::new("/a.tmp"), Path::new("/a")).unwrap();

            assert!(!fs.exists(Path::new("/a.tmp")));
            assert_eq!(fs.contents(Path::new("/a")), Some(b"x".to_vec()));
            assert_eq!(fs.write_count(Path::new("/a")), 1);
            assert_eq!(fs.total_writes(), 2);
        }

        #[test]
        fn injected_failures_until_cleared() {
            let fs = MemoryFileSystem::new();
            fs.fail_on(FsOp::Write, "/a", io::ErrorKind::PermissionDenied);

            let err = fs.write(Path::new("/a"), b"x").unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
            assert!(!fs.exists(Path::new("/a")));

            fs.clear_failures();
            fs.write(Path::new("/a"), b"x").unwrap();
            assert!(fs.exists(Path::new("/a")));
        }

        #[test]
        fn clones_share_state() {
            let fs = MemoryFileSystem::new();
            let handle = fs.clone();
            fs.write(Path::new("/a"), b"x").unwrap();
            assert_eq!(handle.write_count(Path::new("/a")), 1);
        }

        #[test]
        fn create_dir_all_records_ancestors() {
            let fs = MemoryFileSystem::new();
            fs.create_dir_all(Path::new("/a/b/c")).unwrap();
            assert!(fs.dir_exists(Path::new("/a")));
            assert!(fs.dir_exists(Path::new("/a/b/c")));
        }
    }

    mod os {
        use super::*;

        #[test]
        fn write_truncates_existing_file() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("file");

            OsFileSystem.write(&path, b"longer content").unwrap();
            OsFileSystem.write(&path, b"short").unwrap();

            assert_eq!(fs::read(&path).unwrap(), b"short");
            assert_eq!(OsFileSystem.metadata(&path).unwrap().len, 5);
        }

        #[test]
        fn missing_file_is_not_found() {
            let temp = TempDir::new().unwrap();
            let err = OsFileSystem
                .metadata(&temp.path().join("absent"))
                .unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::NotFound);
        }

        #[cfg(unix)]
        #[test]
        fn make_executable_sets_owner_bit() {
            let temp = TempDir::new().unwrap();
            let path = temp.path().join("tool");
            OsFileSystem.write(&path, b"#!/bin/sh\n").unwrap();

            OsFileSystem.make_executable(&path).unwrap();

            let mode = fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o700, 0o700);
        }
    }
}
