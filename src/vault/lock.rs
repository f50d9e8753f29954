//! Exclusive write lock on a container.
//!
//! Two layers: a process-wide mutex per canonical container path, so
//! every `RecordStore` handle on the same file shares one lock, and on
//! unix an advisory `flock` on a `.lock` sibling, so separate processes
//! are serialized too.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use crate::errors::Result;

type Registry = Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>;

fn registry() -> &'static Registry {
    static LOCKS: OnceLock<Registry> = OnceLock::new();
    LOCKS.get_or_init(Registry::default)
}

/// The in-process mutex shared by every handle on `container`.
///
/// `container` should be canonical so that different spellings of the
/// same path map to the same mutex.
pub(crate) fn shared_mutex(container: &Path) -> Arc<Mutex<()>> {
    let mut locks = registry().lock().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(locks.entry(container.to_path_buf()).or_default())
}

/// Held for the length of one read-modify-write.
pub(crate) struct WriteGuard<'a> {
    _file: FileLock,
    _thread: MutexGuard<'a, ()>,
}

impl<'a> WriteGuard<'a> {
    /// Take the in-process mutex first, then the file lock.
    pub(crate) fn acquire(mutex: &'a Mutex<()>, lock_path: &Path) -> Result<Self> {
        // The guarded data is `()`, so a poisoned lock carries no broken state.
        let thread = mutex.lock().unwrap_or_else(PoisonError::into_inner);
        let file = FileLock::acquire(lock_path)?;
        Ok(Self {
            _file: file,
            _thread: thread,
        })
    }
}

/// Advisory exclusive lock on a file, released on drop.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let mut options = OpenOptions::new();
        options.create(true).truncate(false).read(true).write(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let file = options.open(path)?;

        #[cfg(unix)]
        flock(&file, libc::LOCK_EX)?;

        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Closing the descriptor releases the lock as well.
        #[cfg(unix)]
        let _ = flock(&self.file, libc::LOCK_UN);
        #[cfg(not(unix))]
        let _ = &self.file;
    }
}

#[cfg(unix)]
fn flock(file: &File, operation: libc::c_int) -> std::io::Result<()> {
    use std::os::unix::io::AsRawFd;

    loop {
        // SAFETY: the descriptor is owned by `file` and open for this call.
        let rc = unsafe { libc::flock(file.as_raw_fd(), operation) };
        if rc == 0 {
            return Ok(());
        }
        let err = std::io::Error::last_os_error();
        if err.kind() != std::io::ErrorKind::Interrupted {
            return Err(err);
        }
    }
}
