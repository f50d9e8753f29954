//! On-disk record storage.
//!
//! `RecordStore` owns the container file and nothing else: it receives
//! ciphertext that is already encrypted and never sees a key or a
//! plaintext field. Every mutation is a full read-modify-write of the
//! container, so all writers of the same file, from any handle or any
//! process, go through a single lock (see `lock`).

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use uuid::Uuid;

use crate::errors::{Result, VaultError};

use super::format::{self, EntryMap};
use super::lock::{self, WriteGuard};
use super::record::StoredEntry;

/// Handle to the container holding every stored entry.
#[derive(Debug)]
pub struct RecordStore {
    /// Path to the container on disk.
    path: PathBuf,

    /// Advisory lock file next to the container.
    lock_path: PathBuf,

    /// Shared with every other handle on the same container.
    write_lock: Arc<Mutex<()>>,
}

impl RecordStore {
    /// Name of the container inside the vault directory.
    pub const FILE_NAME: &'static str = "passwords.vault";

    /// Name of the advisory lock file inside the vault directory.
    pub const LOCK_FILE_NAME: &'static str = "passwords.vault.lock";

    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open the container in `dir`, creating an empty one on first run.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
        }

        let canonical = fs::canonicalize(dir)?.join(Self::FILE_NAME);
        let store = Self {
            path: dir.join(Self::FILE_NAME),
            lock_path: dir.join(Self::LOCK_FILE_NAME),
            write_lock: lock::shared_mutex(&canonical),
        };

        {
            let _guard = store.lock()?;
            if !store.path.exists() {
                tracing::info!("creating empty container at {}", store.path.display());
                format::write_container(&store.path, &EntryMap::new())?;
            }
        }

        Ok(store)
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Store a new entry and return its freshly generated id.
    ///
    /// The id is only returned once the container has been rewritten.
    pub fn save(&self, ciphertext: Vec<u8>) -> Result<String> {
        let _guard = self.lock()?;
        let mut entries = self.load_for_write()?;

        let id = loop {
            let candidate = Uuid::new_v4().to_string();
            if !entries.contains_key(&candidate) {
                break candidate;
            }
        };

        let now = Utc::now();
        entries.insert(
            id.clone(),
            StoredEntry {
                id: id.clone(),
                ciphertext,
                created: now,
                modified: now,
            },
        );

        format::write_container(&self.path, &entries)?;
        tracing::debug!(entry = %id, total = entries.len(), "entry saved");
        Ok(id)
    }

    /// Overwrite the ciphertext of an existing entry.
    ///
    /// Keeps `created`, bumps `modified`. Returns `false` if `id` is absent.
    pub fn update(&self, id: &str, ciphertext: Vec<u8>) -> Result<bool> {
        let _guard = self.lock()?;
        let mut entries = self.load_for_write()?;

        let Some(entry) = entries.get_mut(id) else {
            return Ok(false);
        };
        entry.ciphertext = ciphertext;
        entry.modified = Utc::now();

        format::write_container(&self.path, &entries)?;
        tracing::debug!(entry = %id, "entry updated");
        Ok(true)
    }

    /// Fetch a single entry.
    pub fn get(&self, id: &str) -> Result<Option<StoredEntry>> {
        let mut entries = format::read_container(&self.path)?;
        Ok(entries.remove(id))
    }

    /// Read every entry, oldest first.
    pub fn list_all(&self) -> Result<Vec<StoredEntry>> {
        let entries = format::read_container(&self.path)?;
        let mut list: Vec<StoredEntry> = entries.into_values().collect();
        list.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(list)
    }

    /// Remove an entry. Returns whether anything was deleted; the
    /// container is left untouched when `id` does not exist.
    pub fn delete(&self, id: &str) -> Result<bool> {
        let _guard = self.lock()?;
        let mut entries = self.load_for_write()?;

        if entries.remove(id).is_none() {
            return Ok(false);
        }

        format::write_container(&self.path, &entries)?;
        tracing::debug!(entry = %id, remaining = entries.len(), "entry deleted");
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Export / import
    // ------------------------------------------------------------------

    /// Copy the container byte-for-byte to `dest`.
    pub fn export(&self, dest: &Path) -> Result<()> {
        let _guard = self.lock()?;

        if !self.path.exists() {
            return Err(VaultError::ContainerNotFound(self.path.clone()));
        }
        self.refuse_self_copy(dest)?;

        fs::copy(&self.path, dest)?;
        tracing::info!("container exported to {}", dest.display());
        Ok(())
    }

    /// Replace the container with the file at `source`.
    ///
    /// The source is read into memory and validated first, so importing
    /// from the `.backup` sibling itself works. Then the current container
    /// is copied to the backup, the new bytes are written and read back;
    /// if any step fails, the backup is put back so the container ends up
    /// exactly as it was.
    pub fn import(&self, source: &Path) -> Result<()> {
        let _guard = self.lock()?;

        if !source.exists() {
            return Err(VaultError::ContainerNotFound(source.to_path_buf()));
        }
        self.refuse_self_copy(source)?;

        let bytes = fs::read(source)?;
        format::decode(&bytes)?;

        let had_container = self.path.exists();
        let backup = self.backup_path();
        if had_container {
            fs::copy(&self.path, &backup)?;
            tracing::debug!("container backed up to {}", backup.display());
        }

        if let Err(e) = self.overwrite_with(&bytes) {
            tracing::warn!("import from {} failed, rolling back: {e}", source.display());
            if let Err(restore_err) = self.restore(had_container) {
                tracing::error!("rollback after failed import also failed: {restore_err}");
            }
            return Err(e);
        }

        tracing::info!("container imported from {}", source.display());
        Ok(())
    }

    // ------------------------------------------------------------------
    // Bulk rewrite
    // ------------------------------------------------------------------

    /// Rewrite every entry's ciphertext in one critical section.
    ///
    /// `transform` returns the new ciphertext for an entry, or `None` to
    /// keep it unchanged. After the new container is written, `commit`
    /// runs; if it fails, the previous container is restored from the
    /// backup and its error is returned. Returns the number of entries
    /// that were rewritten.
    ///
    /// The container is written before `commit` runs. If the process dies
    /// in between, the container is left in its rewritten form and the
    /// pre-rewrite container survives only in the `.backup` sibling, from
    /// which `import` can restore it.
    pub fn rewrite_entries<F, C>(&self, mut transform: F, commit: C) -> Result<usize>
    where
        F: FnMut(&StoredEntry) -> Result<Option<Vec<u8>>>,
        C: FnOnce() -> Result<()>,
    {
        let _guard = self.lock()?;
        let mut entries = self.load_for_write()?;

        let mut rewritten = 0;
        let now = Utc::now();
        for entry in entries.values_mut() {
            if let Some(ciphertext) = transform(entry)? {
                entry.ciphertext = ciphertext;
                entry.modified = now;
                rewritten += 1;
            }
        }

        let had_container = self.path.exists();
        if had_container {
            fs::copy(&self.path, self.backup_path())?;
        }
        format::write_container(&self.path, &entries)?;

        if let Err(e) = commit() {
            tracing::warn!("bulk rewrite not committed, restoring container: {e}");
            if let Err(restore_err) = self.restore(had_container) {
                tracing::error!("restoring container after bulk rewrite failed: {restore_err}");
            }
            return Err(e);
        }

        Ok(rewritten)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the path to the container on disk.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the `.backup` sibling written before an import.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".backup");
        PathBuf::from(name)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn lock(&self) -> Result<WriteGuard<'_>> {
        WriteGuard::acquire(&self.write_lock, &self.lock_path)
    }

    /// Load the container for a read-modify-write. A missing container
    /// counts as empty; an unreadable one is an error so it is never
    /// overwritten with a partial view.
    fn load_for_write(&self) -> Result<EntryMap> {
        match format::read_container(&self.path) {
            Ok(entries) => Ok(entries),
            Err(VaultError::ContainerNotFound(_)) => Ok(EntryMap::new()),
            Err(e) => Err(e),
        }
    }

    fn overwrite_with(&self, bytes: &[u8]) -> Result<()> {
        format::write_atomic(&self.path, bytes)?;

        let written = fs::read(&self.path)?;
        if written != bytes {
            return Err(VaultError::Storage(io::Error::other(
                "container contents differ from import source after write",
            )));
        }
        Ok(())
    }

    fn restore(&self, had_container: bool) -> Result<()> {
        if had_container {
            let bytes = fs::read(self.backup_path())?;
            format::write_atomic(&self.path, &bytes)
        } else {
            format::write_container(&self.path, &EntryMap::new())
        }
    }

    fn refuse_self_copy(&self, other: &Path) -> Result<()> {
        let same = match (fs::canonicalize(&self.path), fs::canonicalize(other)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        };
        if same {
            return Err(VaultError::Storage(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is the container itself", other.display()),
            )));
        }
        Ok(())
    }
}
