//! High-level vault operations used by CLI commands.
//!
//! `Vault` ties the config file (salt + verification hash), the key
//! derivation, and the record container together. It never holds a key
//! itself: `enroll` and `authenticate` hand back a `Session`, and every
//! record operation takes that session as an argument.

use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::Zeroizing;

use crate::config::store::AUTH_SECTION;
use crate::config::ConfigStore;
use crate::crypto::{decrypt, encrypt, kdf};
use crate::errors::{Result, VaultError};

use super::record::{DecryptedRecord, Record, RecordList, StoredEntry};
use super::session::Session;
use super::store::RecordStore;

const SALT_KEY: &str = "salt";
const HASH_KEY: &str = "password_hash";

/// The vault rooted at one directory: `config.toml` + `passwords.vault`.
#[derive(Debug)]
pub struct Vault {
    dir: PathBuf,
    config: ConfigStore,
    records: RecordStore,
}

impl Vault {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Open (or initialize) the vault directory at `dir`.
    pub fn open(dir: &Path) -> Result<Self> {
        let records = RecordStore::open(dir)?;
        let config = ConfigStore::open(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            config,
            records,
        })
    }

    // ------------------------------------------------------------------
    // Account lifecycle
    // ------------------------------------------------------------------

    /// Whether a master passphrase has been enrolled.
    pub fn has_account(&self) -> bool {
        self.config.has_account()
    }

    /// Create the account and return an unlocked session.
    pub fn enroll(&mut self, passphrase: &str) -> Result<Session> {
        if self.has_account() {
            return Err(VaultError::AlreadyEnrolled);
        }

        let (key, salt) = kdf::derive(passphrase, None);
        let verification = kdf::hash_for_verification(passphrase);
        let session = Session::unlock(key)?;

        self.config.set(AUTH_SECTION, SALT_KEY, BASE64.encode(&salt))?;
        self.config.set(AUTH_SECTION, HASH_KEY, verification)?;

        tracing::info!("account enrolled in {}", self.dir.display());
        Ok(session)
    }

    /// Check `passphrase` and, on success, rebuild the key from the
    /// stored salt.
    pub fn authenticate(&self, passphrase: &str) -> Result<Session> {
        if !self.has_account() {
            return Err(VaultError::NoAccount);
        }

        let verification = self.config.get_str(AUTH_SECTION, HASH_KEY, "");
        if !kdf::verify(&verification, passphrase) {
            tracing::warn!("authentication rejected: wrong passphrase");
            return Err(VaultError::InvalidCredentials);
        }

        let salt = self.stored_salt()?;
        let (key, _) = kdf::derive(passphrase, Some(&salt));
        let session = Session::unlock(key)?;

        tracing::info!("vault unlocked");
        Ok(session)
    }

    /// Switch to `new_passphrase`: fresh salt, fresh key, fresh
    /// verification hash.
    ///
    /// Every entry is re-encrypted under the new key while the container
    /// is locked. Entries that no longer decrypt under the current key
    /// are left as they are. The container is rewritten first, then the
    /// config; if the config cannot be written, the old container and
    /// the old key stay in place. Returns how many entries were
    /// re-encrypted.
    ///
    /// A crash after the container write but before the config write
    /// leaves entries sealed under a key whose salt was never saved. The
    /// old container is then in `passwords.vault.backup`; importing that
    /// file brings the entries back under the old passphrase.
    pub fn change_passphrase(&mut self, session: &mut Session, new_passphrase: &str) -> Result<usize> {
        let old_key = session.key()?;

        let (new_key, new_salt) = kdf::derive(new_passphrase, None);
        let new_verification = kdf::hash_for_verification(new_passphrase);

        let config = &mut self.config;
        let mut left_alone = 0usize;

        let rewritten = self.records.rewrite_entries(
            |entry: &StoredEntry| match decrypt(old_key.as_bytes(), &entry.ciphertext) {
                Ok(plaintext) => {
                    let plaintext = Zeroizing::new(plaintext);
                    encrypt(new_key.as_bytes(), &plaintext).map(Some)
                }
                Err(VaultError::AuthenticationFailure) => {
                    tracing::warn!(entry = %entry.id, "entry does not decrypt under current key; left unchanged");
                    left_alone += 1;
                    Ok(None)
                }
                Err(e) => Err(e),
            },
            || {
                let old_salt = config.get_str(AUTH_SECTION, SALT_KEY, "");
                let old_hash = config.get_str(AUTH_SECTION, HASH_KEY, "");

                let written = config
                    .set(AUTH_SECTION, SALT_KEY, BASE64.encode(&new_salt))
                    .and_then(|()| config.set(AUTH_SECTION, HASH_KEY, new_verification.clone()));

                if written.is_err() {
                    let _ = config.set(AUTH_SECTION, SALT_KEY, old_salt);
                    let _ = config.set(AUTH_SECTION, HASH_KEY, old_hash);
                }
                written
            },
        )?;

        session.replace_key(new_key);
        tracing::info!(rewritten, left_alone, "master passphrase changed");
        Ok(rewritten)
    }

    /// Lock `session`, wiping its key.
    pub fn logout(&self, session: &mut Session) {
        session.logout();
        tracing::info!("vault locked");
    }

    // ------------------------------------------------------------------
    // Record operations
    // ------------------------------------------------------------------

    /// Encrypt `record` and store it under a new id.
    pub fn save_record(&self, session: &Session, record: &Record) -> Result<String> {
        let ciphertext = session.encrypt_record(record)?;
        let id = self.records.save(ciphertext)?;
        tracing::info!(entry = %id, "record saved");
        Ok(id)
    }

    /// Replace the record stored under `id`. Returns `false` if absent.
    pub fn update_record(&self, session: &Session, id: &str, record: &Record) -> Result<bool> {
        let ciphertext = session.encrypt_record(record)?;
        let updated = self.records.update(id, ciphertext)?;
        if updated {
            tracing::info!(entry = %id, "record updated");
        }
        Ok(updated)
    }

    /// Decrypt a single record.
    pub fn get_record(&self, session: &Session, id: &str) -> Result<Option<DecryptedRecord>> {
        session.key()?;
        match self.records.get(id)? {
            Some(entry) => decrypt_entry(session, entry).map(Some),
            None => Ok(None),
        }
    }

    /// Decrypt every record.
    ///
    /// Entries that fail to decrypt are skipped and counted. If the
    /// container cannot be read at all, the list is empty and carries the
    /// error instead of failing, so the vault stays usable.
    pub fn list_records(&self, session: &Session) -> Result<RecordList> {
        session.key()?;

        let entries = match self.records.list_all() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("could not read container: {e}");
                return Ok(RecordList {
                    load_error: Some(e),
                    ..RecordList::default()
                });
            }
        };

        let mut list = RecordList::default();
        for entry in entries {
            let id = entry.id.clone();
            match decrypt_entry(session, entry) {
                Ok(record) => list.records.push(record),
                Err(e) => {
                    tracing::warn!(entry = %id, "skipping undecryptable entry: {e}");
                    list.skipped += 1;
                }
            }
        }
        Ok(list)
    }

    /// Records whose website, username or url contain `term`
    /// (case-insensitive). An empty term matches everything.
    pub fn search_records(&self, session: &Session, term: &str) -> Result<RecordList> {
        let mut list = self.list_records(session)?;
        let needle = term.to_lowercase();
        list.records.retain(|r| r.record.matches(&needle));
        Ok(list)
    }

    /// Remove the record stored under `id`.
    pub fn delete_record(&self, session: &Session, id: &str) -> Result<bool> {
        session.key()?;
        let deleted = self.records.delete(id)?;
        if deleted {
            tracing::info!(entry = %id, "record deleted");
        }
        Ok(deleted)
    }

    // ------------------------------------------------------------------
    // Export / import
    // ------------------------------------------------------------------

    /// Copy the encrypted container verbatim to `path`.
    pub fn export(&self, path: &Path) -> Result<()> {
        self.records.export(path)
    }

    /// Replace the container with `path`, rolling back on any failure.
    pub fn import(&self, path: &Path) -> Result<()> {
        self.records.import(path)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the vault directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config(&self) -> &ConfigStore {
        &self.config
    }

    /// Mutable access for pass-through app/ui/security settings.
    pub fn config_mut(&mut self) -> &mut ConfigStore {
        &mut self.config
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    fn stored_salt(&self) -> Result<Vec<u8>> {
        let encoded = self.config.get_str(AUTH_SECTION, SALT_KEY, "");
        BASE64
            .decode(encoded.trim())
            .map_err(|e| VaultError::CorruptedState(format!("stored salt is not valid base64: {e}")))
    }
}

fn decrypt_entry(session: &Session, entry: StoredEntry) -> Result<DecryptedRecord> {
    let record = session.decrypt_record(&entry.ciphertext)?;
    Ok(DecryptedRecord {
        id: entry.id,
        record,
        created: entry.created,
        modified: entry.modified,
    })
}
