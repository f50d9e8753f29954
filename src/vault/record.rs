//! Plaintext credential records and their persisted, encrypted form.
//!
//! A `Record` only exists in memory while a session is unlocked. On disk
//! it is a `StoredEntry`: the AES-GCM blob of the record's JSON plus
//! creation/modification timestamps. The `ciphertext` field uses custom
//! serde helpers so it serializes as base64 instead of a byte array.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::format::{base64_decode, base64_encode};

/// One credential, as the user sees it.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct Record {
    pub website: String,
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub notes: String,
}

impl Record {
    pub fn new(website: &str, username: &str, password: &str) -> Self {
        Self {
            website: website.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            url: String::new(),
            notes: String::new(),
        }
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }

    /// Case-insensitive match of `needle` against website, username and url.
    ///
    /// `needle` must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.website.to_lowercase().contains(needle)
            || self.username.to_lowercase().contains(needle)
            || self.url.to_lowercase().contains(needle)
    }
}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("website", &self.website)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("url", &self.url)
            .field("notes", &self.notes)
            .finish()
    }
}

/// A single encrypted entry stored in the container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoredEntry {
    /// Unique id, assigned at creation and never reused.
    #[serde(skip)]
    pub id: String,

    /// AES-GCM output (nonce + ciphertext + tag).
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub ciphertext: Vec<u8>,

    /// When this entry was first saved. Never changes.
    pub created: DateTime<Utc>,

    /// When this entry's ciphertext was last written.
    pub modified: DateTime<Utc>,
}

/// A decrypted entry handed back to callers by `list_records`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecryptedRecord {
    pub id: String,
    pub record: Record,
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
}

/// Result of listing the vault.
///
/// Entries that fail to decrypt are counted in `skipped` instead of
/// aborting the listing. If the container itself could not be read,
/// `records` is empty and `load_error` says why.
#[derive(Debug, Default)]
pub struct RecordList {
    pub records: Vec<DecryptedRecord>,
    pub skipped: usize,
    pub load_error: Option<crate::errors::VaultError>,
}

impl RecordList {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
