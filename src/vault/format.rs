//! Binary container format for stored entries.
//!
//! A `.vault` container has this layout:
//!
//! ```text
//! [SPVT: 4 bytes][version: 1 byte][body_len: 4 bytes LE][body JSON][SHA-256(body): 32 bytes]
//! ```
//!
//! - **Magic** (`SPVT`): identifies the file as a SecurePass container.
//! - **Version**: format version (currently `1`).
//! - **Body length**: little-endian u32, lets us reject truncated files
//!   before parsing anything.
//! - **Body JSON**: `{"entries": {id: {ciphertext, created, modified}}}`
//!   with a fixed entry shape and ids in sorted order.
//! - **SHA-256**: checksum over the body bytes. The store never holds the
//!   encryption key, so this guards against truncation and bit rot only;
//!   per-entry integrity comes from the AES-GCM tag.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use super::record::StoredEntry;
use crate::errors::{Result, VaultError};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic bytes at the start of every container.
const MAGIC: &[u8; 4] = b"SPVT";

/// Current binary format version.
pub const CURRENT_VERSION: u8 = 1;

/// Size of the trailing checksum (SHA-256 = 32 bytes).
const CHECKSUM_LEN: usize = 32;

/// Fixed-size prefix: 4 (magic) + 1 (version) + 4 (body_len).
const PREFIX_LEN: usize = 9;

/// Entries keyed by id. Sorted so identical contents encode identically.
pub type EntryMap = BTreeMap<String, StoredEntry>;

#[derive(Serialize)]
struct BodyRef<'a> {
    entries: &'a EntryMap,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Body {
    entries: EntryMap,
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Serialize `entries` into the container byte layout.
pub fn encode(entries: &EntryMap) -> Result<Vec<u8>> {
    let body = serde_json::to_vec(&BodyRef { entries })
        .map_err(|e| VaultError::SerializationError(format!("container body: {e}")))?;

    let body_len = u32::try_from(body.len()).map_err(|_| {
        VaultError::SerializationError(format!("body length {} exceeds u32::MAX", body.len()))
    })?;
    let checksum = Sha256::digest(&body);

    let mut buf = Vec::with_capacity(PREFIX_LEN + body.len() + CHECKSUM_LEN);
    buf.extend_from_slice(MAGIC); // 4 bytes
    buf.push(CURRENT_VERSION); // 1 byte
    buf.extend_from_slice(&body_len.to_le_bytes()); // 4 bytes LE
    buf.extend_from_slice(&body); // body JSON
    buf.extend_from_slice(&checksum); // 32 bytes
    Ok(buf)
}

/// Parse and validate container bytes.
///
/// Every structural problem (bad magic, unknown version, length mismatch,
/// checksum mismatch, schema violation) is a `SerializationError`.
pub fn decode(data: &[u8]) -> Result<EntryMap> {
    if data.len() < PREFIX_LEN + CHECKSUM_LEN {
        return Err(VaultError::SerializationError(
            "file too small to be a valid container".into(),
        ));
    }

    if &data[0..4] != MAGIC {
        return Err(VaultError::SerializationError(
            "missing SPVT magic bytes".into(),
        ));
    }

    let version = data[4];
    if version != CURRENT_VERSION {
        return Err(VaultError::SerializationError(format!(
            "unsupported version {version}, expected {CURRENT_VERSION}"
        )));
    }

    let body_len_u32 = u32::from_le_bytes(
        data[5..9]
            .try_into()
            .map_err(|_| VaultError::SerializationError("bad body length".into()))?,
    );
    let body_len = usize::try_from(body_len_u32).map_err(|_| {
        VaultError::SerializationError(format!(
            "body length {body_len_u32} exceeds platform address space"
        ))
    })?;

    let body_end = PREFIX_LEN + body_len;
    if body_end + CHECKSUM_LEN != data.len() {
        return Err(VaultError::SerializationError(format!(
            "body length {body_len} does not match file size {}",
            data.len()
        )));
    }

    let body = &data[PREFIX_LEN..body_end];
    let stored_checksum = &data[body_end..];
    if Sha256::digest(body).as_slice() != stored_checksum {
        return Err(VaultError::SerializationError(
            "checksum mismatch — container is corrupted".into(),
        ));
    }

    let parsed: Body = serde_json::from_slice(body)
        .map_err(|e| VaultError::SerializationError(format!("container body: {e}")))?;

    let mut entries = parsed.entries;
    for (id, entry) in entries.iter_mut() {
        if id.is_empty() {
            return Err(VaultError::SerializationError("empty entry id".into()));
        }
        entry.id.clone_from(id);
    }
    Ok(entries)
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

/// Read and decode the container at `path`.
pub fn read_container(path: &Path) -> Result<EntryMap> {
    if !path.exists() {
        return Err(VaultError::ContainerNotFound(path.to_path_buf()));
    }
    let data = fs::read(path)?;
    decode(&data)
}

/// Encode `entries` and write them to `path` atomically.
pub fn write_container(path: &Path, entries: &EntryMap) -> Result<()> {
    let buf = encode(entries)?;
    write_atomic(path, &buf)
}

/// Write `bytes` to `path` **atomically**.
///
/// The data goes to a uniquely named temp file in the same directory, is
/// flushed to disk, and is then renamed over the target, so readers see
/// either the old file or the new one, never a mix. Concurrent writers
/// never share a temp file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    // Removed on drop unless persisted.
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))?;
    }

    tmp.persist(path).map_err(|e| VaultError::Storage(e.error))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Serde helpers for base64-encoded Vec<u8> fields
// ---------------------------------------------------------------------------

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn sample_entries() -> EntryMap {
        let now = Utc::now();
        let mut entries = EntryMap::new();
        for (id, blob) in [("b-id", vec![1u8, 2, 3]), ("a-id", vec![9u8; 40])] {
            entries.insert(
                id.to_string(),
                StoredEntry {
                    id: id.to_string(),
                    ciphertext: blob,
                    created: now,
                    modified: now,
                },
            );
        }
        entries
    }

    #[test]
    fn decode_restores_entries_and_ids() {
        let entries = sample_entries();
        let decoded = decode(&encode(&entries).unwrap()).unwrap();
        assert_eq!(decoded, entries);
        assert_eq!(decoded["a-id"].id, "a-id");
    }

    #[test]
    fn empty_container_is_valid() {
        let decoded = decode(&encode(&EntryMap::new()).unwrap()).unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn encoding_is_deterministic() {
        let entries = sample_entries();
        assert_eq!(encode(&entries).unwrap(), encode(&entries).unwrap());
    }

    #[test]
    fn rejects_truncated_container() {
        let bytes = encode(&sample_entries()).unwrap();
        for cut in [0, 5, PREFIX_LEN + 3, bytes.len() - 1] {
            assert!(
                matches!(decode(&bytes[..cut]), Err(VaultError::SerializationError(_))),
                "truncation at {cut} must be rejected"
            );
        }
    }

    #[test]
    fn rejects_flipped_body_byte() {
        let mut bytes = encode(&sample_entries()).unwrap();
        bytes[PREFIX_LEN + 2] ^= 0x01;
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn rejects_wrong_magic_and_version() {
        let mut bytes = encode(&sample_entries()).unwrap();
        bytes[0] = b'X';
        assert!(decode(&bytes).is_err());

        let mut bytes = encode(&sample_entries()).unwrap();
        bytes[4] = CURRENT_VERSION + 1;
        assert!(decode(&bytes).is_err());
    }

    /// Wrap a hand-written JSON body in a valid header and checksum.
    fn raw_container(body: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(MAGIC);
        bytes.push(CURRENT_VERSION);
        bytes.extend_from_slice(&(body.len() as u32).to_le_bytes());
        bytes.extend_from_slice(body);
        bytes.extend_from_slice(&Sha256::digest(body));
        bytes
    }

    #[test]
    fn rejects_unexpected_schema() {
        let bytes = raw_container(br#"{"entries":{},"payload":"anything"}"#);
        assert!(decode(&bytes).is_err());
    }

    #[test]
    fn rejects_unknown_entry_field() {
        let valid = br#"{"entries":{"x":{"ciphertext":"AAAA","created":"2024-01-01T00:00:00Z","modified":"2024-01-01T00:00:00Z"}}}"#;
        assert_eq!(decode(&raw_container(valid)).unwrap().len(), 1);

        let extra = br#"{"entries":{"x":{"ciphertext":"AAAA","created":"2024-01-01T00:00:00Z","modified":"2024-01-01T00:00:00Z","plaintext":"p@ss"}}}"#;
        assert!(matches!(
            decode(&raw_container(extra)),
            Err(VaultError::SerializationError(_))
        ));
    }

    #[test]
    fn write_atomic_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("passwords.vault");

        write_container(&path, &sample_entries()).unwrap();

        assert!(path.exists());
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("passwords.vault")]);
        assert_eq!(read_container(&path).unwrap().len(), 2);
    }

    #[test]
    fn write_atomic_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("passwords.vault");
        fs::write(&path, b"old").unwrap();

        write_atomic(&path, b"new contents").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"new contents");
    }

    #[test]
    fn read_missing_container_errors() {
        let dir = TempDir::new().unwrap();
        let result = read_container(&dir.path().join("missing.vault"));
        assert!(matches!(result, Err(VaultError::ContainerNotFound(_))));
    }
}
