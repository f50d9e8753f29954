//! Vault module: encrypted credential storage.
//!
//! This module provides:
//! - `Record`, `StoredEntry` and listing types (`record`)
//! - Versioned binary container format with a body checksum (`format`)
//! - `RecordStore`, the locked read-modify-write container owner (`store`)
//! - `Session`, the explicit handle holding the derived key (`session`)
//! - `Vault`, which ties config, key derivation and storage together (`manager`)

pub mod format;
mod lock;
pub mod manager;
pub mod record;
pub mod session;
pub mod store;

// Re-export the most commonly used items.
pub use manager::Vault;
pub use record::{DecryptedRecord, Record, RecordList, StoredEntry};
pub use session::{Session, VaultState};
pub use store::RecordStore;
