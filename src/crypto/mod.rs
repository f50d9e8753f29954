//! Cryptographic primitives for SecurePass.
//!
//! This module provides:
//! - PBKDF2-HMAC-SHA256 key derivation and passphrase verification (`kdf`)
//! - AES-256-GCM authenticated encryption and decryption (`encryption`)
//! - The zeroize-on-drop `DerivedKey` wrapper (`keys`)

pub mod encryption;
pub mod kdf;
pub mod keys;

// Re-export the most commonly used items so callers can write:
//   use crate::crypto::{encrypt, decrypt, derive, ...};
pub use encryption::{decrypt, encrypt};
pub use kdf::{derive, generate_salt, hash_for_verification, verify};
pub use keys::DerivedKey;
