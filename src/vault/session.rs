//! Explicit session handle for an unlocked vault.
//!
//! The derived key lives here, not on the `Vault`, so every record
//! operation has to be handed a session and the Locked/Unlocked state is
//! visible at each call site.

use zeroize::{Zeroize, Zeroizing};

use crate::crypto::{decrypt, encrypt, DerivedKey};
use crate::errors::{Result, VaultError};

use super::record::Record;

/// Known plaintext encrypted and decrypted before a session is trusted.
const SELF_TEST_MARKER: &[u8] = b"securepass-self-test";

/// Whether a session currently holds a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultState {
    Locked,
    Unlocked,
}

/// A vault session. Created unlocked by `Vault::enroll` or
/// `Vault::authenticate`; `logout` wipes the key and locks it for good.
#[derive(Debug, Default)]
pub struct Session {
    key: Option<DerivedKey>,
}

impl Session {
    /// A session that holds no key. Every record operation on it fails
    /// with `NotAuthenticated`.
    pub fn locked() -> Self {
        Self { key: None }
    }

    /// Wrap `key` after checking it can round-trip a known marker.
    pub(crate) fn unlock(key: DerivedKey) -> Result<Self> {
        self_test(&key)?;
        Ok(Self { key: Some(key) })
    }

    pub fn state(&self) -> VaultState {
        if self.key.is_some() {
            VaultState::Unlocked
        } else {
            VaultState::Locked
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.state() == VaultState::Unlocked
    }

    /// Serialize and encrypt a record under the session key.
    pub fn encrypt_record(&self, record: &Record) -> Result<Vec<u8>> {
        let key = self.key()?;
        let plaintext = Zeroizing::new(
            serde_json::to_vec(record)
                .map_err(|e| VaultError::SerializationError(format!("record: {e}")))?,
        );
        encrypt(key.as_bytes(), &plaintext)
    }

    /// Decrypt and parse a record produced by `encrypt_record`.
    pub fn decrypt_record(&self, ciphertext: &[u8]) -> Result<Record> {
        let key = self.key()?;
        let plaintext = Zeroizing::new(decrypt(key.as_bytes(), ciphertext)?);
        serde_json::from_slice(&plaintext)
            .map_err(|e| VaultError::SerializationError(format!("record: {e}")))
    }

    /// Overwrite and drop the key. Always succeeds, also when already locked.
    pub fn logout(&mut self) {
        if let Some(mut key) = self.key.take() {
            key.zeroize();
        }
    }

    pub(crate) fn key(&self) -> Result<&DerivedKey> {
        self.key.as_ref().ok_or(VaultError::NotAuthenticated)
    }

    /// Swap in a new key; the old one is zeroized as it drops.
    pub(crate) fn replace_key(&mut self, key: DerivedKey) {
        self.key = Some(key);
    }
}

fn self_test(key: &DerivedKey) -> Result<()> {
    let sealed = encrypt(key.as_bytes(), SELF_TEST_MARKER)
        .map_err(|e| VaultError::CorruptedState(format!("self-test encryption failed: {e}")))?;
    let opened = decrypt(key.as_bytes(), &sealed)
        .map_err(|_| VaultError::CorruptedState("self-test decryption failed".into()))?;

    if opened != SELF_TEST_MARKER {
        return Err(VaultError::CorruptedState(
            "self-test marker did not round-trip".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locked_session_refuses_record_operations() {
        let session = Session::locked();
        assert_eq!(session.state(), VaultState::Locked);

        let record = Record::new("example.com", "alice", "p@ss");
        assert!(matches!(
            session.encrypt_record(&record),
            Err(VaultError::NotAuthenticated)
        ));
        assert!(matches!(
            session.decrypt_record(&[0u8; 64]),
            Err(VaultError::NotAuthenticated)
        ));
    }

    #[test]
    fn unlocked_session_round_trips_records() {
        let session = Session::unlock(DerivedKey::new([0x42; 32])).unwrap();
        assert!(session.is_unlocked());

        let record = Record::new("example.com", "alice", "p@ss").with_notes("n");
        let sealed = session.encrypt_record(&record).unwrap();
        assert_eq!(session.decrypt_record(&sealed).unwrap(), record);
    }

    #[test]
    fn logout_locks_the_session() {
        let mut session = Session::unlock(DerivedKey::new([0x42; 32])).unwrap();
        let sealed = session
            .encrypt_record(&Record::new("a", "b", "c"))
            .unwrap();

        session.logout();
        assert_eq!(session.state(), VaultState::Locked);
        assert!(matches!(
            session.decrypt_record(&sealed),
            Err(VaultError::NotAuthenticated)
        ));

        // Logging out twice is fine.
        session.logout();
    }

    #[test]
    fn decrypt_with_other_key_is_authentication_failure() {
        let a = Session::unlock(DerivedKey::new([1; 32])).unwrap();
        let b = Session::unlock(DerivedKey::new([2; 32])).unwrap();

        let sealed = a.encrypt_record(&Record::new("a", "b", "c")).unwrap();
        assert!(matches!(
            b.decrypt_record(&sealed),
            Err(VaultError::AuthenticationFailure)
        ));
    }
}
