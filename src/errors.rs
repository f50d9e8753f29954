use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in SecurePass.
#[derive(Debug, Error)]
pub enum VaultError {
    // --- Session / account errors ---
    #[error("An account is already enrolled in this vault")]
    AlreadyEnrolled,

    #[error("No account found — run `securepass init` first")]
    NoAccount,

    #[error("Invalid master password")]
    InvalidCredentials,

    #[error("Vault state is corrupted: {0}")]
    CorruptedState(String),

    #[error("Vault is locked — authenticate first")]
    NotAuthenticated,

    // --- Crypto errors ---
    #[error("Authentication failed — wrong key, corrupted data, or tampering")]
    AuthenticationFailure,

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("No container found at {0}")]
    ContainerNotFound(PathBuf),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("User cancelled operation")]
    UserCancelled,
}

/// Convenience type alias for SecurePass results.
pub type Result<T> = std::result::Result<T, VaultError>;
