//! Small sectioned settings persisted next to the vault.

pub mod store;

pub use store::ConfigStore;
