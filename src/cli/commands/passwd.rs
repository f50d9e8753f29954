//! `securepass passwd`: change the master password.
//!
//! Authenticates with the current password, then derives a new salt,
//! key and verification hash and re-encrypts every entry under the new
//! key.

use crate::cli::output;
use crate::cli::{prompt_new_password, unlock, Cli, NEW_PASSWORD_ENV};
use crate::errors::Result;

/// Execute the `passwd` command.
pub fn execute(cli: &Cli) -> Result<()> {
    output::info("Enter your current master password.");
    let (mut vault, mut session) = unlock(cli)?;

    output::info("Choose your new master password.");
    let new_password = prompt_new_password(NEW_PASSWORD_ENV)?;

    let count = vault.change_passphrase(&mut session, &new_password)?;
    vault.logout(&mut session);

    output::success(&format!(
        "Master password changed ({count} credential(s) re-encrypted)"
    ));
    Ok(())
}
