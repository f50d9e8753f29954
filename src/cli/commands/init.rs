//! `securepass init`: create the vault and enroll the master password.

use crate::cli::output;
use crate::cli::{open_vault, prompt_new_password, Cli, PASSWORD_ENV};
use crate::errors::{Result, VaultError};

/// Execute the `init` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let mut vault = open_vault(cli)?;

    if vault.has_account() {
        output::tip("Use `securepass passwd` to change the master password.");
        return Err(VaultError::AlreadyEnrolled);
    }

    let password = prompt_new_password(PASSWORD_ENV)?;
    let mut session = vault.enroll(&password)?;
    vault.logout(&mut session);

    output::success(&format!("Vault created at {}", vault.dir().display()));
    output::tip("Run `securepass add <WEBSITE> <USERNAME>` to store a credential.");
    output::tip("Run `securepass list` to see stored credentials.");

    Ok(())
}
