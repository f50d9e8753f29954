//! `securepass delete`: remove a credential from the vault.

use crate::cli::output;
use crate::cli::{confirm, unlock, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `delete` command.
pub fn execute(cli: &Cli, id: &str, force: bool) -> Result<()> {
    // Unless --force is set, ask for confirmation before deleting.
    if !force && !confirm(&format!("Delete credential '{id}'?"))? {
        output::info("Cancelled.");
        return Ok(());
    }

    let (vault, mut session) = unlock(cli)?;
    let deleted = vault.delete_record(&session, id)?;
    vault.logout(&mut session);

    if !deleted {
        return Err(VaultError::CommandFailed(format!("no entry with id '{id}'")));
    }
    output::success(&format!("Deleted credential {id}"));
    Ok(())
}
