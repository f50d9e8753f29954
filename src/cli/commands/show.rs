//! `securepass show`: print one credential.

use crate::cli::output;
use crate::cli::{unlock, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `show` command.
pub fn execute(cli: &Cli, id: &str) -> Result<()> {
    let (vault, mut session) = unlock(cli)?;
    let found = vault.get_record(&session, id)?;
    vault.logout(&mut session);

    match found {
        Some(record) => {
            output::print_record(&record);
            Ok(())
        }
        None => Err(VaultError::CommandFailed(format!("no entry with id '{id}'"))),
    }
}
