//! `securepass update`: change fields of an existing credential.

use crate::cli::commands::add::read_entry_password;
use crate::cli::output;
use crate::cli::{unlock, Cli};
use crate::errors::{Result, VaultError};

/// Field changes requested on the command line.
pub struct Changes<'a> {
    pub website: Option<&'a str>,
    pub username: Option<&'a str>,
    pub url: Option<&'a str>,
    pub notes: Option<&'a str>,
    pub password: bool,
}

/// Execute the `update` command.
pub fn execute(cli: &Cli, id: &str, changes: &Changes<'_>) -> Result<()> {
    let (vault, mut session) = unlock(cli)?;

    let Some(existing) = vault.get_record(&session, id)? else {
        return Err(VaultError::CommandFailed(format!("no entry with id '{id}'")));
    };

    let mut record = existing.record.clone();
    if let Some(website) = changes.website {
        record.website = website.to_string();
    }
    if let Some(username) = changes.username {
        record.username = username.to_string();
    }
    if let Some(url) = changes.url {
        record.url = url.to_string();
    }
    if let Some(notes) = changes.notes {
        record.notes = notes.to_string();
    }
    if changes.password {
        record.password = read_entry_password(&record.website)?.to_string();
    }

    if record == existing.record {
        output::info("Nothing to change.");
        vault.logout(&mut session);
        return Ok(());
    }

    let updated = vault.update_record(&session, id, &record)?;
    vault.logout(&mut session);

    if !updated {
        return Err(VaultError::CommandFailed(format!(
            "entry '{id}' disappeared before it could be updated"
        )));
    }
    output::success(&format!("Updated credential {id}"));
    Ok(())
}
