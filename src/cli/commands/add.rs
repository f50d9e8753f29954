//! `securepass add`: store a new credential.

use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{unlock, Cli};
use crate::errors::{Result, VaultError};
use crate::vault::Record;

/// Execute the `add` command.
pub fn execute(cli: &Cli, website: &str, username: &str, url: &str, notes: &str) -> Result<()> {
    let (vault, mut session) = unlock(cli)?;

    let password = read_entry_password(website)?;
    let record = Record::new(website, username, &password)
        .with_url(url)
        .with_notes(notes);

    let id = vault.save_record(&session, &record)?;
    vault.logout(&mut session);

    output::success(&format!("Saved credential for '{website}' ({id})"));
    Ok(())
}

/// Read the credential's password from stdin when piped, otherwise
/// prompt for it.
pub(crate) fn read_entry_password(website: &str) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        let trimmed = Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string());
        if trimmed.is_empty() {
            return Err(VaultError::CommandFailed(
                "no password given on stdin".into(),
            ));
        }
        return Ok(trimmed);
    }

    let pw = dialoguer::Password::new()
        .with_prompt(format!("Password for {website}"))
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}
