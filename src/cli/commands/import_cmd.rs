//! `securepass import`: replace the container with an exported copy.

use std::path::Path;

use crate::cli::output;
use crate::cli::{confirm, unlock, Cli};
use crate::errors::{Result, VaultError};

/// Execute the `import` command.
pub fn execute(cli: &Cli, source: &Path, force: bool) -> Result<()> {
    if !source.exists() {
        return Err(VaultError::CommandFailed(format!(
            "import file not found: {}",
            source.display()
        )));
    }

    if !force
        && !confirm("Importing replaces every stored credential. A backup is kept. Continue?")?
    {
        output::info("Cancelled.");
        return Ok(());
    }

    let (vault, mut session) = unlock(cli)?;
    vault.import(source)?;

    // Entries exported under a different master password won't open.
    let list = vault.list_records(&session)?;
    vault.logout(&mut session);

    output::success(&format!(
        "Imported {} credential(s) from {}",
        list.len(),
        source.display()
    ));
    if list.skipped > 0 {
        output::warning(&format!(
            "{} imported entr{} cannot be decrypted with the current master password.",
            list.skipped,
            if list.skipped == 1 { "y" } else { "ies" }
        ));
    }
    output::tip(&format!(
        "The previous vault was saved to {}",
        vault.records().backup_path().display()
    ));
    Ok(())
}
