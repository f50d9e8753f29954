//! `securepass export`: copy the encrypted container to a file.
//!
//! The export stays encrypted under the current master password; it is a
//! verbatim copy, not a plaintext dump.

use std::path::Path;

use crate::cli::output;
use crate::cli::{unlock, Cli};
use crate::errors::Result;

/// Execute the `export` command.
pub fn execute(cli: &Cli, dest: &Path) -> Result<()> {
    // Only someone who knows the master password may take a copy.
    let (vault, mut session) = unlock(cli)?;
    vault.logout(&mut session);

    vault.export(dest)?;

    output::success(&format!("Exported vault to {}", dest.display()));
    output::tip("The export can only be opened with the current master password.");
    Ok(())
}
