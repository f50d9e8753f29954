//! `securepass list` and `securepass search`: show credentials in a table.

use crate::cli::output;
use crate::cli::{unlock, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, show_passwords: bool) -> Result<()> {
    let (vault, mut session) = unlock(cli)?;
    let list = vault.list_records(&session)?;
    vault.logout(&mut session);

    output::report_listing_problems(&list);
    output::info(&format!("{} credential(s)", list.len()));
    output::print_records_table(&list.records, show_passwords);

    Ok(())
}

/// Execute the `search` command.
pub fn execute_search(cli: &Cli, term: &str, show_passwords: bool) -> Result<()> {
    let (vault, mut session) = unlock(cli)?;
    let list = vault.search_records(&session, term)?;
    vault.logout(&mut session);

    output::report_listing_problems(&list);
    output::info(&format!("{} match(es) for '{term}'", list.len()));
    output::print_records_table(&list.records, show_passwords);

    Ok(())
}
