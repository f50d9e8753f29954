//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{DecryptedRecord, RecordList};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Warn about anything a listing had to leave out.
pub fn report_listing_problems(list: &RecordList) {
    if let Some(e) = &list.load_error {
        warning(&format!("Could not read the vault container: {e}"));
    }
    if list.skipped > 0 {
        warning(&format!(
            "{} entr{} could not be decrypted and were skipped.",
            list.skipped,
            if list.skipped == 1 { "y" } else { "ies" }
        ));
    }
}

/// Print a table of credentials (Id, Website, Username, [Password], URL, Modified).
pub fn print_records_table(records: &[DecryptedRecord], show_passwords: bool) {
    if records.is_empty() {
        info("No credentials to show.");
        tip("Run `securepass add <WEBSITE> <USERNAME>` to add one.");
        return;
    }

    let mut header = vec!["Id", "Website", "Username"];
    if show_passwords {
        header.push("Password");
    }
    header.extend(["URL", "Modified"]);

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header);

    for r in records {
        let mut row = vec![
            r.id.clone(),
            r.record.website.clone(),
            r.record.username.clone(),
        ];
        if show_passwords {
            row.push(r.record.password.clone());
        }
        row.push(r.record.url.clone());
        row.push(r.modified.format("%Y-%m-%d %H:%M:%S").to_string());
        table.add_row(row);
    }

    println!("{table}");
}

/// Print every field of one credential.
pub fn print_record(r: &DecryptedRecord) {
    println!("{:<10} {}", style("id").dim(), r.id);
    println!("{:<10} {}", style("website").dim(), r.record.website);
    println!("{:<10} {}", style("username").dim(), r.record.username);
    println!("{:<10} {}", style("password").dim(), r.record.password);
    println!("{:<10} {}", style("url").dim(), r.record.url);
    println!("{:<10} {}", style("notes").dim(), r.record.notes);
    println!(
        "{:<10} {}",
        style("created").dim(),
        r.created.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "{:<10} {}",
        style("modified").dim(),
        r.modified.format("%Y-%m-%d %H:%M:%S")
    );
}
