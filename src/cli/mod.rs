//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::errors::{Result, VaultError};
use crate::vault::{Session, Vault};

/// Minimum password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Environment variable consulted before prompting for the master password.
pub const PASSWORD_ENV: &str = "SECUREPASS_PASSWORD";

/// Environment variable consulted before prompting for a new master
/// password in `passwd`.
pub const NEW_PASSWORD_ENV: &str = "SECUREPASS_NEW_PASSWORD";

/// SecurePass CLI: local encrypted password vault.
#[derive(Parser)]
#[command(name = "securepass", about = "Local encrypted password vault", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Vault directory (default: .securepass)
    #[arg(long, env = "SECUREPASS_DIR", default_value = ".securepass", global = true)]
    pub vault_dir: String,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Create the vault and choose a master password
    Init,

    /// Add a credential (password is prompted or read from stdin)
    Add {
        /// Website or service name
        website: String,
        /// Account username
        username: String,
        /// Login URL
        #[arg(long, default_value = "")]
        url: String,
        /// Free-form notes
        #[arg(long, default_value = "")]
        notes: String,
    },

    /// List all credentials
    List {
        /// Print passwords in the table
        #[arg(long)]
        show_passwords: bool,
    },

    /// Show one credential, including its password
    Show {
        /// Entry id
        id: String,
    },

    /// Search credentials by website, username, or URL
    Search {
        /// Case-insensitive search term
        term: String,
        /// Print passwords in the table
        #[arg(long)]
        show_passwords: bool,
    },

    /// Change fields of an existing credential
    Update {
        /// Entry id
        id: String,
        #[arg(long)]
        website: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        /// Prompt for a new password
        #[arg(long)]
        password: bool,
    },

    /// Delete a credential
    Delete {
        /// Entry id
        id: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Change the master password (re-encrypts every entry)
    Passwd,

    /// Copy the encrypted container to a file
    Export {
        /// Destination path
        path: PathBuf,
    },

    /// Replace the container with a previously exported file
    Import {
        /// Path of the exported container
        path: PathBuf,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Read or change app, security, and ui settings
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(clap::Subcommand)]
pub enum ConfigAction {
    /// Print every setting
    List,

    /// Print one setting
    Get { section: String, key: String },

    /// Change one setting (`true`/`false` and integers are typed)
    Set {
        section: String,
        key: String,
        value: String,
    },

    /// Remove one setting
    Delete { section: String, key: String },

    /// Restore default settings (the master password is kept)
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the master password, trying `SECUREPASS_PASSWORD` first and then
/// an interactive prompt.
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(PASSWORD_ENV) {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter master password")
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation.
///
/// `env_var` is checked first for scripted/CI usage. Enforces a minimum
/// password length.
pub fn prompt_new_password(env_var: &str) -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var(env_var) {
        if !pw.is_empty() {
            if pw.chars().count() < MIN_PASSWORD_LEN {
                return Err(VaultError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| VaultError::CommandFailed(format!("password prompt: {e}")))?;

        if password.chars().count() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Ask a yes/no question, defaulting to "no".
pub fn confirm(prompt: &str) -> Result<bool> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| VaultError::CommandFailed(format!("confirm prompt: {e}")))
}

/// Resolve the vault directory from the CLI arguments.
///
/// Relative paths are taken from the current directory.
pub fn vault_dir(cli: &Cli) -> Result<PathBuf> {
    let dir = PathBuf::from(&cli.vault_dir);
    if dir.is_absolute() {
        Ok(dir)
    } else {
        Ok(std::env::current_dir()?.join(dir))
    }
}

/// Open the vault without unlocking it.
pub fn open_vault(cli: &Cli) -> Result<Vault> {
    Vault::open(&vault_dir(cli)?)
}

/// Open the vault and authenticate with the master password.
pub fn unlock(cli: &Cli) -> Result<(Vault, Session)> {
    let vault = open_vault(cli)?;
    if !vault.has_account() {
        return Err(VaultError::NoAccount);
    }
    let password = prompt_password()?;
    let session = vault.authenticate(&password)?;
    Ok((vault, session))
}
