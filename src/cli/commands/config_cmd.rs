//! `securepass config`: read or change pass-through settings.
//!
//! The `auth` section belongs to the vault and cannot be edited here.

use toml::Value;

use crate::cli::output;
use crate::cli::{confirm, open_vault, unlock, Cli, ConfigAction};
use crate::config::store::AUTH_SECTION;
use crate::errors::{Result, VaultError};

/// Execute a `config` subcommand.
pub fn execute(cli: &Cli, action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::List => {
            let vault = open_vault(cli)?;
            let mut all = vault.config().get_all();
            all.remove(AUTH_SECTION);
            let rendered = toml::to_string_pretty(&all)
                .map_err(|e| VaultError::ConfigError(format!("render config: {e}")))?;
            print!("{rendered}");
            Ok(())
        }
        ConfigAction::Get { section, key } => {
            guard_section(section)?;
            let vault = open_vault(cli)?;
            match vault.config().lookup(section, key) {
                Some(value) => {
                    println!("{}", display_value(value));
                    Ok(())
                }
                None => Err(VaultError::ConfigError(format!(
                    "no setting '{section}.{key}'"
                ))),
            }
        }
        ConfigAction::Set {
            section,
            key,
            value,
        } => {
            guard_section(section)?;
            let mut vault = open_vault(cli)?;
            vault.config_mut().set(section, key, parse_value(value))?;
            output::success(&format!("Set {section}.{key}"));
            Ok(())
        }
        ConfigAction::Delete { section, key } => {
            guard_section(section)?;
            let mut vault = open_vault(cli)?;
            if vault.config_mut().delete(section, key)? {
                output::success(&format!("Removed {section}.{key}"));
                Ok(())
            } else {
                Err(VaultError::ConfigError(format!(
                    "no setting '{section}.{key}'"
                )))
            }
        }
        ConfigAction::Reset { force } => {
            if !force && !confirm("Reset all settings to their defaults?")? {
                output::info("Cancelled.");
                return Ok(());
            }
            let (mut vault, mut session) = unlock(cli)?;
            vault.logout(&mut session);

            vault.config_mut().reset_keeping(&[AUTH_SECTION])?;

            output::success("Settings restored to defaults.");
            Ok(())
        }
    }
}

fn guard_section(section: &str) -> Result<()> {
    if section == AUTH_SECTION {
        return Err(VaultError::ConfigError(
            "the auth section is managed by the vault".into(),
        ));
    }
    Ok(())
}

/// Interpret a command-line value: booleans and integers are typed,
/// anything else is a string.
fn parse_value(raw: &str) -> Value {
    match raw {
        "true" => Value::Boolean(true),
        "false" => Value::Boolean(false),
        _ => raw
            .parse::<i64>()
            .map_or_else(|_| Value::String(raw.to_string()), Value::Integer),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
