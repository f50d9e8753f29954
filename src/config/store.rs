use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};

use crate::errors::{Result, VaultError};
use crate::vault::format::write_atomic;

/// Section holding the enrollment salt and verification hash.
pub const AUTH_SECTION: &str = "auth";

/// Sectioned key/value configuration, loaded from `<dir>/config.toml`.
///
/// Holds the `auth` values the vault needs plus app, security and ui
/// settings that are passed through untouched. Every mutation rewrites
/// the whole file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    sections: Table,
}

// ── Defaults ─────────────────────────────────────────────────────────

fn section(entries: &[(&str, Value)]) -> Value {
    let mut table = Table::new();
    for (key, value) in entries {
        table.insert((*key).to_string(), value.clone());
    }
    Value::Table(table)
}

fn str_value(s: &str) -> Value {
    Value::String(s.to_string())
}

fn default_sections() -> Table {
    let mut sections = Table::new();
    sections.insert(
        "app".into(),
        section(&[
            ("version", str_value("1.0.0")),
            ("first_run", Value::Boolean(true)),
            ("theme", str_value("dark")),
            ("language", str_value("en")),
        ]),
    );
    sections.insert(
        "security".into(),
        section(&[
            ("clear_clipboard", Value::Boolean(true)),
            ("clipboard_timeout", Value::Integer(30)),
            ("auto_lock", Value::Boolean(true)),
            ("lock_timeout", Value::Integer(300)),
        ]),
    );
    sections.insert(
        "ui".into(),
        section(&[
            ("font_size", Value::Integer(12)),
            ("font_family", str_value("Segoe UI")),
            ("animations", Value::Boolean(true)),
        ]),
    );
    sections.insert(
        AUTH_SECTION.into(),
        section(&[("salt", str_value("")), ("password_hash", str_value(""))]),
    );
    sections
}

/// Fill in sections and keys missing from `loaded` without touching
/// anything already present.
fn merge_defaults(loaded: &mut Table) {
    for (name, default_section) in default_sections() {
        let Value::Table(defaults) = default_section else {
            continue;
        };
        match loaded.get_mut(&name) {
            Some(Value::Table(existing)) => {
                for (key, value) in defaults {
                    existing.entry(key).or_insert(value);
                }
            }
            Some(_) => {}
            None => {
                loaded.insert(name, Value::Table(defaults));
            }
        }
    }
}

// ── Implementation ───────────────────────────────────────────────────

impl ConfigStore {
    /// Name of the config file inside the vault directory.
    pub const FILE_NAME: &'static str = "config.toml";

    /// Load `<dir>/config.toml`, creating it with defaults if absent.
    ///
    /// An unparseable file is an error rather than being replaced, since
    /// replacing it would drop the enrollment salt and hash.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let path = dir.join(Self::FILE_NAME);

        if !path.exists() {
            tracing::info!("creating default config at {}", path.display());
            let store = Self {
                path,
                sections: default_sections(),
            };
            store.persist()?;
            return Ok(store);
        }

        let contents = fs::read_to_string(&path)?;
        let mut sections: Table = toml::from_str(&contents).map_err(|e| {
            VaultError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })?;
        merge_defaults(&mut sections);

        Ok(Self { path, sections })
    }

    /// Returns the path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Look up a value without a fallback.
    pub fn lookup(&self, section: &str, key: &str) -> Option<&Value> {
        self.sections.get(section)?.as_table()?.get(key)
    }

    /// Get a value, or `default` if the section or key is missing.
    pub fn get(&self, section: &str, key: &str, default: impl Into<Value>) -> Value {
        self.lookup(section, key)
            .cloned()
            .unwrap_or_else(|| default.into())
    }

    /// String value, or `default` if missing or not a string.
    pub fn get_str(&self, section: &str, key: &str, default: &str) -> String {
        self.lookup(section, key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_string()
    }

    /// Boolean value, or `default` if missing or not a boolean.
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.lookup(section, key)
            .and_then(Value::as_bool)
            .unwrap_or(default)
    }

    /// Integer value, or `default` if missing or not an integer.
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.lookup(section, key)
            .and_then(Value::as_integer)
            .unwrap_or(default)
    }

    /// Set a value, creating the section if needed, and persist.
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<Value>) -> Result<()> {
        let entry = self
            .sections
            .entry(section.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        if !entry.is_table() {
            *entry = Value::Table(Table::new());
        }
        if let Value::Table(table) = entry {
            table.insert(key.to_string(), value.into());
        }
        self.persist()
    }

    /// Remove a key. Returns `false` (and writes nothing) if it was absent.
    pub fn delete(&mut self, section: &str, key: &str) -> Result<bool> {
        let removed = match self.sections.get_mut(section) {
            Some(Value::Table(table)) => table.remove(key).is_some(),
            _ => false,
        };
        if removed {
            self.persist()?;
        }
        Ok(removed)
    }

    /// Replace everything, including `auth`, with the defaults.
    pub fn reset(&mut self) -> Result<()> {
        self.reset_keeping(&[])
    }

    /// Restore defaults for every section except those named in `keep`,
    /// which are carried over as they are. Written in a single persist.
    pub fn reset_keeping(&mut self, keep: &[&str]) -> Result<()> {
        tracing::info!(
            "resetting config at {} to defaults, keeping {keep:?}",
            self.path.display()
        );
        let mut sections = default_sections();
        for name in keep {
            if let Some(value) = self.sections.get(*name) {
                sections.insert((*name).to_string(), value.clone());
            }
        }
        let previous = std::mem::replace(&mut self.sections, sections);
        if let Err(e) = self.persist() {
            self.sections = previous;
            return Err(e);
        }
        Ok(())
    }

    /// Snapshot of every section.
    pub fn get_all(&self) -> Table {
        self.sections.clone()
    }

    /// `true` once both enrollment values are present and non-empty.
    pub fn has_account(&self) -> bool {
        !self.get_str(AUTH_SECTION, "salt", "").is_empty()
            && !self.get_str(AUTH_SECTION, "password_hash", "").is_empty()
    }

    fn persist(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.sections)
            .map_err(|e| VaultError::ConfigError(format!("Failed to serialize config: {e}")))?;
        write_atomic(&self.path, contents.as_bytes())
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn open_creates_file_with_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = ConfigStore::open(tmp.path()).unwrap();

        assert!(tmp.path().join("config.toml").exists());
        assert_eq!(config.get_str("app", "theme", "x"), "dark");
        assert_eq!(config.get_int("security", "clipboard_timeout", 0), 30);
        assert!(config.get_bool("ui", "animations", false));
        assert!(!config.has_account());
    }

    #[test]
    fn get_falls_back_to_default() {
        let tmp = TempDir::new().unwrap();
        let config = ConfigStore::open(tmp.path()).unwrap();

        assert_eq!(config.get("nope", "missing", 7), Value::Integer(7));
        assert_eq!(config.get_str("app", "missing", "fallback"), "fallback");
        assert_eq!(config.get("app", "language", "zz"), Value::from("en"));
    }

    #[test]
    fn set_creates_section_and_persists() {
        let tmp = TempDir::new().unwrap();
        let mut config = ConfigStore::open(tmp.path()).unwrap();
        config.set("plugins", "enabled", true).unwrap();

        let reopened = ConfigStore::open(tmp.path()).unwrap();
        assert!(reopened.get_bool("plugins", "enabled", false));
    }

    #[test]
    fn delete_reports_whether_key_existed() {
        let tmp = TempDir::new().unwrap();
        let mut config = ConfigStore::open(tmp.path()).unwrap();

        assert!(config.delete("app", "theme").unwrap());
        assert!(!config.delete("app", "theme").unwrap());
        assert!(!config.delete("nope", "theme").unwrap());

        let reopened = ConfigStore::open(tmp.path()).unwrap();
        assert!(reopened.lookup("app", "language").is_some());
    }

    #[test]
    fn reset_restores_defaults_and_clears_auth() {
        let tmp = TempDir::new().unwrap();
        let mut config = ConfigStore::open(tmp.path()).unwrap();
        config.set(AUTH_SECTION, "salt", "c2FsdA==").unwrap();
        config.set(AUTH_SECTION, "password_hash", "aGFzaA==").unwrap();
        config.set("app", "theme", "light").unwrap();
        assert!(config.has_account());

        config.reset().unwrap();
        assert!(!config.has_account());
        assert_eq!(config.get_str("app", "theme", ""), "dark");

        let reopened = ConfigStore::open(tmp.path()).unwrap();
        assert!(!reopened.has_account());
    }

    #[test]
    fn reset_keeping_auth_preserves_enrollment() {
        let tmp = TempDir::new().unwrap();
        let mut config = ConfigStore::open(tmp.path()).unwrap();
        config.set(AUTH_SECTION, "salt", "c2FsdA==").unwrap();
        config.set(AUTH_SECTION, "password_hash", "aGFzaA==").unwrap();
        config.set("app", "theme", "light").unwrap();
        config.set("plugins", "enabled", true).unwrap();

        config.reset_keeping(&[AUTH_SECTION]).unwrap();
        assert!(config.has_account());
        assert_eq!(config.get_str("app", "theme", ""), "dark");
        assert!(config.lookup("plugins", "enabled").is_none());

        let reopened = ConfigStore::open(tmp.path()).unwrap();
        assert!(reopened.has_account());
        assert_eq!(reopened.get_str(AUTH_SECTION, "salt", ""), "c2FsdA==");
        assert_eq!(reopened.get_str("app", "theme", ""), "dark");
    }

    #[test]
    fn unknown_settings_pass_through_unchanged() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("config.toml"),
            "[ui]\nfont_size = 18\ncustom = \"kept\"\n",
        )
        .unwrap();

        let mut config = ConfigStore::open(tmp.path()).unwrap();
        assert_eq!(config.get_int("ui", "font_size", 0), 18);
        assert_eq!(config.get_str("ui", "font_family", ""), "Segoe UI");

        config.set("app", "first_run", false).unwrap();
        let reopened = ConfigStore::open(tmp.path()).unwrap();
        assert_eq!(reopened.get_str("ui", "custom", ""), "kept");
        assert!(!reopened.get_bool("app", "first_run", true));
    }

    #[test]
    fn open_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "not valid {{toml").unwrap();

        let result = ConfigStore::open(tmp.path());
        assert!(matches!(result, Err(VaultError::ConfigError(_))));
    }
}
