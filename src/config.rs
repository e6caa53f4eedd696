//! Seabook configuration.
//!
//! Loaded from `~/.seabook/config.toml`. A missing file means defaults.
//!
//! The database location is resolved through a chain:
//!
//! 1. `--db <path>` — explicit per-command override
//! 2. `SEABOOK_DB` env var — process/session level
//! 3. `database` in `~/.seabook/config.toml`
//! 4. `~/.seabook/seabook.sqlite`

use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::{Deserialize, Serialize};

use crate::storage::Storage;

/// Seabook configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Path to the record database.
    pub database: Option<PathBuf>,

    /// Log filter directive, e.g. `"seabook=debug"`.
    pub log_filter: Option<String>,
}

impl Config {
    /// Load config from `~/.seabook/config.toml`, or defaults if it's absent.
    pub fn load() -> Result<Self, String> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load config from a specific file, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.seabook/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".seabook").join("config.toml"))
    }

    /// Resolve the database path from the chain described in the module docs.
    pub fn database_path(&self, explicit: Option<&Path>) -> Result<PathBuf, String> {
        resolve_database(explicit, env::var_os("SEABOOK_DB").map(PathBuf::from), self)
    }
}

fn resolve_database(
    explicit: Option<&Path>,
    from_env: Option<PathBuf>,
    config: &Config,
) -> Result<PathBuf, String> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = from_env.filter(|p| !p.as_os_str().is_empty()) {
        return Ok(path);
    }
    if let Some(path) = &config.database {
        return Ok(path.clone());
    }
    Storage::default_path().ok_or_else(|| "could not determine home directory".to_string())
}
