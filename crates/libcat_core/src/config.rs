//! Catalog configuration loaded from JSON plus environment overrides.
//!
//! ```json
//! {
//!   "db_path": "/var/lib/libcat/catalog.sqlite3",
//!   "log_level": "info",
//!   "log_dir": "/var/log/libcat",
//!   "delete_policies": { "author_books": "cascade", "student_books": "restrict" }
//! }
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use crate::logging::default_log_level;
use crate::model::DeletePolicy;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DB_PATH: &str = "LIBCAT_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "LIBCAT_LOG_LEVEL";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CatalogConfig {
    /// SQLite file; `None` opens a private in-memory catalog.
    pub db_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub delete_policies: DeletePolicies,
}

/// Policy applied to each assignment table when a referenced entity is deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeletePolicies {
    pub author_books: DeletePolicy,
    pub student_books: DeletePolicy,
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl CatalogConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reads `path` and applies process environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_json_str(&raw)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Applies `LIBCAT_DB_PATH` and `LIBCAT_LOG_LEVEL` when set and non-blank.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Same as `apply_env_overrides`, reading variables through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let present = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(db_path) = present(ENV_DB_PATH) {
            self.db_path = Some(PathBuf::from(db_path.trim()));
        }
        if let Some(level) = present(ENV_LOG_LEVEL) {
            self.log_level = Some(level.trim().to_string());
        }
    }

    /// Configured level, or the build-mode default.
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }
}
