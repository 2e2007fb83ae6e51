use thiserror::Error;

use crate::catalog::Namespace;
use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Store failures are passed through as-is.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("setting '{name}' has invalid value '{value}'")]
    InvalidSetting { name: String, value: String },

    #[error("namespace '{namespace}' has no region zone table")]
    NoZoneTable { namespace: Namespace },

    #[error("could not attach '{path}' as the knowledge database: {error}")]
    Attach { path: String, error: rusqlite::Error },
}
