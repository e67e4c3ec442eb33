//! JSON-backed behavior tables.
//!
//! Reply patterns, bad words and welcome templates are loaded once at
//! startup from files under the configured data directory. Loading
//! fails closed: a missing or malformed file logs a warning and yields
//! an empty table, never an error in the hot path.

mod badwords;
mod replies;
mod welcome;

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

pub use badwords::BadWordSet;
pub use replies::{ReplyPattern, ReplyTable};
pub use welcome::WelcomeTemplates;

/// Why a table file could not be loaded.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Read and deserialize a JSON table file.
pub(crate) fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, TableError> {
    let raw = std::fs::read_to_string(path).map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&raw).map_err(|source| TableError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
