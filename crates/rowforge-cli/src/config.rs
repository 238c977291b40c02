use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use rowforge_generate::RowCounts;

/// Row-count configuration file.
///
/// ```toml
/// [counts]
/// "Example/User" = 5
/// "Example/Role" = 25
/// ```
#[derive(Debug, Deserialize)]
struct CountsFile {
    #[serde(default)]
    counts: BTreeMap<String, u64>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Load per-entity row counts from a TOML file.
pub fn load_counts(path: &Path) -> Result<RowCounts, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let file: CountsFile = toml::from_str(&contents)?;
    Ok(RowCounts {
        counts: file.counts,
    })
}
