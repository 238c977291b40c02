use thiserror::Error;

/// Core error type shared across Rowforge crates.
#[derive(Debug, Error)]
pub enum Error {
    /// The schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
    /// The definition document is structurally broken.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),
    /// The dependency graph could not be linearized.
    #[error("cyclic dependencies between entities: {0}")]
    CyclicDependencies(String),
    /// Failure reading a definition file.
    #[error("io error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// Failure parsing a YAML definition document.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience alias for results returned by Rowforge crates.
pub type Result<T> = std::result::Result<T, Error>;
