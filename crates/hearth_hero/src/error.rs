//! Error types for hearth_hero

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the configuration boundary
#[derive(Error, Debug)]
pub enum HeroError {
    /// Failed to read or write a configuration file
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML for this schema
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration could not be rendered back to TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Configuration parsed but holds values the engine cannot run with
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for hearth_hero operations
pub type Result<T> = std::result::Result<T, HeroError>;
