//! Error types for tether_store

use thiserror::Error;

/// Errors that can occur while configuring a module store
#[derive(Error, Debug)]
pub enum StoreError {
    /// A module with this name is already registered
    #[error("module already registered: {0}")]
    DuplicateModule(String),

    /// The store configuration could not be parsed
    #[error("invalid store configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for tether_store operations
pub type Result<T> = std::result::Result<T, StoreError>;
