//! Error types for tether_core

use thiserror::Error;

use crate::controller::Phase;

/// Errors that can occur while binding a component to a store
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    /// No store was given to the connector and none was found in the context
    #[error(
        "no store was provided to the connector or found in the context of \"{component}\"; \
         pass a store to the connector or mount with a StoreContext that carries one"
    )]
    MissingStore {
        /// Display name of the connected component
        component: String,
    },

    /// The store has no module with this name
    #[error("unknown store module: {0}")]
    UnknownModule(String),

    /// A lifecycle operation was requested in a phase that does not allow it
    #[error("cannot {operation} a controller in the {from:?} phase")]
    InvalidTransition {
        from: Phase,
        operation: &'static str,
    },
}

/// Result type for tether_core operations
pub type Result<T> = std::result::Result<T, BindError>;
