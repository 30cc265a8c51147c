//! Tether Store
//!
//! A modular reducer store implementing [`tether_core::Store`]:
//!
//! - **Modules**: named state units with a reducer and an action filter
//! - **Hydration**: seeds merged into module state and marked `hydrated`
//! - **Clear**: modules reset to their initial state on demand
//! - **Configuration**: [`StoreConfig`], loadable from TOML

pub mod config;
pub mod error;
pub mod module;
pub mod store;

#[cfg(test)]
mod tests;

pub use config::{StoreConfig, DEFAULT_INIT_ACTION};
pub use error::{Result, StoreError};
pub use module::{merge_seed, HydrateReducer, Module, Reducer};
pub use store::ModuleStore;
