//! Store configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Action kind every module is reduced with when it is registered or cleared
pub const DEFAULT_INIT_ACTION: &str = "@@tether/INIT";

/// Configuration for a [`ModuleStore`](crate::ModuleStore)
///
/// ```toml
/// init_action = "@@app/INIT"
/// emit_unchanged = false
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Action kind used to compute each module's initial state
    pub init_action: String,
    /// Emit after every accepted action, even when the reduced state is equal
    pub emit_unchanged: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            init_action: DEFAULT_INIT_ACTION.to_string(),
            emit_unchanged: true,
        }
    }
}

impl StoreConfig {
    /// Parse a configuration from TOML; missing fields take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Only emit when a reduction changes the state
    pub fn quiet() -> Self {
        Self {
            emit_unchanged: false,
            ..Self::default()
        }
    }
}
