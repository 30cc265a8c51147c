//! Module store
//!
//! A [`ModuleStore`] owns a set of named [`Module`]s. Each module's state
//! lives in a [`Relay`], so subscribers get the current snapshot on subscribe
//! and every later update.
//!
//! All mutations (dispatch, hydrate, clear) are serialized by a re-entrant
//! lock: calls from different threads run one at a time, while a subscriber
//! that dispatches from inside an emission runs immediately on the same
//! thread. Emissions happen outside the module registry lock.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use tether_core::{Action, Store};
//! use tether_store::{Module, ModuleStore};
//!
//! let store = ModuleStore::default()
//!     .with_module(
//!         "log",
//!         Module::new(json!([]), |state, action| {
//!             let mut items = state.as_array().cloned().unwrap_or_default();
//!             items.push(json!(action.kind));
//!             json!(items)
//!         })
//!         .accept(["@log/PUSH"]),
//!     )
//!     .unwrap();
//!
//! store.dispatch(Action::new("@log/PUSH"));
//! store.dispatch(Action::new("@other/IGNORED"));
//! assert_eq!(store.state("log"), Some(json!(["@@tether/INIT", "@log/PUSH"])));
//! ```

use indexmap::IndexMap;
use parking_lot::{ReentrantMutex, RwLock};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use tether_core::{Action, BindError, Relay, StateStream, Store};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::module::Module;

/// A registered module and its live state
struct ModuleSlot {
    module: Module,
    initial_state: Value,
    relay: Relay,
}

/// Modular reducer store implementing the tether store contract
pub struct ModuleStore {
    config: StoreConfig,
    modules: RwLock<IndexMap<String, Arc<ModuleSlot>>>,
    serial: ReentrantMutex<()>,
}

impl ModuleStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            modules: RwLock::new(IndexMap::new()),
            serial: ReentrantMutex::new(()),
        }
    }

    /// Register a module and return the store (builder style)
    pub fn with_module(self, name: &str, module: Module) -> Result<Self> {
        self.register(name, module)?;
        Ok(self)
    }

    /// Register a module under `name`
    pub fn register(&self, name: &str, module: Module) -> Result<()> {
        let mut modules = self.modules.write();
        if modules.contains_key(name) {
            return Err(StoreError::DuplicateModule(name.to_string()));
        }

        let initial_state = module.initial_state(&self.config.init_action);
        tracing::debug!(module = name, "registering module");
        modules.insert(
            name.to_string(),
            Arc::new(ModuleSlot {
                module,
                relay: Relay::new(initial_state.clone()),
                initial_state,
            }),
        );
        Ok(())
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Current state of a module
    pub fn state(&self, name: &str) -> Option<Value> {
        self.slot(name).map(|slot| slot.relay.get())
    }

    /// Registered module names, in registration order
    pub fn module_names(&self) -> Vec<String> {
        self.modules.read().keys().cloned().collect()
    }

    /// Number of live subscribers to a module
    pub fn listener_count(&self, name: &str) -> usize {
        self.slot(name)
            .map(|slot| slot.relay.listener_count())
            .unwrap_or(0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.modules.read().contains_key(name)
    }

    fn slot(&self, name: &str) -> Option<Arc<ModuleSlot>> {
        self.modules.read().get(name).cloned()
    }

    fn publish(&self, slot: &ModuleSlot, current: &Value, next: Value) {
        if self.config.emit_unchanged || next != *current {
            slot.relay.set(next);
        }
    }
}

impl Default for ModuleStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl Store for ModuleStore {
    fn state_stream(&self, module: &str) -> tether_core::Result<StateStream> {
        self.slot(module)
            .map(|slot| slot.relay.stream())
            .ok_or_else(|| BindError::UnknownModule(module.to_string()))
    }

    fn dispatch(&self, action: Action) {
        let _serial = self.serial.lock();
        tracing::trace!(kind = %action.kind, "dispatch");

        let targets: Vec<Arc<ModuleSlot>> = self
            .modules
            .read()
            .values()
            .filter(|slot| slot.module.accepts(&action))
            .cloned()
            .collect();

        for slot in targets {
            let current = slot.relay.get();
            let next = slot.module.reduce(&current, &action);
            self.publish(&slot, &current, next);
        }
    }

    fn hydrate(&self, module: &str, seed: Value) {
        let _serial = self.serial.lock();
        let Some(slot) = self.slot(module) else {
            tracing::warn!(module, "hydrate for unknown module ignored");
            return;
        };

        let current = slot.relay.get();
        let next = slot.module.hydrate(&current, seed);
        slot.relay.set(next);
    }

    fn clear_state(&self, module: &str) {
        let _serial = self.serial.lock();
        let Some(slot) = self.slot(module) else {
            tracing::warn!(module, "clear for unknown module ignored");
            return;
        };

        tracing::debug!(module, "clearing module state");
        slot.relay.set(slot.initial_state.clone());
    }
}

impl fmt::Debug for ModuleStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleStore")
            .field("config", &self.config)
            .field("modules", &self.module_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn counter() -> Module {
        Module::new(json!({ "n": 0 }), |state, action| {
            let n = state["n"].as_i64().unwrap_or(0);
            match action.kind.as_str() {
                "@count/INC" => json!({ "n": n + 1 }),
                _ => state.clone(),
            }
        })
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let store = ModuleStore::default().with_module("count", counter()).unwrap();
        let err = store.register("count", counter()).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateModule(name) if name == "count"));
        assert_eq!(store.module_names(), vec!["count".to_string()]);
    }

    #[test]
    fn test_dispatch_reduces_accepting_modules() {
        let store = ModuleStore::default()
            .with_module("one", counter().accept(["@count/INC"]))
            .unwrap()
            .with_module("two", counter().accept(["@other"]))
            .unwrap();

        store.dispatch(Action::new("@count/INC"));
        store.dispatch(Action::new("@count/INC"));

        assert_eq!(store.state("one"), Some(json!({ "n": 2 })));
        assert_eq!(store.state("two"), Some(json!({ "n": 0 })));
    }

    #[test]
    fn test_stream_unknown_module() {
        let store = ModuleStore::default();
        let err = store.state_stream("nope").unwrap_err();
        assert_eq!(err, BindError::UnknownModule("nope".into()));
    }

    #[test]
    fn test_emit_unchanged_toggle() {
        for (config, expected) in [(StoreConfig::default(), 3), (StoreConfig::quiet(), 2)] {
            let store = ModuleStore::new(config).with_module("count", counter()).unwrap();
            let seen = Arc::new(Mutex::new(0));
            let seen_clone = seen.clone();
            let _sub = store
                .state_stream("count")
                .unwrap()
                .subscribe(move |_| *seen_clone.lock().unwrap() += 1);

            store.dispatch(Action::new("@count/NOOP"));
            store.dispatch(Action::new("@count/INC"));

            assert_eq!(*seen.lock().unwrap(), expected);
        }
    }

    #[test]
    fn test_hydrate_and_clear() {
        let store = ModuleStore::default().with_module("count", counter()).unwrap();

        store.hydrate("count", json!({ "n": 41 }));
        assert_eq!(store.state("count"), Some(json!({ "n": 41, "hydrated": true })));

        store.dispatch(Action::new("@count/INC"));
        assert_eq!(store.state("count"), Some(json!({ "n": 42 })));

        store.clear_state("count");
        assert_eq!(store.state("count"), Some(json!({ "n": 0 })));
    }

    #[test]
    fn test_unknown_hydrate_and_clear_are_ignored() {
        let store = ModuleStore::default();
        store.hydrate("ghost", json!({}));
        store.clear_state("ghost");
        assert!(!store.contains("ghost"));
    }

    #[test]
    fn test_reentrant_dispatch() {
        let store = Arc::new(ModuleStore::default().with_module("count", counter()).unwrap());
        let inner = store.clone();

        let _sub = store.state_stream("count").unwrap().subscribe(move |state| {
            if state["n"] == json!(1) {
                inner.dispatch(Action::new("@count/INC"));
            }
        });

        store.dispatch(Action::new("@count/INC"));
        assert_eq!(store.state("count"), Some(json!({ "n": 2 })));
    }
}
