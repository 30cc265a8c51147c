//! In-memory store that records every call it receives

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;

use crate::error::{BindError, Result};
use crate::store::Store;
use crate::stream::{Relay, StateStream, Subscription};
use crate::value::{Action, HYDRATED_KEY};

struct ScriptedModule {
    initial: Value,
    relay: Relay,
}

/// Store double for ordering and policy tests
///
/// Calls are logged as `"<op>:<module or action>"`, including stream
/// subscription (`subscribe:`) and release (`unsubscribe:`).
pub struct ScriptedStore {
    modules: FxHashMap<String, ScriptedModule>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl Default for ScriptedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self {
            modules: FxHashMap::default(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_module(mut self, name: &str, initial: Value) -> Self {
        self.modules.insert(
            name.to_string(),
            ScriptedModule {
                relay: Relay::new(initial.clone()),
                initial,
            },
        );
        self
    }

    /// Push a snapshot into a module's stream
    pub fn emit(&self, module: &str, value: Value) {
        if let Some(m) = self.modules.get(module) {
            m.relay.set(value);
        }
    }

    pub fn state(&self, module: &str) -> Option<Value> {
        self.modules.get(module).map(|m| m.relay.get())
    }

    pub fn listener_count(&self, module: &str) -> usize {
        self.modules
            .get(module)
            .map(|m| m.relay.listener_count())
            .unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.lock().push(call);
    }
}

impl Store for ScriptedStore {
    fn state_stream(&self, module: &str) -> Result<StateStream> {
        let m = self
            .modules
            .get(module)
            .ok_or_else(|| BindError::UnknownModule(module.to_string()))?;

        let source = m.relay.stream();
        let calls = self.calls.clone();
        let name = module.to_string();
        Ok(StateStream::new(move |sink| {
            calls.lock().push(format!("subscribe:{name}"));
            let inner = source.subscribe_sink(sink);
            Subscription::new(move || {
                inner.unsubscribe();
                calls.lock().push(format!("unsubscribe:{name}"));
            })
        }))
    }

    fn dispatch(&self, action: Action) {
        self.record(format!("dispatch:{}", action.kind));
    }

    fn hydrate(&self, module: &str, seed: Value) {
        self.record(format!("hydrate:{module}"));
        if let Some(m) = self.modules.get(module) {
            let mut next = seed;
            if let Value::Object(fields) = &mut next {
                fields.insert(HYDRATED_KEY.to_string(), Value::Bool(true));
            }
            m.relay.set(next);
        }
    }

    fn clear_state(&self, module: &str) {
        self.record(format!("clear:{module}"));
        if let Some(m) = self.modules.get(module) {
            m.relay.set(m.initial.clone());
        }
    }
}
