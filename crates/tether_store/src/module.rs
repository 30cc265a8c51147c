//! Store modules
//!
//! A module is one named unit of state: an initial value, a reducer, the set
//! of action kinds it reacts to, and how it absorbs a hydration seed.

use rustc_hash::FxHashSet;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

use tether_core::value::HYDRATED_KEY;
use tether_core::Action;

/// Computes a module's next state from its current state and an action
pub type Reducer = Arc<dyn Fn(&Value, &Action) -> Value + Send + Sync>;

/// Computes a module's state from its current state and a hydration seed
pub type HydrateReducer = Arc<dyn Fn(&Value, Value) -> Value + Send + Sync>;

/// Definition of one store module
#[derive(Clone)]
pub struct Module {
    initial: Value,
    reducer: Reducer,
    accepts: FxHashSet<String>,
    hydrate: Option<HydrateReducer>,
}

impl Module {
    /// A module starting from `initial`, reducing every action with `reducer`
    pub fn new<F>(initial: Value, reducer: F) -> Self
    where
        F: Fn(&Value, &Action) -> Value + Send + Sync + 'static,
    {
        Self {
            initial,
            reducer: Arc::new(reducer),
            accepts: FxHashSet::default(),
            hydrate: None,
        }
    }

    /// Only reduce actions of these kinds (the init action always passes)
    pub fn accept<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepts.extend(kinds.into_iter().map(Into::into));
        self
    }

    /// Replace the default hydration merge
    pub fn on_hydrate<F>(mut self, hydrate: F) -> Self
    where
        F: Fn(&Value, Value) -> Value + Send + Sync + 'static,
    {
        self.hydrate = Some(Arc::new(hydrate));
        self
    }

    /// Whether this module reduces `action`
    pub fn accepts(&self, action: &Action) -> bool {
        self.accepts.is_empty() || self.accepts.contains(&action.kind)
    }

    pub(crate) fn reduce(&self, state: &Value, action: &Action) -> Value {
        (self.reducer)(state, action)
    }

    /// State after reducing the init action over the initial value
    pub(crate) fn initial_state(&self, init_action: &str) -> Value {
        self.reduce(&self.initial, &Action::new(init_action))
    }

    pub(crate) fn hydrate(&self, state: &Value, seed: Value) -> Value {
        match &self.hydrate {
            Some(hydrate) => hydrate(state, seed),
            None => merge_seed(state, seed),
        }
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("initial", &self.initial)
            .field("accepts", &self.accepts)
            .field("custom_hydrate", &self.hydrate.is_some())
            .finish()
    }
}

/// Default hydration: shallow-merge an object seed over an object state and
/// mark the result hydrated
///
/// A non-object seed becomes `{"value": seed, "hydrated": true}`.
pub fn merge_seed(state: &Value, seed: Value) -> Value {
    let mut merged = match (state, seed) {
        (Value::Object(current), Value::Object(seed)) => {
            let mut fields = current.clone();
            fields.extend(seed);
            fields
        }
        (_, Value::Object(seed)) => seed,
        (_, other) => {
            let mut fields = Map::new();
            fields.insert("value".to_string(), other);
            fields
        }
    };
    merged.insert(HYDRATED_KEY.to_string(), Value::Bool(true));
    Value::Object(merged)
}
