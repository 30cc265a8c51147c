//! End-to-end binding scenarios against the module store


use serde_json::{json, Value};
use std::sync::Arc;
use tether_core::{Component, Prop, Props, SharedStore, StoreContext};

use crate::{Module, ModuleStore};

/// Renders data props as a JSON object; handlers render as `"<handler>"`
pub(crate) struct Snapshot;

impl Component for Snapshot {
    type Output = Value;

    fn name(&self) -> &str {
        "Snapshot"
    }

    fn render(&self, props: &Props) -> Value {
        Value::Object(
            props
                .iter()
                .map(|(key, prop)| {
                    let value = match prop {
                        Prop::Value(v) => v.clone(),
                        Prop::Handler(_) => json!("<handler>"),
                    };
                    (key.clone(), value)
                })
                .collect(),
        )
    }
}

/// Module that appends the kind of every accepted action to a list
pub(crate) fn action_log(kind: &str) -> Module {
    Module::new(json!([]), |state, action| {
        let mut items = state.as_array().cloned().unwrap_or_default();
        items.push(json!(action.kind));
        Value::Array(items)
    })
    .accept([kind])
}

/// Module holding two numbers that `@test/DUBBLE` doubles
pub(crate) fn numbers() -> Module {
    Module::new(json!({ "a": 20, "b": 42 }), |state, action| {
        if !action.is("@test/DUBBLE") {
            return state.clone();
        }
        let a = state["a"].as_i64().unwrap_or(0);
        let b = state["b"].as_i64().unwrap_or(0);
        json!({ "a": a * 2, "b": b * 2 })
    })
}

pub(crate) fn context(store: &Arc<ModuleStore>) -> StoreContext {
    let shared: SharedStore = store.clone();
    StoreContext::new(shared)
}

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
