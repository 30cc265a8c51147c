//! Dynamic values flowing between stores and components
//!
//! Store state is dynamically shaped, so snapshots, seeds and action payloads
//! are all [`serde_json::Value`]. Component inputs are [`Props`]: an ordered
//! map whose entries are either plain data or callable [`Handler`]s (the
//! latter is how dispatch projections expose store actions to a component).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Object field a module sets to `true` once it has been hydrated
pub const HYDRATED_KEY: &str = "hydrated";

/// Name of one addressable unit of store state
pub type ModuleName = String;

/// Component input properties, in insertion order
pub type Props = IndexMap<String, Prop>;

/// Returns true when a snapshot carries `"hydrated": true`
pub fn is_hydrated(snapshot: &Value) -> bool {
    matches!(snapshot.get(HYDRATED_KEY), Some(Value::Bool(true)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Actions
// ─────────────────────────────────────────────────────────────────────────────

/// An action dispatched to a store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Action kind, e.g. `"@counter/INCREMENT"`
    #[serde(rename = "type")]
    pub kind: String,
    /// Optional payload
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub payload: Value,
}

impl Action {
    /// Create an action with no payload
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: Value::Null,
        }
    }

    /// Attach a payload
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Check the action kind
    pub fn is(&self, kind: &str) -> bool {
        self.kind == kind
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Props
// ─────────────────────────────────────────────────────────────────────────────

/// A callable property (e.g. an event handler produced by a dispatch projection)
#[derive(Clone)]
pub struct Handler(Arc<dyn Fn(Value) + Send + Sync>);

impl Handler {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// Invoke the handler with an argument
    pub fn call(&self, arg: Value) {
        (self.0)(arg)
    }

    /// Invoke the handler with no argument
    pub fn invoke(&self) {
        (self.0)(Value::Null)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler(..)")
    }
}

/// One component property
#[derive(Clone, Debug)]
pub enum Prop {
    Value(Value),
    Handler(Handler),
}

impl Prop {
    /// The data value, if this is not a handler
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Prop::Value(v) => Some(v),
            Prop::Handler(_) => None,
        }
    }

    /// The handler, if this is one
    pub fn as_handler(&self) -> Option<&Handler> {
        match self {
            Prop::Handler(h) => Some(h),
            Prop::Value(_) => None,
        }
    }
}

impl From<Value> for Prop {
    fn from(value: Value) -> Self {
        Prop::Value(value)
    }
}

impl From<Handler> for Prop {
    fn from(handler: Handler) -> Self {
        Prop::Handler(handler)
    }
}

/// Build [`Props`] from data key/value pairs
pub fn props<K, I>(entries: I) -> Props
where
    K: Into<String>,
    I: IntoIterator<Item = (K, Value)>,
{
    entries
        .into_iter()
        .map(|(k, v)| (k.into(), Prop::Value(v)))
        .collect()
}

/// Merge projected view-state, input props and dispatch props for rendering
///
/// Later layers win on key collision: dispatch props over input props over
/// view-state. Only an object view-state contributes keys.
pub fn merge_props(view_state: Option<&Value>, input: &Props, dispatch: &Props) -> Props {
    let mut merged = Props::new();

    match view_state {
        Some(Value::Object(fields)) => {
            for (k, v) in fields {
                merged.insert(k.clone(), Prop::Value(v.clone()));
            }
        }
        Some(other) => {
            tracing::debug!("non-object view state contributes no props: {}", other);
        }
        None => {}
    }

    for (k, v) in input.iter().chain(dispatch.iter()) {
        merged.insert(k.clone(), v.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[test]
    fn test_hydrated_marker() {
        assert!(is_hydrated(&json!({ "hydrated": true, "value": 1 })));
        assert!(!is_hydrated(&json!({ "hydrated": false })));
        assert!(!is_hydrated(&json!({ "hydrated": "yes" })));
        assert!(!is_hydrated(&json!({ "value": 1 })));
        assert!(!is_hydrated(&json!([true])));
    }

    #[test]
    fn test_action_serializes_kind_as_type() {
        let action = Action::new("@test/FOO");
        assert_eq!(serde_json::to_value(&action).unwrap(), json!({ "type": "@test/FOO" }));

        let parsed: Action =
            serde_json::from_value(json!({ "type": "@test/BAR", "payload": 3 })).unwrap();
        assert!(parsed.is("@test/BAR"));
        assert_eq!(parsed.payload, json!(3));
    }

    #[test]
    fn test_merge_precedence() {
        let calls = Arc::new(AtomicI32::new(0));
        let calls_clone = calls.clone();

        let view = json!({ "a": 1, "b": 1, "c": 1 });
        let input = props([("b", json!(2)), ("c", json!(2))]);
        let mut dispatch = Props::new();
        dispatch.insert(
            "c".into(),
            Prop::Handler(Handler::new(move |_| {
                calls_clone.fetch_add(1, Ordering::SeqCst);
            })),
        );

        let merged = merge_props(Some(&view), &input, &dispatch);
        assert_eq!(merged["a"].as_value(), Some(&json!(1)));
        assert_eq!(merged["b"].as_value(), Some(&json!(2)));

        merged["c"].as_handler().unwrap().invoke();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_merge_ignores_non_object_view_state() {
        let input = props([("x", json!(true))]);
        let merged = merge_props(Some(&json!(42)), &input, &Props::new());
        assert_eq!(merged.len(), 1);

        let merged = merge_props(None, &input, &Props::new());
        assert_eq!(merged.len(), 1);
    }
}
