//! Hydration coordinator
//!
//! A connector may carry a hydrator: a function from the component's input
//! props to a map of per-module seed values. Seeds are computed once per
//! activation and drive two things:
//!
//! - which module streams get gated on the `hydrated` marker, and
//! - which modules receive a `hydrate` call once the subscription is live.
//!
//! The controller always subscribes before pushing seeds, so the snapshot
//! produced by hydration is the first one that passes the gate.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde_json::Value;
use std::sync::Arc;

use crate::store::Store;
use crate::value::{ModuleName, Props};

/// Per-module seed values computed from props
pub type HydrationSeeds = IndexMap<ModuleName, Value>;

/// Computes hydration seeds from component props
pub type Hydrator = Arc<dyn Fn(&Props) -> HydrationSeeds + Send + Sync>;

/// Run the hydrator, if one is configured
pub fn compute_seeds(hydrator: Option<&Hydrator>, props: &Props) -> Option<HydrationSeeds> {
    hydrator.map(|h| h(props))
}

/// The seed for `module`, ignoring null seeds
pub fn seed_for<'a>(seeds: Option<&'a HydrationSeeds>, module: &str) -> Option<&'a Value> {
    seeds
        .and_then(|s| s.get(module))
        .filter(|seed| !seed.is_null())
}

/// Whether `module`'s stream must wait for the `hydrated` marker
pub fn is_seeded(seeds: Option<&HydrationSeeds>, module: &str) -> bool {
    seed_for(seeds, module).is_some()
}

/// Push seeds into the store, in module-list order
///
/// Seeds for modules that are not listed are ignored. A module listed twice
/// is hydrated once. Returns the modules that were hydrated.
pub fn push_seeds(
    store: &dyn Store,
    modules: &[ModuleName],
    seeds: Option<&HydrationSeeds>,
) -> Vec<ModuleName> {
    let mut seen = FxHashSet::default();
    let mut hydrated = Vec::new();

    for module in modules {
        if !seen.insert(module.as_str()) {
            continue;
        }
        if let Some(seed) = seed_for(seeds, module) {
            tracing::debug!(module = %module, "hydrating module");
            store.hydrate(module, seed.clone());
            hydrated.push(module.clone());
        }
    }
    hydrated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedStore;
    use crate::value::props;
    use serde_json::json;

    fn names(list: &[&str]) -> Vec<ModuleName> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_compute_seeds_from_props() {
        let hydrator: Hydrator = Arc::new(|p: &Props| {
            let initial = p
                .get("initialValue")
                .and_then(|v| v.as_value())
                .and_then(|v| v.as_i64())
                .unwrap_or(0);
            let mut seeds = HydrationSeeds::new();
            seeds.insert("fooModule".into(), json!({ "value": initial + 10 }));
            seeds
        });

        let seeds = compute_seeds(Some(&hydrator), &props([("initialValue", json!(32))])).unwrap();
        assert_eq!(seeds["fooModule"], json!({ "value": 42 }));
        assert!(compute_seeds(None, &Props::new()).is_none());
    }

    #[test]
    fn test_null_seed_is_absent() {
        let mut seeds = HydrationSeeds::new();
        seeds.insert("a".into(), Value::Null);
        seeds.insert("b".into(), json!({}));

        assert!(!is_seeded(Some(&seeds), "a"));
        assert!(is_seeded(Some(&seeds), "b"));
        assert!(!is_seeded(Some(&seeds), "c"));
        assert!(!is_seeded(None, "b"));
    }

    #[test]
    fn test_push_seeds_follows_module_order() {
        let store = ScriptedStore::new()
            .with_module("a", json!({}))
            .with_module("b", json!({}))
            .with_module("c", json!({}));

        let mut seeds = HydrationSeeds::new();
        seeds.insert("c".into(), json!({ "n": 3 }));
        seeds.insert("a".into(), json!({ "n": 1 }));
        seeds.insert("unlisted".into(), json!({ "n": 9 }));

        let hydrated = push_seeds(&store, &names(&["a", "b", "c", "a"]), Some(&seeds));

        assert_eq!(hydrated, names(&["a", "c"]));
        assert_eq!(store.calls(), vec!["hydrate:a", "hydrate:c"]);
        assert_eq!(store.state("a"), Some(json!({ "n": 1, "hydrated": true })));
    }
}
