//! Clear-on-unmount policy

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::value::ModuleName;

/// Which modules a connector resets when its component unmounts
///
/// Deserializes from a boolean (`true` = all, `false` = none) or from a
/// table of per-module booleans. Modules missing from the table are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PolicyRepr", into = "PolicyRepr")]
pub enum ClearPolicy {
    /// Clear every subscribed module
    #[default]
    All,
    /// Clear nothing
    Never,
    /// Clear exactly the modules mapped to `true`
    Modules(IndexMap<ModuleName, bool>),
}

impl ClearPolicy {
    /// Whether `module` should be cleared
    pub fn clears(&self, module: &str) -> bool {
        match self {
            ClearPolicy::All => true,
            ClearPolicy::Never => false,
            ClearPolicy::Modules(map) => map.get(module).copied().unwrap_or(false),
        }
    }

    /// Modules to clear, in module-list order, each at most once
    pub fn select<'a>(&self, modules: &'a [ModuleName]) -> Vec<&'a str> {
        let mut seen = FxHashSet::default();
        modules
            .iter()
            .map(String::as_str)
            .filter(|m| self.clears(m) && seen.insert(*m))
            .collect()
    }
}

impl From<bool> for ClearPolicy {
    fn from(clear: bool) -> Self {
        if clear {
            ClearPolicy::All
        } else {
            ClearPolicy::Never
        }
    }
}

impl From<IndexMap<ModuleName, bool>> for ClearPolicy {
    fn from(map: IndexMap<ModuleName, bool>) -> Self {
        ClearPolicy::Modules(map)
    }
}

impl<const N: usize> From<[(&str, bool); N]> for ClearPolicy {
    fn from(entries: [(&str, bool); N]) -> Self {
        ClearPolicy::Modules(entries.iter().map(|(k, v)| (k.to_string(), *v)).collect())
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PolicyRepr {
    Flag(bool),
    Modules(IndexMap<ModuleName, bool>),
}

impl From<PolicyRepr> for ClearPolicy {
    fn from(repr: PolicyRepr) -> Self {
        match repr {
            PolicyRepr::Flag(flag) => flag.into(),
            PolicyRepr::Modules(map) => map.into(),
        }
    }
}

impl From<ClearPolicy> for PolicyRepr {
    fn from(policy: ClearPolicy) -> Self {
        match policy {
            ClearPolicy::All => PolicyRepr::Flag(true),
            ClearPolicy::Never => PolicyRepr::Flag(false),
            ClearPolicy::Modules(map) => PolicyRepr::Modules(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    fn names(list: &[&str]) -> Vec<ModuleName> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_select() {
        let modules = names(&["a", "b", "c"]);

        assert_eq!(ClearPolicy::All.select(&modules), vec!["a", "b", "c"]);
        assert!(ClearPolicy::Never.select(&modules).is_empty());
        assert_eq!(
            ClearPolicy::from([("c", true), ("a", true), ("b", false)]).select(&modules),
            vec!["a", "c"]
        );
        assert_eq!(ClearPolicy::from([("b", true)]).select(&modules), vec!["b"]);
    }

    #[test]
    fn test_select_dedupes() {
        let modules = names(&["a", "b", "a"]);
        assert_eq!(ClearPolicy::All.select(&modules), vec!["a", "b"]);
    }

    #[test]
    fn test_deserialize_from_toml() {
        #[derive(Deserialize)]
        struct Binding {
            clear_on_unmount: ClearPolicy,
        }

        let all: Binding = toml::from_str("clear_on_unmount = true").unwrap();
        assert_eq!(all.clear_on_unmount, ClearPolicy::All);

        let never: Binding = toml::from_str("clear_on_unmount = false").unwrap();
        assert_eq!(never.clear_on_unmount, ClearPolicy::Never);

        let some: Binding =
            toml::from_str("[clear_on_unmount]\nmoduleOne = true\nmoduleTwo = false").unwrap();
        assert!(some.clear_on_unmount.clears("moduleOne"));
        assert!(!some.clear_on_unmount.clears("moduleTwo"));
        assert!(!some.clear_on_unmount.clears("moduleThree"));
    }

    #[test]
    fn test_serialize_roundtrips_through_flag() {
        let value = serde_json::to_value(ClearPolicy::Never).unwrap();
        assert_eq!(value, serde_json::json!(false));
    }
}
