//! Store contract
//!
//! The binding layer never owns state. It talks to a modular store through
//! the [`Store`] trait: one state stream per named module, a dispatch
//! operation, and the two lifecycle hooks a connector needs (`hydrate` to seed
//! a module from component props, `clear_state` to reset it on unmount).
//!
//! Stores are shared across any number of mounted components as
//! [`SharedStore`]. Implementations are responsible for serializing
//! concurrent calls; the binding layer calls them without external locking.
//!
//! There is no ambient lookup. A component factory receives a store either
//! when it is configured or through an explicit [`StoreContext`] at mount.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::stream::StateStream;
use crate::value::Action;

/// Operations a store must offer to be bound to components
pub trait Store: Send + Sync {
    /// Stream of a module's state: current snapshot, then every update
    ///
    /// Returns [`BindError::UnknownModule`](crate::BindError::UnknownModule)
    /// if the store has no such module.
    fn state_stream(&self, module: &str) -> Result<StateStream>;

    /// Dispatch an action to every module that accepts it
    fn dispatch(&self, action: Action);

    /// Seed a module's state
    fn hydrate(&self, module: &str, seed: Value);

    /// Reset a module to its initial state
    fn clear_state(&self, module: &str);
}

/// A store shared between connectors
pub type SharedStore = Arc<dyn Store>;

// =============================================================================
// DISPATCHER
// =============================================================================

/// Cloneable handle to a store's dispatch operation
///
/// This is what dispatch projections receive; it exposes dispatch and
/// nothing else of the store.
#[derive(Clone)]
pub struct Dispatcher {
    store: SharedStore,
}

impl Dispatcher {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Dispatch an action
    pub fn dispatch(&self, action: Action) {
        self.store.dispatch(action);
    }

    /// Dispatch an action with no payload
    pub fn dispatch_kind(&self, kind: &str) {
        self.store.dispatch(Action::new(kind));
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Dispatcher(..)")
    }
}

// =============================================================================
// STORE CONTEXT
// =============================================================================

/// Explicit default-store provider passed to [`Connected::mount`]
///
/// A connector configured with its own store ignores the context.
///
/// [`Connected::mount`]: crate::component::Connected::mount
#[derive(Clone, Default)]
pub struct StoreContext {
    store: Option<SharedStore>,
}

impl StoreContext {
    /// A context providing `store`
    pub fn new(store: SharedStore) -> Self {
        Self { store: Some(store) }
    }

    /// A context providing nothing
    pub fn empty() -> Self {
        Self::default()
    }

    /// The provided store, if any
    pub fn store(&self) -> Option<&SharedStore> {
        self.store.as_ref()
    }
}

impl fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreContext")
            .field("has_store", &self.store.is_some())
            .finish()
    }
}

/// Pick the explicitly configured store, falling back to the context
pub fn resolve_store(explicit: Option<&SharedStore>, context: &StoreContext) -> Option<SharedStore> {
    explicit.or_else(|| context.store()).cloned()
}
