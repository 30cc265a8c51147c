//! Binding descriptor
//!
//! A [`Connector`] describes how one component type is bound to a store:
//! which modules it reads, how their state is projected into props, which
//! dispatch props it gets, how it hydrates, and what it clears on unmount.
//!
//! Every configuration call consumes the connector and returns it, so a
//! connector is configured by value. [`Connector::build`] snapshots the
//! configuration into an immutable [`Binding`]; configuring the connector
//! further never changes factories that were already built.
//!
//! ```rust
//! use serde_json::{json, Value};
//! use tether_core::{Component, Connector, Props};
//!
//! struct Counter;
//!
//! impl Component for Counter {
//!     type Output = String;
//!
//!     fn name(&self) -> &str {
//!         "Counter"
//!     }
//!
//!     fn render(&self, props: &Props) -> String {
//!         format!("{:?}", props.get("count").and_then(|p| p.as_value()))
//!     }
//! }
//!
//! let connected = Connector::new(Counter)
//!     .with_state_from(["counter"])
//!     .map_state_to(|states: &[Value]| json!({ "count": states[0]["count"] }))
//!     .clear_state_on_unmount(false)
//!     .build();
//!
//! assert_eq!(connected.display_name(), "Connector(Counter)");
//! ```

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::combine::{identity, Projection};
use crate::component::{Component, Connected};
use crate::hydration::{HydrationSeeds, Hydrator};
use crate::policy::ClearPolicy;
use crate::store::{Dispatcher, SharedStore};
use crate::value::{ModuleName, Props};

/// Maps a store's dispatcher to dispatch props
pub type DispatchProjection = Arc<dyn Fn(Dispatcher) -> Props + Send + Sync>;

/// Immutable binding configuration shared by every instance of a factory
pub struct Binding {
    pub(crate) display_name: String,
    pub(crate) store: Option<SharedStore>,
    pub(crate) modules: Vec<ModuleName>,
    pub(crate) projection: Projection,
    pub(crate) dispatch_projection: Option<DispatchProjection>,
    pub(crate) hydrator: Option<Hydrator>,
    pub(crate) clear_policy: ClearPolicy,
}

impl Binding {
    /// `Connector(<component name>)`
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Subscribed modules, in declaration order
    pub fn modules(&self) -> &[ModuleName] {
        &self.modules
    }

    pub fn clear_policy(&self) -> &ClearPolicy {
        &self.clear_policy
    }

    /// Whether a store was configured explicitly
    pub fn has_store(&self) -> bool {
        self.store.is_some()
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("display_name", &self.display_name)
            .field("modules", &self.modules)
            .field("has_store", &self.store.is_some())
            .field("hydrates", &self.hydrator.is_some())
            .field("maps_dispatch", &self.dispatch_projection.is_some())
            .field("clear_policy", &self.clear_policy)
            .finish()
    }
}

/// Fluent builder for a [`Binding`]
pub struct Connector<C> {
    component: Arc<C>,
    store: Option<SharedStore>,
    modules: Vec<ModuleName>,
    projection: Option<Projection>,
    dispatch_projection: Option<DispatchProjection>,
    hydrator: Option<Hydrator>,
    clear_policy: ClearPolicy,
}

impl<C> Clone for Connector<C> {
    fn clone(&self) -> Self {
        Self {
            component: self.component.clone(),
            store: self.store.clone(),
            modules: self.modules.clone(),
            projection: self.projection.clone(),
            dispatch_projection: self.dispatch_projection.clone(),
            hydrator: self.hydrator.clone(),
            clear_policy: self.clear_policy.clone(),
        }
    }
}

impl<C: Component> Connector<C> {
    /// Bind `component`; the store comes from the mount context
    pub fn new(component: C) -> Self {
        Self {
            component: Arc::new(component),
            store: None,
            modules: Vec::new(),
            projection: None,
            dispatch_projection: None,
            hydrator: None,
            clear_policy: ClearPolicy::default(),
        }
    }

    /// Bind `component` to an explicit store
    pub fn with_store(component: C, store: SharedStore) -> Self {
        Self::new(component).store(store)
    }

    /// Use `store` instead of the mount context's store
    pub fn store(mut self, store: SharedStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the modules to subscribe to, replacing any previous list
    ///
    /// An empty list means no subscription is ever created.
    pub fn with_state_from<I, S>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ModuleName>,
    {
        self.modules = modules.into_iter().map(Into::into).collect();

        for (i, module) in self.modules.iter().enumerate() {
            if self.modules[..i].contains(module) {
                tracing::warn!(
                    module = %module,
                    component = self.component.name(),
                    "module listed more than once; it will be subscribed once per listing"
                );
            }
        }
        self
    }

    /// Compute hydration seeds from the component's props at mount
    pub fn hydrate_with<F>(mut self, hydrator: F) -> Self
    where
        F: Fn(&Props) -> HydrationSeeds + Send + Sync + 'static,
    {
        self.hydrator = Some(Arc::new(hydrator));
        self
    }

    /// Project the latest module states (in module order) to view-state
    pub fn map_state_to<F>(mut self, projection: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.projection = Some(Arc::new(projection));
        self
    }

    /// Produce dispatch props from the store's dispatcher
    pub fn map_dispatch_to<F>(mut self, projection: F) -> Self
    where
        F: Fn(Dispatcher) -> Props + Send + Sync + 'static,
    {
        self.dispatch_projection = Some(Arc::new(projection));
        self
    }

    /// Choose which modules are cleared on unmount (default: all)
    pub fn clear_state_on_unmount(mut self, policy: impl Into<ClearPolicy>) -> Self {
        self.clear_policy = policy.into();
        self
    }

    /// Snapshot the configuration into a component factory
    ///
    /// Does not touch the store.
    pub fn build(&self) -> Connected<C> {
        let name = self.component.name();
        let display_name = format!(
            "Connector({})",
            if name.is_empty() { "Unknown" } else { name }
        );

        let binding = Binding {
            display_name,
            store: self.store.clone(),
            modules: self.modules.clone(),
            projection: self.projection.clone().unwrap_or_else(identity),
            dispatch_projection: self.dispatch_projection.clone(),
            hydrator: self.hydrator.clone(),
            clear_policy: self.clear_policy.clone(),
        };

        Connected::new(self.component.clone(), Arc::new(binding))
    }
}
