//! Lifecycle controller
//!
//! One controller is bound to one mounted component instance. It follows an
//! explicit state machine:
//!
//! ```text
//! Uninitialized ──activate──▶ Activated ──deactivate──▶ Deactivated
//! ```
//!
//! # Activation
//!
//! 1. Dispatch props are computed once from the dispatch projection.
//! 2. With no modules, the controller is activated without a subscription.
//! 3. Hydration seeds are computed from the input props.
//! 4. The projected view-state stream is built; seeded modules are gated
//!    on their `hydrated` marker.
//! 5. The stream is subscribed; each emission replaces the view-state.
//! 6. Seeds are pushed into the store. This happens after subscribing, so
//!    the hydrated snapshot is observed.
//!
//! # Deactivation
//!
//! Modules selected by the clear policy are cleared in module order, then
//! the subscription is released, exactly once. Emissions that still arrive
//! afterwards are ignored. A deactivated controller cannot be reactivated.
//!
//! Dropping an activated controller deactivates it.

use parking_lot::Mutex;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::combine::bind_streams;
use crate::connector::Binding;
use crate::error::{BindError, Result};
use crate::hydration::{compute_seeds, push_seeds};
use crate::store::{resolve_store, Dispatcher, SharedStore, StoreContext};
use crate::stream::Subscription;
use crate::value::Props;

/// Lifecycle phase of a controller
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Uninitialized,
    Activated,
    Deactivated,
}

/// Shared dirty flag raised whenever the view-state changes
pub type DirtyFlag = Arc<AtomicBool>;

/// Called after each view-state update with the new view version
pub type RenderRequest = Arc<dyn Fn(u64) + Send + Sync>;

#[derive(Default)]
struct ViewState {
    value: Option<Value>,
    version: u64,
}

/// View-state cell shared between the controller and its subscription sink
struct ViewCell {
    state: Mutex<ViewState>,
    /// Cleared before the subscription is released
    accepting: AtomicBool,
    dirty: DirtyFlag,
    render_request: Mutex<Option<RenderRequest>>,
}

impl ViewCell {
    fn new() -> Self {
        Self {
            state: Mutex::new(ViewState::default()),
            accepting: AtomicBool::new(false),
            dirty: Arc::new(AtomicBool::new(false)),
            render_request: Mutex::new(None),
        }
    }

    fn receive(&self, value: Value) {
        if !self.accepting.load(Ordering::Acquire) {
            tracing::trace!("ignoring emission after deactivation");
            return;
        }

        let version = {
            let mut state = self.state.lock();
            state.value = Some(value);
            state.version += 1;
            state.version
        };
        self.dirty.store(true, Ordering::SeqCst);

        let request = self.render_request.lock().clone();
        if let Some(request) = request {
            request(version);
        }
    }
}

/// Binds one component instance to its store for the instance's lifetime
pub struct LifecycleController {
    binding: Arc<Binding>,
    store: SharedStore,
    phase: Phase,
    subscription: Option<Subscription>,
    dispatch_props: Props,
    view: Arc<ViewCell>,
}

impl LifecycleController {
    /// Resolve the store and create an uninitialized controller
    ///
    /// Fails with [`BindError::MissingStore`] when neither the binding nor
    /// the context provides a store.
    pub fn new(binding: Arc<Binding>, context: &StoreContext) -> Result<Self> {
        let store = resolve_store(binding.store.as_ref(), context).ok_or_else(|| {
            BindError::MissingStore {
                component: binding.display_name.clone(),
            }
        })?;

        tracing::trace!(component = %binding.display_name, "controller created");

        Ok(Self {
            binding,
            store,
            phase: Phase::Uninitialized,
            subscription: None,
            dispatch_props: Props::new(),
            view: Arc::new(ViewCell::new()),
        })
    }

    /// Mount-equivalent: acquire the subscription and push hydration seeds
    pub fn activate(&mut self, props: &Props) -> Result<()> {
        if self.phase != Phase::Uninitialized {
            return Err(BindError::InvalidTransition {
                from: self.phase,
                operation: "activate",
            });
        }

        let binding = self.binding.clone();
        let dispatch_props = binding
            .dispatch_projection
            .as_ref()
            .map(|project| project(Dispatcher::new(self.store.clone())))
            .unwrap_or_default();

        if binding.modules.is_empty() {
            self.dispatch_props = dispatch_props;
            self.phase = Phase::Activated;
            tracing::debug!(component = %binding.display_name, "activated without modules");
            return Ok(());
        }

        let seeds = compute_seeds(binding.hydrator.as_ref(), props);
        let stream = bind_streams(
            self.store.as_ref(),
            &binding.modules,
            seeds.as_ref(),
            binding.projection.clone(),
        )?;

        self.dispatch_props = dispatch_props;
        self.view.accepting.store(true, Ordering::Release);
        let view = self.view.clone();
        self.subscription = Some(stream.subscribe(move |value| view.receive(value)));

        let hydrated = push_seeds(self.store.as_ref(), &binding.modules, seeds.as_ref());

        self.phase = Phase::Activated;
        tracing::debug!(
            component = %binding.display_name,
            modules = binding.modules.len(),
            hydrated = hydrated.len(),
            "activated"
        );
        Ok(())
    }

    /// Unmount-equivalent: apply the clear policy, then release the subscription
    pub fn deactivate(&mut self) -> Result<()> {
        if self.phase != Phase::Activated {
            return Err(BindError::InvalidTransition {
                from: self.phase,
                operation: "deactivate",
            });
        }

        let binding = self.binding.clone();
        if !binding.modules.is_empty() {
            self.view.accepting.store(false, Ordering::Release);

            for module in binding.clear_policy.select(&binding.modules) {
                tracing::debug!(component = %binding.display_name, module, "clearing module state");
                self.store.clear_state(module);
            }

            if let Some(subscription) = self.subscription.take() {
                subscription.unsubscribe();
            }
        }

        self.phase = Phase::Deactivated;
        tracing::debug!(component = %binding.display_name, "deactivated");
        Ok(())
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// The resolved store
    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Whether a subscription is currently held
    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Props produced by the dispatch projection at activation
    pub fn dispatch_props(&self) -> &Props {
        &self.dispatch_props
    }

    /// Latest projected view-state, if any emission has arrived
    pub fn view_state(&self) -> Option<Value> {
        self.view.state.lock().value.clone()
    }

    /// Number of view-state updates received so far
    pub fn view_version(&self) -> u64 {
        self.view.state.lock().version
    }

    /// Flag raised on every view-state update
    pub fn dirty_flag(&self) -> DirtyFlag {
        self.view.dirty.clone()
    }

    /// Read and clear the dirty flag
    pub fn take_dirty(&self) -> bool {
        self.view.dirty.swap(false, Ordering::SeqCst)
    }

    /// Be called back after every view-state update
    pub fn on_render_request<F>(&self, request: F)
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        *self.view.render_request.lock() = Some(Arc::new(request));
    }
}

impl Drop for LifecycleController {
    fn drop(&mut self) {
        if self.phase == Phase::Activated {
            let _ = self.deactivate();
        }
    }
}

impl std::fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("component", &self.binding.display_name)
            .field("phase", &self.phase)
            .field("subscribed", &self.subscription.is_some())
            .field("view_version", &self.view_version())
            .finish()
    }
}
