//! Component factory
//!
//! [`Connected`] is what [`Connector::build`](crate::Connector::build)
//! returns: a factory that mounts instances of one component, each with its
//! own [`LifecycleController`]. A [`Mounted`] instance renders its component
//! with the merged props
//!
//! ```text
//! { ...view_state, ...input_props, ...dispatch_props }
//! ```
//!
//! where later layers win on key collision.

use std::sync::Arc;

use crate::connector::Binding;
use crate::controller::{LifecycleController, Phase};
use crate::error::Result;
use crate::store::StoreContext;
use crate::value::{merge_props, Props};

/// A renderable unit that can be bound to a store
pub trait Component: Send + Sync {
    /// What rendering produces
    type Output;

    /// Name used in diagnostics and the connected display name
    fn name(&self) -> &str;

    /// Render with the given props
    fn render(&self, props: &Props) -> Self::Output;
}

/// Factory mounting store-bound instances of a component
pub struct Connected<C> {
    component: Arc<C>,
    binding: Arc<Binding>,
}

impl<C> Clone for Connected<C> {
    fn clone(&self) -> Self {
        Self {
            component: self.component.clone(),
            binding: self.binding.clone(),
        }
    }
}

impl<C: Component> Connected<C> {
    pub(crate) fn new(component: Arc<C>, binding: Arc<Binding>) -> Self {
        Self { component, binding }
    }

    /// `Connector(<component name>)`
    pub fn display_name(&self) -> &str {
        self.binding.display_name()
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    #[cfg(test)]
    pub(crate) fn binding_arc(&self) -> Arc<Binding> {
        self.binding.clone()
    }

    /// Create an instance without activating it
    ///
    /// Fails synchronously with
    /// [`BindError::MissingStore`](crate::BindError::MissingStore) if no
    /// store can be resolved.
    pub fn instantiate(&self, props: Props, context: &StoreContext) -> Result<Mounted<C>> {
        let controller = LifecycleController::new(self.binding.clone(), context)?;
        Ok(Mounted {
            component: self.component.clone(),
            props,
            controller,
        })
    }

    /// Create and activate an instance
    pub fn mount(&self, props: Props, context: &StoreContext) -> Result<Mounted<C>> {
        let mut mounted = self.instantiate(props, context)?;
        mounted.activate()?;
        Ok(mounted)
    }
}

impl<C> std::fmt::Debug for Connected<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connected")
            .field("binding", &self.binding)
            .finish()
    }
}

/// One mounted component instance
pub struct Mounted<C> {
    component: Arc<C>,
    props: Props,
    controller: LifecycleController,
}

impl<C: Component> Mounted<C> {
    /// Run the mount-equivalent transition
    pub fn activate(&mut self) -> Result<()> {
        self.controller.activate(&self.props)
    }

    /// Render the component with view-state, input props and dispatch props
    pub fn render(&self) -> C::Output {
        let view_state = self.controller.view_state();
        let merged = merge_props(
            view_state.as_ref(),
            &self.props,
            self.controller.dispatch_props(),
        );
        self.component.render(&merged)
    }

    /// The props that would be passed to the component right now
    pub fn rendered_props(&self) -> Props {
        let view_state = self.controller.view_state();
        merge_props(
            view_state.as_ref(),
            &self.props,
            self.controller.dispatch_props(),
        )
    }

    /// Replace the input props
    ///
    /// Hydration seeds were computed at activation and are not recomputed.
    pub fn set_props(&mut self, props: Props) {
        self.props = props;
        self.controller.dirty_flag().store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn controller(&self) -> &LifecycleController {
        &self.controller
    }

    pub fn phase(&self) -> Phase {
        self.controller.phase()
    }

    /// Read and clear the re-render flag
    pub fn take_dirty(&self) -> bool {
        self.controller.take_dirty()
    }

    /// Unmount-equivalent; the instance is consumed
    pub fn unmount(mut self) -> Result<()> {
        self.controller.deactivate()
    }
}

impl<C> std::fmt::Debug for Mounted<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mounted")
            .field("props", &self.props.keys().collect::<Vec<_>>())
            .field("controller", &self.controller)
            .finish()
    }
}
