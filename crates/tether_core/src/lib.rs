//! Tether Core
//!
//! Binds presentation components to a reactive, modular state store:
//!
//! - **Store Contract**: per-module state streams, dispatch, hydrate, clear
//! - **State Streams**: cold push streams, hot latest-value relays, RAII subscriptions
//! - **Stream Combinator**: latest-value combination with per-module hydration gates
//! - **Hydration**: seed modules from component props before delivery opens
//! - **Connector**: by-value binding descriptor producing component factories
//! - **Lifecycle Controller**: explicit Uninitialized → Activated → Deactivated machine
//!
//! # Example
//!
//! ```rust
//! use serde_json::{json, Value};
//! use std::sync::Arc;
//! use tether_core::{
//!     Action, BindError, Component, Connector, Props, Relay, StateStream, Store, StoreContext,
//! };
//!
//! // A one-module store backed by a relay
//! struct Counter(Relay);
//!
//! impl Store for Counter {
//!     fn state_stream(&self, module: &str) -> Result<StateStream, BindError> {
//!         match module {
//!             "counter" => Ok(self.0.stream()),
//!             other => Err(BindError::UnknownModule(other.into())),
//!         }
//!     }
//!     fn dispatch(&self, action: Action) {
//!         if action.is("@counter/INC") {
//!             let n = self.0.get()["n"].as_i64().unwrap_or(0);
//!             self.0.set(json!({ "n": n + 1 }));
//!         }
//!     }
//!     fn hydrate(&self, _module: &str, _seed: Value) {}
//!     fn clear_state(&self, _module: &str) {
//!         self.0.set(json!({ "n": 0 }));
//!     }
//! }
//!
//! struct Label;
//!
//! impl Component for Label {
//!     type Output = String;
//!     fn name(&self) -> &str {
//!         "Label"
//!     }
//!     fn render(&self, props: &Props) -> String {
//!         let n = props.get("n").and_then(|p| p.as_value()).cloned();
//!         format!("count: {}", n.unwrap_or(Value::Null))
//!     }
//! }
//!
//! let store = Arc::new(Counter(Relay::new(json!({ "n": 0 }))));
//! let connected = Connector::new(Label).with_state_from(["counter"]).build();
//! let mounted = connected
//!     .mount(Props::new(), &StoreContext::new(store.clone()))
//!     .unwrap();
//!
//! store.dispatch(Action::new("@counter/INC"));
//! assert_eq!(mounted.render(), "count: 1");
//!
//! mounted.unmount().unwrap();
//! assert_eq!(store.0.get(), json!({ "n": 0 }));
//! ```

pub mod combine;
pub mod component;
pub mod connector;
pub mod controller;
pub mod error;
pub mod hydration;
pub mod policy;
pub mod store;
pub mod stream;
pub mod value;

#[cfg(test)]
pub(crate) mod testing;

pub use combine::{bind_streams, combine_latest, identity, Projection};
pub use component::{Component, Connected, Mounted};
pub use connector::{Binding, Connector, DispatchProjection};
pub use controller::{DirtyFlag, LifecycleController, Phase, RenderRequest};
pub use error::{BindError, Result};
pub use hydration::{HydrationSeeds, Hydrator};
pub use policy::ClearPolicy;
pub use store::{Dispatcher, SharedStore, Store, StoreContext};
pub use stream::{Relay, StateStream, Subscription};
pub use value::{is_hydrated, merge_props, props, Action, Handler, ModuleName, Prop, Props};
