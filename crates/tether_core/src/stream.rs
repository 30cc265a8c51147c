//! Push-based state streams
//!
//! A [`StateStream`] is a cold description of a subscription: nothing happens
//! until [`StateStream::subscribe`] is called, which hands the sink to the
//! source and returns a [`Subscription`]. Operators (`filter`, `map`,
//! `gate_hydrated`) wrap the sink before it reaches the source.
//!
//! [`Relay`] is the hot side: it holds the latest value of one module and
//! pushes every new value to its listeners. Subscribing to a relay's stream
//! replays the current value and then forwards future updates only.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use std::sync::{Arc, Mutex};
//! use tether_core::stream::Relay;
//!
//! let relay = Relay::new(json!({ "count": 0 }));
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let seen_clone = seen.clone();
//!
//! let sub = relay
//!     .stream()
//!     .map(|state| state["count"].clone())
//!     .subscribe(move |count| seen_clone.lock().unwrap().push(count));
//!
//! relay.set(json!({ "count": 1 }));
//! sub.unsubscribe();
//! relay.set(json!({ "count": 2 }));
//!
//! assert_eq!(*seen.lock().unwrap(), vec![json!(0), json!(1)]);
//! ```

use parking_lot::Mutex;
use serde_json::Value;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use crate::value::is_hydrated;

/// Receiver of stream emissions
///
/// Sinks are `Fn` so a source may re-enter them (an emission that triggers a
/// dispatch that triggers another emission) without deadlocking.
pub type Sink = Arc<dyn Fn(Value) + Send + Sync>;

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// Handle to an active subscription
///
/// The release action runs exactly once: either through
/// [`Subscription::unsubscribe`] or when the handle is dropped.
pub struct Subscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Create a subscription that runs `release` when it is released
    pub fn new<F>(release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// A subscription with nothing to release
    pub fn empty() -> Self {
        Self { release: None }
    }

    /// Combine several subscriptions into one, released in order
    pub fn all(subscriptions: Vec<Subscription>) -> Self {
        Self::new(move || {
            for sub in subscriptions {
                sub.unsubscribe();
            }
        })
    }

    /// Release the subscription
    pub fn unsubscribe(mut self) {
        self.release_now();
    }

    /// Whether the release action has already run (or never existed)
    pub fn is_closed(&self) -> bool {
        self.release.is_none()
    }

    fn release_now(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release_now();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("closed", &self.is_closed())
            .finish()
    }
}

// =============================================================================
// STATE STREAM
// =============================================================================

type SubscribeFn = Box<dyn FnOnce(Sink) -> Subscription + Send>;

/// A cold, single-use stream of state snapshots
pub struct StateStream {
    subscribe_fn: SubscribeFn,
}

impl StateStream {
    /// Create a stream from its subscribe function
    pub fn new<F>(subscribe: F) -> Self
    where
        F: FnOnce(Sink) -> Subscription + Send + 'static,
    {
        Self {
            subscribe_fn: Box::new(subscribe),
        }
    }

    /// A stream that emits the given values synchronously on subscribe
    pub fn of(values: Vec<Value>) -> Self {
        Self::new(move |sink| {
            for value in values {
                sink(value);
            }
            Subscription::empty()
        })
    }

    /// Start the stream, delivering every emission to `sink`
    pub fn subscribe<F>(self, sink: F) -> Subscription
    where
        F: Fn(Value) + Send + Sync + 'static,
    {
        self.subscribe_sink(Arc::new(sink))
    }

    /// Start the stream with an already shared sink
    pub fn subscribe_sink(self, sink: Sink) -> Subscription {
        (self.subscribe_fn)(sink)
    }

    /// Only forward snapshots matching `predicate`
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(move |sink| {
            self.subscribe(move |value| {
                if predicate(&value) {
                    sink(value);
                }
            })
        })
    }

    /// Transform every snapshot
    pub fn map<F>(self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self::new(move |sink| self.subscribe(move |value| sink(f(value))))
    }

    /// Drop snapshots until the module reports `"hydrated": true`
    ///
    /// The gate latches: once a hydrated snapshot has passed, every later
    /// snapshot passes whether or not it still carries the marker.
    pub fn gate_hydrated(self) -> Self {
        let open = AtomicBool::new(false);
        self.filter(move |value| {
            if open.load(Ordering::Acquire) {
                return true;
            }
            if is_hydrated(value) {
                open.store(true, Ordering::Release);
                return true;
            }
            false
        })
    }
}

impl fmt::Debug for StateStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StateStream(..)")
    }
}

// =============================================================================
// RELAY
// =============================================================================

new_key_type! {
    /// Identifier of one relay listener
    pub struct ListenerId;
}

struct RelayInner {
    value: Value,
    /// Bumped by every `set`; a delivery pass stops once it is outdated
    version: u64,
    listeners: SlotMap<ListenerId, Sink>,
    /// Registration order; slotmap iteration order is slot order
    order: SmallVec<[ListenerId; 4]>,
}

/// Latest-value broadcaster backing one module's state stream
#[derive(Clone)]
pub struct Relay {
    inner: Arc<Mutex<RelayInner>>,
}

impl Relay {
    pub fn new(initial: Value) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RelayInner {
                value: initial,
                version: 0,
                listeners: SlotMap::with_key(),
                order: SmallVec::new(),
            })),
        }
    }

    /// Current value
    pub fn get(&self) -> Value {
        self.inner.lock().value.clone()
    }

    /// Replace the value and notify every listener
    ///
    /// Listeners are called in registration order, outside the relay lock.
    /// A `set` made from inside a listener notifies everyone with the newer
    /// value; the outer pass then stops, so no listener sees an older value
    /// after a newer one.
    pub fn set(&self, value: Value) {
        let (version, sinks) = {
            let mut inner = self.inner.lock();
            inner.value = value.clone();
            inner.version += 1;
            let sinks: SmallVec<[Sink; 4]> = inner
                .order
                .iter()
                .filter_map(|id| inner.listeners.get(*id).cloned())
                .collect();
            (inner.version, sinks)
        };

        for sink in sinks {
            if self.inner.lock().version != version {
                tracing::trace!(version, "relay pass superseded by a newer value");
                break;
            }
            sink(value.clone());
        }
    }

    /// Number of active listeners
    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }

    /// A stream of the current value followed by every later update
    pub fn stream(&self) -> StateStream {
        let inner = Arc::downgrade(&self.inner);
        StateStream::new(move |sink| {
            let Some(strong) = inner.upgrade() else {
                return Subscription::empty();
            };

            let (id, current) = {
                let mut guard = strong.lock();
                let id = guard.listeners.insert(sink.clone());
                guard.order.push(id);
                (id, guard.value.clone())
            };

            sink(current);
            Subscription::new(move || remove_listener(&inner, id))
        })
    }
}

fn remove_listener(inner: &Weak<Mutex<RelayInner>>, id: ListenerId) {
    if let Some(strong) = inner.upgrade() {
        let mut guard = strong.lock();
        guard.listeners.remove(id);
        guard.order.retain(|l| *l != id);
    }
}

impl fmt::Debug for Relay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("Relay")
            .field("value", &inner.value)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}
