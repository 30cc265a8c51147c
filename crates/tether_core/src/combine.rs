//! Stream combinator
//!
//! Turns the state streams of a connector's modules into one stream of
//! projected view-state:
//!
//! - **One module**: the module's stream, gated on `hydrated` if it has a
//!   seed, mapped through the projection.
//! - **N modules**: each stream is gated first (filter before combine), then
//!   merged with a latest-value cache. Nothing is emitted until every input
//!   has produced a value; after that, every update from any input emits
//!   the projection of the current latest values.
//!
//! The combinator adds no buffering or reordering: an emission is handled
//! synchronously in the order the store delivers it. The cache lock is
//! released before the projection and the sink run.

use parking_lot::Mutex;
use serde_json::Value;
use smallvec::SmallVec;
use std::sync::Arc;

use crate::error::Result;
use crate::hydration::{is_seeded, HydrationSeeds};
use crate::store::Store;
use crate::stream::{StateStream, Subscription};
use crate::value::ModuleName;

/// Maps the latest state of each module (in module-list order) to view-state
pub type Projection = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Projection passing the first module's state through unchanged
pub fn identity() -> Projection {
    Arc::new(|states: &[Value]| states.first().cloned().unwrap_or(Value::Null))
}

/// Latest value seen from each input
struct LatestCache {
    slots: SmallVec<[Option<Value>; 4]>,
    filled: usize,
}

impl LatestCache {
    fn new(inputs: usize) -> Self {
        Self {
            slots: SmallVec::from_elem(None, inputs),
            filled: 0,
        }
    }

    /// Store `value` for input `index`; returns the full tuple once every
    /// input has a value
    fn record(&mut self, index: usize, value: Value) -> Option<SmallVec<[Value; 4]>> {
        let slot = &mut self.slots[index];
        if slot.is_none() {
            self.filled += 1;
        }
        *slot = Some(value);

        if self.filled < self.slots.len() {
            return None;
        }
        Some(self.slots.iter().flatten().cloned().collect())
    }
}

/// Single-module stream: optional hydration gate, then projection
pub fn single(stream: StateStream, gated: bool, projection: Projection) -> StateStream {
    let stream = if gated { stream.gate_hydrated() } else { stream };
    stream.map(move |state| projection(std::slice::from_ref(&state)))
}

/// Latest-value combination of `streams`, projected on every emission
pub fn combine_latest(streams: Vec<StateStream>, projection: Projection) -> StateStream {
    StateStream::new(move |sink| {
        let cache = Arc::new(Mutex::new(LatestCache::new(streams.len())));

        let subscriptions = streams
            .into_iter()
            .enumerate()
            .map(|(index, stream)| {
                let cache = cache.clone();
                let sink = sink.clone();
                let projection = projection.clone();
                stream.subscribe(move |value| {
                    let ready = cache.lock().record(index, value);
                    if let Some(values) = ready {
                        sink(projection(&values));
                    }
                })
            })
            .collect();

        Subscription::all(subscriptions)
    })
}

/// Build the projected view-state stream for a module list
///
/// Every module's stream is resolved before anything is subscribed, so an
/// unknown module fails without acquiring a subscription.
pub fn bind_streams(
    store: &dyn Store,
    modules: &[ModuleName],
    seeds: Option<&HydrationSeeds>,
    projection: Projection,
) -> Result<StateStream> {
    let mut streams = Vec::with_capacity(modules.len());
    for module in modules {
        streams.push(store.state_stream(module)?);
    }

    if streams.len() == 1 {
        let gated = is_seeded(seeds, &modules[0]);
        let stream = streams.remove(0);
        return Ok(single(stream, gated, projection));
    }

    let gated = streams
        .into_iter()
        .zip(modules)
        .map(|(stream, module)| {
            if is_seeded(seeds, module) {
                stream.gate_hydrated()
            } else {
                stream
            }
        })
        .collect();
    Ok(combine_latest(gated, projection))
}
