//! The request state machine (spec §4.9) and the engine's readiness
//! signal (spec §5: "observed via a one-shot readiness signal (set-once,
//! observed by many)"). `EngineState` is the shared, read-only handle
//! request handlers hold; it is safe to clone and share across threads
//! because the only mutation is the single set-once build completion.

use std::sync::{Arc, OnceLock};

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::spatial::SpatialIndex;

struct Built {
    graph: Graph,
    index: SpatialIndex,
}

/// Shared handle to the (possibly not-yet-built) graph and spatial
/// index. Cheap to clone; all clones observe the same readiness signal.
#[derive(Clone, Default)]
pub struct EngineState {
    built: Arc<OnceLock<Built>>,
}

impl EngineState {
    pub fn new() -> Self {
        EngineState {
            built: Arc::new(OnceLock::new()),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.built.get().is_some()
    }

    /// Publish the built graph and index. Called exactly once, from the
    /// background build worker; a second call is a no-op (set-once
    /// semantics — matches the design note "if a readiness signal is
    /// used, make it set-once").
    pub fn publish(&self, graph: Graph, index: SpatialIndex) {
        let _ = self.built.set(Built { graph, index });
    }

    /// Borrow the built graph and index, or `NotReady` if the build
    /// hasn't completed yet. Request handlers call this once at the
    /// start of each request rather than blocking for readiness.
    pub fn get(&self) -> Result<(&Graph, &SpatialIndex)> {
        match self.built.get() {
            Some(b) => Ok((&b.graph, &b.index)),
            None => Err(Error::GraphNotReady),
        }
    }
}

/// The route request state machine named in spec §4.9:
/// `Received -> Matched -> Searched -> Assembled -> Responded`, or an early
/// terminal error state. `route::route` drives the actual transitions,
/// logging each one; `api::bad_input`/the HTTP handlers log the
/// terminal states that originate outside the core (`BadInput`,
/// `GraphNotReady`, `InternalError`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Received,
    Matched,
    Searched,
    Assembled,
    Responded,
    BadInput,
    OriginFarAway,
    DestinationFarAway,
    BothFarAway,
    NoRoute,
    GraphNotReady,
    SpatialIndexNotReady,
    InternalError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;

    #[test]
    fn not_ready_until_published() {
        let state = EngineState::new();
        assert!(!state.is_ready());
        assert!(matches!(state.get(), Err(Error::GraphNotReady)));

        let graph = GraphBuilder::new().build();
        let index = SpatialIndex::build(std::iter::empty());
        state.publish(graph, index);

        assert!(state.is_ready());
        assert!(state.get().is_ok());
    }

    #[test]
    fn clones_observe_same_signal() {
        let state = EngineState::new();
        let clone = state.clone();
        state.publish(GraphBuilder::new().build(), SpatialIndex::build(std::iter::empty()));
        assert!(clone.is_ready());
    }
}
