//! Custom multi-source Dijkstra. Grounded in the teacher's
//! `range::mod` bounded-search (a `BinaryHeap<Reverse<_>>` over
//! `(distance, node)`) and `accessmapapi.routing.dijkstra.dijkstra_multi`,
//! which adds the insertion-counter tie-break and the "negative
//! improvement to an already-finalised node is a fatal error" check this
//! port keeps verbatim.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::cost;
use crate::error::{Error, Result};
use crate::model::{CostParams, NodeId};
use crate::graph::Graph;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HeapEntry {
    dist: f64,
    counter: u64,
    node: NodeId,
}

impl Eq for HeapEntry {}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse for a min-heap; ties broken by insertion order so two
        // equal-distance entries never need to compare nodes directly.
        other
            .dist
            .partial_cmp(&self.dist)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.counter.cmp(&self.counter))
    }
}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

pub struct SearchResult {
    pub dist: HashMap<NodeId, f64>,
    pub prev: HashMap<NodeId, NodeId>,
}

impl SearchResult {
    /// Reconstruct the node path ending at `target`, if reached.
    pub fn path_to(&self, target: NodeId) -> Option<Vec<NodeId>> {
        if !self.dist.contains_key(&target) {
            return None;
        }
        let mut path = vec![target];
        let mut cur = target;
        while let Some(&p) = self.prev.get(&cur) {
            path.push(p);
            cur = p;
        }
        path.reverse();
        Some(path)
    }
}

/// Run Dijkstra from `sources` (all starting at distance 0 — the
/// assembler adds each source's `initial_cost` separately, per spec
/// §4.6's multi-source semantics). `target`, if set, stops the search as
/// soon as it's popped. `cutoff`, if set, prunes any tentative distance
/// exceeding it.
///
/// Returns `Err(IntegrityError)` if a strictly negative improvement to an
/// already-finalised node is observed — the cost model is built to
/// forbid negative edge weights, so this only fires on a bug.
pub fn search(
    graph: &Graph,
    sources: &[NodeId],
    params: &CostParams,
    target: Option<NodeId>,
    cutoff: Option<f64>,
) -> Result<SearchResult> {
    let mut dist: HashMap<NodeId, f64> = HashMap::new();
    let mut seen: HashMap<NodeId, f64> = HashMap::new();
    let mut prev: HashMap<NodeId, NodeId> = HashMap::new();
    let mut heap = BinaryHeap::new();
    let mut counter: u64 = 0;

    for &s in sources {
        seen.insert(s, 0.0);
        heap.push(HeapEntry {
            dist: 0.0,
            counter,
            node: s,
        });
        counter += 1;
    }

    while let Some(HeapEntry { dist: d, node: u, .. }) = heap.pop() {
        if dist.contains_key(&u) {
            continue; // already finalised via a shorter path
        }
        dist.insert(u, d);

        if Some(u) == target {
            return Ok(SearchResult { dist, prev });
        }

        for (v, edge) in graph.neighbours(u) {
            let edge_cost = match cost::cost(u, edge, params) {
                Some(c) if c.is_finite() => c,
                _ => continue,
            };
            if edge_cost < 0.0 {
                return Err(Error::IntegrityError(format!(
                    "negative edge cost {edge_cost} from {u} to {v}"
                )));
            }

            let newdist = d + edge_cost;

            // `v` already finalised: a strictly shorter distance arriving
            // now means an earlier pop used a stale (too-high) distance,
            // which can only happen with a negative-weight edge somewhere
            // upstream. `accessmapapi.routing.dijkstra.dijkstra_multi`
            // raises on this same condition.
            if let Some(&finalised) = dist.get(&v) {
                if newdist < finalised - 1e-9 {
                    return Err(Error::IntegrityError(format!(
                        "negative-weight improvement to already-finalised node {v}: {newdist} < {finalised}"
                    )));
                }
                continue;
            }

            if let Some(cutoff) = cutoff {
                if newdist > cutoff {
                    continue;
                }
            }

            if let Some(&existing) = seen.get(&v) {
                if newdist < existing {
                    seen.insert(v, newdist);
                    prev.insert(v, u);
                    heap.push(HeapEntry {
                        dist: newdist,
                        counter,
                        node: v,
                    });
                    counter += 1;
                }
            } else {
                seen.insert(v, newdist);
                prev.insert(v, u);
                heap.push(HeapEntry {
                    dist: newdist,
                    counter,
                    node: v,
                });
                counter += 1;
            }
        }
    }

    if let Some(t) = target {
        if !dist.contains_key(&t) {
            return Err(Error::NoPath);
        }
    }

    Ok(SearchResult { dist, prev })
}
