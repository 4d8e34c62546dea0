//! The pedestrian network graph store: an immutable, undirected graph
//! built once at startup. Mirrors the teacher's `RouteGraph` (node/edge
//! tables plus endpoint-indexed adjacency over a `petgraph` graph) but
//! keeps node ids dense rather than reusing OSM ids directly (design
//! note: "Replace with dense integer ids assigned at build time").

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};

use crate::model::{Edge, Node, NodeId};

/// The serializable subset of a `Graph` — node/edge tables only. The
/// `petgraph` adjacency and `edge_lookup` index are cheap to rebuild from
/// these and aren't worth persisting (see `cache.rs`).
#[derive(Debug, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Read-only pedestrian network. Construct via `GraphBuilder`; queries
/// never mutate it, so it can be shared freely across request handlers
/// behind an `Arc`.
///
/// `inner` node indices are allocated in node-id order and never removed,
/// so `NodeIndex::new(id as usize)` always round-trips to the right
/// `NodeId` — no separate reverse lookup table is kept.
#[derive(Debug)]
pub struct Graph {
    inner: UnGraph<(), usize>,
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    edge_lookup: HashMap<(NodeId, NodeId), usize>,
}

impl Graph {
    pub fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    pub fn edge(&self, u: NodeId, v: NodeId) -> Option<&Edge> {
        let key = if u <= v { (u, v) } else { (v, u) };
        self.edge_lookup.get(&key).map(|&i| &self.edges[i])
    }

    pub fn edge_by_index(&self, idx: usize) -> &Edge {
        &self.edges[idx]
    }

    pub fn all_edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Snapshot for persistence. Cloning the full node/edge tables is fine
    /// here — this only runs once per successful build, off the request
    /// path.
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            nodes: self.nodes.clone(),
            edges: self.edges.clone(),
        }
    }

    /// Rebuild from a snapshot, reconstructing the `petgraph` adjacency and
    /// `edge_lookup` index that aren't persisted.
    pub fn from_snapshot(snapshot: GraphSnapshot) -> Self {
        let mut builder = GraphBuilder::new().with_nodes(snapshot.nodes);
        for edge in snapshot.edges {
            builder.add_edge(edge);
        }
        builder.build()
    }

    /// Neighbours of `u`, each paired with the edge connecting them.
    pub fn neighbours(&self, u: NodeId) -> impl Iterator<Item = (NodeId, &Edge)> {
        let ni = NodeIndex::new(u as usize);
        self.inner.edges(ni).map(move |e| {
            let other = if e.source() == ni { e.target() } else { e.source() };
            (other.index() as NodeId, &self.edges[*e.weight()])
        })
    }
}

/// Builds a `Graph` from node/edge tables assembled by `ingest`. Node ids
/// must already be dense and contiguous starting at 0 (the ingest layer's
/// responsibility); the builder just wires up the `petgraph` backing
/// store and the lookup index.
pub struct GraphBuilder {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        GraphBuilder {
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn with_nodes(mut self, nodes: Vec<Node>) -> Self {
        self.nodes = nodes;
        self
    }

    /// Add an edge. Panics if `u`/`v` are out of range or a parallel edge
    /// already exists for the same pair — both indicate a bug in the
    /// ingest layer, which is expected to enforce node-id density and
    /// edge uniqueness before calling this.
    pub fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub fn build(self) -> Graph {
        let mut inner = UnGraph::<(), usize>::with_capacity(self.nodes.len(), self.edges.len());
        for _ in 0..self.nodes.len() {
            inner.add_node(());
        }

        let mut edge_lookup = HashMap::with_capacity(self.edges.len());
        for (i, edge) in self.edges.iter().enumerate() {
            let a = NodeIndex::new(edge.u as usize);
            let b = NodeIndex::new(edge.v as usize);
            inner.add_edge(a, b, i);
            let key = if edge.u <= edge.v {
                (edge.u, edge.v)
            } else {
                (edge.v, edge.u)
            };
            edge_lookup.insert(key, i);
        }

        Graph {
            inner,
            nodes: self.nodes,
            edges: self.edges,
            edge_lookup,
        }
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}
