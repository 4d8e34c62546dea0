//! Pedestrian accessibility routing engine.
//!
//! Owns the network graph, its spatial index, the parameterised cost
//! model, map-matching, and the custom shortest-path search, plus the
//! route and walkshed assemblers built on top of them. The HTTP surface,
//! data ingestion from external vector sources, and the build pipeline
//! that assembles sidewalk/crossing/elevator feature sets all live
//! outside this crate (`walkroute-serve` and upstream tooling).

pub mod cache;
pub mod cost;
pub mod dijkstra;
pub mod directions;
pub mod error;
pub mod geo;
pub mod graph;
pub mod ingest;
pub mod matcher;
pub mod model;
pub mod opening_hours;
pub mod response;
pub mod route;
pub mod spatial;
pub mod state;
pub mod walkshed;

pub use error::{Error, Result};
pub use model::{CostParams, Edge, MatchEntry, MatchResult, Node, NodeId, WayKind};
pub use route::route;
pub use state::EngineState;
pub use walkshed::walkshed;
