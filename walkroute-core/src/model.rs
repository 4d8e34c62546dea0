use serde::{Deserialize, Serialize};

/// Stable, dense, contiguous node identifier assigned at build time.
pub type NodeId = u32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub lon: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WayKind {
    Sidewalk,
    Crossing,
    ElevatorPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CurbRamps {
    Yes,
    No,
    Unknown,
}

/// A pedestrian network edge. Stored undirected: `u`/`v` fix a canonical
/// direction for `geometry` and `incline`, but traversal may occur in
/// either direction — callers compare the starting endpoint to `u` to
/// recover which way they're going (see `Edge::effective_incline`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub u: NodeId,
    pub v: NodeId,
    pub way: WayKind,
    /// (lon, lat) vertices, first == node `u`, last == node `v`.
    pub geometry: Vec<(f64, f64)>,
    pub length: f64,
    /// Signed grade in geometry direction (u -> v positive uphill). Absent
    /// is represented as `0.0` for crossings/elevators.
    pub incline: f64,
    pub curbramps: Option<CurbRamps>,
    pub marked: Option<bool>,
    pub opening_hours: Option<String>,
    pub indoor: Option<bool>,
    pub via: Option<String>,
    pub side: Option<String>,
    pub street_name: Option<String>,
    pub surface: Option<String>,
}

impl Edge {
    /// Grade along the direction of travel `from -> to`. `from` must be
    /// one of `self.u`/`self.v`.
    pub fn effective_incline(&self, from: NodeId) -> f64 {
        match self.way {
            WayKind::Crossing | WayKind::ElevatorPath => 0.0,
            WayKind::Sidewalk => {
                if from == self.u {
                    self.incline
                } else {
                    -self.incline
                }
            }
        }
    }

    /// Geometry in traversal order, reversing the stored order when the
    /// walk starts at `v`.
    pub fn geometry_from(&self, from: NodeId) -> Vec<(f64, f64)> {
        if from == self.u {
            self.geometry.clone()
        } else {
            let mut g = self.geometry.clone();
            g.reverse();
            g
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostParams {
    pub incline_min: f64,
    pub incline_max: f64,
    pub base_speed: f64,
    pub avoid_curbs: bool,
    pub avoid_stairs: bool,
    /// Seconds since epoch, evaluated against `opening_hours`.
    pub timestamp: Option<f64>,
}

impl Default for CostParams {
    fn default() -> Self {
        CostParams {
            incline_min: -0.1,
            incline_max: 0.085,
            base_speed: 10.0 / 6.0,
            avoid_curbs: false,
            avoid_stairs: false,
            timestamp: None,
        }
    }
}

/// A synthetic half-edge produced by map-matching a mid-edge point. Never
/// inserted into the graph; carried only through the request-local match
/// result and the assembled response.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticEdge {
    pub way: WayKind,
    pub geometry: Vec<(f64, f64)>,
    pub length: f64,
    pub incline: f64,
    pub curbramps: Option<CurbRamps>,
    pub marked: Option<bool>,
    pub street_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchEntry {
    pub node: NodeId,
    pub initial_cost: f64,
    pub initial_edge: Option<SyntheticEdge>,
    /// The original edge this entry snapped onto, and the arc length of
    /// the snap point along it. `None` carries no positional meaning on
    /// its own; it exists only so the route assembler can detect the
    /// same-edge special case (spec §4.7 step 5) without re-matching.
    pub matched_edge: Option<usize>,
    pub matched_arc_length: Option<f64>,
}

pub type MatchResult = Vec<MatchEntry>;
