//! Build-time graph assembly from the three input feature streams
//! (sidewalks, crossings, elevator paths). Grounded in
//! `accessmapapi.network.make_network` (round endpoint coordinates to 7
//! decimal digits as node keys, compose per-layer graphs) and the
//! teacher's `RouteGraph::from_osm_data` (builder that logs and skips
//! malformed input rather than failing the whole build).

use std::collections::HashMap;

use crate::error::Error;
use crate::geo::haversine;
use crate::graph::{Graph, GraphBuilder};
use crate::model::{CurbRamps, Edge, Node, NodeId, WayKind};
use crate::spatial::SpatialIndex;

const COORD_PRECISION: f64 = 1e7;

/// One input feature as produced by the (out-of-scope) ingestion
/// pipeline, before it's folded into the graph's node/edge tables.
#[derive(Debug, Clone)]
pub struct RawFeature {
    pub way: WayKind,
    pub geometry: Vec<(f64, f64)>,
    pub incline: Option<f64>,
    pub curbramps: Option<CurbRamps>,
    pub marked: Option<bool>,
    pub opening_hours: Option<String>,
    pub indoor: Option<bool>,
    pub via: Option<String>,
    pub side: Option<String>,
    pub street_name: Option<String>,
    pub surface: Option<String>,
}

fn round_key(p: (f64, f64)) -> (i64, i64) {
    (
        (p.0 * COORD_PRECISION).round() as i64,
        (p.1 * COORD_PRECISION).round() as i64,
    )
}

/// Build the graph and its spatial index from the three feature streams.
/// Any feature that fails validation is skipped with a logged
/// `DataError`; the build continues (spec §4.1's "batch operation"
/// failure model).
pub fn build(sidewalks: Vec<RawFeature>, crossings: Vec<RawFeature>, elevator_paths: Vec<RawFeature>) -> (Graph, SpatialIndex) {
    let mut node_ids: HashMap<(i64, i64), NodeId> = HashMap::new();
    let mut nodes: Vec<Node> = Vec::new();
    let mut seen_pairs: std::collections::HashSet<(NodeId, NodeId)> = std::collections::HashSet::new();

    let mut builder = GraphBuilder::new();
    let mut edge_geoms: Vec<(usize, NodeId, NodeId, Vec<(f64, f64)>)> = Vec::new();
    let mut edge_idx = 0usize;

    let streams: [(&str, Vec<RawFeature>); 3] = [
        ("sidewalks", sidewalks),
        ("crossings", crossings),
        ("elevator_paths", elevator_paths),
    ];

    for (stream_name, features) in streams {
        for (i, feature) in features.into_iter().enumerate() {
            if feature.geometry.len() < 2 {
                let err = Error::DataError(format!("{stream_name}[{i}]: geometry has fewer than 2 points"));
                tracing::warn!(error = %err, stream = stream_name, index = i, "skipping feature");
                continue;
            }

            let incline = match feature.way {
                WayKind::Sidewalk => {
                    let g = feature.incline.unwrap_or(0.0);
                    if !(-1.0..=1.0).contains(&g) {
                        let err = Error::DataError(format!("{stream_name}[{i}]: incline {g} outside [-1, 1]"));
                        tracing::warn!(error = %err, stream = stream_name, index = i, "skipping feature");
                        continue;
                    }
                    g
                }
                WayKind::Crossing | WayKind::ElevatorPath => 0.0,
            };

            let first = *feature.geometry.first().unwrap();
            let last = *feature.geometry.last().unwrap();
            let u_key = round_key(first);
            let v_key = round_key(last);

            let next_id = nodes.len() as NodeId;
            let u = *node_ids.entry(u_key).or_insert_with(|| {
                nodes.push(Node { lon: first.0, lat: first.1 });
                next_id
            });
            let next_id = nodes.len() as NodeId;
            let v = *node_ids.entry(v_key).or_insert_with(|| {
                nodes.push(Node { lon: last.0, lat: last.1 });
                next_id
            });

            if u == v {
                let err = Error::DataError(format!("{stream_name}[{i}]: degenerate loop edge at node {u}"));
                tracing::warn!(error = %err, stream = stream_name, index = i, "skipping feature");
                continue;
            }

            let canon = if u <= v { (u, v) } else { (v, u) };
            if !seen_pairs.insert(canon) {
                let err = Error::DataError(format!("{stream_name}[{i}]: parallel edge ({u}, {v}) already present"));
                tracing::warn!(error = %err, stream = stream_name, index = i, "skipping feature");
                continue;
            }

            let length = haversine(&feature.geometry);

            builder.add_edge(Edge {
                u,
                v,
                way: feature.way,
                geometry: feature.geometry.clone(),
                length,
                incline,
                curbramps: feature.curbramps,
                marked: feature.marked,
                opening_hours: feature.opening_hours,
                indoor: feature.indoor,
                via: feature.via,
                side: feature.side,
                street_name: feature.street_name,
                surface: feature.surface,
            });
            edge_geoms.push((edge_idx, u, v, feature.geometry));
            edge_idx += 1;
        }
    }

    let builder = builder.with_nodes(nodes);
    let graph = builder.build();
    let index = SpatialIndex::build(
        edge_geoms.iter().map(|(i, u, v, g)| (*i, *u, *v, g.as_slice())),
    );

    (graph, index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(way: WayKind, geom: Vec<(f64, f64)>, incline: Option<f64>) -> RawFeature {
        RawFeature {
            way,
            geometry: geom,
            incline,
            curbramps: None,
            marked: None,
            opening_hours: None,
            indoor: None,
            via: None,
            side: None,
            street_name: None,
            surface: None,
        }
    }

    #[test]
    fn shares_nodes_between_touching_features() {
        let a = feature(WayKind::Sidewalk, vec![(0.0, 0.0), (0.0, 0.001)], Some(0.0));
        let b = feature(WayKind::Sidewalk, vec![(0.0, 0.001), (0.001, 0.001)], Some(0.0));
        let (graph, _) = build(vec![a, b], vec![], vec![]);
        assert_eq!(graph.nodes_count(), 3);
    }

    #[test]
    fn skips_degenerate_features() {
        let too_short = feature(WayKind::Sidewalk, vec![(0.0, 0.0)], Some(0.0));
        let bad_incline = feature(WayKind::Sidewalk, vec![(1.0, 1.0), (1.0, 1.001)], Some(5.0));
        let (graph, _) = build(vec![too_short, bad_incline], vec![], vec![]);
        assert_eq!(graph.nodes_count(), 0);
    }

    #[test]
    fn drops_parallel_edges() {
        let a = feature(WayKind::Sidewalk, vec![(0.0, 0.0), (0.0, 0.001)], Some(0.0));
        let dup = feature(WayKind::Sidewalk, vec![(0.0, 0.0), (0.0, 0.001)], Some(0.0));
        let (graph, _) = build(vec![a, dup], vec![], vec![]);
        assert_eq!(graph.all_edges().len(), 1);
    }
}
