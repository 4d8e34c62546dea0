//! Walkshed (isochrone) assembler: drives the search with a cost cutoff
//! and materialises the reachable edge set. Grounded in
//! `accessmapapi.routing.walkshed.walkshed` (match origin, run
//! `dijkstra_multi` with `cutoff=max_cost`, collect unique edges from
//! reconstructed paths, emit one feature per edge).

use geojson::{Feature, FeatureCollection, Geometry, Value};
use std::collections::HashSet;

use crate::cost;
use crate::dijkstra;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::matcher;
use crate::model::{CostParams, NodeId};
use crate::response::{ResponseCode, WalkshedResponse};
use crate::route::DEFAULT_MATCH_RADIUS_M;
use crate::spatial::SpatialIndex;

pub const DEFAULT_WALKSHED_CUTOFF_S: f64 = 300.0;

pub fn walkshed(
    graph: &Graph,
    index: &SpatialIndex,
    origin: (f64, f64),
    cutoff: f64,
    params: &CostParams,
) -> Result<WalkshedResponse> {
    let matches = match matcher::match_point(graph, index, origin.0, origin.1, DEFAULT_MATCH_RADIUS_M, params, false) {
        Ok(m) => m,
        Err(Error::NoMatch) => {
            return Ok(WalkshedResponse {
                code: ResponseCode::NoValidNearby,
                walkshed: empty_collection(),
            })
        }
        Err(e) => return Err(e),
    };

    let sources: Vec<NodeId> = matches.iter().map(|m| m.node).collect();
    let result = dijkstra::search(graph, &sources, params, None, Some(cutoff))?;

    if result.dist.len() <= sources.len() {
        return Ok(WalkshedResponse {
            code: ResponseCode::NoPath,
            walkshed: empty_collection(),
        });
    }

    let mut seen_edges: HashSet<(NodeId, NodeId)> = HashSet::new();
    let mut features = Vec::new();

    for &node in result.dist.keys() {
        if let Some(path) = result.path_to(node) {
            for pair in path.windows(2) {
                let key = if pair[0] <= pair[1] {
                    (pair[0], pair[1])
                } else {
                    (pair[1], pair[0])
                };
                if !seen_edges.insert(key) {
                    continue;
                }
                if let Some(edge) = graph.edge(pair[0], pair[1]) {
                    let c = cost::cost(pair[0], edge, params).unwrap_or(f64::INFINITY);
                    let coords: Vec<Vec<f64>> =
                        edge.geometry_from(pair[0]).iter().map(|&(lon, lat)| vec![lon, lat]).collect();
                    let mut props = serde_json::Map::new();
                    props.insert("cost".into(), serde_json::json!(c));
                    features.push(Feature {
                        bbox: None,
                        geometry: Some(Geometry::new(Value::LineString(coords))),
                        id: None,
                        properties: Some(props),
                        foreign_members: None,
                    });
                }
            }
        }
    }

    Ok(WalkshedResponse {
        code: ResponseCode::Ok,
        walkshed: FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        },
    })
}

fn empty_collection() -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: Vec::new(),
        foreign_members: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::model::{Edge, Node, WayKind};

    fn star_graph() -> (Graph, SpatialIndex) {
        let nodes = vec![
            Node { lon: -122.312, lat: 47.6558 },
            Node { lon: -122.312, lat: 47.6559 },
            Node { lon: -122.3121, lat: 47.6558 },
        ];
        let mut b = GraphBuilder::new().with_nodes(nodes);
        b.add_edge(Edge {
            u: 0,
            v: 1,
            way: WayKind::Sidewalk,
            geometry: vec![(-122.312, 47.6558), (-122.312, 47.6559)],
            length: crate::geo::haversine(&[(-122.312, 47.6558), (-122.312, 47.6559)]),
            incline: 0.0,
            curbramps: None,
            marked: None,
            opening_hours: None,
            indoor: None,
            via: None,
            side: None,
            street_name: None,
            surface: None,
        });
        b.add_edge(Edge {
            u: 0,
            v: 2,
            way: WayKind::Sidewalk,
            geometry: vec![(-122.312, 47.6558), (-122.3121, 47.6558)],
            length: crate::geo::haversine(&[(-122.312, 47.6558), (-122.3121, 47.6558)]),
            incline: 0.0,
            curbramps: None,
            marked: None,
            opening_hours: None,
            indoor: None,
            via: None,
            side: None,
            street_name: None,
            surface: None,
        });
        let g = b.build();
        let idx = SpatialIndex::build(
            g.all_edges()
                .iter()
                .enumerate()
                .map(|(i, e)| (i, e.u, e.v, e.geometry.as_slice())),
        );
        (g, idx)
    }

    #[test]
    fn reachable_edges_respect_cutoff() {
        let (g, idx) = star_graph();
        let mut params = CostParams::default();
        params.base_speed = 1.0;
        let resp = walkshed(&g, &idx, (-122.312, 47.6558), 60.0, &params).unwrap();
        assert_eq!(resp.code, ResponseCode::Ok);
        for f in &resp.walkshed.features {
            let cost = f.properties.as_ref().unwrap().get("cost").unwrap().as_f64().unwrap();
            assert!(cost <= 60.0 + 1e-6);
        }
    }
}
