//! The route assembler: orchestrates map-matching and search, builds the
//! GeoJSON-shaped response, and runs step merging. Grounded in
//! `accessmapapi.routing.route.dijkstra` (the per-origin/destination-pair
//! loop, geometry reversal + incline negation when traversed opposite to
//! storage order, and the final response shape).

use geojson::{Feature, FeatureCollection, Geometry, Value};

use crate::cost;
use crate::dijkstra;
use crate::directions::{self, Segment};
use crate::error::{Error, Result};
use crate::geo::cut;
use crate::graph::Graph;
use crate::matcher;
use crate::model::{CostParams, Edge, MatchEntry, NodeId};
use crate::response::{Route, RouteResponse, ResponseCode};
use crate::spatial::SpatialIndex;
use crate::state::RequestState;

pub const DEFAULT_MATCH_RADIUS_M: f64 = 100.0;

struct Candidate {
    o: MatchEntry,
    d: MatchEntry,
    segments: Vec<Segment>,
    total_cost: f64,
}

fn build_segment(edge: &Edge, from: NodeId, cost_value: f64) -> Segment {
    Segment {
        way: edge.way,
        geometry: edge.geometry_from(from),
        length: edge.length,
        cost: cost_value,
        incline: edge.effective_incline(from),
        curbramps: edge.curbramps,
        marked: edge.marked,
        indoor: edge.indoor,
        surface: edge.surface.clone(),
        via: edge.via.clone(),
        side: edge.side.clone(),
        street_name: edge.street_name.clone(),
    }
}

fn synthetic_segment(se: &crate::model::SyntheticEdge, cost_value: f64) -> Segment {
    Segment {
        way: se.way,
        geometry: se.geometry.clone(),
        length: se.length,
        cost: cost_value,
        incline: se.incline,
        curbramps: se.curbramps,
        marked: se.marked,
        indoor: None,
        surface: None,
        via: None,
        side: None,
        street_name: se.street_name.clone(),
    }
}

fn path_segments(graph: &Graph, path: &[NodeId], params: &CostParams) -> Option<Vec<Segment>> {
    let mut segs = Vec::with_capacity(path.len().saturating_sub(1));
    for pair in path.windows(2) {
        let (u, v) = (pair[0], pair[1]);
        let edge = graph.edge(u, v)?;
        let c = cost::cost(u, edge, params)?;
        segs.push(build_segment(edge, u, c));
    }
    Some(segs)
}

fn way_str(way: crate::model::WayKind) -> &'static str {
    match way {
        crate::model::WayKind::Sidewalk => "sidewalk",
        crate::model::WayKind::Crossing => "crossing",
        crate::model::WayKind::ElevatorPath => "elevator_path",
    }
}

fn feature_from_segment(seg: &Segment) -> Feature {
    let coords: Vec<Vec<f64>> = seg.geometry.iter().map(|&(lon, lat)| vec![lon, lat]).collect();
    let mut props = serde_json::Map::new();
    props.insert("way".into(), serde_json::json!(way_str(seg.way)));
    props.insert("cost".into(), serde_json::json!(seg.cost));
    props.insert("length".into(), serde_json::json!(seg.length));
    match seg.way {
        crate::model::WayKind::Sidewalk => {
            props.insert("incline".into(), serde_json::json!(seg.incline));
        }
        crate::model::WayKind::Crossing => {
            if let Some(c) = seg.curbramps {
                props.insert("curbramps".into(), serde_json::json!(format!("{:?}", c)));
            }
        }
        crate::model::WayKind::ElevatorPath => {}
    }
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(coords))),
        id: None,
        properties: Some(props),
        foreign_members: None,
    }
}

/// Build candidate routes via the same-edge special case: origin and
/// destination both snapped onto the same original edge (spec §4.7 step
/// 5). Compares the two snap points' arc length and returns the direct
/// sub-segment between them.
fn same_edge_candidate(
    graph: &Graph,
    o: &MatchEntry,
    d: &MatchEntry,
    params: &CostParams,
) -> Option<Candidate> {
    let edge_idx = o.matched_edge.filter(|&i| Some(i) == d.matched_edge)?;
    let edge = graph.edge_by_index(edge_idx);
    let ao = o.matched_arc_length?;
    let ad = d.matched_arc_length?;
    if (ao - ad).abs() < 1e-6 {
        return None; // identical snap point: zero-length route, not a graph-search candidate
    }

    let (lo, hi) = if ao < ad { (ao, ad) } else { (ad, ao) };
    let after_lo = cut(&edge.geometry, lo);
    let tail = after_lo.last().unwrap();
    let sub_len_total = crate::geo::haversine(tail);
    let split_within_tail = hi - lo;
    let sub = cut(tail, split_within_tail.min(sub_len_total));
    let mut sub_geometry = sub[0].clone();
    if ao > ad {
        sub_geometry.reverse();
    }

    let length = crate::geo::haversine(&sub_geometry);
    let se = crate::model::SyntheticEdge {
        way: edge.way,
        geometry: sub_geometry,
        length,
        incline: if ao <= ad { edge.incline } else { -edge.incline },
        curbramps: edge.curbramps,
        marked: edge.marked,
        street_name: edge.street_name.clone(),
    };
    let c = cost::cost(0, &Edge { u: 0, v: 1, way: se.way, geometry: se.geometry.clone(), length: se.length, incline: se.incline, curbramps: se.curbramps, marked: se.marked, opening_hours: None, indoor: None, via: None, side: None, street_name: se.street_name.clone(), surface: None }, params)?;

    Some(Candidate {
        o: o.clone(),
        d: d.clone(),
        segments: vec![synthetic_segment(&se, c)],
        total_cost: o.initial_cost + c + d.initial_cost,
    })
}

pub fn route(
    graph: &Graph,
    index: &SpatialIndex,
    origin: (f64, f64),
    destination: (f64, f64),
    params: &CostParams,
) -> Result<RouteResponse> {
    let mut state = RequestState::Received;
    tracing::debug!(?state, "route request received");

    // `match_point` only ever fails with `Error::NoMatch`; a miss on either
    // side maps onto the corresponding far-away response code here.
    let origins_r = matcher::match_point(graph, index, origin.0, origin.1, DEFAULT_MATCH_RADIUS_M, params, false);
    let destinations_r = matcher::match_point(graph, index, destination.0, destination.1, DEFAULT_MATCH_RADIUS_M, params, true);

    let (origins, destinations) = match (origins_r, destinations_r) {
        (Ok(o), Ok(d)) => (o, d),
        (Err(_), Err(_)) => {
            state = RequestState::BothFarAway;
            tracing::debug!(?state, "map-matching returned no usable entries");
            return Ok(RouteResponse::error(ResponseCode::BothFarAway));
        }
        (Err(_), Ok(_)) => {
            state = RequestState::OriginFarAway;
            tracing::debug!(?state, "origin outside the search radius");
            return Ok(RouteResponse::error(ResponseCode::OriginFarAway));
        }
        (Ok(_), Err(_)) => {
            state = RequestState::DestinationFarAway;
            tracing::debug!(?state, "destination outside the search radius");
            return Ok(RouteResponse::error(ResponseCode::DestinationFarAway));
        }
    };
    state = RequestState::Matched;
    tracing::debug!(?state, "origin and destination matched");

    let mut candidates: Vec<Candidate> = Vec::new();

    for o in &origins {
        for d in &destinations {
            if o.node == d.node {
                continue;
            }
            if let Some(c) = same_edge_candidate(graph, o, d, params) {
                candidates.push(c);
            }

            match dijkstra::search(graph, &[o.node], params, Some(d.node), None) {
                Ok(result) => {
                    if let Some(path) = result.path_to(d.node) {
                        if let Some(mut segs) = path_segments(graph, &path, params) {
                            if let Some(oe) = &o.initial_edge {
                                let c = cost::cost(0, &as_edge(oe), params).unwrap_or(o.initial_cost);
                                segs.insert(0, synthetic_segment(oe, c));
                            }
                            if let Some(de) = &d.initial_edge {
                                let c = cost::cost(0, &as_edge(de), params).unwrap_or(d.initial_cost);
                                segs.push(synthetic_segment(de, c));
                            }
                            let search_dist = *result.dist.get(&d.node).unwrap_or(&0.0);
                            let total_cost = o.initial_cost + search_dist + d.initial_cost;
                            candidates.push(Candidate {
                                o: o.clone(),
                                d: d.clone(),
                                segments: segs,
                                total_cost,
                            });
                        }
                    }
                }
                Err(Error::NoPath) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    let best = candidates
        .into_iter()
        .filter(|c| c.total_cost.is_finite())
        .min_by(|a, b| a.total_cost.partial_cmp(&b.total_cost).unwrap_or(std::cmp::Ordering::Equal));

    let best = match best {
        Some(b) => b,
        None => {
            state = RequestState::NoRoute;
            tracing::debug!(?state, "no finite-cost candidate route found");
            return Ok(RouteResponse::error(ResponseCode::NoRoute));
        }
    };
    state = RequestState::Searched;
    tracing::debug!(?state, "shortest-path search complete");

    let features: Vec<Feature> = best.segments.iter().map(feature_from_segment).collect();
    let merged_coords: Vec<Vec<f64>> = features
        .iter()
        .flat_map(|f| match &f.geometry {
            Some(g) => match &g.value {
                Value::LineString(coords) => coords.clone(),
                _ => Vec::new(),
            },
            None => Vec::new(),
        })
        .collect();

    let distance: f64 = best.segments.iter().map(|s| s.length).sum();
    let duration = best.total_cost.round() as i64;

    let legs = directions::merge_steps(&best.segments);
    let legs_features: Vec<Vec<Feature>> = vec![legs.iter().map(|s| feature_from_segment(s)).collect()];

    state = RequestState::Assembled;
    tracing::debug!(?state, "response assembled");
    state = RequestState::Responded;
    tracing::debug!(?state, "route request responded");

    Ok(RouteResponse {
        code: ResponseCode::Ok,
        origin: Some(crate::response::point_feature(origin.0, origin.1)),
        destination: Some(crate::response::point_feature(destination.0, destination.1)),
        waypoints: vec![
            crate::response::point_feature(origin.0, origin.1),
            crate::response::point_feature(destination.0, destination.1),
        ],
        routes: vec![Route {
            geometry: Geometry::new(Value::LineString(merged_coords)),
            segments: FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            },
            legs: legs_features,
            duration,
            distance,
            total_cost: best.total_cost,
            summary: String::new(),
        }],
    })
}

fn as_edge(se: &crate::model::SyntheticEdge) -> Edge {
    Edge {
        u: 0,
        v: 1,
        way: se.way,
        geometry: se.geometry.clone(),
        length: se.length,
        incline: se.incline,
        curbramps: se.curbramps,
        marked: se.marked,
        opening_hours: None,
        indoor: None,
        via: None,
        side: None,
        street_name: se.street_name.clone(),
        surface: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::model::{Node, WayKind};

    fn two_block_graph() -> (Graph, SpatialIndex) {
        let nodes = vec![
            Node { lon: -122.312, lat: 47.6558 },
            Node { lon: -122.312, lat: 47.6568 },
            Node { lon: -122.312, lat: 47.6578 },
        ];
        let mut b = GraphBuilder::new().with_nodes(nodes);
        b.add_edge(Edge {
            u: 0,
            v: 1,
            way: WayKind::Sidewalk,
            geometry: vec![(-122.312, 47.6558), (-122.312, 47.6568)],
            length: crate::geo::haversine(&[(-122.312, 47.6558), (-122.312, 47.6568)]),
            incline: 0.01,
            curbramps: None,
            marked: None,
            opening_hours: None,
            indoor: None,
            via: None,
            side: None,
            street_name: Some("1st Ave".into()),
            surface: None,
        });
        b.add_edge(Edge {
            u: 1,
            v: 2,
            way: WayKind::Sidewalk,
            geometry: vec![(-122.312, 47.6568), (-122.312, 47.6578)],
            length: crate::geo::haversine(&[(-122.312, 47.6568), (-122.312, 47.6578)]),
            incline: 0.01,
            curbramps: None,
            marked: None,
            opening_hours: None,
            indoor: None,
            via: None,
            side: None,
            street_name: Some("1st Ave".into()),
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
    fn routes_between_endpoints() {
        let (g, idx) = two_block_graph();
        let params = CostParams::default();
        let resp = route(&g, &idx, (-122.312, 47.6558), (-122.312, 47.6578), &params).unwrap();
        assert_eq!(resp.code, ResponseCode::Ok);
        assert_eq!(resp.routes.len(), 1);
        assert!(resp.routes[0].distance > 0.0);
    }

    #[test]
    fn far_away_origin_is_reported() {
        let (g, idx) = two_block_graph();
        let params = CostParams::default();
        let resp = route(&g, &idx, (0.0, 0.0), (-122.312, 47.6578), &params).unwrap();
        assert_eq!(resp.code, ResponseCode::OriginFarAway);
    }
}
