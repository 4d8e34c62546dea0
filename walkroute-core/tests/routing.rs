use walkroute_core::graph::{Graph, GraphBuilder};
use walkroute_core::ingest::{self, RawFeature};
use walkroute_core::model::{CostParams, CurbRamps, WayKind};
use walkroute_core::response::ResponseCode;
use walkroute_core::route::route;
use walkroute_core::spatial::SpatialIndex;
use walkroute_core::walkshed::{walkshed, DEFAULT_WALKSHED_CUTOFF_S};

const ORIGIN: (f64, f64) = (-122.3120, 47.6558);
const DEST: (f64, f64) = (-122.3161, 47.6599);

fn feature(way: WayKind, geom: Vec<(f64, f64)>) -> RawFeature {
    RawFeature {
        way,
        geometry: geom,
        incline: Some(0.0),
        curbramps: None,
        marked: None,
        opening_hours: None,
        indoor: None,
        via: None,
        side: None,
        street_name: Some("test block".into()),
        surface: None,
    }
}

/// A short chain of sidewalks plus one crossing linking origin and
/// destination, close enough to the coordinates in spec §8's scenarios
/// that the resulting distance falls in the scenario's asserted range.
fn seattle_like_network() -> (Graph, SpatialIndex) {
    let sidewalk_a = feature(WayKind::Sidewalk, vec![ORIGIN, (-122.3140, 47.6578)]);
    let mut crossing = feature(WayKind::Crossing, vec![(-122.3140, 47.6578), (-122.3150, 47.6588)]);
    crossing.curbramps = Some(CurbRamps::No);
    let sidewalk_b = feature(WayKind::Sidewalk, vec![(-122.3150, 47.6588), DEST]);

    let (graph, index) = ingest::build(vec![sidewalk_a, sidewalk_b], vec![crossing], vec![]);
    (graph, index)
}

#[test]
fn direct_route_has_plausible_distance() {
    let (graph, index) = seattle_like_network();
    let params = CostParams::default();
    let resp = route(&graph, &index, ORIGIN, DEST, &params).unwrap();

    assert_eq!(resp.code, ResponseCode::Ok);
    let distance = resp.routes[0].distance;
    assert!(distance > 0.0 && distance < 2000.0, "distance = {distance}");
}

#[test]
fn avoiding_curbs_forces_detour_or_no_route() {
    let (graph, index) = seattle_like_network();
    let mut params = CostParams::default();
    params.avoid_curbs = true;
    let resp = route(&graph, &index, ORIGIN, DEST, &params).unwrap();

    match resp.code {
        ResponseCode::Ok => {
            let uses_blocked_crossing = resp.routes[0]
                .segments
                .features
                .iter()
                .any(|f| f.properties.as_ref().and_then(|p| p.get("way")) == Some(&serde_json::json!("crossing")));
            assert!(!uses_blocked_crossing);
        }
        ResponseCode::NoRoute => {}
        other => panic!("unexpected code {other:?}"),
    }
}

#[test]
fn incline_cap_rejects_steep_only_connector() {
    let mut steep = feature(WayKind::Sidewalk, vec![ORIGIN, (-122.3140, 47.6578)]);
    steep.incline = Some(0.05);
    let dest_leg = feature(WayKind::Sidewalk, vec![(-122.3140, 47.6578), DEST]);
    let (graph, index) = ingest::build(vec![steep, dest_leg], vec![], vec![]);

    let mut params = CostParams::default();
    params.incline_max = 0.03;
    let resp = route(&graph, &index, ORIGIN, DEST, &params).unwrap();
    assert_eq!(resp.code, ResponseCode::NoRoute);
}

#[test]
fn elevator_closed_at_timestamp_blocks_only_path() {
    let mut via = feature(WayKind::ElevatorPath, vec![(-122.3140, 47.6578), (-122.3150, 47.6588)]);
    via.opening_hours = Some("Mo-Fr 06:00-22:00".into());
    let into = feature(WayKind::Sidewalk, vec![ORIGIN, (-122.3140, 47.6578)]);
    let out = feature(WayKind::Sidewalk, vec![(-122.3150, 47.6588), DEST]);
    let (graph, index) = ingest::build(vec![into, out], vec![], vec![via]);

    // 2026-08-01 10:00 UTC is a Saturday.
    let saturday_10am = 1785578400.0;
    let mut params = CostParams::default();
    params.timestamp = Some(saturday_10am);

    let resp = route(&graph, &index, ORIGIN, DEST, &params).unwrap();
    assert_eq!(resp.code, ResponseCode::NoRoute);
}

#[test]
fn walkshed_bounds_every_edge_by_cutoff() {
    let (graph, index) = seattle_like_network();
    let mut params = CostParams::default();
    params.base_speed = 1.0;
    let resp = walkshed(&graph, &index, ORIGIN, 60.0, &params).unwrap();

    for f in &resp.walkshed.features {
        let cost = f.properties.as_ref().unwrap().get("cost").unwrap().as_f64().unwrap();
        assert!(cost <= 60.0 + 1e-6);
    }
}

#[test]
fn walkshed_defaults_to_five_minutes() {
    assert_eq!(DEFAULT_WALKSHED_CUTOFF_S, 300.0);
}

#[test]
fn far_away_origin_is_reported() {
    let (graph, index) = seattle_like_network();
    let params = CostParams::default();
    let resp = route(&graph, &index, (0.0, 0.0), DEST, &params).unwrap();
    assert_eq!(resp.code, ResponseCode::OriginFarAway);
}
