//! GeoJSON-shaped response types for `/v2/route.json` and
//! `/v2/walkshed.json`, matching spec §6's response object and
//! `accessmapapi.routing.route.dijkstra`'s response dict
//! (`origin`/`destination`/`waypoints`/`routes[0].{geometry,segments,
//! legs,duration,distance,total_cost,summary}`).

use geojson::{Feature, Geometry, Value};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum ResponseCode {
    Ok,
    NoRoute,
    OriginFarAway,
    DestinationFarAway,
    BothFarAway,
    GraphNotReady,
    SpatialIndexNotReady,
    BadInput,
    NoValidNearby,
    NoPath,
    InternalError,
}

pub fn point_feature(lon: f64, lat: f64) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![lon, lat]))),
        id: None,
        properties: Some(serde_json::Map::new()),
        foreign_members: None,
    }
}

#[derive(Debug, Serialize)]
pub struct Route {
    pub geometry: Geometry,
    pub segments: geojson::FeatureCollection,
    pub legs: Vec<Vec<Feature>>,
    pub duration: i64,
    pub distance: f64,
    pub total_cost: f64,
    pub summary: String,
}

#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub code: ResponseCode,
    pub origin: Option<Feature>,
    pub destination: Option<Feature>,
    pub waypoints: Vec<Feature>,
    pub routes: Vec<Route>,
}

impl RouteResponse {
    pub fn error(code: ResponseCode) -> Self {
        RouteResponse {
            code,
            origin: None,
            destination: None,
            waypoints: Vec::new(),
            routes: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WalkshedResponse {
    pub code: ResponseCode,
    pub walkshed: geojson::FeatureCollection,
}
