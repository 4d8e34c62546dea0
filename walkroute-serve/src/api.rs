//! HTTP handlers for `/v2/route.json` and `/v2/walkshed.json`. Query
//! parameter processing follows `accessmapapi.views.v2.process_cost_args`
//! (pipe-separated `avoid` tokens, `speed` -> `base_speed`,
//! `timestamp` in milliseconds divided by 1000). This module is the
//! single point (spec §7) where `walkroute_core::Error` variants are
//! translated into response `code`s and HTTP statuses.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;
use utoipa::IntoParams;

use walkroute_core::error::Error;
use walkroute_core::model::CostParams;
use walkroute_core::response::{ResponseCode, RouteResponse, WalkshedResponse};
use walkroute_core::state::RequestState;
use walkroute_core::{route, walkshed, EngineState};

#[derive(Debug, Clone)]
pub struct ServerState {
    pub engine: EngineState,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct RouteQuery {
    /// "lat,lon"
    pub origin: String,
    pub destination: String,
    pub avoid: Option<String>,
    pub incline_min: Option<f64>,
    pub incline_max: Option<f64>,
    pub speed: Option<f64>,
    pub timestamp: Option<i64>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct WalkshedQuery {
    pub lon: f64,
    pub lat: f64,
    pub cutoff: Option<f64>,
    pub avoid: Option<String>,
    pub incline_min: Option<f64>,
    pub incline_max: Option<f64>,
    pub speed: Option<f64>,
    pub timestamp: Option<i64>,
}

fn cost_params(
    avoid: &Option<String>,
    incline_min: Option<f64>,
    incline_max: Option<f64>,
    speed: Option<f64>,
    timestamp: Option<i64>,
) -> CostParams {
    let mut params = CostParams::default();

    if let Some(tokens) = avoid {
        for token in tokens.split('|') {
            match token {
                "curbs" => params.avoid_curbs = true,
                "stairs" => params.avoid_stairs = true,
                _ => {}
            }
        }
    }
    if let Some(v) = incline_min {
        params.incline_min = v;
    }
    if let Some(v) = incline_max {
        params.incline_max = v;
    }
    if let Some(v) = speed {
        params.base_speed = v;
    }
    if let Some(ms) = timestamp {
        params.timestamp = Some(ms as f64 / 1000.0);
    }

    params
}

fn parse_lat_lon(s: &str) -> Result<(f64, f64), Error> {
    let (lat, lon) = s
        .split_once(',')
        .ok_or_else(|| Error::InputError(format!("expected \"lat,lon\", got {s:?}")))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| Error::InputError(format!("not a number: {lat:?}")))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|_| Error::InputError(format!("not a number: {lon:?}")))?;
    Ok((lon, lat))
}

fn bad_input(message: &str) -> (StatusCode, Json<RouteResponse>) {
    let resp = RouteResponse::error(ResponseCode::BadInput);
    tracing::debug!(message, state = ?RequestState::BadInput, "rejecting request: bad input");
    (StatusCode::BAD_REQUEST, Json(resp))
}

#[utoipa::path(
    get,
    path = "/v2/route.json",
    params(RouteQuery),
    responses((status = 200, description = "route response"))
)]
pub async fn route_handler(
    State(state): State<Arc<ServerState>>,
    Query(q): Query<RouteQuery>,
) -> impl IntoResponse {
    let origin = match parse_lat_lon(&q.origin) {
        Ok(p) => p,
        Err(e) => return bad_input(&e.to_string()).into_response(),
    };
    let destination = match parse_lat_lon(&q.destination) {
        Ok(p) => p,
        Err(e) => return bad_input(&e.to_string()).into_response(),
    };

    let (graph, index) = match state.engine.get() {
        Ok(pair) => pair,
        Err(_) => {
            tracing::debug!(state = ?RequestState::GraphNotReady, "engine not yet built");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(RouteResponse::error(ResponseCode::GraphNotReady)),
            )
                .into_response()
        }
    };

    let params = cost_params(&q.avoid, q.incline_min, q.incline_max, q.speed, q.timestamp);

    match route(graph, index, origin, destination, &params) {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, state = ?RequestState::InternalError, "route request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RouteResponse::error(ResponseCode::InternalError)),
            )
                .into_response()
        }
    }
}

#[utoipa::path(
    get,
    path = "/v2/walkshed.json",
    params(WalkshedQuery),
    responses((status = 200, description = "walkshed response"))
)]
pub async fn walkshed_handler(
    State(state): State<Arc<ServerState>>,
    Query(q): Query<WalkshedQuery>,
) -> impl IntoResponse {
    let (graph, index) = match state.engine.get() {
        Ok(pair) => pair,
        Err(_) => {
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(WalkshedResponse {
                    code: ResponseCode::GraphNotReady,
                    walkshed: geojson::FeatureCollection {
                        bbox: None,
                        features: Vec::new(),
                        foreign_members: None,
                    },
                }),
            )
                .into_response()
        }
    };

    let cutoff = q.cutoff.unwrap_or(walkroute_core::walkshed::DEFAULT_WALKSHED_CUTOFF_S);
    let params = cost_params(&q.avoid, q.incline_min, q.incline_max, q.speed, q.timestamp);

    match walkshed(graph, index, (q.lon, q.lat), cutoff, &params) {
        Ok(resp) => (StatusCode::OK, Json(resp)).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "walkshed request failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(WalkshedResponse {
                    code: ResponseCode::InternalError,
                    walkshed: geojson::FeatureCollection {
                        bbox: None,
                        features: Vec::new(),
                        foreign_members: None,
                    },
                }),
            )
                .into_response()
        }
    }
}

#[derive(utoipa::OpenApi)]
#[openapi(paths(route_handler, walkshed_handler))]
pub struct ApiDoc;
