//! Reads the engine's own on-disk GeoJSON layers
//! (`{sidewalks,crossings,elevator_paths}.geojson` under `PEDDATADIR`)
//! into `walkroute_core::ingest::RawFeature`s. General vector-format
//! ingestion and conversion from upstream sources is out of this
//! repository's scope (spec.md §1); this is just the glue needed to get
//! already-shaped features into the graph builder.

use std::path::Path;

use anyhow::{Context, Result};
use geojson::{GeoJson, Value};
use walkroute_core::ingest::RawFeature;
use walkroute_core::model::{CurbRamps, WayKind};

fn linestring_coords(value: &Value) -> Option<Vec<(f64, f64)>> {
    match value {
        Value::LineString(coords) => Some(coords.iter().map(|c| (c[0], c[1])).collect()),
        _ => None,
    }
}

fn read_layer(path: &Path, way: WayKind) -> Result<Vec<RawFeature>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let geojson: GeoJson = text.parse().with_context(|| format!("parsing {}", path.display()))?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => anyhow::bail!("{} is not a FeatureCollection", path.display()),
    };

    let mut features = Vec::new();
    for f in collection.features {
        let geometry = match f.geometry.as_ref().and_then(|g| linestring_coords(&g.value)) {
            Some(g) => g,
            None => {
                tracing::warn!(path = %path.display(), "skipping non-LineString feature");
                continue;
            }
        };

        let props = f.properties.clone().unwrap_or_default();
        let incline = props.get("incline").and_then(|v| v.as_f64());
        let curbramps = props.get("curbramps").and_then(|v| v.as_str()).map(|s| match s {
            "yes" => CurbRamps::Yes,
            "no" => CurbRamps::No,
            _ => CurbRamps::Unknown,
        });
        let marked = props.get("marked").and_then(|v| v.as_bool());
        let opening_hours = props.get("opening_hours").and_then(|v| v.as_str()).map(String::from);
        let indoor = props.get("indoor").and_then(|v| v.as_bool());
        let via = props.get("via").and_then(|v| v.as_str()).map(String::from);
        let side = props.get("side").and_then(|v| v.as_str()).map(String::from);
        let street_name = props.get("street_name").and_then(|v| v.as_str()).map(String::from);
        let surface = props.get("surface").and_then(|v| v.as_str()).map(String::from);

        features.push(RawFeature {
            way,
            geometry,
            incline,
            curbramps,
            marked,
            opening_hours,
            indoor,
            via,
            side,
            street_name,
            surface,
        });
    }

    Ok(features)
}

pub struct Layers {
    pub sidewalks: Vec<RawFeature>,
    pub crossings: Vec<RawFeature>,
    pub elevator_paths: Vec<RawFeature>,
}

pub fn load(data_dir: &Path) -> Result<Layers> {
    Ok(Layers {
        sidewalks: read_layer(&data_dir.join("sidewalks.geojson"), WayKind::Sidewalk)?,
        crossings: read_layer(&data_dir.join("crossings.geojson"), WayKind::Crossing)?,
        elevator_paths: read_layer(&data_dir.join("elevator_paths.geojson"), WayKind::ElevatorPath)?,
    })
}
