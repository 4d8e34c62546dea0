//! Great-circle length, line cutting, bounding boxes and UTM zone
//! selection. Earth radius is fixed at 6 371 000 m (see `SPEC_FULL.md`
//! for why this constant was chosen over 6 378 100 m).

use geo::{HaversineDistance, Point};

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle length of a polyline, summing segment lengths.
pub fn haversine(coords: &[(f64, f64)]) -> f64 {
    coords
        .windows(2)
        .map(|pair| {
            let (lon1, lat1) = pair[0];
            let (lon2, lat2) = pair[1];
            Point::new(lon1, lat1).haversine_distance(&Point::new(lon2, lat2))
        })
        .sum()
}

/// Cut `line` at arc-length `d` from its start. Mirrors `accessmapapi`'s
/// `utils.cut`: out-of-range `d` returns the line unchanged as the sole
/// piece; otherwise returns exactly two pieces whose concatenation
/// reproduces `line`, splitting at an existing vertex when the arc length
/// lands on one.
pub fn cut(line: &[(f64, f64)], d: f64) -> Vec<Vec<(f64, f64)>> {
    let total = haversine(line);
    if d <= 0.0 || d >= total {
        return vec![line.to_vec()];
    }

    let mut accumulated = 0.0;
    for i in 0..line.len() - 1 {
        let (lon1, lat1) = line[i];
        let (lon2, lat2) = line[i + 1];
        let seg_len = Point::new(lon1, lat1).haversine_distance(&Point::new(lon2, lat2));

        if (accumulated - d).abs() < 1e-9 {
            return vec![line[..=i].to_vec(), line[i..].to_vec()];
        }
        if accumulated + seg_len > d {
            let t = (d - accumulated) / seg_len;
            let split = (lon1 + t * (lon2 - lon1), lat1 + t * (lat2 - lat1));

            let mut first = line[..=i].to_vec();
            first.push(split);
            let mut second = vec![split];
            second.extend_from_slice(&line[i + 1..]);
            return vec![first, second];
        }
        accumulated += seg_len;
    }

    vec![line.to_vec()]
}

/// `[w, s, e, n]` square bbox enclosing a circle of radius `meters` around
/// `(lon, lat)`, in degrees.
pub fn bbox_from_center(lon: f64, lat: f64, meters: f64) -> [f64; 4] {
    let dlat = (meters / EARTH_RADIUS_M).to_degrees();
    let dlon = (meters / (EARTH_RADIUS_M * lat.to_radians().cos())).to_degrees();
    [lon - dlon, lat - dlat, lon + dlon, lat + dlat]
}

/// UTM zone EPSG code for a longitude/latitude, for accurate local metric
/// projection during map-matching.
pub fn lonlat_to_utm_epsg(lon: f64, lat: f64) -> u32 {
    let zone = (((lon + 180.0) / 6.0).floor() as i64 + 1).clamp(1, 60) as u32;
    if lat >= 0.0 {
        32600 + zone
    } else {
        32700 + zone
    }
}
