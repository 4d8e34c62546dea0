//! Turn-by-turn step merging, ported from
//! `accessmapapi.routing.directions.path_to_directions`: drop segments
//! shorter than 3 m, then merge consecutive segments whose tracked
//! attributes all match by concatenating geometry (dropping the
//! duplicate shared vertex) and summing length/cost.

use crate::model::{CurbRamps, WayKind};

const MIN_SEGMENT_LENGTH_M: f64 = 3.0;
/// Inclines within this tolerance are treated as the same "bucket" for
/// merge comparison — consecutive segments of the same sidewalk rarely
/// have bit-identical grades.
const INCLINE_BUCKET: f64 = 0.01;

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub way: WayKind,
    pub geometry: Vec<(f64, f64)>,
    pub length: f64,
    pub cost: f64,
    pub incline: f64,
    pub curbramps: Option<CurbRamps>,
    pub marked: Option<bool>,
    pub indoor: Option<bool>,
    pub surface: Option<String>,
    pub via: Option<String>,
    pub side: Option<String>,
    pub street_name: Option<String>,
}

fn incline_bucket(g: f64) -> i64 {
    (g / INCLINE_BUCKET).round() as i64
}

fn same_group(a: &Segment, b: &Segment) -> bool {
    a.way == b.way
        && a.street_name == b.street_name
        && a.side == b.side
        && incline_bucket(a.incline) == incline_bucket(b.incline)
        && a.curbramps == b.curbramps
        && a.marked == b.marked
        && a.indoor == b.indoor
        && a.surface == b.surface
        && a.via == b.via
}

/// Merge a sequence of per-edge segments into directions legs.
pub fn merge_steps(segments: &[Segment]) -> Vec<Segment> {
    let kept: Vec<&Segment> = segments.iter().filter(|s| s.length >= MIN_SEGMENT_LENGTH_M).collect();

    let mut groups: Vec<Segment> = Vec::new();
    for seg in kept {
        match groups.last_mut() {
            Some(last) if same_group(last, seg) => {
                // drop the duplicate shared vertex at the join
                let mut tail = seg.geometry.clone();
                if !tail.is_empty() {
                    tail.remove(0);
                }
                last.geometry.extend(tail);
                last.length += seg.length;
                last.cost += seg.cost;
            }
            _ => groups.push(seg.clone()),
        }
    }

    groups
}
