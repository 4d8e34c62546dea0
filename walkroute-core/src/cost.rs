//! The pure cost function: `cost(u, v, edge) -> seconds | infinity`,
//! closed over a `CostParams`. Ported literally from spec §4.4 — no
//! closer grounding source survived in `original_source` (the retained
//! `costs.py` revision is the older pgRouting piecewise-linear model, not
//! this Tobler-style one), so the math below follows the specification's
//! formulas directly.

use crate::model::{CostParams, CurbRamps, Edge, NodeId, WayKind};
use crate::opening_hours;

const IDEAL_GRADE: f64 = -0.0087;
const CROSSING_DELAY_S: f64 = 30.0;

/// `None` models a hard filter having rejected the traversal ("forbidden",
/// in the vocabulary of spec §4.4/§7). A `Some` value is always finite and
/// non-negative.
pub fn cost(from: NodeId, edge: &Edge, params: &CostParams) -> Option<f64> {
    let g = edge.effective_incline(from);

    if g < params.incline_min || g > params.incline_max {
        return None;
    }
    if params.avoid_curbs && edge.way == WayKind::Crossing && edge.curbramps == Some(CurbRamps::No)
    {
        return None;
    }
    if params.avoid_stairs && edge.surface.as_deref() == Some("stairs") {
        return None;
    }
    if let (Some(expr), Some(ts)) = (&edge.opening_hours, params.timestamp) {
        if !opening_hours::is_open(expr, ts) {
            return None;
        }
    }

    let k_up = 5f64.ln() / (params.incline_max - IDEAL_GRADE).abs();
    let k_down = 5f64.ln() / (params.incline_min - IDEAL_GRADE).abs();
    let k = if g > IDEAL_GRADE { k_up } else { k_down };

    let speed = params.base_speed * (-k * (g - IDEAL_GRADE).abs()).exp();
    if speed <= 0.0 {
        return None;
    }

    let mut time = edge.length / speed;
    if edge.way == WayKind::Crossing {
        time += CROSSING_DELAY_S;
    }
    Some(time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::WayKind;
    use approx::assert_relative_eq;

    fn sidewalk(u: NodeId, v: NodeId, length: f64, incline: f64) -> Edge {
        Edge {
            u,
            v,
            way: WayKind::Sidewalk,
            geometry: vec![(0.0, 0.0), (0.0, 0.001)],
            length,
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
    fn cost_is_nonnegative_and_finite_when_allowed() {
        let e = sidewalk(0, 1, 100.0, 0.02);
        let c = cost(0, &e, &CostParams::default()).unwrap();
        assert!(c >= 0.0 && c.is_finite());
    }

    #[test]
    fn steep_incline_is_hard_blocked() {
        let e = sidewalk(0, 1, 100.0, 0.2);
        assert!(cost(0, &e, &CostParams::default()).is_none());
    }

    #[test]
    fn reversal_negates_incline_but_preserves_length() {
        let e = sidewalk(0, 1, 100.0, 0.05);
        assert_relative_eq!(e.effective_incline(0), 0.05);
        assert_relative_eq!(e.effective_incline(1), -0.05);
        assert_eq!(e.length, 100.0);
    }

    #[test]
    fn avoid_curbs_blocks_no_ramp_crossing() {
        let mut e = sidewalk(0, 1, 20.0, 0.0);
        e.way = WayKind::Crossing;
        e.curbramps = Some(CurbRamps::No);
        let mut params = CostParams::default();
        params.avoid_curbs = true;
        assert!(cost(0, &e, &params).is_none());

        params.avoid_curbs = false;
        assert!(cost(0, &e, &params).is_some());
    }

    #[test]
    fn crossing_adds_fixed_delay() {
        let mut plain = sidewalk(0, 1, 20.0, 0.0);
        let mut crossing = sidewalk(0, 1, 20.0, 0.0);
        crossing.way = WayKind::Crossing;
        let params = CostParams::default();
        let c_sidewalk = cost(0, &plain, &params).unwrap();
        let c_crossing = cost(0, &crossing, &params).unwrap();
        assert_relative_eq!(c_crossing - c_sidewalk, 30.0, epsilon = 1e-9);
        plain.way = WayKind::Sidewalk;
    }

    #[test]
    fn monotonic_incline_max_relaxation_never_increases_cost() {
        let e = sidewalk(0, 1, 100.0, 0.08);
        let mut tight = CostParams::default();
        tight.incline_max = 0.085;
        let mut loose = tight;
        loose.incline_max = 0.2;

        let c_tight = cost(0, &e, &tight).unwrap();
        let c_loose = cost(0, &e, &loose).unwrap();
        assert!(c_loose <= c_tight + 1e-9);
    }
}
