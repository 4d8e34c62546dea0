//! Static R-tree spatial index over edge bounding boxes. Grounded in the
//! teacher's `step9::spatial::SpatialIndex` (an `rstar::RTree` wrapper
//! with a `MAX_SNAP_DISTANCE_M` cutoff) and `accessmapapi.network.make_sindex`,
//! which indexes both node points and edge bounding boxes — here edges
//! carry enough geometry that node lookups aren't needed separately.

use rstar::{RTreeObject, AABB};

use crate::model::NodeId;

/// One edge's indexed bounding box. `edge_idx` is the position into
/// `Graph::all_edges`/`edge_by_index`.
#[derive(Debug, Clone, Copy)]
pub struct IndexedEdge {
    pub edge_idx: usize,
    pub u: NodeId,
    pub v: NodeId,
    bbox: [f64; 4], // w, s, e, n
}

impl RTreeObject for IndexedEdge {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners([self.bbox[0], self.bbox[1]], [self.bbox[2], self.bbox[3]])
    }
}

pub struct SpatialIndex {
    tree: rstar::RTree<IndexedEdge>,
}

impl SpatialIndex {
    /// Build from `(edge_idx, u, v, geometry)` triples, one per edge.
    pub fn build<'a, I>(edges: I) -> Self
    where
        I: IntoIterator<Item = (usize, NodeId, NodeId, &'a [(f64, f64)])>,
    {
        let items: Vec<IndexedEdge> = edges
            .into_iter()
            .map(|(edge_idx, u, v, geometry)| {
                let mut w = f64::INFINITY;
                let mut s = f64::INFINITY;
                let mut e = f64::NEG_INFINITY;
                let mut n = f64::NEG_INFINITY;
                for &(lon, lat) in geometry {
                    w = w.min(lon);
                    e = e.max(lon);
                    s = s.min(lat);
                    n = n.max(lat);
                }
                IndexedEdge {
                    edge_idx,
                    u,
                    v,
                    bbox: [w, s, e, n],
                }
            })
            .collect();
        SpatialIndex {
            tree: rstar::RTree::bulk_load(items),
        }
    }

    /// Candidate edges whose bbox intersects the query bbox `[w, s, e, n]`.
    /// This is a superset of true geometric hits — callers must refine
    /// with exact projected distance (spec §4.2).
    pub fn candidates(&self, bbox: [f64; 4]) -> Vec<IndexedEdge> {
        let envelope = AABB::from_corners([bbox[0], bbox[1]], [bbox[2], bbox[3]]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .copied()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_intersecting_bbox() {
        let geoms = vec![(0, 0u32, 1u32, vec![(0.0, 0.0), (0.0, 0.01)])];
        let refs: Vec<_> = geoms
            .iter()
            .map(|(i, u, v, g)| (*i, *u, *v, g.as_slice()))
            .collect();
        let idx = SpatialIndex::build(refs);
        let hits = idx.candidates([-0.01, -0.01, 0.01, 0.02]);
        assert_eq!(hits.len(), 1);

        let miss = idx.candidates([10.0, 10.0, 11.0, 11.0]);
        assert!(miss.is_empty());
    }
}
