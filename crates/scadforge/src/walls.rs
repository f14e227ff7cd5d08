//! Hull-based stitching: turn sparse anchor solids into connected walls
//! and surfaces.
//!
//! Anchors are ordinary solids, typically small marker spheres placed at
//! key positions. [`build_wall`] drops a floor-standing wall under a run
//! of anchors; [`triangle_hulls`] skins an anchor strip with overlapping
//! three-anchor hulls.

use crate::{ScadError, Shape3};
use scadforge_ir::Round;

/// A positioned solid used as a stitching endpoint.
pub type Anchor = Shape3;

/// Small marker sphere for use as an anchor.
pub fn post(diameter: f64, segments: Option<u32>) -> Anchor {
    crate::primitives::sphere(Round::Diameter(diameter), segments).into_shape()
}

/// Build a wall that runs under a row of anchors down to the floor.
///
/// The hull of all anchors is flattened to its XY footprint, extruded into
/// a 1-unit floor slab, and hulled with the original edge so the wall
/// spans from z=0 up to the anchors. Needs at least 2 anchors.
pub fn build_wall(anchors: &[Anchor]) -> crate::Result<Shape3> {
    let (first, rest) = match anchors.split_first() {
        Some(split) => split,
        None => {
            return Err(ScadError::InsufficientAnchors { needed: 2, got: 0 });
        }
    };
    if rest.is_empty() {
        return Err(ScadError::InsufficientAnchors { needed: 2, got: 1 });
    }
    let rest: Vec<&Shape3> = rest.iter().collect();
    let edge = first.hull_with(&rest);
    // Slab is not centered: it must sit on the floor, not straddle it.
    let slab = edge.projection().linear_extrude(1.0, false);
    Ok(slab.hull(&edge))
}

/// Skin a strip of anchors with overlapping triangle hulls.
///
/// `None` entries are skipped, so callers can pass a fixed-shape grid row
/// with holes in it. Every consecutive window of 3 remaining anchors
/// becomes one hull (n anchors give n-2 hulls), and the hulls are joined
/// by a single union. Needs at least 3 anchors after filtering.
pub fn triangle_hulls(anchors: &[Option<Anchor>]) -> crate::Result<Shape3> {
    let present: Vec<&Anchor> = anchors.iter().flatten().collect();
    if present.len() < 3 {
        return Err(ScadError::InsufficientAnchors {
            needed: 3,
            got: present.len(),
        });
    }
    let hulls: Vec<Shape3> = present
        .windows(3)
        .map(|w| w[0].hull_with(&[w[1], w[2]]))
        .collect();
    let rest: Vec<&Shape3> = hulls[1..].iter().collect();
    Ok(hulls[0].union_with(&rest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scadforge_ir::ScadOp;

    fn anchor_at(x: f64, z: f64) -> Anchor {
        post(2.0, Some(16)).translate([x, 0.0, z])
    }

    #[test]
    fn wall_is_one_top_level_hull() {
        let wall = build_wall(&[anchor_at(0.0, 10.0), anchor_at(20.0, 12.0)]).unwrap();
        let doc = wall.to_document();
        let root = &doc.nodes[&doc.roots[0]];
        let children = match &root.op {
            ScadOp::Hull { children } => children,
            other => panic!("expected Hull root, got {other:?}"),
        };
        assert_eq!(children.len(), 2);
        // First child is the floor slab: extrude over projection, uncentered.
        match &doc.nodes[&children[0]].op {
            ScadOp::LinearExtrude { child, height, center } => {
                assert_eq!(*height, 1.0);
                assert!(!center);
                assert!(matches!(doc.nodes[child].op, ScadOp::Projection { .. }));
            }
            other => panic!("expected extruded slab first, got {other:?}"),
        }
    }

    #[test]
    fn wall_needs_two_anchors() {
        for anchors in [vec![], vec![anchor_at(0.0, 10.0)]] {
            let err = build_wall(&anchors).unwrap_err();
            assert!(matches!(
                err,
                ScadError::InsufficientAnchors { needed: 2, .. }
            ));
        }
    }

    #[test]
    fn triangle_hulls_make_n_minus_two_windows() {
        let anchors: Vec<Option<Anchor>> = (0..5)
            .map(|i| Some(anchor_at(f64::from(i) * 10.0, 10.0)))
            .collect();
        let doc = triangle_hulls(&anchors).unwrap().to_document();
        let hulls = doc
            .nodes
            .values()
            .filter(|n| matches!(n.op, ScadOp::Hull { .. }))
            .count();
        assert_eq!(hulls, 3);
        // One top-level union over all windows.
        match &doc.nodes[&doc.roots[0]].op {
            ScadOp::Union { children } => assert_eq!(children.len(), 3),
            other => panic!("expected Union root, got {other:?}"),
        }
    }

    #[test]
    fn triangle_hulls_skip_missing_anchors() {
        let anchors = vec![
            Some(anchor_at(0.0, 10.0)),
            None,
            Some(anchor_at(10.0, 10.0)),
            None,
            Some(anchor_at(20.0, 10.0)),
            Some(anchor_at(30.0, 10.0)),
        ];
        let doc = triangle_hulls(&anchors).unwrap().to_document();
        // 4 present anchors give 2 windows.
        match &doc.nodes[&doc.roots[0]].op {
            ScadOp::Union { children } => assert_eq!(children.len(), 2),
            other => panic!("expected Union root, got {other:?}"),
        }
    }

    #[test]
    fn triangle_hulls_need_three_present() {
        let err = triangle_hulls(&[Some(anchor_at(0.0, 10.0)), None, Some(anchor_at(10.0, 10.0))])
            .unwrap_err();
        assert!(matches!(
            err,
            ScadError::InsufficientAnchors { needed: 3, got: 2 }
        ));
    }

    #[test]
    fn windows_slide_by_one() {
        // 3 anchors: exactly one hull, root is still a union of one.
        let anchors: Vec<Option<Anchor>> = (0..3)
            .map(|i| Some(anchor_at(f64::from(i) * 10.0, 10.0)))
            .collect();
        let doc = triangle_hulls(&anchors).unwrap().to_document();
        match &doc.nodes[&doc.roots[0]].op {
            ScadOp::Union { children } => assert_eq!(children.len(), 1),
            other => panic!("expected Union root, got {other:?}"),
        }
    }
}
