#![warn(missing_docs)]

//! scadforge — CSG authoring in Rust, emitted as OpenSCAD text.
//!
//! Shapes are immutable values over a declarative IR: primitives come from
//! the factory functions in [`primitives`], every operation allocates a new
//! shape, and nothing is evaluated geometrically — the final expression is
//! rendered to an OpenSCAD program and handed to the external renderer.
//!
//! # Example
//!
//! ```rust
//! use scadforge::{cube, cylinder, CylinderSize};
//!
//! let body = cube([20.0, 20.0, 10.0]);
//! let bore = cylinder(CylinderSize::Radius(3.0), 12.0, Some(32));
//! let part = body.shape().difference(bore.shape());
//! let scad = part.to_scad().unwrap();
//! assert!(scad.starts_with("difference() {"));
//! ```

use scadforge_ir::{Document, IrError, Node, NodeId, ScadOp};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

pub mod args;
pub mod export;
pub mod primitives;
pub mod walls;

pub use primitives::{
    circle, cube, cylinder, cylinder_sector, import_mesh, import_profile, polygon, polyhedron,
    regular_polygon, sphere, square, text, text_3d, text_with, Alignable, Axis, Cube, TextSpec,
};
pub use scadforge_ir::{CylinderSize, Dim, OffsetKind, Round};
pub use walls::{build_wall, post, triangle_hulls, Anchor};

/// Errors returned by authoring operations.
#[derive(Error, Debug)]
pub enum ScadError {
    /// An I/O error occurred while writing output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The IR graph is structurally invalid (dangling reference or a
    /// 2D/3D dimension mismatch).
    #[error(transparent)]
    Ir(#[from] IrError),

    /// A primitive was given an unusable property record.
    #[error("invalid property: {0}")]
    InvalidProperty(String),

    /// Wall stitching was given too few valid anchors.
    #[error("stitching needs at least {needed} anchors, got {got}")]
    InsufficientAnchors {
        /// Minimum anchor count for the operation.
        needed: usize,
        /// Valid anchors actually supplied.
        got: usize,
    },
}

/// Result type for authoring operations.
pub type Result<T> = std::result::Result<T, ScadError>;

/// Global atomic counter for unique IR node ids.
static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

fn alloc_node_id() -> NodeId {
    NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed)
}

/// An immutable expression sub-graph: root id plus every reachable node.
///
/// Shared internal representation of [`Shape2`] and [`Shape3`]; the typed
/// wrappers are what keep dimension-specific operations apart.
#[derive(Debug, Clone)]
struct Expr {
    root: NodeId,
    nodes: HashMap<NodeId, Node>,
}

impl Expr {
    fn leaf(op: ScadOp) -> Self {
        let id = alloc_node_id();
        let mut nodes = HashMap::new();
        nodes.insert(id, Node { id, name: None, op });
        Self { root: id, nodes }
    }

    fn unary(&self, op_fn: impl FnOnce(NodeId) -> ScadOp) -> Self {
        let id = alloc_node_id();
        let mut nodes = self.nodes.clone();
        nodes.insert(
            id,
            Node {
                id,
                name: None,
                op: op_fn(self.root),
            },
        );
        Self { root: id, nodes }
    }

    /// Build an n-ary node over `self` followed by `others`, merging all
    /// operand node maps.
    fn nary(&self, others: &[&Expr], op_fn: impl FnOnce(Vec<NodeId>) -> ScadOp) -> Self {
        let id = alloc_node_id();
        let mut nodes = self.nodes.clone();
        let mut children = Vec::with_capacity(others.len() + 1);
        children.push(self.root);
        for other in others {
            nodes.extend(other.nodes.iter().map(|(&k, v)| (k, v.clone())));
            children.push(other.root);
        }
        nodes.insert(
            id,
            Node {
                id,
                name: None,
                op: op_fn(children),
            },
        );
        Self { root: id, nodes }
    }

    fn with_name(mut self, name: &str) -> Self {
        if let Some(node) = self.nodes.get_mut(&self.root) {
            node.name = Some(name.to_string());
        }
        self
    }

    fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.nodes = self.nodes.clone();
        doc.roots.push(self.root);
        doc
    }
}

/// A 3D shape — an immutable solid expression.
///
/// Created by the primitive factory ([`cube`], [`sphere`], [`cylinder`],
/// [`polyhedron`], [`import_mesh`]) or by applying an operation to existing
/// shapes. Operations never mutate; each returns a freshly allocated value.
/// `+`, `-` and `&` are shorthands for union, difference and intersection.
#[derive(Debug, Clone)]
pub struct Shape3(Expr);

impl Shape3 {
    pub(crate) fn from_op(op: ScadOp) -> Self {
        Self(Expr::leaf(op))
    }

    pub(crate) fn wrap(&self, op_fn: impl FnOnce(NodeId) -> ScadOp) -> Self {
        Self(self.0.unary(op_fn))
    }

    fn combine(
        &self,
        others: &[&Shape3],
        op_fn: impl FnOnce(Vec<NodeId>) -> ScadOp,
    ) -> Self {
        let exprs: Vec<&Expr> = others.iter().map(|s| &s.0).collect();
        Self(self.0.nary(&exprs, op_fn))
    }

    /// Translate by an offset vector.
    pub fn translate(&self, v: [f64; 3]) -> Self {
        self.wrap(|child| ScadOp::Translate {
            child,
            offset: v.into(),
        })
    }

    /// Rotate by Euler angles in degrees (X, then Y, then Z).
    pub fn rotate(&self, degrees: [f64; 3]) -> Self {
        self.wrap(|child| ScadOp::Rotate {
            child,
            angles: degrees.into(),
        })
    }

    /// Non-uniform scale.
    pub fn scale(&self, factor: [f64; 3]) -> Self {
        self.wrap(|child| ScadOp::Scale {
            child,
            factor: factor.into(),
        })
    }

    /// Mirror across the plane through the origin with the given normal.
    pub fn mirror(&self, normal: [f64; 3]) -> Self {
        self.wrap(|child| ScadOp::Mirror {
            child,
            normal: normal.into(),
        })
    }

    /// Boolean union with another solid.
    pub fn union(&self, other: &Shape3) -> Self {
        self.combine(&[other], |children| ScadOp::Union { children })
    }

    /// Boolean union with all of `others` as one n-ary node.
    pub fn union_with(&self, others: &[&Shape3]) -> Self {
        self.combine(others, |children| ScadOp::Union { children })
    }

    /// Boolean difference; `self` is the retained base.
    pub fn difference(&self, other: &Shape3) -> Self {
        self.combine(&[other], |children| ScadOp::Difference { children })
    }

    /// Boolean difference subtracting all of `subtrahends` from `self`.
    pub fn difference_with(&self, subtrahends: &[&Shape3]) -> Self {
        self.combine(subtrahends, |children| ScadOp::Difference { children })
    }

    /// Boolean intersection with another solid.
    pub fn intersection(&self, other: &Shape3) -> Self {
        self.combine(&[other], |children| ScadOp::Intersection { children })
    }

    /// Boolean intersection with all of `others` as one n-ary node.
    pub fn intersection_with(&self, others: &[&Shape3]) -> Self {
        self.combine(others, |children| ScadOp::Intersection { children })
    }

    /// Convex hull with another solid.
    pub fn hull(&self, other: &Shape3) -> Self {
        self.combine(&[other], |children| ScadOp::Hull { children })
    }

    /// Convex hull over `self` and all of `others` as one n-ary node.
    pub fn hull_with(&self, others: &[&Shape3]) -> Self {
        self.combine(others, |children| ScadOp::Hull { children })
    }

    /// Display color (name or `#rrggbb`); does not alter geometry.
    pub fn color(&self, color: &str) -> Self {
        self.wrap(|child| ScadOp::Color {
            child,
            color: color.to_string(),
        })
    }

    /// Debug highlight marker; does not alter geometry.
    pub fn debug(&self) -> Self {
        self.wrap(|child| ScadOp::Highlight { child })
    }

    /// Flatten onto the XY plane, producing a profile.
    pub fn projection(&self) -> Shape2 {
        Shape2(self.0.unary(|child| ScadOp::Projection { child }))
    }

    /// Name the root node (shows up in document listings).
    pub fn named(self, name: &str) -> Self {
        Self(self.0.with_name(name))
    }

    /// Extract the IR document with this shape as the single root.
    pub fn to_document(&self) -> Document {
        self.0.to_document()
    }

    /// Render this shape to OpenSCAD text.
    ///
    /// A pure function of the value: the same shape always renders to
    /// identical text.
    pub fn to_scad(&self) -> Result<String> {
        export::scad::emit_document(&self.to_document())
    }

    /// Render to OpenSCAD text and write it to `path`.
    pub fn write_scad(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        std::fs::write(path, self.to_scad()?)?;
        Ok(())
    }
}

/// A 2D shape — an immutable profile expression.
///
/// Carries the planar subset of the operation set plus the 2D-only
/// operations [`Shape2::offset`] and [`Shape2::linear_extrude`]; there is
/// no way to mix profiles and solids in one boolean or hull.
#[derive(Debug, Clone)]
pub struct Shape2(Expr);

impl Shape2 {
    pub(crate) fn from_op(op: ScadOp) -> Self {
        Self(Expr::leaf(op))
    }

    fn wrap(&self, op_fn: impl FnOnce(NodeId) -> ScadOp) -> Self {
        Self(self.0.unary(op_fn))
    }

    fn combine(
        &self,
        others: &[&Shape2],
        op_fn: impl FnOnce(Vec<NodeId>) -> ScadOp,
    ) -> Self {
        let exprs: Vec<&Expr> = others.iter().map(|s| &s.0).collect();
        Self(self.0.nary(&exprs, op_fn))
    }

    /// Translate in the plane.
    pub fn translate(&self, v: [f64; 2]) -> Self {
        self.wrap(|child| ScadOp::Translate {
            child,
            offset: [v[0], v[1], 0.0].into(),
        })
    }

    /// Rotate by Euler angles in degrees.
    pub fn rotate(&self, degrees: [f64; 3]) -> Self {
        self.wrap(|child| ScadOp::Rotate {
            child,
            angles: degrees.into(),
        })
    }

    /// Scale in the plane.
    pub fn scale(&self, factor: [f64; 2]) -> Self {
        self.wrap(|child| ScadOp::Scale {
            child,
            factor: [factor[0], factor[1], 1.0].into(),
        })
    }

    /// Mirror across the line through the origin with the given normal.
    pub fn mirror(&self, normal: [f64; 2]) -> Self {
        self.wrap(|child| ScadOp::Mirror {
            child,
            normal: [normal[0], normal[1], 0.0].into(),
        })
    }

    /// Boolean union with another profile.
    pub fn union(&self, other: &Shape2) -> Self {
        self.combine(&[other], |children| ScadOp::Union { children })
    }

    /// Boolean union with all of `others` as one n-ary node.
    pub fn union_with(&self, others: &[&Shape2]) -> Self {
        self.combine(others, |children| ScadOp::Union { children })
    }

    /// Boolean difference; `self` is the retained base.
    pub fn difference(&self, other: &Shape2) -> Self {
        self.combine(&[other], |children| ScadOp::Difference { children })
    }

    /// Boolean difference subtracting all of `subtrahends` from `self`.
    pub fn difference_with(&self, subtrahends: &[&Shape2]) -> Self {
        self.combine(subtrahends, |children| ScadOp::Difference { children })
    }

    /// Boolean intersection with another profile.
    pub fn intersection(&self, other: &Shape2) -> Self {
        self.combine(&[other], |children| ScadOp::Intersection { children })
    }

    /// Boolean intersection with all of `others` as one n-ary node.
    pub fn intersection_with(&self, others: &[&Shape2]) -> Self {
        self.combine(others, |children| ScadOp::Intersection { children })
    }

    /// Convex hull with another profile.
    pub fn hull(&self, other: &Shape2) -> Self {
        self.combine(&[other], |children| ScadOp::Hull { children })
    }

    /// Convex hull over `self` and all of `others` as one n-ary node.
    pub fn hull_with(&self, others: &[&Shape2]) -> Self {
        self.combine(others, |children| ScadOp::Hull { children })
    }

    /// Signed contour offset.
    pub fn offset(&self, kind: OffsetKind) -> Self {
        self.wrap(|child| ScadOp::Offset { child, kind })
    }

    /// Extrude into a solid along Z.
    pub fn linear_extrude(&self, height: f64, center: bool) -> Shape3 {
        Shape3(self.0.unary(|child| ScadOp::LinearExtrude {
            child,
            height,
            center,
        }))
    }

    /// Display color (name or `#rrggbb`); does not alter geometry.
    pub fn color(&self, color: &str) -> Self {
        self.wrap(|child| ScadOp::Color {
            child,
            color: color.to_string(),
        })
    }

    /// Debug highlight marker; does not alter geometry.
    pub fn debug(&self) -> Self {
        self.wrap(|child| ScadOp::Highlight { child })
    }

    /// Name the root node (shows up in document listings).
    pub fn named(self, name: &str) -> Self {
        Self(self.0.with_name(name))
    }

    /// Extract the IR document with this profile as the single root.
    pub fn to_document(&self) -> Document {
        self.0.to_document()
    }

    /// Render this profile to OpenSCAD text.
    pub fn to_scad(&self) -> Result<String> {
        export::scad::emit_document(&self.to_document())
    }
}

// Operator shorthands: `+` union, `-` difference, `&` intersection.

impl std::ops::Add for &Shape3 {
    type Output = Shape3;
    fn add(self, rhs: &Shape3) -> Shape3 {
        self.union(rhs)
    }
}

impl std::ops::Add for Shape3 {
    type Output = Shape3;
    fn add(self, rhs: Shape3) -> Shape3 {
        self.union(&rhs)
    }
}

impl std::ops::Sub for &Shape3 {
    type Output = Shape3;
    fn sub(self, rhs: &Shape3) -> Shape3 {
        self.difference(rhs)
    }
}

impl std::ops::Sub for Shape3 {
    type Output = Shape3;
    fn sub(self, rhs: Shape3) -> Shape3 {
        self.difference(&rhs)
    }
}

impl std::ops::BitAnd for &Shape3 {
    type Output = Shape3;
    fn bitand(self, rhs: &Shape3) -> Shape3 {
        self.intersection(rhs)
    }
}

impl std::ops::BitAnd for Shape3 {
    type Output = Shape3;
    fn bitand(self, rhs: Shape3) -> Shape3 {
        self.intersection(&rhs)
    }
}

impl std::ops::Add for &Shape2 {
    type Output = Shape2;
    fn add(self, rhs: &Shape2) -> Shape2 {
        self.union(rhs)
    }
}

impl std::ops::Add for Shape2 {
    type Output = Shape2;
    fn add(self, rhs: Shape2) -> Shape2 {
        self.union(&rhs)
    }
}

impl std::ops::Sub for &Shape2 {
    type Output = Shape2;
    fn sub(self, rhs: &Shape2) -> Shape2 {
        self.difference(rhs)
    }
}

impl std::ops::Sub for Shape2 {
    type Output = Shape2;
    fn sub(self, rhs: Shape2) -> Shape2 {
        self.difference(&rhs)
    }
}

impl std::ops::BitAnd for &Shape2 {
    type Output = Shape2;
    fn bitand(self, rhs: &Shape2) -> Shape2 {
        self.intersection(rhs)
    }
}

impl std::ops::BitAnd for Shape2 {
    type Output = Shape2;
    fn bitand(self, rhs: Shape2) -> Shape2 {
        self.intersection(&rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scadforge_ir::Round;

    #[test]
    fn every_operation_allocates() {
        let a = cube([10.0, 10.0, 10.0]).into_shape();
        let b = a.translate([1.0, 0.0, 0.0]);
        // The original renders unchanged after deriving from it.
        assert_ne!(a.to_scad().unwrap(), b.to_scad().unwrap());
        assert!(b.to_scad().unwrap().starts_with("translate([1, 0, 0]) {"));
    }

    #[test]
    fn emission_is_idempotent() {
        let shape = sphere(Round::Radius(4.0), Some(24))
            .into_shape()
            .union(&cube([8.0, 8.0, 8.0]).into_shape())
            .color("grey");
        assert_eq!(shape.to_scad().unwrap(), shape.to_scad().unwrap());
    }

    #[test]
    fn single_root_document() {
        let shape = cube([1.0, 2.0, 3.0])
            .into_shape()
            .rotate([0.0, 90.0, 0.0])
            .translate([5.0, 0.0, 0.0]);
        let doc = shape.to_document();
        assert_eq!(doc.roots.len(), 1);
        assert_eq!(doc.nodes.len(), 3);
        assert!(doc.validate().is_ok());
    }

    #[test]
    fn operator_shorthands() {
        let a = cube([10.0, 10.0, 10.0]).into_shape();
        let b = cube([6.0, 6.0, 20.0]).into_shape();
        assert!((&a + &b).to_scad().unwrap().starts_with("union() {"));
        assert!((&a - &b).to_scad().unwrap().starts_with("difference() {"));
        assert!((&a & &b)
            .to_scad()
            .unwrap()
            .starts_with("intersection() {"));
    }

    #[test]
    fn difference_keeps_operand_order() {
        let base = cube([10.0, 10.0, 10.0]).into_shape();
        let s1 = sphere(Round::Radius(2.0), None).into_shape();
        let s2 = sphere(Round::Radius(3.0), None).into_shape();
        let out = base.difference_with(&[&s1, &s2]).to_scad().unwrap();
        let cube_at = out.find("cube(").unwrap();
        let r2_at = out.find("sphere(r=2)").unwrap();
        let r3_at = out.find("sphere(r=3)").unwrap();
        assert!(cube_at < r2_at && r2_at < r3_at, "base must come first:\n{out}");
    }

    #[test]
    fn profile_nary_operations_make_one_node() {
        let a = circle(Round::Radius(5.0), None);
        let b = square([4.0, 4.0]);
        let c = square([6.0, 2.0]);
        for (shape, header) in [
            (a.union_with(&[&b, &c]), "union() {"),
            (a.difference_with(&[&b, &c]), "difference() {"),
            (a.intersection_with(&[&b, &c]), "intersection() {"),
            (a.hull_with(&[&b, &c]), "hull() {"),
        ] {
            let doc = shape.to_document();
            let root = &doc.nodes[&doc.roots[0]];
            assert_eq!(root.op.children().len(), 3);
            assert!(shape.to_scad().unwrap().starts_with(header));
        }
    }

    #[test]
    fn extrude_projection_change_dimension() {
        let profile = circle(Round::Radius(5.0), None);
        let solid = profile.linear_extrude(10.0, true);
        let flat = solid.projection();
        let out = flat.to_scad().unwrap();
        assert!(out.starts_with("projection() {"));
        assert!(out.contains("linear_extrude(height=10, center=true) {"));
    }

    #[test]
    fn named_root_survives() {
        let shape = cube([1.0, 1.0, 1.0]).into_shape().named("pedestal");
        let doc = shape.to_document();
        let root = &doc.nodes[&doc.roots[0]];
        assert_eq!(root.name.as_deref(), Some("pedestal"));
    }

    #[test]
    fn debug_marker_prefixes_statement() {
        let out = cube([1.0, 1.0, 1.0])
            .into_shape()
            .debug()
            .to_scad()
            .unwrap();
        assert!(out.starts_with("#cube("), "got:\n{out}");
    }
}
