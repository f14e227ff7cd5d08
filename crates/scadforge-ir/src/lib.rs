#![warn(missing_docs)]

//! Declarative CSG intermediate representation for scadforge.
//!
//! This crate defines the DAG-based IR that records how a solid or profile
//! was composed: primitive leaves plus boolean, hull, and affine operator
//! nodes. The IR is purely descriptive — no mesh data, no geometric
//! evaluation. Rendering to OpenSCAD text is handled by the `scadforge`
//! crate; geometric evaluation belongs to the external renderer.
//!
//! Every node is either 2D (a profile) or 3D (a solid). The dimension of a
//! sub-graph is a pure function of its structure and can be checked with
//! [`Document::shape_dim`] without evaluating any geometry.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Unique identifier for a node in the IR graph.
pub type NodeId = u64;

/// 2D vector with f64 components (conventionally millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
}

impl Vec2 {
    /// Create a new Vec2.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<[f64; 2]> for Vec2 {
    fn from(v: [f64; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

/// 3D vector with f64 components (conventionally millimeters).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    /// X component.
    pub x: f64,
    /// Y component.
    pub y: f64,
    /// Z component.
    pub z: f64,
}

impl Vec3 {
    /// Create a new Vec3.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

impl From<[f64; 3]> for Vec3 {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

/// Dimensionality of a shape sub-graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Dim {
    /// A flat profile.
    Two,
    /// A solid.
    Three,
}

impl std::fmt::Display for Dim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dim::Two => write!(f, "2D"),
            Dim::Three => write!(f, "3D"),
        }
    }
}

/// Circular size given as either a radius or a diameter.
///
/// The two forms are mutually exclusive by construction; whichever was
/// supplied is the one that gets emitted (`r=` xor `d=`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Round {
    /// Radius form (`r=`).
    Radius(f64),
    /// Diameter form (`d=`).
    Diameter(f64),
}

impl Round {
    /// Bounding width (diameter) of the circle this describes.
    pub fn width(&self) -> f64 {
        match *self {
            Round::Radius(r) => r * 2.0,
            Round::Diameter(d) => d,
        }
    }
}

/// Cylinder cross-section, straight or tapered, radius or diameter form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CylinderSize {
    /// Constant radius (`r=`).
    Radius(f64),
    /// Constant diameter (`d=`).
    Diameter(f64),
    /// Tapered radii, bottom then top (`r1=`, `r2=`).
    Radii(f64, f64),
    /// Tapered diameters, bottom then top (`d1=`, `d2=`).
    Diameters(f64, f64),
}

impl CylinderSize {
    /// Bounding width of the cylinder (the larger diameter).
    pub fn width(&self) -> f64 {
        match *self {
            CylinderSize::Radius(r) => r * 2.0,
            CylinderSize::Diameter(d) => d,
            CylinderSize::Radii(r1, r2) => r1.max(r2) * 2.0,
            CylinderSize::Diameters(d1, d2) => d1.max(d2),
        }
    }
}

/// 2D contour offset, signed delta or rounded-corner radius form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OffsetKind {
    /// Straight offset (`delta=`), corners stay sharp.
    Delta(f64),
    /// Rounded offset (`r=`).
    Radius(f64),
}

/// CSG operation — the core building block of the IR DAG.
///
/// Each variant is either a leaf primitive or an operator that references
/// child nodes by [`NodeId`]. Optional fields that are `None` are omitted
/// from the emitted text entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScadOp {
    /// 2D circle (or regular polygon when `segments` is set).
    Circle {
        /// Radius or diameter.
        size: Round,
        /// Angular resolution hint (`$fn`).
        segments: Option<u32>,
    },
    /// 2D centered rectangle.
    Square {
        /// Side lengths.
        size: Vec2,
    },
    /// 2D polygon from an explicit point list.
    Polygon {
        /// Contour points in order.
        points: Vec<Vec2>,
        /// Renderer convexity hint.
        convexity: Option<u32>,
    },
    /// 2D text profile.
    Text {
        /// The text to render.
        text: String,
        /// Font size.
        size: Option<f64>,
        /// Font name.
        font: Option<String>,
        /// Horizontal alignment (`left`, `center`, `right`).
        halign: Option<String>,
        /// Vertical alignment (`top`, `center`, `baseline`, `bottom`).
        valign: Option<String>,
        /// Inter-glyph spacing factor.
        spacing: Option<f64>,
        /// Text direction (`ltr`, `rtl`, `ttb`, `btt`).
        direction: Option<String>,
        /// Language hint.
        language: Option<String>,
        /// Script hint.
        script: Option<String>,
        /// Angular resolution hint (`$fn`).
        segments: Option<u32>,
    },
    /// External 2D profile reference by path (e.g. a DXF file).
    ImportProfile {
        /// Path as handed to the renderer.
        path: String,
    },
    /// Axis-aligned centered box.
    Cube {
        /// Size along each axis.
        size: Vec3,
    },
    /// Sphere centered at origin.
    Sphere {
        /// Radius or diameter.
        size: Round,
        /// Angular resolution hint (`$fn`).
        segments: Option<u32>,
    },
    /// Cylinder/frustum along the Z axis, centered at origin.
    Cylinder {
        /// Cross-section description.
        size: CylinderSize,
        /// Height along Z.
        height: f64,
        /// Angular resolution hint (`$fn`).
        segments: Option<u32>,
    },
    /// Polyhedron from explicit point and triangle lists.
    Polyhedron {
        /// Vertex positions.
        points: Vec<Vec3>,
        /// Triangles as indices into `points`.
        faces: Vec<[u32; 3]>,
        /// Renderer convexity hint.
        convexity: Option<u32>,
    },
    /// External mesh reference by path (e.g. an STL file).
    ImportMesh {
        /// Path as handed to the renderer.
        path: String,
    },
    /// Boolean union of all children.
    Union {
        /// Operands, all of one dimension.
        children: Vec<NodeId>,
    },
    /// Boolean difference; the first child is the retained base.
    Difference {
        /// Base followed by subtrahends, all of one dimension.
        children: Vec<NodeId>,
    },
    /// Boolean intersection of all children.
    Intersection {
        /// Operands, all of one dimension.
        children: Vec<NodeId>,
    },
    /// Convex hull over all children.
    Hull {
        /// Operands, all of one dimension.
        children: Vec<NodeId>,
    },
    /// Translation by an offset vector.
    Translate {
        /// Child node to translate.
        child: NodeId,
        /// Translation offset.
        offset: Vec3,
    },
    /// Rotation by Euler angles in degrees (applied as X, then Y, then Z).
    Rotate {
        /// Child node to rotate.
        child: NodeId,
        /// Rotation angles in degrees.
        angles: Vec3,
    },
    /// Non-uniform scale.
    Scale {
        /// Child node to scale.
        child: NodeId,
        /// Scale factors per axis.
        factor: Vec3,
    },
    /// Mirror across the plane through the origin with the given normal.
    Mirror {
        /// Child node to mirror.
        child: NodeId,
        /// Plane normal.
        normal: Vec3,
    },
    /// Display color; does not alter geometry.
    Color {
        /// Child node to color.
        child: NodeId,
        /// Color name or `#rrggbb` hex string.
        color: String,
    },
    /// Debug highlight marker; does not alter geometry.
    Highlight {
        /// Child node to highlight.
        child: NodeId,
    },
    /// Signed 2D contour offset.
    Offset {
        /// Child profile.
        child: NodeId,
        /// Offset amount and corner treatment.
        kind: OffsetKind,
    },
    /// Extrude a 2D profile into a solid.
    LinearExtrude {
        /// Child profile.
        child: NodeId,
        /// Extrusion height.
        height: f64,
        /// Center the extrusion on the XY plane.
        center: bool,
    },
    /// Flatten a solid onto the XY plane.
    Projection {
        /// Child solid.
        child: NodeId,
    },
}

impl ScadOp {
    /// Child node ids referenced by this operation (empty for leaves).
    pub fn children(&self) -> &[NodeId] {
        match self {
            ScadOp::Union { children }
            | ScadOp::Difference { children }
            | ScadOp::Intersection { children }
            | ScadOp::Hull { children } => children,
            ScadOp::Translate { child, .. }
            | ScadOp::Rotate { child, .. }
            | ScadOp::Scale { child, .. }
            | ScadOp::Mirror { child, .. }
            | ScadOp::Color { child, .. }
            | ScadOp::Highlight { child }
            | ScadOp::Offset { child, .. }
            | ScadOp::LinearExtrude { child, .. }
            | ScadOp::Projection { child } => std::slice::from_ref(child),
            _ => &[],
        }
    }

    /// Operation name, as it appears in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            ScadOp::Circle { .. } => "circle",
            ScadOp::Square { .. } => "square",
            ScadOp::Polygon { .. } => "polygon",
            ScadOp::Text { .. } => "text",
            ScadOp::ImportProfile { .. } | ScadOp::ImportMesh { .. } => "import",
            ScadOp::Cube { .. } => "cube",
            ScadOp::Sphere { .. } => "sphere",
            ScadOp::Cylinder { .. } => "cylinder",
            ScadOp::Polyhedron { .. } => "polyhedron",
            ScadOp::Union { .. } => "union",
            ScadOp::Difference { .. } => "difference",
            ScadOp::Intersection { .. } => "intersection",
            ScadOp::Hull { .. } => "hull",
            ScadOp::Translate { .. } => "translate",
            ScadOp::Rotate { .. } => "rotate",
            ScadOp::Scale { .. } => "scale",
            ScadOp::Mirror { .. } => "mirror",
            ScadOp::Color { .. } => "color",
            ScadOp::Highlight { .. } => "highlight",
            ScadOp::Offset { .. } => "offset",
            ScadOp::LinearExtrude { .. } => "linear_extrude",
            ScadOp::Projection { .. } => "projection",
        }
    }
}

/// A node in the IR graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,
    /// Optional human-readable name.
    pub name: Option<String>,
    /// The operation this node represents.
    pub op: ScadOp,
}

/// Errors raised while checking an IR graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IrError {
    /// A node references a child id that is not in the document.
    #[error("node {0} is referenced but not present in the document")]
    MissingNode(NodeId),

    /// An operation was applied across incompatible 2D/3D operands.
    #[error("{op} expects a {expected} operand, got {found} (node {node})")]
    TypeMismatch {
        /// Operation name.
        op: &'static str,
        /// Dimension the operation requires.
        expected: Dim,
        /// Dimension actually supplied.
        found: Dim,
        /// Offending node id.
        node: NodeId,
    },

    /// An operator node has no children.
    #[error("{op} node {node} has no operands")]
    EmptyOperator {
        /// Operation name.
        op: &'static str,
        /// Offending node id.
        node: NodeId,
    },

    /// A node is reachable from itself. Only hand-built documents can
    /// contain cycles; the authoring API always produces DAGs.
    #[error("node {0} is part of a reference cycle")]
    Cycle(NodeId),
}

/// A scadforge document — the on-disk `.json` IR format.
///
/// Contains the full node graph plus the root of each shape to emit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Format version string.
    pub version: String,
    /// All nodes in the graph, keyed by [`NodeId`].
    pub nodes: HashMap<NodeId, Node>,
    /// Root node of each top-level shape, in emission order.
    pub roots: Vec<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: "0.2".to_string(),
            nodes: HashMap::new(),
            roots: Vec::new(),
        }
    }
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Look up a node, reporting dangling references as [`IrError::MissingNode`].
    pub fn node(&self, id: NodeId) -> Result<&Node, IrError> {
        self.nodes.get(&id).ok_or(IrError::MissingNode(id))
    }

    /// Dimension of the sub-graph rooted at `root`.
    ///
    /// Walks the graph and checks every dimensional rule on the way: boolean
    /// and hull operands must agree, `offset`/`linear_extrude` take a 2D
    /// child, `projection` takes a 3D child. Results are memoized per node,
    /// so shared sub-graphs are checked once and a reference cycle is
    /// reported as [`IrError::Cycle`] rather than recursing forever.
    pub fn shape_dim(&self, root: NodeId) -> Result<Dim, IrError> {
        self.dim_walk(root, &mut HashMap::new())
    }

    /// `seen` maps a node to its checked dimension, or `None` while the
    /// node is still on the walk stack.
    fn dim_walk(&self, id: NodeId, seen: &mut HashMap<NodeId, Option<Dim>>) -> Result<Dim, IrError> {
        match seen.get(&id) {
            Some(Some(dim)) => return Ok(*dim),
            Some(None) => return Err(IrError::Cycle(id)),
            None => {}
        }
        seen.insert(id, None);
        let node = self.node(id)?;
        let dim = match &node.op {
            ScadOp::Circle { .. }
            | ScadOp::Square { .. }
            | ScadOp::Polygon { .. }
            | ScadOp::Text { .. }
            | ScadOp::ImportProfile { .. } => Dim::Two,
            ScadOp::Cube { .. }
            | ScadOp::Sphere { .. }
            | ScadOp::Cylinder { .. }
            | ScadOp::Polyhedron { .. }
            | ScadOp::ImportMesh { .. } => Dim::Three,
            ScadOp::Union { children }
            | ScadOp::Difference { children }
            | ScadOp::Intersection { children }
            | ScadOp::Hull { children } => {
                let (&first, rest) =
                    children.split_first().ok_or(IrError::EmptyOperator {
                        op: node.op.name(),
                        node: id,
                    })?;
                let dim = self.dim_walk(first, seen)?;
                for &child in rest {
                    let found = self.dim_walk(child, seen)?;
                    if found != dim {
                        return Err(IrError::TypeMismatch {
                            op: node.op.name(),
                            expected: dim,
                            found,
                            node: child,
                        });
                    }
                }
                dim
            }
            ScadOp::Translate { child, .. }
            | ScadOp::Rotate { child, .. }
            | ScadOp::Scale { child, .. }
            | ScadOp::Mirror { child, .. }
            | ScadOp::Color { child, .. }
            | ScadOp::Highlight { child } => self.dim_walk(*child, seen)?,
            ScadOp::Offset { child, .. } => {
                self.expect_dim(*child, Dim::Two, "offset", seen)?;
                Dim::Two
            }
            ScadOp::LinearExtrude { child, .. } => {
                self.expect_dim(*child, Dim::Two, "linear_extrude", seen)?;
                Dim::Three
            }
            ScadOp::Projection { child } => {
                self.expect_dim(*child, Dim::Three, "projection", seen)?;
                Dim::Two
            }
        };
        seen.insert(id, Some(dim));
        Ok(dim)
    }

    fn expect_dim(
        &self,
        child: NodeId,
        expected: Dim,
        op: &'static str,
        seen: &mut HashMap<NodeId, Option<Dim>>,
    ) -> Result<(), IrError> {
        let found = self.dim_walk(child, seen)?;
        if found != expected {
            return Err(IrError::TypeMismatch {
                op,
                expected,
                found,
                node: child,
            });
        }
        Ok(())
    }

    /// Check the whole document: every root resolves to a well-dimensioned
    /// shape and no reference dangles.
    pub fn validate(&self) -> Result<(), IrError> {
        for &root in &self.roots {
            self.shape_dim(root)?;
        }
        Ok(())
    }
}
