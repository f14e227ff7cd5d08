//! Primitive factory: leaf shapes plus the derived rounded-box builders.
//!
//! Radius-or-diameter style choices are sum types ([`Round`],
//! [`CylinderSize`]) — whichever form the caller picked is the one that
//! reaches the emitted text, and supplying both or neither is
//! unrepresentable.

use crate::{ScadError, Shape2, Shape3};
use scadforge_ir::{CylinderSize, Round, ScadOp, Vec2, Vec3};
use scadforge_math::deg2rad;

/// `Math.sign` semantics: zero stays zero (f64::signum maps 0.0 to 1.0).
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// A solid that knows its own axis-aligned bounding size.
///
/// Produced by the box, sphere and cylinder constructors; [`Alignable::align`]
/// lets a caller push the solid flush to one of its faces without knowing
/// the absolute size.
#[derive(Debug, Clone)]
pub struct Alignable {
    shape: Shape3,
    size: [f64; 3],
}

impl Alignable {
    pub(crate) fn new(shape: Shape3, size: [f64; 3]) -> Self {
        Self { shape, size }
    }

    /// The wrapped solid.
    pub fn shape(&self) -> &Shape3 {
        &self.shape
    }

    /// Unwrap into the plain solid, dropping the size.
    pub fn into_shape(self) -> Shape3 {
        self.shape
    }

    /// Bounding size along each axis.
    pub fn size(&self) -> [f64; 3] {
        self.size
    }

    /// Translate by half the bounding size times the sign of each component
    /// of `v`: `align([1, 0, 0])` puts the left face on the YZ plane.
    pub fn align(&self, v: [f64; 3]) -> Shape3 {
        self.shape.translate([
            sign(v[0]) * self.size[0] / 2.0,
            sign(v[1]) * self.size[1] / 2.0,
            sign(v[2]) * self.size[2] / 2.0,
        ])
    }

    /// Translate, keeping the bounding size attached.
    pub fn translate(&self, v: [f64; 3]) -> Alignable {
        Alignable::new(self.shape.translate(v), self.size)
    }
}

impl From<Alignable> for Shape3 {
    fn from(a: Alignable) -> Shape3 {
        a.shape
    }
}

/// Axis selector for [`Cube::round2d`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Round the corners seen looking down the X axis.
    X,
    /// Round the corners seen looking down the Y axis.
    Y,
    /// Round the corners seen looking down the Z axis.
    Z,
}

/// A centered box that offers the rounded-corner builders.
#[derive(Debug, Clone)]
pub struct Cube {
    body: Alignable,
}

impl Cube {
    /// The wrapped solid.
    pub fn shape(&self) -> &Shape3 {
        self.body.shape()
    }

    /// Unwrap into the plain solid.
    pub fn into_shape(self) -> Shape3 {
        self.body.into_shape()
    }

    /// Bounding size along each axis.
    pub fn size(&self) -> [f64; 3] {
        self.body.size()
    }

    /// See [`Alignable::align`].
    pub fn align(&self, v: [f64; 3]) -> Shape3 {
        self.body.align(v)
    }

    /// Round the four edges parallel to `axis` by hulling corner cylinders.
    ///
    /// `radii` holds one shared radius or one per corner (cycling when
    /// fewer are given). Each cylinder is inset by exactly its own radius
    /// from the two adjacent faces, so it stays tangent to them. Radii are
    /// floored at 0.001 and never clamped against the half-size — an
    /// oversized radius overshoots visibly.
    pub fn round2d(&self, radii: &[f64], axis: Axis) -> crate::Result<Alignable> {
        let size = self.body.size;
        match axis {
            Axis::Z => round_corners(size, radii, 2, |r| {
                cylinder(CylinderSize::Radius(r), size[2], None).into_shape()
            }),
            // Other axes: round a permuted box, then rotate it back.
            Axis::Y => {
                let turned = cube([size[0], size[2], size[1]])
                    .round2d(radii, Axis::Z)?
                    .into_shape()
                    .rotate([-90.0, 0.0, 0.0]);
                Ok(Alignable::new(turned, size))
            }
            Axis::X => {
                let turned = cube([size[2], size[1], size[0]])
                    .round2d(radii, Axis::Z)?
                    .into_shape()
                    .rotate([0.0, 90.0, 0.0]);
                Ok(Alignable::new(turned, size))
            }
        }
    }

    /// Round all eight corners by hulling corner spheres; same radius
    /// rules as [`Cube::round2d`].
    pub fn round3d(&self, radii: &[f64]) -> crate::Result<Alignable> {
        let size = self.body.size;
        round_corners(size, radii, 3, |r| {
            sphere(Round::Radius(r), None).into_shape()
        })
    }
}

impl From<Cube> for Shape3 {
    fn from(c: Cube) -> Shape3 {
        c.into_shape()
    }
}

/// Place one rounding primitive per corner of a `dim`-dimensional box and
/// hull them. Corner `i`'s sign pattern is the bit pattern of `i`.
fn round_corners(
    size: [f64; 3],
    radii: &[f64],
    dim: u32,
    corner: impl Fn(f64) -> Shape3,
) -> crate::Result<Alignable> {
    if radii.is_empty() {
        return Err(ScadError::InvalidProperty(
            "corner radius list is empty".to_string(),
        ));
    }
    let half = [size[0] / 2.0, size[1] / 2.0, size[2] / 2.0];
    let count = 1usize << dim;
    let mut corners = Vec::with_capacity(count);
    for i in 0..count {
        let r = radii[i % radii.len()].max(0.001);
        let mut p = [0.0f64; 3];
        for (j, coord) in p.iter_mut().enumerate().take(dim as usize) {
            *coord = if i & (1 << j) != 0 {
                half[j] - r
            } else {
                r - half[j]
            };
        }
        corners.push(corner(r).translate(p));
    }
    let rest: Vec<&Shape3> = corners[1..].iter().collect();
    Ok(Alignable::new(corners[0].hull_with(&rest), size))
}

/// 2D circle, radius or diameter form.
pub fn circle(size: Round, segments: Option<u32>) -> Shape2 {
    Shape2::from_op(ScadOp::Circle { size, segments })
}

/// 2D regular polygon: a circle with a fixed facet count.
pub fn regular_polygon(sides: u32, size: Round) -> Shape2 {
    circle(size, Some(sides))
}

/// 2D centered rectangle.
pub fn square(size: [f64; 2]) -> Shape2 {
    Shape2::from_op(ScadOp::Square { size: size.into() })
}

/// 2D polygon from an explicit point list.
///
/// Fewer than 3 points is [`ScadError::InvalidProperty`].
pub fn polygon(points: &[[f64; 2]], convexity: Option<u32>) -> crate::Result<Shape2> {
    if points.len() < 3 {
        return Err(ScadError::InvalidProperty(format!(
            "polygon needs at least 3 points, got {}",
            points.len()
        )));
    }
    Ok(Shape2::from_op(ScadOp::Polygon {
        points: points.iter().map(|&p| Vec2::from(p)).collect(),
        convexity,
    }))
}

/// Text layout options; only the fields actually set are emitted.
#[derive(Debug, Clone, Default)]
pub struct TextSpec {
    /// The text to render.
    pub text: String,
    /// Font size.
    pub size: Option<f64>,
    /// Font name.
    pub font: Option<String>,
    /// Horizontal alignment (`left`, `center`, `right`).
    pub halign: Option<String>,
    /// Vertical alignment (`top`, `center`, `baseline`, `bottom`).
    pub valign: Option<String>,
    /// Inter-glyph spacing factor.
    pub spacing: Option<f64>,
    /// Text direction (`ltr`, `rtl`, `ttb`, `btt`).
    pub direction: Option<String>,
    /// Language hint.
    pub language: Option<String>,
    /// Script hint.
    pub script: Option<String>,
    /// Angular resolution hint (`$fn`).
    pub segments: Option<u32>,
}

impl TextSpec {
    /// Spec with just the text set.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// 2D text profile with default layout.
pub fn text(t: impl Into<String>) -> Shape2 {
    text_with(TextSpec::new(t))
}

/// 2D text profile with explicit layout options.
pub fn text_with(spec: TextSpec) -> Shape2 {
    Shape2::from_op(ScadOp::Text {
        text: spec.text,
        size: spec.size,
        font: spec.font,
        halign: spec.halign,
        valign: spec.valign,
        spacing: spec.spacing,
        direction: spec.direction,
        language: spec.language,
        script: spec.script,
        segments: spec.segments,
    })
}

/// Solid text: the 2D profile extruded by `thickness`.
pub fn text_3d(spec: TextSpec, thickness: f64) -> Shape3 {
    text_with(spec).linear_extrude(thickness, false)
}

/// External 2D profile reference by path (e.g. a DXF file).
pub fn import_profile(path: impl Into<String>) -> Shape2 {
    Shape2::from_op(ScadOp::ImportProfile { path: path.into() })
}

/// Centered box; returns a [`Cube`] so the rounded variants stay available.
pub fn cube(size: [f64; 3]) -> Cube {
    Cube {
        body: Alignable::new(
            Shape3::from_op(ScadOp::Cube { size: size.into() }),
            size,
        ),
    }
}

/// Sphere centered at origin; bounding size is a cube of the diameter.
pub fn sphere(size: Round, segments: Option<u32>) -> Alignable {
    let w = size.width();
    Alignable::new(
        Shape3::from_op(ScadOp::Sphere { size, segments }),
        [w, w, w],
    )
}

/// Centered cylinder/frustum along Z; bounding size is width×width×height
/// where width is the larger diameter.
pub fn cylinder(size: CylinderSize, height: f64, segments: Option<u32>) -> Alignable {
    let w = size.width();
    Alignable::new(
        Shape3::from_op(ScadOp::Cylinder {
            size,
            height,
            segments,
        }),
        [w, w, height],
    )
}

/// Centered cylinder clipped to an angular sector.
///
/// A sector that is an exact multiple of 360° bypasses clipping and renders
/// identically to the plain cylinder. Otherwise the sector is normalized
/// into (0, 360) and the cylinder is intersected with an extruded polygon
/// fan: `floor(angle/90) + 1` subdivisions keep each fan segment at most
/// 90° wide, which a straight chord can cover.
pub fn cylinder_sector(
    size: CylinderSize,
    height: f64,
    sector: f64,
    segments: Option<u32>,
) -> Alignable {
    let width = size.width();
    let bounds = [width, width, height];
    let base = Shape3::from_op(ScadOp::Cylinder {
        size,
        height,
        segments,
    });
    let angle = sector.rem_euclid(360.0);
    if angle == 0.0 {
        return Alignable::new(base, bounds);
    }

    let divisions = (angle / 90.0).floor() as u32 + 1;
    let step = deg2rad(angle / divisions as f64);
    let mut points = Vec::with_capacity(divisions as usize + 2);
    points.push(Vec2::new(0.0, 0.0));
    for i in 0..=divisions {
        let a = step * f64::from(i);
        // Fan points sit at the full bounding width, past the rim, so the
        // chords between them never cut into the arc.
        points.push(Vec2::new(width * a.cos(), width * a.sin()));
    }
    let wedge = Shape2::from_op(ScadOp::Polygon {
        points,
        convexity: None,
    })
    // Slightly taller than the cylinder to keep the wedge caps off the
    // end faces (coplanar caps degenerate in the renderer).
    .linear_extrude(height + 1.0, true);

    Alignable::new(base.intersection(&wedge), bounds)
}

/// Polyhedron from explicit point and triangle lists.
///
/// Fewer than 4 points or 4 faces cannot close a solid and is
/// [`ScadError::InvalidProperty`].
pub fn polyhedron(
    points: &[[f64; 3]],
    faces: &[[u32; 3]],
    convexity: Option<u32>,
) -> crate::Result<Shape3> {
    if points.len() < 4 || faces.len() < 4 {
        return Err(ScadError::InvalidProperty(format!(
            "polyhedron needs at least 4 points and 4 faces, got {} and {}",
            points.len(),
            faces.len()
        )));
    }
    Ok(Shape3::from_op(ScadOp::Polyhedron {
        points: points.iter().map(|&p| Vec3::from(p)).collect(),
        faces: faces.to_vec(),
        convexity,
    }))
}

/// External mesh reference by path (e.g. an STL file).
pub fn import_mesh(path: impl Into<String>) -> Shape3 {
    Shape3::from_op(ScadOp::ImportMesh { path: path.into() })
}

#[cfg(test)]
mod tests {
    use super::*;
    use scadforge_ir::Document;

    fn count_ops(doc: &Document, pred: impl Fn(&ScadOp) -> bool) -> usize {
        doc.nodes.values().filter(|n| pred(&n.op)).count()
    }

    #[test]
    fn circle_radius_form_has_no_stray_diameter() {
        let out = circle(Round::Radius(5.0), None).to_scad().unwrap();
        assert_eq!(out, "circle(r=5);\n");
    }

    #[test]
    fn circle_diameter_form() {
        let out = circle(Round::Diameter(11.5), None).to_scad().unwrap();
        assert_eq!(out, "circle(d=11.5);\n");
    }

    #[test]
    fn regular_polygon_pins_the_facet_count() {
        let out = regular_polygon(6, Round::Radius(4.0)).to_scad().unwrap();
        assert_eq!(out, "circle(r=4, $fn=6);\n");
    }

    #[test]
    fn square_is_centered() {
        let out = square([4.0, 6.0]).to_scad().unwrap();
        assert_eq!(out, "square(size=[4, 6], center=true);\n");
    }

    #[test]
    fn polygon_needs_three_points() {
        let err = polygon(&[[0.0, 0.0], [1.0, 0.0]], None).unwrap_err();
        assert!(matches!(err, ScadError::InvalidProperty(_)));
    }

    #[test]
    fn polygon_emits_points_and_convexity() {
        let out = polygon(&[[0.0, 0.0], [2.0, 0.0], [0.0, 3.0]], Some(2))
            .unwrap()
            .to_scad()
            .unwrap();
        assert_eq!(
            out,
            "polygon(points=[[0, 0], [2, 0], [0, 3]], convexity=2);\n"
        );
    }

    #[test]
    fn text_defaults_emit_only_the_text() {
        let out = text("hi").to_scad().unwrap();
        assert_eq!(out, "text(text=\"hi\");\n");
    }

    #[test]
    fn text_options_keep_field_order() {
        let out = text_with(TextSpec {
            size: Some(8.0),
            halign: Some("center".to_string()),
            segments: Some(32),
            ..TextSpec::new("label")
        })
        .to_scad()
        .unwrap();
        assert_eq!(
            out,
            "text(text=\"label\", size=8, halign=\"center\", $fn=32);\n"
        );
    }

    #[test]
    fn sphere_bounding_size_is_a_diameter_cube() {
        assert_eq!(sphere(Round::Radius(5.0), None).size(), [10.0, 10.0, 10.0]);
        assert_eq!(sphere(Round::Diameter(7.0), None).size(), [7.0, 7.0, 7.0]);
    }

    #[test]
    fn cylinder_bounding_width_uses_the_larger_end() {
        let c = cylinder(CylinderSize::Radii(2.0, 5.0), 12.0, None);
        assert_eq!(c.size(), [10.0, 10.0, 12.0]);
    }

    #[test]
    fn align_translates_by_half_size() {
        let out = cube([10.0, 10.0, 10.0]).align([1.0, 0.0, 0.0]).to_scad().unwrap();
        assert!(out.starts_with("translate([5, 0, 0]) {"), "got:\n{out}");
        assert!(out.contains("cube(size=[10, 10, 10], center=true);"));
    }

    #[test]
    fn align_respects_negative_axes() {
        let out = sphere(Round::Diameter(8.0), None)
            .align([-1.0, 0.0, 1.0])
            .to_scad()
            .unwrap();
        assert!(out.starts_with("translate([-4, 0, 4]) {"), "got:\n{out}");
    }

    fn sector_polygon_points(a: &Alignable) -> Option<usize> {
        let doc = a.shape().to_document();
        doc.nodes.values().find_map(|n| match &n.op {
            ScadOp::Polygon { points, .. } => Some(points.len()),
            _ => None,
        })
    }

    #[test]
    fn sector_270_uses_four_subdivisions() {
        let c = cylinder_sector(CylinderSize::Radius(5.0), 10.0, 270.0, None);
        // 4 subdivisions -> 5 fan points + origin.
        assert_eq!(sector_polygon_points(&c), Some(6));
        assert!(c.shape().to_scad().unwrap().starts_with("intersection() {"));
    }

    #[test]
    fn sector_30_is_a_single_wedge() {
        let c = cylinder_sector(CylinderSize::Radius(5.0), 10.0, 30.0, None);
        // 1 subdivision -> 2 fan points + origin.
        assert_eq!(sector_polygon_points(&c), Some(3));
    }

    #[test]
    fn full_turn_sectors_bypass_clipping() {
        let plain = cylinder(CylinderSize::Diameter(9.0), 4.0, Some(64));
        for sector in [360.0, 720.0, 0.0, -360.0] {
            let clipped = cylinder_sector(CylinderSize::Diameter(9.0), 4.0, sector, Some(64));
            assert_eq!(
                clipped.shape().to_scad().unwrap(),
                plain.shape().to_scad().unwrap(),
                "sector {sector} must render like the plain cylinder"
            );
        }
    }

    #[test]
    fn negative_sector_normalizes() {
        // -90 normalizes to 270: four subdivisions.
        let c = cylinder_sector(CylinderSize::Radius(5.0), 10.0, -90.0, None);
        assert_eq!(sector_polygon_points(&c), Some(6));
    }

    #[test]
    fn sector_wedge_is_taller_than_the_cylinder() {
        let c = cylinder_sector(CylinderSize::Radius(5.0), 10.0, 30.0, None);
        let doc = c.shape().to_document();
        let heights: Vec<f64> = doc
            .nodes
            .values()
            .filter_map(|n| match n.op {
                ScadOp::LinearExtrude { height, center, .. } => {
                    assert!(center);
                    Some(height)
                }
                _ => None,
            })
            .collect();
        assert_eq!(heights, vec![11.0]);
    }

    #[test]
    fn round3d_hulls_eight_corner_spheres() {
        let rounded = cube([20.0, 20.0, 20.0]).round3d(&[3.0]).unwrap();
        let doc = rounded.shape().to_document();
        assert_eq!(count_ops(&doc, |op| matches!(op, ScadOp::Sphere { .. })), 8);
        let root = &doc.nodes[&doc.roots[0]];
        match &root.op {
            ScadOp::Hull { children } => assert_eq!(children.len(), 8),
            other => panic!("expected Hull root, got {other:?}"),
        }
        // Every corner sphere is inset by its radius from the adjacent faces.
        for node in doc.nodes.values() {
            if let ScadOp::Translate { offset, .. } = &node.op {
                for c in [offset.x, offset.y, offset.z] {
                    assert_eq!(c.abs(), 7.0, "inset must be half - r");
                }
            }
        }
    }

    #[test]
    fn round2d_hulls_four_corner_cylinders() {
        let rounded = cube([20.0, 20.0, 5.0]).round2d(&[2.0], Axis::Z).unwrap();
        let doc = rounded.shape().to_document();
        assert_eq!(
            count_ops(&doc, |op| matches!(op, ScadOp::Cylinder { .. })),
            4
        );
        assert_eq!(rounded.size(), [20.0, 20.0, 5.0]);
    }

    #[test]
    fn round2d_off_axis_permutes_and_rotates_back() {
        let rounded = cube([20.0, 10.0, 5.0]).round2d(&[2.0], Axis::Y).unwrap();
        assert_eq!(rounded.size(), [20.0, 10.0, 5.0]);
        let out = rounded.shape().to_scad().unwrap();
        assert!(out.starts_with("rotate([-90, 0, 0]) {"), "got:\n{out}");
    }

    #[test]
    fn corner_radii_cycle() {
        let rounded = cube([20.0, 20.0, 5.0])
            .round2d(&[1.0, 4.0], Axis::Z)
            .unwrap();
        let doc = rounded.shape().to_document();
        let mut radii: Vec<f64> = doc
            .nodes
            .values()
            .filter_map(|n| match n.op {
                ScadOp::Cylinder {
                    size: CylinderSize::Radius(r),
                    ..
                } => Some(r),
                _ => None,
            })
            .collect();
        radii.sort_by(f64::total_cmp);
        assert_eq!(radii, vec![1.0, 1.0, 4.0, 4.0]);
    }

    #[test]
    fn zero_radius_is_floored_not_dropped() {
        let rounded = cube([10.0, 10.0, 10.0]).round3d(&[0.0]).unwrap();
        let doc = rounded.shape().to_document();
        for node in doc.nodes.values() {
            if let ScadOp::Sphere {
                size: Round::Radius(r),
                ..
            } = node.op
            {
                assert_eq!(r, 0.001);
            }
        }
    }

    #[test]
    fn oversized_radius_overshoots_instead_of_clamping() {
        let rounded = cube([10.0, 10.0, 10.0]).round3d(&[8.0]).unwrap();
        let doc = rounded.shape().to_document();
        let mut saw_translate = false;
        for node in doc.nodes.values() {
            if let ScadOp::Translate { offset, .. } = &node.op {
                saw_translate = true;
                // half - r = 5 - 8: centers land past the opposite side.
                assert_eq!(offset.x.abs(), 3.0);
            }
        }
        assert!(saw_translate);
    }

    #[test]
    fn empty_radius_list_is_invalid() {
        let err = cube([10.0, 10.0, 10.0]).round3d(&[]).unwrap_err();
        assert!(matches!(err, ScadError::InvalidProperty(_)));
    }

    #[test]
    fn imports_reference_by_path() {
        assert_eq!(
            import_mesh("models/encoder.stl").to_scad().unwrap(),
            "import(\"models/encoder.stl\");\n"
        );
        assert_eq!(
            import_profile("profiles/voronoi.dxf").to_scad().unwrap(),
            "import(\"profiles/voronoi.dxf\");\n"
        );
    }
}
