#![warn(missing_docs)]

//! Vector algebra for scadforge.
//!
//! Thin wrappers around nalgebra for the conventions the authoring DSL
//! uses throughout: f64 vectors in millimeters and rotations given in
//! degrees. Componentwise arithmetic, dot, cross, normalize and length
//! come straight from nalgebra (`component_mul`, `dot`, `cross`, ...);
//! this crate adds the degree-based rotations and the rotate/translate
//! frame chains used to place anchor solids.
//!
//! Degenerate inputs are not caught: normalizing a zero-length vector
//! propagates non-finite components, as the callers expect.

use nalgebra::{Rotation3, Vector3};

/// A vector in 2D space.
pub type Vec2 = nalgebra::Vector2<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// Convert degrees to radians.
pub fn deg2rad(degrees: f64) -> f64 {
    degrees / 180.0 * std::f64::consts::PI
}

/// Rotate `v` about the X axis by `angle` degrees (right-handed).
pub fn rotate_x(angle: f64, v: Vec3) -> Vec3 {
    Rotation3::from_axis_angle(&Vector3::x_axis(), deg2rad(angle)) * v
}

/// Rotate `v` about the Y axis by `angle` degrees (right-handed).
pub fn rotate_y(angle: f64, v: Vec3) -> Vec3 {
    Rotation3::from_axis_angle(&Vector3::y_axis(), deg2rad(angle)) * v
}

/// Rotate `v` about the Z axis by `angle` degrees (right-handed).
pub fn rotate_z(angle: f64, v: Vec3) -> Vec3 {
    Rotation3::from_axis_angle(&Vector3::z_axis(), deg2rad(angle)) * v
}

/// One step of a coordinate-frame chain.
///
/// Anchor solids are placed by an ordered chain of rotations and
/// translations; the same chain evaluated on a point yields the anchor's
/// world position without building any geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameStep {
    /// Rotate about the X axis, degrees.
    RotateX(f64),
    /// Rotate about the Y axis, degrees.
    RotateY(f64),
    /// Rotate about the Z axis, degrees.
    RotateZ(f64),
    /// Translate by an offset.
    Translate(Vec3),
}

/// Apply a frame chain to a point, first step first.
pub fn apply_frame(steps: &[FrameStep], p: Vec3) -> Vec3 {
    steps.iter().fold(p, |p, step| match *step {
        FrameStep::RotateX(a) => rotate_x(a, p),
        FrameStep::RotateY(a) => rotate_y(a, p),
        FrameStep::RotateZ(a) => rotate_z(a, p),
        FrameStep::Translate(t) => p + t,
    })
}
