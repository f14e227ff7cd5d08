//! Output backends. Currently one: OpenSCAD text.

pub mod scad;
