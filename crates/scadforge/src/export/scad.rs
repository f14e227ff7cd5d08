//! OpenSCAD text emitter.
//!
//! Emission is a pure function of the document: leaves render as
//! `ident(key=value, ...);`, operators as `ident(args) { child; ... }`
//! with 2-space indentation, and the debug highlight renders as a `#`
//! prefix on its child's statement. The document is validated up front;
//! an invalid graph produces an error and no partial text.

use crate::args::{fmt_vec3, quote, Args, ArgValue};
use scadforge_ir::{CylinderSize, Document, IrError, NodeId, OffsetKind, Round, ScadOp};

const INDENT: &str = "  ";

/// Render a whole document, roots in order.
pub fn emit_document(doc: &Document) -> crate::Result<String> {
    doc.validate()?;
    let mut out = String::new();
    for &root in &doc.roots {
        emit_node(doc, root, 0, &mut out)?;
    }
    Ok(out)
}

/// Write the statement for `id` at `depth`; the caller has already
/// written the indentation for the first line.
fn emit_node(doc: &Document, id: NodeId, depth: usize, out: &mut String) -> Result<(), IrError> {
    let node = doc.node(id)?;
    // Highlight marks its child's statement rather than nesting a block.
    if let ScadOp::Highlight { child } = node.op {
        out.push('#');
        return emit_node(doc, child, depth, out);
    }
    let children = node.op.children();
    if children.is_empty() {
        out.push_str(&leaf_statement(&node.op));
        out.push('\n');
    } else {
        out.push_str(&operator_header(&node.op));
        out.push_str(" {\n");
        for &child in children {
            out.push_str(&INDENT.repeat(depth + 1));
            emit_node(doc, child, depth + 1, out)?;
        }
        out.push_str(&INDENT.repeat(depth));
        out.push_str("}\n");
    }
    Ok(())
}

fn round_args(args: Args, size: Round) -> Args {
    match size {
        Round::Radius(r) => args.arg("r", r),
        Round::Diameter(d) => args.arg("d", d),
    }
}

fn cylinder_size_args(args: Args, size: CylinderSize) -> Args {
    match size {
        CylinderSize::Radius(r) => args.arg("r", r),
        CylinderSize::Diameter(d) => args.arg("d", d),
        CylinderSize::Radii(r1, r2) => args.arg("r1", r1).arg("r2", r2),
        CylinderSize::Diameters(d1, d2) => args.arg("d1", d1).arg("d2", d2),
    }
}

fn leaf_statement(op: &ScadOp) -> String {
    match op {
        ScadOp::Circle { size, segments } => {
            let args = round_args(Args::new(), *size).opt("$fn", *segments);
            format!("circle({});", args.render())
        }
        ScadOp::Square { size } => {
            let args = Args::new().arg("size", *size).arg("center", true);
            format!("square({});", args.render())
        }
        ScadOp::Polygon { points, convexity } => {
            let args = Args::new()
                .arg("points", ArgValue::Points2(points.clone()))
                .opt("convexity", *convexity);
            format!("polygon({});", args.render())
        }
        ScadOp::Text {
            text,
            size,
            font,
            halign,
            valign,
            spacing,
            direction,
            language,
            script,
            segments,
        } => {
            let args = Args::new()
                .arg("text", text.clone())
                .opt("size", *size)
                .opt("font", font.clone())
                .opt("halign", halign.clone())
                .opt("valign", valign.clone())
                .opt("spacing", *spacing)
                .opt("direction", direction.clone())
                .opt("language", language.clone())
                .opt("script", script.clone())
                .opt("$fn", *segments);
            format!("text({});", args.render())
        }
        ScadOp::ImportProfile { path } | ScadOp::ImportMesh { path } => {
            format!("import({});", quote(path))
        }
        ScadOp::Cube { size } => {
            let args = Args::new().arg("size", *size).arg("center", true);
            format!("cube({});", args.render())
        }
        ScadOp::Sphere { size, segments } => {
            let args = round_args(Args::new(), *size).opt("$fn", *segments);
            format!("sphere({});", args.render())
        }
        ScadOp::Cylinder {
            size,
            height,
            segments,
        } => {
            let args = cylinder_size_args(Args::new().arg("center", true), *size)
                .arg("h", *height)
                .opt("$fn", *segments);
            format!("cylinder({});", args.render())
        }
        ScadOp::Polyhedron {
            points,
            faces,
            convexity,
        } => {
            let args = Args::new()
                .arg("points", ArgValue::Points3(points.clone()))
                .arg("faces", ArgValue::Faces(faces.clone()))
                .opt("convexity", *convexity);
            format!("polyhedron({});", args.render())
        }
        // Operators are rendered by operator_header.
        _ => unreachable!("leaf_statement called on an operator"),
    }
}

fn operator_header(op: &ScadOp) -> String {
    match op {
        ScadOp::Union { .. } => "union()".to_string(),
        ScadOp::Difference { .. } => "difference()".to_string(),
        ScadOp::Intersection { .. } => "intersection()".to_string(),
        ScadOp::Hull { .. } => "hull()".to_string(),
        ScadOp::Projection { .. } => "projection()".to_string(),
        ScadOp::Translate { offset, .. } => format!("translate({})", fmt_vec3(*offset)),
        ScadOp::Rotate { angles, .. } => format!("rotate({})", fmt_vec3(*angles)),
        ScadOp::Scale { factor, .. } => format!("scale({})", fmt_vec3(*factor)),
        ScadOp::Mirror { normal, .. } => format!("mirror({})", fmt_vec3(*normal)),
        ScadOp::Color { color, .. } => format!("color({})", quote(color)),
        ScadOp::Offset { kind, .. } => match kind {
            OffsetKind::Delta(d) => format!("offset(delta={})", crate::args::fmt_num(*d)),
            OffsetKind::Radius(r) => format!("offset(r={})", crate::args::fmt_num(*r)),
        },
        ScadOp::LinearExtrude { height, center, .. } => {
            let args = Args::new().arg("height", *height).arg("center", *center);
            format!("linear_extrude({})", args.render())
        }
        _ => unreachable!("operator_header called on a leaf"),
    }
}
