//! scadforge CLI.
//!
//! Renders saved IR documents to OpenSCAD text, summarizes them, and
//! builds a small demonstration model exercising the library surface.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use scadforge::{build_wall, cube, cylinder, cylinder_sector, CylinderSize, Round};
use scadforge_math::{apply_frame, FrameStep, Vec3};

#[derive(Parser)]
#[command(name = "scadforge")]
#[command(about = "CSG authoring toolkit emitting OpenSCAD programs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a saved IR document to OpenSCAD text
    Emit {
        /// Input IR document (JSON)
        input: PathBuf,
        /// Output .scad file; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Display information about a saved IR document
    Info {
        /// Input IR document (JSON)
        input: PathBuf,
    },
    /// Build the demonstration model and write it out
    Demo {
        /// Output .scad file
        output: PathBuf,
        /// Also write the IR document next to it as JSON
        #[arg(long)]
        ir: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Emit { input, output } => emit(&input, output.as_deref()),
        Commands::Info { input } => info(&input),
        Commands::Demo { output, ir } => demo(&output, ir),
    }
}

fn read_document(path: &Path) -> Result<scadforge_ir::Document> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let doc = scadforge_ir::Document::from_json(&json)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(doc)
}

fn emit(input: &Path, output: Option<&Path>) -> Result<()> {
    let doc = read_document(input)?;
    let text = scadforge::export::scad::emit_document(&doc)
        .with_context(|| format!("rendering {}", input.display()))?;
    match output {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn info(input: &Path) -> Result<()> {
    let doc = read_document(input)?;

    println!("scadforge document: {}", input.display());
    println!("  Version: {}", doc.version);
    println!("  Nodes: {}", doc.nodes.len());
    println!("  Roots: {}", doc.roots.len());

    if !doc.roots.is_empty() {
        println!("\nRoots:");
        for (i, &root) in doc.roots.iter().enumerate() {
            let node = doc.node(root)?;
            let name = node.name.as_deref().unwrap_or("unnamed");
            match doc.shape_dim(root) {
                Ok(dim) => println!("  {}: {} ({}, {})", i + 1, name, node.op.name(), dim),
                Err(e) => println!("  {}: {} (invalid: {})", i + 1, name, e),
            }
        }
    }
    Ok(())
}

/// A rounded mounting plate with a bolt circle and a sector-cut dial,
/// plus a stitched support wall. Touches most of the library surface.
fn demo(output: &Path, write_ir: bool) -> Result<()> {
    let plate = cube([60.0, 40.0, 6.0]).round2d(&[4.0], scadforge::Axis::Z)?;
    let dial = cylinder_sector(CylinderSize::Diameter(24.0), 6.0, 270.0, Some(64))
        .shape()
        .translate([12.0, 0.0, 6.0]);

    let mut bores = Vec::new();
    for (x, y) in [(-25.0, -15.0), (-25.0, 15.0), (25.0, -15.0), (25.0, 15.0)] {
        bores.push(cylinder(CylinderSize::Diameter(4.0), 8.0, Some(32))
            .shape()
            .translate([x, y, 0.0]));
    }
    let bores: Vec<&scadforge::Shape3> = bores.iter().collect();

    // Anchor positions come from a shared frame chain so the whole wall
    // can be re-aimed by editing one step list.
    let frame = [
        FrameStep::RotateZ(-8.0),
        FrameStep::Translate(Vec3::new(0.0, -20.0, 14.0)),
    ];
    let anchors: Vec<scadforge::Shape3> = (0..4)
        .map(|i| {
            let p = apply_frame(&frame, Vec3::new(-24.0 + f64::from(i) * 16.0, 0.0, 0.0));
            scadforge::sphere(Round::Diameter(3.0), Some(16))
                .into_shape()
                .translate([p.x, p.y, p.z])
        })
        .collect();
    let wall = build_wall(&anchors)?;

    let model = plate
        .shape()
        .union(&dial)
        .union(&wall)
        .difference_with(&bores)
        .named("demo_plate");

    model
        .write_scad(output)
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote {}", output.display());

    if write_ir {
        let ir_path = output.with_extension("json");
        let json = model.to_document().to_json()?;
        std::fs::write(&ir_path, json)
            .with_context(|| format!("writing {}", ir_path.display()))?;
        println!("Wrote {}", ir_path.display());
    }
    Ok(())
}
