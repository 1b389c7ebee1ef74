//! pkgdiagram - Package diagrams of classes and their dependencies
//!
//! A package diagram shows the classes of one package as boxes, joined by
//! inheritance (extends, implements) and uses arrows. This crate holds the
//! diagram model, the geometry behind arrow drawing and hit-testing, the
//! ordering of arrows around a box, the package file format, and paginated
//! printing. Drawing goes through the toolkit-neutral [`Surface`] trait.
//!
//! # Quick Start
//!
//! ```rust
//! use pkgdiagram::prelude::*;
//!
//! let mut package = Package::new("shapes", "Geometry");
//! package.add_target(Target::class("Shape", ClassRole::Interface, Point::new(150, 20))).unwrap();
//! package.add_target(Target::class("Circle", ClassRole::Standard, Point::new(100, 150))).unwrap();
//! package.add_dependency(Dependency::implements("Circle", "Shape"));
//! package.recalc_arrows();
//!
//! let svg = pkgdiagram::render_svg(&package, &DiagramConfig::default());
//! assert!(svg.contains("Circle"));
//! ```
//!
//! # Printing
//!
//! ```rust,no_run
//! use pkgdiagram::prelude::*;
//!
//! let package = Package::load_file("shapes/package.pkgd").unwrap();
//! let config = DiagramConfig::default();
//! let mut device = SvgPageDevice::new("pages");
//! let pages = print_package(&package, &config, &mut device, &PageFormat::a4()).unwrap();
//! println!("printed {pages} page(s)");
//! ```

pub mod core;
pub mod graph;
pub mod print;

use std::path::Path;

use anyhow::Context;

pub use crate::core::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        Color, DiagramConfig, DiagramError, DiagramResult, DisplayMode, Point, Properties, Rect,
        RecordingSurface, Size, Surface, SvgSurface,
    };
    pub use crate::graph::{
        ClassRole, Dependency, DependencyKind, LayoutComparer, Package, PackageRegistry, Target,
        TargetCollection, TargetKind,
    };
    pub use crate::print::{
        print_in_background, print_package, ClassDiagramPrinter, PageFormat, PageLayout,
        PrintDevice, Printable, SvgPageDevice,
    };
}

/// Render a whole package to a single SVG document
pub fn render_svg(package: &graph::Package, config: &DiagramConfig) -> String {
    let size = package.minimum_size();
    let mut surface = SvgSurface::new(size.width as f64, size.height as f64);
    package.paint(&mut surface, config);
    surface.finish()
}

/// Load a package file and render it to SVG
///
/// # Example
/// ```rust,no_run
/// let svg = pkgdiagram::render_file("package.pkgd", &pkgdiagram::DiagramConfig::default()).unwrap();
/// std::fs::write("diagram.svg", svg).unwrap();
/// ```
pub fn render_file(path: impl AsRef<Path>, config: &DiagramConfig) -> anyhow::Result<String> {
    let path = path.as_ref();
    let package = graph::Package::load_file(path)
        .with_context(|| format!("Failed to load package file '{}'", path.display()))?;
    Ok(render_svg(&package, config))
}
