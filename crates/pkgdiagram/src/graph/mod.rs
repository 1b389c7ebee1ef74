//! The package graph
//!
//! Targets, the arrows between them, arrow ordering around a target, and
//! the package that owns them all.

mod collection;
mod dependency;
pub mod layout;
mod package;
mod registry;
mod role;
pub mod target;

pub use collection::TargetCollection;
pub use dependency::{ArrowLine, Dependency, DependencyKind};
pub use layout::{sort_dependencies, LayoutComparer};
pub use package::{Package, DIAGRAM_BORDER, FIXED_TARGET_X, FIXED_TARGET_Y};
pub use registry::PackageRegistry;
pub use role::ClassRole;
pub use target::{DragState, Target, TargetKind, TargetState, README_ID};
