//! Core building blocks shared by the graph and print layers
//!
//! Error type, logging, configuration, integer geometry, the properties
//! codec used for package files, and the paint surface abstraction.

mod config;
mod error;
mod geometry;
pub mod logging;
mod properties;
mod surface;
mod svg;

pub use config::*;
pub use error::*;
pub use geometry::*;
pub use logging::*;
pub use properties::*;
pub use surface::*;
pub use svg::*;
