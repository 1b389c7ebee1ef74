//! Rendering and printing configuration
//!
//! Every tunable drawing constant lives in [`DiagramConfig`]. The defaults
//! match the classic package editor look; the CLI and environment can
//! override the display mode and print scale.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How dependency arrows are drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// Thick solid lines with a gap cut under the arrow head
    #[default]
    Normal,
    /// Dashed lines with larger heads, closer to UML notation
    Formal,
}

impl FromStr for DisplayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(DisplayMode::Normal),
            "formal" | "uml" => Ok(DisplayMode::Formal),
            _ => Err(format!("Unknown display mode: {}", s)),
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayMode::Normal => write!(f, "normal"),
            DisplayMode::Formal => write!(f, "formal"),
        }
    }
}

pub const DISPLAY_MODE_ENV: &str = "PKGDIAGRAM_DISPLAY_MODE";
pub const PRINT_SCALE_ENV: &str = "PKGDIAGRAM_PRINT_SCALE";

/// Drawing and printing constants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramConfig {
    pub display_mode: DisplayMode,
    /// Arrow head length in normal mode
    pub arrow_length_normal: f64,
    /// Arrow head length in formal mode
    pub arrow_length_formal: f64,
    /// Half-angle between the line and each side of the head, radians
    pub arrow_angle: f64,
    /// Line width of normal-mode arrows
    pub arrow_stroke: f64,
    /// Pixels added around an arrow's bounding box for hit-testing
    pub hit_tolerance: i32,
    /// Squared perpendicular distance below which a point is on the line
    pub hit_distance_squared: f64,
    /// Uniform scale applied to the diagram when printing
    pub print_scale: f64,
    pub print_margin_h: i32,
    pub print_margin_v: i32,
    pub print_title_height: i32,
    pub print_footer_height: i32,
    pub grid_size: i32,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::Normal,
            arrow_length_normal: 12.0,
            arrow_length_formal: 18.0,
            arrow_angle: PI / 6.0,
            arrow_stroke: 2.0,
            hit_tolerance: 4,
            hit_distance_squared: 16.0,
            print_scale: 0.5,
            print_margin_h: 16,
            print_margin_v: 16,
            print_title_height: 22,
            print_footer_height: 14,
            grid_size: 10,
        }
    }
}

impl DiagramConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overlaid with `PKGDIAGRAM_DISPLAY_MODE` and `PKGDIAGRAM_PRINT_SCALE`
    ///
    /// Unparseable values are ignored with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`DiagramConfig::from_env`] with `lookup` standing in for the environment
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(mode) = lookup(DISPLAY_MODE_ENV) {
            match mode.parse() {
                Ok(mode) => config.display_mode = mode,
                Err(e) => tracing::warn!(error = %e, "Ignoring {}", DISPLAY_MODE_ENV),
            }
        }
        if let Some(scale) = lookup(PRINT_SCALE_ENV) {
            match scale.parse::<f64>() {
                Ok(scale) if scale > 0.0 => config.print_scale = scale,
                _ => tracing::warn!(value = %scale, "Ignoring {}", PRINT_SCALE_ENV),
            }
        }
        config
    }

    pub fn with_display_mode(mut self, mode: DisplayMode) -> Self {
        self.display_mode = mode;
        self
    }

    pub fn with_print_scale(mut self, scale: f64) -> Self {
        self.print_scale = scale;
        self
    }

    /// Arrow head length for the active display mode
    pub fn arrow_length(&self) -> f64 {
        match self.display_mode {
            DisplayMode::Normal => self.arrow_length_normal,
            DisplayMode::Formal => self.arrow_length_formal,
        }
    }

    pub fn is_formal(&self) -> bool {
        self.display_mode == DisplayMode::Formal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DiagramConfig::default();
        assert_eq!(config.display_mode, DisplayMode::Normal);
        assert_eq!(config.arrow_length(), 12.0);
        assert!((config.arrow_angle - PI / 6.0).abs() < 1e-12);
        assert_eq!(config.print_scale, 0.5);
    }

    #[test]
    fn test_formal_mode_arrow_length() {
        let config = DiagramConfig::default().with_display_mode(DisplayMode::Formal);
        assert_eq!(config.arrow_length(), 18.0);
        assert!(config.is_formal());
    }

    #[test]
    fn test_environment_overlay() {
        let config = DiagramConfig::from_lookup(|key| match key {
            DISPLAY_MODE_ENV => Some("formal".to_string()),
            PRINT_SCALE_ENV => Some("0.75".to_string()),
            _ => None,
        });
        assert_eq!(config.display_mode, DisplayMode::Formal);
        assert_eq!(config.print_scale, 0.75);

        let config = DiagramConfig::from_lookup(|key| match key {
            DISPLAY_MODE_ENV => Some("fancy".to_string()),
            PRINT_SCALE_ENV => Some("-2".to_string()),
            _ => None,
        });
        assert_eq!(config, DiagramConfig::default());
        assert_eq!(DiagramConfig::from_lookup(|_| None), DiagramConfig::default());
    }

    #[test]
    fn test_display_mode_parsing() {
        assert_eq!("normal".parse::<DisplayMode>().unwrap(), DisplayMode::Normal);
        assert_eq!("FORMAL".parse::<DisplayMode>().unwrap(), DisplayMode::Formal);
        assert_eq!("uml".parse::<DisplayMode>().unwrap(), DisplayMode::Formal);
        assert!("fancy".parse::<DisplayMode>().is_err());
        assert_eq!(DisplayMode::Formal.to_string(), "formal");
    }
}
