//! Toolkit-neutral paint surface
//!
//! The diagram core never talks to a GUI toolkit or a printer directly. It
//! emits paint commands into a [`Surface`] handed to it by the caller, which
//! may be a screen, an SVG page or a [`RecordingSurface`] in tests.

use std::fmt;

use unicode_width::UnicodeWidthStr;

use super::geometry::{Point, Rect};

/// Approximate advance of one display column, relative to the font size
const CHAR_ADVANCE: f64 = 0.6;

/// Font size used for target names
pub const STANDARD_FONT_SIZE: f64 = 12.0;

/// An opaque RGB colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GRAPH_BACKGROUND: Color = Color::rgb(255, 255, 255);
    pub const TARGET_SHADOW: Color = Color::rgb(192, 192, 192);
    pub const TEXT_BACKGROUND: Color = Color::rgb(255, 255, 255);
    pub const BORDER: Color = Color::rgb(0, 0, 0);
    pub const ARROW: Color = Color::rgb(0, 0, 0);
    pub const ARROW_SELECTED: Color = Color::rgb(0, 0, 200);
    pub const CLASS_BACKGROUND: Color = Color::rgb(255, 204, 153);
    pub const ABSTRACT_BACKGROUND: Color = Color::rgb(255, 222, 173);
    pub const INTERFACE_BACKGROUND: Color = Color::rgb(240, 200, 230);
    pub const ENUM_BACKGROUND: Color = Color::rgb(210, 230, 180);
    pub const UNIT_TEST_BACKGROUND: Color = Color::rgb(160, 220, 160);
    pub const IMPORTED_BACKGROUND: Color = Color::rgb(220, 220, 220);
    pub const PACKAGE_BACKGROUND: Color = Color::rgb(180, 180, 230);
    pub const README_BACKGROUND: Color = Color::rgb(255, 255, 200);

    /// `#rrggbb` notation
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Line style
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub width: f64,
    pub dashed: bool,
}

impl Stroke {
    pub const fn solid(width: f64) -> Self {
        Self {
            width,
            dashed: false,
        }
    }

    pub const fn dashed(width: f64) -> Self {
        Self {
            width,
            dashed: true,
        }
    }
}

impl Default for Stroke {
    fn default() -> Self {
        Self::solid(1.0)
    }
}

/// Horizontal placement of text relative to its anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    #[default]
    Start,
    Middle,
    End,
}

/// Destination for paint commands
///
/// Coordinates passed to drawing operations are in user space; `translate`
/// and `scale` modify the user-to-device transform, `clip_rect` intersects
/// the clip with a user-space rectangle. `save`/`restore` bracket changes
/// to transform, clip, colour and stroke.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, dx: f64, dy: f64);
    fn scale(&mut self, sx: f64, sy: f64);
    fn clip_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn set_color(&mut self, color: Color);
    fn set_stroke(&mut self, stroke: Stroke);
    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);
    fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill_polygon(&mut self, points: &[(f64, f64)]);
    fn draw_polygon(&mut self, points: &[(f64, f64)]);
    /// Draw text with its baseline at `y`
    fn draw_text(&mut self, x: f64, y: f64, text: &str, font_size: f64, align: TextAlign);

    fn line_between(&mut self, a: Point, b: Point) {
        self.draw_line(a.x as f64, a.y as f64, b.x as f64, b.y as f64);
    }

    fn fill_box(&mut self, r: Rect) {
        self.fill_rect(r.x as f64, r.y as f64, r.width as f64, r.height as f64);
    }

    fn stroke_box(&mut self, r: Rect) {
        self.draw_rect(r.x as f64, r.y as f64, r.width as f64, r.height as f64);
    }
}

/// Estimated rendered width of `text` at `font_size`
pub fn text_width(text: &str, font_size: f64) -> f64 {
    UnicodeWidthStr::width(text) as f64 * font_size * CHAR_ADVANCE
}

/// A recorded paint command
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Translate { dx: f64, dy: f64 },
    Scale { sx: f64, sy: f64 },
    Clip { x: f64, y: f64, width: f64, height: f64 },
    SetColor(Color),
    SetStroke(Stroke),
    Line { x1: f64, y1: f64, x2: f64, y2: f64 },
    Rect { x: f64, y: f64, width: f64, height: f64, filled: bool },
    Polygon { points: Vec<(f64, f64)>, filled: bool },
    Text { x: f64, y: f64, text: String, font_size: f64, align: TextAlign },
}

/// Surface that keeps every command for later inspection
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (f64, f64, f64, f64)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { x1, y1, x2, y2 } => Some((*x1, *y1, *x2, *y2)),
            _ => None,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Surface for RecordingSurface {
    fn save(&mut self) {
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.commands.push(DrawCommand::Translate { dx, dy });
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.commands.push(DrawCommand::Scale { sx, sy });
    }

    fn clip_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::Clip {
            x,
            y,
            width,
            height,
        });
    }

    fn set_color(&mut self, color: Color) {
        self.commands.push(DrawCommand::SetColor(color));
    }

    fn set_stroke(&mut self, stroke: Stroke) {
        self.commands.push(DrawCommand::SetStroke(stroke));
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.commands.push(DrawCommand::Line { x1, y1, x2, y2 });
    }

    fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            filled: false,
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::Rect {
            x,
            y,
            width,
            height,
            filled: true,
        });
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)]) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            filled: true,
        });
    }

    fn draw_polygon(&mut self, points: &[(f64, f64)]) {
        self.commands.push(DrawCommand::Polygon {
            points: points.to_vec(),
            filled: false,
        });
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, font_size: f64, align: TextAlign) {
        self.commands.push(DrawCommand::Text {
            x,
            y,
            text: text.to_string(),
            font_size,
            align,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex() {
        assert_eq!(Color::rgb(255, 0, 16).to_hex(), "#ff0010");
        assert_eq!(Color::BLACK.to_string(), "#000000");
    }

    #[test]
    fn test_text_width_counts_display_columns() {
        assert_eq!(text_width("", 10.0), 0.0);
        assert!((text_width("abcd", 10.0) - 24.0).abs() < 1e-9);
        // wide glyphs take two columns
        assert!(text_width("漢", 10.0) > text_width("a", 10.0));
    }

    #[test]
    fn test_recording_surface_helpers() {
        let mut surface = RecordingSurface::new();
        surface.line_between(Point::new(1, 2), Point::new(3, 4));
        surface.draw_text(0.0, 0.0, "Label", 12.0, TextAlign::Start);
        assert_eq!(surface.lines().collect::<Vec<_>>(), vec![(1.0, 2.0, 3.0, 4.0)]);
        assert_eq!(surface.texts().collect::<Vec<_>>(), vec!["Label"]);
    }
}
