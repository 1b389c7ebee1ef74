//! SVG output surface
//!
//! Tracks the current transform and clip itself so every emitted element
//! carries absolute device coordinates.

use std::fmt::Write;

use super::surface::{Color, Stroke, Surface, TextAlign};

#[derive(Debug, Clone, Copy, PartialEq)]
struct ClipBox {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl ClipBox {
    fn intersect(&self, other: &ClipBox) -> ClipBox {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);
        ClipBox {
            x,
            y,
            width: (right - x).max(0.0),
            height: (bottom - y).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct GraphicsState {
    scale_x: f64,
    scale_y: f64,
    tx: f64,
    ty: f64,
    clip: Option<(usize, ClipBox)>,
    color: Color,
    stroke: Stroke,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            scale_x: 1.0,
            scale_y: 1.0,
            tx: 0.0,
            ty: 0.0,
            clip: None,
            color: Color::BLACK,
            stroke: Stroke::default(),
        }
    }
}

impl GraphicsState {
    fn map(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale_x + self.tx, y * self.scale_y + self.ty)
    }

    fn map_len(&self, len: f64) -> f64 {
        len * (self.scale_x.abs() + self.scale_y.abs()) / 2.0
    }
}

/// Surface that renders into an SVG document
#[derive(Debug, Clone)]
pub struct SvgSurface {
    width: f64,
    height: f64,
    state: GraphicsState,
    stack: Vec<GraphicsState>,
    defs: String,
    body: String,
    next_clip_id: usize,
}

impl SvgSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            state: GraphicsState::default(),
            stack: Vec::new(),
            defs: String::new(),
            body: String::new(),
            next_clip_id: 0,
        }
    }

    /// Complete the document
    pub fn finish(self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = fmt_num(self.width),
            h = fmt_num(self.height)
        );
        if !self.defs.is_empty() {
            out.push_str("<defs>\n");
            out.push_str(&self.defs);
            out.push_str("</defs>\n");
        }
        out.push_str(&self.body);
        out.push_str("</svg>\n");
        out
    }

    fn clip_attr(&self) -> String {
        match self.state.clip {
            Some((id, _)) => format!(r#" clip-path="url(#clip{})""#, id),
            None => String::new(),
        }
    }

    fn stroke_attrs(&self) -> String {
        let mut attrs = format!(
            r#"stroke="{}" stroke-width="{}""#,
            self.state.color,
            fmt_num(self.state.map_len(self.state.stroke.width))
        );
        if self.state.stroke.dashed {
            let dash = fmt_num(self.state.map_len(4.0));
            let _ = write!(attrs, r#" stroke-dasharray="{d} {d}""#, d = dash);
        }
        attrs
    }

    fn points_attr(&self, points: &[(f64, f64)]) -> String {
        points
            .iter()
            .map(|(x, y)| {
                let (x, y) = self.state.map(*x, *y);
                format!("{},{}", fmt_num(x), fmt_num(y))
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn device_rect(&self, x: f64, y: f64, width: f64, height: f64) -> ClipBox {
        let (x1, y1) = self.state.map(x, y);
        let (x2, y2) = self.state.map(x + width, y + height);
        ClipBox {
            x: x1.min(x2),
            y: y1.min(y2),
            width: (x2 - x1).abs(),
            height: (y2 - y1).abs(),
        }
    }
}

impl Surface for SvgSurface {
    fn save(&mut self) {
        self.stack.push(self.state);
    }

    fn restore(&mut self) {
        if let Some(state) = self.stack.pop() {
            self.state = state;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.state.tx += dx * self.state.scale_x;
        self.state.ty += dy * self.state.scale_y;
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.state.scale_x *= sx;
        self.state.scale_y *= sy;
    }

    fn clip_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let mut clip = self.device_rect(x, y, width, height);
        if let Some((_, current)) = self.state.clip {
            clip = current.intersect(&clip);
        }
        let id = self.next_clip_id;
        self.next_clip_id += 1;
        let _ = writeln!(
            self.defs,
            r#"<clipPath id="clip{}"><rect x="{}" y="{}" width="{}" height="{}"/></clipPath>"#,
            id,
            fmt_num(clip.x),
            fmt_num(clip.y),
            fmt_num(clip.width),
            fmt_num(clip.height)
        );
        self.state.clip = Some((id, clip));
    }

    fn set_color(&mut self, color: Color) {
        self.state.color = color;
    }

    fn set_stroke(&mut self, stroke: Stroke) {
        self.state.stroke = stroke;
    }

    fn draw_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        let (x1, y1) = self.state.map(x1, y1);
        let (x2, y2) = self.state.map(x2, y2);
        let _ = writeln!(
            self.body,
            r#"<line x1="{}" y1="{}" x2="{}" y2="{}" {}{}/>"#,
            fmt_num(x1),
            fmt_num(y1),
            fmt_num(x2),
            fmt_num(y2),
            self.stroke_attrs(),
            self.clip_attr()
        );
    }

    fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let r = self.device_rect(x, y, width, height);
        let _ = writeln!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" {}{}/>"#,
            fmt_num(r.x),
            fmt_num(r.y),
            fmt_num(r.width),
            fmt_num(r.height),
            self.stroke_attrs(),
            self.clip_attr()
        );
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let r = self.device_rect(x, y, width, height);
        let _ = writeln!(
            self.body,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"{}/>"#,
            fmt_num(r.x),
            fmt_num(r.y),
            fmt_num(r.width),
            fmt_num(r.height),
            self.state.color,
            self.clip_attr()
        );
    }

    fn fill_polygon(&mut self, points: &[(f64, f64)]) {
        let _ = writeln!(
            self.body,
            r#"<polygon points="{}" fill="{}"{}/>"#,
            self.points_attr(points),
            self.state.color,
            self.clip_attr()
        );
    }

    fn draw_polygon(&mut self, points: &[(f64, f64)]) {
        let _ = writeln!(
            self.body,
            r#"<polygon points="{}" fill="none" {}{}/>"#,
            self.points_attr(points),
            self.stroke_attrs(),
            self.clip_attr()
        );
    }

    fn draw_text(&mut self, x: f64, y: f64, text: &str, font_size: f64, align: TextAlign) {
        let (x, y) = self.state.map(x, y);
        let anchor = match align {
            TextAlign::Start => "start",
            TextAlign::Middle => "middle",
            TextAlign::End => "end",
        };
        let _ = writeln!(
            self.body,
            r#"<text x="{}" y="{}" font-family="sans-serif" font-size="{}" text-anchor="{}" fill="{}"{}>{}</text>"#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(self.state.map_len(font_size)),
            anchor,
            self.state.color,
            self.clip_attr(),
            escape_xml(text)
        );
    }
}

fn fmt_num(v: f64) -> String {
    let rounded = (v * 100.0).round() / 100.0;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{}", rounded)
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
