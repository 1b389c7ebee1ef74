//! Targets: the boxes of a package diagram
//!
//! A target is a class, a sub-package or the package readme. It knows its
//! box, how incident arrows attach to that box, how it is dragged and
//! resized on the grid, and how to persist itself under a key prefix.

use std::fmt;

use serde::Serialize;

use super::role::ClassRole;
use crate::core::{
    text_width, Color, DiagramConfig, DiagramError, DiagramResult, Point, Properties, Rect,
    Stroke, Surface, TextAlign, STANDARD_FONT_SIZE,
};

pub const MIN_WIDTH: i32 = 60;
pub const MIN_HEIGHT: i32 = 40;
pub const DEF_WIDTH: i32 = 80;
pub const DEF_HEIGHT: i32 = 50;
pub const HANDLE_SIZE: i32 = 20;
pub const TEXT_HEIGHT: i32 = 16;
pub const TEXT_BORDER: i32 = 8;
pub const SHAD_SIZE: i32 = 5;
/// Horizontal spacing of uses arrows leaving a target
pub const ARR_HORIZ_DIST: i32 = 5;
/// Vertical spacing of uses arrows entering a target
pub const ARR_VERT_DIST: i32 = 10;

/// Largest coordinate or size accepted from a package file
pub const MAX_COORD: i32 = 1_000_000;

/// Identifier of the readme target, present in every package
pub const README_ID: &str = "@README";

/// What a target stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    Class(ClassRole),
    Package,
    Readme,
}

impl TargetKind {
    /// Value stored in a package file's `.type` key
    pub fn type_name(&self) -> &'static str {
        match self {
            TargetKind::Class(role) => role.type_name(),
            TargetKind::Package => "PackageTarget",
            TargetKind::Readme => "ReadmeTarget",
        }
    }

    pub fn from_type_name(name: &str) -> DiagramResult<Self> {
        match name {
            "PackageTarget" => Ok(TargetKind::Package),
            "ReadmeTarget" => Ok(TargetKind::Readme),
            other => other.parse().map(TargetKind::Class),
        }
    }

    pub fn role(&self) -> Option<ClassRole> {
        match self {
            TargetKind::Class(role) => Some(*role),
            TargetKind::Package | TargetKind::Readme => None,
        }
    }

    fn background(&self) -> Color {
        match self {
            TargetKind::Class(role) => role.background(),
            TargetKind::Package => Color::PACKAGE_BACKGROUND,
            TargetKind::Readme => Color::README_BACKGROUND,
        }
    }
}

/// Compilation state shown by the target's shading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    Normal,
    #[default]
    Invalid,
    Compiling,
}

/// In-progress mouse drag on a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DragState {
    start: Point,
    original: Rect,
    resizing: bool,
}

impl DragState {
    pub fn is_resizing(&self) -> bool {
        self.resizing
    }
}

/// A node of the package diagram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Target {
    name: String,
    bounds: Rect,
    kind: TargetKind,
    state: TargetState,
    selected: bool,
    queued: bool,
}

impl Target {
    pub fn new(name: impl Into<String>, kind: TargetKind, bounds: Rect) -> Self {
        Self {
            name: name.into(),
            bounds,
            kind,
            state: TargetState::default(),
            selected: false,
            queued: false,
        }
    }

    /// A class target at `pos` sized to fit its name
    pub fn class(name: impl Into<String>, role: ClassRole, pos: Point) -> Self {
        let name = name.into();
        let width = Self::width_for_name(&name);
        Self::new(
            name,
            TargetKind::Class(role),
            Rect::new(pos.x, pos.y, width, DEF_HEIGHT),
        )
    }

    /// Width needed to show `name`, a multiple of 10 and at least the default
    pub fn width_for_name(name: &str) -> i32 {
        let width = text_width(name, STANDARD_FONT_SIZE) as i32;
        if width + 20 <= DEF_WIDTH {
            DEF_WIDTH
        } else {
            (width + 29) / 10 * 10
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    pub fn set_kind(&mut self, kind: TargetKind) {
        self.kind = kind;
    }

    pub fn state(&self) -> TargetState {
        self.state
    }

    pub fn set_state(&mut self, state: TargetState) {
        self.state = state;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn toggle_selected(&mut self) {
        self.selected = !self.selected;
    }

    pub fn is_queued(&self) -> bool {
        self.queued
    }

    pub fn set_queued(&mut self, queued: bool) {
        self.queued = queued;
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Box plus its drop shadow
    pub fn painted_bounds(&self) -> Rect {
        Rect::new(
            self.bounds.x,
            self.bounds.y,
            self.bounds.width + SHAD_SIZE,
            self.bounds.height + SHAD_SIZE,
        )
    }

    pub fn set_pos(&mut self, x: i32, y: i32) {
        self.bounds.x = x;
        self.bounds.y = y;
    }

    pub fn set_size(&mut self, width: i32, height: i32) {
        self.bounds.width = width.max(MIN_WIDTH);
        self.bounds.height = height.max(MIN_HEIGHT);
    }

    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }

    /// Whether `p` falls on the bottom-right resize handle
    pub fn is_resize_handle(&self, p: Point) -> bool {
        p.x - self.bounds.x + p.y - self.bounds.y >= self.bounds.width + self.bounds.height - HANDLE_SIZE
    }

    /// Point on the box boundary where a line leaving the centre at `angle` exits
    ///
    /// `angle` is in radians with y pointing up (counter-clockwise from the
    /// positive x axis). Points on the right and bottom sides are pushed out
    /// past the drop shadow.
    pub fn attachment(&self, angle: f64) -> Point {
        let Rect {
            x,
            y,
            width,
            height,
        } = self.bounds;
        let sin = angle.sin();
        let cos = angle.cos();
        let tan = sin / cos;
        let m = height as f64 / width as f64;

        let radius = if tan.abs() < m {
            0.5 * width as f64 / cos.abs()
        } else {
            0.5 * height as f64 / sin.abs()
        };

        let mut p = Point::new(
            x + width / 2 + (radius * cos) as i32,
            y + height / 2 - (radius * sin) as i32,
        );

        // right side
        if -m < tan && tan < m && cos > 0.0 {
            p.x += SHAD_SIZE;
        }
        // bottom
        if tan.abs() > m && sin < 0.0 && p.x > x + SHAD_SIZE {
            p.y += SHAD_SIZE;
        }
        p
    }

    /// Start a drag at `p`; grabbing the handle resizes, anywhere else moves
    pub fn begin_drag(&self, p: Point) -> DragState {
        DragState {
            start: p,
            original: self.bounds,
            resizing: self.is_resize_handle(p),
        }
    }

    /// Follow the mouse to `p`, snapping to the grid
    ///
    /// Returns true when the box changed.
    pub fn drag(&mut self, drag: &DragState, p: Point, grid: i32) -> bool {
        let grid = grid.max(1);
        let (orig_x, orig_y) = if drag.resizing {
            (drag.original.width, drag.original.height)
        } else {
            (drag.original.x, drag.original.y)
        };
        let new_x = (orig_x + p.x - drag.start.x) / grid * grid;
        let new_y = (orig_y + p.y - drag.start.y) / grid * grid;

        let before = self.bounds;
        if drag.resizing {
            self.bounds.width = new_x.max(MIN_WIDTH);
            self.bounds.height = new_y.max(MIN_HEIGHT);
        } else {
            self.bounds.x = new_x.max(0);
            self.bounds.y = new_y.max(0);
        }
        before != self.bounds
    }

    /// Move the box to `p`, snapped to the grid and kept at non-negative coordinates
    pub fn move_to(&mut self, p: Point, grid: i32) {
        let grid = grid.max(1);
        self.bounds.x = (p.x / grid * grid).max(0);
        self.bounds.y = (p.y / grid * grid).max(0);
    }

    /// Resize on the grid, never below the minimum size
    pub fn resize_to(&mut self, width: i32, height: i32, grid: i32) {
        let grid = grid.max(1);
        self.set_size(width / grid * grid, height / grid * grid);
    }

    /// Write this target's keys under `prefix`
    pub fn save(&self, props: &mut Properties, prefix: &str) {
        props.set(format!("{prefix}.name"), &self.name);
        props.set(format!("{prefix}.x"), self.bounds.x);
        props.set(format!("{prefix}.y"), self.bounds.y);
        props.set(format!("{prefix}.width"), self.bounds.width);
        props.set(format!("{prefix}.height"), self.bounds.height);
        props.set(format!("{prefix}.type"), self.kind.type_name());
    }

    /// Read a target from the keys under `prefix`
    ///
    /// A missing `.type` key loads as a standard class.
    pub fn load(props: &Properties, prefix: &str) -> DiagramResult<Self> {
        let name = props.require(&format!("{prefix}.name"))?.to_string();
        if name.is_empty() {
            return Err(DiagramError::missing_property(format!("{prefix}.name")));
        }
        let x = load_coord(props, &format!("{prefix}.x"), -MAX_COORD)?;
        let y = load_coord(props, &format!("{prefix}.y"), -MAX_COORD)?;
        let width = load_coord(props, &format!("{prefix}.width"), 0)?;
        let height = load_coord(props, &format!("{prefix}.height"), 0)?;
        let kind = match props.get(&format!("{prefix}.type")) {
            Some(t) => TargetKind::from_type_name(t)?,
            None => TargetKind::Class(ClassRole::Standard),
        };
        let mut target = Self::new(name, kind, Rect::new(x, y, 0, 0));
        target.set_size(width, height);
        Ok(target)
    }

    /// Draw box, shading, name bar, shadow and border
    pub fn paint(&self, surface: &mut dyn Surface, _config: &DiagramConfig) {
        let b = self.bounds;
        let (x, y, w, h) = (b.x as f64, b.y as f64, b.width as f64, b.height as f64);

        surface.save();
        surface.set_stroke(Stroke::solid(1.0));

        surface.set_color(self.kind.background());
        surface.fill_box(b);

        if self.state != TargetState::Normal {
            surface.set_color(Color::TARGET_SHADOW);
            stripe_rect(surface, b, 8, 3);
        }

        let name_bar = Rect::new(
            b.x + TEXT_BORDER,
            b.y + TEXT_BORDER,
            b.width - 2 * TEXT_BORDER,
            TEXT_HEIGHT,
        );
        surface.set_color(Color::TEXT_BACKGROUND);
        surface.fill_box(name_bar);

        // shadow and resize grip
        surface.set_color(Color::TARGET_SHADOW);
        surface.fill_rect(x + SHAD_SIZE as f64, y + h, w, SHAD_SIZE as f64);
        surface.fill_rect(x + w, y + SHAD_SIZE as f64, SHAD_SIZE as f64, h);
        surface.set_stroke(Stroke::solid(3.0));
        surface.draw_line(x + w - HANDLE_SIZE as f64, y + h, x + w, y + h - HANDLE_SIZE as f64);

        surface.set_color(Color::BORDER);
        surface.set_stroke(Stroke::solid(1.0));
        surface.stroke_box(name_bar);
        let thickness = if self.selected { 4.0 } else { 1.0 };
        surface.set_stroke(Stroke::solid(thickness));
        surface.stroke_box(b);
        surface.set_stroke(Stroke::solid(1.0));
        let handle = HANDLE_SIZE as f64;
        surface.draw_line(x + w - handle - 2.0, y + h, x + w, y + h - handle - 2.0);
        surface.draw_line(x + w - handle + 2.0, y + h, x + w, y + h - handle + 2.0);

        let text_x = x + w / 2.0;
        let text_y = (name_bar.y + TEXT_HEIGHT - 4) as f64;
        surface.draw_text(text_x, text_y, self.display_name(), STANDARD_FONT_SIZE, TextAlign::Middle);

        if let Some(stereotype) = self.kind.role().and_then(|r| r.stereotype()) {
            let stereo_y = text_y + TEXT_HEIGHT as f64;
            if stereo_y < y + h {
                surface.draw_text(text_x, stereo_y, stereotype, STANDARD_FONT_SIZE - 2.0, TextAlign::Middle);
            }
        }
        surface.restore();
    }

    fn display_name(&self) -> &str {
        match self.kind {
            TargetKind::Readme => "README",
            TargetKind::Class(_) | TargetKind::Package => &self.name,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[\"{}\"]", self.kind.type_name(), self.name)
    }
}

/// Read an integer key and check it lies in `min..=MAX_COORD`
fn load_coord(props: &Properties, key: &str, min: i32) -> DiagramResult<i32> {
    let value: i32 = props.get_parsed(key)?;
    if (min..=MAX_COORD).contains(&value) {
        Ok(value)
    } else {
        Err(DiagramError::invalid_number(key, value.to_string()))
    }
}

/// Diagonal hatching over `r`, `separation` pixels apart
fn stripe_rect(surface: &mut dyn Surface, r: Rect, separation: i32, thickness: i32) {
    surface.save();
    surface.clip_rect(r.x as f64, r.y as f64, r.width as f64, r.height as f64);
    surface.set_stroke(Stroke::solid(thickness as f64));
    let mut offset = separation;
    while offset < r.width + r.height {
        let x1 = (r.x + offset) as f64;
        surface.draw_line(x1, r.y as f64, x1 - r.height as f64, r.bottom() as f64);
        offset += separation;
    }
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{RecordingSurface, Size};
    use std::f64::consts::PI;

    fn boxed(x: i32, y: i32, w: i32, h: i32) -> Target {
        Target::new("T", TargetKind::Class(ClassRole::Standard), Rect::new(x, y, w, h))
    }

    #[test]
    fn test_width_for_short_and_long_names() {
        assert_eq!(Target::width_for_name("A"), DEF_WIDTH);
        let long = Target::width_for_name("AVeryLongClassNameIndeed");
        assert!(long > DEF_WIDTH);
        assert_eq!(long % 10, 0);
    }

    #[test]
    fn test_attachment_on_each_side() {
        let t = boxed(100, 100, 80, 40);
        // left side: no shadow correction
        assert_eq!(t.attachment(PI), Point::new(100, 120));
        // right side: pushed past the shadow
        assert_eq!(t.attachment(0.0), Point::new(180 + SHAD_SIZE, 120));
        // top
        assert_eq!(t.attachment(PI / 2.0), Point::new(140, 100));
        // bottom: pushed past the shadow
        assert_eq!(t.attachment(-PI / 2.0), Point::new(140, 140 + SHAD_SIZE));
    }

    #[test]
    fn test_drag_moves_on_grid() {
        let mut t = boxed(100, 100, 80, 50);
        let drag = t.begin_drag(Point::new(110, 110));
        assert!(!drag.is_resizing());
        assert!(t.drag(&drag, Point::new(137, 104), 10));
        assert_eq!(t.bounds().origin(), Point::new(120, 90));
    }

    #[test]
    fn test_drag_clamps_at_origin() {
        let mut t = boxed(10, 10, 80, 50);
        let drag = t.begin_drag(Point::new(15, 15));
        t.drag(&drag, Point::new(-100, -100), 10);
        assert_eq!(t.bounds().origin(), Point::new(0, 0));
    }

    #[test]
    fn test_resize_from_handle_respects_minimum() {
        let mut t = boxed(0, 0, 80, 50);
        let drag = t.begin_drag(Point::new(78, 48));
        assert!(drag.is_resizing());
        t.drag(&drag, Point::new(200, 200), 10);
        assert_eq!(t.bounds().size().width, 200);
        t.drag(&drag, Point::new(0, 0), 10);
        assert_eq!(t.bounds().width, MIN_WIDTH);
        assert_eq!(t.bounds().height, MIN_HEIGHT);
    }

    #[test]
    fn test_move_and_resize_snap() {
        let mut t = boxed(0, 0, 80, 50);
        t.move_to(Point::new(47, -13), 10);
        assert_eq!(t.bounds().origin(), Point::new(40, 0));
        t.resize_to(97, 12, 10);
        assert_eq!(t.bounds().size().width, 90);
        assert_eq!(t.bounds().height, MIN_HEIGHT);
    }

    #[test]
    fn test_save_and_load() {
        let t = Target::new("Shape", TargetKind::Class(ClassRole::Interface), Rect::new(10, 20, 90, 50));
        let mut props = Properties::new();
        t.save(&mut props, "target1");
        assert_eq!(props.get("target1.type"), Some("InterfaceTarget"));
        let loaded = Target::load(&props, "target1").unwrap();
        assert_eq!(loaded.name(), "Shape");
        assert_eq!(loaded.bounds(), t.bounds());
        assert_eq!(loaded.kind(), t.kind());
    }

    #[test]
    fn test_load_reports_bad_numbers() {
        let props = Properties::parse("t.name=A\nt.x=ten\nt.y=0\nt.width=80\nt.height=50").unwrap();
        assert!(matches!(
            Target::load(&props, "t"),
            Err(DiagramError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_load_rejects_coordinates_out_of_range() {
        let props = Properties::parse(
            "t.name=A\nt.x=2147483600\nt.y=0\nt.width=80\nt.height=50\n\
             u.name=B\nu.x=0\nu.y=0\nu.width=80\nu.height=-5",
        )
        .unwrap();
        match Target::load(&props, "t") {
            Err(DiagramError::InvalidNumber { key, .. }) => assert_eq!(key, "t.x"),
            other => panic!("expected InvalidNumber, got {:?}", other),
        }
        assert!(matches!(
            Target::load(&props, "u"),
            Err(DiagramError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_load_applies_minimum_size() {
        let props = Properties::parse("t.name=A\nt.x=0\nt.y=0\nt.width=0\nt.height=0").unwrap();
        let t = Target::load(&props, "t").unwrap();
        assert_eq!(t.bounds().size(), Size::new(MIN_WIDTH, MIN_HEIGHT));
        // a real box means the attachment point leaves the centre
        assert_ne!(t.attachment(0.0), t.center());
    }

    #[test]
    fn test_paint_draws_name_and_stereotype() {
        let t = Target::new("Shape", TargetKind::Class(ClassRole::Interface), Rect::new(0, 0, 100, 60));
        let mut surface = RecordingSurface::new();
        t.paint(&mut surface, &DiagramConfig::default());
        let texts: Vec<_> = surface.texts().collect();
        assert_eq!(texts, vec!["Shape", "<<interface>>"]);
    }
}
