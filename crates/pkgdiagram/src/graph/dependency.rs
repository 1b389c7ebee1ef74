//! Dependency arrows between targets
//!
//! A dependency is a directed edge naming its two endpoint targets. It
//! computes where its line meets the two boxes, paints itself, answers
//! mouse hit-tests and persists itself under a key prefix.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::Serialize;
use tracing::warn;

use super::collection::TargetCollection;
use crate::core::{
    Color, DiagramConfig, DiagramError, DiagramResult, Point, Properties, Rect, Stroke, Surface,
};

/// Kind of relationship an arrow stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyKind {
    Extends,
    Implements,
    Uses,
}

impl DependencyKind {
    /// Value stored in a package file's `.type` key
    pub fn type_name(&self) -> &'static str {
        match self {
            DependencyKind::Extends => "ExtendsDependency",
            DependencyKind::Implements => "ImplementsDependency",
            DependencyKind::Uses => "UsesDependency",
        }
    }

    /// Extends and implements arrows form the inheritance graph
    pub fn is_inheritance(&self) -> bool {
        matches!(self, DependencyKind::Extends | DependencyKind::Implements)
    }
}

impl FromStr for DependencyKind {
    type Err = DiagramError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ExtendsDependency" => Ok(DependencyKind::Extends),
            "ImplementsDependency" => Ok(DependencyKind::Implements),
            "UsesDependency" => Ok(DependencyKind::Uses),
            other => Err(DiagramError::unknown_dependency_type(other)),
        }
    }
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DependencyKind::Extends => write!(f, "extends"),
            DependencyKind::Implements => write!(f, "implements"),
            DependencyKind::Uses => write!(f, "uses"),
        }
    }
}

/// The drawn segment of a dependency
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowLine {
    pub from: Point,
    pub to: Point,
}

impl ArrowLine {
    /// Direction from `from` to `to` in screen coordinates
    pub fn angle(&self) -> f64 {
        ((self.to.y - self.from.y) as f64).atan2((self.to.x - self.from.x) as f64)
    }

    pub fn midpoint(&self) -> Point {
        self.from.midpoint(self.to)
    }
}

/// A directed edge between two targets
///
/// Endpoints are identifier names. An endpoint is `None` when the name could
/// not be resolved while loading; such a dependency is dangling and draws
/// nothing.
///
/// Equality and hashing look at the endpoint pair only, so an extends and a
/// uses arrow between the same two targets compare equal.
#[derive(Debug, Clone, Serialize)]
pub struct Dependency {
    from: Option<String>,
    to: Option<String>,
    kind: DependencyKind,
    #[serde(skip)]
    flagged: bool,
    #[serde(skip)]
    selected: bool,
    #[serde(skip)]
    source_slot: Option<Point>,
    #[serde(skip)]
    dest_slot: Option<Point>,
}

impl Dependency {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: DependencyKind) -> Self {
        Self::with_endpoints(Some(from.into()), Some(to.into()), kind)
    }

    pub fn with_endpoints(from: Option<String>, to: Option<String>, kind: DependencyKind) -> Self {
        Self {
            from,
            to,
            kind,
            flagged: false,
            selected: false,
            source_slot: None,
            dest_slot: None,
        }
    }

    pub fn extends(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, DependencyKind::Extends)
    }

    pub fn implements(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, DependencyKind::Implements)
    }

    pub fn uses(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self::new(from, to, DependencyKind::Uses)
    }

    pub fn from(&self) -> Option<&str> {
        self.from.as_deref()
    }

    pub fn to(&self) -> Option<&str> {
        self.to.as_deref()
    }

    pub fn kind(&self) -> DependencyKind {
        self.kind
    }

    /// Both endpoint names, when neither is missing
    pub fn endpoints(&self) -> Option<(&str, &str)> {
        Some((self.from.as_deref()?, self.to.as_deref()?))
    }

    pub fn is_dangling(&self) -> bool {
        self.from.is_none() || self.to.is_none()
    }

    /// Whether `name` is either endpoint
    pub fn touches(&self, name: &str) -> bool {
        self.from.as_deref() == Some(name) || self.to.as_deref() == Some(name)
    }

    pub fn is_flagged(&self) -> bool {
        self.flagged
    }

    pub fn set_flagged(&mut self, flagged: bool) {
        self.flagged = flagged;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Where a uses arrow leaves its source, assigned by the layout pass
    pub fn set_source_slot(&mut self, slot: Option<Point>) {
        self.source_slot = slot;
    }

    /// Where a uses arrow enters its destination, assigned by the layout pass
    pub fn set_dest_slot(&mut self, slot: Option<Point>) {
        self.dest_slot = slot;
    }

    pub fn source_slot(&self) -> Option<Point> {
        self.source_slot
    }

    pub fn dest_slot(&self) -> Option<Point> {
        self.dest_slot
    }

    /// Points where the arrow meets its two boxes
    ///
    /// The angle of the centre-to-centre line picks the boundary point on
    /// each box, so the arrow starts and ends at box edges. Layout slots, if
    /// assigned, take precedence. `None` when an endpoint is missing.
    pub fn attachment_points(&self, targets: &TargetCollection) -> Option<ArrowLine> {
        let (from_name, to_name) = self.endpoints()?;
        let from = targets.get(from_name)?;
        let to = targets.get(to_name)?;

        let c_from = from.center();
        let c_to = to.center();
        // y-up angle of the vector from the destination centre to the source centre
        let angle = ((c_to.y - c_from.y) as f64).atan2((c_from.x - c_to.x) as f64);

        let start = self
            .source_slot
            .unwrap_or_else(|| from.attachment(angle + std::f64::consts::PI));
        let end = self.dest_slot.unwrap_or_else(|| to.attachment(angle));
        Some(ArrowLine {
            from: start,
            to: end,
        })
    }

    /// Mouse hit-test
    ///
    /// The point must lie inside the line's bounding box grown by the hit
    /// tolerance, and its squared perpendicular distance to the line, found
    /// by scaling the distance from the start point by `sin(angle - theta)`,
    /// must be under the configured threshold.
    pub fn contains(&self, p: Point, targets: &TargetCollection, config: &DiagramConfig) -> bool {
        let Some(line) = self.attachment_points(targets) else {
            return false;
        };
        let bounds = Rect::spanning(line.from, line.to).expand(config.hit_tolerance);
        if !bounds.contains_inclusive(p) {
            return false;
        }

        let dx = (p.x - line.from.x) as f64;
        let dy = (p.y - line.from.y) as f64;
        let theta = dy.atan2(dx);
        let scale = (line.angle() - theta).sin();
        let dist_sq = (dx * dx + dy * dy) * scale * scale;
        dist_sq < config.hit_distance_squared
    }

    /// Paint the line and its head
    ///
    /// Inheritance arrows get a hollow triangular head. In normal mode their
    /// line is thick and solid, and the part under the head is painted over
    /// with the background colour; in formal mode the line is dashed and
    /// stops at the head's base. Uses arrows are thin and dashed with an
    /// open head in both modes.
    pub fn paint(&self, surface: &mut dyn Surface, targets: &TargetCollection, config: &DiagramConfig) {
        let Some(line) = self.attachment_points(targets) else {
            return;
        };
        let head = ArrowHead::new(&line, config.arrow_length(), config.arrow_angle);
        let (sx, sy) = (line.from.x as f64, line.from.y as f64);
        let tip = head.tip;

        surface.save();
        surface.set_color(if self.selected {
            Color::ARROW_SELECTED
        } else {
            Color::ARROW
        });
        let outline = if self.selected { 2.0 } else { 1.0 };

        match self.kind {
            DependencyKind::Extends | DependencyKind::Implements => {
                if config.is_formal() {
                    surface.set_stroke(Stroke::dashed(outline));
                    surface.draw_line(sx, sy, head.base.0, head.base.1);
                } else {
                    let width = if self.selected {
                        config.arrow_stroke + 1.0
                    } else {
                        config.arrow_stroke
                    };
                    surface.set_stroke(Stroke::solid(width));
                    surface.draw_line(sx, sy, tip.0, tip.1);
                }
                let triangle = [tip, head.left, head.right];
                surface.save();
                surface.set_color(Color::GRAPH_BACKGROUND);
                surface.fill_polygon(&triangle);
                surface.restore();
                surface.set_stroke(Stroke::solid(outline));
                surface.draw_polygon(&triangle);
            }
            DependencyKind::Uses => {
                surface.set_stroke(Stroke::dashed(outline));
                surface.draw_line(sx, sy, tip.0, tip.1);
                surface.set_stroke(Stroke::solid(outline));
                surface.draw_line(tip.0, tip.1, head.left.0, head.left.1);
                surface.draw_line(tip.0, tip.1, head.right.0, head.right.1);
            }
        }
        surface.restore();
    }

    /// Write `prefix.from`, `prefix.to` and `prefix.type`
    pub fn save(&self, props: &mut Properties, prefix: &str) {
        if let Some(from) = &self.from {
            props.set(format!("{prefix}.from"), from);
        }
        if let Some(to) = &self.to {
            props.set(format!("{prefix}.to"), to);
        }
        props.set(format!("{prefix}.type"), self.kind.type_name());
    }

    /// Read a dependency from the keys under `prefix`
    ///
    /// Endpoint names that do not resolve to a target in `targets` are
    /// reported as warnings and left empty, so one stale arrow does not
    /// abort loading the whole package.
    pub fn load(props: &Properties, prefix: &str, targets: &TargetCollection) -> DiagramResult<Self> {
        let kind: DependencyKind = props.require(&format!("{prefix}.type"))?.parse()?;
        let resolve = |key: String| -> DiagramResult<Option<String>> {
            let name = props.require(&key)?;
            if targets.contains(name) {
                Ok(Some(name.to_string()))
            } else {
                let err = DiagramError::dangling_endpoint(name);
                warn!(key = %key, error = %err, "Dependency endpoint left unresolved");
                Ok(None)
            }
        };
        let from = resolve(format!("{prefix}.from"))?;
        let to = resolve(format!("{prefix}.to"))?;
        Ok(Self::with_endpoints(from, to, kind))
    }
}

impl PartialEq for Dependency {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl Eq for Dependency {}

impl Hash for Dependency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.from.hash(state);
        self.to.hash(state);
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.from.as_deref().unwrap_or("?"),
            self.kind,
            self.to.as_deref().unwrap_or("?")
        )
    }
}

/// Arrow head geometry: tip, the two barb ends and the base midpoint
struct ArrowHead {
    tip: (f64, f64),
    left: (f64, f64),
    right: (f64, f64),
    base: (f64, f64),
}

impl ArrowHead {
    fn new(line: &ArrowLine, length: f64, half_angle: f64) -> Self {
        let tip = (line.to.x as f64, line.to.y as f64);
        // pointing from the tip back along the line
        let back = line.angle() + std::f64::consts::PI;
        let barb = |a: f64| (tip.0 + length * a.cos(), tip.1 + length * a.sin());
        let base_len = length * half_angle.cos();
        Self {
            tip,
            left: barb(back + half_angle),
            right: barb(back - half_angle),
            base: (tip.0 + base_len * back.cos(), tip.1 + base_len * back.sin()),
        }
    }
}
