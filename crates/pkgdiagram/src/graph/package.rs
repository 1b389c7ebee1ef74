//! Package: the graph owner
//!
//! A package owns its targets and both arrow sets, keeps the status line
//! shown under the diagram, and reads and writes the package file.

use std::path::Path;

use tracing::{debug, info, span, trace, warn, Level};

use super::collection::TargetCollection;
use super::dependency::{Dependency, DependencyKind};
use super::layout::{recalc_in_uses, recalc_out_uses};
use super::role::ClassRole;
use super::target::{Target, TargetKind, README_ID};
use crate::core::{
    Color, DiagramConfig, DiagramError, DiagramResult, Point, Properties, Rect, Size, Surface,
};

/// Where the readme target always sits
pub const FIXED_TARGET_X: i32 = 10;
pub const FIXED_TARGET_Y: i32 = 10;
const README_WIDTH: i32 = 40;
const README_HEIGHT: i32 = 50;

/// Space kept around the outermost targets
pub const DIAGRAM_BORDER: i32 = 20;

const FILE_HEADER: &str = "pkgdiagram package file";

/// Cursor cycling through positions for newly created targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    x: i32,
    y: i32,
}

impl Default for Placement {
    fn default() -> Self {
        Self { x: 50, y: 50 }
    }
}

impl Placement {
    fn next(&mut self) -> Point {
        self.x += 15;
        if self.x > 200 {
            self.x = 65;
        }
        self.y += 15;
        if self.y > 250 {
            self.y = 65;
        }
        Point::new(self.x, self.y)
    }
}

/// One package diagram
#[derive(Debug, Clone)]
pub struct Package {
    qualified_name: String,
    project_name: String,
    targets: TargetCollection,
    uses_arrows: Vec<Dependency>,
    extends_arrows: Vec<Dependency>,
    status: String,
    placement: Placement,
}

impl Package {
    /// Empty package holding only its readme
    pub fn new(qualified_name: impl Into<String>, project_name: impl Into<String>) -> Self {
        let mut targets = TargetCollection::new();
        targets.add(README_ID, Self::readme());
        Self {
            qualified_name: qualified_name.into(),
            project_name: project_name.into(),
            targets,
            uses_arrows: Vec::new(),
            extends_arrows: Vec::new(),
            status: String::new(),
            placement: Placement::default(),
        }
    }

    fn readme() -> Target {
        Target::new(
            README_ID,
            TargetKind::Readme,
            Rect::new(FIXED_TARGET_X, FIXED_TARGET_Y, README_WIDTH, README_HEIGHT),
        )
    }

    /// Fully qualified name; empty for the unnamed package
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    /// Last segment of the qualified name
    pub fn base_name(&self) -> &str {
        self.qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(&self.qualified_name)
    }

    pub fn is_unnamed(&self) -> bool {
        self.qualified_name.is_empty()
    }

    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    pub fn targets(&self) -> &TargetCollection {
        &self.targets
    }

    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    /// Mutable access to a target; call [`Package::recalc_arrows`] after moving it
    pub fn target_mut(&mut self, name: &str) -> Option<&mut Target> {
        self.targets.get_mut(name)
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
        debug!(status = %self.status, "Package status changed");
    }

    /// Next free spot for a target created without a position
    pub fn place_new_target(&mut self) -> Point {
        self.placement.next()
    }

    pub fn add_target(&mut self, target: Target) -> DiagramResult<()> {
        if self.targets.contains(target.name()) {
            return Err(DiagramError::duplicate_target(target.name()));
        }
        trace!(target = %target, "Adding target");
        self.targets.add(target.name().to_string(), target);
        Ok(())
    }

    /// Create a class at the next automatic position
    pub fn add_class(&mut self, name: &str, role: ClassRole) -> DiagramResult<()> {
        let pos = self.place_new_target();
        self.add_target(Target::class(name, role, pos))
    }

    /// Remove a target together with every arrow touching it
    pub fn remove_target(&mut self, name: &str) -> DiagramResult<Target> {
        let target = self
            .targets
            .remove(name)
            .ok_or_else(|| DiagramError::unknown_target(name))?;
        let before = self.dependency_count();
        self.uses_arrows.retain(|d| !d.touches(name));
        self.extends_arrows.retain(|d| !d.touches(name));
        debug!(
            target = name,
            removed_dependencies = before - self.dependency_count(),
            "Target removed"
        );
        self.recalc_arrows();
        Ok(target)
    }

    /// Add an arrow
    ///
    /// Arrows with an endpoint that is missing or not in this package are
    /// ignored. Adding a uses arrow that is already present sets the flag
    /// on the existing one instead; a repeated inheritance arrow is ignored.
    /// Returns true when the arrow was stored.
    pub fn add_dependency(&mut self, dep: Dependency) -> bool {
        let Some((from, to)) = dep.endpoints() else {
            debug!(dependency = %dep, "Ignoring dependency with a missing endpoint");
            return false;
        };
        if !self.targets.contains(from) || !self.targets.contains(to) {
            debug!(dependency = %dep, "Ignoring dependency on an unknown target");
            return false;
        }

        let list = match dep.kind() {
            DependencyKind::Uses => &mut self.uses_arrows,
            DependencyKind::Extends | DependencyKind::Implements => &mut self.extends_arrows,
        };
        if let Some(existing) = list.iter_mut().find(|d| **d == dep) {
            if existing.kind() == DependencyKind::Uses {
                existing.set_flagged(true);
            }
            trace!(dependency = %dep, "Dependency already present");
            return false;
        }
        trace!(dependency = %dep, "Adding dependency");
        list.push(dep);
        true
    }

    /// Remove the arrow equal to `dep` from the set for its kind
    pub fn remove_dependency(&mut self, dep: &Dependency) -> Option<Dependency> {
        let list = match dep.kind() {
            DependencyKind::Uses => &mut self.uses_arrows,
            DependencyKind::Extends | DependencyKind::Implements => &mut self.extends_arrows,
        };
        let index = list.iter().position(|d| d == dep)?;
        let removed = list.remove(index);
        self.recalc_arrows();
        Some(removed)
    }

    pub fn uses_arrows(&self) -> &[Dependency] {
        &self.uses_arrows
    }

    pub fn extends_arrows(&self) -> &[Dependency] {
        &self.extends_arrows
    }

    /// Inheritance arrows first, then uses arrows
    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.extends_arrows.iter().chain(self.uses_arrows.iter())
    }

    pub fn dependency_count(&self) -> usize {
        self.uses_arrows.len() + self.extends_arrows.len()
    }

    pub fn dependencies_from<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Dependency> + 'a {
        self.dependencies().filter(move |d| d.from() == Some(name))
    }

    pub fn dependencies_to<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Dependency> + 'a {
        self.dependencies().filter(move |d| d.to() == Some(name))
    }

    /// Swap in a freshly analysed arrow set
    ///
    /// The new set is built completely, applying the same rules as
    /// [`Package::add_dependency`], before it replaces the current one.
    pub fn replace_dependencies(&mut self, deps: impl IntoIterator<Item = Dependency>) {
        let mut fresh = self.clone_shell();
        for dep in deps {
            fresh.add_dependency(dep);
        }
        self.uses_arrows = fresh.uses_arrows;
        self.extends_arrows = fresh.extends_arrows;
        self.recalc_arrows();
        debug!(dependencies = self.dependency_count(), "Dependencies replaced");
    }

    /// A package sharing this one's targets, used to validate a new arrow set
    fn clone_shell(&self) -> Package {
        Package {
            qualified_name: String::new(),
            project_name: String::new(),
            targets: self.targets.clone(),
            uses_arrows: Vec::new(),
            extends_arrows: Vec::new(),
            status: String::new(),
            placement: self.placement,
        }
    }

    /// Redistribute uses arrow slots around every target
    pub fn recalc_arrows(&mut self) {
        for dep in &mut self.uses_arrows {
            dep.set_source_slot(None);
            dep.set_dest_slot(None);
        }
        for target in self.targets.iter() {
            recalc_out_uses(target, &mut self.uses_arrows, &self.targets);
            recalc_in_uses(target, &mut self.uses_arrows, &self.targets);
        }
    }

    /// Topmost target under `p`
    pub fn target_at(&self, p: Point) -> Option<&Target> {
        self.targets.sorted().into_iter().rev().find(|t| t.contains(p))
    }

    /// First arrow whose line passes near `p`
    pub fn dependency_at(&self, p: Point, config: &DiagramConfig) -> Option<&Dependency> {
        self.dependencies()
            .find(|d| d.contains(p, &self.targets, config))
    }

    /// Size needed to show every target with a border around them
    pub fn minimum_size(&self) -> Size {
        match self.targets.bounds() {
            Some(b) => Size::new(b.right() + DIAGRAM_BORDER, b.bottom() + DIAGRAM_BORDER),
            None => Size::new(0, 0),
        }
    }

    /// Paint background, arrows and then targets in name order
    pub fn paint(&self, surface: &mut dyn Surface, config: &DiagramConfig) {
        let size = self.minimum_size();
        surface.save();
        surface.set_color(Color::GRAPH_BACKGROUND);
        surface.fill_rect(0.0, 0.0, size.width as f64, size.height as f64);
        for dep in self.dependencies() {
            dep.paint(surface, &self.targets, config);
        }
        for target in self.targets.sorted() {
            target.paint(surface, config);
        }
        surface.restore();
    }

    /// Write the whole package under the standard keys
    ///
    /// The readme is stored under `readme` and not counted in
    /// `package.numTargets`. Arrows are numbered uses first, then
    /// inheritance.
    pub fn save(&self, props: &mut Properties) {
        props.set("package.name", &self.qualified_name);
        props.set("project.name", &self.project_name);

        let mut count = 0;
        for target in self.targets.sorted() {
            if target.kind() == TargetKind::Readme {
                target.save(props, "readme");
            } else {
                count += 1;
                target.save(props, &format!("target{count}"));
            }
        }
        props.set("package.numTargets", count);

        let mut count = 0;
        for dep in self.uses_arrows.iter().chain(self.extends_arrows.iter()) {
            count += 1;
            dep.save(props, &format!("dependency{count}"));
        }
        props.set("package.numDependencies", count);
    }

    /// Build a package from its saved keys
    ///
    /// Broken target entries fail the load. A dependency entry that cannot
    /// be read, or whose endpoints no longer exist, is reported and skipped.
    pub fn load(props: &Properties) -> DiagramResult<Self> {
        let load_span = span!(Level::INFO, "load_package", keys = props.len());
        let _enter = load_span.enter();

        let mut package = Package::new(
            props.get("package.name").unwrap_or_default(),
            props.get("project.name").unwrap_or_default(),
        );

        // the readme keeps its fixed box; a stored entry must still be well formed
        if props.get("readme.name").is_some() {
            Target::load(props, "readme")?;
        }

        let num_targets: usize = props.get_parsed_or("package.numTargets", 0)?;
        for i in 1..=num_targets {
            let target = Target::load(props, &format!("target{i}"))?;
            if package.targets.contains(target.name()) {
                warn!(target = %target.name(), "Duplicate target in package file, later entry wins");
            }
            package.targets.add(target.name().to_string(), target);
        }

        let num_deps: usize = props.get_parsed_or("package.numDependencies", 0)?;
        for i in 1..=num_deps {
            let prefix = format!("dependency{i}");
            match Dependency::load(props, &prefix, &package.targets) {
                Ok(dep) => {
                    package.add_dependency(dep);
                }
                Err(e) => warn!(prefix = %prefix, error = %e, "Skipping unreadable dependency"),
            }
        }
        package.recalc_arrows();

        info!(
            package = %package.qualified_name,
            targets = package.targets.len(),
            dependencies = package.dependency_count(),
            "Package loaded"
        );
        Ok(package)
    }

    /// Update positions and sizes of existing targets from saved keys
    ///
    /// Targets named in `props` that are not in the package are ignored.
    /// Returns how many targets moved or changed size.
    pub fn reread_layout(&mut self, props: &Properties) -> DiagramResult<usize> {
        let num_targets: usize = props.get_parsed_or("package.numTargets", 0)?;
        let mut updated = 0;
        for i in 1..=num_targets {
            let stored = Target::load(props, &format!("target{i}"))?.bounds();
            let name = props.require(&format!("target{i}.name"))?;
            if let Some(target) = self.targets.get_mut(name) {
                let before = target.bounds();
                target.set_pos(stored.x, stored.y);
                target.set_size(stored.width, stored.height);
                if target.bounds() != before {
                    updated += 1;
                }
            }
        }
        self.recalc_arrows();
        debug!(updated, "Layout re-read");
        Ok(updated)
    }

    pub fn save_file(&self, path: impl AsRef<Path>) -> DiagramResult<()> {
        let mut props = Properties::new();
        self.save(&mut props);
        props.save(path.as_ref(), Some(FILE_HEADER))?;
        info!(path = %path.as_ref().display(), "Package saved");
        Ok(())
    }

    pub fn load_file(path: impl AsRef<Path>) -> DiagramResult<Self> {
        let props = Properties::load(path.as_ref())?;
        Self::load(&props)
    }
}
