//! Keyed container of all targets in one package diagram

use std::collections::HashMap;

use super::target::Target;
use crate::core::Rect;

/// Targets of a package, keyed by identifier name
///
/// Storage order is irrelevant; [`TargetCollection::sorted`] gives the
/// deterministic order used for painting, printing and saving.
#[derive(Debug, Clone, Default)]
pub struct TargetCollection {
    targets: HashMap<String, Target>,
}

impl TargetCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the target stored under `name`
    ///
    /// Returns the target that was replaced, if any.
    pub fn add(&mut self, name: impl Into<String>, target: Target) -> Option<Target> {
        self.targets.insert(name.into(), target)
    }

    pub fn remove(&mut self, name: &str) -> Option<Target> {
        self.targets.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&Target> {
        self.targets.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Target> {
        self.targets.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.targets.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Unordered iteration
    pub fn iter(&self) -> impl Iterator<Item = &Target> {
        self.targets.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Target> {
        self.targets.values_mut()
    }

    /// Targets ordered by identifier name
    pub fn sorted(&self) -> Vec<&Target> {
        let mut entries: Vec<(&String, &Target)> = self.targets.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries.into_iter().map(|(_, t)| t).collect()
    }

    pub fn names_sorted(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.targets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Union of every target's painted box, `None` when empty
    pub fn bounds(&self) -> Option<Rect> {
        self.targets
            .values()
            .map(Target::painted_bounds)
            .reduce(|acc, r| acc.union(&r))
    }
}
