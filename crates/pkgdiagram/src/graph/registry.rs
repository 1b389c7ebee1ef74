//! Open packages, keyed by qualified name
//!
//! The application root owns one registry and hands out references to it;
//! there is no process-wide package table.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info};

use super::package::Package;
use crate::core::DiagramResult;

#[derive(Debug, Default)]
pub struct PackageRegistry {
    packages: BTreeMap<String, Package>,
}

impl PackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `package`, or return the one already open under its name
    pub fn open(&mut self, package: Package) -> &mut Package {
        let name = package.qualified_name().to_string();
        self.packages.entry(name).or_insert_with(|| {
            debug!(package = %package.qualified_name(), "Package opened");
            package
        })
    }

    /// Load a package file and register it
    ///
    /// If a package with the same name is already open, that instance is
    /// kept and returned.
    pub fn open_file(&mut self, path: impl AsRef<Path>) -> DiagramResult<&mut Package> {
        let package = Package::load_file(path.as_ref())?;
        info!(path = %path.as_ref().display(), package = %package.qualified_name(), "Opening package file");
        Ok(self.open(package))
    }

    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Package> {
        self.packages.get_mut(name)
    }

    pub fn close(&mut self, name: &str) -> Option<Package> {
        let closed = self.packages.remove(name);
        if closed.is_some() {
            debug!(package = name, "Package closed");
        }
        closed
    }

    /// Qualified names of the open packages, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ClassRole;

    #[test]
    fn test_open_keeps_single_instance() {
        let mut registry = PackageRegistry::new();
        registry.open(Package::new("shapes", "P")).set_status("first");
        let second = registry.open(Package::new("shapes", "P"));
        assert_eq!(second.status(), "first");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_get_mut_and_close() {
        let mut registry = PackageRegistry::new();
        registry.open(Package::new("b", "P"));
        registry.open(Package::new("a", "P"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);

        registry
            .get_mut("a")
            .unwrap()
            .add_class("Widget", ClassRole::Standard)
            .unwrap();
        assert!(registry.get("a").unwrap().target("Widget").is_some());

        assert!(registry.close("a").is_some());
        assert!(registry.close("a").is_none());
        assert!(registry.get("a").is_none());
        assert!(!registry.is_empty());
    }

    #[test]
    fn test_open_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("package.pkgd");
        let mut pkg = Package::new("files", "P");
        pkg.add_class("Reader", ClassRole::Standard).unwrap();
        pkg.save_file(&path).unwrap();

        let mut registry = PackageRegistry::new();
        let opened = registry.open_file(&path).unwrap();
        assert!(opened.target("Reader").is_some());
        assert!(registry.get("files").is_some());
    }
}
