//! Package lookup.
//!
//! Lookups go through an explicit [`PackageSource`] value passed by the
//! caller. [`LayeredPackageSource`] answers from an overlay first (e.g. local
//! package overrides) and falls back to an underlay (e.g. the package cache).

use std::collections::BTreeMap;
use std::sync::Arc;

use super::package::PackageSpec;

/// Anything that can look up package definitions by path.
pub trait PackageSource {
    /// Returns the package at `path`, if known.
    fn load_package(&self, path: &str) -> Option<Arc<PackageSpec>>;
}

/// An in-memory set of packages keyed by path.
#[derive(Debug, Clone, Default)]
pub struct PackageCatalog {
    packages: BTreeMap<String, Arc<PackageSpec>>,
}

impl PackageCatalog {
    /// Creates a catalog from package definitions. Later duplicates win.
    #[must_use]
    pub fn new(packages: impl IntoIterator<Item = PackageSpec>) -> Self {
        Self {
            packages: packages
                .into_iter()
                .map(|p| (p.path.clone(), Arc::new(p)))
                .collect(),
        }
    }

    /// Number of packages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Returns true if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

impl PackageSource for PackageCatalog {
    fn load_package(&self, path: &str) -> Option<Arc<PackageSpec>> {
        self.packages.get(path).cloned()
    }
}

/// Two-level lookup: overlay first, then underlay.
#[derive(Debug, Clone, Copy)]
pub struct LayeredPackageSource<'a, O: ?Sized, U: ?Sized> {
    overlay: &'a O,
    underlay: &'a U,
}

impl<'a, O: PackageSource + ?Sized, U: PackageSource + ?Sized> LayeredPackageSource<'a, O, U> {
    /// Layers `overlay` over `underlay`.
    #[must_use]
    pub const fn new(overlay: &'a O, underlay: &'a U) -> Self {
        Self { overlay, underlay }
    }
}

impl<O: PackageSource + ?Sized, U: PackageSource + ?Sized> PackageSource
    for LayeredPackageSource<'_, O, U>
{
    fn load_package(&self, path: &str) -> Option<Arc<PackageSpec>> {
        self.overlay
            .load_package(path)
            .or_else(|| self.underlay.load_package(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_shadows_underlay() {
        let mut overridden = PackageSpec::new("pkg/web");
        overridden.description = String::from("local override");
        let overlay = PackageCatalog::new([overridden]);
        let underlay = PackageCatalog::new([PackageSpec::new("pkg/web"), PackageSpec::new("pkg/db")]);

        let layered = LayeredPackageSource::new(&overlay, &underlay);

        let web = layered.load_package("pkg/web").expect("web should resolve");
        assert_eq!(web.description, "local override");
        assert!(layered.load_package("pkg/db").is_some());
        assert!(layered.load_package("pkg/missing").is_none());
    }
}
