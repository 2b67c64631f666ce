//! Provenance tracking for resources.

use serde::Serialize;

use super::Resource;

/// A resource together with the trail of where it was declared
/// (repo, package, deployment, feature or host).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttachedResource<R> {
    /// The resource itself.
    pub resource: R,
    /// Origin trail, outermost first.
    pub origin: Vec<String>,
}

impl<R> AttachedResource<R> {
    /// Attaches a resource to an origin trail.
    #[must_use]
    pub const fn new(resource: R, origin: Vec<String>) -> Self {
        Self { resource, origin }
    }

    /// Returns the origin trail joined for display.
    #[must_use]
    pub fn source(&self) -> String {
        self.origin.join(" / ")
    }
}

impl<R: Clone + Into<Resource>> AttachedResource<R> {
    /// Converts into an attachment over the kind-erased [`Resource`].
    #[must_use]
    pub fn erase(&self) -> AttachedResource<Resource> {
        AttachedResource {
            resource: self.resource.clone().into(),
            origin: self.origin.clone(),
        }
    }
}

impl<R: std::fmt::Display> std::fmt::Display for AttachedResource<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (from {})", self.resource, self.source())
    }
}
