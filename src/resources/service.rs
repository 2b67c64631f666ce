//! Service resources: network services reachable on a port, optionally
//! restricted to a set of paths and labeled with tags.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::paths::{missing_tags, overlapping_paths, uncovered_paths};
use super::{
    AttachedProvided, AttachedRequired, AttachedResource, Protocol, ResourceKind, ResourceSpec,
};

/// A network service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceResource {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Port number.
    pub port: u16,
    /// Application protocol.
    #[serde(default = "default_service_protocol")]
    pub protocol: Protocol,
    /// Tags describing the service.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Paths served. An empty set claims the whole port.
    #[serde(default)]
    pub paths: BTreeSet<String>,
    /// Requirement only: satisfied normally but excluded from ordering.
    #[serde(default)]
    pub nonblocking: bool,
}

const fn default_service_protocol() -> Protocol {
    Protocol::Http
}

impl ServiceResource {
    /// Creates a service on the given port and protocol.
    #[must_use]
    pub fn new(port: u16, protocol: Protocol) -> Self {
        Self {
            description: String::new(),
            port,
            protocol,
            tags: BTreeSet::new(),
            paths: BTreeSet::new(),
            nonblocking: false,
        }
    }

    /// Adds tags.
    #[must_use]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags.extend(tags.iter().map(ToString::to_string));
        self
    }

    /// Adds paths.
    #[must_use]
    pub fn with_paths(mut self, paths: &[&str]) -> Self {
        self.paths.extend(paths.iter().map(ToString::to_string));
        self
    }

    /// Marks the requirement as nonblocking.
    #[must_use]
    pub fn nonblocking(mut self) -> Self {
        self.nonblocking = true;
        self
    }
}

impl ResourceSpec for ServiceResource {
    const KIND: ResourceKind = ResourceKind::Service;

    fn select_provided(set: &AttachedProvided) -> &[AttachedResource<Self>] {
        &set.services
    }

    fn select_required(set: &AttachedRequired) -> &[AttachedResource<Self>] {
        &set.services
    }

    fn conflicts_with(&self, other: &Self) -> Vec<String> {
        if self.port != other.port || self.protocol != other.protocol {
            return vec![];
        }

        let overlaps = overlapping_paths(&self.paths, &other.paths);
        let claims_whole_port = self.paths.is_empty() || other.paths.is_empty();
        if overlaps.is_empty() && !claims_whole_port {
            return vec![];
        }

        let mut reasons = vec![format!("same port/protocol {}/{}", self.port, self.protocol)];
        if claims_whole_port {
            reasons.push(String::from("service without paths claims the whole port"));
        }
        reasons.extend(
            overlaps
                .into_iter()
                .map(|(a, b)| format!("overlapping paths {a} and {b}")),
        );
        reasons
    }

    fn unmet_by(&self, candidate: &Self) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.port != candidate.port {
            reasons.push(format!("unmatched port {}", self.port));
        }
        if self.protocol != candidate.protocol {
            reasons.push(format!("unmatched protocol {}", self.protocol));
        }
        for tag in missing_tags(&self.tags, &candidate.tags) {
            reasons.push(format!("missing tag {tag}"));
        }
        // A candidate without paths serves the whole port.
        if !candidate.paths.is_empty() {
            for path in uncovered_paths(&self.paths, &candidate.paths) {
                reasons.push(format!("unmatched path {path}"));
            }
        }
        reasons
    }

    fn is_nonblocking(&self) -> bool {
        self.nonblocking
    }
}

impl std::fmt::Display for ServiceResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "service {}/{}", self.port, self.protocol)?;
        if !self.paths.is_empty() {
            let paths: Vec<&str> = self.paths.iter().map(String::as_str).collect();
            write!(f, " [{}]", paths.join(", "))?;
        }
        if !self.tags.is_empty() {
            let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
            write!(f, " tags({})", tags.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disjoint_paths_do_not_conflict() {
        let a = ServiceResource::new(80, Protocol::Http).with_paths(&["/api/*"]);
        let b = ServiceResource::new(80, Protocol::Http).with_paths(&["/admin/*"]);
        assert!(a.conflicts_with(&b).is_empty());
    }

    #[test]
    fn test_overlapping_paths_conflict() {
        let a = ServiceResource::new(80, Protocol::Http).with_paths(&["/api/*"]);
        let b = ServiceResource::new(80, Protocol::Http).with_paths(&["/api/v1"]);
        let reasons = a.conflicts_with(&b);
        assert_eq!(reasons.len(), 2);
        assert!(reasons[1].contains("/api/*"));
    }

    #[test]
    fn test_pathless_service_claims_port() {
        let a = ServiceResource::new(8080, Protocol::Http);
        let b = ServiceResource::new(8080, Protocol::Http).with_paths(&["/x"]);
        assert!(!a.conflicts_with(&b).is_empty());
    }

    #[test]
    fn test_dependency_requires_tags_and_paths() {
        let provided = ServiceResource::new(80, Protocol::Http)
            .with_tags(&["rest"])
            .with_paths(&["/api/*"]);
        let satisfied = ServiceResource::new(80, Protocol::Http)
            .with_tags(&["rest"])
            .with_paths(&["/api/v1"]);
        assert!(satisfied.unmet_by(&provided).is_empty());

        let unmet = ServiceResource::new(80, Protocol::Http)
            .with_tags(&["grpc"])
            .with_paths(&["/admin"]);
        assert_eq!(unmet.unmet_by(&provided).len(), 2);
    }

    #[test]
    fn test_nonblocking_flag() {
        assert!(ServiceResource::new(80, Protocol::Http).nonblocking().is_nonblocking());
        assert!(!ServiceResource::new(80, Protocol::Http).is_nonblocking());
    }
}
