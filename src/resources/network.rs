//! Network resources: named container networks.

use serde::{Deserialize, Serialize};

use super::{AttachedProvided, AttachedRequired, AttachedResource, ResourceKind, ResourceSpec};

/// A named network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkResource {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Network name.
    pub name: String,
}

impl NetworkResource {
    /// Creates a network resource with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            description: String::new(),
            name: name.into(),
        }
    }
}

impl ResourceSpec for NetworkResource {
    const KIND: ResourceKind = ResourceKind::Network;

    fn select_provided(set: &AttachedProvided) -> &[AttachedResource<Self>] {
        &set.networks
    }

    fn select_required(set: &AttachedRequired) -> &[AttachedResource<Self>] {
        &set.networks
    }

    fn conflicts_with(&self, other: &Self) -> Vec<String> {
        if self.name == other.name {
            return vec![format!("same name {}", self.name)];
        }
        vec![]
    }

    fn unmet_by(&self, candidate: &Self) -> Vec<String> {
        if self.name == candidate.name {
            return vec![];
        }
        vec![format!("unmatched name {}", self.name)]
    }
}

impl std::fmt::Display for NetworkResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "network {}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_conflicts() {
        let a = NetworkResource::new("app-net");
        assert_eq!(a.conflicts_with(&NetworkResource::new("app-net")), vec!["same name app-net"]);
        assert!(a.conflicts_with(&NetworkResource::new("db-net")).is_empty());
    }

    #[test]
    fn test_unmet_reasons() {
        let required = NetworkResource::new("app-net");
        assert!(required.unmet_by(&NetworkResource::new("app-net")).is_empty());
        assert_eq!(
            required.unmet_by(&NetworkResource::new("db-net")),
            vec!["unmatched name app-net"]
        );
    }
}
