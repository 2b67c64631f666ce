//! Listener resources: a host port bound on a protocol.

use serde::{Deserialize, Serialize};

use super::{AttachedProvided, AttachedResource, ResourceKind, ResourceSpec, Transport};

/// A port a deployment listens on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenerResource {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Port number.
    pub port: u16,
    /// Transport protocol.
    #[serde(default)]
    pub protocol: Transport,
}

impl ListenerResource {
    /// Creates a listener on the given port and protocol.
    #[must_use]
    pub fn new(port: u16, protocol: Transport) -> Self {
        Self {
            description: String::new(),
            port,
            protocol,
        }
    }
}

impl ResourceSpec for ListenerResource {
    const KIND: ResourceKind = ResourceKind::Listener;

    fn select_provided(set: &AttachedProvided) -> &[AttachedResource<Self>] {
        &set.listeners
    }

    fn conflicts_with(&self, other: &Self) -> Vec<String> {
        if self.port == other.port && self.protocol == other.protocol {
            return vec![format!("same port/protocol {}/{}", self.port, self.protocol)];
        }
        vec![]
    }

    fn unmet_by(&self, candidate: &Self) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.port != candidate.port {
            reasons.push(format!("unmatched port {}", self.port));
        }
        if self.protocol != candidate.protocol {
            reasons.push(format!("unmatched protocol {}", self.protocol));
        }
        reasons
    }
}

impl std::fmt::Display for ListenerResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener {}/{}", self.port, self.protocol)
    }
}
