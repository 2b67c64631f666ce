//! Resource sets as declared by packages, and their attached forms.

use serde::{Deserialize, Serialize};

use super::{
    AttachedResource, FileExportResource, FilesetResource, ListenerResource, NetworkResource,
    ServiceResource,
};

/// Resources a package, deployment or feature provides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidedResources {
    /// Host port listeners.
    #[serde(default)]
    pub listeners: Vec<ListenerResource>,
    /// Networks.
    #[serde(default)]
    pub networks: Vec<NetworkResource>,
    /// Services.
    #[serde(default)]
    pub services: Vec<ServiceResource>,
    /// Filesets.
    #[serde(default)]
    pub filesets: Vec<FilesetResource>,
    /// File exports.
    #[serde(default)]
    pub file_exports: Vec<FileExportResource>,
}

/// Resources a deployment or feature requires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredResources {
    /// Networks.
    #[serde(default)]
    pub networks: Vec<NetworkResource>,
    /// Services.
    #[serde(default)]
    pub services: Vec<ServiceResource>,
    /// Filesets.
    #[serde(default)]
    pub filesets: Vec<FilesetResource>,
}

/// Provided resources with their origin trails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttachedProvided {
    /// Host port listeners.
    pub listeners: Vec<AttachedResource<ListenerResource>>,
    /// Networks.
    pub networks: Vec<AttachedResource<NetworkResource>>,
    /// Services.
    pub services: Vec<AttachedResource<ServiceResource>>,
    /// Filesets.
    pub filesets: Vec<AttachedResource<FilesetResource>>,
    /// File exports.
    pub file_exports: Vec<AttachedResource<FileExportResource>>,
}

/// Required resources with their origin trails.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttachedRequired {
    /// Networks.
    pub networks: Vec<AttachedResource<NetworkResource>>,
    /// Services.
    pub services: Vec<AttachedResource<ServiceResource>>,
    /// Filesets.
    pub filesets: Vec<AttachedResource<FilesetResource>>,
}

fn attach<R: Clone>(resources: &[R], origin: &[String]) -> impl Iterator<Item = AttachedResource<R>> {
    resources
        .iter()
        .map(|r| AttachedResource::new(r.clone(), origin.to_vec()))
}

impl AttachedProvided {
    /// Appends a declared set under the given origin.
    pub fn extend_from(&mut self, provided: &ProvidedResources, origin: &[String]) {
        self.listeners.extend(attach(&provided.listeners, origin));
        self.networks.extend(attach(&provided.networks, origin));
        self.services.extend(attach(&provided.services, origin));
        self.filesets.extend(attach(&provided.filesets, origin));
        self.file_exports.extend(attach(&provided.file_exports, origin));
    }

    /// Total number of resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.listeners.len()
            + self.networks.len()
            + self.services.len()
            + self.filesets.len()
            + self.file_exports.len()
    }

    /// Returns true if nothing is provided.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AttachedRequired {
    /// Appends a declared set under the given origin.
    pub fn extend_from(&mut self, required: &RequiredResources, origin: &[String]) {
        self.networks.extend(attach(&required.networks, origin));
        self.services.extend(attach(&required.services, origin));
        self.filesets.extend(attach(&required.filesets, origin));
    }

    /// Total number of resources.
    #[must_use]
    pub fn len(&self) -> usize {
        self.networks.len() + self.services.len() + self.filesets.len()
    }

    /// Returns true if nothing is required.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
