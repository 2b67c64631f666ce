//! Resource model.
//!
//! Deployments provide and require typed resources. Every kind implements
//! [`ResourceSpec`], which carries its conflict and dependency predicates, and
//! converts into the closed [`Resource`] enum for reporting.

mod attached;
mod file_export;
mod fileset;
mod listener;
mod network;
pub mod paths;
mod service;
mod sets;

pub use attached::AttachedResource;
pub use file_export::FileExportResource;
pub use fileset::FilesetResource;
pub use listener::ListenerResource;
pub use network::NetworkResource;
pub use service::ServiceResource;
pub use sets::{AttachedProvided, AttachedRequired, ProvidedResources, RequiredResources};

use serde::{Deserialize, Serialize};

/// Conflict and dependency predicates of a resource kind.
pub trait ResourceSpec: Clone + std::fmt::Debug + std::fmt::Display + Into<Resource> {
    /// The kind tag of this resource type.
    const KIND: ResourceKind;

    /// Returns the reasons `self` and `other` cannot both be provided.
    /// An empty list means they coexist.
    fn conflicts_with(&self, other: &Self) -> Vec<String>;

    /// Returns the reasons `candidate` does not satisfy `self` as a
    /// requirement. An empty list means it is satisfied.
    fn unmet_by(&self, candidate: &Self) -> Vec<String>;

    /// Returns true if this requirement should not constrain ordering.
    fn is_nonblocking(&self) -> bool {
        false
    }

    /// Selects the resources of this kind from a provided set.
    fn select_provided(set: &AttachedProvided) -> &[AttachedResource<Self>];

    /// Selects the resources of this kind from a required set. Kinds that
    /// are never required select nothing.
    fn select_required(_set: &AttachedRequired) -> &[AttachedResource<Self>] {
        &[]
    }
}

/// The finite set of resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// Host port listener.
    Listener,
    /// Named network.
    Network,
    /// Network service.
    Service,
    /// Set of files.
    Fileset,
    /// Exported file.
    FileExport,
}

/// Transport protocol of a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// TCP.
    #[default]
    Tcp,
    /// UDP.
    Udp,
}

/// Transport or application protocol of a service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// TCP.
    #[default]
    Tcp,
    /// UDP.
    Udp,
    /// HTTP.
    Http,
    /// HTTPS.
    Https,
}

/// A resource of any kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Resource {
    /// Host port listener.
    Listener(ListenerResource),
    /// Named network.
    Network(NetworkResource),
    /// Network service.
    Service(ServiceResource),
    /// Set of files.
    Fileset(FilesetResource),
    /// Exported file.
    FileExport(FileExportResource),
}

impl Resource {
    /// Returns the kind of this resource.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Listener(_) => ResourceKind::Listener,
            Self::Network(_) => ResourceKind::Network,
            Self::Service(_) => ResourceKind::Service,
            Self::Fileset(_) => ResourceKind::Fileset,
            Self::FileExport(_) => ResourceKind::FileExport,
        }
    }

    /// Returns the resource's description.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Listener(r) => &r.description,
            Self::Network(r) => &r.description,
            Self::Service(r) => &r.description,
            Self::Fileset(r) => &r.description,
            Self::FileExport(r) => &r.description,
        }
    }

    /// Returns true if this is a nonblocking requirement.
    #[must_use]
    pub fn is_nonblocking(&self) -> bool {
        match self {
            Self::Listener(r) => r.is_nonblocking(),
            Self::Network(r) => r.is_nonblocking(),
            Self::Service(r) => r.is_nonblocking(),
            Self::Fileset(r) => r.is_nonblocking(),
            Self::FileExport(r) => r.is_nonblocking(),
        }
    }
}

macro_rules! impl_into_resource {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Resource {
                fn from(resource: $ty) -> Self {
                    Self::$variant(resource)
                }
            }
        )*
    };
}

impl_into_resource! {
    Listener => ListenerResource,
    Network => NetworkResource,
    Service => ServiceResource,
    Fileset => FilesetResource,
    FileExport => FileExportResource,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Listener => "listener",
            Self::Network => "network",
            Self::Service => "service",
            Self::Fileset => "fileset",
            Self::FileExport => "file export",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tcp => write!(f, "tcp"),
            Self::Udp => write!(f, "udp"),
        }
    }
}

impl std::fmt::Display for Protocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
            Self::Http => "http",
            Self::Https => "https",
        };
        write!(f, "{s}")
    }
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Listener(r) => std::fmt::Display::fmt(r, f),
            Self::Network(r) => std::fmt::Display::fmt(r, f),
            Self::Service(r) => std::fmt::Display::fmt(r, f),
            Self::Fileset(r) => std::fmt::Display::fmt(r, f),
            Self::FileExport(r) => std::fmt::Display::fmt(r, f),
        }
    }
}
