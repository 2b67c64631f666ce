//! File export resources: files a deployment writes to a host target path.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::paths::{covers, missing_tags, overlaps};
use super::{AttachedProvided, AttachedResource, ResourceKind, ResourceSpec};

/// A file exported to a target path on the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileExportResource {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Tags describing the export.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Target path on the host.
    pub target: String,
}

impl FileExportResource {
    /// Creates an export to the given target.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            description: String::new(),
            tags: BTreeSet::new(),
            target: target.into(),
        }
    }
}

// Exports are provide-only; no requirement set carries this kind.
impl ResourceSpec for FileExportResource {
    const KIND: ResourceKind = ResourceKind::FileExport;

    fn select_provided(set: &AttachedProvided) -> &[AttachedResource<Self>] {
        &set.file_exports
    }

    fn conflicts_with(&self, other: &Self) -> Vec<String> {
        if overlaps(&self.target, &other.target) {
            return vec![format!(
                "overlapping targets {} and {}",
                self.target, other.target
            )];
        }
        vec![]
    }

    fn unmet_by(&self, candidate: &Self) -> Vec<String> {
        let mut reasons: Vec<String> = missing_tags(&self.tags, &candidate.tags)
            .into_iter()
            .map(|tag| format!("missing tag {tag}"))
            .collect();
        if !covers(&candidate.target, &self.target) {
            reasons.push(format!("unmatched target {}", self.target));
        }
        reasons
    }
}

impl std::fmt::Display for FileExportResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "file export {}", self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_target_conflicts() {
        let a = FileExportResource::new("/etc/caddy/Caddyfile");
        let b = FileExportResource::new("/etc/caddy/Caddyfile");
        assert_eq!(a.conflicts_with(&b).len(), 1);
        assert!(a.conflicts_with(&FileExportResource::new("/etc/hosts")).is_empty());
    }

    #[test]
    fn test_unmet_reasons() {
        let mut provided = FileExportResource::new("/etc/caddy/*");
        provided.tags.insert(String::from("caddy"));

        let mut required = FileExportResource::new("/etc/caddy/Caddyfile");
        required.tags.insert(String::from("caddy"));
        assert!(required.unmet_by(&provided).is_empty());

        required.tags.insert(String::from("tls"));
        assert_eq!(required.unmet_by(&provided), vec!["missing tag tls"]);

        let elsewhere = FileExportResource::new("/etc/nginx/nginx.conf");
        assert_eq!(
            elsewhere.unmet_by(&provided),
            vec!["unmatched target /etc/nginx/nginx.conf"]
        );
    }
}
