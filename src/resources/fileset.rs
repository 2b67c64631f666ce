//! Fileset resources: sets of files on the host made available to apps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::paths::{missing_tags, uncovered_paths};
use super::{AttachedProvided, AttachedRequired, AttachedResource, ResourceKind, ResourceSpec};

/// A set of files identified by paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilesetResource {
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Tags describing the fileset.
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Paths in the fileset.
    #[serde(default)]
    pub paths: BTreeSet<String>,
    /// Requirement only: satisfied normally but excluded from ordering.
    #[serde(default)]
    pub nonblocking: bool,
}

impl FilesetResource {
    /// Creates a fileset over the given paths.
    #[must_use]
    pub fn new(paths: &[&str]) -> Self {
        Self {
            description: String::new(),
            tags: BTreeSet::new(),
            paths: paths.iter().map(ToString::to_string).collect(),
            nonblocking: false,
        }
    }
}

impl ResourceSpec for FilesetResource {
    const KIND: ResourceKind = ResourceKind::Fileset;

    fn select_provided(set: &AttachedProvided) -> &[AttachedResource<Self>] {
        &set.filesets
    }

    fn select_required(set: &AttachedRequired) -> &[AttachedResource<Self>] {
        &set.filesets
    }

    // Filesets are shared read capabilities; overlapping providers coexist.
    fn conflicts_with(&self, _other: &Self) -> Vec<String> {
        vec![]
    }

    fn unmet_by(&self, candidate: &Self) -> Vec<String> {
        let mut reasons: Vec<String> = missing_tags(&self.tags, &candidate.tags)
            .into_iter()
            .map(|tag| format!("missing tag {tag}"))
            .collect();
        reasons.extend(
            uncovered_paths(&self.paths, &candidate.paths)
                .into_iter()
                .map(|path| format!("unmatched path {path}")),
        );
        reasons
    }

    fn is_nonblocking(&self) -> bool {
        self.nonblocking
    }
}

impl std::fmt::Display for FilesetResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let paths: Vec<&str> = self.paths.iter().map(String::as_str).collect();
        write!(f, "fileset [{}]", paths.join(", "))
    }
}
