use std::collections::BTreeSet;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Identity of a component or dependency: `(groupId, artifactId)`, version excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub group_id: String,
    pub artifact_id: String,
}

impl ArtifactKey {
    pub fn new(group_id: impl Into<String>, artifact_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
        }
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.group_id, self.artifact_id)
    }
}

/// Identity of a parent descriptor. Parents are referenced by exact version,
/// so the version is part of the key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParentKey {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

impl std::fmt::Display for ParentKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }
}

/// A buildable unit found in the scanned tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Component {
    #[serde(flatten)]
    pub key: ArtifactKey,
    pub versions: BTreeSet<String>,
    pub packaging: String,
    #[serde(skip)]
    pub last_modified: SystemTime,
    pub parent: Option<ParentKey>,
    /// Outgoing edges, resolved through the graph's dependency table.
    pub dependencies: BTreeSet<ArtifactKey>,
}

/// A non-buildable aggregator descriptor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parent {
    #[serde(flatten)]
    pub key: ParentKey,
    #[serde(skip)]
    pub last_modified: SystemTime,
}

/// A deduplicated dependency edge target, shared by every component that declares it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dependency {
    #[serde(flatten)]
    pub key: ArtifactKey,
    pub versions: BTreeSet<String>,
    pub licenses: BTreeSet<License>,
    pub description: String,
}

impl Dependency {
    pub fn new(key: ArtifactKey) -> Self {
        Self {
            key,
            versions: BTreeSet::new(),
            licenses: BTreeSet::new(),
            description: String::new(),
        }
    }

    /// Merge fetched metadata into this edge.
    ///
    /// Licenses are unioned; the description is only taken while the edge has none,
    /// so the first non-empty description sticks.
    pub fn absorb(&mut self, metadata: ArtifactMetadata) {
        if self.description.trim().is_empty() {
            if let Some(description) = metadata.description.filter(|d| !d.trim().is_empty()) {
                self.description = description;
            }
        }
        self.licenses.extend(metadata.licenses);
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let versions: Vec<&str> = self.versions.iter().map(String::as_str).collect();
        write!(f, "{}:[{}]", self.key, versions.join(", "))
    }
}

/// License value attached to a dependency. Equality is on the `(name, url)` pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct License {
    pub name: Option<String>,
    pub url: Option<String>,
}

impl License {
    #[cfg(test)]
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
        }
    }
}

impl std::fmt::Display for License {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ; {}",
            self.name.as_deref().unwrap_or("null"),
            self.url.as_deref().unwrap_or("null")
        )
    }
}

/// Description and licenses read from a remotely fetched POM.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArtifactMetadata {
    pub description: Option<String>,
    pub licenses: Vec<License>,
}
