//! In-memory dependency graph built from the scanned POM files.
//!
//! Entities live in maps keyed by their identity:
//! - components by `(groupId, artifactId)`,
//! - parents by `(groupId, artifactId, version)`,
//! - dependencies by `(groupId, artifactId)`, one shared record per identity.
//!
//! Components hold the keys of their dependencies, so every component that
//! declares the same artifact sees the same [`Dependency`] record.

pub mod merge;
pub mod version;

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::models::{ArtifactKey, Component, Dependency, Parent, ParentKey};
use crate::pom::{read_descriptor, DeclaredDependency, Descriptor};

use merge::{merge_component, merge_parent};
use version::substitute_versions;

#[derive(Debug, Default)]
pub struct DependencyGraph {
    components: BTreeMap<ArtifactKey, Component>,
    parents: BTreeMap<ParentKey, Parent>,
    dependencies: BTreeMap<ArtifactKey, Dependency>,
}

/// Outcome of reading a batch of descriptor files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildSummary {
    pub parsed: usize,
    pub skipped: usize,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse every file and add it to a fresh graph.
    ///
    /// Files that cannot be read or parsed are logged and skipped.
    pub fn from_files(paths: &[PathBuf]) -> (Self, BuildSummary) {
        info!("Parsing {} pom files", paths.len());

        let mut graph = Self::new();
        let mut summary = BuildSummary::default();

        for path in paths {
            match read_descriptor(path) {
                Ok(descriptor) => {
                    graph.add_descriptor(descriptor);
                    summary.parsed += 1;
                }
                Err(e) => {
                    warn!("Skipping descriptor: {:#}", anyhow::Error::new(e));
                    summary.skipped += 1;
                }
            }
        }

        (graph, summary)
    }

    /// Classify a descriptor as parent or component and merge it into the graph.
    pub fn add_descriptor(&mut self, descriptor: Descriptor) {
        if descriptor.pom.is_aggregator() {
            self.add_parent(descriptor);
        } else {
            self.add_component(descriptor);
        }
    }

    /// Record an aggregator. Its managed dependencies become edges so their
    /// versions are captured, although the parent itself has no outgoing edges.
    fn add_parent(&mut self, descriptor: Descriptor) {
        let Descriptor {
            path,
            last_modified,
            mut pom,
        } = descriptor;

        substitute_versions(&mut pom.managed_dependencies, &pom.properties);
        self.add_dependencies(&pom.managed_dependencies);

        let parent = Parent {
            key: ParentKey {
                group_id: pom.effective_group_id().to_string(),
                artifact_id: pom.artifact_id.clone(),
                version: pom.effective_version().unwrap_or_default().to_string(),
            },
            last_modified,
        };
        debug!("Parent {} from {}", parent.key, path.display());

        let merged = match self.parents.remove(&parent.key) {
            Some(existing) => merge_parent(existing, parent),
            None => parent,
        };
        self.parents.insert(merged.key.clone(), merged);
    }

    fn add_component(&mut self, descriptor: Descriptor) {
        let Descriptor {
            path,
            last_modified,
            mut pom,
        } = descriptor;

        substitute_versions(&mut pom.dependencies, &pom.properties);
        let edges = self.add_dependencies(&pom.dependencies);

        let component = Component {
            key: ArtifactKey::new(pom.effective_group_id(), pom.artifact_id.as_str()),
            versions: pom
                .effective_version()
                .map(str::to_string)
                .into_iter()
                .collect(),
            packaging: pom.packaging.clone(),
            last_modified,
            parent: pom.parent.as_ref().map(|p| ParentKey {
                group_id: p.group_id.clone(),
                artifact_id: p.artifact_id.clone(),
                version: p.version.clone(),
            }),
            dependencies: edges,
        };
        debug!(
            "Component {} with {} dependencies from {}",
            component.key,
            component.dependencies.len(),
            path.display()
        );

        let merged = match self.components.remove(&component.key) {
            Some(existing) => merge_component(existing, component),
            None => component,
        };
        self.components.insert(merged.key.clone(), merged);
    }

    /// Register declared dependencies, reusing the existing record for an
    /// identity and unioning the declared version into it. Returns the keys
    /// the caller attaches as edges.
    fn add_dependencies(&mut self, declared: &[DeclaredDependency]) -> BTreeSet<ArtifactKey> {
        let mut edges = BTreeSet::new();
        for declaration in declared {
            let key = ArtifactKey::new(
                declaration.group_id.clone().unwrap_or_default(),
                declaration.artifact_id.as_str(),
            );
            let dependency = self
                .dependencies
                .entry(key.clone())
                .or_insert_with(|| Dependency::new(key.clone()));
            if let Some(version) = &declaration.version {
                dependency.versions.insert(version.clone());
            }
            edges.insert(key);
        }
        edges
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    #[cfg(test)]
    pub fn component(&self, key: &ArtifactKey) -> Option<&Component> {
        self.components.get(key)
    }

    pub fn parents(&self) -> impl Iterator<Item = &Parent> {
        self.parents.values()
    }

    pub fn dependencies(&self) -> impl Iterator<Item = &Dependency> {
        self.dependencies.values()
    }

    pub fn dependency(&self, key: &ArtifactKey) -> Option<&Dependency> {
        self.dependencies.get(key)
    }

    /// Mutable access to the dependency records without the ability to add or
    /// remove any.
    pub fn dependencies_mut(&mut self) -> impl Iterator<Item = &mut Dependency> {
        self.dependencies.values_mut()
    }

    pub fn dependency_count(&self) -> usize {
        self.dependencies.len()
    }

    /// The dependency records a component points to.
    pub fn edges_of<'a>(&'a self, component: &'a Component) -> impl Iterator<Item = &'a Dependency> {
        component
            .dependencies
            .iter()
            .filter_map(|key| self.dependencies.get(key))
    }

    /// Components declaring the given dependency.
    pub fn dependents<'a>(&'a self, key: &'a ArtifactKey) -> impl Iterator<Item = &'a Component> {
        self.components
            .values()
            .filter(move |c| c.dependencies.contains(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pom::Pom;
    use std::fs;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    fn descriptor(xml: &str, secs: u64) -> Descriptor {
        Descriptor {
            path: PathBuf::from("pom.xml"),
            last_modified: SystemTime::UNIX_EPOCH + Duration::from_secs(secs),
            pom: Pom::from_xml(xml).unwrap(),
        }
    }

    fn module(artifact: &str, packaging: &str, deps: &[(&str, &str, &str)]) -> String {
        let deps: String = deps
            .iter()
            .map(|(g, a, v)| {
                format!(
                    "<dependency><groupId>{g}</groupId><artifactId>{a}</artifactId><version>{v}</version></dependency>"
                )
            })
            .collect();
        format!(
            "<project><groupId>software.reinvent.test</groupId><artifactId>{artifact}</artifactId>\
             <version>1.0</version><packaging>{packaging}</packaging>\
             <dependencies>{deps}</dependencies></project>"
        )
    }

    fn edge_ids(graph: &DependencyGraph, artifact: &str) -> Vec<String> {
        let key = ArtifactKey::new("software.reinvent.test", artifact);
        let component = graph.component(&key).unwrap();
        graph
            .edges_of(component)
            .map(|d| d.key.artifact_id.clone())
            .collect()
    }

    #[test]
    fn test_same_identity_unions_edges_in_either_order() {
        let a = module("core", "jar", &[("junit", "junit", "4.12")]);
        let b = module("core", "jar", &[("org.mockito", "mockito-core", "1.10.19")]);

        for (first, second) in [(&a, &b), (&b, &a)] {
            let mut graph = DependencyGraph::new();
            graph.add_descriptor(descriptor(first, 1));
            graph.add_descriptor(descriptor(second, 2));
            assert_eq!(graph.components().count(), 1);
            assert_eq!(edge_ids(&graph, "core"), vec!["junit", "mockito-core"]);
        }
    }

    #[test]
    fn test_shared_dependency_accumulates_versions() {
        let mut graph = DependencyGraph::new();
        graph.add_descriptor(descriptor(&module("a", "jar", &[("junit", "junit", "4.11")]), 1));
        graph.add_descriptor(descriptor(&module("b", "jar", &[("junit", "junit", "4.12")]), 1));

        assert_eq!(graph.dependency_count(), 1);
        let junit = graph.dependency(&ArtifactKey::new("junit", "junit")).unwrap();
        assert_eq!(
            junit.versions,
            BTreeSet::from(["4.11".to_string(), "4.12".to_string()])
        );
        let dependents: Vec<&str> = graph
            .dependents(&junit.key)
            .map(|c| c.key.artifact_id.as_str())
            .collect();
        assert_eq!(dependents, vec!["a", "b"]);
    }

    #[test]
    fn test_re_adding_same_descriptor_is_idempotent() {
        let xml = module("core", "jar", &[("junit", "junit", "4.12")]);
        let mut once = DependencyGraph::new();
        once.add_descriptor(descriptor(&xml, 7));

        let mut twice = DependencyGraph::new();
        twice.add_descriptor(descriptor(&xml, 7));
        twice.add_descriptor(descriptor(&xml, 7));

        assert_eq!(
            once.components().collect::<Vec<_>>(),
            twice.components().collect::<Vec<_>>()
        );
        assert_eq!(
            once.dependencies().collect::<Vec<_>>(),
            twice.dependencies().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_newer_descriptor_wins_packaging() {
        let mut graph = DependencyGraph::new();
        graph.add_descriptor(descriptor(&module("core", "war", &[]), 9));
        graph.add_descriptor(descriptor(&module("core", "jar", &[]), 3));
        let key = ArtifactKey::new("software.reinvent.test", "core");
        assert_eq!(graph.component(&key).unwrap().packaging, "war");
    }

    #[test]
    fn test_parent_records_managed_versions() {
        let xml = r#"<project>
  <groupId>software.reinvent.test</groupId>
  <artifactId>parent</artifactId>
  <version>1.0</version>
  <packaging>pom</packaging>
  <properties><guava.version>19.0</guava.version></properties>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>com.google.guava</groupId>
        <artifactId>guava</artifactId>
        <version>${guava.version}</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
</project>"#;
        let mut graph = DependencyGraph::new();
        graph.add_descriptor(descriptor(xml, 1));
        graph.add_descriptor(descriptor(xml, 2));

        assert_eq!(graph.components().count(), 0);
        let parents: Vec<&Parent> = graph.parents().collect();
        assert_eq!(parents.len(), 1);
        assert_eq!(parents[0].key.to_string(), "software.reinvent.test:parent:1.0");
        assert_eq!(
            parents[0].last_modified,
            SystemTime::UNIX_EPOCH + Duration::from_secs(2)
        );

        let guava = graph
            .dependency(&ArtifactKey::new("com.google.guava", "guava"))
            .unwrap();
        assert_eq!(guava.versions, BTreeSet::from(["19.0".to_string()]));
    }

    #[test]
    fn test_parents_differ_by_version() {
        let parent = |v: &str| {
            format!(
                "<project><groupId>g</groupId><artifactId>parent</artifactId>\
                 <version>{v}</version><packaging>pom</packaging></project>"
            )
        };
        let mut graph = DependencyGraph::new();
        graph.add_descriptor(descriptor(&parent("1"), 1));
        graph.add_descriptor(descriptor(&parent("2"), 1));
        assert_eq!(graph.parents().count(), 2);
    }

    #[test]
    fn test_component_inherits_group_from_parent() {
        let xml = r#"<project>
  <parent>
    <groupId>software.reinvent.test</groupId>
    <artifactId>parent</artifactId>
    <version>1.0</version>
  </parent>
  <artifactId>child</artifactId>
</project>"#;
        let mut graph = DependencyGraph::new();
        graph.add_descriptor(descriptor(xml, 1));
        let key = ArtifactKey::new("software.reinvent.test", "child");
        let child = graph.component(&key).unwrap();
        assert_eq!(child.parent.as_ref().unwrap().artifact_id, "parent");
        assert_eq!(child.versions, BTreeSet::from(["1.0".to_string()]));
    }

    #[test]
    fn test_placeholder_version_resolved_on_edge() {
        let xml = r#"<project>
  <groupId>software.reinvent.test</groupId>
  <artifactId>first</artifactId>
  <properties><junit.version>4.12</junit.version></properties>
  <dependencies>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>${junit.version}</version>
    </dependency>
  </dependencies>
</project>"#;
        let mut graph = DependencyGraph::new();
        graph.add_descriptor(descriptor(xml, 1));
        let junit = graph.dependency(&ArtifactKey::new("junit", "junit")).unwrap();
        assert_eq!(junit.versions, BTreeSet::from(["4.12".to_string()]));
    }

    #[test]
    fn test_from_files_skips_unparseable() {
        let dir = TempDir::new().unwrap();
        let good = dir.path().join("good.xml");
        let bad = dir.path().join("bad.xml");
        let missing = dir.path().join("missing.xml");
        fs::write(&good, module("core", "jar", &[("junit", "junit", "4.12")])).unwrap();
        fs::write(&bad, "<project><artifactId>broken").unwrap();

        let (graph, summary) = DependencyGraph::from_files(&[good, bad, missing]);
        assert_eq!(
            summary,
            BuildSummary {
                parsed: 1,
                skipped: 2
            }
        );
        assert_eq!(graph.components().count(), 1);
    }

    #[test]
    fn test_first_and_second_scenario() {
        let first = r#"<project>
  <groupId>software.reinvent.test</groupId>
  <artifactId>first</artifactId>
  <version>1.0.0</version>
  <dependencies>
    <dependency>
      <groupId>junit</groupId>
      <artifactId>junit</artifactId>
      <version>4.12</version>
    </dependency>
  </dependencies>
</project>"#;
        let second = r#"<project>
  <groupId>software.reinvent.test</groupId>
  <artifactId>second</artifactId>
  <version>1.0.0</version>
  <dependencies>
    <dependency>
      <groupId>software.reinvent.test</groupId>
      <artifactId>first</artifactId>
      <version>1.0.0</version>
    </dependency>
    <dependency>
      <groupId>org.apache.wicket</groupId>
      <artifactId>wicket-core</artifactId>
      <version>7.1.0</version>
    </dependency>
  </dependencies>
</project>"#;
        let mut graph = DependencyGraph::new();
        graph.add_descriptor(descriptor(first, 1));
        graph.add_descriptor(descriptor(second, 1));

        let names: Vec<&str> = graph
            .components()
            .map(|c| c.key.artifact_id.as_str())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
        assert_eq!(edge_ids(&graph, "first"), vec!["junit"]);
        assert_eq!(edge_ids(&graph, "second"), vec!["wicket-core", "first"]);

        let wicket = graph
            .dependency(&ArtifactKey::new("org.apache.wicket", "wicket-core"))
            .unwrap();
        assert_eq!(wicket.versions, BTreeSet::from(["7.1.0".to_string()]));
    }
}
