//! Read-only projections of the finished graph and their renderers.
//!
//! - [`Projection`]: components plus referenced dependencies split into
//!   internal and external by group id, each sorted by identity.
//! - [`csv`]: dated CSV files (internal, external, artifacts).
//! - [`terminal`]: colored summary box and dependency table.

pub mod csv;
pub mod terminal;

use std::collections::BTreeSet;

use serde::Serialize;

use crate::graph::DependencyGraph;
use crate::models::{ArtifactKey, Component, Dependency};

#[derive(Debug, Serialize)]
pub struct Projection<'a> {
    #[serde(skip)]
    graph: &'a DependencyGraph,
    #[serde(skip)]
    internal_group_id: String,
    pub components: Vec<&'a Component>,
    pub internal: Vec<DependencyRow<'a>>,
    pub external: Vec<DependencyRow<'a>>,
}

/// A dependency together with the artifact ids of the components declaring it.
#[derive(Debug, Serialize)]
pub struct DependencyRow<'a> {
    #[serde(flatten)]
    pub dependency: &'a Dependency,
    pub dependents: Vec<&'a str>,
}

impl<'a> Projection<'a> {
    /// Only dependencies declared by at least one component are projected;
    /// versions recorded solely through a parent's managed dependencies stay out.
    pub fn new(graph: &'a DependencyGraph, internal_group_id: &str) -> Self {
        let components: Vec<&Component> = graph.components().collect();

        let referenced: BTreeSet<&ArtifactKey> = components
            .iter()
            .flat_map(|c| c.dependencies.iter())
            .collect();

        let mut internal = Vec::new();
        let mut external = Vec::new();
        for key in referenced {
            let Some(dependency) = graph.dependency(key) else {
                continue;
            };
            let mut dependents: Vec<&str> = graph
                .dependents(key)
                .map(|c| c.key.artifact_id.as_str())
                .collect();
            dependents.sort_unstable();
            let row = DependencyRow {
                dependency,
                dependents,
            };
            if is_internal(&key.group_id, internal_group_id) {
                internal.push(row);
            } else {
                external.push(row);
            }
        }

        Self {
            graph,
            internal_group_id: internal_group_id.to_string(),
            components,
            internal,
            external,
        }
    }

    /// A component's dependencies split into `(internal, external)`, sorted by identity.
    pub fn declared_by<'c>(
        &'c self,
        component: &'c Component,
    ) -> (Vec<&'c Dependency>, Vec<&'c Dependency>) {
        self.graph
            .edges_of(component)
            .partition(|d| is_internal(&d.key.group_id, &self.internal_group_id))
    }

    pub fn dependency_count(&self) -> usize {
        self.internal.len() + self.external.len()
    }
}

/// Group ids are compared ignoring ASCII case. An empty internal group id
/// marks nothing as internal.
pub fn is_internal(group_id: &str, internal_group_id: &str) -> bool {
    !internal_group_id.is_empty() && group_id.eq_ignore_ascii_case(internal_group_id)
}
