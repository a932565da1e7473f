//! Best-effort enrichment of dependency records with remote metadata.
//!
//! Every dependency is processed concurrently; the versions of one dependency
//! are looked up one after another. Each lookup is its own failure boundary:
//! a timeout, bad status or unparseable body is logged and counted, and the
//! remaining lookups carry on. Each dependency future holds the only mutable
//! borrow of its record, so no locking is involved.

use std::ops::AddAssign;

use anyhow::Result;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use crate::graph::DependencyGraph;
use crate::models::Dependency;
use crate::registry::MetadataSource;

/// Counts of what happened during enrichment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichmentSummary {
    pub lookups: usize,
    pub merged: usize,
    pub not_found: usize,
    pub failed: usize,
}

impl AddAssign for EnrichmentSummary {
    fn add_assign(&mut self, other: Self) {
        self.lookups += other.lookups;
        self.merged += other.merged;
        self.not_found += other.not_found;
        self.failed += other.failed;
    }
}

/// Query `source` for every recorded version of every dependency in the graph
/// and merge the results in place.
pub async fn enrich<S>(
    graph: &mut DependencyGraph,
    source: &S,
    quiet: bool,
) -> Result<EnrichmentSummary>
where
    S: MetadataSource + ?Sized,
{
    let pb = progress_bar(graph.dependency_count() as u64, quiet)?;

    let futures: Vec<_> = graph
        .dependencies_mut()
        .map(|dependency| {
            let pb = pb.as_ref();
            async move {
                let summary = enrich_dependency(dependency, source).await;
                if let Some(pb) = pb {
                    pb.inc(1);
                }
                summary
            }
        })
        .collect();

    let mut summary = EnrichmentSummary::default();
    for result in join_all(futures).await {
        summary += result;
    }

    if let Some(pb) = pb {
        pb.finish_with_message("Done");
    }

    info!(
        "Enrichment finished: {} lookups, {} merged, {} not found, {} failed",
        summary.lookups, summary.merged, summary.not_found, summary.failed
    );

    Ok(summary)
}

async fn enrich_dependency<S>(dependency: &mut Dependency, source: &S) -> EnrichmentSummary
where
    S: MetadataSource + ?Sized,
{
    let mut summary = EnrichmentSummary::default();
    let versions: Vec<String> = dependency.versions.iter().cloned().collect();

    for version in &versions {
        summary.lookups += 1;
        match source.fetch_metadata(&dependency.key, version).await {
            Ok(Some(metadata)) => {
                dependency.absorb(metadata);
                summary.merged += 1;
            }
            Ok(None) => {
                debug!("No pom for {}:{} in repository", dependency.key, version);
                summary.not_found += 1;
            }
            Err(e) => {
                warn!("Could not load pom: {:#}", anyhow::Error::new(e));
                summary.failed += 1;
            }
        }
    }

    summary
}

fn progress_bar(len: u64, quiet: bool) -> Result<Option<ProgressBar>> {
    if quiet {
        return Ok(None);
    }
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );
    Ok(Some(pb))
}
