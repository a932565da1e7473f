//! `pom-inventory`: build a dependency inventory from a tree of Maven POM files.
//!
//! # Flow
//! 1. Parse CLI arguments ([`cli`]) and set up logging.
//! 2. Load the config file and apply CLI overrides ([`config::load_config`]).
//! 3. Find every `pom.xml` under the root ([`locator::find_descriptors`]).
//! 4. Parse the descriptors and merge them into one graph ([`graph`]).
//! 5. Optionally fetch licenses and descriptions per dependency version
//!    from a Maven repository ([`registry`], [`enrich`]).
//! 6. Project the graph and render the requested report ([`report`]).
//! 7. Exit `1` when the root cannot be scanned or the configuration is invalid.

mod cli;
mod config;
mod enrich;
mod error;
mod graph;
mod locator;
mod models;
mod pom;
mod registry;
mod report;

use std::path::Path;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, ReportFormat};
use config::{load_config, Config};
use enrich::{enrich, EnrichmentSummary};
use graph::DependencyGraph;
use locator::find_descriptors;
use registry::maven::MavenRedirectClient;
use report::Projection;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let path = cli
        .path
        .canonicalize()
        .unwrap_or_else(|_| cli.path.clone());

    let mut config = load_config(&path, cli.config.as_deref())?;
    config.merge_cli(&cli);
    // Reject a bad separator before any work is done
    let csv_settings = config.csv_settings()?;

    let (graph, enrichment) = collect(&path, &config, cli.quiet).await?;
    let projection = Projection::new(&graph, &config.report.internal_group_id);

    match cli.report {
        ReportFormat::Csv => {
            let files = report::csv::write_reports(&projection, &csv_settings)?;
            info!(
                "Wrote results to {}, {} and {}",
                files.internal.display(),
                files.external.display(),
                files.artifacts.display()
            );
        }
        ReportFormat::Terminal => {
            report::terminal::render(
                &projection,
                &path,
                enrichment.as_ref(),
                cli.verbose,
                cli.quiet,
            )?;
        }
        ReportFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&projection)?);
        }
    }

    Ok(())
}

/// Scan, build and (when a repository is configured) enrich the graph.
async fn collect(
    root: &Path,
    config: &Config,
    quiet: bool,
) -> Result<(DependencyGraph, Option<EnrichmentSummary>)> {
    let paths = find_descriptors(root)?;

    let (mut graph, summary) = DependencyGraph::from_files(&paths);
    info!(
        "Built graph from {} descriptors ({} skipped): {} components, {} parents, {} dependencies",
        summary.parsed,
        summary.skipped,
        graph.components().count(),
        graph.parents().count(),
        graph.dependency_count()
    );

    let Some(repository) = config.repository_config() else {
        debug!("No repository configured, skipping enrichment");
        return Ok((graph, None));
    };

    info!(
        "Loading licenses and descriptions from {} (repository {})",
        repository.uri, repository.repository
    );
    let client = MavenRedirectClient::new(repository)?;
    let enrichment = enrich(&mut graph, &client, quiet).await?;

    Ok((graph, Some(enrichment)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ScanError;
    use crate::models::{ArtifactKey, License};
    use httpmock::prelude::*;
    use tempfile::TempDir;

    const FIRST_POM: &str = r#"<project>
  <groupId>software.reinvent.test</groupId>
  <artifactId>first</artifactId>
  <version>1.0.0</version>
  <dependencies>
    <dependency><groupId>junit</groupId><artifactId>junit</artifactId><version>4.12</version></dependency>
  </dependencies>
</project>"#;

    const SECOND_POM: &str = r#"<project>
  <groupId>software.reinvent.test</groupId>
  <artifactId>second</artifactId>
  <version>1.0.0</version>
  <properties><wicket.version>7.1.0</wicket.version></properties>
  <dependencies>
    <dependency><groupId>software.reinvent.test</groupId><artifactId>first</artifactId><version>1.0.0</version></dependency>
    <dependency><groupId>org.apache.wicket</groupId><artifactId>wicket-core</artifactId><version>${wicket.version}</version></dependency>
  </dependencies>
</project>"#;

    const JUNIT_POM: &str = r#"<project>
  <groupId>junit</groupId><artifactId>junit</artifactId><version>4.12</version>
  <licenses><license>
    <name>Eclipse Public License 1.0</name>
    <url>http://www.eclipse.org/legal/epl-v10.html</url>
  </license></licenses>
</project>"#;

    const WICKET_POM: &str = r#"<project>
  <parent><groupId>org.apache.wicket</groupId><artifactId>wicket-parent</artifactId><version>7.1.0</version></parent>
  <artifactId>wicket-core</artifactId>
  <description>Wicket is a Java web application framework that takes simplicity, separation of concerns and ease of development to a whole new level.</description>
</project>"#;

    fn project_tree() -> TempDir {
        let dir = TempDir::new().unwrap();
        for (module, xml) in [("first", FIRST_POM), ("second", SECOND_POM)] {
            let module_dir = dir.path().join(module);
            std::fs::create_dir_all(&module_dir).unwrap();
            std::fs::write(module_dir.join("pom.xml"), xml).unwrap();
        }
        dir
    }

    fn config_for(uri: Option<String>) -> Config {
        let mut config = Config::default();
        config.repository.uri = uri;
        config.report.internal_group_id = "software.reinvent.test".to_string();
        config
    }

    #[tokio::test]
    async fn test_collect_enriches_scanned_project() {
        let server = MockServer::start_async().await;
        let junit = server
            .mock_async(|when, then| {
                when.method(GET).query_param("a", "junit").query_param("v", "4.12");
                then.status(200).body(JUNIT_POM);
            })
            .await;
        let wicket = server
            .mock_async(|when, then| {
                when.method(GET)
                    .query_param("a", "wicket-core")
                    .query_param("v", "7.1.0");
                then.status(200).body(WICKET_POM);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).query_param("a", "first");
                then.status(200)
                    .body("<html><body>Artifact not found</body></html>");
            })
            .await;

        let dir = project_tree();
        let config = config_for(Some(server.url("/redirect")));
        let (graph, enrichment) = collect(dir.path(), &config, true).await.unwrap();

        junit.assert_async().await;
        wicket.assert_async().await;

        let components: Vec<&str> = graph
            .components()
            .map(|c| c.key.artifact_id.as_str())
            .collect();
        assert_eq!(components, vec!["first", "second"]);

        let junit = graph.dependency(&ArtifactKey::new("junit", "junit")).unwrap();
        assert_eq!(junit.versions.iter().collect::<Vec<_>>(), vec!["4.12"]);
        assert!(junit.licenses.contains(&License::new(
            "Eclipse Public License 1.0",
            "http://www.eclipse.org/legal/epl-v10.html"
        )));

        let wicket = graph
            .dependency(&ArtifactKey::new("org.apache.wicket", "wicket-core"))
            .unwrap();
        assert_eq!(wicket.versions.iter().collect::<Vec<_>>(), vec!["7.1.0"]);
        assert!(wicket.description.starts_with("Wicket is a Java web application"));

        let first = graph
            .dependency(&ArtifactKey::new("software.reinvent.test", "first"))
            .unwrap();
        assert!(first.licenses.is_empty());
        assert!(first.description.is_empty());

        let second = graph
            .component(&ArtifactKey::new("software.reinvent.test", "second"))
            .unwrap();
        assert!(second
            .dependencies
            .contains(&ArtifactKey::new("software.reinvent.test", "first")));

        let enrichment = enrichment.unwrap();
        assert_eq!(enrichment.lookups, 3);
        assert_eq!(enrichment.merged, 2);
        assert_eq!(enrichment.not_found, 1);
    }

    #[tokio::test]
    async fn test_collect_without_repository_is_offline() {
        let dir = project_tree();
        let (graph, enrichment) = collect(dir.path(), &config_for(None), true).await.unwrap();

        assert!(enrichment.is_none());
        assert_eq!(graph.components().count(), 2);
        assert!(graph.dependencies().all(|d| d.licenses.is_empty()));
    }

    #[tokio::test]
    async fn test_collect_missing_root_is_fatal() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = collect(&missing, &config_for(None), true).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScanError>(),
            Some(ScanError::RootNotFound { .. })
        ));
    }
}
