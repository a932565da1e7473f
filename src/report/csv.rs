use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::info;

use crate::models::Component;

use super::{DependencyRow, Projection};

const DEPENDENCY_HEADER: [&str; 6] = [
    "groupId",
    "artifactId",
    "versions",
    "licenses",
    "description",
    "dependentArtifacts",
];

const ARTIFACT_HEADER: [&str; 6] = [
    "groupId",
    "artifactId",
    "version",
    "package",
    "internalDependencies",
    "externalDependencies",
];

const NO_LICENSE: &str = "n/a in pom";

/// Where and how the CSV files are written.
#[derive(Debug, Clone)]
pub struct CsvSettings {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub delimiter: u8,
}

/// Paths of the files written by [`write_reports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub internal: PathBuf,
    pub external: PathBuf,
    pub artifacts: PathBuf,
}

/// Write `Internal_`, `External_` and `Artifacts_` CSV files stamped with today's date.
pub fn write_reports(projection: &Projection<'_>, settings: &CsvSettings) -> Result<ReportFiles> {
    write_reports_on(projection, settings, Local::now().date_naive())
}

pub fn write_reports_on(
    projection: &Projection<'_>,
    settings: &CsvSettings,
    date: NaiveDate,
) -> Result<ReportFiles> {
    std::fs::create_dir_all(&settings.output_dir).with_context(|| {
        format!(
            "could not create result directory {}",
            settings.output_dir.display()
        )
    })?;

    let file = |kind: &str| {
        settings.output_dir.join(format!(
            "{}{}_{}.csv",
            settings.prefix,
            kind,
            date.format("%Y-%m-%d")
        ))
    };
    let files = ReportFiles {
        internal: file("Internal"),
        external: file("External"),
        artifacts: file("Artifacts"),
    };

    write_dependencies(&files.internal, settings.delimiter, &projection.internal)?;
    write_dependencies(&files.external, settings.delimiter, &projection.external)?;
    write_artifacts(&files.artifacts, settings.delimiter, projection)?;

    info!(
        "Found {} dependencies. {} internal and {} external",
        projection.dependency_count(),
        projection.internal.len(),
        projection.external.len()
    );

    Ok(files)
}

fn writer(path: &Path, delimiter: u8) -> Result<::csv::Writer<std::fs::File>> {
    ::csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .with_context(|| format!("could not create {}", path.display()))
}

fn write_dependencies(path: &Path, delimiter: u8, rows: &[DependencyRow<'_>]) -> Result<()> {
    let mut wtr = writer(path, delimiter)?;
    wtr.write_record(DEPENDENCY_HEADER)?;
    for row in rows {
        wtr.write_record(dependency_record(row))?;
    }
    wtr.flush()?;
    Ok(())
}

fn dependency_record(row: &DependencyRow<'_>) -> [String; 6] {
    let dep = row.dependency;
    let licenses = if dep.licenses.is_empty() {
        NO_LICENSE.to_string()
    } else {
        join(dep.licenses.iter().map(ToString::to_string), "\n")
    };
    [
        dep.key.group_id.clone(),
        dep.key.artifact_id.clone(),
        join(dep.versions.iter().cloned(), "\n"),
        licenses,
        dep.description.clone(),
        row.dependents.join("\n"),
    ]
}

fn write_artifacts(path: &Path, delimiter: u8, projection: &Projection<'_>) -> Result<()> {
    let mut wtr = writer(path, delimiter)?;
    wtr.write_record(ARTIFACT_HEADER)?;
    for component in &projection.components {
        wtr.write_record(artifact_record(component, projection))?;
    }
    wtr.flush()?;
    Ok(())
}

fn artifact_record(component: &Component, projection: &Projection<'_>) -> [String; 6] {
    let (internal, external) = projection.declared_by(component);

    [
        component.key.group_id.clone(),
        component.key.artifact_id.clone(),
        join(component.versions.iter().cloned(), ","),
        component.packaging.clone(),
        join(internal.iter().map(|d| d.key.artifact_id.clone()), ","),
        join(external.iter().map(|d| d.to_string()), ","),
    ]
}

fn join(items: impl Iterator<Item = String>, separator: &str) -> String {
    items.collect::<Vec<_>>().join(separator)
}
