use std::path::Path;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::enrich::EnrichmentSummary;

use super::{DependencyRow, Projection};

/// Render a colored terminal report.
pub fn render(
    projection: &Projection<'_>,
    path: &Path,
    enrichment: Option<&EnrichmentSummary>,
    verbose: bool,
    quiet: bool,
) -> Result<()> {
    let components = projection.components.len();
    let internal = projection.internal.len();
    let external = projection.external.len();
    let unlicensed = projection
        .internal
        .iter()
        .chain(&projection.external)
        .filter(|r| r.dependency.licenses.is_empty())
        .count();

    if quiet {
        println!(
            "Components: {}  Internal: {}  External: {}  Without license: {}",
            components,
            internal.to_string().cyan(),
            external.to_string().green(),
            unlicensed.to_string().yellow(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}",
        "pom-inventory".bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(" Scanning: {}\n", path.display());

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(
        " │  {:<48} │",
        format!("Components          : {:>5}", components)
    );
    println!(
        " │  {:<48} │",
        format!("Internal dependencies : {:>3}", internal)
    );
    println!(
        " │  {:<48} │",
        format!("External dependencies : {:>3}", external)
    );
    println!(
        " │  {:<48} │",
        format!("Without license       : {:>3}", unlicensed)
    );
    if let Some(summary) = enrichment {
        println!(
            " │  {:<48} │",
            format!(
                "Lookups {}  merged {}  not found {}  failed {}",
                summary.lookups, summary.merged, summary.not_found, summary.failed
            )
        );
    }
    println!(" └────────────────────────────────────────────────────┘\n");

    if verbose {
        if internal > 0 {
            println!(" {} Internal dependencies:\n", "[INTERNAL]".cyan().bold());
            render_table(&projection.internal);
            println!();
        }
        if external > 0 {
            println!(" {} External dependencies:\n", "[EXTERNAL]".green().bold());
            render_table(&projection.external);
            println!();
        }
    }

    Ok(())
}

fn render_table(rows: &[DependencyRow<'_>]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Group").add_attribute(Attribute::Bold),
            Cell::new("Artifact").add_attribute(Attribute::Bold),
            Cell::new("Versions").add_attribute(Attribute::Bold),
            Cell::new("Licenses").add_attribute(Attribute::Bold),
            Cell::new("Used by").add_attribute(Attribute::Bold),
        ]);

    for row in rows {
        let dep = row.dependency;
        let versions = dep.versions.iter().cloned().collect::<Vec<_>>().join("\n");
        let license_cell = if dep.licenses.is_empty() {
            Cell::new("unknown").fg(Color::DarkGrey)
        } else {
            let names: Vec<String> = dep
                .licenses
                .iter()
                .map(|l| l.name.clone().or_else(|| l.url.clone()).unwrap_or_default())
                .collect();
            Cell::new(names.join("\n")).fg(Color::Green)
        };

        table.add_row(vec![
            Cell::new(&dep.key.group_id),
            Cell::new(&dep.key.artifact_id),
            Cell::new(versions).set_alignment(CellAlignment::Right),
            license_cell,
            Cell::new(row.dependents.join(", ")),
        ]);
    }

    println!("{}", table);
}
