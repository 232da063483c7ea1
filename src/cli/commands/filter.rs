//! Manifest filtering command.

use crate::cli::Output;
use crate::config::FilterConfig;
use crate::diag::TracingSink;
use crate::filter::{ResourceFilter, ResourceSelector};
use crate::manifest::{self, PackageObject};
use anyhow::{Context, Result, bail};
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Execute the filter command
pub fn execute(
    paths: Vec<PathBuf>,
    destination: Option<PathBuf>,
    format: &str,
    stats: bool,
    exclude: &[String],
    config_path: Option<&Path>,
    output: &Output,
) -> Result<()> {
    let mut config = FilterConfig::load(config_path)?;
    for expr in exclude {
        config.excluded_resources.push(ResourceSelector::parse(expr)?);
    }

    let objects = read_objects(&paths, output)?;
    output.verbose(&format!("{} documents decoded", objects.len()));
    if objects.is_empty() {
        output.warning("No manifest documents found in input");
    }

    let filter = ResourceFilter::new(config.excluded_resources, Arc::new(TracingSink));
    let retained = filter.filter(&objects);
    let summary = filter.stats(&objects, &retained);
    tracing::info!(
        original = summary.original,
        filtered = summary.filtered,
        removed = summary.removed,
        "filtered manifest stream"
    );

    let rendered = match format {
        "yaml" => manifest::to_yaml(&retained)?,
        "json" => manifest::to_json(&retained)?,
        other => bail!("unsupported output format '{other}' (expected yaml or json)"),
    };

    match &destination {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            output.success(&format!(
                "Wrote {} of {} objects to {}",
                summary.filtered,
                summary.original,
                path.display()
            ));
        }
        None => {
            io::stdout()
                .write_all(rendered.as_bytes())
                .context("failed to write to stdout")?;
        }
    }

    if stats {
        output.header("Filter summary");
        output.summary_stats("original", summary.original);
        output.summary_stats("filtered", summary.filtered);
        output.summary_stats("removed", summary.removed);
    }

    Ok(())
}

/// Read and decode every input source in order.
fn read_objects(paths: &[PathBuf], output: &Output) -> Result<Vec<PackageObject>> {
    let mut objects = Vec::new();

    if paths.is_empty() {
        output.step("Reading manifests from stdin");
        let buffer = read_stdin()?;
        objects.extend(manifest::parse_stream(&buffer).context("failed to parse stdin")?);
        return Ok(objects);
    }

    for path in paths {
        let content = if path.as_os_str() == "-" {
            output.step("Reading manifests from stdin");
            read_stdin()?
        } else {
            output.step(&format!("Reading {}", path.display()));
            fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?
        };
        objects.extend(
            manifest::parse_stream(&content)
                .with_context(|| format!("failed to parse {}", path.display()))?,
        );
    }

    Ok(objects)
}

fn read_stdin() -> Result<String> {
    let mut buffer = String::new();
    io::stdin()
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;
    Ok(buffer)
}
