//! Configuration command implementations.

use crate::cli::{ConfigCommands, Output};
use crate::config::{self, FilterConfig};
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::Path;

/// Execute config commands
pub fn execute(
    cmd: ConfigCommands,
    config_path: Option<&Path>,
    force: bool,
    output: &Output,
) -> Result<()> {
    match cmd {
        ConfigCommands::Init => init(force, output),
        ConfigCommands::Validate => validate(config_path, output),
        ConfigCommands::Show => show(config_path, output),
    }
}

fn init(force: bool, output: &Output) -> Result<()> {
    let path = Path::new(config::DEFAULT_CONFIG_FILE);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    fs::write(path, config::CONFIG_TEMPLATE)
        .with_context(|| format!("failed to write {}", path.display()))?;

    output.success(&format!("Wrote {}", path.display()));
    output.info("Add selectors under excluded_resources to shape the filter");
    Ok(())
}

fn validate(config_path: Option<&Path>, output: &Output) -> Result<()> {
    let config = FilterConfig::load(config_path)?;

    output.success(&format!(
        "Configuration OK ({} selectors)",
        config.excluded_resources.len()
    ));
    for selector in &config.excluded_resources {
        output.list_item(&selector.to_string());
    }
    Ok(())
}

fn show(config_path: Option<&Path>, output: &Output) -> Result<()> {
    let config = FilterConfig::load(config_path)?;

    output.header("Effective configuration");
    print!("{}", serde_yml::to_string(&config)?);
    Ok(())
}
