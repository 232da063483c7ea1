//! Layered configuration for the filter CLI.
//!
//! Selectors come from (lowest to highest precedence) built-in defaults,
//! a configuration file, and `PKGSIEVE_`-prefixed environment variables.
//! Selector expressions given on the command line are appended afterwards
//! by the filter command itself.

use anyhow::{Context, Result, bail};
use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized, Toml, Yaml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::filter::ResourceSelector;

/// File name written by `config init` and first YAML file probed on load.
pub const DEFAULT_CONFIG_FILE: &str = "pkgsieve.yaml";

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "PKGSIEVE_";

/// Starter configuration written by `config init`.
pub const CONFIG_TEMPLATE: &str = r#"# pkgsieve configuration
#
# Selectors are tested against every CustomResourceDefinition in the stream.
# A definition is dropped only when no selector matches it: a selector with a
# group keeps definitions of that group, and a selector with a name keeps any
# definition not carrying that exact name.
excluded_resources: []
# excluded_resources:
#   - group: example.org
#   - name: widgets.example.org
"#;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Selectors applied to custom resource definitions in the stream.
    pub excluded_resources: Vec<ResourceSelector>,
}

impl FilterConfig {
    /// Load configuration from the default probe chain or an explicit file.
    ///
    /// The probed working-directory files are skipped silently when absent;
    /// an explicitly named file must exist.
    pub fn load(custom: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(path) = custom {
            if !path.exists() {
                bail!("configuration file not found: {}", path.display());
            }
            figment = merge_by_extension(figment, path);
        } else {
            figment = figment
                .merge(Toml::file("pkgsieve.toml"))
                .merge(Json::file("pkgsieve.json"))
                .merge(Yaml::file(DEFAULT_CONFIG_FILE))
                .merge(Yaml::file(".pkgsieve.yaml"));
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX));
        figment.extract().context("failed to load configuration")
    }
}

/// Pick the figment provider from the file extension; YAML is the fallback
/// for unrecognized extensions.
fn merge_by_extension(figment: Figment, path: &Path) -> Figment {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "toml" => figment.merge(Toml::file(path)),
        "json" => figment.merge(Json::file(path)),
        _ => figment.merge(Yaml::file(path)),
    }
}
