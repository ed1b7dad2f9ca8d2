use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::sample::SampleOptions;
use crate::translate::TranslateOptions;

/// Project configuration loaded from `.oah.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OahConfig {
    pub input: String,
    pub format: OutputFormat,
    /// Default parameter values by name.
    pub values: IndexMap<String, Value>,
    pub sampling: SamplingConfig,
    /// Snippet target ids such as `shell_curl` or `node_request`.
    pub targets: Vec<String>,
}

impl Default for OahConfig {
    fn default() -> Self {
        Self {
            input: "openapi.yaml".to_string(),
            format: OutputFormat::Json,
            values: IndexMap::new(),
            sampling: SamplingConfig::default(),
            targets: Vec::new(),
        }
    }
}

/// How request records are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Payload sampling switches.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub skip_read_only: bool,
    pub skip_write_only: bool,
    pub skip_non_required: bool,
    pub max_depth: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        let defaults = SampleOptions::default();
        Self {
            skip_read_only: defaults.skip_read_only,
            skip_write_only: defaults.skip_write_only,
            skip_non_required: defaults.skip_non_required,
            max_depth: defaults.max_depth,
        }
    }
}

impl From<&SamplingConfig> for SampleOptions {
    fn from(config: &SamplingConfig) -> Self {
        SampleOptions {
            skip_read_only: config.skip_read_only,
            skip_write_only: config.skip_write_only,
            skip_non_required: config.skip_non_required,
            max_depth: config.max_depth,
        }
    }
}

impl From<&OahConfig> for TranslateOptions {
    fn from(config: &OahConfig) -> Self {
        TranslateOptions {
            sample: SampleOptions::from(&config.sampling),
            values: config.values.clone(),
        }
    }
}

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = ".oah.yaml";

/// Load config from a YAML file. Returns `None` if the file doesn't exist.
pub fn load_config(path: &Path) -> Result<Option<OahConfig>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)
        .map_err(|e| format!("failed to read config {}: {}", path.display(), e))?;
    let config: OahConfig = serde_yaml_ng::from_str(&content)
        .map_err(|e| format!("failed to parse config {}: {}", path.display(), e))?;
    Ok(Some(config))
}

/// Generate the default config file content.
pub fn default_config_content() -> &'static str {
    r#"# oah configuration
input: openapi.yaml
format: json            # json | yaml

# Parameter values used before any document default or example.
values: {}
  # owner: octocat
  # filter: assigned

sampling:
  skip_read_only: true
  skip_write_only: false
  skip_non_required: false
  max_depth: 16

# Snippet targets checked by `oah targets`, e.g. shell_curl, node_request.
targets: []
"#
}
