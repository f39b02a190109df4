use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Configuration file structure for stepline.
///
/// Holds connection details and output preferences so they do not have to be
/// repeated on every invocation. Command-line flags take precedence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub harness: HarnessConfig,

    #[serde(default)]
    pub output: OutputConfig,

    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HarnessConfig {
    /// Harness account identifier
    pub account: Option<String>,

    /// Organisation identifier
    #[serde(default = "default_scope")]
    pub org: String,

    /// Project identifier
    #[serde(default = "default_scope")]
    pub project: String,

    /// Harness API key
    pub api_key: Option<String>,

    /// Base URL of the Harness API gateway
    #[serde(default = "default_harness_url")]
    pub api_base_url: String,

    /// Base URL used when building step links
    #[serde(default = "default_harness_url")]
    pub ui_base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,

    /// Also write rendered output to this file
    pub file: Option<PathBuf>,

    /// Emit terminal hyperlinks even when stdout is not a terminal
    #[serde(default)]
    pub force_link: bool,

    /// Show stage and step identifiers next to their names
    #[serde(default)]
    pub show_ids: bool,

    /// Pretty-print JSON output
    #[serde(default)]
    pub pretty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct HttpConfig {
    /// Timeout for a single HTTP request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Flat delay between retries of a transient failure
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// Retries after the first attempt
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            account: None,
            org: default_scope(),
            project: default_scope(),
            api_key: None,
            api_base_url: default_harness_url(),
            ui_base_url: default_harness_url(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            retry_delay_secs: default_retry_delay_secs(),
            max_retries: default_max_retries(),
        }
    }
}

fn default_scope() -> String {
    "default".to_string()
}

fn default_harness_url() -> String {
    "https://app.harness.io".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_retry_delay_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    5
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Searches for configuration files in this order:
    /// 1. Specified path
    /// 2. ./stepline.toml
    /// 3. ./stepline.json
    /// 4. ./stepline.yaml
    /// 5. ./stepline.yml
    ///
    /// Returns default configuration if no file is found. A path given
    /// explicitly must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load_from_path(path);
        }

        let candidates = ["stepline.toml", "stepline.json", "stepline.yaml", "stepline.yml"];

        for candidate in &candidates {
            let path = Path::new(candidate);
            if path.exists() {
                return Self::load_from_path(path);
            }
        }

        Ok(Self::default())
    }

    fn load_from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension {
            "toml" => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display())),
            "json" => serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display())),
            "yaml" | "yml" => serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display())),
            _ => toml::from_str(&contents)
                .or_else(|_| serde_json::from_str(&contents))
                .or_else(|_| serde_yaml::from_str(&contents))
                .with_context(|| format!("Failed to parse config file: {}", path.display())),
        }
    }
}
