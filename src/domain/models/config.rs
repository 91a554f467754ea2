use serde::{Deserialize, Serialize};

/// Main configuration structure for grantflow
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Short organisation name substituted into public phase names
    #[serde(default = "default_org_short_name")]
    pub org_short_name: String,

    /// Workflow catalog configuration
    #[serde(default)]
    pub workflows: WorkflowsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_org_short_name() -> String {
    "OTF".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            org_short_name: default_org_short_name(),
            workflows: WorkflowsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Which workflows the registry is built with
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkflowsConfig {
    /// Admin names of the workflows to enable, in registry order
    #[serde(default = "default_enabled_workflows")]
    pub enabled: Vec<String>,

    /// Optional YAML file with additional workflow definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions_file: Option<String>,
}

fn default_enabled_workflows() -> Vec<String> {
    ["single", "single_ext", "single_com", "double"]
        .iter()
        .map(|s| (*s).to_string())
        .collect()
}

impl Default for WorkflowsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled_workflows(),
            definitions_file: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files (stderr only when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
