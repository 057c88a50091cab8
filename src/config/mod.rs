use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "./config.yaml";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_DATA_DIR: &str = "./data";
const DEFAULT_MAX_CONCURRENT: usize = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

fn default_host() -> String {
    "127.0.0.1".to_string()
}

// ─── YAML config file ─────────────────────────────────────────────────────────

/// `config.yaml` — all fields are optional overrides.
/// Priority: CLI / env var  >  YAML  >  built-in default.
#[derive(Debug, Deserialize, Default)]
struct YamlConfig {
    /// Bind address for the HTTP listener (default: "127.0.0.1").
    host: Option<String>,
    /// HTTP listener port (default: 8080).
    port: Option<u16>,
    /// Log level filter string, e.g. "debug", "info,taskd=trace" (default: "info").
    log_level: Option<String>,
    /// Directory holding the task snapshot file (default: "./data").
    data_dir: Option<PathBuf>,
    /// Maximum in-flight HTTP requests; 0 = unlimited (default: 10).
    max_concurrent: Option<usize>,
    /// Per-request timeout in seconds; 0 = disabled (default: 30).
    request_timeout: Option<u64>,
}

/// Read and parse a YAML config file.
///
/// A missing file is only an error when the path was given explicitly
/// (`--config` or `TASKD_CONFIG`); the implicit `./config.yaml` falls back to
/// defaults. An empty file parses as an empty override set. Unknown keys are
/// ignored so configs can carry deployment-specific extras.
fn load_yaml(path: &Path, required: bool) -> Result<YamlConfig> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
            return Ok(YamlConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("cannot read config file {}", path.display()));
        }
    };
    if contents.trim().is_empty() {
        return Ok(YamlConfig::default());
    }
    serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))
}

// ─── ServerConfig ─────────────────────────────────────────────────────────────

/// Resolved runtime configuration for the task server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener (TASKD_HOST env var, default: "127.0.0.1").
    pub host: String,
    /// HTTP listener port (TASKD_PORT env var, default: 8080).
    pub port: u16,
    /// Log level filter string passed to the tracing subscriber (default: "info").
    pub log_level: String,
    /// Directory holding the task snapshot file (default: "./data").
    pub data_dir: PathBuf,
    /// Maximum in-flight HTTP requests across all connections; 0 = unlimited.
    pub max_concurrent: usize,
    /// Per-request timeout in seconds; 0 = disabled.
    pub request_timeout: u64,
}

impl ServerConfig {
    /// Build config from CLI/env args + optional YAML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. YAML file (`--config`, `TASKD_CONFIG`, or `./config.yaml`)
    ///   3. Built-in defaults
    pub fn new(
        config_path: Option<PathBuf>,
        host: Option<String>,
        port: Option<u16>,
        log_level: Option<String>,
        data_dir: Option<PathBuf>,
    ) -> Result<Self> {
        let (path, required) = match config_path {
            Some(path) => (path, true),
            None => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
        };
        let yaml = load_yaml(&path, required)?;

        Ok(Self {
            host: host.or(yaml.host).unwrap_or_else(default_host),
            port: port.or(yaml.port).unwrap_or(DEFAULT_PORT),
            log_level: log_level
                .or(yaml.log_level)
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            data_dir: data_dir
                .or(yaml.data_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR)),
            max_concurrent: yaml.max_concurrent.unwrap_or(DEFAULT_MAX_CONCURRENT),
            request_timeout: yaml.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        })
    }
}
