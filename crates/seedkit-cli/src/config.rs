use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use seedkit_engine::EngineOptions;
use seedkit_gateway::GatewayOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Contents of `seedkit.toml`. Every table is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeedkitConfig {
    pub gateway: GatewayOptions,
    pub engine: EngineSettings,
    pub store: StoreSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    pub concurrency: usize,
    pub budget_secs: Option<u64>,
    pub seed: Option<u64>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            concurrency: 1,
            budget_secs: None,
            seed: None,
        }
    }
}

impl EngineSettings {
    pub fn to_options(&self) -> EngineOptions {
        EngineOptions {
            concurrency: self.concurrency,
            run_budget: self.budget_secs.map(Duration::from_secs),
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreSettings {
    /// Directory holding one `<scenario>.json` per seeded scenario.
    pub dir: PathBuf,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("fixtures"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// JSON log file, appended to on every run.
    pub file: PathBuf,
    /// Filter for the log file, in `EnvFilter` syntax.
    pub file_filter: String,
    /// Filter for stderr when `SEEDKIT_LOG` is unset.
    pub stderr_filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            file: PathBuf::from("logs/seedkit.log"),
            file_filter: "info".to_string(),
            stderr_filter: "info".to_string(),
        }
    }
}

/// Read the config at `path`, or fall back to defaults when it does not exist.
pub fn load_config(path: &Path) -> ConfigResult<SeedkitConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(SeedkitConfig::default()),
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&content).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}
