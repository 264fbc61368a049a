use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_TASK_FILE: &str = "tasks.json";
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Runtime settings.
///
/// Resolved from, lowest priority first: built-in defaults, an optional
/// `task-cli.toml` in the working directory, and `TASK_CLI_*` environment
/// variables (`TASK_CLI_FILE`, `TASK_CLI_LOG_LEVEL`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default = "default_file")]
    pub file: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            file: default_file(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_sources(
            config::File::with_name("task-cli").required(false),
            config::Environment::with_prefix("TASK_CLI"),
        )
    }

    fn from_sources<F, E>(file: F, env: E) -> anyhow::Result<Self>
    where
        F: config::Source + Send + Sync + 'static,
        E: config::Source + Send + Sync + 'static,
    {
        let settings = config::Config::builder()
            .add_source(file)
            .add_source(env)
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

fn default_file() -> PathBuf {
    PathBuf::from(DEFAULT_TASK_FILE)
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
