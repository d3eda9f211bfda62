use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.studio.nebius.ai/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/Meta-Llama-3.1-70B-Instruct";
pub const TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout: Duration,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            log_file: std::env::temp_dir().join("aitodo.log"),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Config::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout = match non_empty("AITODO_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) => Duration::from_secs(secs),
                Err(_) => {
                    log::warn!("AITODO_TIMEOUT_SECS={:?} is not a number, using {}s", raw, DEFAULT_TIMEOUT_SECS);
                    defaults.timeout
                }
            },
            None => defaults.timeout,
        };

        Config {
            base_url: non_empty("AITODO_API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            api_key: non_empty("AITODO_API_KEY").or_else(|| non_empty("NEBIUS_API_KEY")),
            model: non_empty("AITODO_MODEL").unwrap_or(defaults.model),
            temperature: defaults.temperature,
            timeout,
            log_file: non_empty("AITODO_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.log_file),
        }
    }

    pub fn has_remote(&self) -> bool {
        self.api_key.is_some()
    }
}
