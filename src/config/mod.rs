use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub server: ServerConfig,
    pub talent: TalentConfig,
    pub llm: LlmConfig,
    pub search: SearchConfig,
}

impl ApiConfig {
    pub fn load() -> Result<Self> {
        let configured_path = std::env::var("FINDABUILDER_API_CONFIG")
            .unwrap_or_else(|_| "config/api.toml".to_string());
        assert!(
            !configured_path.is_empty(),
            "Configuration path must be non-empty"
        );
        assert!(
            configured_path.len() < 4096,
            "Configuration path length exceeds hard limit"
        );

        let mut builder = Config::builder()
            .add_source(File::new(&configured_path, FileFormat::Toml).required(true));

        if let Ok(env_override) = std::env::var("FINDABUILDER_API_ENV") {
            if !env_override.is_empty() {
                let env_file = format!("config/api.{}.toml", env_override);
                if Path::new(&env_file).exists() {
                    builder = builder.add_source(File::new(&env_file, FileFormat::Toml));
                }
            }
        }

        let settings = builder
            .build()
            .map_err(|err| map_config_error(err, &configured_path))?;
        let config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize API configuration")?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        assert!(
            self.server.port > 0,
            "Server port must be greater than zero"
        );
        assert!(
            !self.talent.base_url.is_empty(),
            "Identity source URL must be specified"
        );
        assert!(
            !self.talent.api_key.is_empty(),
            "Identity source API key must be specified"
        );
        assert!(
            !self.llm.endpoint.is_empty(),
            "LLM endpoint must be specified"
        );
        assert!(!self.llm.api_key.is_empty(), "LLM API key must be specified");
        self.talent.ensure_bounds()?;
        self.search.ensure_bounds()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: Option<IpAddr>,
    pub port: u16,
}

impl ServerConfig {
    pub fn address(&self) -> SocketAddr {
        let host = self.host.unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(self.port != 0, "HTTP port cannot be zero");
        assert!(self.port < 65535, "HTTP port must be below 65535");
        SocketAddr::new(host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TalentConfig {
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "TalentConfig::default_page_size")]
    pub page_size: u32,
    pub request_timeout_ms: Option<u64>,
}

impl TalentConfig {
    pub fn request_timeout(&self) -> Duration {
        let millis = self.request_timeout_ms.unwrap_or(10_000);
        assert!(
            millis >= 100,
            "Identity source timeout must be at least 100ms"
        );
        assert!(
            millis <= 60_000,
            "Identity source timeout cannot exceed 60 seconds"
        );
        Duration::from_millis(millis)
    }

    pub fn ensure_bounds(&self) -> Result<()> {
        assert!(self.page_size > 0, "Page size must be positive");
        assert!(self.page_size <= 100, "Page size exceeds defensive limit");
        Ok(())
    }

    const fn default_page_size() -> u32 {
        25
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub endpoint: String,
    pub api_key: String,
    #[serde(default = "LlmConfig::default_model")]
    pub model: String,
    #[serde(default = "LlmConfig::default_temperature")]
    pub temperature: f64,
    pub request_timeout_ms: Option<u64>,
}

impl LlmConfig {
    pub fn request_timeout(&self) -> Duration {
        let millis = self.request_timeout_ms.unwrap_or(15_000);
        assert!(millis >= 100, "LLM timeout must be at least 100ms");
        assert!(millis <= 60_000, "LLM timeout cannot exceed 60 seconds");
        Duration::from_millis(millis)
    }

    fn default_model() -> String {
        "llama3.1:70b".to_string()
    }

    const fn default_temperature() -> f64 {
        0.1
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "SearchConfig::default_limit")]
    pub default_limit: usize,
    #[serde(default = "SearchConfig::default_max_limit")]
    pub max_limit: usize,
    #[serde(default = "SearchConfig::default_budget_ms")]
    pub budget_ms: u64,
    #[serde(default)]
    pub enrich_credentials: bool,
    #[serde(default = "SearchConfig::default_enrich_top_n")]
    pub enrich_top_n: usize,
}

impl SearchConfig {
    pub fn budget(&self) -> Duration {
        assert!(self.budget_ms >= 1_000, "Search budget must be at least 1s");
        assert!(
            self.budget_ms <= 300_000,
            "Search budget cannot exceed 5 minutes"
        );
        Duration::from_millis(self.budget_ms)
    }

    pub fn ensure_bounds(&self) -> Result<()> {
        assert!(self.default_limit > 0, "Default limit must be positive");
        assert!(
            self.default_limit <= self.max_limit,
            "Default limit must not exceed max limit"
        );
        assert!(self.max_limit <= 1_000, "Max limit exceeds defensive bound");
        assert!(self.enrich_top_n > 0, "Enrichment top-N must be positive");
        assert!(
            self.enrich_top_n <= 10,
            "Enrichment top-N exceeds fan-out bound"
        );
        Ok(())
    }

    const fn default_limit() -> usize {
        10
    }

    const fn default_max_limit() -> usize {
        100
    }

    const fn default_budget_ms() -> u64 {
        60_000
    }

    const fn default_enrich_top_n() -> usize {
        3
    }
}

fn map_config_error(err: ConfigError, path: &str) -> ConfigError {
    match err {
        ConfigError::NotFound(_) => ConfigError::NotFound(path.to_string()),
        other => other,
    }
}
