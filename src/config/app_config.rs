use serde::Deserialize;

use crate::domain::resilience::DEFAULT_GATE_CAPACITY;
use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub quota: QuotaConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Process-wide bound on in-flight generation calls
#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    pub capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Falls back to `ANTHROPIC_API_KEY`
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_generation_base_url")]
    pub base_url: String,
    /// Replaces every tier's model when set
    #[serde(default)]
    pub model_override: Option<String>,
    #[serde(default = "default_http_timeout_ms")]
    pub http_timeout_ms: u64,
}

/// PostgreSQL settings; in-memory stores are used when `url` is empty
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    /// Falls back to `JWT_SECRET`
    #[serde(default)]
    pub jwt_secret: String,
}

/// Reference zone for monthly periods
#[derive(Debug, Clone, Deserialize, Default)]
pub struct QuotaConfig {
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_generation_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_http_timeout_ms() -> u64 {
    60_000
}

fn default_max_connections() -> u32 {
    10
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_GATE_CAPACITY,
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_generation_base_url(),
            model_override: None,
            http_timeout_ms: default_http_timeout_ms(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        Ok(config.with_env_fallbacks(|key| std::env::var(key).ok()))
    }

    /// Fill unset secrets and URLs from the conventional variables
    pub fn with_env_fallbacks(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        fill_from(&mut self.generation.api_key, lookup("ANTHROPIC_API_KEY"));
        fill_from(&mut self.database.url, lookup("DATABASE_URL"));
        fill_from(&mut self.auth.jwt_secret, lookup("JWT_SECRET"));

        if self.generation.model_override.is_none() {
            self.generation.model_override = lookup("ANTHROPIC_MODEL").filter(|m| !m.is_empty());
        }

        self
    }
}

fn fill_from(target: &mut String, value: Option<String>) {
    if target.is_empty() {
        if let Some(value) = value {
            *target = value;
        }
    }
}
