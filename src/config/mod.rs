//! Application configuration

mod app_config;

pub use app_config::{
    AppConfig, AuthConfig, DatabaseConfig, GateConfig, GenerationConfig, LogFormat,
    LoggingConfig, QuotaConfig, ServerConfig,
};
