//! Application configuration

mod app_config;

pub use app_config::{
    AdminConfig, AppConfig, CorsConfig, DatabaseConfig, HashingConfig, LogFormat, LoggingConfig,
    MetricsConfig, ServerConfig, StorageBackend, StorageConfig,
};
