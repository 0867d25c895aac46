use serde::Deserialize;

use crate::domain::BlankExtraRowPolicy;
use crate::infrastructure::observability::MetricsConfig;
use crate::infrastructure::storage::{PostgresConfig, StorageConfig, StorageType};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub workflow: WorkflowSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Record store backend
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// `memory` or `postgres`
    #[serde(default = "default_backend")]
    pub backend: String,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Insert a demo author with two books when the store starts empty
    #[serde(default)]
    pub seed_demo: bool,
}

/// Settings shared by the create and update workflows
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowSettings {
    #[serde(default = "default_extra")]
    pub extra: usize,
    #[serde(default)]
    pub success_url_template: Option<String>,
    #[serde(default)]
    pub form_prefix: Option<String>,
    #[serde(default)]
    pub blank_extra_rows: BlankExtraRowPolicy,
}

fn default_backend() -> String {
    "memory".to_string()
}

fn default_max_connections() -> u32 {
    10
}

fn default_extra() -> usize {
    1
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

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            database_url: None,
            max_connections: default_max_connections(),
            seed_demo: false,
        }
    }
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            extra: default_extra(),
            success_url_template: None,
            form_prefix: None,
            blank_extra_rows: BlankExtraRowPolicy::default(),
        }
    }
}

impl StorageSettings {
    /// Resolve the backend; postgres requires a database URL
    pub fn storage_config(&self) -> anyhow::Result<StorageConfig> {
        match self.backend.parse::<StorageType>()? {
            StorageType::InMemory => Ok(StorageConfig::in_memory()),
            StorageType::Postgres => {
                let url = self
                    .database_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("storage.database_url is required for postgres"))?;
                Ok(StorageConfig::Postgres(
                    PostgresConfig::new(url).with_max_connections(self.max_connections),
                ))
            }
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

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.storage.backend, "memory");
        assert_eq!(config.workflow.extra, 1);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_deserialize_partial_sections() {
        let config: AppConfig = serde_json::from_value(serde_json::json!({
            "server": { "host": "127.0.0.1", "port": 3000 },
            "workflow": { "extra": 3, "blank_extra_rows": "validate" },
        }))
        .unwrap();

        assert_eq!(config.server.port, 3000);
        assert_eq!(config.workflow.extra, 3);
        assert_eq!(config.workflow.blank_extra_rows, BlankExtraRowPolicy::Validate);
        assert_eq!(config.storage.max_connections, 10);
    }

    #[test]
    fn test_storage_config_resolution() {
        let memory = StorageSettings::default().storage_config().unwrap();
        assert_eq!(memory.storage_type(), StorageType::InMemory);

        let missing_url = StorageSettings {
            backend: "postgres".to_string(),
            ..Default::default()
        };
        assert!(missing_url.storage_config().is_err());

        let postgres = StorageSettings {
            backend: "postgres".to_string(),
            database_url: Some("postgres://localhost/library".to_string()),
            ..Default::default()
        };
        assert_eq!(postgres.storage_config().unwrap().storage_type(), StorageType::Postgres);

        let unknown = StorageSettings {
            backend: "sqlite".to_string(),
            ..Default::default()
        };
        assert!(unknown.storage_config().is_err());
    }
}
