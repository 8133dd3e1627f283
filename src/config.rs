use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::catalog::Catalog;
use crate::domain::Visibility;

/// Main configuration structure for landflow
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LandflowConfig {
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Database settings (optional; the in-memory store is used without it)
    pub database: Option<DatabaseConfig>,
    /// Deployment switches for the workflow rules
    pub workflow: WorkflowPolicy,
    /// Reference data seeded into every store
    pub catalog: Catalog,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Default filter directive when RUST_LOG is unset
    pub log_level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path or connection string
    pub url: String,
    /// Maximum connections in pool
    pub max_connections: u32,
    /// Run pending migrations on startup
    pub auto_migrate: bool,
    /// How long a writer waits for the land lock before failing
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: ".landflow/landflow.db".to_string(),
            max_connections: 10,
            auto_migrate: true,
            busy_timeout_ms: 5_000,
        }
    }
}

/// Rules that differ between deployments
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct WorkflowPolicy {
    /// Accept investor interest on ready-to-build lands as well as published ones
    pub interest_on_ready_to_build: bool,
    /// Refuse submission while any section has no data
    pub require_section_content: bool,
    /// Visibility of new lands when the landowner does not pick one
    pub default_visibility: Visibility,
}

impl Default for WorkflowPolicy {
    fn default() -> Self {
        Self {
            interest_on_ready_to_build: false,
            require_section_content: false,
            default_visibility: Visibility::Public,
        }
    }
}

impl LandflowConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (landflow.toml, .landflow-rc)
    /// 3. Environment variables (prefixed with LANDFLOW__)
    pub fn load() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if Path::new("landflow.toml").exists() {
            builder = builder.add_source(File::with_name("landflow"));
        }

        if Path::new(".landflow-rc").exists() {
            builder = builder.add_source(
                File::with_name(".landflow-rc").format(config::FileFormat::Toml),
            );
        }

        builder = builder.add_source(
            Environment::with_prefix("LANDFLOW")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let landflow_config: LandflowConfig = builder.build()?.try_deserialize()?;
        landflow_config.validate()?;
        Ok(landflow_config)
    }

    /// Load a single TOML file on top of the defaults, ignoring the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let landflow_config: LandflowConfig = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(path.as_ref()).format(config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        landflow_config.validate()?;
        Ok(landflow_config)
    }

    pub fn validate(&self) -> Result<()> {
        self.catalog.validate()?;
        if let Some(database) = &self.database {
            if database.max_connections == 0 {
                anyhow::bail!("database.max_connections must be at least 1");
            }
        }
        Ok(())
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<LandflowConfig, anyhow::Error>> =
    std::sync::LazyLock::new(|| {
        let _ = LandflowConfig::load_env_file();
        LandflowConfig::load()
    });

/// Get the global configuration
pub fn config() -> Result<&'static LandflowConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

/// Initialize configuration (called at startup)
pub fn init_config() -> Result<()> {
    let config = config()?;
    tracing::info!(
        sections = config.catalog.active_sections().count(),
        database = config.database.is_some(),
        "Configuration loaded successfully"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = LandflowConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.database.is_none());
        assert_eq!(config.workflow, WorkflowPolicy::default());
    }

    #[test]
    fn test_file_overrides_policy_and_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("landflow.toml");
        std::fs::write(
            &path,
            r#"
[workflow]
interest_on_ready_to_build = true
require_section_content = false
default_visibility = "investors_only"

[database]
url = "sqlite::memory:"
max_connections = 2
auto_migrate = true
busy_timeout_ms = 250
"#,
        )
        .unwrap();

        let config = LandflowConfig::load_from(&path).unwrap();
        assert!(config.workflow.interest_on_ready_to_build);
        assert_eq!(config.workflow.default_visibility, Visibility::InvestorsOnly);
        assert_eq!(config.database.unwrap().busy_timeout_ms, 250);
        assert_eq!(config.catalog, Catalog::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = LandflowConfig::default();
        config.workflow.require_section_content = true;
        config.database = Some(DatabaseConfig::default());

        config.save_to_file(&path).unwrap();
        let reloaded = LandflowConfig::load_from(&path).unwrap();
        assert!(reloaded.workflow.require_section_content);
        assert_eq!(reloaded.catalog, config.catalog);
        assert_eq!(
            reloaded.database.map(|d| d.url),
            Some(DatabaseConfig::default().url)
        );
    }

    #[test]
    fn test_invalid_catalog_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        let mut config = LandflowConfig::default();
        config.catalog.sections[0].default_role = Some("astrologer".to_string());
        config.save_to_file(&path).unwrap();

        assert!(LandflowConfig::load_from(&path).is_err());
    }
}
