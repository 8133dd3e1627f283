use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::catalog::Catalog;
use crate::config::DatabaseConfig;

/// Database manager for the SQLite land store
pub struct DatabaseManager {
    pool: SqlitePool,
}

impl DatabaseManager {
    /// Open (and create if missing) the database, optionally running migrations
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.url)
            .with_context(|| format!("invalid database url '{}'", config.url))?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_millis(config.busy_timeout_ms));

        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory {}", parent.display())
                })?;
            }
        }

        info!(url = %config.url, "Connecting to database");
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let manager = Self { pool };
        if config.auto_migrate {
            manager.migrate().await?;
        }
        Ok(manager)
    }

    pub async fn migrate(&self) -> Result<()> {
        info!("Running database migrations...");
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations completed");
        Ok(())
    }

    /// Upsert the catalog into the lookup tables
    pub async fn seed_catalog(&self, catalog: &Catalog) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for role in &catalog.roles {
            sqlx::query(
                r#"
                INSERT INTO lu_roles (role_key, label) VALUES (?1, ?2)
                ON CONFLICT (role_key) DO UPDATE SET label = excluded.label
                "#,
            )
            .bind(&role.key)
            .bind(&role.label)
            .execute(&mut *tx)
            .await?;
        }

        for energy in &catalog.energy_types {
            sqlx::query("INSERT OR IGNORE INTO lu_energy_type (energy_key) VALUES (?1)")
                .bind(energy)
                .execute(&mut *tx)
                .await?;
        }

        for section in &catalog.sections {
            sqlx::query(
                r#"
                INSERT INTO section_definitions (section_key, label, default_role, active)
                VALUES (?1, ?2, ?3, ?4)
                ON CONFLICT (section_key) DO UPDATE SET
                    label = excluded.label,
                    default_role = excluded.default_role,
                    active = excluded.active
                "#,
            )
            .bind(&section.key)
            .bind(&section.label)
            .bind(&section.default_role)
            .bind(section.active)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        info!(
            roles = catalog.roles.len(),
            sections = catalog.sections.len(),
            "Catalog seeded"
        );
        Ok(())
    }

    /// Get database pool for queries
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close database connections gracefully
    pub async fn shutdown(&self) {
        info!("Shutting down database connections...");
        self.pool.close().await;
        info!("Database connections closed");
    }
}
