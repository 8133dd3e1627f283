use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

pub mod catalog;
pub mod config;
#[cfg(feature = "database")]
pub mod inspect;
#[cfg(feature = "database")]
pub mod migrate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Toml,
    Json,
}

impl OutputFormat {
    pub fn render<T: Serialize>(&self, value: &T) -> Result<String> {
        Ok(match self {
            OutputFormat::Toml => toml::to_string_pretty(value)?,
            OutputFormat::Json => serde_json::to_string_pretty(value)?,
        })
    }
}

#[cfg(feature = "database")]
pub async fn with_database<F, Fut, R>(
    config: &landflow::LandflowConfig,
    f: F,
) -> Result<R>
where
    F: FnOnce(landflow::DatabaseManager) -> Fut,
    Fut: std::future::Future<Output = Result<R>>,
{
    let Some(database) = &config.database else {
        anyhow::bail!("no [database] section configured; set LANDFLOW__DATABASE__URL or add one to landflow.toml");
    };

    print!("🔄 Connecting to {}... ", database.url);
    std::io::Write::flush(&mut std::io::stdout())?;
    match landflow::DatabaseManager::connect(database).await {
        Ok(manager) => {
            println!("✅");
            f(manager).await
        }
        Err(e) => {
            println!("❌ Failed to open database: {e:#}");
            Err(e)
        }
    }
}
