use anyhow::Result;
use landflow::LandflowConfig;

use super::with_database;

pub struct MigrateCommand;

impl MigrateCommand {
    pub async fn execute(&self, config: &LandflowConfig) -> Result<()> {
        with_database(config, |manager| async move {
            manager.migrate().await?;
            manager.seed_catalog(&config.catalog).await?;
            println!("✅ Schema up to date, catalog seeded");
            manager.shutdown().await;
            Ok(())
        })
        .await
    }
}
