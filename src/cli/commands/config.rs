use anyhow::Result;
use landflow::LandflowConfig;
use std::path::PathBuf;

pub struct ConfigCommand {
    pub write: Option<PathBuf>,
}

impl ConfigCommand {
    pub fn new(write: Option<PathBuf>) -> Self {
        Self { write }
    }

    pub fn execute(&self, config: &LandflowConfig) -> Result<()> {
        match &self.write {
            Some(path) => {
                config.save_to_file(path)?;
                println!("✅ Configuration written to {}", path.display());
            }
            None => print!("{}", toml::to_string_pretty(config)?),
        }
        Ok(())
    }
}
