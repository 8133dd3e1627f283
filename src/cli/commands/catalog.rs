use anyhow::Result;
use landflow::Catalog;

use super::OutputFormat;

pub struct CatalogCommand {
    pub format: OutputFormat,
}

impl CatalogCommand {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn execute(&self, catalog: &Catalog) -> Result<()> {
        print!("{}", self.format.render(catalog)?);
        if self.format == OutputFormat::Json {
            println!();
        }
        Ok(())
    }
}
