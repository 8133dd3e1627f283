use anyhow::{Context, Result};
use landflow::domain::{LandAggregate, LandId};
use landflow::{LandStore, LandflowConfig, SqliteLandStore};

use super::with_database;

pub struct InspectCommand {
    pub land_id: String,
    pub events: bool,
}

impl InspectCommand {
    pub fn new(land_id: String, events: bool) -> Self {
        Self { land_id, events }
    }

    pub async fn execute(&self, config: &LandflowConfig) -> Result<()> {
        let land_id: LandId = self
            .land_id
            .parse()
            .with_context(|| format!("'{}' is not a land id", self.land_id))?;

        with_database(config, |manager| async move {
            let store = SqliteLandStore::new(manager.pool().clone());
            let Some(aggregate) = store.load(land_id).await? else {
                println!("📭 Land {land_id} not found");
                return Ok(());
            };
            print_aggregate(&aggregate);

            if self.events {
                println!();
                println!("📜 EVENTS:");
                for record in store.events(land_id).await? {
                    println!(
                        "   {} {} by {} [{}]",
                        record.at.to_rfc3339(),
                        record.event.name(),
                        record.actor,
                        record.correlation_id
                    );
                }
            }
            manager.shutdown().await;
            Ok(())
        })
        .await
    }
}

fn print_aggregate(aggregate: &LandAggregate) {
    let land = &aggregate.land;
    println!("🌍 {} ({})", land.title, land.id);
    println!("   Status: {}   Visibility: {}", land.status, land.visibility);
    println!("   Owner: {}", land.landowner_id);
    if let Some(published_at) = land.published_at {
        println!("   Published: {}", published_at.to_rfc3339());
    }
    let missing = land.missing_publish_fields();
    if !missing.is_empty() {
        let fields: Vec<String> = missing.iter().map(ToString::to_string).collect();
        println!("   Listing gaps: {}", fields.join(", "));
    }

    println!();
    println!("📋 SECTIONS:");
    for section in &aggregate.sections {
        println!(
            "   {:<20} {:<10} role={}",
            section.section_key,
            section.status,
            section.assigned_role.as_deref().unwrap_or("-")
        );
    }

    println!();
    println!("🛠️  TASKS: {}", aggregate.tasks.len());
    for task in &aggregate.tasks {
        println!(
            "   {} {:<12} {:<8} {} history rows",
            task.id,
            task.status,
            task.priority.as_str(),
            task.history.len()
        );
    }

    println!();
    println!("💰 INTERESTS: {}", aggregate.interests.len());
    for interest in &aggregate.interests {
        println!(
            "   {} investor={} {}",
            interest.id, interest.investor_id, interest.status
        );
    }
}
