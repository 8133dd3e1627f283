// Landflow Library - renewable-energy land lifecycle workflows
// This exposes the engine, domain model and stores for embedding and testing

pub mod authority;
pub mod catalog;
pub mod config;
#[cfg(feature = "database")]
pub mod database;
pub mod domain;
pub mod engine;
pub mod error;
pub mod events;
pub mod store;
pub mod telemetry;
pub mod workflows;

// Re-export key types for easy access
pub use authority::{Action, RoleAuthority, Subject};
pub use catalog::{Catalog, RoleDefinition, SectionDefinition};
pub use config::{config, init_config, LandflowConfig, WorkflowPolicy};
#[cfg(feature = "database")]
pub use database::DatabaseManager;
pub use engine::{Command, Outcome, Receipt, WorkflowEngine};
pub use error::{Blocker, ErrorKind, WorkflowError};
pub use events::{EventRecord, EventSink, TracingEventSink, WorkflowEvent};
pub use store::{LandStore, LandTransaction, MemoryLandStore, StoreError};
#[cfg(feature = "database")]
pub use store::SqliteLandStore;
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
