// Persistence collaborator for the workflow engine.
//
// A `LandTransaction` holds the exclusive lock on one land aggregate from
// `begin` until `commit`/`delete`/`rollback`; dropping it releases the lock
// without writing anything.

pub mod memory;
#[cfg(feature = "database")]
pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{
    EntityRef, InvestorInterest, LandAggregate, LandId, LandSection, Task, TaskStatus, UserId,
};
use crate::events::EventRecord;

pub use memory::MemoryLandStore;
#[cfg(feature = "database")]
pub use sqlite::SqliteLandStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Conflict(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[cfg(feature = "database")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait LandStore: Send + Sync {
    /// Land that owns `entity`, if the entity exists
    async fn owning_land(&self, entity: EntityRef) -> Result<Option<LandId>, StoreError>;

    /// Lock and load a land aggregate; `None` when the land does not exist
    async fn begin(&self, land_id: LandId)
        -> Result<Option<Box<dyn LandTransaction>>, StoreError>;

    /// Persist a newly created aggregate
    async fn insert(
        &self,
        aggregate: LandAggregate,
        events: Vec<EventRecord>,
    ) -> Result<(), StoreError>;

    /// Unlocked read of the latest committed aggregate
    async fn load(&self, land_id: LandId) -> Result<Option<LandAggregate>, StoreError>;

    /// Sections routed to `user` directly or to any of `roles`
    async fn sections_for_reviewer(
        &self,
        user: UserId,
        roles: &[String],
    ) -> Result<Vec<LandSection>, StoreError>;

    async fn interests_of_investor(
        &self,
        investor: UserId,
    ) -> Result<Vec<InvestorInterest>, StoreError>;

    /// Marketplace lands (published, interest locked, ready to build), newest listing first
    async fn listed_lands(&self) -> Result<Vec<LandAggregate>, StoreError>;

    /// Tasks assigned to `user`, earliest due date first
    async fn tasks_assigned_to(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, StoreError>;

    /// Tasks `user` created, newest first
    async fn tasks_created_by(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, StoreError>;

    /// Committed events for a land in commit order
    async fn events(&self, land_id: LandId) -> Result<Vec<EventRecord>, StoreError>;
}

#[async_trait]
pub trait LandTransaction: Send {
    /// State as loaded under the lock
    fn snapshot(&self) -> &LandAggregate;

    async fn commit(
        self: Box<Self>,
        next: LandAggregate,
        events: Vec<EventRecord>,
    ) -> Result<(), StoreError>;

    /// Remove the land and everything it owns
    async fn delete(self: Box<Self>, events: Vec<EventRecord>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

/// Uniqueness backstop shared by the stores: one active interest per investor per land
pub(crate) fn check_interest_uniqueness(aggregate: &LandAggregate) -> Result<(), StoreError> {
    let mut active = std::collections::HashSet::new();
    for interest in aggregate
        .interests
        .iter()
        .filter(|interest| interest.status.is_active())
    {
        if !active.insert(interest.investor_id) {
            return Err(StoreError::Conflict(format!(
                "investor {} already has an active interest in land {}",
                interest.investor_id, aggregate.land.id
            )));
        }
    }
    Ok(())
}
