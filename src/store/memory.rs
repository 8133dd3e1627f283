// In-process store: one async mutex per land stands in for the row lock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::debug;

use super::{check_interest_uniqueness, LandStore, LandTransaction, StoreError};
use crate::domain::{
    EntityRef, InvestorInterest, LandAggregate, LandId, LandSection, Task, TaskStatus, UserId,
};
use crate::events::EventRecord;

/// `None` marks a land deleted while another caller waited on its lock
type Slot = Arc<Mutex<Option<LandAggregate>>>;

#[derive(Default)]
struct Shared {
    lands: RwLock<HashMap<LandId, Slot>>,
    index: RwLock<HashMap<EntityRef, LandId>>,
    events: RwLock<HashMap<LandId, Vec<EventRecord>>>,
}

impl Shared {
    async fn reindex(&self, previous: Option<&LandAggregate>, next: Option<&LandAggregate>) {
        let mut index = self.index.write().await;
        if let Some(previous) = previous {
            for entity in entities(previous) {
                index.remove(&entity);
            }
        }
        if let Some(next) = next {
            for entity in entities(next) {
                index.insert(entity, next.land.id);
            }
        }
    }

    async fn append_events(&self, land_id: LandId, records: Vec<EventRecord>) {
        self.events
            .write()
            .await
            .entry(land_id)
            .or_default()
            .extend(records);
    }
}

fn entities(aggregate: &LandAggregate) -> Vec<EntityRef> {
    std::iter::once(EntityRef::Land(aggregate.land.id))
        .chain(aggregate.sections.iter().map(|s| EntityRef::Section(s.id)))
        .chain(aggregate.tasks.iter().map(|t| EntityRef::Task(t.id)))
        .chain(aggregate.interests.iter().map(|i| EntityRef::Interest(i.id)))
        .collect()
}

#[derive(Clone, Default)]
pub struct MemoryLandStore {
    shared: Arc<Shared>,
}

impl MemoryLandStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, land_id: LandId) -> Option<Slot> {
        self.shared.lands.read().await.get(&land_id).cloned()
    }

    async fn committed(&self) -> Vec<LandAggregate> {
        let slots: Vec<Slot> = self.shared.lands.read().await.values().cloned().collect();
        let mut aggregates = Vec::with_capacity(slots.len());
        for slot in slots {
            if let Some(aggregate) = slot.lock().await.as_ref() {
                aggregates.push(aggregate.clone());
            }
        }
        aggregates
    }

    async fn tasks_where(
        &self,
        matches: impl Fn(&Task) -> bool,
        status: Option<TaskStatus>,
    ) -> Vec<Task> {
        self.committed()
            .await
            .into_iter()
            .flat_map(|aggregate| aggregate.tasks)
            .filter(|task| matches(task) && status.map_or(true, |status| task.status == status))
            .collect()
    }
}

#[async_trait]
impl LandStore for MemoryLandStore {
    async fn owning_land(&self, entity: EntityRef) -> Result<Option<LandId>, StoreError> {
        Ok(self.shared.index.read().await.get(&entity).copied())
    }

    async fn begin(
        &self,
        land_id: LandId,
    ) -> Result<Option<Box<dyn LandTransaction>>, StoreError> {
        let Some(slot) = self.slot(land_id).await else {
            return Ok(None);
        };

        let guard = slot.lock_owned().await;
        let Some(snapshot) = guard.as_ref().cloned() else {
            return Ok(None);
        };
        debug!(land_id = %land_id, "Acquired land lock");

        let transaction: Box<dyn LandTransaction> = Box::new(MemoryTransaction {
            guard,
            snapshot,
            shared: Arc::clone(&self.shared),
        });
        Ok(Some(transaction))
    }

    async fn insert(
        &self,
        aggregate: LandAggregate,
        events: Vec<EventRecord>,
    ) -> Result<(), StoreError> {
        let land_id = aggregate.land.id;
        {
            let mut lands = self.shared.lands.write().await;
            if lands.contains_key(&land_id) {
                return Err(StoreError::Conflict(format!("land {land_id} already exists")));
            }
            self.shared.reindex(None, Some(&aggregate)).await;
            lands.insert(land_id, Arc::new(Mutex::new(Some(aggregate))));
        }
        self.shared.append_events(land_id, events).await;
        Ok(())
    }

    async fn load(&self, land_id: LandId) -> Result<Option<LandAggregate>, StoreError> {
        match self.slot(land_id).await {
            Some(slot) => Ok(slot.lock().await.clone()),
            None => Ok(None),
        }
    }

    async fn sections_for_reviewer(
        &self,
        user: UserId,
        roles: &[String],
    ) -> Result<Vec<LandSection>, StoreError> {
        Ok(self
            .committed()
            .await
            .into_iter()
            .filter(|aggregate| aggregate.land.status.is_reviewable())
            .flat_map(|aggregate| aggregate.sections)
            .filter(|section| {
                section.assigned_user == Some(user)
                    || section
                        .assigned_role
                        .as_ref()
                        .is_some_and(|role| roles.contains(role))
            })
            .collect())
    }

    async fn interests_of_investor(
        &self,
        investor: UserId,
    ) -> Result<Vec<InvestorInterest>, StoreError> {
        let mut interests: Vec<InvestorInterest> = self
            .committed()
            .await
            .into_iter()
            .flat_map(|aggregate| aggregate.interests)
            .filter(|interest| interest.investor_id == investor)
            .collect();
        interests.sort_by_key(|interest| interest.created_at);
        Ok(interests)
    }

    async fn listed_lands(&self) -> Result<Vec<LandAggregate>, StoreError> {
        let mut lands: Vec<LandAggregate> = self
            .committed()
            .await
            .into_iter()
            .filter(|aggregate| aggregate.land.status.is_listed())
            .collect();
        lands.sort_by(|a, b| b.land.published_at.cmp(&a.land.published_at));
        Ok(lands)
    }

    async fn tasks_assigned_to(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, StoreError> {
        let mut tasks = self
            .tasks_where(|task| task.assigned_to == Some(user), status)
            .await;
        tasks.sort_by(|a, b| {
            a.end_date
                .cmp(&b.end_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(tasks)
    }

    async fn tasks_created_by(
        &self,
        user: UserId,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, StoreError> {
        let mut tasks = self.tasks_where(|task| task.created_by == user, status).await;
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn events(&self, land_id: LandId) -> Result<Vec<EventRecord>, StoreError> {
        Ok(self
            .shared
            .events
            .read()
            .await
            .get(&land_id)
            .cloned()
            .unwrap_or_default())
    }
}

struct MemoryTransaction {
    guard: OwnedMutexGuard<Option<LandAggregate>>,
    snapshot: LandAggregate,
    shared: Arc<Shared>,
}

#[async_trait]
impl LandTransaction for MemoryTransaction {
    fn snapshot(&self) -> &LandAggregate {
        &self.snapshot
    }

    async fn commit(
        mut self: Box<Self>,
        next: LandAggregate,
        events: Vec<EventRecord>,
    ) -> Result<(), StoreError> {
        if next.land.id != self.snapshot.land.id {
            return Err(StoreError::Corrupt(format!(
                "transaction for land {} cannot commit land {}",
                self.snapshot.land.id, next.land.id
            )));
        }
        check_interest_uniqueness(&next)?;

        let land_id = next.land.id;
        self.shared.reindex(Some(&self.snapshot), Some(&next)).await;
        *self.guard = Some(next);
        self.shared.append_events(land_id, events).await;
        Ok(())
    }

    async fn delete(mut self: Box<Self>, events: Vec<EventRecord>) -> Result<(), StoreError> {
        let land_id = self.snapshot.land.id;
        self.shared.reindex(Some(&self.snapshot), None).await;
        self.shared.lands.write().await.remove(&land_id);
        *self.guard = None;
        self.shared.append_events(land_id, events).await;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        debug!(land_id = %self.snapshot.land.id, "Rolled back land transaction");
        Ok(())
    }
}
