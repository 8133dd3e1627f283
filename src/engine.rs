// Workflow engine facade.
//
// Every command runs as one store transaction: resolve the owning land, lock
// it, apply the decision function to a working copy, then commit the copy
// with its events or roll back. Events reach the sink only after commit.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};

use crate::authority::{Action, RoleAuthority, Subject};
use crate::catalog::Catalog;
use crate::config::{LandflowConfig, WorkflowPolicy};
use crate::domain::{
    CommercialTerms, EntityRef, Identity, InterestDecision, InterestId, InterestRequest,
    InvestorInterest, Land, LandAggregate, LandFields, LandId, LandPatch, LandSection, NewTask,
    SectionAssignment, SectionContent, SectionDecision, SectionId, Task, TaskHistory, TaskId,
    TaskPatch, TaskStatus, Visibility,
};
use crate::error::WorkflowError;
use crate::events::{EventLog, EventRecord, EventSink, TracingEventSink};
use crate::store::LandStore;
use crate::telemetry::{create_workflow_span, generate_correlation_id};
use crate::workflows::{interest, land, section, task, WorkflowContext};

/// Every state-changing operation the engine accepts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    CreateLand {
        fields: LandFields,
    },
    UpdateLandDetails {
        land_id: LandId,
        patch: LandPatch,
    },
    DeleteLand {
        land_id: LandId,
    },
    SubmitLand {
        land_id: LandId,
    },
    DefineCommercialTerms {
        land_id: LandId,
        terms: CommercialTerms,
    },
    PublishLand {
        land_id: LandId,
    },
    LockInterest {
        land_id: LandId,
    },
    MarkReadyToBuild {
        land_id: LandId,
    },
    RejectLand {
        land_id: LandId,
        reason: Option<String>,
    },
    SetVisibility {
        land_id: LandId,
        visibility: Visibility,
    },
    UpdateSectionContent {
        section_id: SectionId,
        content: SectionContent,
    },
    AssignSection {
        section_id: SectionId,
        assignment: SectionAssignment,
    },
    DecideSection {
        section_id: SectionId,
        decision: SectionDecision,
        comments: Option<String>,
    },
    CreateTask {
        land_id: LandId,
        task: NewTask,
    },
    UpdateTaskStatus {
        task_id: TaskId,
        status: TaskStatus,
        note: Option<String>,
    },
    UpdateTaskFields {
        task_id: TaskId,
        patch: TaskPatch,
    },
    DeleteTask {
        task_id: TaskId,
    },
    ExpressInterest {
        land_id: LandId,
        request: InterestRequest,
    },
    DecideInterest {
        interest_id: InterestId,
        decision: InterestDecision,
    },
    WithdrawInterest {
        interest_id: InterestId,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateLand { .. } => "create_land",
            Command::UpdateLandDetails { .. } => "update_land_details",
            Command::DeleteLand { .. } => "delete_land",
            Command::SubmitLand { .. } => "submit_land",
            Command::DefineCommercialTerms { .. } => "define_commercial_terms",
            Command::PublishLand { .. } => "publish_land",
            Command::LockInterest { .. } => "lock_interest",
            Command::MarkReadyToBuild { .. } => "mark_ready_to_build",
            Command::RejectLand { .. } => "reject_land",
            Command::SetVisibility { .. } => "set_visibility",
            Command::UpdateSectionContent { .. } => "update_section_content",
            Command::AssignSection { .. } => "assign_section",
            Command::DecideSection { .. } => "decide_section",
            Command::CreateTask { .. } => "create_task",
            Command::UpdateTaskStatus { .. } => "update_task_status",
            Command::UpdateTaskFields { .. } => "update_task_fields",
            Command::DeleteTask { .. } => "delete_task",
            Command::ExpressInterest { .. } => "express_interest",
            Command::DecideInterest { .. } => "decide_interest",
            Command::WithdrawInterest { .. } => "withdraw_interest",
        }
    }

    /// Entity the command acts on; `None` only for land creation
    pub fn target(&self) -> Option<EntityRef> {
        match self {
            Command::CreateLand { .. } => None,
            Command::UpdateLandDetails { land_id, .. }
            | Command::DeleteLand { land_id }
            | Command::SubmitLand { land_id }
            | Command::DefineCommercialTerms { land_id, .. }
            | Command::PublishLand { land_id }
            | Command::LockInterest { land_id }
            | Command::MarkReadyToBuild { land_id }
            | Command::RejectLand { land_id, .. }
            | Command::SetVisibility { land_id, .. }
            | Command::CreateTask { land_id, .. }
            | Command::ExpressInterest { land_id, .. } => Some(EntityRef::Land(*land_id)),
            Command::UpdateSectionContent { section_id, .. }
            | Command::AssignSection { section_id, .. }
            | Command::DecideSection { section_id, .. } => Some(EntityRef::Section(*section_id)),
            Command::UpdateTaskStatus { task_id, .. }
            | Command::UpdateTaskFields { task_id, .. }
            | Command::DeleteTask { task_id } => Some(EntityRef::Task(*task_id)),
            Command::DecideInterest { interest_id, .. }
            | Command::WithdrawInterest { interest_id } => {
                Some(EntityRef::Interest(*interest_id))
            }
        }
    }

    /// Payload shape checks; run before any entity is loaded
    pub fn validate(&self, catalog: &Catalog) -> Result<(), WorkflowError> {
        match self {
            Command::CreateLand { fields } => fields.validate(catalog),
            Command::UpdateLandDetails { patch, .. } => {
                if patch.is_empty() {
                    return Err(WorkflowError::validation("land", "update changes no fields"));
                }
                patch.validate(catalog)
            }
            Command::DefineCommercialTerms { terms, .. } => terms.validate(),
            Command::UpdateSectionContent { content, .. } => content.validate(),
            Command::AssignSection { assignment, .. } => assignment.validate(catalog),
            Command::CreateTask { task, .. } => task.validate(catalog),
            Command::UpdateTaskFields { patch, .. } => patch.validate(catalog),
            Command::ExpressInterest { request, .. } => request.validate(),
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "entity", rename_all = "snake_case")]
pub enum Outcome {
    Created(EntityRef),
    Updated(EntityRef),
    Deleted(EntityRef),
}

/// What a successful command did, with the events it committed
#[derive(Debug, Clone, Serialize)]
pub struct Receipt {
    pub outcome: Outcome,
    pub correlation_id: String,
    pub events: Vec<EventRecord>,
}

pub struct WorkflowEngine {
    store: Arc<dyn LandStore>,
    catalog: Catalog,
    policy: WorkflowPolicy,
    sink: Option<Arc<dyn EventSink>>,
}

impl WorkflowEngine {
    /// Refuses a catalog that could leave lands stuck in review
    pub fn new(
        store: Arc<dyn LandStore>,
        catalog: Catalog,
        policy: WorkflowPolicy,
    ) -> Result<Self, WorkflowError> {
        catalog
            .validate()
            .map_err(|e| WorkflowError::validation("catalog", e.to_string()))?;
        Ok(Self {
            store,
            catalog,
            policy,
            sink: None,
        })
    }

    /// Engine for a deployment; committed events go to the structured log
    pub fn from_config(
        store: Arc<dyn LandStore>,
        config: &LandflowConfig,
    ) -> Result<Self, WorkflowError> {
        Ok(Self::new(store, config.catalog.clone(), config.workflow.clone())?
            .with_event_sink(Arc::new(TracingEventSink)))
    }

    /// Hand committed events to `sink` (notifications, webhooks)
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> &WorkflowPolicy {
        &self.policy
    }

    /// Run one command inside its own transaction
    pub async fn submit(
        &self,
        actor: &Identity,
        command: Command,
    ) -> Result<Receipt, WorkflowError> {
        let correlation_id = generate_correlation_id();
        let name = command.name();
        let target = command.target().map(|entity| entity.to_string());
        let span = create_workflow_span(
            name,
            &actor.user_id.to_string(),
            target.as_deref(),
            &correlation_id,
        );

        let result = self
            .execute(actor, command, &correlation_id)
            .instrument(span.clone())
            .await;

        let _entered = span.enter();
        match &result {
            Ok(receipt) => info!(
                command = name,
                events = receipt.events.len(),
                "Command committed"
            ),
            Err(err) => warn!(
                command = name,
                kind = ?err.kind(),
                error = %err,
                "Command rejected"
            ),
        }
        result
    }

    async fn execute(
        &self,
        actor: &Identity,
        command: Command,
        correlation_id: &str,
    ) -> Result<Receipt, WorkflowError> {
        command.validate(&self.catalog)?;

        let ctx = WorkflowContext {
            actor,
            catalog: &self.catalog,
            policy: &self.policy,
            correlation_id,
            now: Utc::now(),
        };

        let command = match command {
            Command::CreateLand { fields } => return self.insert_land(&ctx, fields).await,
            other => other,
        };
        let target = command.target().ok_or_else(|| WorkflowError::Internal {
            reason: format!("{} has no target entity", command.name()),
        })?;

        let land_id = self
            .store
            .owning_land(target)
            .await?
            .ok_or_else(|| WorkflowError::not_found(target))?;
        let Some(transaction) = self.store.begin(land_id).await? else {
            return Err(WorkflowError::not_found(target));
        };
        // The entity may have moved or vanished between lookup and lock
        if !transaction.snapshot().contains(target) {
            transaction.rollback().await?;
            return Err(WorkflowError::not_found(target));
        }

        let mut working = transaction.snapshot().clone();
        let mut events = EventLog::new(land_id, actor.user_id, correlation_id, ctx.now);
        let outcome = match apply(&ctx, &mut working, command, &mut events) {
            Ok(outcome) => outcome,
            Err(err) => {
                if let Err(rollback_err) = transaction.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                return Err(err);
            }
        };

        let records = events.into_records();
        match outcome {
            Outcome::Deleted(EntityRef::Land(_)) => transaction.delete(records.clone()).await?,
            _ => transaction.commit(working, records.clone()).await?,
        }
        debug!(land_id = %land_id, events = records.len(), "Land transaction committed");

        self.dispatch(&records).await;
        Ok(Receipt {
            outcome,
            correlation_id: correlation_id.to_string(),
            events: records,
        })
    }

    async fn insert_land(
        &self,
        ctx: &WorkflowContext<'_>,
        fields: LandFields,
    ) -> Result<Receipt, WorkflowError> {
        let (aggregate, events) = land::create(ctx, fields)?;
        let land_id = aggregate.land.id;
        let records = events.into_records();
        self.store.insert(aggregate, records.clone()).await?;
        self.dispatch(&records).await;
        Ok(Receipt {
            outcome: Outcome::Created(EntityRef::Land(land_id)),
            correlation_id: ctx.correlation_id.to_string(),
            events: records,
        })
    }

    async fn dispatch(&self, records: &[EventRecord]) {
        if let Some(sink) = &self.sink {
            for record in records {
                sink.publish(record).await;
            }
        }
    }

    pub async fn create_land(
        &self,
        actor: &Identity,
        fields: LandFields,
    ) -> Result<LandId, WorkflowError> {
        match self.submit(actor, Command::CreateLand { fields }).await?.outcome {
            Outcome::Created(EntityRef::Land(id)) => Ok(id),
            other => Err(unexpected(other)),
        }
    }

    pub async fn update_land_details(
        &self,
        actor: &Identity,
        land_id: LandId,
        patch: LandPatch,
    ) -> Result<(), WorkflowError> {
        self.run(actor, Command::UpdateLandDetails { land_id, patch })
            .await
    }

    pub async fn delete_land(&self, actor: &Identity, land_id: LandId) -> Result<(), WorkflowError> {
        self.run(actor, Command::DeleteLand { land_id }).await
    }

    pub async fn submit_land(&self, actor: &Identity, land_id: LandId) -> Result<(), WorkflowError> {
        self.run(actor, Command::SubmitLand { land_id }).await
    }

    pub async fn define_commercial_terms(
        &self,
        actor: &Identity,
        land_id: LandId,
        terms: CommercialTerms,
    ) -> Result<(), WorkflowError> {
        self.run(actor, Command::DefineCommercialTerms { land_id, terms })
            .await
    }

    pub async fn publish_land(
        &self,
        actor: &Identity,
        land_id: LandId,
    ) -> Result<(), WorkflowError> {
        self.run(actor, Command::PublishLand { land_id }).await
    }

    pub async fn lock_interest(
        &self,
        actor: &Identity,
        land_id: LandId,
    ) -> Result<(), WorkflowError> {
        self.run(actor, Command::LockInterest { land_id }).await
    }

    pub async fn mark_ready_to_build(
        &self,
        actor: &Identity,
        land_id: LandId,
    ) -> Result<(), WorkflowError> {
        self.run(actor, Command::MarkReadyToBuild { land_id }).await
    }

    pub async fn reject_land(
        &self,
        actor: &Identity,
        land_id: LandId,
        reason: Option<String>,
    ) -> Result<(), WorkflowError> {
        self.run(actor, Command::RejectLand { land_id, reason }).await
    }

    pub async fn set_visibility(
        &self,
        actor: &Identity,
        land_id: LandId,
        visibility: Visibility,
    ) -> Result<(), WorkflowError> {
        self.run(actor, Command::SetVisibility { land_id, visibility })
            .await
    }

    pub async fn update_section_content(
        &self,
        actor: &Identity,
        section_id: SectionId,
        content: SectionContent,
    ) -> Result<(), WorkflowError> {
        self.run(actor, Command::UpdateSectionContent { section_id, content })
            .await
    }

    pub async fn assign_section(
        &self,
        actor: &Identity,
        section_id: SectionId,
        assignment: SectionAssignment,
    ) -> Result<(), WorkflowError> {
        self.run(actor, Command::AssignSection { section_id, assignment })
            .await
    }

    pub async fn decide_section(
        &self,
        actor: &Identity,
        section_id: SectionId,
        decision: SectionDecision,
        comments: Option<String>,
    ) -> Result<(), WorkflowError> {
        self.run(
            actor,
            Command::DecideSection {
                section_id,
                decision,
                comments,
            },
        )
        .await
    }

    pub async fn create_task(
        &self,
        actor: &Identity,
        land_id: LandId,
        task: NewTask,
    ) -> Result<TaskId, WorkflowError> {
        match self
            .submit(actor, Command::CreateTask { land_id, task })
            .await?
            .outcome
        {
            Outcome::Created(EntityRef::Task(id)) => Ok(id),
            other => Err(unexpected(other)),
        }
    }

    pub async fn update_task_status(
        &self,
        actor: &Identity,
        task_id: TaskId,
        status: TaskStatus,
        note: Option<String>,
    ) -> Result<(), WorkflowError> {
        self.run(
            actor,
            Command::UpdateTaskStatus {
                task_id,
                status,
                note,
            },
        )
        .await
    }

    pub async fn update_task_fields(
        &self,
        actor: &Identity,
        task_id: TaskId,
        patch: TaskPatch,
    ) -> Result<(), WorkflowError> {
        self.run(actor, Command::UpdateTaskFields { task_id, patch })
            .await
    }

    pub async fn delete_task(&self, actor: &Identity, task_id: TaskId) -> Result<(), WorkflowError> {
        self.run(actor, Command::DeleteTask { task_id }).await
    }

    pub async fn express_interest(
        &self,
        actor: &Identity,
        land_id: LandId,
        request: InterestRequest,
    ) -> Result<InterestId, WorkflowError> {
        match self
            .submit(actor, Command::ExpressInterest { land_id, request })
            .await?
            .outcome
        {
            Outcome::Created(EntityRef::Interest(id)) => Ok(id),
            other => Err(unexpected(other)),
        }
    }

    pub async fn decide_interest(
        &self,
        actor: &Identity,
        interest_id: InterestId,
        decision: InterestDecision,
    ) -> Result<(), WorkflowError> {
        self.run(
            actor,
            Command::DecideInterest {
                interest_id,
                decision,
            },
        )
        .await
    }

    pub async fn withdraw_interest(
        &self,
        actor: &Identity,
        interest_id: InterestId,
    ) -> Result<(), WorkflowError> {
        self.run(actor, Command::WithdrawInterest { interest_id })
            .await
    }

    async fn run(&self, actor: &Identity, command: Command) -> Result<(), WorkflowError> {
        self.submit(actor, command).await.map(|_| ())
    }

    /// Land with the children `actor` may see
    pub async fn land(
        &self,
        actor: &Identity,
        land_id: LandId,
    ) -> Result<LandAggregate, WorkflowError> {
        let mut aggregate = self
            .store
            .load(land_id)
            .await?
            .ok_or_else(|| WorkflowError::land_not_found(land_id))?;
        RoleAuthority::require(
            actor,
            Action::ViewLand,
            Subject::Listing {
                land: &aggregate.land,
                sections: &aggregate.sections,
            },
        )?;

        let land = aggregate.land.clone();
        aggregate.tasks.retain(|task| {
            RoleAuthority::can(actor, Action::ViewTask, Subject::Task { land: &land, task })
        });
        aggregate.interests.retain(|interest| {
            RoleAuthority::can(
                actor,
                Action::ViewInterest,
                Subject::Interest {
                    land: &land,
                    interest,
                },
            )
        });
        Ok(aggregate)
    }

    /// Review queue: sections routed to the actor's user id or any of their roles
    pub async fn sections_assigned_to(
        &self,
        actor: &Identity,
    ) -> Result<Vec<LandSection>, WorkflowError> {
        let roles: Vec<String> = actor.roles.iter().cloned().collect();
        Ok(self.store.sections_for_reviewer(actor.user_id, &roles).await?)
    }

    pub async fn task_history(
        &self,
        actor: &Identity,
        task_id: TaskId,
    ) -> Result<Vec<TaskHistory>, WorkflowError> {
        let target = EntityRef::Task(task_id);
        let aggregate = self.load_owning(target).await?;
        let task = aggregate.task(task_id)?;
        RoleAuthority::require(
            actor,
            Action::ViewTask,
            Subject::Task {
                land: &aggregate.land,
                task,
            },
        )?;
        Ok(task.history.clone())
    }

    /// Interests the actor has expressed, across all lands
    pub async fn interests_of(
        &self,
        actor: &Identity,
    ) -> Result<Vec<InvestorInterest>, WorkflowError> {
        Ok(self.store.interests_of_investor(actor.user_id).await?)
    }

    /// Marketplace view: listed lands whose visibility admits the actor
    pub async fn browse_lands(&self, actor: &Identity) -> Result<Vec<Land>, WorkflowError> {
        let lands = self.store.listed_lands().await?;
        debug!(listed = lands.len(), "Loaded marketplace lands");
        Ok(lands
            .into_iter()
            .filter(|aggregate| {
                RoleAuthority::can(
                    actor,
                    Action::ViewLand,
                    Subject::Listing {
                        land: &aggregate.land,
                        sections: &aggregate.sections,
                    },
                )
            })
            .map(|aggregate| aggregate.land)
            .collect())
    }

    pub async fn tasks_assigned_to(
        &self,
        actor: &Identity,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, WorkflowError> {
        Ok(self.store.tasks_assigned_to(actor.user_id, status).await?)
    }

    pub async fn tasks_created_by(
        &self,
        actor: &Identity,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, WorkflowError> {
        Ok(self.store.tasks_created_by(actor.user_id, status).await?)
    }

    /// Every interest in a land, for its owner and administrators
    pub async fn interests_on_land(
        &self,
        actor: &Identity,
        land_id: LandId,
    ) -> Result<Vec<InvestorInterest>, WorkflowError> {
        let aggregate = self
            .store
            .load(land_id)
            .await?
            .ok_or_else(|| WorkflowError::land_not_found(land_id))?;
        if !RoleAuthority::is_admin(actor) && !RoleAuthority::is_owner(actor, &aggregate.land) {
            return Err(WorkflowError::forbidden(format!(
                "user {} may not list the interests in land {land_id}",
                actor.user_id
            )));
        }
        let mut interests = aggregate.interests;
        interests.sort_by_key(|interest| interest.created_at);
        Ok(interests)
    }

    /// Committed event trail of a land, for its owner and administrators
    pub async fn land_events(
        &self,
        actor: &Identity,
        land_id: LandId,
    ) -> Result<Vec<EventRecord>, WorkflowError> {
        let aggregate = self
            .store
            .load(land_id)
            .await?
            .ok_or_else(|| WorkflowError::land_not_found(land_id))?;
        if !RoleAuthority::is_admin(actor) && !RoleAuthority::is_owner(actor, &aggregate.land) {
            return Err(WorkflowError::forbidden(format!(
                "user {} may not view the history of land {land_id}",
                actor.user_id
            )));
        }
        Ok(self.store.events(land_id).await?)
    }

    async fn load_owning(&self, target: EntityRef) -> Result<LandAggregate, WorkflowError> {
        let land_id = self
            .store
            .owning_land(target)
            .await?
            .ok_or_else(|| WorkflowError::not_found(target))?;
        self.store
            .load(land_id)
            .await?
            .ok_or_else(|| WorkflowError::not_found(target))
    }
}

/// Dispatch a command to its decision function
fn apply(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    command: Command,
    events: &mut EventLog,
) -> Result<Outcome, WorkflowError> {
    let land_ref = EntityRef::Land(aggregate.land.id);
    match command {
        Command::CreateLand { .. } => Err(WorkflowError::Internal {
            reason: "land creation does not run against an existing land".to_string(),
        }),
        Command::UpdateLandDetails { patch, .. } => {
            land::update_details(ctx, aggregate, patch, events).map(|_| Outcome::Updated(land_ref))
        }
        Command::DeleteLand { .. } => {
            land::delete(ctx, aggregate, events).map(|_| Outcome::Deleted(land_ref))
        }
        Command::SubmitLand { .. } => {
            land::submit(ctx, aggregate, events).map(|_| Outcome::Updated(land_ref))
        }
        Command::DefineCommercialTerms { terms, .. } => {
            land::define_commercial_terms(ctx, aggregate, terms, events)
                .map(|_| Outcome::Updated(land_ref))
        }
        Command::PublishLand { .. } => {
            land::publish(ctx, aggregate, events).map(|_| Outcome::Updated(land_ref))
        }
        Command::LockInterest { .. } => {
            land::lock_interest(ctx, aggregate, events).map(|_| Outcome::Updated(land_ref))
        }
        Command::MarkReadyToBuild { .. } => {
            land::mark_ready_to_build(ctx, aggregate, events).map(|_| Outcome::Updated(land_ref))
        }
        Command::RejectLand { reason, .. } => {
            land::reject(ctx, aggregate, reason, events).map(|_| Outcome::Updated(land_ref))
        }
        Command::SetVisibility { visibility, .. } => {
            land::set_visibility(ctx, aggregate, visibility, events)
                .map(|_| Outcome::Updated(land_ref))
        }
        Command::UpdateSectionContent {
            section_id,
            content,
        } => section::update_content(ctx, aggregate, section_id, content, events)
            .map(|_| Outcome::Updated(EntityRef::Section(section_id))),
        Command::AssignSection {
            section_id,
            assignment,
        } => section::assign(ctx, aggregate, section_id, assignment, events)
            .map(|_| Outcome::Updated(EntityRef::Section(section_id))),
        Command::DecideSection {
            section_id,
            decision,
            comments,
        } => section::decide(ctx, aggregate, section_id, decision, comments, events)
            .map(|_| Outcome::Updated(EntityRef::Section(section_id))),
        Command::CreateTask { task: new_task, .. } => task::create(ctx, aggregate, new_task, events)
            .map(|id| Outcome::Created(EntityRef::Task(id))),
        Command::UpdateTaskStatus {
            task_id,
            status,
            note,
        } => task::update_status(ctx, aggregate, task_id, status, note, events)
            .map(|_| Outcome::Updated(EntityRef::Task(task_id))),
        Command::UpdateTaskFields { task_id, patch } => {
            task::update_fields(ctx, aggregate, task_id, patch, events)
                .map(|_| Outcome::Updated(EntityRef::Task(task_id)))
        }
        Command::DeleteTask { task_id } => task::delete(ctx, aggregate, task_id, events)
            .map(|_| Outcome::Deleted(EntityRef::Task(task_id))),
        Command::ExpressInterest { request, .. } => {
            interest::express(ctx, aggregate, request, events)
                .map(|id| Outcome::Created(EntityRef::Interest(id)))
        }
        Command::DecideInterest {
            interest_id,
            decision,
        } => interest::decide(ctx, aggregate, interest_id, decision, events)
            .map(|_| Outcome::Updated(EntityRef::Interest(interest_id))),
        Command::WithdrawInterest { interest_id } => {
            interest::withdraw(ctx, aggregate, interest_id, events)
                .map(|_| Outcome::Updated(EntityRef::Interest(interest_id)))
        }
    }
}

fn unexpected(outcome: Outcome) -> WorkflowError {
    WorkflowError::Internal {
        reason: format!("unexpected command outcome {outcome:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LandStatus, UserId};
    use crate::error::ErrorKind;
    use crate::events::{MockEventSink, WorkflowEvent};
    use crate::store::MemoryLandStore;

    fn identity(role: &str) -> Identity {
        Identity::new(UserId::new(), [role])
    }

    fn engine_with(sink: MockEventSink) -> WorkflowEngine {
        WorkflowEngine::new(
            Arc::new(MemoryLandStore::new()),
            Catalog::default(),
            WorkflowPolicy::default(),
        )
        .unwrap()
        .with_event_sink(Arc::new(sink))
    }

    #[tokio::test]
    async fn test_committed_events_reach_the_sink() {
        let mut sink = MockEventSink::new();
        sink.expect_publish()
            .withf(|record| matches!(record.event, WorkflowEvent::LandCreated { .. }))
            .times(1)
            .return_const(());
        sink.expect_publish()
            .withf(|record| {
                matches!(
                    record.event,
                    WorkflowEvent::LandStatusChanged {
                        to: LandStatus::Submitted,
                        ..
                    }
                )
            })
            .times(1)
            .return_const(());
        sink.expect_publish()
            .withf(|record| matches!(record.event, WorkflowEvent::SectionStatusChanged { .. }))
            .times(9)
            .return_const(());

        let engine = engine_with(sink);
        let owner = identity("landowner");
        let land_id = engine
            .create_land(&owner, LandFields::new("Riverside wind"))
            .await
            .unwrap();
        engine.submit_land(&owner, land_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_command_publishes_nothing() {
        let mut sink = MockEventSink::new();
        sink.expect_publish().times(1).return_const(());

        let engine = engine_with(sink);
        let owner = identity("landowner");
        let land_id = engine
            .create_land(&owner, LandFields::new("Riverside wind"))
            .await
            .unwrap();

        let err = engine
            .submit_land(&identity("landowner"), land_id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_validation_runs_before_lookup() {
        let engine = engine_with(MockEventSink::new());
        let err = engine
            .update_land_details(&identity("administrator"), LandId::new(), LandPatch::default())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);

        let err = engine
            .submit_land(&identity("landowner"), LandId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_receipt_carries_correlation_id() {
        let engine = WorkflowEngine::new(
            Arc::new(MemoryLandStore::new()),
            Catalog::default(),
            WorkflowPolicy::default(),
        )
        .unwrap();
        let receipt = engine
            .submit(
                &identity("landowner"),
                Command::CreateLand {
                    fields: LandFields::new("Dune solar"),
                },
            )
            .await
            .unwrap();

        assert!(matches!(receipt.outcome, Outcome::Created(EntityRef::Land(_))));
        assert!(receipt
            .events
            .iter()
            .all(|record| record.correlation_id == receipt.correlation_id));
    }

    #[test]
    fn test_command_serializes_with_tag() {
        let command = Command::SubmitLand {
            land_id: LandId::new(),
        };
        let json = serde_json::to_value(&command).unwrap();
        assert_eq!(json["command"], "submit_land");
        let back: Command = serde_json::from_value(json).unwrap();
        assert_eq!(back, command);
    }

    #[test]
    fn test_catalog_without_active_sections_is_refused() {
        let mut catalog = Catalog::default();
        for section in &mut catalog.sections {
            section.active = false;
        }

        let err = WorkflowEngine::new(
            Arc::new(MemoryLandStore::new()),
            catalog,
            WorkflowPolicy::default(),
        )
        .err()
        .unwrap();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn test_configured_engine_logs_committed_events() {
        let engine =
            WorkflowEngine::from_config(Arc::new(MemoryLandStore::new()), &LandflowConfig::default())
                .unwrap();
        assert!(engine.sink.is_some());
        assert_eq!(engine.policy(), &WorkflowPolicy::default());
    }
}
