// Task tracking with an append-only status history.
//
// Active statuses may move to any other status; completed, rejected and
// on_hold close the task. Every status change closes the open history row
// and opens a new one in the same working copy, so both land in one commit.

use tracing::info;

use super::{invalid_state, WorkflowContext};
use crate::authority::{Action, RoleAuthority, Subject};
use crate::domain::task::validate_dates;
use crate::domain::{
    LandAggregate, NewTask, SectionId, Task, TaskId, TaskPatch, TaskStatus,
};
use crate::error::{Blocker, WorkflowError};
use crate::events::{EventLog, WorkflowEvent};

pub fn create(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    new_task: NewTask,
    events: &mut EventLog,
) -> Result<TaskId, WorkflowError> {
    RoleAuthority::require(ctx.actor, Action::CreateTask, Subject::Land(&aggregate.land))?;
    if aggregate.land.status.is_draft() {
        return Err(WorkflowError::precondition(
            "tasks can only be created once the land is submitted",
            vec![Blocker::Land {
                id: aggregate.land.id,
                status: aggregate.land.status.to_string(),
            }],
        ));
    }
    if let Some(section_id) = new_task.land_section_id {
        ensure_section_on_land(aggregate, section_id)?;
    }

    let mut task = Task {
        id: TaskId::new(),
        land_id: aggregate.land.id,
        land_section_id: new_task.land_section_id,
        title: new_task.title,
        description: new_task.description,
        assigned_role: new_task.assigned_role,
        assigned_to: new_task.assigned_to,
        status: TaskStatus::Assigned,
        priority: new_task.priority.unwrap_or_default(),
        start_date: new_task.start_date,
        end_date: new_task.end_date,
        created_by: ctx.actor.user_id,
        created_at: ctx.now,
        updated_at: ctx.now,
        history: Vec::new(),
    };
    task.record_status(None, TaskStatus::Assigned, ctx.actor.user_id, None, ctx.now);

    let task_id = task.id;
    info!(
        task_id = %task_id,
        land_id = %aggregate.land.id,
        title = %task.title,
        "Task created"
    );
    aggregate.tasks.push(task);

    events.push(WorkflowEvent::TaskCreated { task_id });
    events.push(WorkflowEvent::TaskStatusChanged {
        task_id,
        from: None,
        to: TaskStatus::Assigned,
    });
    Ok(task_id)
}

/// Move a task to `next`; re-sending the current status changes nothing
pub fn update_status(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    task_id: TaskId,
    next: TaskStatus,
    note: Option<String>,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    let task = aggregate.task(task_id)?;
    RoleAuthority::require(
        ctx.actor,
        Action::UpdateTaskStatus,
        Subject::Task {
            land: &aggregate.land,
            task,
        },
    )?;
    if task.status == next {
        return Ok(());
    }
    let to = task
        .status
        .apply(next)
        .ok_or_else(|| invalid_state("task", task.status, "change status of"))?;

    let task = aggregate.task_mut(task_id)?;
    let from = task.status;
    task.record_status(Some(from), to, ctx.actor.user_id, note, ctx.now);
    task.status = to;
    task.updated_at = ctx.now;

    info!(task_id = %task_id, from = %from, to = %to, "Task status changed");
    events.push(WorkflowEvent::TaskStatusChanged {
        task_id,
        from: Some(from),
        to,
    });
    Ok(())
}

pub fn update_fields(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    task_id: TaskId,
    patch: TaskPatch,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    let task = aggregate.task(task_id)?;
    RoleAuthority::require(
        ctx.actor,
        Action::ManageTask,
        Subject::Task {
            land: &aggregate.land,
            task,
        },
    )?;
    validate_dates(
        patch.start_date.or(task.start_date),
        patch.end_date.or(task.end_date),
    )?;
    if let Some(section_id) = patch.land_section_id {
        ensure_section_on_land(aggregate, section_id)?;
    }

    let task = aggregate.task_mut(task_id)?;
    patch.apply_to(task);
    task.updated_at = ctx.now;
    events.push(WorkflowEvent::TaskUpdated { task_id });
    Ok(())
}

/// Remove a task together with its history
pub fn delete(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    task_id: TaskId,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    let task = aggregate.task(task_id)?;
    RoleAuthority::require(
        ctx.actor,
        Action::DeleteTask,
        Subject::Task {
            land: &aggregate.land,
            task,
        },
    )?;

    aggregate.tasks.retain(|task| task.id != task_id);
    aggregate.land.updated_at = ctx.now;
    events.push(WorkflowEvent::TaskDeleted { task_id });
    Ok(())
}

fn ensure_section_on_land(
    aggregate: &LandAggregate,
    section_id: SectionId,
) -> Result<(), WorkflowError> {
    if aggregate.sections.iter().any(|s| s.id == section_id) {
        Ok(())
    } else {
        Err(WorkflowError::validation(
            "land_section_id",
            format!("section {section_id} does not belong to land {}", aggregate.land.id),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identity, TaskPriority};
    use crate::error::ErrorKind;
    use crate::workflows::fixtures::*;
    use chrono::{Duration, NaiveDate};

    fn with_task(env: &TestEnv, owner: &Identity, assignee: &Identity) -> (LandAggregate, TaskId) {
        let mut aggregate = env.submitted_land(owner);
        let mut events = env.log(&aggregate, owner);
        let mut new_task = NewTask::new("Geotechnical survey");
        new_task.assigned_to = Some(assignee.user_id);
        let task_id = create(&env.ctx(owner), &mut aggregate, new_task, &mut events).unwrap();
        (aggregate, task_id)
    }

    #[test]
    fn test_create_on_draft_land_fails_precondition() {
        let env = TestEnv::new();
        let owner = landowner();
        let mut aggregate = env.draft_land(&owner);
        let mut events = env.log(&aggregate, &owner);

        let err = create(
            &env.ctx(&owner),
            &mut aggregate,
            NewTask::new("Fence inspection"),
            &mut events,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::PreconditionFailed);
        assert_eq!(
            err.blockers(),
            &[Blocker::Land {
                id: aggregate.land.id,
                status: "draft".to_string(),
            }]
        );
        assert!(aggregate.tasks.is_empty());
    }

    #[test]
    fn test_create_opens_history() {
        let env = TestEnv::new();
        let owner = landowner();
        let (aggregate, task_id) = with_task(&env, &owner, &staff("engineer"));

        let task = aggregate.task(task_id).unwrap();
        assert_eq!(task.status, TaskStatus::Assigned);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.created_by, owner.user_id);
        assert_eq!(task.history.len(), 1);
        assert_eq!(task.history[0].from_status, None);
        assert_eq!(task.history[0].to_status, TaskStatus::Assigned);
        assert!(task.open_interval().is_some());
    }

    #[test]
    fn test_create_rejects_foreign_section() {
        let env = TestEnv::new();
        let owner = landowner();
        let mut aggregate = env.submitted_land(&owner);
        let other = env.submitted_land(&owner);
        let mut events = env.log(&aggregate, &owner);
        let mut new_task = NewTask::new("Review permits");
        new_task.land_section_id = Some(other.sections[0].id);

        let err = create(&env.ctx(&owner), &mut aggregate, new_task, &mut events).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn test_create_forbidden_for_investor() {
        let env = TestEnv::new();
        let mut aggregate = env.submitted_land(&landowner());
        let investor = investor();
        let mut events = env.log(&aggregate, &investor);

        let err = create(
            &env.ctx(&investor),
            &mut aggregate,
            NewTask::new("Site visit"),
            &mut events,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_assignee_walks_task_to_completion() {
        let mut env = TestEnv::new();
        let owner = landowner();
        let assignee = staff("engineer");
        let (mut aggregate, task_id) = with_task(&env, &owner, &assignee);
        let mut events = env.log(&aggregate, &assignee);

        env.now += Duration::hours(2);
        update_status(
            &env.ctx(&assignee),
            &mut aggregate,
            task_id,
            TaskStatus::InProgress,
            None,
            &mut events,
        )
        .unwrap();
        env.now += Duration::hours(3);
        update_status(
            &env.ctx(&assignee),
            &mut aggregate,
            task_id,
            TaskStatus::Completed,
            Some("report uploaded".to_string()),
            &mut events,
        )
        .unwrap();

        let task = aggregate.task(task_id).unwrap();
        assert_eq!(task.history.len(), 3);
        assert!(task.history[..2].iter().all(|row| row.end_ts.is_some()));
        assert_eq!(task.history[2].end_ts, None);
        assert_eq!(task.history[2].note.as_deref(), Some("report uploaded"));
        assert_eq!(task.history[1].end_ts, Some(task.history[2].start_ts));
        assert_eq!(
            task.history.iter().filter(|row| row.end_ts.is_none()).count(),
            1
        );
    }

    #[test]
    fn test_closed_task_rejects_status_change() {
        let env = TestEnv::new();
        let owner = landowner();
        let (mut aggregate, task_id) = with_task(&env, &owner, &staff("engineer"));
        let mut events = env.log(&aggregate, &owner);

        update_status(
            &env.ctx(&owner),
            &mut aggregate,
            task_id,
            TaskStatus::OnHold,
            None,
            &mut events,
        )
        .unwrap();
        let err = update_status(
            &env.ctx(&owner),
            &mut aggregate,
            task_id,
            TaskStatus::InProgress,
            None,
            &mut events,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_same_status_records_nothing() {
        let env = TestEnv::new();
        let owner = landowner();
        let (mut aggregate, task_id) = with_task(&env, &owner, &staff("engineer"));
        let mut events = env.log(&aggregate, &owner);

        update_status(
            &env.ctx(&owner),
            &mut aggregate,
            task_id,
            TaskStatus::Assigned,
            None,
            &mut events,
        )
        .unwrap();
        assert_eq!(aggregate.task(task_id).unwrap().history.len(), 1);
        assert!(events.records().is_empty());
    }

    #[test]
    fn test_assignee_cannot_edit_fields() {
        let env = TestEnv::new();
        let owner = landowner();
        let assignee = staff("engineer");
        let (mut aggregate, task_id) = with_task(&env, &owner, &assignee);
        let mut events = env.log(&aggregate, &assignee);
        let patch = TaskPatch {
            title: Some("Renamed".to_string()),
            ..Default::default()
        };

        let err = update_fields(&env.ctx(&assignee), &mut aggregate, task_id, patch, &mut events)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_update_fields_checks_merged_dates() {
        let env = TestEnv::new();
        let owner = landowner();
        let (mut aggregate, task_id) = with_task(&env, &owner, &staff("engineer"));
        let mut events = env.log(&aggregate, &owner);
        let start = NaiveDate::from_ymd_opt(2025, 5, 1).unwrap();

        let patch = TaskPatch {
            start_date: Some(start),
            priority: Some(TaskPriority::High),
            ..Default::default()
        };
        update_fields(&env.ctx(&owner), &mut aggregate, task_id, patch, &mut events).unwrap();
        assert_eq!(aggregate.task(task_id).unwrap().priority, TaskPriority::High);

        let patch = TaskPatch {
            end_date: NaiveDate::from_ymd_opt(2025, 4, 1),
            ..Default::default()
        };
        let err = update_fields(&env.ctx(&owner), &mut aggregate, task_id, patch, &mut events)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn test_delete_removes_task_and_history() {
        let env = TestEnv::new();
        let owner = landowner();
        let (mut aggregate, task_id) = with_task(&env, &owner, &staff("engineer"));
        let stranger = staff("engineer");
        let mut events = env.log(&aggregate, &owner);

        let err = delete(&env.ctx(&stranger), &mut aggregate, task_id, &mut events).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        delete(&env.ctx(&owner), &mut aggregate, task_id, &mut events).unwrap();
        assert!(aggregate.tasks.is_empty());
        assert_eq!(
            aggregate.task(task_id).unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }
}
