use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{HistoryId, LandId, SectionId, TaskId, TaskStatus, UnknownStatus, UserId};
use crate::catalog::Catalog;
use crate::error::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            "urgent" => Ok(TaskPriority::Urgent),
            other => Err(UnknownStatus {
                kind: "priority",
                value: other.to_string(),
            }),
        }
    }
}

/// Immutable ledger row; `end_ts` is set once, when the next transition opens a new row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskHistory {
    pub id: HistoryId,
    pub task_id: TaskId,
    pub from_status: Option<TaskStatus>,
    pub to_status: TaskStatus,
    pub changed_by: UserId,
    pub note: Option<String>,
    pub start_ts: DateTime<Utc>,
    pub end_ts: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub land_id: LandId,
    pub land_section_id: Option<SectionId>,
    pub title: String,
    pub description: Option<String>,
    pub assigned_role: Option<String>,
    pub assigned_to: Option<UserId>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ordered by `start_ts`
    pub history: Vec<TaskHistory>,
}

impl Task {
    pub fn open_interval(&self) -> Option<&TaskHistory> {
        self.history.iter().find(|row| row.end_ts.is_none())
    }

    /// Close the open interval (if any) and open a new one.
    pub(crate) fn record_status(
        &mut self,
        from: Option<TaskStatus>,
        to: TaskStatus,
        changed_by: UserId,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> HistoryId {
        for row in self.history.iter_mut().filter(|row| row.end_ts.is_none()) {
            row.end_ts = Some(now);
        }

        let id = HistoryId::new();
        self.history.push(TaskHistory {
            id,
            task_id: self.id,
            from_status: from,
            to_status: to,
            changed_by,
            note,
            start_ts: now,
            end_ts: None,
        });
        id
    }
}

/// Payload for creating a task on a land
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub land_section_id: Option<SectionId>,
    pub assigned_role: Option<String>,
    pub assigned_to: Option<UserId>,
    pub priority: Option<TaskPriority>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self, catalog: &Catalog) -> Result<(), WorkflowError> {
        if self.title.trim().is_empty() {
            return Err(WorkflowError::validation("title", "must not be empty"));
        }
        validate_role(self.assigned_role.as_deref(), catalog)?;
        validate_dates(self.start_date, self.end_date)
    }
}

/// Non-status task fields; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub land_section_id: Option<SectionId>,
    pub assigned_role: Option<String>,
    pub assigned_to: Option<UserId>,
    pub priority: Option<TaskPriority>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl TaskPatch {
    pub fn validate(&self, catalog: &Catalog) -> Result<(), WorkflowError> {
        if *self == TaskPatch::default() {
            return Err(WorkflowError::validation("task", "update changes no fields"));
        }
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(WorkflowError::validation("title", "must not be empty"));
            }
        }
        validate_role(self.assigned_role.as_deref(), catalog)
    }

    pub(crate) fn apply_to(self, task: &mut Task) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if self.description.is_some() {
            task.description = self.description;
        }
        if self.land_section_id.is_some() {
            task.land_section_id = self.land_section_id;
        }
        if self.assigned_role.is_some() {
            task.assigned_role = self.assigned_role;
        }
        if self.assigned_to.is_some() {
            task.assigned_to = self.assigned_to;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if self.start_date.is_some() {
            task.start_date = self.start_date;
        }
        if self.end_date.is_some() {
            task.end_date = self.end_date;
        }
    }
}

pub(crate) fn validate_dates(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<(), WorkflowError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(WorkflowError::validation(
            "end_date",
            format!("{end} is before start date {start}"),
        )),
        _ => Ok(()),
    }
}

fn validate_role(role: Option<&str>, catalog: &Catalog) -> Result<(), WorkflowError> {
    match role {
        Some(role) if !catalog.is_role(role) => Err(WorkflowError::validation(
            "assigned_role",
            format!("unknown role '{role}'"),
        )),
        _ => Ok(()),
    }
}
