// Domain events emitted by workflow transitions.
//
// Events are persisted with the state they describe and then handed to an
// optional `EventSink` (notification, email, webhook collaborators).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{
    InterestDecision, InterestId, InterestStatus, LandId, LandStatus, SectionDecision, SectionId,
    SectionStatus, TaskId, TaskStatus, UserId, Visibility,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum WorkflowEvent {
    LandCreated {
        owner: UserId,
        sections: usize,
    },
    LandUpdated,
    LandDeleted,
    LandStatusChanged {
        from: LandStatus,
        to: LandStatus,
    },
    CommercialTermsDefined,
    VisibilityChanged {
        visibility: Visibility,
    },
    SectionUpdated {
        section_id: SectionId,
    },
    SectionAssigned {
        section_id: SectionId,
        role: Option<String>,
        user: Option<UserId>,
    },
    SectionStatusChanged {
        section_id: SectionId,
        from: SectionStatus,
        to: SectionStatus,
    },
    SectionDecided {
        section_id: SectionId,
        decision: SectionDecision,
        comments: Option<String>,
    },
    TaskCreated {
        task_id: TaskId,
    },
    TaskUpdated {
        task_id: TaskId,
    },
    TaskStatusChanged {
        task_id: TaskId,
        from: Option<TaskStatus>,
        to: TaskStatus,
    },
    TaskDeleted {
        task_id: TaskId,
    },
    InterestExpressed {
        interest_id: InterestId,
        investor: UserId,
    },
    InterestDecided {
        interest_id: InterestId,
        decision: InterestDecision,
    },
    InterestStatusChanged {
        interest_id: InterestId,
        from: InterestStatus,
        to: InterestStatus,
    },
}

impl WorkflowEvent {
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::LandCreated { .. } => "land_created",
            WorkflowEvent::LandUpdated => "land_updated",
            WorkflowEvent::LandDeleted => "land_deleted",
            WorkflowEvent::LandStatusChanged { .. } => "land_status_changed",
            WorkflowEvent::CommercialTermsDefined => "commercial_terms_defined",
            WorkflowEvent::VisibilityChanged { .. } => "visibility_changed",
            WorkflowEvent::SectionUpdated { .. } => "section_updated",
            WorkflowEvent::SectionAssigned { .. } => "section_assigned",
            WorkflowEvent::SectionStatusChanged { .. } => "section_status_changed",
            WorkflowEvent::SectionDecided { .. } => "section_decided",
            WorkflowEvent::TaskCreated { .. } => "task_created",
            WorkflowEvent::TaskUpdated { .. } => "task_updated",
            WorkflowEvent::TaskStatusChanged { .. } => "task_status_changed",
            WorkflowEvent::TaskDeleted { .. } => "task_deleted",
            WorkflowEvent::InterestExpressed { .. } => "interest_expressed",
            WorkflowEvent::InterestDecided { .. } => "interest_decided",
            WorkflowEvent::InterestStatusChanged { .. } => "interest_status_changed",
        }
    }
}

/// An event stamped with where, who and when
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub land_id: LandId,
    pub actor: UserId,
    pub correlation_id: String,
    pub at: DateTime<Utc>,
    pub event: WorkflowEvent,
}

/// Collects the events one command produces
#[derive(Debug)]
pub struct EventLog {
    land_id: LandId,
    actor: UserId,
    correlation_id: String,
    at: DateTime<Utc>,
    records: Vec<EventRecord>,
}

impl EventLog {
    pub fn new(land_id: LandId, actor: UserId, correlation_id: &str, at: DateTime<Utc>) -> Self {
        Self {
            land_id,
            actor,
            correlation_id: correlation_id.to_string(),
            at,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, event: WorkflowEvent) {
        self.records.push(EventRecord {
            land_id: self.land_id,
            actor: self.actor,
            correlation_id: self.correlation_id.clone(),
            at: self.at,
            event,
        });
    }

    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<EventRecord> {
        self.records
    }
}

/// Downstream consumer of committed events
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, record: &EventRecord);
}

/// Sink that only writes committed events to the structured log
#[derive(Debug, Default)]
pub struct TracingEventSink;

#[async_trait]
impl EventSink for TracingEventSink {
    async fn publish(&self, record: &EventRecord) {
        info!(
            land_id = %record.land_id,
            actor = %record.actor,
            correlation.id = %record.correlation_id,
            event = record.event.name(),
            "Workflow event committed"
        );
    }
}
