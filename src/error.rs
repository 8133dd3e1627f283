// Workflow errors - every rejected command maps to exactly one kind

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::domain::{EntityRef, LandId, SectionId, TaskId};
use crate::store::StoreError;

/// Language-neutral error kind handed to the routing collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidState,
    PreconditionFailed,
    Conflict,
    ValidationError,
    Internal,
}

/// A specific entity or field standing in the way of an aggregate transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Blocker {
    Section {
        id: SectionId,
        key: String,
        status: String,
    },
    EmptySection {
        id: SectionId,
        key: String,
    },
    Task {
        id: TaskId,
        title: String,
        status: String,
    },
    MissingField {
        field: String,
    },
    /// The land itself is in the wrong status for the request
    Land {
        id: LandId,
        status: String,
    },
    Visibility {
        id: LandId,
        visibility: String,
    },
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blocker::Section { id, key, status } => write!(f, "section {key} ({id}) is {status}"),
            Blocker::EmptySection { id, key } => write!(f, "section {key} ({id}) has no content"),
            Blocker::Task { id, title, status } => write!(f, "task '{title}' ({id}) is {status}"),
            Blocker::MissingField { field } => write!(f, "{field} is not set"),
            Blocker::Land { id, status } => write!(f, "land {id} is {status}"),
            Blocker::Visibility { id, visibility } => {
                write!(f, "land {id} has visibility {visibility}")
            }
        }
    }
}

fn join_blockers(blockers: &[Blocker]) -> String {
    blockers
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    #[error("cannot {action} {entity} in status {status}")]
    InvalidState {
        entity: &'static str,
        status: String,
        action: &'static str,
    },

    #[error("precondition failed: {reason} [{}]", join_blockers(.blockers))]
    PreconditionFailed {
        reason: String,
        blockers: Vec<Blocker>,
    },

    #[error("conflict: {reason}")]
    Conflict { reason: String },

    #[error("invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("storage failure: {0}")]
    Storage(StoreError),

    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::NotFound { .. } => ErrorKind::NotFound,
            WorkflowError::Forbidden { .. } => ErrorKind::Forbidden,
            WorkflowError::InvalidState { .. } => ErrorKind::InvalidState,
            WorkflowError::PreconditionFailed { .. } => ErrorKind::PreconditionFailed,
            WorkflowError::Conflict { .. } => ErrorKind::Conflict,
            WorkflowError::Validation { .. } => ErrorKind::ValidationError,
            WorkflowError::Storage(_) | WorkflowError::Internal { .. } => ErrorKind::Internal,
        }
    }

    /// Blocking entities of a failed aggregate precondition, empty for every other kind
    pub fn blockers(&self) -> &[Blocker] {
        match self {
            WorkflowError::PreconditionFailed { blockers, .. } => blockers,
            _ => &[],
        }
    }

    pub fn land_not_found(id: LandId) -> Self {
        Self::not_found(EntityRef::Land(id))
    }

    pub fn not_found(entity: EntityRef) -> Self {
        WorkflowError::NotFound {
            entity: entity.kind(),
            id: entity.id_string(),
        }
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        WorkflowError::Forbidden {
            reason: reason.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        WorkflowError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn precondition(reason: impl Into<String>, blockers: Vec<Blocker>) -> Self {
        WorkflowError::PreconditionFailed {
            reason: reason.into(),
            blockers,
        }
    }
}

impl From<StoreError> for WorkflowError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(reason) => WorkflowError::Conflict { reason },
            other => WorkflowError::Storage(other),
        }
    }
}
