// Workflow state machines.
//
// Each operation is a decision function over a working copy of the land
// aggregate: it authorizes the actor, validates the transition against the
// status tables, mutates the copy and records events. On error the copy is
// discarded, so a failed operation never leaves partial state behind.

pub mod interest;
pub mod land;
pub mod section;
pub mod task;

#[cfg(test)]
pub(crate) mod fixtures;

use chrono::{DateTime, Utc};

use crate::catalog::Catalog;
use crate::config::WorkflowPolicy;
use crate::domain::Identity;
use crate::error::WorkflowError;

/// Everything a decision function needs besides the aggregate itself
#[derive(Debug, Clone, Copy)]
pub struct WorkflowContext<'a> {
    pub actor: &'a Identity,
    pub catalog: &'a Catalog,
    pub policy: &'a WorkflowPolicy,
    pub correlation_id: &'a str,
    pub now: DateTime<Utc>,
}

pub(crate) fn invalid_state(
    entity: &'static str,
    status: impl ToString,
    action: &'static str,
) -> WorkflowError {
    WorkflowError::InvalidState {
        entity,
        status: status.to_string(),
        action,
    }
}
