use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{LandId, SectionId, SectionStatus, UserId};
use crate::catalog::Catalog;
use crate::error::WorkflowError;

/// Opaque section payload; its schema belongs to the section definition owner
pub type SectionData = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandSection {
    pub id: SectionId,
    pub land_id: LandId,
    pub section_key: String,
    pub status: SectionStatus,
    pub assigned_role: Option<String>,
    pub assigned_user: Option<UserId>,
    pub data: SectionData,
    pub reviewer_comments: Option<String>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejected_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LandSection {
    pub fn has_content(&self) -> bool {
        self.data.values().any(|value| !value.is_null())
    }
}

/// Content edit; landowners and admins send `data`, reviewers only `reviewer_comments`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectionContent {
    pub data: Option<SectionData>,
    pub reviewer_comments: Option<String>,
}

impl SectionContent {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.data.is_none() && self.reviewer_comments.is_none() {
            return Err(WorkflowError::validation(
                "section",
                "update carries neither data nor reviewer comments",
            ));
        }
        Ok(())
    }

    pub fn touches_data(&self) -> bool {
        self.data.is_some()
    }
}

/// Review routing set by an administrator
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionAssignment {
    pub role: Option<String>,
    pub user: Option<UserId>,
}

impl SectionAssignment {
    pub fn validate(&self, catalog: &Catalog) -> Result<(), WorkflowError> {
        if self.role.is_none() && self.user.is_none() {
            return Err(WorkflowError::validation(
                "assignment",
                "a role or a user is required",
            ));
        }
        if let Some(role) = &self.role {
            if !catalog.is_role(role) {
                return Err(WorkflowError::validation(
                    "assigned_role",
                    format!("unknown role '{role}'"),
                ));
            }
        }
        Ok(())
    }
}
