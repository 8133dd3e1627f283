use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::land::positive;
use super::{InterestId, InterestStatus, LandId, UserId};
use crate::error::WorkflowError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorInterest {
    pub id: InterestId,
    pub land_id: LandId,
    pub investor_id: UserId,
    pub investment_amount: Option<f64>,
    pub message: Option<String>,
    pub status: InterestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterestRequest {
    pub investment_amount: Option<f64>,
    pub message: Option<String>,
}

impl InterestRequest {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        positive("investment_amount", self.investment_amount)
    }
}
