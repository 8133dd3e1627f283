use serde::{Deserialize, Serialize};

use super::{
    EntityRef, InterestId, InvestorInterest, Land, LandSection, SectionId, SectionStatus, Task,
    TaskId, UserId,
};
use crate::error::WorkflowError;

/// A land together with everything it owns, loaded and saved as one unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandAggregate {
    pub land: Land,
    pub sections: Vec<LandSection>,
    pub tasks: Vec<Task>,
    pub interests: Vec<InvestorInterest>,
}

impl LandAggregate {
    pub fn new(land: Land, sections: Vec<LandSection>) -> Self {
        Self {
            land,
            sections,
            tasks: Vec::new(),
            interests: Vec::new(),
        }
    }

    pub fn contains(&self, entity: EntityRef) -> bool {
        match entity {
            EntityRef::Land(id) => self.land.id == id,
            EntityRef::Section(id) => self.sections.iter().any(|s| s.id == id),
            EntityRef::Task(id) => self.tasks.iter().any(|t| t.id == id),
            EntityRef::Interest(id) => self.interests.iter().any(|i| i.id == id),
        }
    }

    pub fn section(&self, id: SectionId) -> Result<&LandSection, WorkflowError> {
        self.sections
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("section", id))
    }

    pub fn section_mut(&mut self, id: SectionId) -> Result<&mut LandSection, WorkflowError> {
        self.sections
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found("section", id))
    }

    pub fn task(&self, id: TaskId) -> Result<&Task, WorkflowError> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("task", id))
    }

    pub fn task_mut(&mut self, id: TaskId) -> Result<&mut Task, WorkflowError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("task", id))
    }

    pub fn interest(&self, id: InterestId) -> Result<&InvestorInterest, WorkflowError> {
        self.interests
            .iter()
            .find(|i| i.id == id)
            .ok_or_else(|| not_found("interest", id))
    }

    pub fn interest_mut(&mut self, id: InterestId) -> Result<&mut InvestorInterest, WorkflowError> {
        self.interests
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| not_found("interest", id))
    }

    pub fn active_interest_of(&self, investor: UserId) -> Option<&InvestorInterest> {
        self.interests
            .iter()
            .find(|i| i.investor_id == investor && i.status.is_active())
    }

    pub fn all_sections_approved(&self) -> bool {
        self.sections
            .iter()
            .all(|s| s.status == SectionStatus::Approved)
    }
}

fn not_found(entity: &'static str, id: impl ToString) -> WorkflowError {
    WorkflowError::NotFound {
        entity,
        id: id.to_string(),
    }
}
