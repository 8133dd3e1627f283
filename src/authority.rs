// Role authority - the single place role keys are compared.
//
// Every workflow operation asks `RoleAuthority::require` instead of checking
// roles itself. Rules are combinations of three primitives: administrator,
// land owner and assigned reviewer.

use serde::Serialize;
use tracing::debug;

use crate::domain::{
    Identity, InvestorInterest, Land, LandSection, LandStatus, SectionStatus, Task, UserId,
    Visibility,
};
use crate::error::WorkflowError;

pub const ADMINISTRATOR: &str = "administrator";
pub const LANDOWNER: &str = "landowner";
pub const INVESTOR: &str = "investor";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    CreateLand,
    ViewLand,
    UpdateLand,
    DeleteLand,
    SubmitLand,
    RejectLand,
    DefineCommercialTerms,
    PublishLand,
    LockInterest,
    MarkReadyToBuild,
    SetVisibility,
    EditSectionData,
    EditSectionReview,
    AssignSection,
    DecideSection,
    CreateTask,
    ManageTask,
    UpdateTaskStatus,
    DeleteTask,
    ViewTask,
    ExpressInterest,
    DecideInterest,
    WithdrawInterest,
    ViewInterest,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::CreateLand => "create land",
            Action::ViewLand => "view land",
            Action::UpdateLand => "update land",
            Action::DeleteLand => "delete land",
            Action::SubmitLand => "submit land",
            Action::RejectLand => "reject land",
            Action::DefineCommercialTerms => "define commercial terms",
            Action::PublishLand => "publish land",
            Action::LockInterest => "lock investor interest",
            Action::MarkReadyToBuild => "mark land ready to build",
            Action::SetVisibility => "change land visibility",
            Action::EditSectionData => "edit section data",
            Action::EditSectionReview => "edit section review",
            Action::AssignSection => "assign section",
            Action::DecideSection => "decide section",
            Action::CreateTask => "create task",
            Action::ManageTask => "update task",
            Action::UpdateTaskStatus => "change task status",
            Action::DeleteTask => "delete task",
            Action::ViewTask => "view task",
            Action::ExpressInterest => "express interest",
            Action::DecideInterest => "decide interest",
            Action::WithdrawInterest => "withdraw interest",
            Action::ViewInterest => "view interest",
        }
    }
}

/// Snapshot of the entity an action targets
#[derive(Debug, Clone, Copy)]
pub enum Subject<'a> {
    Nothing,
    Land(&'a Land),
    Section {
        land: &'a Land,
        section: &'a LandSection,
    },
    Task {
        land: &'a Land,
        task: &'a Task,
    },
    Interest {
        land: &'a Land,
        interest: &'a InvestorInterest,
    },
    /// A land together with its sections, which decide who reviews it
    Listing {
        land: &'a Land,
        sections: &'a [LandSection],
    },
}

impl<'a> Subject<'a> {
    fn land(&self) -> Option<&'a Land> {
        match *self {
            Subject::Nothing => None,
            Subject::Land(land)
            | Subject::Section { land, .. }
            | Subject::Task { land, .. }
            | Subject::Interest { land, .. }
            | Subject::Listing { land, .. } => Some(land),
        }
    }
}

/// Entities routed to a reviewer by user and/or role
pub trait Assignable {
    fn assigned_user(&self) -> Option<UserId>;
    fn assigned_role(&self) -> Option<&str>;
}

impl Assignable for LandSection {
    fn assigned_user(&self) -> Option<UserId> {
        self.assigned_user
    }

    fn assigned_role(&self) -> Option<&str> {
        self.assigned_role.as_deref()
    }
}

impl Assignable for Task {
    fn assigned_user(&self) -> Option<UserId> {
        self.assigned_to
    }

    fn assigned_role(&self) -> Option<&str> {
        self.assigned_role.as_deref()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RoleAuthority;

impl RoleAuthority {
    pub fn is_admin(identity: &Identity) -> bool {
        identity.has_role(ADMINISTRATOR)
    }

    pub fn is_owner(identity: &Identity, land: &Land) -> bool {
        identity.user_id == land.landowner_id
    }

    pub fn is_assigned_reviewer(identity: &Identity, entity: &impl Assignable) -> bool {
        entity.assigned_user() == Some(identity.user_id)
            || entity
                .assigned_role()
                .is_some_and(|role| identity.has_role(role))
    }

    pub fn is_investor(identity: &Identity) -> bool {
        identity.has_role(INVESTOR)
    }

    /// Routed at least one section of the land, by user or role
    fn reviews_any(identity: &Identity, sections: &[LandSection]) -> bool {
        sections
            .iter()
            .any(|section| Self::is_assigned_reviewer(identity, section))
    }

    pub fn can(identity: &Identity, action: Action, subject: Subject<'_>) -> bool {
        let admin = Self::is_admin(identity);
        let owner = subject
            .land()
            .is_some_and(|land| Self::is_owner(identity, land));

        match (action, subject) {
            (Action::CreateLand, _) => identity.has_role(LANDOWNER),

            (Action::ViewLand, Subject::Listing { land, sections }) => {
                admin || owner || Self::can_browse(identity, land, sections)
            }
            (Action::UpdateLand, Subject::Land(land)) => {
                admin || (owner && land.status == LandStatus::Draft)
            }
            (Action::DeleteLand | Action::SetVisibility, Subject::Land(_)) => admin || owner,
            (Action::SubmitLand, Subject::Land(_)) => owner,
            (
                Action::RejectLand
                | Action::DefineCommercialTerms
                | Action::PublishLand
                | Action::LockInterest
                | Action::MarkReadyToBuild,
                Subject::Land(_),
            ) => admin,

            (Action::EditSectionData, Subject::Section { section, .. }) => {
                admin || (owner && section.status == SectionStatus::Draft)
            }
            (Action::EditSectionReview | Action::DecideSection, Subject::Section { section, .. }) => {
                admin || Self::is_assigned_reviewer(identity, section)
            }
            (Action::AssignSection, Subject::Section { .. }) => admin,

            (Action::CreateTask, Subject::Land(_)) => admin || owner,
            (Action::ManageTask | Action::DeleteTask, Subject::Task { task, .. }) => {
                admin || owner || task.created_by == identity.user_id
            }
            (Action::UpdateTaskStatus | Action::ViewTask, Subject::Task { task, .. }) => {
                admin
                    || owner
                    || task.created_by == identity.user_id
                    || Self::is_assigned_reviewer(identity, task)
            }

            (Action::ExpressInterest, Subject::Land(_)) => Self::is_investor(identity),
            (Action::DecideInterest, Subject::Interest { .. }) => admin || owner,
            (Action::WithdrawInterest, Subject::Interest { interest, .. }) => {
                interest.investor_id == identity.user_id
            }
            (Action::ViewInterest, Subject::Interest { interest, .. }) => {
                admin || owner || interest.investor_id == identity.user_id
            }

            // Action paired with the wrong kind of subject
            _ => false,
        }
    }

    fn can_browse(identity: &Identity, land: &Land, sections: &[LandSection]) -> bool {
        let reviewer = Self::reviews_any(identity, sections);
        match land.status {
            LandStatus::Published | LandStatus::InterestLocked | LandStatus::Rtb => {
                match land.visibility {
                    Visibility::Public => true,
                    Visibility::InvestorsOnly => Self::is_investor(identity) || reviewer,
                    Visibility::Private => reviewer,
                }
            }
            LandStatus::Submitted | LandStatus::UnderReview | LandStatus::Approved => reviewer,
            LandStatus::Draft | LandStatus::Rejected => false,
        }
    }

    pub fn require(
        identity: &Identity,
        action: Action,
        subject: Subject<'_>,
    ) -> Result<(), WorkflowError> {
        if Self::can(identity, action, subject) {
            Ok(())
        } else {
            debug!(
                user_id = %identity.user_id,
                action = action.as_str(),
                "Authorization denied"
            );
            Err(WorkflowError::forbidden(format!(
                "user {} may not {}",
                identity.user_id,
                action.as_str()
            )))
        }
    }
}
