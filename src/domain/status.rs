// Status enums and their transition tables.
//
// Each machine answers `(current status, transition) -> next status` in one
// place; workflows never compare statuses ad hoc to decide legality.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} status '{value}'")]
pub struct UnknownStatus {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! status_enum {
    ($(#[$meta:meta])* $name:ident, $kind:literal { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownStatus;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(UnknownStatus { kind: $kind, value: other.to_string() }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

status_enum!(
    /// Lifecycle of a land listing
    LandStatus, "land" {
        Draft => "draft",
        Submitted => "submitted",
        UnderReview => "under_review",
        Approved => "approved",
        Published => "published",
        InterestLocked => "interest_locked",
        Rtb => "rtb",
        Rejected => "rejected",
    }
);

status_enum!(
    SectionStatus, "section" {
        Draft => "draft",
        Submitted => "submitted",
        Approved => "approved",
        Rejected => "rejected",
    }
);

status_enum!(
    TaskStatus, "task" {
        Assigned => "assigned",
        InProgress => "in_progress",
        Pending => "pending",
        Delayed => "delayed",
        Completed => "completed",
        Rejected => "rejected",
        OnHold => "on_hold",
    }
);

status_enum!(
    InterestStatus, "interest" {
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
        Withdrawn => "withdrawn",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandTransition {
    Submit,
    /// Section review started but not every section is approved
    SectionsPending,
    SectionsApproved,
    Reject,
    Publish,
    LockInterest,
    MarkReadyToBuild,
}

impl LandTransition {
    pub fn as_str(&self) -> &'static str {
        match self {
            LandTransition::Submit => "submit",
            LandTransition::SectionsPending => "review",
            LandTransition::SectionsApproved => "approve",
            LandTransition::Reject => "reject",
            LandTransition::Publish => "publish",
            LandTransition::LockInterest => "lock interest on",
            LandTransition::MarkReadyToBuild => "mark ready to build",
        }
    }
}

impl LandStatus {
    pub fn apply(self, transition: LandTransition) -> Option<LandStatus> {
        use LandStatus::*;
        use LandTransition::*;

        match (self, transition) {
            (Draft, Submit) => Some(Submitted),
            (Submitted | UnderReview, SectionsPending) => Some(UnderReview),
            (Submitted | UnderReview, SectionsApproved) => Some(Approved),
            (Submitted | UnderReview, Reject) => Some(Rejected),
            (Approved, Publish) => Some(Published),
            (Published, LockInterest) => Some(InterestLocked),
            (Submitted | UnderReview | Approved | Published | InterestLocked, MarkReadyToBuild) => {
                Some(Rtb)
            }
            _ => None,
        }
    }

    pub fn is_draft(&self) -> bool {
        matches!(self, LandStatus::Draft)
    }

    /// Section decisions only move the land while it is in review
    pub fn is_in_review(&self) -> bool {
        matches!(self, LandStatus::Submitted | LandStatus::UnderReview)
    }

    /// Open on the investor marketplace
    pub fn is_listed(&self) -> bool {
        matches!(
            self,
            LandStatus::Published | LandStatus::InterestLocked | LandStatus::Rtb
        )
    }

    /// Submitted at some point and not rejected, so reviewers work on it
    pub fn is_reviewable(&self) -> bool {
        !matches!(self, LandStatus::Draft | LandStatus::Rejected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionTransition {
    Submit,
    Approve,
    Reject,
}

impl SectionTransition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionTransition::Submit => "submit",
            SectionTransition::Approve => "approve",
            SectionTransition::Reject => "reject",
        }
    }
}

impl SectionStatus {
    pub fn apply(self, transition: SectionTransition) -> Option<SectionStatus> {
        match (self, transition) {
            (SectionStatus::Draft, SectionTransition::Submit) => Some(SectionStatus::Submitted),
            (SectionStatus::Submitted, SectionTransition::Approve) => Some(SectionStatus::Approved),
            (SectionStatus::Submitted, SectionTransition::Reject) => Some(SectionStatus::Rejected),
            _ => None,
        }
    }
}

/// Reviewer verdict on a submitted section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionDecision {
    Approved,
    Rejected,
}

impl SectionDecision {
    pub fn transition(&self) -> SectionTransition {
        match self {
            SectionDecision::Approved => SectionTransition::Approve,
            SectionDecision::Rejected => SectionTransition::Reject,
        }
    }
}

impl TaskStatus {
    /// Closed tasks no longer block ready-to-build and accept no further changes
    pub fn is_closed(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Rejected | TaskStatus::OnHold
        )
    }

    pub fn apply(self, next: TaskStatus) -> Option<TaskStatus> {
        if self.is_closed() {
            None
        } else {
            Some(next)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InterestTransition {
    Approve,
    Reject,
    Withdraw,
}

impl InterestTransition {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestTransition::Approve => "approve",
            InterestTransition::Reject => "reject",
            InterestTransition::Withdraw => "withdraw",
        }
    }
}

impl InterestStatus {
    pub fn apply(self, transition: InterestTransition) -> Option<InterestStatus> {
        match (self, transition) {
            (InterestStatus::Pending, InterestTransition::Approve) => Some(InterestStatus::Approved),
            (InterestStatus::Pending, InterestTransition::Reject) => Some(InterestStatus::Rejected),
            (InterestStatus::Pending, InterestTransition::Withdraw) => Some(InterestStatus::Withdrawn),
            _ => None,
        }
    }

    /// Active interests count against the one-per-investor-per-land rule
    pub fn is_active(&self) -> bool {
        !matches!(self, InterestStatus::Withdrawn)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestDecision {
    Approved,
    Rejected,
}

impl InterestDecision {
    pub fn transition(&self) -> InterestTransition {
        match self {
            InterestDecision::Approved => InterestTransition::Approve,
            InterestDecision::Rejected => InterestTransition::Reject,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_land_status_round_trips_through_text() {
        for status in LandStatus::ALL {
            assert_eq!(status.as_str().parse::<LandStatus>().unwrap(), *status);
        }
        let err = "investor_ready".parse::<LandStatus>().unwrap_err();
        assert_eq!(err.kind, "land");
    }

    #[test]
    fn test_land_transition_table() {
        assert_eq!(
            LandStatus::Draft.apply(LandTransition::Submit),
            Some(LandStatus::Submitted)
        );
        assert_eq!(LandStatus::Submitted.apply(LandTransition::Submit), None);
        assert_eq!(LandStatus::Draft.apply(LandTransition::Publish), None);
        assert_eq!(LandStatus::UnderReview.apply(LandTransition::Publish), None);
        assert_eq!(
            LandStatus::Approved.apply(LandTransition::Publish),
            Some(LandStatus::Published)
        );
        assert_eq!(
            LandStatus::UnderReview.apply(LandTransition::Reject),
            Some(LandStatus::Rejected)
        );
        assert_eq!(LandStatus::Published.apply(LandTransition::Reject), None);
        assert_eq!(LandStatus::Rtb.apply(LandTransition::MarkReadyToBuild), None);
        assert_eq!(LandStatus::Draft.apply(LandTransition::MarkReadyToBuild), None);
        assert_eq!(
            LandStatus::InterestLocked.apply(LandTransition::MarkReadyToBuild),
            Some(LandStatus::Rtb)
        );
    }

    #[test]
    fn test_section_decisions_only_from_submitted() {
        assert_eq!(
            SectionStatus::Submitted.apply(SectionDecision::Approved.transition()),
            Some(SectionStatus::Approved)
        );
        assert_eq!(
            SectionStatus::Approved.apply(SectionDecision::Approved.transition()),
            None
        );
        assert_eq!(
            SectionStatus::Draft.apply(SectionDecision::Rejected.transition()),
            None
        );
    }

    #[test]
    fn test_closed_tasks_are_frozen() {
        assert_eq!(
            TaskStatus::Delayed.apply(TaskStatus::Assigned),
            Some(TaskStatus::Assigned)
        );
        for closed in [TaskStatus::Completed, TaskStatus::Rejected, TaskStatus::OnHold] {
            assert!(closed.is_closed());
            assert_eq!(closed.apply(TaskStatus::InProgress), None);
        }
    }

    #[test]
    fn test_interest_terminal_states() {
        assert_eq!(
            InterestStatus::Pending.apply(InterestTransition::Withdraw),
            Some(InterestStatus::Withdrawn)
        );
        assert_eq!(InterestStatus::Approved.apply(InterestTransition::Withdraw), None);
        assert_eq!(InterestStatus::Withdrawn.apply(InterestTransition::Approve), None);
        assert!(!InterestStatus::Withdrawn.is_active());
        assert!(InterestStatus::Rejected.is_active());
    }
}
