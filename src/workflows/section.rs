// Section review: draft -> submitted -> approved | rejected

use tracing::info;

use super::{invalid_state, land, WorkflowContext};
use crate::authority::{Action, RoleAuthority, Subject};
use crate::domain::{
    LandAggregate, SectionAssignment, SectionContent, SectionDecision, SectionId,
};
use crate::error::WorkflowError;
use crate::events::{EventLog, WorkflowEvent};

/// Write section data and/or reviewer comments.
///
/// Data edits belong to the owner (while the section is a draft) and admins;
/// comments belong to the assigned reviewer and admins. A payload carrying
/// both needs both permissions.
pub fn update_content(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    section_id: SectionId,
    content: SectionContent,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    {
        let section = aggregate.section(section_id)?;
        let subject = Subject::Section {
            land: &aggregate.land,
            section,
        };
        if content.touches_data() {
            RoleAuthority::require(ctx.actor, Action::EditSectionData, subject)?;
        }
        if content.reviewer_comments.is_some() {
            RoleAuthority::require(ctx.actor, Action::EditSectionReview, subject)?;
        }
    }

    let section = aggregate.section_mut(section_id)?;
    if let Some(data) = content.data {
        section.data = data;
    }
    if content.reviewer_comments.is_some() {
        section.reviewer_comments = content.reviewer_comments;
    }
    section.updated_at = ctx.now;
    events.push(WorkflowEvent::SectionUpdated { section_id });
    Ok(())
}

pub fn assign(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    section_id: SectionId,
    assignment: SectionAssignment,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    let section = aggregate.section(section_id)?;
    RoleAuthority::require(
        ctx.actor,
        Action::AssignSection,
        Subject::Section {
            land: &aggregate.land,
            section,
        },
    )?;

    let section = aggregate.section_mut(section_id)?;
    if assignment.role.is_some() {
        section.assigned_role = assignment.role.clone();
    }
    if assignment.user.is_some() {
        section.assigned_user = assignment.user;
    }
    section.updated_at = ctx.now;

    events.push(WorkflowEvent::SectionAssigned {
        section_id,
        role: assignment.role,
        user: assignment.user,
    });
    Ok(())
}

/// Record a reviewer verdict and re-derive the land's review status
pub fn decide(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    section_id: SectionId,
    decision: SectionDecision,
    comments: Option<String>,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    let section = aggregate.section(section_id)?;
    RoleAuthority::require(
        ctx.actor,
        Action::DecideSection,
        Subject::Section {
            land: &aggregate.land,
            section,
        },
    )?;
    let transition = decision.transition();
    let next = section
        .status
        .apply(transition)
        .ok_or_else(|| invalid_state("section", section.status, transition.as_str()))?;

    let section = aggregate.section_mut(section_id)?;
    let from = section.status;
    section.status = next;
    match decision {
        SectionDecision::Approved => {
            section.approved_at = Some(ctx.now);
            section.rejected_at = None;
        }
        SectionDecision::Rejected => {
            section.rejected_at = Some(ctx.now);
            section.approved_at = None;
        }
    }
    if comments.is_some() {
        section.reviewer_comments = comments.clone();
    }
    section.updated_at = ctx.now;

    info!(
        section_id = %section_id,
        section_key = %section.section_key,
        decision = ?decision,
        reviewer = %ctx.actor.user_id,
        "Section decided"
    );

    events.push(WorkflowEvent::SectionStatusChanged {
        section_id,
        from,
        to: next,
    });
    events.push(WorkflowEvent::SectionDecided {
        section_id,
        decision,
        comments,
    });

    land::recompute_review_status(ctx, aggregate, events);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LandStatus, SectionStatus};
    use crate::error::ErrorKind;
    use crate::workflows::fixtures::*;
    use serde_json::json;

    fn data(key: &str, value: &str) -> SectionContent {
        let mut map = serde_json::Map::new();
        map.insert(key.to_string(), json!(value));
        SectionContent {
            data: Some(map),
            reviewer_comments: None,
        }
    }

    #[test]
    fn test_owner_edits_data_only_while_draft() {
        let env = TestEnv::new();
        let owner = landowner();
        let mut aggregate = env.draft_land(&owner);
        let section_id = aggregate.sections[0].id;
        let mut events = env.log(&aggregate, &owner);

        update_content(
            &env.ctx(&owner),
            &mut aggregate,
            section_id,
            data("parcel", "14"),
            &mut events,
        )
        .unwrap();
        assert_eq!(aggregate.sections[0].data["parcel"], json!("14"));

        let mut aggregate = env.submitted_land(&owner);
        let section_id = aggregate.sections[0].id;
        let err = update_content(
            &env.ctx(&owner),
            &mut aggregate,
            section_id,
            data("parcel", "15"),
            &mut events,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_reviewer_writes_comments_but_not_data() {
        let env = TestEnv::new();
        let mut aggregate = env.submitted_land(&landowner());
        let engineer = staff("engineer");
        let section_id = aggregate
            .sections
            .iter()
            .find(|s| s.section_key == "technical_specs")
            .unwrap()
            .id;
        let mut events = env.log(&aggregate, &engineer);

        let comments = SectionContent {
            data: None,
            reviewer_comments: Some("inverter specs missing".to_string()),
        };
        update_content(&env.ctx(&engineer), &mut aggregate, section_id, comments, &mut events)
            .unwrap();

        let err = update_content(
            &env.ctx(&engineer),
            &mut aggregate,
            section_id,
            data("inverter", "SMA"),
            &mut events,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_assign_is_admin_only_and_keeps_status() {
        let env = TestEnv::new();
        let owner = landowner();
        let mut aggregate = env.submitted_land(&owner);
        let section_id = aggregate.sections[1].id;
        let specialist = staff("legal_advisor");
        let assignment = SectionAssignment {
            role: Some("legal_advisor".to_string()),
            user: Some(specialist.user_id),
        };
        let mut events = env.log(&aggregate, &owner);

        let err = assign(
            &env.ctx(&owner),
            &mut aggregate,
            section_id,
            assignment.clone(),
            &mut events,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        assign(&env.ctx(&admin()), &mut aggregate, section_id, assignment, &mut events).unwrap();
        let section = aggregate.section(section_id).unwrap();
        assert_eq!(section.assigned_user, Some(specialist.user_id));
        assert_eq!(section.status, SectionStatus::Submitted);
    }

    #[test]
    fn test_decide_requires_assignment() {
        let env = TestEnv::new();
        let mut aggregate = env.submitted_land(&landowner());
        let section_id = aggregate.sections[0].id;
        let engineer = staff("engineer");
        let mut events = env.log(&aggregate, &engineer);

        // basic_info routes to the reviewer role
        let err = decide(
            &env.ctx(&engineer),
            &mut aggregate,
            section_id,
            SectionDecision::Approved,
            None,
            &mut events,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_decide_stamps_are_exclusive() {
        let env = TestEnv::new();
        let mut aggregate = env.submitted_land(&landowner());
        let section_id = aggregate.sections[0].id;
        let reviewer = staff("reviewer");
        let mut events = env.log(&aggregate, &reviewer);

        decide(
            &env.ctx(&reviewer),
            &mut aggregate,
            section_id,
            SectionDecision::Rejected,
            Some("boundary survey is outdated".to_string()),
            &mut events,
        )
        .unwrap();

        let section = aggregate.section(section_id).unwrap();
        assert_eq!(section.status, SectionStatus::Rejected);
        assert_eq!(section.rejected_at, Some(env.now));
        assert_eq!(section.approved_at, None);
        assert_eq!(
            section.reviewer_comments.as_deref(),
            Some("boundary survey is outdated")
        );
        assert_eq!(aggregate.land.status, LandStatus::UnderReview);
    }

    #[test]
    fn test_second_decision_is_invalid_state() {
        let env = TestEnv::new();
        let mut aggregate = env.submitted_land(&landowner());
        let section_id = aggregate.sections[0].id;
        let reviewer = staff("reviewer");
        let mut events = env.log(&aggregate, &reviewer);

        decide(
            &env.ctx(&reviewer),
            &mut aggregate,
            section_id,
            SectionDecision::Approved,
            None,
            &mut events,
        )
        .unwrap();
        let err = decide(
            &env.ctx(&reviewer),
            &mut aggregate,
            section_id,
            SectionDecision::Approved,
            None,
            &mut events,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_decide_on_draft_section_is_invalid_state() {
        let env = TestEnv::new();
        let mut aggregate = env.draft_land(&landowner());
        let section_id = aggregate.sections[0].id;
        let admin = admin();
        let mut events = env.log(&aggregate, &admin);

        let err = decide(
            &env.ctx(&admin),
            &mut aggregate,
            section_id,
            SectionDecision::Approved,
            None,
            &mut events,
        )
        .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_last_approval_promotes_land() {
        let env = TestEnv::new();
        let mut aggregate = env.submitted_land(&landowner());
        let admin = admin();
        let ids: Vec<SectionId> = aggregate.sections.iter().map(|s| s.id).collect();
        let mut events = env.log(&aggregate, &admin);

        let (last, rest) = ids.split_last().unwrap();
        for id in rest {
            decide(
                &env.ctx(&admin),
                &mut aggregate,
                *id,
                SectionDecision::Approved,
                None,
                &mut events,
            )
            .unwrap();
            assert_eq!(aggregate.land.status, LandStatus::UnderReview);
        }
        decide(
            &env.ctx(&admin),
            &mut aggregate,
            *last,
            SectionDecision::Approved,
            None,
            &mut events,
        )
        .unwrap();
        assert_eq!(aggregate.land.status, LandStatus::Approved);
    }
}
