// Land lifecycle: draft -> submitted -> under_review -> approved -> published
// -> interest_locked -> rtb, with rejected reachable while in review.

use serde_json::Map;
use tracing::info;

use super::{invalid_state, WorkflowContext};
use crate::authority::{Action, RoleAuthority, Subject};
use crate::domain::{
    CommercialTerms, Land, LandAggregate, LandFields, LandId, LandPatch, LandSection,
    LandStatus, LandTransition, SectionId, SectionStatus, SectionTransition, Visibility,
};
use crate::error::{Blocker, WorkflowError};
use crate::events::{EventLog, WorkflowEvent};

/// Draft a new land and bootstrap one section per active definition
pub fn create(
    ctx: &WorkflowContext<'_>,
    fields: LandFields,
) -> Result<(LandAggregate, EventLog), WorkflowError> {
    RoleAuthority::require(ctx.actor, Action::CreateLand, Subject::Nothing)?;

    let land = Land {
        id: LandId::new(),
        landowner_id: ctx.actor.user_id,
        title: fields.title,
        location_text: fields.location_text,
        coordinates: fields.coordinates,
        area_acres: fields.area_acres,
        land_type: fields.land_type,
        energy_type: fields.energy_type,
        terms: CommercialTerms::default(),
        status: LandStatus::Draft,
        visibility: fields.visibility.unwrap_or(ctx.policy.default_visibility),
        admin_notes: None,
        published_at: None,
        interest_locked_at: None,
        created_at: ctx.now,
        updated_at: ctx.now,
    };

    let sections: Vec<LandSection> = ctx
        .catalog
        .active_sections()
        .map(|definition| LandSection {
            id: SectionId::new(),
            land_id: land.id,
            section_key: definition.key.clone(),
            status: SectionStatus::Draft,
            assigned_role: definition.default_role.clone(),
            assigned_user: None,
            data: Map::new(),
            reviewer_comments: None,
            submitted_at: None,
            approved_at: None,
            rejected_at: None,
            created_at: ctx.now,
            updated_at: ctx.now,
        })
        .collect();

    let mut events = EventLog::new(land.id, ctx.actor.user_id, ctx.correlation_id, ctx.now);
    events.push(WorkflowEvent::LandCreated {
        owner: land.landowner_id,
        sections: sections.len(),
    });

    info!(
        land_id = %land.id,
        owner = %land.landowner_id,
        sections = sections.len(),
        "Land drafted"
    );

    Ok((LandAggregate::new(land, sections), events))
}

pub fn update_details(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    patch: LandPatch,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    RoleAuthority::require(ctx.actor, Action::UpdateLand, Subject::Land(&aggregate.land))?;
    if patch.admin_notes.is_some() && !RoleAuthority::is_admin(ctx.actor) {
        return Err(WorkflowError::forbidden("only administrators write admin notes"));
    }

    patch.apply_to(&mut aggregate.land);
    aggregate.land.updated_at = ctx.now;
    events.push(WorkflowEvent::LandUpdated);
    Ok(())
}

/// Only drafts may be deleted; the caller removes the aggregate on success
pub fn delete(
    ctx: &WorkflowContext<'_>,
    aggregate: &LandAggregate,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    RoleAuthority::require(ctx.actor, Action::DeleteLand, Subject::Land(&aggregate.land))?;
    if !aggregate.land.status.is_draft() {
        return Err(invalid_state("land", aggregate.land.status, "delete"));
    }

    events.push(WorkflowEvent::LandDeleted);
    info!(land_id = %aggregate.land.id, "Draft land deleted");
    Ok(())
}

pub fn submit(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    RoleAuthority::require(ctx.actor, Action::SubmitLand, Subject::Land(&aggregate.land))?;
    let next = next_status(&aggregate.land, LandTransition::Submit)?;

    if ctx.policy.require_section_content {
        let empty: Vec<Blocker> = aggregate
            .sections
            .iter()
            .filter(|section| !section.has_content())
            .map(|section| Blocker::EmptySection {
                id: section.id,
                key: section.section_key.clone(),
            })
            .collect();
        if !empty.is_empty() {
            return Err(WorkflowError::precondition(
                "every section needs content before submission",
                empty,
            ));
        }
    }

    for section in &mut aggregate.sections {
        if let Some(submitted) = section.status.apply(SectionTransition::Submit) {
            events.push(WorkflowEvent::SectionStatusChanged {
                section_id: section.id,
                from: section.status,
                to: submitted,
            });
            section.status = submitted;
            section.submitted_at = Some(ctx.now);
            section.updated_at = ctx.now;
        }
    }

    set_status(ctx, aggregate, next, events);
    Ok(())
}

pub fn define_commercial_terms(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    terms: CommercialTerms,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    RoleAuthority::require(
        ctx.actor,
        Action::DefineCommercialTerms,
        Subject::Land(&aggregate.land),
    )?;
    if aggregate.land.status.is_draft() {
        return Err(invalid_state(
            "land",
            aggregate.land.status,
            "define commercial terms for",
        ));
    }

    aggregate.land.terms.merge(terms);
    aggregate.land.updated_at = ctx.now;
    events.push(WorkflowEvent::CommercialTermsDefined);
    Ok(())
}

pub fn publish(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    RoleAuthority::require(ctx.actor, Action::PublishLand, Subject::Land(&aggregate.land))?;
    let next = next_status(&aggregate.land, LandTransition::Publish)?;

    let missing = aggregate.land.missing_publish_fields();
    if !missing.is_empty() {
        return Err(WorkflowError::precondition(
            "listing is incomplete",
            missing,
        ));
    }

    aggregate.land.published_at = Some(ctx.now);
    set_status(ctx, aggregate, next, events);
    Ok(())
}

pub fn lock_interest(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    RoleAuthority::require(ctx.actor, Action::LockInterest, Subject::Land(&aggregate.land))?;
    let next = next_status(&aggregate.land, LandTransition::LockInterest)?;

    aggregate.land.interest_locked_at = Some(ctx.now);
    set_status(ctx, aggregate, next, events);
    Ok(())
}

pub fn mark_ready_to_build(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    RoleAuthority::require(
        ctx.actor,
        Action::MarkReadyToBuild,
        Subject::Land(&aggregate.land),
    )?;
    let next = next_status(&aggregate.land, LandTransition::MarkReadyToBuild)?;

    let open_sections = aggregate
        .sections
        .iter()
        .filter(|section| section.status != SectionStatus::Approved)
        .map(|section| Blocker::Section {
            id: section.id,
            key: section.section_key.clone(),
            status: section.status.to_string(),
        });
    let open_tasks = aggregate
        .tasks
        .iter()
        .filter(|task| !task.status.is_closed())
        .map(|task| Blocker::Task {
            id: task.id,
            title: task.title.clone(),
            status: task.status.to_string(),
        });
    let blockers: Vec<Blocker> = open_sections.chain(open_tasks).collect();
    if !blockers.is_empty() {
        return Err(WorkflowError::precondition(
            "sections must be approved and tasks closed",
            blockers,
        ));
    }

    set_status(ctx, aggregate, next, events);
    Ok(())
}

pub fn reject(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    reason: Option<String>,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    RoleAuthority::require(ctx.actor, Action::RejectLand, Subject::Land(&aggregate.land))?;
    let next = next_status(&aggregate.land, LandTransition::Reject)?;

    if reason.is_some() {
        aggregate.land.admin_notes = reason;
    }
    set_status(ctx, aggregate, next, events);
    Ok(())
}

pub fn set_visibility(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    visibility: Visibility,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    RoleAuthority::require(ctx.actor, Action::SetVisibility, Subject::Land(&aggregate.land))?;

    if aggregate.land.visibility != visibility {
        aggregate.land.visibility = visibility;
        aggregate.land.updated_at = ctx.now;
        events.push(WorkflowEvent::VisibilityChanged { visibility });
    }
    Ok(())
}

/// Re-derive the review status from the sections after a section decision.
///
/// Runs inside the same transaction as the decision, so the section statuses
/// read here are the ones being committed.
pub(crate) fn recompute_review_status(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    events: &mut EventLog,
) {
    if !aggregate.land.status.is_in_review() {
        return;
    }

    let transition = if aggregate.all_sections_approved() {
        LandTransition::SectionsApproved
    } else {
        LandTransition::SectionsPending
    };

    if let Some(next) = aggregate.land.status.apply(transition) {
        if next != aggregate.land.status {
            set_status(ctx, aggregate, next, events);
        }
    }
}

fn next_status(land: &Land, transition: LandTransition) -> Result<LandStatus, WorkflowError> {
    land.status
        .apply(transition)
        .ok_or_else(|| invalid_state("land", land.status, transition.as_str()))
}

fn set_status(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    next: LandStatus,
    events: &mut EventLog,
) {
    let from = aggregate.land.status;
    aggregate.land.status = next;
    aggregate.land.updated_at = ctx.now;
    events.push(WorkflowEvent::LandStatusChanged { from, to: next });

    info!(
        land_id = %aggregate.land.id,
        from = %from,
        to = %next,
        actor = %ctx.actor.user_id,
        "Land status changed"
    );
}
