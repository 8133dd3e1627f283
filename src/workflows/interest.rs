// Investor interest: pending -> approved | rejected | withdrawn

use tracing::info;

use super::{invalid_state, WorkflowContext};
use crate::authority::{Action, RoleAuthority, Subject};
use crate::domain::{
    InterestDecision, InterestId, InterestRequest, InterestStatus, InterestTransition,
    InvestorInterest, LandAggregate, LandStatus,
};
use crate::error::{Blocker, WorkflowError};
use crate::events::{EventLog, WorkflowEvent};

pub fn express(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    request: InterestRequest,
    events: &mut EventLog,
) -> Result<InterestId, WorkflowError> {
    RoleAuthority::require(ctx.actor, Action::ExpressInterest, Subject::Land(&aggregate.land))?;

    let land = &aggregate.land;
    let open = match land.status {
        LandStatus::Published => true,
        LandStatus::Rtb => ctx.policy.interest_on_ready_to_build,
        _ => false,
    };
    if !open {
        return Err(WorkflowError::precondition(
            format!("land {} is {} and not open for interest", land.id, land.status),
            vec![Blocker::Land {
                id: land.id,
                status: land.status.to_string(),
            }],
        ));
    }
    if !land.visibility.admits_investors() {
        return Err(WorkflowError::precondition(
            format!("land {} is private", land.id),
            vec![Blocker::Visibility {
                id: land.id,
                visibility: land.visibility.to_string(),
            }],
        ));
    }
    if let Some(existing) = aggregate.active_interest_of(ctx.actor.user_id) {
        return Err(WorkflowError::Conflict {
            reason: format!(
                "investor {} already has {} interest {} in land {}",
                ctx.actor.user_id, existing.status, existing.id, land.id
            ),
        });
    }

    let interest = InvestorInterest {
        id: InterestId::new(),
        land_id: land.id,
        investor_id: ctx.actor.user_id,
        investment_amount: request.investment_amount,
        message: request.message,
        status: InterestStatus::Pending,
        created_at: ctx.now,
        updated_at: ctx.now,
    };
    let interest_id = interest.id;
    info!(
        interest_id = %interest_id,
        land_id = %land.id,
        investor = %interest.investor_id,
        "Interest expressed"
    );
    aggregate.interests.push(interest);

    events.push(WorkflowEvent::InterestExpressed {
        interest_id,
        investor: ctx.actor.user_id,
    });
    Ok(interest_id)
}

pub fn decide(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    interest_id: InterestId,
    decision: InterestDecision,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    let interest = aggregate.interest(interest_id)?;
    RoleAuthority::require(
        ctx.actor,
        Action::DecideInterest,
        Subject::Interest {
            land: &aggregate.land,
            interest,
        },
    )?;

    transition(ctx, aggregate, interest_id, decision.transition(), events)?;
    events.push(WorkflowEvent::InterestDecided {
        interest_id,
        decision,
    });
    Ok(())
}

/// The row stays behind as `withdrawn` for the audit trail
pub fn withdraw(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    interest_id: InterestId,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    let interest = aggregate.interest(interest_id)?;
    RoleAuthority::require(
        ctx.actor,
        Action::WithdrawInterest,
        Subject::Interest {
            land: &aggregate.land,
            interest,
        },
    )?;

    transition(ctx, aggregate, interest_id, InterestTransition::Withdraw, events)
}

fn transition(
    ctx: &WorkflowContext<'_>,
    aggregate: &mut LandAggregate,
    interest_id: InterestId,
    transition: InterestTransition,
    events: &mut EventLog,
) -> Result<(), WorkflowError> {
    let interest = aggregate.interest_mut(interest_id)?;
    let from = interest.status;
    let to = from
        .apply(transition)
        .ok_or_else(|| invalid_state("interest", from, transition.as_str()))?;

    interest.status = to;
    interest.updated_at = ctx.now;
    info!(
        interest_id = %interest_id,
        from = %from,
        to = %to,
        actor = %ctx.actor.user_id,
        "Interest status changed"
    );
    events.push(WorkflowEvent::InterestStatusChanged {
        interest_id,
        from,
        to,
    });
    Ok(())
}
