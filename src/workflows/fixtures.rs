// Shared builders for workflow unit tests

use chrono::{DateTime, TimeZone, Utc};

use super::{land, WorkflowContext};
use crate::catalog::Catalog;
use crate::config::WorkflowPolicy;
use crate::domain::{
    CommercialTerms, Identity, LandAggregate, LandFields, LandStatus, SectionStatus, UserId,
};
use crate::events::EventLog;

pub fn admin() -> Identity {
    Identity::new(UserId::new(), ["administrator"])
}

pub fn landowner() -> Identity {
    Identity::new(UserId::new(), ["landowner"])
}

pub fn investor() -> Identity {
    Identity::new(UserId::new(), ["investor"])
}

pub fn staff(role: &str) -> Identity {
    Identity::new(UserId::new(), [role])
}

pub fn complete_terms() -> CommercialTerms {
    CommercialTerms {
        capacity_mw: Some(50.0),
        price_per_mwh: Some(42.5),
        contract_term_years: Some(20),
        developer_name: Some("Northwind Renewables".to_string()),
        timeline_text: Some("Construction Q3, energised Q2 next year".to_string()),
    }
}

pub struct TestEnv {
    pub catalog: Catalog,
    pub policy: WorkflowPolicy,
    pub now: DateTime<Utc>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            catalog: Catalog::default(),
            policy: WorkflowPolicy::default(),
            now: Utc.with_ymd_and_hms(2025, 3, 14, 9, 30, 0).unwrap(),
        }
    }

    pub fn ctx<'a>(&'a self, actor: &'a Identity) -> WorkflowContext<'a> {
        WorkflowContext {
            actor,
            catalog: &self.catalog,
            policy: &self.policy,
            correlation_id: "test-correlation",
            now: self.now,
        }
    }

    pub fn log(&self, aggregate: &LandAggregate, actor: &Identity) -> EventLog {
        EventLog::new(aggregate.land.id, actor.user_id, "test-correlation", self.now)
    }

    pub fn draft_land(&self, owner: &Identity) -> LandAggregate {
        let mut fields = LandFields::new("Hilltop solar site");
        fields.location_text = Some("North ridge, parcel 14".to_string());
        fields.energy_type = Some("solar".to_string());
        fields.area_acres = Some(120.0);
        let (aggregate, _) = land::create(&self.ctx(owner), fields).unwrap();
        aggregate
    }

    pub fn submitted_land(&self, owner: &Identity) -> LandAggregate {
        let mut aggregate = self.draft_land(owner);
        let mut events = self.log(&aggregate, owner);
        land::submit(&self.ctx(owner), &mut aggregate, &mut events).unwrap();
        aggregate
    }

    /// Every section approved and the land in `approved`, without terms
    pub fn approved_land(&self, owner: &Identity) -> LandAggregate {
        let mut aggregate = self.submitted_land(owner);
        for section in &mut aggregate.sections {
            section.status = SectionStatus::Approved;
            section.approved_at = Some(self.now);
        }
        aggregate.land.status = LandStatus::Approved;
        aggregate
    }

    pub fn published_land(&self, owner: &Identity) -> LandAggregate {
        let mut aggregate = self.approved_land(owner);
        aggregate.land.terms = complete_terms();
        aggregate.land.status = LandStatus::Published;
        aggregate.land.published_at = Some(self.now);
        aggregate
    }
}
