// Shared setup for the engine integration tests
#![allow(dead_code)]

use std::sync::Arc;

use landflow::domain::{
    CommercialTerms, Identity, LandAggregate, LandFields, LandId, SectionDecision, UserId,
};
use landflow::{Catalog, MemoryLandStore, WorkflowEngine, WorkflowPolicy};

pub fn engine() -> WorkflowEngine {
    engine_with_policy(WorkflowPolicy::default())
}

pub fn engine_with_policy(policy: WorkflowPolicy) -> WorkflowEngine {
    WorkflowEngine::new(Arc::new(MemoryLandStore::new()), Catalog::default(), policy).unwrap()
}

pub fn admin() -> Identity {
    Identity::new(UserId::new(), ["administrator"])
}

pub fn landowner() -> Identity {
    Identity::new(UserId::new(), ["landowner"])
}

pub fn investor() -> Identity {
    Identity::new(UserId::new(), ["investor"])
}

/// Holds every default reviewer role of the catalog
pub fn review_board() -> Identity {
    Identity::new(
        UserId::new(),
        [
            "reviewer",
            "engineer",
            "environmental_specialist",
            "legal_advisor",
        ],
    )
}

pub fn listing_fields() -> LandFields {
    let mut fields = LandFields::new("Mesa Verde wind corridor");
    fields.location_text = Some("County road 9, lots 3-7".to_string());
    fields.energy_type = Some("wind".to_string());
    fields.area_acres = Some(340.0);
    fields
}

pub fn complete_terms() -> CommercialTerms {
    CommercialTerms {
        capacity_mw: Some(80.0),
        price_per_mwh: Some(38.0),
        contract_term_years: Some(25),
        developer_name: Some("Prairie Power Partners".to_string()),
        timeline_text: Some("Permits 2026, commissioning 2028".to_string()),
    }
}

pub async fn submitted_land(engine: &WorkflowEngine, owner: &Identity) -> LandId {
    let land_id = engine.create_land(owner, listing_fields()).await.unwrap();
    engine.submit_land(owner, land_id).await.unwrap();
    land_id
}

pub async fn approved_land(engine: &WorkflowEngine, owner: &Identity) -> LandId {
    let land_id = submitted_land(engine, owner).await;
    let board = review_board();
    for section in snapshot(engine, land_id).await.sections {
        engine
            .decide_section(&board, section.id, SectionDecision::Approved, None)
            .await
            .unwrap();
    }
    land_id
}

pub async fn published_land(engine: &WorkflowEngine, owner: &Identity) -> LandId {
    let land_id = approved_land(engine, owner).await;
    let admin = admin();
    engine
        .define_commercial_terms(&admin, land_id, complete_terms())
        .await
        .unwrap();
    engine.publish_land(&admin, land_id).await.unwrap();
    land_id
}

/// Full aggregate as an administrator sees it
pub async fn snapshot(engine: &WorkflowEngine, land_id: LandId) -> LandAggregate {
    engine.land(&admin(), land_id).await.unwrap()
}
