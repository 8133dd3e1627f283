use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{LandId, LandStatus, UnknownStatus, UserId};
use crate::catalog::Catalog;
use crate::error::{Blocker, WorkflowError};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Who may see a listing once it is published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Private,
    InvestorsOnly,
    #[default]
    Public,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::InvestorsOnly => "investors_only",
            Visibility::Public => "public",
        }
    }

    pub fn admits_investors(&self) -> bool {
        !matches!(self, Visibility::Private)
    }
}

impl FromStr for Visibility {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "private" => Ok(Visibility::Private),
            "investors_only" => Ok(Visibility::InvestorsOnly),
            "public" => Ok(Visibility::Public),
            other => Err(UnknownStatus {
                kind: "visibility",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Commercial terms an administrator defines before publishing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommercialTerms {
    pub capacity_mw: Option<f64>,
    pub price_per_mwh: Option<f64>,
    pub contract_term_years: Option<u32>,
    pub developer_name: Option<String>,
    pub timeline_text: Option<String>,
}

impl CommercialTerms {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        positive("capacity_mw", self.capacity_mw)?;
        positive("price_per_mwh", self.price_per_mwh)?;
        if self.contract_term_years == Some(0) {
            return Err(WorkflowError::validation(
                "contract_term_years",
                "must be at least one year",
            ));
        }
        not_blank("developer_name", self.developer_name.as_deref())?;
        not_blank("timeline_text", self.timeline_text.as_deref())?;
        Ok(())
    }

    /// Overlay the fields present in `update`, leaving the rest untouched
    pub fn merge(&mut self, update: CommercialTerms) {
        if update.capacity_mw.is_some() {
            self.capacity_mw = update.capacity_mw;
        }
        if update.price_per_mwh.is_some() {
            self.price_per_mwh = update.price_per_mwh;
        }
        if update.contract_term_years.is_some() {
            self.contract_term_years = update.contract_term_years;
        }
        if update.developer_name.is_some() {
            self.developer_name = update.developer_name;
        }
        if update.timeline_text.is_some() {
            self.timeline_text = update.timeline_text;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Land {
    pub id: LandId,
    pub landowner_id: UserId,
    pub title: String,
    pub location_text: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub area_acres: Option<f64>,
    pub land_type: Option<String>,
    pub energy_type: Option<String>,
    pub terms: CommercialTerms,
    pub status: LandStatus,
    pub visibility: Visibility,
    pub admin_notes: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub interest_locked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Land {
    /// Every field a listing needs before it can be published, in display order
    pub fn missing_publish_fields(&self) -> Vec<Blocker> {
        let checks: [(&str, bool); 8] = [
            ("title", !self.title.trim().is_empty()),
            ("location_text", has_text(self.location_text.as_deref())),
            ("energy_type", self.energy_type.is_some()),
            ("capacity_mw", self.terms.capacity_mw.is_some()),
            ("price_per_mwh", self.terms.price_per_mwh.is_some()),
            ("timeline_text", has_text(self.terms.timeline_text.as_deref())),
            ("contract_term_years", self.terms.contract_term_years.is_some()),
            ("developer_name", has_text(self.terms.developer_name.as_deref())),
        ];

        checks
            .iter()
            .filter(|(_, present)| !present)
            .map(|(field, _)| Blocker::MissingField {
                field: field.to_string(),
            })
            .collect()
    }
}

/// Fields supplied by a landowner when drafting a listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandFields {
    pub title: String,
    pub location_text: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub area_acres: Option<f64>,
    pub land_type: Option<String>,
    pub energy_type: Option<String>,
    pub visibility: Option<Visibility>,
}

impl LandFields {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self, catalog: &Catalog) -> Result<(), WorkflowError> {
        if self.title.trim().is_empty() {
            return Err(WorkflowError::validation("title", "must not be empty"));
        }
        validate_details(
            self.coordinates,
            self.area_acres,
            self.energy_type.as_deref(),
            catalog,
        )
    }
}

/// Partial update of descriptive land fields; `None` leaves a field unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandPatch {
    pub title: Option<String>,
    pub location_text: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub area_acres: Option<f64>,
    pub land_type: Option<String>,
    pub energy_type: Option<String>,
    pub admin_notes: Option<String>,
}

impl LandPatch {
    pub fn validate(&self, catalog: &Catalog) -> Result<(), WorkflowError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(WorkflowError::validation("title", "must not be empty"));
            }
        }
        validate_details(
            self.coordinates,
            self.area_acres,
            self.energy_type.as_deref(),
            catalog,
        )
    }

    pub fn is_empty(&self) -> bool {
        *self == LandPatch::default()
    }

    pub fn apply_to(self, land: &mut Land) {
        if let Some(title) = self.title {
            land.title = title;
        }
        if self.location_text.is_some() {
            land.location_text = self.location_text;
        }
        if self.coordinates.is_some() {
            land.coordinates = self.coordinates;
        }
        if self.area_acres.is_some() {
            land.area_acres = self.area_acres;
        }
        if self.land_type.is_some() {
            land.land_type = self.land_type;
        }
        if self.energy_type.is_some() {
            land.energy_type = self.energy_type;
        }
        if self.admin_notes.is_some() {
            land.admin_notes = self.admin_notes;
        }
    }
}

fn validate_details(
    coordinates: Option<Coordinates>,
    area_acres: Option<f64>,
    energy_type: Option<&str>,
    catalog: &Catalog,
) -> Result<(), WorkflowError> {
    if let Some(Coordinates { lat, lng }) = coordinates {
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(WorkflowError::validation(
                "coordinates",
                format!("({lat}, {lng}) is outside the valid range"),
            ));
        }
    }
    positive("area_acres", area_acres)?;
    if let Some(energy) = energy_type {
        if !catalog.is_energy_type(energy) {
            return Err(WorkflowError::validation(
                "energy_type",
                format!("unknown energy type '{energy}'"),
            ));
        }
    }
    Ok(())
}

pub(crate) fn positive(field: &str, value: Option<f64>) -> Result<(), WorkflowError> {
    match value {
        Some(v) if !v.is_finite() || v <= 0.0 => Err(WorkflowError::validation(
            field,
            format!("must be a positive number, got {v}"),
        )),
        _ => Ok(()),
    }
}

fn not_blank(field: &str, value: Option<&str>) -> Result<(), WorkflowError> {
    match value {
        Some(v) if v.trim().is_empty() => {
            Err(WorkflowError::validation(field, "must not be blank"))
        }
        _ => Ok(()),
    }
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}
