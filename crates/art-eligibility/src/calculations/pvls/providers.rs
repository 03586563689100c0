use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::domain::{
    ArtStartDates, Cohort, ConceptRef, EncounterTypeRef, HivMetadata, LastObservations,
    LocationRef,
};

/// Ambient values a calculation pass is evaluated against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationContext {
    pub now: NaiveDateTime,
    #[serde(default)]
    pub location: Option<LocationRef>,
}

impl CalculationContext {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            location: None,
        }
    }

    pub fn at_location(mut self, location: LocationRef) -> Self {
        self.location = Some(location);
        self
    }
}

/// Scope of a "most recent observation" lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LastObservationRequest {
    pub encounter_types: Vec<EncounterTypeRef>,
    pub concept: ConceptRef,
    pub location: Option<LocationRef>,
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

/// Source of each patient's ART initiation date.
pub trait ArtStartDateProvider: Send + Sync {
    fn art_start_dates(
        &self,
        cohort: &Cohort,
        context: &CalculationContext,
    ) -> Result<ArtStartDates, ProviderError>;
}

/// Query returning the latest matching observation per patient within `[from, to]`.
pub trait LastObservationQuery: Send + Sync {
    fn last_observations(
        &self,
        request: &LastObservationRequest,
        cohort: &Cohort,
    ) -> Result<LastObservations, ProviderError>;
}

/// Lookup of the concepts and encounter types the calculation is scoped by.
pub trait MetadataResolver: Send + Sync {
    fn hiv_metadata(&self) -> Result<HivMetadata, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("metadata not resolvable: {0}")]
    MissingMetadata(String),
    #[error("data source unavailable: {0}")]
    Unavailable(String),
}
