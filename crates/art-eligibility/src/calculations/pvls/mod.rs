//! "On ART for more than X months" eligibility used by the PVLS indicators.
//!
//! A patient qualifies when their most recent viral-load result inside the
//! lookback window is dated on or after their ART start date plus the
//! configured number of calendar months. The evaluator is pure; data access
//! goes through the collaborator traits in [`providers`], which the
//! [`OnArtForMoreThanMonthsCalculation`] service receives explicitly.

pub mod calendar;
pub mod domain;
pub mod evaluation;
pub mod import;
pub mod providers;
pub mod router;
pub mod service;
pub mod store;
pub mod window;

#[cfg(test)]
mod tests;

pub use domain::{
    ArtStartDates, Cohort, ConceptRef, EligibilityMap, EncounterTypeRef, HivMetadata,
    LastObservations, LocationRef, ObsValue, Observation, PatientId,
};
pub use evaluation::{EligibilityRule, EligibilitySummary, OnArtEvaluator};
pub use import::{ClinicalDataset, ImportError};
pub use providers::{
    ArtStartDateProvider, CalculationContext, LastObservationQuery, LastObservationRequest,
    MetadataResolver, ProviderError,
};
pub use router::{on_art_router, EvaluateRequest, EvaluateResponse, PatientEligibilityView};
pub use service::{
    CalculationError, CalculationOutcome, EligibilityConfig, OnArtForMoreThanMonthsCalculation,
};
pub use store::{InMemoryArtStartDates, InMemoryObservationStore, StaticMetadataResolver};
pub use window::{EvaluationWindow, WindowError};
