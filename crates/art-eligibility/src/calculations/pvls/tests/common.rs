use std::sync::Arc;

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::calculations::pvls::domain::{
    ArtStartDates, Cohort, ConceptRef, EncounterTypeRef, HivMetadata, LastObservations,
    LocationRef, ObsValue, Observation, PatientId,
};
use crate::calculations::pvls::providers::{
    ArtStartDateProvider, CalculationContext, LastObservationQuery, LastObservationRequest,
    MetadataResolver, ProviderError,
};
use crate::calculations::pvls::service::{EligibilityConfig, OnArtForMoreThanMonthsCalculation};
use crate::calculations::pvls::store::{
    InMemoryArtStartDates, InMemoryObservationStore, StaticMetadataResolver,
};

pub(super) const CLINIC: &str = "clinic-maputo";

pub(super) fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .expect("valid date")
}

pub(super) fn patient(id: u64) -> PatientId {
    PatientId(id)
}

pub(super) fn cohort(ids: &[u64]) -> Cohort {
    ids.iter().copied().map(PatientId).collect()
}

pub(super) fn metadata() -> HivMetadata {
    HivMetadata {
        viral_load_concept: ConceptRef("856".to_string()),
        lab_encounter_type: EncounterTypeRef("13".to_string()),
        adult_followup_encounter_type: EncounterTypeRef("6".to_string()),
        child_followup_encounter_type: EncounterTypeRef("9".to_string()),
    }
}

pub(super) fn viral_load(id: u64, encounter_type: &str, obs_datetime: NaiveDateTime) -> Observation {
    Observation {
        person_id: PatientId(id),
        encounter_type: EncounterTypeRef(encounter_type.to_string()),
        concept: ConceptRef("856".to_string()),
        location: Some(LocationRef(CLINIC.to_string())),
        obs_datetime,
        value: Some(ObsValue::Numeric(40.0)),
    }
}

pub(super) fn art_starts(entries: &[(u64, Option<NaiveDateTime>)]) -> ArtStartDates {
    entries
        .iter()
        .map(|(id, date)| (PatientId(*id), *date))
        .collect()
}

pub(super) fn last_viral_loads(entries: &[(u64, Option<NaiveDateTime>)]) -> LastObservations {
    entries
        .iter()
        .map(|(id, date)| (PatientId(*id), date.map(|date| viral_load(*id, "13", date))))
        .collect()
}

pub(super) fn context() -> CalculationContext {
    CalculationContext::new(at(2021, 6, 30)).at_location(LocationRef(CLINIC.to_string()))
}

pub(super) type MemoryCalculation =
    OnArtForMoreThanMonthsCalculation<InMemoryArtStartDates, InMemoryObservationStore, StaticMetadataResolver>;

/// Five patients around a 2021-06-30 evaluation date:
/// 1 exactly on the anniversary, 2 a day short, 3 without ART start,
/// 4 without viral load, 5 with only an out-of-window result.
pub(super) fn build_service() -> MemoryCalculation {
    let art_start_dates: InMemoryArtStartDates = [
        (patient(1), at(2021, 1, 15)),
        (patient(2), at(2021, 1, 15)),
        (patient(4), at(2020, 1, 1)),
        (patient(5), at(2019, 1, 1)),
    ]
    .into_iter()
    .collect();

    let observations: InMemoryObservationStore = [
        viral_load(1, "13", at(2021, 4, 15)),
        viral_load(2, "6", at(2021, 4, 14)),
        viral_load(3, "9", at(2021, 5, 1)),
        viral_load(5, "13", at(2020, 6, 29)),
    ]
    .into_iter()
    .collect();

    OnArtForMoreThanMonthsCalculation::new(
        Arc::new(art_start_dates),
        Arc::new(observations),
        Arc::new(StaticMetadataResolver::new(metadata())),
        EligibilityConfig::default(),
    )
}

pub(super) struct UnavailableObservations;

impl LastObservationQuery for UnavailableObservations {
    fn last_observations(
        &self,
        _request: &LastObservationRequest,
        _cohort: &Cohort,
    ) -> Result<LastObservations, ProviderError> {
        Err(ProviderError::Unavailable("obs table locked".to_string()))
    }
}

pub(super) struct UnresolvableMetadata;

impl MetadataResolver for UnresolvableMetadata {
    fn hiv_metadata(&self) -> Result<HivMetadata, ProviderError> {
        Err(ProviderError::MissingMetadata("HIV viral load concept".to_string()))
    }
}

/// Records the request it was asked for and answers with nothing.
#[derive(Default)]
pub(super) struct RecordingObservations {
    pub(super) requests: std::sync::Mutex<Vec<LastObservationRequest>>,
}

impl LastObservationQuery for RecordingObservations {
    fn last_observations(
        &self,
        request: &LastObservationRequest,
        cohort: &Cohort,
    ) -> Result<LastObservations, ProviderError> {
        self.requests
            .lock()
            .expect("request mutex poisoned")
            .push(request.clone());
        Ok(cohort.iter().map(|patient_id| (*patient_id, None)).collect())
    }
}

pub(super) struct PanickingArtStartDates;

impl ArtStartDateProvider for PanickingArtStartDates {
    fn art_start_dates(
        &self,
        _cohort: &Cohort,
        _context: &CalculationContext,
    ) -> Result<ArtStartDates, ProviderError> {
        panic!("art start dates must not be fetched once metadata resolution fails")
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
