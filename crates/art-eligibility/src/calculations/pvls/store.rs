//! In-memory collaborators backing the CLI, the HTTP service and tests.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use super::domain::{
    ArtStartDates, Cohort, HivMetadata, LastObservations, Observation, PatientId,
};
use super::providers::{
    ArtStartDateProvider, CalculationContext, LastObservationQuery, LastObservationRequest,
    MetadataResolver, ProviderError,
};

/// Table of known ART initiation dates.
#[derive(Debug, Clone, Default)]
pub struct InMemoryArtStartDates {
    dates: HashMap<PatientId, NaiveDateTime>,
}

impl InMemoryArtStartDates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, patient_id: PatientId, art_start: NaiveDateTime) {
        self.dates.insert(patient_id, art_start);
    }

    pub fn get(&self, patient_id: &PatientId) -> Option<NaiveDateTime> {
        self.dates.get(patient_id).copied()
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

impl FromIterator<(PatientId, NaiveDateTime)> for InMemoryArtStartDates {
    fn from_iter<I: IntoIterator<Item = (PatientId, NaiveDateTime)>>(iter: I) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

impl ArtStartDateProvider for InMemoryArtStartDates {
    fn art_start_dates(
        &self,
        cohort: &Cohort,
        _context: &CalculationContext,
    ) -> Result<ArtStartDates, ProviderError> {
        Ok(cohort
            .iter()
            .map(|patient_id| (*patient_id, self.get(patient_id)))
            .collect())
    }
}

/// Flat list of recorded observations.
#[derive(Debug, Clone, Default)]
pub struct InMemoryObservationStore {
    observations: Vec<Observation>,
}

impl InMemoryObservationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, observation: Observation) {
        self.observations.push(observation);
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    fn matches(request: &LastObservationRequest, observation: &Observation) -> bool {
        observation.concept == request.concept
            && request.encounter_types.contains(&observation.encounter_type)
            && request
                .location
                .as_ref()
                .map_or(true, |location| observation.location.as_ref() == Some(location))
            && request.from <= observation.obs_datetime
            && observation.obs_datetime <= request.to
    }
}

impl FromIterator<Observation> for InMemoryObservationStore {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self {
            observations: iter.into_iter().collect(),
        }
    }
}

impl LastObservationQuery for InMemoryObservationStore {
    fn last_observations(
        &self,
        request: &LastObservationRequest,
        cohort: &Cohort,
    ) -> Result<LastObservations, ProviderError> {
        let mut latest: LastObservations = cohort
            .iter()
            .map(|patient_id| (*patient_id, None))
            .collect();

        for observation in &self.observations {
            if !cohort.contains(&observation.person_id) || !Self::matches(request, observation) {
                continue;
            }

            let slot = latest.entry(observation.person_id).or_insert(None);
            // Ties keep the observation recorded first.
            let newer = slot
                .as_ref()
                .map_or(true, |current| observation.obs_datetime > current.obs_datetime);
            if newer {
                *slot = Some(observation.clone());
            }
        }

        Ok(latest)
    }
}

/// Resolver returning metadata fixed at start-up.
#[derive(Debug, Clone)]
pub struct StaticMetadataResolver {
    metadata: HivMetadata,
}

impl StaticMetadataResolver {
    pub fn new(metadata: HivMetadata) -> Self {
        Self { metadata }
    }
}

impl MetadataResolver for StaticMetadataResolver {
    fn hiv_metadata(&self) -> Result<HivMetadata, ProviderError> {
        Ok(self.metadata.clone())
    }
}
