mod config;
mod rules;
mod summary;

pub use config::{EligibilityRule, DEFAULT_MINIMUM_MONTHS_ON_ART};
pub use summary::EligibilitySummary;

use super::domain::{ArtStartDates, Cohort, EligibilityMap, LastObservations, Observation, PatientId};
use chrono::NaiveDateTime;

/// Stateless evaluator deciding whether each patient has been on ART long enough
/// as of their last viral-load result.
///
/// Every cohort member receives exactly one entry. Missing ART start dates or
/// viral-load results classify the patient as not eligible.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnArtEvaluator {
    rule: EligibilityRule,
}

impl OnArtEvaluator {
    pub fn new(rule: EligibilityRule) -> Self {
        Self { rule }
    }

    pub fn rule(&self) -> &EligibilityRule {
        &self.rule
    }

    /// Earliest last-viral-load instant that qualifies for the given ART start.
    pub fn threshold(&self, art_start: NaiveDateTime) -> Option<NaiveDateTime> {
        rules::eligibility_threshold(art_start, &self.rule)
    }

    pub fn is_eligible(
        &self,
        art_start: Option<NaiveDateTime>,
        last_viral_load: Option<&Observation>,
    ) -> bool {
        self.is_eligible_on(
            art_start,
            last_viral_load.map(|observation| observation.obs_datetime),
        )
    }

    /// Date-only form of [`OnArtEvaluator::is_eligible`].
    pub fn is_eligible_on(
        &self,
        art_start: Option<NaiveDateTime>,
        last_viral_load_date: Option<NaiveDateTime>,
    ) -> bool {
        rules::on_art_long_enough(art_start, last_viral_load_date, &self.rule)
    }

    pub fn evaluate(
        &self,
        cohort: &Cohort,
        art_start_dates: &ArtStartDates,
        last_viral_loads: &LastObservations,
    ) -> EligibilityMap {
        cohort
            .iter()
            .map(|patient_id| {
                (
                    *patient_id,
                    self.classify(patient_id, art_start_dates, last_viral_loads),
                )
            })
            .collect()
    }

    /// Same result as [`OnArtEvaluator::evaluate`], spread across the rayon pool.
    #[cfg(feature = "parallel")]
    pub fn evaluate_parallel(
        &self,
        cohort: &Cohort,
        art_start_dates: &ArtStartDates,
        last_viral_loads: &LastObservations,
    ) -> EligibilityMap {
        use rayon::prelude::*;

        cohort
            .members()
            .par_iter()
            .map(|patient_id| {
                (
                    *patient_id,
                    self.classify(patient_id, art_start_dates, last_viral_loads),
                )
            })
            .collect()
    }

    fn classify(
        &self,
        patient_id: &PatientId,
        art_start_dates: &ArtStartDates,
        last_viral_loads: &LastObservations,
    ) -> bool {
        let art_start = art_start_dates.get(patient_id).copied().flatten();
        let last_viral_load = last_viral_loads.get(patient_id).and_then(Option::as_ref);
        self.is_eligible(art_start, last_viral_load)
    }
}
