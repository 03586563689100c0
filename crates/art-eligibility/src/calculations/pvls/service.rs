use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{ArtStartDates, Cohort, EligibilityMap, LastObservations};
use super::evaluation::{
    EligibilityRule, EligibilitySummary, OnArtEvaluator, DEFAULT_MINIMUM_MONTHS_ON_ART,
};
use super::providers::{
    ArtStartDateProvider, CalculationContext, LastObservationQuery, LastObservationRequest,
    MetadataResolver, ProviderError,
};
use super::window::{EvaluationWindow, WindowError, DEFAULT_LOOKBACK_MONTHS};

/// Tunables for one deployment of the calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityConfig {
    pub minimum_months_on_art: u32,
    pub lookback_months: u32,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            minimum_months_on_art: DEFAULT_MINIMUM_MONTHS_ON_ART,
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
        }
    }
}

impl EligibilityConfig {
    pub fn rule(&self) -> EligibilityRule {
        EligibilityRule {
            minimum_months_on_art: self.minimum_months_on_art,
        }
    }
}

/// Results of one pass plus the window the viral loads were searched in.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationOutcome {
    pub window: EvaluationWindow,
    pub results: EligibilityMap,
}

impl CalculationOutcome {
    pub fn summary(&self) -> EligibilitySummary {
        EligibilitySummary::from_results(&self.results)
    }
}

/// Composes the metadata, ART start date and viral-load collaborators with the evaluator.
pub struct OnArtForMoreThanMonthsCalculation<S, Q, M> {
    art_start_dates: Arc<S>,
    observations: Arc<Q>,
    metadata: Arc<M>,
    config: EligibilityConfig,
    evaluator: OnArtEvaluator,
}

impl<S, Q, M> OnArtForMoreThanMonthsCalculation<S, Q, M>
where
    S: ArtStartDateProvider + 'static,
    Q: LastObservationQuery + 'static,
    M: MetadataResolver + 'static,
{
    pub fn new(
        art_start_dates: Arc<S>,
        observations: Arc<Q>,
        metadata: Arc<M>,
        config: EligibilityConfig,
    ) -> Self {
        Self {
            art_start_dates,
            observations,
            metadata,
            evaluator: OnArtEvaluator::new(config.rule()),
            config,
        }
    }

    pub fn config(&self) -> &EligibilityConfig {
        &self.config
    }

    /// Classify every cohort member. Any collaborator failure fails the whole batch.
    pub fn evaluate(
        &self,
        cohort: &Cohort,
        context: &CalculationContext,
    ) -> Result<CalculationOutcome, CalculationError> {
        let metadata = self.metadata.hiv_metadata()?;
        let window = EvaluationWindow::lookback(context.now, self.config.lookback_months)?;

        let art_start_dates = self.art_start_dates.art_start_dates(cohort, context)?;
        let request = LastObservationRequest {
            encounter_types: metadata.viral_load_encounter_types(),
            concept: metadata.viral_load_concept.clone(),
            location: context.location.clone(),
            from: window.start,
            to: window.end,
        };
        let last_viral_loads = self.observations.last_observations(&request, cohort)?;

        debug!(
            cohort = cohort.len(),
            art_start_dates = art_start_dates.values().filter(|date| date.is_some()).count(),
            viral_loads = last_viral_loads.values().filter(|obs| obs.is_some()).count(),
            "collaborator data fetched"
        );

        let results = self.run_evaluator(cohort, &art_start_dates, &last_viral_loads);
        let outcome = CalculationOutcome { window, results };
        let summary = outcome.summary();

        info!(
            evaluated = summary.evaluated,
            eligible = summary.eligible,
            window_start = %window.start,
            window_end = %window.end,
            minimum_months_on_art = self.config.minimum_months_on_art,
            "on-art eligibility evaluated"
        );

        Ok(outcome)
    }

    #[cfg(feature = "parallel")]
    fn run_evaluator(
        &self,
        cohort: &Cohort,
        art_start_dates: &ArtStartDates,
        last_viral_loads: &LastObservations,
    ) -> EligibilityMap {
        self.evaluator
            .evaluate_parallel(cohort, art_start_dates, last_viral_loads)
    }

    #[cfg(not(feature = "parallel"))]
    fn run_evaluator(
        &self,
        cohort: &Cohort,
        art_start_dates: &ArtStartDates,
        last_viral_loads: &LastObservations,
    ) -> EligibilityMap {
        self.evaluator
            .evaluate(cohort, art_start_dates, last_viral_loads)
    }
}

/// Error raised when a calculation pass cannot be completed.
#[derive(Debug, thiserror::Error)]
pub enum CalculationError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error(transparent)]
    Window(#[from] WindowError),
}
