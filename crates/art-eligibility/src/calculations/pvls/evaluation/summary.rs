use super::super::domain::EligibilityMap;
use serde::Serialize;

/// Headline counts over one evaluation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct EligibilitySummary {
    pub evaluated: usize,
    pub eligible: usize,
    pub not_eligible: usize,
}

impl EligibilitySummary {
    pub fn from_results(results: &EligibilityMap) -> Self {
        let eligible = results.values().filter(|eligible| **eligible).count();
        Self {
            evaluated: results.len(),
            eligible,
            not_eligible: results.len() - eligible,
        }
    }
}
