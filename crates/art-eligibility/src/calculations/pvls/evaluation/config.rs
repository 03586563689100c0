use serde::{Deserialize, Serialize};

pub const DEFAULT_MINIMUM_MONTHS_ON_ART: u32 = 3;

/// How long a patient must have been on ART by their last viral load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityRule {
    pub minimum_months_on_art: u32,
}

impl Default for EligibilityRule {
    fn default() -> Self {
        Self {
            minimum_months_on_art: DEFAULT_MINIMUM_MONTHS_ON_ART,
        }
    }
}
