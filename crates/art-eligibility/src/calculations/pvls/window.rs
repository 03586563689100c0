use super::calendar::add_months;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOOKBACK_MONTHS: u32 = 12;

/// Inclusive `[start, end]` range the last viral load is searched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl EvaluationWindow {
    /// Window ending at `now` and starting `months` calendar months earlier.
    pub fn lookback(now: NaiveDateTime, months: u32) -> Result<Self, WindowError> {
        let shift = i32::try_from(months).map_err(|_| WindowError::OutOfRange { months })?;
        let start = add_months(now, -shift).ok_or(WindowError::OutOfRange { months })?;
        Ok(Self { start, end: now })
    }

    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WindowError {
    #[error("lookback of {months} months falls outside the supported date range")]
    OutOfRange { months: u32 },
}
