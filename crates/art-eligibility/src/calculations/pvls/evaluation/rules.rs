use super::super::calendar::add_months;
use super::config::EligibilityRule;
use chrono::NaiveDateTime;

/// Earliest viral-load instant that counts for a patient who started ART at `art_start`.
pub(crate) fn eligibility_threshold(
    art_start: NaiveDateTime,
    rule: &EligibilityRule,
) -> Option<NaiveDateTime> {
    let months = i32::try_from(rule.minimum_months_on_art).ok()?;
    add_months(art_start, months)
}

pub(crate) fn on_art_long_enough(
    art_start: Option<NaiveDateTime>,
    last_viral_load: Option<NaiveDateTime>,
    rule: &EligibilityRule,
) -> bool {
    let (Some(art_start), Some(last_viral_load)) = (art_start, last_viral_load) else {
        return false;
    };

    // Inclusive: a result on the anniversary itself qualifies.
    eligibility_threshold(art_start, rule)
        .is_some_and(|threshold| last_viral_load >= threshold)
}
