//! Completeness score for normalized events.

use crate::domain::NormalizedEvent;
use crate::domain::template::ANONYMOUS_NAME;

const BASE: u32 = 20;
const NAME_BONUS: u32 = 20;
const EMAIL_BONUS: u32 = 15;
const LOCATION_BONUS: u32 = 15;
const RICH_DATA_BONUS: u32 = 10;
const RICH_DATA_MIN_KEYS: usize = 4;
// Every event is scored at normalization time, so it is always recent.
const RECENCY_BONUS: u32 = 20;

/// Computes the 0-100 quality score from the event's other fields.
///
/// Pure: events with the same field-presence pattern always score the same.
/// The current `quality_score` field is ignored.
#[must_use]
pub fn calculate_quality_score(event: &NormalizedEvent) -> u8 {
    let mut score = BASE;
    if event
        .user_name
        .as_deref()
        .is_some_and(|name| !name.trim().is_empty() && name != ANONYMOUS_NAME)
    {
        score += NAME_BONUS;
    }
    if is_present(event.user_email.as_deref()) {
        score += EMAIL_BONUS;
    }
    if is_present(event.user_location.as_deref()) {
        score += LOCATION_BONUS;
    }
    if event.event_data.len() >= RICH_DATA_MIN_KEYS {
        score += RICH_DATA_BONUS;
    }
    score += RECENCY_BONUS;
    u8::try_from(score.min(100)).unwrap_or(100)
}

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}
