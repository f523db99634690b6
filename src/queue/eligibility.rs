//! Per-type candidate selection.

use chrono::{DateTime, Duration, Utc};

use crate::domain::{EventSource, EventType, ModerationStatus, NormalizedEvent, NotificationWeight};

/// Rules narrowing the event history of one type to a candidate pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EligibilityRules {
    /// Maximum age in days.
    pub ttl_days: u32,
    /// Upper bound on the pool size.
    pub max_per_queue: usize,
    /// Drop quick-win entries.
    pub natural_only: bool,
}

impl EligibilityRules {
    /// Rules derived from an effective weight row.
    #[must_use]
    pub const fn from_weight(weight: NotificationWeight, natural_only: bool) -> Self {
        Self {
            ttl_days: weight.ttl_days,
            max_per_queue: weight.max_per_queue,
            natural_only,
        }
    }

    /// Oldest `created_at` still inside the window.
    #[must_use]
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        days_before(now, self.ttl_days)
    }

    /// Whether one event passes every rule except the pool-size cap.
    #[must_use]
    pub fn admits(&self, event: &NormalizedEvent, now: DateTime<Utc>) -> bool {
        event.moderation_status == ModerationStatus::Approved
            && event.created_at >= self.window_start(now)
            && !event.is_expired(now)
            && !(self.natural_only && event.source == EventSource::QuickWin)
    }
}

/// `now` minus `days`, saturating at the earliest representable instant.
#[must_use]
pub fn days_before(now: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    Duration::try_days(i64::from(days))
        .and_then(|span| now.checked_sub_signed(span))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Selects the candidate pool for `event_type` from `events`.
///
/// Keeps approved, unexpired events of that type created inside the TTL
/// window, newest first, capped at `rules.max_per_queue`.
#[must_use]
pub fn select(
    events: &[NormalizedEvent],
    event_type: EventType,
    rules: &EligibilityRules,
    now: DateTime<Utc>,
) -> Vec<NormalizedEvent> {
    let mut pool: Vec<NormalizedEvent> = events
        .iter()
        .filter(|e| e.event_type == event_type && rules.admits(e, now))
        .cloned()
        .collect();
    pool.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    pool.truncate(rules.max_per_queue);
    pool
}
