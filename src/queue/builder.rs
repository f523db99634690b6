//! Weighted round-robin without replacement.
//!
//! Each build keeps a read cursor per event type. On every step the
//! builder draws one type from those with unread candidates, with
//! probability proportional to its weight, and takes that type's next
//! (most recent unread) candidate. The build stops at the target size or
//! when every type is exhausted.

use std::collections::BTreeMap;

use rand::Rng;

use crate::domain::{EventType, NormalizedEvent, NotificationWeight};

/// Per-build cursor state. Owned by a single build, never shared.
#[derive(Debug)]
struct Cursors<'a> {
    lanes: Vec<Lane<'a>>,
}

#[derive(Debug)]
struct Lane<'a> {
    weight: u32,
    candidates: &'a [NormalizedEvent],
    cursor: usize,
}

impl Lane<'_> {
    fn has_remaining(&self) -> bool {
        self.cursor < self.candidates.len()
    }
}

impl<'a> Cursors<'a> {
    fn new(
        grouped: &'a BTreeMap<EventType, Vec<NormalizedEvent>>,
        weights: &BTreeMap<EventType, u32>,
    ) -> Self {
        let lanes = grouped
            .iter()
            .map(|(event_type, candidates)| Lane {
                weight: weights
                    .get(event_type)
                    .copied()
                    .unwrap_or(NotificationWeight::FALLBACK.weight),
                candidates: candidates.as_slice(),
                cursor: 0,
            })
            .filter(|lane| lane.weight > 0)
            .collect();
        Self { lanes }
    }

    fn total_available_weight(&self) -> u64 {
        self.lanes
            .iter()
            .filter(|lane| lane.has_remaining())
            .map(|lane| u64::from(lane.weight))
            .sum()
    }

    /// Index of the lane whose weight interval contains `ticket`.
    fn pick(&self, mut ticket: u64) -> Option<usize> {
        for (idx, lane) in self.lanes.iter().enumerate() {
            if !lane.has_remaining() {
                continue;
            }
            let weight = u64::from(lane.weight);
            if ticket < weight {
                return Some(idx);
            }
            ticket -= weight;
        }
        None
    }

    fn take(&mut self, idx: usize) -> Option<&'a NormalizedEvent> {
        let lane = self.lanes.get_mut(idx)?;
        let candidates: &'a [NormalizedEvent] = lane.candidates;
        let event = candidates.get(lane.cursor)?;
        lane.cursor += 1;
        Some(event)
    }
}

/// Builds an ordered queue from per-type candidate lists.
///
/// `grouped` lists must already be ordered most-recent-first and capped.
/// Types missing from `weights` use weight 5; a weight of 0 excludes the
/// type. The result never exceeds `target_size` or the total number of
/// candidates, and an empty input yields an empty queue.
pub fn build<R: Rng + ?Sized>(
    grouped: &BTreeMap<EventType, Vec<NormalizedEvent>>,
    weights: &BTreeMap<EventType, u32>,
    target_size: usize,
    rng: &mut R,
) -> Vec<NormalizedEvent> {
    let mut cursors = Cursors::new(grouped, weights);
    let mut queue = Vec::with_capacity(target_size.min(64));

    while queue.len() < target_size {
        let total = cursors.total_available_weight();
        if total == 0 {
            break;
        }
        let ticket = rng.gen_range(0..total);
        let Some(event) = cursors.pick(ticket).and_then(|idx| cursors.take(idx)) else {
            break;
        };
        queue.push(event.clone());
    }

    queue
}

/// Count of events per type in a built queue.
#[must_use]
pub fn distribution(queue: &[NormalizedEvent]) -> BTreeMap<EventType, usize> {
    let mut counts = BTreeMap::new();
    for event in queue {
        *counts.entry(event.event_type).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        EventId, EventSource, IntegrationType, ModerationStatus, Payload, WidgetId,
    };
    use chrono::Utc;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn events(event_type: EventType, n: usize) -> Vec<NormalizedEvent> {
        (0..n)
            .map(|_| NormalizedEvent {
                id: EventId::new(),
                widget_id: WidgetId::new(),
                event_type,
                event_data: Payload::new(),
                user_name: None,
                user_email: None,
                user_location: None,
                message_template: String::new(),
                integration_type: IntegrationType::Api,
                moderation_status: ModerationStatus::Approved,
                quality_score: 40,
                source: EventSource::Natural,
                created_at: Utc::now(),
                expires_at: None,
            })
            .collect()
    }

    fn weights(pairs: &[(EventType, u32)]) -> BTreeMap<EventType, u32> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn empty_pools_yield_empty_queue() {
        let mut rng = StdRng::seed_from_u64(1);
        let queue = build(&BTreeMap::new(), &BTreeMap::new(), 15, &mut rng);
        assert!(queue.is_empty());

        let mut grouped = BTreeMap::new();
        grouped.insert(EventType::Purchase, Vec::new());
        assert!(build(&grouped, &BTreeMap::new(), 15, &mut rng).is_empty());
    }

    #[test]
    fn single_type_is_not_padded() {
        let mut grouped = BTreeMap::new();
        grouped.insert(EventType::Purchase, events(EventType::Purchase, 3));
        let mut rng = StdRng::seed_from_u64(7);
        let queue = build(&grouped, &weights(&[(EventType::Purchase, 10)]), 15, &mut rng);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn size_is_bounded_by_target_and_supply() {
        let mut rng = StdRng::seed_from_u64(42);
        for (a, b, target) in [(0, 0, 5), (2, 1, 5), (10, 10, 5), (4, 0, 4), (30, 30, 15)] {
            let mut grouped = BTreeMap::new();
            grouped.insert(EventType::Purchase, events(EventType::Purchase, a));
            grouped.insert(EventType::Signup, events(EventType::Signup, b));
            let queue = build(&grouped, &BTreeMap::new(), target, &mut rng);
            assert!(queue.len() <= target);
            assert_eq!(queue.len(), target.min(a + b));
        }
    }

    #[test]
    fn per_type_order_follows_cursor() {
        let purchases = events(EventType::Purchase, 4);
        let mut grouped = BTreeMap::new();
        grouped.insert(EventType::Purchase, purchases.clone());
        grouped.insert(EventType::Signup, events(EventType::Signup, 4));
        let mut rng = StdRng::seed_from_u64(3);
        let queue = build(&grouped, &BTreeMap::new(), 8, &mut rng);
        let picked: Vec<_> = queue
            .iter()
            .filter(|e| e.event_type == EventType::Purchase)
            .map(|e| e.id)
            .collect();
        let expected: Vec<_> = purchases.iter().map(|e| e.id).collect();
        assert_eq!(picked, expected);
    }

    #[test]
    fn zero_weight_types_are_never_drawn() {
        let mut grouped = BTreeMap::new();
        grouped.insert(EventType::Purchase, events(EventType::Purchase, 5));
        grouped.insert(EventType::Announcement, events(EventType::Announcement, 5));
        let w = weights(&[(EventType::Purchase, 3), (EventType::Announcement, 0)]);
        let mut rng = StdRng::seed_from_u64(9);
        let queue = build(&grouped, &w, 10, &mut rng);
        assert_eq!(queue.len(), 5);
        assert!(queue.iter().all(|e| e.event_type == EventType::Purchase));
    }

    #[test]
    fn same_seed_same_queue() {
        let mut grouped = BTreeMap::new();
        grouped.insert(EventType::Purchase, events(EventType::Purchase, 10));
        grouped.insert(EventType::Review, events(EventType::Review, 10));
        grouped.insert(EventType::Signup, events(EventType::Signup, 10));
        let w = weights(&[(EventType::Purchase, 10), (EventType::Review, 7)]);
        let a = build(&grouped, &w, 15, &mut StdRng::seed_from_u64(11));
        let b = build(&grouped, &w, 15, &mut StdRng::seed_from_u64(11));
        let ids = |q: &[NormalizedEvent]| q.iter().map(|e| e.id).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn selection_ratio_tracks_weights() {
        let mut grouped = BTreeMap::new();
        grouped.insert(EventType::Purchase, events(EventType::Purchase, 2));
        grouped.insert(EventType::Signup, events(EventType::Signup, 2));
        let w = weights(&[(EventType::Purchase, 10), (EventType::Signup, 1)]);
        let mut rng = StdRng::seed_from_u64(2024);

        let mut purchases = 0u32;
        let mut signups = 0u32;
        for _ in 0..10_000 {
            let queue = build(&grouped, &w, 1, &mut rng);
            match queue.first().map(|e| e.event_type) {
                Some(EventType::Purchase) => purchases += 1,
                Some(EventType::Signup) => signups += 1,
                _ => {}
            }
        }
        assert_eq!(purchases + signups, 10_000);
        let ratio = f64::from(purchases) / f64::from(signups.max(1));
        assert!((8.0..=12.0).contains(&ratio), "ratio {ratio}");
    }

    #[test]
    fn distribution_counts_types() {
        let mut queue = events(EventType::Purchase, 2);
        queue.extend(events(EventType::Review, 1));
        let counts = distribution(&queue);
        assert_eq!(counts.get(&EventType::Purchase), Some(&2));
        assert_eq!(counts.get(&EventType::Review), Some(&1));
    }
}
