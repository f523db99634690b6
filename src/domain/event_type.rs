//! Canonical notification types.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Canonical event type tag shared by every source.
///
/// Source adapters map their raw type strings onto one of these. Anything
/// that does not match a known tag becomes [`EventType::Custom`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A completed order or one-off payment.
    Purchase,
    /// A new or renewed recurring subscription.
    Subscription,
    /// A review pulled from a review platform.
    Review,
    /// An account or newsletter signup.
    Signup,
    /// A generic form capture.
    FormSubmission,
    /// A curated customer quote.
    Testimonial,
    /// A site-authored announcement.
    Announcement,
    /// A live visitor counter.
    LiveVisitors,
    /// Any other event the caller tagged with an unrecognised type.
    #[serde(other)]
    Custom,
}

impl EventType {
    /// Every canonical event type, in display-priority order.
    pub const ALL: [Self; 9] = [
        Self::Purchase,
        Self::Subscription,
        Self::Review,
        Self::Signup,
        Self::FormSubmission,
        Self::Testimonial,
        Self::Announcement,
        Self::LiveVisitors,
        Self::Custom,
    ];

    /// Returns the wire tag for this type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Subscription => "subscription",
            Self::Review => "review",
            Self::Signup => "signup",
            Self::FormSubmission => "form_submission",
            Self::Testimonial => "testimonial",
            Self::Announcement => "announcement",
            Self::LiveVisitors => "live_visitors",
            Self::Custom => "custom",
        }
    }

    /// Parses a canonical tag. Returns `None` for anything else.
    ///
    /// Matching is case-insensitive and treats `-` and spaces like `_`.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let normalized = tag.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
    }

    /// Parses a tag, mapping unknown or empty strings to [`EventType::Custom`].
    #[must_use]
    pub fn from_tag_or_custom(tag: &str) -> Self {
        Self::from_tag(tag).unwrap_or(Self::Custom)
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_round_trip() {
        for t in EventType::ALL {
            assert_eq!(EventType::from_tag(t.as_str()), Some(t));
        }
    }

    #[test]
    fn parsing_is_lenient_about_case_and_separators() {
        assert_eq!(EventType::from_tag("Live-Visitors"), Some(EventType::LiveVisitors));
        assert_eq!(EventType::from_tag(" form submission "), Some(EventType::FormSubmission));
    }

    #[test]
    fn unknown_tags_become_custom() {
        assert_eq!(EventType::from_tag("webinar_joined"), None);
        assert_eq!(EventType::from_tag_or_custom("webinar_joined"), EventType::Custom);
        assert_eq!(EventType::from_tag_or_custom(""), EventType::Custom);
    }

    #[test]
    fn serde_uses_snake_case_and_falls_back_to_custom() {
        let json = serde_json::to_string(&EventType::LiveVisitors).unwrap_or_default();
        assert_eq!(json, "\"live_visitors\"");
        let parsed: Option<EventType> = serde_json::from_str("\"something_else\"").ok();
        assert_eq!(parsed, Some(EventType::Custom));
    }
}
