//! Source kinds, moderation states, and provenance tags.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// The integration a raw event came from.
///
/// Kept on the normalized record separately from [`super::EventType`] so
/// analytics can split, say, Shopify purchases from Stripe purchases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationType {
    /// Shopify order webhooks.
    Shopify,
    /// WooCommerce order webhooks.
    #[serde(rename = "woocommerce")]
    WooCommerce,
    /// Stripe checkout, invoice, and subscription events.
    Stripe,
    /// Google Business reviews.
    GoogleReviews,
    /// Trustpilot reviews.
    Trustpilot,
    /// Calls made through the embeddable JavaScript SDK.
    Sdk,
    /// Captured form submissions.
    Form,
    /// Direct calls to the public events API.
    Api,
    /// Manually authored quick-win or demo entries.
    Manual,
    /// A source this service has no dedicated mapping for.
    #[serde(other)]
    Unknown,
}

impl IntegrationType {
    /// Every source kind.
    pub const ALL: [Self; 10] = [
        Self::Shopify,
        Self::WooCommerce,
        Self::Stripe,
        Self::GoogleReviews,
        Self::Trustpilot,
        Self::Sdk,
        Self::Form,
        Self::Api,
        Self::Manual,
        Self::Unknown,
    ];

    /// Returns the wire tag for this source.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Shopify => "shopify",
            Self::WooCommerce => "woocommerce",
            Self::Stripe => "stripe",
            Self::GoogleReviews => "google_reviews",
            Self::Trustpilot => "trustpilot",
            Self::Sdk => "sdk",
            Self::Form => "form",
            Self::Api => "api",
            Self::Manual => "manual",
            Self::Unknown => "unknown",
        }
    }

    /// Parses a source tag; anything unrecognised becomes [`Self::Unknown`].
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        let normalized = tag.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|s| s.as_str() == normalized)
            .unwrap_or(Self::Unknown)
    }

    /// Whether events from this source skip human moderation.
    ///
    /// Review platforms and open forms are crowd-sourced and start pending.
    #[must_use]
    pub const fn is_trusted(&self) -> bool {
        !matches!(
            self,
            Self::GoogleReviews | Self::Trustpilot | Self::Form | Self::Unknown
        )
    }
}

impl fmt::Display for IntegrationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation state of a normalized event. Only approved events are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ModerationStatus {
    /// Waiting for a human decision.
    Pending,
    /// Eligible for display.
    Approved,
    /// Never displayed.
    Rejected,
    /// Held back for a second look.
    Flagged,
}

impl ModerationStatus {
    /// Returns the wire tag for this status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Flagged => "flagged",
        }
    }

    /// Parses a status tag. Unknown values are treated as pending.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            "flagged" => Self::Flagged,
            _ => Self::Pending,
        }
    }
}

/// Provenance of an event: captured from a real action, or authored by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EventSource {
    /// Captured from a real integration or user action.
    Natural,
    /// Manually entered placeholder or demo content.
    QuickWin,
}

impl EventSource {
    /// Returns the wire tag for this provenance.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Natural => "natural",
            Self::QuickWin => "quick_win",
        }
    }

    /// Parses a provenance tag. Anything but `quick_win`/`demo` is natural.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "quick_win" | "demo" => Self::QuickWin,
            _ => Self::Natural,
        }
    }
}
