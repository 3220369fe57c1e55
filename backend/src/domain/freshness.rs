//! Image freshness policy.
//!
//! A pure decision function: given the record's cached state and the current
//! time, decide whether the stored thumbnail can be reused. No I/O, no hidden
//! state; the clock is an input.

use chrono::{DateTime, TimeDelta, Utc};

/// Default freshness window in minutes.
pub const DEFAULT_FRESHNESS_MINUTES: i64 = 50;

/// Outcome of a freshness decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// An image is present and not yet expired; reuse it as-is.
    Fresh,
    /// The image is missing or expired; a new one must be fetched.
    Stale,
}

/// Duration a fetched thumbnail stays valid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessWindow(TimeDelta);

impl FreshnessWindow {
    /// Build a window from whole minutes.
    pub fn from_minutes(minutes: i64) -> Self {
        Self(TimeDelta::minutes(minutes))
    }

    /// Expiry instant for an image fetched at `fetched_at`.
    pub fn expiry_after(&self, fetched_at: DateTime<Utc>) -> DateTime<Utc> {
        fetched_at + self.0
    }
}

impl Default for FreshnessWindow {
    fn default() -> Self {
        Self::from_minutes(DEFAULT_FRESHNESS_MINUTES)
    }
}

/// Decide whether a cached image can be reused.
///
/// A missing `image_url` is stale regardless of `expiration_time`; a present
/// one is fresh only while `expiration_time` lies strictly in the future.
pub fn evaluate(
    image_url: Option<&str>,
    expiration_time: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Freshness {
    match image_url {
        Some(_) if expiration_time > now => Freshness::Fresh,
        _ => Freshness::Stale,
    }
}
