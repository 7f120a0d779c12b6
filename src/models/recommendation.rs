use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::EventKind;

/// One ranked title returned to the client.
///
/// `score` is either a popularity score in [0, 1] or an unnormalized
/// collaborative-filtering score, rounded to 4 decimal places; `reason` is a
/// short human-readable provenance string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub item_id: String,
    pub title: String,
    pub content_type: String,
    pub genre: String,
    pub score: f64,
    pub reason: String,
}

/// One row of a user's watch history, joined with catalog metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchRecord {
    pub item_id: String,
    pub title: String,
    pub content_type: String,
    pub genre: String,
    pub watch_seconds: u32,
    pub event_kind: EventKind,
    pub timestamp: DateTime<Utc>,
}
