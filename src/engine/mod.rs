//! The ranking engine.
//!
//! Raw events are folded into a dense user×item interaction matrix and
//! per-item engagement statistics ([`InteractionMatrix`]); the matrix feeds
//! an item×item cosine-similarity structure ([`SimilarityIndex`]) and a
//! global popularity ranking ([`PopularityRanker`]); [`PersonalizedRanker`]
//! combines the two into per-user recommendations with popularity fallback.
//! [`Snapshot`] bundles the inputs and all derived structures into one
//! immutable unit that is rebuilt from scratch and swapped atomically on
//! every data reload.
//!
//! Nothing in this module performs I/O; callers hand in already-cleaned
//! collections (see `crate::ingest`) and serve the results however they
//! like (see `crate::api`).

mod aggregate;
mod personalized;
mod popularity;
mod similarity;
mod snapshot;
pub mod weights;

pub use aggregate::{InteractionMatrix, ItemStats};
pub use personalized::PersonalizedRanker;
pub use popularity::PopularityRanker;
pub use similarity::SimilarityIndex;
pub use snapshot::Snapshot;

use thiserror::Error;

/// Failures surfaced by the ranking engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// No item in the catalog has a single recorded event, so not even the
    /// popularity ranking can be produced.
    #[error("no items with recorded interactions")]
    EmptyCatalog,

    /// The user id is absent from the user table. Distinct from a known
    /// user with no interactions, which takes the popularity fallback.
    #[error("unknown user: {0}")]
    UnknownUser(String),

    /// An item id that should have been guaranteed by upstream cleansing is
    /// missing from the catalog. A defect, not a recoverable condition.
    #[error("unknown item: {0}")]
    UnknownItem(String),
}

/// Scores are reported to 4 decimal places.
pub(crate) fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

#[cfg(test)]
mod tests {
    use super::round4;

    #[test]
    fn test_round4() {
        assert_eq!(round4(0.123_456), 0.1235);
        assert_eq!(round4(1.0), 1.0);
        assert_eq!(round4(0.000_04), 0.0);
    }
}
