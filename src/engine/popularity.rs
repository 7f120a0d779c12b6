use std::collections::HashMap;

use crate::models::{CatalogItem, Recommendation};

use super::{aggregate::InteractionMatrix, round4, EngineError};

pub(crate) const POPULAR_REASON: &str = "Globally popular content";

/// Deterministic global top-K ranking, cached in sorted order at build time.
///
/// An item's popularity score blends three statistics, each normalized by
/// its maximum across the catalog: 0.5 × weighted score + 0.3 × distinct
/// users + 0.2 × event count. A statistic whose maximum is zero contributes
/// zero instead of dividing by zero, so the score stays in [0, 1] by
/// construction. Only items with at least one event are ranked.
pub struct PopularityRanker {
    entries: Vec<Recommendation>,
}

impl PopularityRanker {
    pub fn build(
        interactions: &InteractionMatrix,
        catalog: &HashMap<String, CatalogItem>,
    ) -> Result<Self, EngineError> {
        let active = interactions.active_items();

        let mut max_score = 0.0_f64;
        let mut max_users = 0_usize;
        let mut max_events = 0_usize;
        for &col in active {
            // Active columns always have stats.
            if let Some(stats) = interactions.stats(interactions.item_id(col)) {
                max_score = max_score.max(stats.total_score);
                max_users = max_users.max(stats.unique_users);
                max_events = max_events.max(stats.total_events);
            }
        }

        let term = |value: f64, max: f64, weight: f64| {
            if max > 0.0 {
                weight * value / max
            } else {
                0.0
            }
        };

        let mut scored: Vec<(&str, f64)> = Vec::with_capacity(active.len());
        for &col in active {
            let item_id = interactions.item_id(col);
            if let Some(stats) = interactions.stats(item_id) {
                let score = term(stats.total_score, max_score, 0.5)
                    + term(stats.unique_users as f64, max_users as f64, 0.3)
                    + term(stats.total_events as f64, max_events as f64, 0.2);
                scored.push((item_id, score));
            }
        }

        // Sort on the unrounded score; rounding happens at the output edge.
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        let entries = scored
            .into_iter()
            .map(|(item_id, score)| {
                let item = catalog
                    .get(item_id)
                    .ok_or_else(|| EngineError::UnknownItem(item_id.to_string()))?;
                Ok(Recommendation {
                    item_id: item.id.clone(),
                    title: item.title.clone(),
                    content_type: item.content_type.clone(),
                    genre: item.genre.clone(),
                    score: round4(score),
                    reason: POPULAR_REASON.to_string(),
                })
            })
            .collect::<Result<Vec<_>, EngineError>>()?;

        Ok(Self { entries })
    }

    /// The global top `k`, fewer if the catalog is smaller.
    pub fn rank(&self, k: usize) -> Result<Vec<Recommendation>, EngineError> {
        if self.entries.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }
        Ok(self.entries.iter().take(k).cloned().collect())
    }

    /// The full ranking, for supplementing personalized results.
    pub fn entries(&self) -> &[Recommendation] {
        &self.entries
    }
}
