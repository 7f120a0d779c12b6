use std::collections::{HashMap, HashSet};

use crate::models::{CatalogItem, Recommendation, User};

use super::{
    aggregate::InteractionMatrix, popularity::PopularityRanker, round4,
    similarity::SimilarityIndex, EngineError,
};

const HISTORY_REASON: &str = "Based on your viewing history";

/// Share of a user's engagement distribution that counts as "significant":
/// items strictly above the user's own 70th-percentile weight.
const WATCH_SET_QUANTILE: f64 = 0.7;

/// Minimum similarity to a top watched title before a recommendation is
/// attributed to it in the reason string.
const REASON_SIMILARITY_FLOOR: f64 = 0.1;

/// Item-based collaborative-filtering ranker for a single snapshot.
///
/// Borrows the snapshot's structures; all reads are against immutable data,
/// so any number of `recommend` calls may run in parallel.
pub struct PersonalizedRanker<'a> {
    users: &'a HashMap<String, User>,
    catalog: &'a HashMap<String, CatalogItem>,
    interactions: &'a InteractionMatrix,
    similarity: &'a SimilarityIndex,
    popularity: &'a PopularityRanker,
}

impl<'a> PersonalizedRanker<'a> {
    pub fn new(
        users: &'a HashMap<String, User>,
        catalog: &'a HashMap<String, CatalogItem>,
        interactions: &'a InteractionMatrix,
        similarity: &'a SimilarityIndex,
        popularity: &'a PopularityRanker,
    ) -> Self {
        Self {
            users,
            catalog,
            interactions,
            similarity,
            popularity,
        }
    }

    /// Top `k` recommendations for a user, with `fallback_used = true` when
    /// the user has no usable signal and the result is exactly the global
    /// popularity ranking.
    pub fn recommend(
        &self,
        user_id: &str,
        k: usize,
    ) -> Result<(Vec<Recommendation>, bool), EngineError> {
        if !self.users.contains_key(user_id) {
            return Err(EngineError::UnknownUser(user_id.to_string()));
        }

        let Some(row) = self.interactions.user_row(user_id) else {
            return Ok((self.popularity.rank(k)?, true));
        };

        let active = self.interactions.active_items();
        let weights: Vec<f64> = active.iter().map(|&col| row[col]).collect();
        if weights.iter().sum::<f64>() == 0.0 {
            return Ok((self.popularity.rank(k)?, true));
        }

        // Significant watch-set: strictly above the user's own 70th
        // percentile, taken over their weights across every active item
        // (zeros included). A degenerate quantile can leave this empty, e.g.
        // a user whose weights are all equal; that is treated the same as
        // having no history at all.
        let threshold = percentile(&weights, WATCH_SET_QUANTILE);
        let watch_set: Vec<usize> = active
            .iter()
            .copied()
            .filter(|&col| row[col] > threshold)
            .collect();
        if watch_set.is_empty() {
            return Ok((self.popularity.rank(k)?, true));
        }
        let watched: HashSet<usize> = watch_set.iter().copied().collect();

        // Every active item outside the watch-set is a candidate; its score
        // is the similarity-weighted sum of the user's watched engagement.
        // An item the user touched below threshold is still recommendable.
        let mut candidates: Vec<(usize, f64)> = Vec::with_capacity(active.len());
        for &col in active {
            if watched.contains(&col) {
                continue;
            }
            let score: f64 = watch_set
                .iter()
                .map(|&w| self.similarity.value_at(w, col) * row[w])
                .sum();
            candidates.push((col, score));
        }
        candidates.sort_by(|a, b| {
            b.1.total_cmp(&a.1)
                .then_with(|| self.interactions.item_id(a.0).cmp(self.interactions.item_id(b.0)))
        });

        let mut ranked: Vec<(String, f64)> = candidates
            .into_iter()
            .map(|(col, score)| (self.interactions.item_id(col).to_string(), round4(score)))
            .collect();

        // Too few candidates: append from the popularity ranking in rank
        // order, never re-sorting, skipping anything already present or
        // watched. This does not flip fallback_used.
        if ranked.len() < k {
            let mut present: HashSet<&str> = ranked.iter().map(|(id, _)| id.as_str()).collect();
            for &col in &watch_set {
                present.insert(self.interactions.item_id(col));
            }
            let mut supplements: Vec<(String, f64)> = Vec::new();
            for entry in self.popularity.entries() {
                if ranked.len() + supplements.len() >= k {
                    break;
                }
                if !present.contains(entry.item_id.as_str()) {
                    supplements.push((entry.item_id.clone(), entry.score));
                }
            }
            ranked.extend(supplements);
        }
        ranked.truncate(k);

        // The user's three heaviest watched items, for reason attribution.
        let mut top_watched = watch_set.clone();
        top_watched.sort_by(|&a, &b| {
            row[b]
                .total_cmp(&row[a])
                .then_with(|| self.interactions.item_id(a).cmp(self.interactions.item_id(b)))
        });
        top_watched.truncate(3);

        let mut recommendations = Vec::with_capacity(ranked.len());
        for (item_id, score) in ranked {
            let item = self
                .catalog
                .get(&item_id)
                .ok_or_else(|| EngineError::UnknownItem(item_id.clone()))?;
            // Ranked ids all come out of the interaction matrix.
            let col = self
                .interactions
                .item_col(&item_id)
                .ok_or_else(|| EngineError::UnknownItem(item_id.clone()))?;

            let reason = top_watched
                .iter()
                .find(|&&w| self.similarity.value_at(col, w) > REASON_SIMILARITY_FLOOR)
                .and_then(|&w| self.catalog.get(self.interactions.item_id(w)))
                .map(|watched_item| format!("Similar to '{}'", watched_item.title))
                .unwrap_or_else(|| HISTORY_REASON.to_string());

            recommendations.push(Recommendation {
                item_id: item.id.clone(),
                title: item.title.clone(),
                content_type: item.content_type.clone(),
                genre: item.genre.clone(),
                score,
                reason,
            });
        }

        Ok((recommendations, false))
    }
}

/// Percentile by linear interpolation between closest ranks, the
/// numpy/pandas default. `q` in [0, 1]; `values` must be non-empty.
pub(crate) fn percentile(values: &[f64], q: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = (sorted.len() - 1) as f64 * q;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
}
