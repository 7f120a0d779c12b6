use std::collections::HashMap;

use ndarray::{Array2, Axis};

use super::{aggregate::InteractionMatrix, EngineError};

/// Symmetric item×item cosine-similarity structure.
///
/// Built once per snapshot from the dense interaction matrix: every item
/// column is L2-normalized across users, then the whole similarity matrix is
/// one `normalizedᵀ · normalized` product rather than a pairwise loop. A
/// column with zero norm (an item nobody interacted with) is left all-zero,
/// so its similarity with everything, itself included, is 0.0 rather than
/// NaN. Nonzero diagonals are pinned to exactly 1.0.
pub struct SimilarityIndex {
    item_ids: Vec<String>,
    item_index: HashMap<String, usize>,
    matrix: Array2<f64>,
}

impl SimilarityIndex {
    pub fn build(interactions: &InteractionMatrix) -> Self {
        let mut normalized = interactions.matrix().clone();
        let mut nonzero = vec![false; normalized.ncols()];

        for (col, mut column) in normalized.axis_iter_mut(Axis(1)).enumerate() {
            let norm = column.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                column.mapv_inplace(|v| v / norm);
                nonzero[col] = true;
            }
        }

        let mut matrix = normalized.t().dot(&normalized);
        for (col, &has_norm) in nonzero.iter().enumerate() {
            if has_norm {
                matrix[[col, col]] = 1.0;
            }
        }

        let item_ids: Vec<String> = interactions.item_ids().to_vec();
        let item_index = item_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        Self {
            item_ids,
            item_index,
            matrix,
        }
    }

    fn col(&self, item_id: &str) -> Result<usize, EngineError> {
        self.item_index
            .get(item_id)
            .copied()
            .ok_or_else(|| EngineError::UnknownItem(item_id.to_string()))
    }

    /// Cosine similarity between two catalog items, in [-1, 1].
    pub fn similarity(&self, item_a: &str, item_b: &str) -> Result<f64, EngineError> {
        Ok(self.matrix[[self.col(item_a)?, self.col(item_b)?]])
    }

    /// Every catalog item paired with its similarity to `item_id`, most
    /// similar first, ties broken by item id.
    pub fn neighbors_of(&self, item_id: &str) -> Result<Vec<(String, f64)>, EngineError> {
        let col = self.col(item_id)?;
        let mut neighbors: Vec<(String, f64)> = self
            .matrix
            .row(col)
            .iter()
            .enumerate()
            .map(|(i, &sim)| (self.item_ids[i].clone(), sim))
            .collect();
        neighbors.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(neighbors)
    }

    pub(crate) fn value_at(&self, col_a: usize, col_b: usize) -> f64 {
        self.matrix[[col_a, col_b]]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogItem, Event, EventKind};
    use chrono::Utc;
    use std::collections::HashMap;

    fn build_index(item_ids: &[&str], events: &[(&str, &str, u32)]) -> SimilarityIndex {
        let catalog: HashMap<String, CatalogItem> = item_ids
            .iter()
            .map(|id| {
                (
                    id.to_string(),
                    CatalogItem::new(*id, format!("Title {id}"), "movie", "drama"),
                )
            })
            .collect();
        let events: Vec<Event> = events
            .iter()
            .map(|&(user, item, seconds)| Event {
                user_id: user.to_string(),
                item_id: item.to_string(),
                kind: EventKind::Play,
                watch_seconds: seconds,
                timestamp: Utc::now(),
            })
            .collect();
        let interactions = InteractionMatrix::build(&catalog, &events).unwrap();
        SimilarityIndex::build(&interactions)
    }

    #[test]
    fn test_symmetry() {
        let index = build_index(
            &["i1", "i2", "i3"],
            &[
                ("u1", "i1", 100),
                ("u1", "i2", 40),
                ("u2", "i2", 80),
                ("u2", "i3", 60),
                ("u3", "i1", 20),
                ("u3", "i3", 90),
            ],
        );

        for a in ["i1", "i2", "i3"] {
            for b in ["i1", "i2", "i3"] {
                assert_eq!(
                    index.similarity(a, b).unwrap(),
                    index.similarity(b, a).unwrap(),
                );
            }
        }
    }

    #[test]
    fn test_self_similarity_is_exactly_one() {
        let index = build_index(&["i1", "i2"], &[("u1", "i1", 37), ("u2", "i1", 113)]);
        assert_eq!(index.similarity("i1", "i1").unwrap(), 1.0);
    }

    #[test]
    fn test_zero_vector_item_has_zero_similarity_everywhere() {
        let index = build_index(&["i1", "i2"], &[("u1", "i1", 100)]);
        assert_eq!(index.similarity("i2", "i2").unwrap(), 0.0);
        assert_eq!(index.similarity("i1", "i2").unwrap(), 0.0);
    }

    #[test]
    fn test_identical_columns_are_fully_similar() {
        // i1 and i2 watched by the same users with proportional weights.
        let index = build_index(
            &["i1", "i2"],
            &[
                ("u1", "i1", 10),
                ("u1", "i2", 20),
                ("u2", "i1", 30),
                ("u2", "i2", 60),
            ],
        );
        let sim = index.similarity("i1", "i2").unwrap();
        assert!((sim - 1.0).abs() < 1e-12, "expected ~1.0, got {sim}");
    }

    #[test]
    fn test_disjoint_audiences_have_zero_similarity() {
        let index = build_index(&["i1", "i2"], &[("u1", "i1", 50), ("u2", "i2", 50)]);
        assert_eq!(index.similarity("i1", "i2").unwrap(), 0.0);
    }

    #[test]
    fn test_neighbors_sorted_descending() {
        let index = build_index(
            &["i1", "i2", "i3"],
            &[
                ("u1", "i1", 100),
                ("u1", "i2", 100),
                ("u2", "i1", 100),
                ("u2", "i3", 10),
            ],
        );

        let neighbors = index.neighbors_of("i1").unwrap();
        assert_eq!(neighbors.len(), 3);
        assert_eq!(neighbors[0].0, "i1");
        for pair in neighbors.windows(2) {
            assert!(pair[0].1 >= pair[1].1);
        }
    }

    #[test]
    fn test_unknown_item_rejected() {
        let index = build_index(&["i1"], &[("u1", "i1", 10)]);
        assert_eq!(
            index.similarity("i1", "ghost").unwrap_err(),
            EngineError::UnknownItem("ghost".to_string()),
        );
        assert!(index.neighbors_of("ghost").is_err());
    }
}
