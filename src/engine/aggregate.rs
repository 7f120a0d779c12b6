use std::collections::{HashMap, HashSet};

use ndarray::{Array2, ArrayView1};

use crate::models::{CatalogItem, Event};

use super::{weights::event_weight, EngineError};

/// Global engagement statistics for one title, accumulated across all users.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemStats {
    pub total_score: f64,
    pub unique_users: usize,
    pub total_events: usize,
}

/// Dense user×item interaction matrix plus per-item statistics.
///
/// Rows are the users with at least one event, columns are *all* catalog
/// items (so similarity and recommendation lookups are total even for
/// titles nobody has touched); both axes are sorted by id so a rebuild from
/// the same data is bit-identical. A cell holds the sum over all matching
/// events of `watch_seconds × event_weight(kind)`.
#[derive(Debug)]
pub struct InteractionMatrix {
    item_ids: Vec<String>,
    user_index: HashMap<String, usize>,
    item_index: HashMap<String, usize>,
    matrix: Array2<f64>,
    /// Columns with at least one event, ascending. Only these participate
    /// in popularity and in per-user percentile/candidate computation.
    active: Vec<usize>,
    stats: HashMap<String, ItemStats>,
}

impl InteractionMatrix {
    /// Folds a batch of events into the matrix and the per-item stats.
    ///
    /// Accumulation is purely additive, so event order never affects the
    /// result. An event naming an item outside the catalog is an
    /// [`EngineError::UnknownItem`]; upstream cleansing is supposed to have
    /// removed those.
    pub fn build(
        catalog: &HashMap<String, CatalogItem>,
        events: &[Event],
    ) -> Result<Self, EngineError> {
        let mut item_ids: Vec<String> = catalog.keys().cloned().collect();
        item_ids.sort();
        let item_index: HashMap<String, usize> = item_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let mut user_ids: Vec<String> = events
            .iter()
            .map(|e| e.user_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        user_ids.sort();
        let user_index: HashMap<String, usize> = user_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        let n_items = item_ids.len();
        let mut matrix = Array2::<f64>::zeros((user_ids.len(), n_items));
        let mut total_score = vec![0.0_f64; n_items];
        let mut total_events = vec![0_usize; n_items];
        let mut users_of_item: Vec<HashSet<usize>> = vec![HashSet::new(); n_items];

        for event in events {
            let &col = item_index
                .get(&event.item_id)
                .ok_or_else(|| EngineError::UnknownItem(event.item_id.clone()))?;
            let row = user_index[&event.user_id];
            let weighted = f64::from(event.watch_seconds) * event_weight(&event.kind);

            matrix[[row, col]] += weighted;
            total_score[col] += weighted;
            total_events[col] += 1;
            users_of_item[col].insert(row);
        }

        let active: Vec<usize> = (0..n_items).filter(|&c| total_events[c] > 0).collect();
        let stats: HashMap<String, ItemStats> = active
            .iter()
            .map(|&c| {
                (
                    item_ids[c].clone(),
                    ItemStats {
                        total_score: total_score[c],
                        unique_users: users_of_item[c].len(),
                        total_events: total_events[c],
                    },
                )
            })
            .collect();

        Ok(Self {
            item_ids,
            user_index,
            item_index,
            matrix,
            active,
            stats,
        })
    }

    /// The interaction weights of one user across every catalog item, or
    /// `None` for a user with no recorded events.
    pub fn user_row(&self, user_id: &str) -> Option<ArrayView1<'_, f64>> {
        self.user_index.get(user_id).map(|&r| self.matrix.row(r))
    }

    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }

    pub fn item_ids(&self) -> &[String] {
        &self.item_ids
    }

    pub fn item_id(&self, col: usize) -> &str {
        &self.item_ids[col]
    }

    pub fn item_col(&self, item_id: &str) -> Option<usize> {
        self.item_index.get(item_id).copied()
    }

    pub fn active_items(&self) -> &[usize] {
        &self.active
    }

    pub fn stats(&self, item_id: &str) -> Option<&ItemStats> {
        self.stats.get(item_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventKind;
    use chrono::Utc;

    fn item(id: &str) -> (String, CatalogItem) {
        (
            id.to_string(),
            CatalogItem::new(id, format!("Title {id}"), "movie", "drama"),
        )
    }

    fn event(user: &str, item: &str, kind: &str, seconds: u32) -> Event {
        Event {
            user_id: user.to_string(),
            item_id: item.to_string(),
            kind: EventKind::parse(kind),
            watch_seconds: seconds,
            timestamp: Utc::now(),
        }
    }

    fn catalog(ids: &[&str]) -> HashMap<String, CatalogItem> {
        ids.iter().map(|id| item(id)).collect()
    }

    #[test]
    fn test_weighted_accumulation() {
        let catalog = catalog(&["i1", "i2", "i3"]);
        let events = vec![
            event("u1", "i1", "complete", 100),
            event("u1", "i2", "play", 10),
            event("u2", "i1", "complete", 100),
            event("u2", "i3", "play", 50),
        ];

        let m = InteractionMatrix::build(&catalog, &events).unwrap();
        let row = m.user_row("u1").unwrap();
        assert_eq!(row[m.item_col("i1").unwrap()], 300.0);
        assert_eq!(row[m.item_col("i2").unwrap()], 10.0);

        let i1 = m.stats("i1").unwrap();
        assert_eq!(i1.total_score, 600.0);
        assert_eq!(i1.unique_users, 2);
        assert_eq!(i1.total_events, 2);
    }

    #[test]
    fn test_repeat_events_accumulate() {
        let catalog = catalog(&["i1"]);
        let events = vec![
            event("u1", "i1", "play", 30),
            event("u1", "i1", "like", 10),
        ];

        let m = InteractionMatrix::build(&catalog, &events).unwrap();
        let row = m.user_row("u1").unwrap();
        assert_eq!(row[0], 30.0 + 25.0);

        let stats = m.stats("i1").unwrap();
        assert_eq!(stats.unique_users, 1);
        assert_eq!(stats.total_events, 2);
    }

    #[test]
    fn test_event_less_item_has_zero_column_but_no_stats() {
        let catalog = catalog(&["i1", "i2"]);
        let events = vec![event("u1", "i1", "play", 60)];

        let m = InteractionMatrix::build(&catalog, &events).unwrap();
        assert_eq!(m.item_ids().len(), 2);
        assert_eq!(m.active_items(), &[0]);
        assert!(m.stats("i2").is_none());
        assert_eq!(m.user_row("u1").unwrap()[m.item_col("i2").unwrap()], 0.0);
    }

    #[test]
    fn test_zero_second_event_still_counts_as_engagement() {
        let catalog = catalog(&["i1"]);
        let events = vec![event("u1", "i1", "play", 0)];

        let m = InteractionMatrix::build(&catalog, &events).unwrap();
        let stats = m.stats("i1").unwrap();
        assert_eq!(stats.total_score, 0.0);
        assert_eq!(stats.unique_users, 1);
        assert_eq!(stats.total_events, 1);
        assert_eq!(m.active_items(), &[0]);
    }

    #[test]
    fn test_unknown_item_is_fatal() {
        let catalog = catalog(&["i1"]);
        let events = vec![event("u1", "ghost", "play", 60)];

        let err = InteractionMatrix::build(&catalog, &events).unwrap_err();
        assert_eq!(err, EngineError::UnknownItem("ghost".to_string()));
    }

    #[test]
    fn test_event_order_does_not_matter() {
        let catalog = catalog(&["i1", "i2"]);
        let mut events = vec![
            event("u1", "i1", "play", 30),
            event("u1", "i2", "save", 5),
            event("u2", "i1", "skip", 100),
        ];

        let a = InteractionMatrix::build(&catalog, &events).unwrap();
        events.reverse();
        let b = InteractionMatrix::build(&catalog, &events).unwrap();

        assert_eq!(a.matrix(), b.matrix());
        assert_eq!(a.stats("i1"), b.stats("i1"));
    }
}
