use std::collections::HashMap;
use std::time::Instant;

use crate::models::{CatalogItem, Event, Recommendation, User, WatchRecord};

use super::{
    aggregate::InteractionMatrix, personalized::PersonalizedRanker,
    popularity::PopularityRanker, similarity::SimilarityIndex, EngineError,
};

/// One immutable bundle of input data and every derived ranking structure.
///
/// A snapshot is built in one pass and never mutated; serving code holds it
/// behind an `Arc` and swaps the whole reference on reload, so concurrent
/// readers see either the fully-old or the fully-new state, never a mix.
pub struct Snapshot {
    users: HashMap<String, User>,
    items: HashMap<String, CatalogItem>,
    events: Vec<Event>,
    interactions: InteractionMatrix,
    similarity: SimilarityIndex,
    popularity: PopularityRanker,
}

impl Snapshot {
    /// Derives everything from already-cleaned collections. Building the
    /// similarity index is the expensive step (O(items² × users)); this is
    /// meant to run at startup or on an explicit reload, never on the
    /// request path.
    pub fn build(
        users: Vec<User>,
        items: Vec<CatalogItem>,
        events: Vec<Event>,
    ) -> Result<Self, EngineError> {
        let started = Instant::now();

        let users: HashMap<String, User> =
            users.into_iter().map(|u| (u.id.clone(), u)).collect();
        let items: HashMap<String, CatalogItem> =
            items.into_iter().map(|i| (i.id.clone(), i)).collect();

        let interactions = InteractionMatrix::build(&items, &events)?;
        let similarity = SimilarityIndex::build(&interactions);
        let popularity = PopularityRanker::build(&interactions, &items)?;

        tracing::info!(
            users = users.len(),
            items = items.len(),
            events = events.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built recommendation snapshot",
        );

        Ok(Self {
            users,
            items,
            events,
            interactions,
            similarity,
            popularity,
        })
    }

    /// Global popularity top `k`.
    pub fn popular(&self, k: usize) -> Result<Vec<Recommendation>, EngineError> {
        self.popularity.rank(k)
    }

    /// Personalized top `k` for one user, with the fallback flag.
    pub fn recommend(
        &self,
        user_id: &str,
        k: usize,
    ) -> Result<(Vec<Recommendation>, bool), EngineError> {
        PersonalizedRanker::new(
            &self.users,
            &self.items,
            &self.interactions,
            &self.similarity,
            &self.popularity,
        )
        .recommend(user_id, k)
    }

    /// The user's full watch history joined with catalog metadata, heaviest
    /// watch first. This is the plain-data contract handed to any display
    /// or explanation layer.
    pub fn user_history(&self, user_id: &str) -> Result<Vec<WatchRecord>, EngineError> {
        if !self.users.contains_key(user_id) {
            return Err(EngineError::UnknownUser(user_id.to_string()));
        }

        let mut records = Vec::new();
        for event in self.events.iter().filter(|e| e.user_id == user_id) {
            let item = self
                .items
                .get(&event.item_id)
                .ok_or_else(|| EngineError::UnknownItem(event.item_id.clone()))?;
            records.push(WatchRecord {
                item_id: item.id.clone(),
                title: item.title.clone(),
                content_type: item.content_type.clone(),
                genre: item.genre.clone(),
                watch_seconds: event.watch_seconds,
                event_kind: event.kind.clone(),
                timestamp: event.timestamp,
            });
        }

        records.sort_by(|a, b| {
            b.watch_seconds
                .cmp(&a.watch_seconds)
                .then_with(|| a.timestamp.cmp(&b.timestamp))
                .then_with(|| a.item_id.cmp(&b.item_id))
        });
        Ok(records)
    }

    pub fn similarity(&self) -> &SimilarityIndex {
        &self.similarity
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventKind;
    use chrono::{TimeZone, Utc};

    fn snapshot() -> Snapshot {
        let users = vec![
            User {
                id: "u1".to_string(),
                age: Some(30.0),
                gender: "F".to_string(),
                region: "EU".to_string(),
            },
            User {
                id: "u2".to_string(),
                age: None,
                gender: "Unknown".to_string(),
                region: "Unknown".to_string(),
            },
        ];
        let items = vec![
            CatalogItem::new("i1", "Midnight Run", "movie", "action"),
            CatalogItem::new("i2", "Slow Horses", "series", "thriller"),
        ];
        let events = vec![
            Event {
                user_id: "u1".to_string(),
                item_id: "i1".to_string(),
                kind: EventKind::Play,
                watch_seconds: 120,
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            },
            Event {
                user_id: "u1".to_string(),
                item_id: "i2".to_string(),
                kind: EventKind::Complete,
                watch_seconds: 2400,
                timestamp: Utc.with_ymd_and_hms(2024, 3, 2, 21, 30, 0).unwrap(),
            },
        ];
        Snapshot::build(users, items, events).unwrap()
    }

    #[test]
    fn test_history_sorted_by_watch_seconds_desc() {
        let snapshot = snapshot();
        let history = snapshot.user_history("u1").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].item_id, "i2");
        assert_eq!(history[0].title, "Slow Horses");
        assert_eq!(history[0].watch_seconds, 2400);
        assert_eq!(history[1].item_id, "i1");
    }

    #[test]
    fn test_history_for_unknown_user() {
        let snapshot = snapshot();
        assert_eq!(
            snapshot.user_history("ghost").unwrap_err(),
            EngineError::UnknownUser("ghost".to_string()),
        );
    }

    #[test]
    fn test_history_for_user_without_events_is_empty() {
        let snapshot = snapshot();
        assert_eq!(snapshot.user_history("u2").unwrap(), vec![]);
    }

    #[test]
    fn test_counts() {
        let snapshot = snapshot();
        assert_eq!(snapshot.user_count(), 2);
        assert_eq!(snapshot.item_count(), 2);
        assert_eq!(snapshot.event_count(), 2);
    }
}
