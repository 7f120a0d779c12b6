use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::Deserialize;

use crate::models::{CatalogItem, Event, EventKind, User};

use super::IngestError;

/// The three cleaned collections a snapshot is built from.
pub struct LoadedData {
    pub users: Vec<User>,
    pub items: Vec<CatalogItem>,
    pub events: Vec<Event>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    user_id: Option<String>,
    age: Option<f64>,
    gender: Option<String>,
    region: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    item_id: Option<String>,
    title: Option<String>,
    content_type: Option<String>,
    genre: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawEvent {
    user_id: Option<String>,
    item_id: Option<String>,
    event_type: Option<String>,
    watch_seconds: Option<f64>,
    timestamp: Option<String>,
}

/// Loads `users.csv`, `items.csv` and `events.csv` from `dir` and applies
/// the cleansing rules: rows missing their identifier (or, for items, the
/// title) are dropped, missing attributes are filled with defaults (age
/// with the column median, strings with "Unknown"/"unknown", watch seconds
/// with 0, event kind with "play"), and events referencing unknown users or
/// items are discarded.
pub fn load_dir(dir: &Path) -> Result<LoadedData, IngestError> {
    let users = load_users(&dir.join("users.csv"))?;
    let items = load_items(&dir.join("items.csv"))?;
    let events = load_events(&dir.join("events.csv"), &users, &items)?;

    tracing::info!(
        users = users.len(),
        items = items.len(),
        events = events.len(),
        "loaded clean data set",
    );
    Ok(LoadedData {
        users,
        items,
        events,
    })
}

fn read_rows<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Vec<T>, IngestError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    })?;
    reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()
        .map_err(|source| IngestError::Csv {
            path: path.to_path_buf(),
            source,
        })
}

fn load_users(path: &Path) -> Result<Vec<User>, IngestError> {
    let rows: Vec<RawUser> = read_rows(path)?;
    let total = rows.len();

    let mut ages: Vec<f64> = rows.iter().filter_map(|r| r.age).collect();
    let median_age = median(&mut ages);

    let users: Vec<User> = rows
        .into_iter()
        .filter_map(|row| {
            let id = row.user_id?;
            Some(User {
                id,
                age: row.age.or(median_age),
                gender: row.gender.unwrap_or_else(|| "Unknown".to_string()),
                region: row.region.unwrap_or_else(|| "Unknown".to_string()),
            })
        })
        .collect();

    if users.len() < total {
        tracing::info!(dropped = total - users.len(), "dropped users without an id");
    }
    Ok(users)
}

fn load_items(path: &Path) -> Result<Vec<CatalogItem>, IngestError> {
    let rows: Vec<RawItem> = read_rows(path)?;
    let total = rows.len();

    let items: Vec<CatalogItem> = rows
        .into_iter()
        .filter_map(|row| {
            let id = row.item_id?;
            let title = row.title?;
            Some(CatalogItem {
                id,
                title,
                content_type: row.content_type.unwrap_or_else(|| "unknown".to_string()),
                genre: row.genre.unwrap_or_else(|| "unknown".to_string()),
            })
        })
        .collect();

    if items.len() < total {
        tracing::info!(dropped = total - items.len(), "dropped items missing id or title");
    }
    Ok(items)
}

fn load_events(
    path: &Path,
    users: &[User],
    items: &[CatalogItem],
) -> Result<Vec<Event>, IngestError> {
    let rows: Vec<RawEvent> = read_rows(path)?;
    let total = rows.len();

    let valid_users: HashSet<&str> = users.iter().map(|u| u.id.as_str()).collect();
    let valid_items: HashSet<&str> = items.iter().map(|i| i.id.as_str()).collect();

    let events: Vec<Event> = rows
        .into_iter()
        .filter_map(|row| {
            let user_id = row.user_id?;
            let item_id = row.item_id?;
            if !valid_users.contains(user_id.as_str()) || !valid_items.contains(item_id.as_str()) {
                return None;
            }
            let kind = row
                .event_type
                .map(|s| EventKind::parse(&s))
                .unwrap_or(EventKind::Play);
            let watch_seconds = row.watch_seconds.unwrap_or(0.0).max(0.0).round() as u32;
            Some(Event {
                user_id,
                item_id,
                kind,
                watch_seconds,
                timestamp: parse_timestamp(row.timestamp.as_deref()),
            })
        })
        .collect();

    if events.len() < total {
        tracing::info!(
            dropped = total - events.len(),
            "dropped invalid or dangling events",
        );
    }
    Ok(events)
}

/// Accepts RFC 3339, `%Y-%m-%d %H:%M:%S` and plain dates; anything else
/// (or a missing value) becomes the Unix epoch.
fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    let Some(s) = raw else {
        return DateTime::<Utc>::UNIX_EPOCH;
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return ts.with_timezone(&Utc);
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Utc.from_utc_datetime(&naive);
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    }
    DateTime::<Utc>::UNIX_EPOCH
}

fn median(values: &mut Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}
