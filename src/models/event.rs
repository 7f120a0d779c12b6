use std::fmt::{self, Display};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Categorical label for a user action on a title.
///
/// The set of known kinds is fixed; anything else coming out of the event
/// stream is preserved verbatim in `Other` rather than rejected, since
/// unknown kinds still carry a default engagement weight.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    Play,
    Complete,
    Like,
    Save,
    Pause,
    Skip,
    Other(String),
}

impl EventKind {
    pub fn parse(s: &str) -> Self {
        match s {
            "play" => EventKind::Play,
            "complete" => EventKind::Complete,
            "like" => EventKind::Like,
            "save" => EventKind::Save,
            "pause" => EventKind::Pause,
            "skip" => EventKind::Skip,
            other => EventKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventKind::Play => "play",
            EventKind::Complete => "complete",
            EventKind::Like => "like",
            EventKind::Save => "save",
            EventKind::Pause => "pause",
            EventKind::Skip => "skip",
            EventKind::Other(s) => s,
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for EventKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(EventKind::parse(&s))
    }
}

/// One recorded interaction between a user and a title.
///
/// Multiple events may exist for the same (user, item) pair; the engine
/// aggregates them and never overwrites.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub user_id: String,
    pub item_id: String,
    pub kind: EventKind,
    pub watch_seconds: u32,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_kinds() {
        assert_eq!(EventKind::parse("play"), EventKind::Play);
        assert_eq!(EventKind::parse("complete"), EventKind::Complete);
        assert_eq!(EventKind::parse("like"), EventKind::Like);
        assert_eq!(EventKind::parse("save"), EventKind::Save);
        assert_eq!(EventKind::parse("pause"), EventKind::Pause);
        assert_eq!(EventKind::parse("skip"), EventKind::Skip);
    }

    #[test]
    fn test_parse_unknown_kind_preserved() {
        let kind = EventKind::parse("rewind");
        assert_eq!(kind, EventKind::Other("rewind".to_string()));
        assert_eq!(kind.as_str(), "rewind");
    }

    #[test]
    fn test_kind_serde_round_trip() {
        let json = serde_json::to_string(&EventKind::Complete).unwrap();
        assert_eq!(json, "\"complete\"");

        let back: EventKind = serde_json::from_str("\"skip\"").unwrap();
        assert_eq!(back, EventKind::Skip);
    }
}
