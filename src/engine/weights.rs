use crate::models::EventKind;

/// Engagement multiplier for an event kind.
///
/// Completing a title is the strongest signal, skipping the weakest; kinds
/// the table does not know about count as a plain play.
pub fn event_weight(kind: &EventKind) -> f64 {
    match kind {
        EventKind::Play => 1.0,
        EventKind::Complete => 3.0,
        EventKind::Like => 2.5,
        EventKind::Save => 2.0,
        EventKind::Pause => 0.5,
        EventKind::Skip => 0.1,
        EventKind::Other(_) => 1.0,
    }
}
