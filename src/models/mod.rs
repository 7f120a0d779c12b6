mod catalog;
mod event;
mod recommendation;

pub use catalog::{CatalogItem, User};
pub use event::{Event, EventKind};
pub use recommendation::{Recommendation, WatchRecord};
