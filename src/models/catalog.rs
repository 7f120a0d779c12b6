use serde::{Deserialize, Serialize};

/// A viewer known to the platform.
///
/// Only the identifier participates in ranking; the demographic fields are
/// carried through for display and for downstream explanation layers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub age: Option<f64>,
    pub gender: String,
    pub region: String,
}

/// A title in the catalog. Metadata is opaque to the ranking engine and is
/// passed through untouched into recommendation output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: String,
    pub title: String,
    pub content_type: String,
    pub genre: String,
}

impl CatalogItem {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        content_type: impl Into<String>,
        genre: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            content_type: content_type.into(),
            genre: genre.into(),
        }
    }
}
