//! CSV ingestion and null-cleansing.
//!
//! Produces the already-clean collections the ranking engine consumes. All
//! validation lives here; the engine assumes referential integrity.

mod loader;

use std::path::PathBuf;

use thiserror::Error;

pub use loader::{load_dir, LoadedData};

/// Failures while reading or parsing the source CSV files.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
