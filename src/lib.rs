//! Streaming recommendation service.
//!
//! The interesting part lives in [`engine`]: weighted interaction
//! aggregation, item-item cosine similarity, global popularity ranking and
//! personalized item-based collaborative filtering with popularity
//! fallback. [`ingest`] turns raw CSV exports into the clean collections
//! the engine expects, and [`api`] serves the rankings over HTTP.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod middleware;
pub mod models;
