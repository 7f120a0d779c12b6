use axum::{extract::Query, extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::engine::Snapshot;
use crate::error::{AppError, AppResult};
use crate::ingest;
use crate::models::{Recommendation, WatchRecord};

use super::AppState;

const DEFAULT_K: usize = 10;
const MAX_K: usize = 50;
const DEFAULT_HISTORY_LIMIT: usize = 20;
const MAX_HISTORY_LIMIT: usize = 100;

// Request/Response types

#[derive(Debug, Deserialize)]
pub struct PopularParams {
    pub k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct PopularResponse {
    pub k: usize,
    pub items: Vec<Recommendation>,
    pub total_items: usize,
}

#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub user_id: String,
    pub k: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub user_id: String,
    pub k: usize,
    pub items: Vec<Recommendation>,
    pub fallback_used: bool,
    pub total_recommendations: usize,
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub user_id: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub user_id: String,
    pub total_events: usize,
    pub history: Vec<WatchRecord>,
}

#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub users: usize,
    pub items: usize,
    pub events: usize,
}

fn validate_k(k: Option<usize>) -> AppResult<usize> {
    let k = k.unwrap_or(DEFAULT_K);
    if (1..=MAX_K).contains(&k) {
        Ok(k)
    } else {
        Err(AppError::InvalidInput(format!(
            "k must be between 1 and {MAX_K}, got {k}"
        )))
    }
}

// Handlers

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "message": "Recommendation system is running"
    }))
}

/// Global popularity top-k
pub async fn get_popular(
    State(state): State<AppState>,
    Query(params): Query<PopularParams>,
) -> AppResult<Json<PopularResponse>> {
    let k = validate_k(params.k)?;
    let snapshot = state.current().await;
    let items = snapshot.popular(k)?;

    Ok(Json(PopularResponse {
        k,
        total_items: items.len(),
        items,
    }))
}

/// Personalized recommendations for a user
pub async fn get_recommendations(
    State(state): State<AppState>,
    Query(params): Query<RecommendationParams>,
) -> AppResult<Json<RecommendationResponse>> {
    let k = validate_k(params.k)?;
    let snapshot = state.current().await;
    let (items, fallback_used) = snapshot.recommend(&params.user_id, k)?;

    Ok(Json(RecommendationResponse {
        user_id: params.user_id,
        k,
        fallback_used,
        total_recommendations: items.len(),
        items,
    }))
}

/// A user's watch history, heaviest watch first
pub async fn get_user_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<HistoryResponse>> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
        return Err(AppError::InvalidInput(format!(
            "limit must be between 1 and {MAX_HISTORY_LIMIT}, got {limit}"
        )));
    }

    let snapshot = state.current().await;
    let mut history = snapshot.user_history(&params.user_id)?;
    let total_events = history.len();
    history.truncate(limit);

    Ok(Json(HistoryResponse {
        user_id: params.user_id,
        total_events,
        history,
    }))
}

/// Rebuilds the snapshot from the data directory and swaps it in
pub async fn reload(State(state): State<AppState>) -> AppResult<Json<ReloadResponse>> {
    let data = ingest::load_dir(std::path::Path::new(&state.config.data_dir))?;
    let snapshot = Snapshot::build(data.users, data.items, data.events)?;

    let response = ReloadResponse {
        users: snapshot.user_count(),
        items: snapshot.item_count(),
        events: snapshot.event_count(),
    };
    state.publish(snapshot).await;
    tracing::info!(
        users = response.users,
        items = response.items,
        events = response.events,
        "snapshot reloaded",
    );

    Ok(Json(response))
}
