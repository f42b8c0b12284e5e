//! Scope browsing endpoint
//!
//! GET /tracks - trending tracks for a genre/country, independent of any
//! session. Clients use it to pick an opening track before a set starts.

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::models::Track;
use crate::AppState;

fn default_genre() -> String {
    "techno".to_string()
}

fn default_country() -> String {
    "Germany".to_string()
}

/// GET /tracks query parameters
#[derive(Debug, Deserialize)]
pub struct ScopeQuery {
    #[serde(default = "default_genre")]
    pub genre: String,
    #[serde(default = "default_country")]
    pub country: String,
}

/// GET /tracks response
#[derive(Debug, Serialize)]
pub struct TrendingResponse {
    pub tracks: Vec<Track>,
}

/// GET /tracks?genre=&country=
pub async fn get_trending(
    State(state): State<AppState>,
    Query(query): Query<ScopeQuery>,
) -> Json<TrendingResponse> {
    let tracks = state.recommender.trending(&query.genre, &query.country).await;
    Json(TrendingResponse { tracks })
}

/// Build browse routes
pub fn browse_routes() -> Router<AppState> {
    Router::new().route("/tracks", get(get_trending))
}
