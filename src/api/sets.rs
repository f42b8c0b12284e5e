//! Set lifecycle API handlers
//!
//! POST /set/start, POST /set/tracks, GET /set/tracks, GET /set/suggestions

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::{ResolutionStatus, Track};
use crate::AppState;

/// POST /set/start request
#[derive(Debug, Deserialize)]
pub struct StartSetRequest {
    #[serde(default)]
    pub user_id: String,
    /// Genre scope; empty means unscoped
    #[serde(default)]
    pub genre: String,
    /// Country scope; empty means unscoped
    #[serde(default)]
    pub country: String,
}

/// POST /set/start response
#[derive(Debug, Serialize)]
pub struct StartSetResponse {
    pub session_id: Uuid,
    pub genre: String,
    pub country: String,
    /// Trending seed pool, so a client can offer opening tracks
    pub suggestions: Vec<Track>,
}

/// POST /set/tracks request
#[derive(Debug, Deserialize)]
pub struct CommitTrackRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub track_id: String,
}

/// POST /set/tracks response
#[derive(Debug, Serialize)]
pub struct CommitTrackResponse {
    /// The committed track exactly as stored
    pub track: Track,
    pub resolution: ResolutionStatus,
    /// Refreshed suggestion pool for the next transition
    pub suggestions: Vec<Track>,
}

/// Query parameters naming the acting user
#[derive(Debug, Deserialize)]
pub struct UserQuery {
    pub user_id: String,
}

/// GET /set/tracks response
#[derive(Debug, Serialize)]
pub struct SetTracksResponse {
    pub tracks: Vec<Track>,
}

/// GET /set/suggestions response
#[derive(Debug, Serialize)]
pub struct SuggestionsResponse {
    pub suggestions: Vec<Track>,
}

/// POST /set/start
///
/// Starts (or restarts) the user's set session for a genre/country scope.
pub async fn start_set(
    State(state): State<AppState>,
    Json(request): Json<StartSetRequest>,
) -> ApiResult<Json<StartSetResponse>> {
    let session = state
        .recommender
        .start_session(&request.user_id, &request.genre, &request.country)
        .await?;

    Ok(Json(StartSetResponse {
        session_id: session.session_id,
        genre: session.genre,
        country: session.country,
        suggestions: session.suggestions,
    }))
}

/// POST /set/tracks
///
/// Commits a track to the set and returns it as stored together with the
/// refreshed suggestions.
pub async fn commit_track(
    State(state): State<AppState>,
    Json(request): Json<CommitTrackRequest>,
) -> ApiResult<Json<CommitTrackResponse>> {
    let outcome = state
        .recommender
        .commit_track(&request.user_id, &request.track_id)
        .await?;

    Ok(Json(CommitTrackResponse {
        track: outcome.track,
        resolution: outcome.resolution,
        suggestions: outcome.suggestions,
    }))
}

/// GET /set/tracks?user_id=
///
/// The committed set list in playback order; empty when no session exists.
pub async fn get_set_tracks(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<SetTracksResponse>> {
    let tracks = state.recommender.committed_tracks(&query.user_id).await;
    Ok(Json(SetTracksResponse { tracks }))
}

/// GET /set/suggestions?user_id=
///
/// Re-derives recommendations from the most recently committed track.
pub async fn get_suggestions(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<SuggestionsResponse>> {
    let suggestions = state.recommender.suggestions(&query.user_id).await?;
    Ok(Json(SuggestionsResponse { suggestions }))
}

/// Build set lifecycle routes
pub fn set_routes() -> Router<AppState> {
    Router::new()
        .route("/set/start", post(start_set))
        .route("/set/tracks", post(commit_track).get(get_set_tracks))
        .route("/set/suggestions", get(get_suggestions))
}
