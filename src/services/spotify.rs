//! Spotify catalog client
//!
//! Implements the [`TrackCatalog`] boundary against the Spotify Web API
//! using the client-credentials flow. Search results arrive without audio
//! analysis, so candidates carry placeholder key/tempo (defaulted by the
//! engine); per-track audio features are only fetched when a single track
//! is resolved at commit time.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::config::SpotifyConfig;
use crate::models::Track;
use crate::services::catalog::{CatalogError, TrackCatalog};

const USER_AGENT: &str = concat!("cuedeck/", env!("CARGO_PKG_VERSION"));
const SEARCH_PAGE_SIZE: u32 = 50;

/// Candidate fetches randomize the search offset within this bound so
/// successive cycles see varied pools
const MAX_SEARCH_OFFSET: u32 = 100;

/// Tokens are refreshed this many seconds before their stated expiry
const TOKEN_EXPIRY_SLACK_SECS: i64 = 60;

/// Pitch class names as Spotify's audio analysis numbers them (0 = C)
const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Country display name → Spotify market code; unknown names fall back
/// to the US market
fn market_code(country: &str) -> &'static str {
    match country.trim().to_lowercase().as_str() {
        "united states" => "US",
        "germany" => "DE",
        "united kingdom" => "GB",
        "france" => "FR",
        "canada" => "CA",
        "australia" => "AU",
        "brazil" => "BR",
        "india" => "IN",
        "japan" => "JP",
        "mexico" => "MX",
        _ => "US",
    }
}

/// Key label from Spotify's pitch-class integer and mode flag
/// (mode 0 = minor, 1 = major); `None` when the key is unanalyzed (-1)
fn key_label(key: i32, mode: i32) -> Option<String> {
    let name = PITCH_NAMES.get(usize::try_from(key).ok()?)?;
    if mode == 0 {
        Some(format!("{}m", name))
    } else {
        Some(name.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: SearchTracks,
}

#[derive(Debug, Deserialize)]
struct SearchTracks {
    items: Vec<ApiTrack>,
}

#[derive(Debug, Deserialize)]
struct ApiTrack {
    id: String,
    name: String,
    #[serde(default)]
    artists: Vec<ApiArtist>,
    album: Option<ApiAlbum>,
}

#[derive(Debug, Deserialize)]
struct ApiArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiAlbum {
    #[serde(default)]
    images: Vec<ApiImage>,
}

#[derive(Debug, Deserialize)]
struct ApiImage {
    url: String,
}

#[derive(Debug, Deserialize)]
struct AudioFeatures {
    key: Option<i32>,
    mode: Option<i32>,
    tempo: Option<f64>,
}

impl From<ApiTrack> for Track {
    fn from(api: ApiTrack) -> Self {
        Track {
            id: api.id,
            title: api.name,
            artist: api
                .artists
                .into_iter()
                .next()
                .map(|a| a.name)
                .unwrap_or_default(),
            image_url: api
                .album
                .and_then(|album| album.images.into_iter().next())
                .map(|image| image.url),
            key: None,
            bpm: None,
        }
    }
}

struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

/// Spotify Web API client
pub struct SpotifyCatalog {
    http: reqwest::Client,
    config: SpotifyConfig,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyCatalog {
    pub fn new(config: SpotifyConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
        })
    }

    /// Current access token, fetching a fresh one when the cache is
    /// empty or about to expire
    async fn access_token(&self) -> Result<String, CatalogError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.expires_at > Utc::now() {
                return Ok(token.access_token.clone());
            }
        }

        let (client_id, client_secret) = match (&self.config.client_id, &self.config.client_secret)
        {
            (Some(id), Some(secret)) => (id.as_str(), secret.as_str()),
            _ => {
                return Err(CatalogError::Auth(
                    "Spotify client credentials not configured".to_string(),
                ))
            }
        };

        let response = self
            .http
            .post(&self.config.auth_url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::Auth(format!(
                "token endpoint returned {}",
                status.as_u16()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let lifetime = (token.expires_in - TOKEN_EXPIRY_SLACK_SECS).max(0);
        *cached = Some(CachedToken {
            access_token: token.access_token.clone(),
            expires_at: Utc::now() + chrono::Duration::seconds(lifetime),
        });

        tracing::debug!(expires_in = token.expires_in, "obtained Spotify access token");
        Ok(token.access_token)
    }

    /// Genre-scoped track search at the given result offset
    async fn search_tracks(
        &self,
        genre: &str,
        country: &str,
        offset: u32,
    ) -> Result<Vec<Track>, CatalogError> {
        let token = self.access_token().await?;
        let market = market_code(country);
        let url = format!("{}/search", self.config.api_base);
        let query = format!("genre:\"{}\"", genre);
        let limit = SEARCH_PAGE_SIZE.to_string();
        let offset_param = offset.to_string();

        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(&[
                ("q", query.as_str()),
                ("type", "track"),
                ("market", market),
                ("limit", limit.as_str()),
                ("offset", offset_param.as_str()),
            ])
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 {
            // Token revoked out from under the cache; drop it so the next
            // call re-authenticates
            self.token.lock().await.take();
            return Err(CatalogError::Auth("access token rejected".to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), body));
        }

        let results: SearchResponse = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;

        let tracks: Vec<Track> = results
            .tracks
            .items
            .into_iter()
            .filter(|t| !t.id.is_empty() && !t.name.is_empty())
            .map(Track::from)
            .collect();

        tracing::debug!(
            genre,
            market,
            offset,
            count = tracks.len(),
            "fetched tracks from Spotify search"
        );
        Ok(tracks)
    }
}

#[async_trait]
impl TrackCatalog for SpotifyCatalog {
    async fn fetch_candidates(
        &self,
        genre: &str,
        country: &str,
        exclude_ids: &HashSet<String>,
    ) -> Result<Vec<Track>, CatalogError> {
        let offset = rand::thread_rng().gen_range(0..=MAX_SEARCH_OFFSET);
        let tracks = self.search_tracks(genre, country, offset).await?;
        Ok(tracks
            .into_iter()
            .filter(|t| !exclude_ids.contains(&t.id))
            .collect())
    }

    async fn fetch_trending(
        &self,
        genre: &str,
        country: &str,
    ) -> Result<Vec<Track>, CatalogError> {
        let tracks = self.search_tracks(genre, country, 0).await?;
        tracing::info!(
            genre,
            country,
            count = tracks.len(),
            "fetched trending tracks"
        );
        Ok(tracks)
    }

    async fn resolve_detail(&self, track_id: &str) -> Result<Option<Track>, CatalogError> {
        let token = self.access_token().await?;

        let url = format!("{}/tracks/{}", self.config.api_base, track_id);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::Api(status.as_u16(), body));
        }

        let api_track: ApiTrack = response
            .json()
            .await
            .map_err(|e| CatalogError::Parse(e.to_string()))?;
        let mut track = Track::from(api_track);

        // Audio features are best-effort: a track without them still
        // resolves, the engine defaults key/tempo
        let features_url = format!("{}/audio-features/{}", self.config.api_base, track_id);
        match self.http.get(&features_url).bearer_auth(&token).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<AudioFeatures>().await {
                    Ok(features) => {
                        if let (Some(key), Some(mode)) = (features.key, features.mode) {
                            track.key = key_label(key, mode);
                        }
                        track.bpm = features
                            .tempo
                            .filter(|t| *t > 0.0)
                            .map(|t| t.round() as u32);
                    }
                    Err(e) => {
                        tracing::warn!(track_id, error = %e, "unparsable audio features");
                    }
                }
            }
            Ok(response) => {
                tracing::warn!(
                    track_id,
                    status = response.status().as_u16(),
                    "audio features unavailable"
                );
            }
            Err(e) => {
                tracing::warn!(track_id, error = %e, "audio features request failed");
            }
        }

        tracing::info!(
            track_id,
            title = %track.title,
            key = track.key.as_deref().unwrap_or("-"),
            bpm = track.bpm.unwrap_or(0),
            "resolved track detail"
        );
        Ok(Some(track))
    }
}
