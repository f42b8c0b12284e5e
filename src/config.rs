//! Configuration resolution for cuedeck
//!
//! Layered priority, highest first: command line (handled by the binary's
//! clap layer) → `CUEDECK_*` environment variables → TOML config file
//! (`~/.config/cuedeck/config.toml`, or an explicit `--config` path) →
//! compiled defaults. Spotify credentials additionally fall back to the
//! bare `SPOTIFY_CLIENT_ID`/`SPOTIFY_CLIENT_SECRET` names.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::services::recommender::RecommenderSettings;

/// Default listen address
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5727";

const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/api/token";
const DEFAULT_API_BASE: &str = "https://api.spotify.com/v1";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// On-disk configuration shape (all fields optional)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub bind_address: Option<String>,
    #[serde(default)]
    pub spotify: SpotifyToml,
    #[serde(default)]
    pub recommender: RecommenderToml,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyToml {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub auth_url: Option<String>,
    pub api_base: Option<String>,
    pub http_timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommenderToml {
    pub bpm_tolerance: Option<u32>,
    pub top_n: Option<usize>,
    pub retry_delay_ms: Option<u64>,
}

/// Resolved catalog client settings
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    /// Client credentials; the service starts without them, but catalog
    /// calls degrade to empty results until they are configured
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub auth_url: String,
    pub api_base: String,
    pub http_timeout: Duration,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub spotify: SpotifyConfig,
    pub recommender: RecommenderSettings,
}

impl Config {
    /// Load configuration from the given path (or the default location)
    /// and apply environment overrides.
    ///
    /// An explicit path that cannot be read or parsed is an error; a
    /// missing default-location file silently falls back to defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let toml_config = match explicit_path {
            Some(path) => read_toml(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_toml(&path)?,
                _ => {
                    debug!("no config file found, using defaults");
                    TomlConfig::default()
                }
            },
        };
        Ok(resolve_with(toml_config, &|name: &str| {
            std::env::var(name).ok().filter(|v| !v.trim().is_empty())
        }))
    }
}

fn read_toml(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("cuedeck").join("config.toml"))
}

/// Merge environment over TOML over defaults
///
/// The environment lookup is injected so tier resolution is testable
/// without mutating process state.
fn resolve_with(toml: TomlConfig, env: &dyn Fn(&str) -> Option<String>) -> Config {
    let client_id = env("CUEDECK_SPOTIFY_CLIENT_ID")
        .or_else(|| env("SPOTIFY_CLIENT_ID"))
        .or(toml.spotify.client_id);
    let client_secret = env("CUEDECK_SPOTIFY_CLIENT_SECRET")
        .or_else(|| env("SPOTIFY_CLIENT_SECRET"))
        .or(toml.spotify.client_secret);

    let http_timeout_secs = env("CUEDECK_HTTP_TIMEOUT_SECS")
        .and_then(|v| v.parse().ok())
        .or(toml.spotify.http_timeout_secs)
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS);

    let defaults = RecommenderSettings::default();
    let recommender = RecommenderSettings {
        bpm_tolerance: env("CUEDECK_BPM_TOLERANCE")
            .and_then(|v| v.parse().ok())
            .or(toml.recommender.bpm_tolerance)
            .unwrap_or(defaults.bpm_tolerance),
        top_n: env("CUEDECK_TOP_N")
            .and_then(|v| v.parse().ok())
            .or(toml.recommender.top_n)
            .unwrap_or(defaults.top_n),
        retry_delay: env("CUEDECK_RETRY_DELAY_MS")
            .and_then(|v| v.parse().ok())
            .or(toml.recommender.retry_delay_ms)
            .map(Duration::from_millis)
            .unwrap_or(defaults.retry_delay),
    };

    Config {
        bind_address: env("CUEDECK_BIND_ADDRESS")
            .or(toml.bind_address)
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string()),
        spotify: SpotifyConfig {
            client_id,
            client_secret,
            auth_url: toml
                .spotify
                .auth_url
                .unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            api_base: toml
                .spotify
                .api_base
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
            http_timeout: Duration::from_secs(http_timeout_secs),
        },
        recommender,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn empty_toml_resolves_to_defaults() {
        let config = resolve_with(TomlConfig::default(), &no_env);
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert_eq!(config.spotify.api_base, DEFAULT_API_BASE);
        assert!(config.spotify.client_id.is_none());
        assert_eq!(config.recommender.bpm_tolerance, 5);
        assert_eq!(config.recommender.top_n, 5);
    }

    #[test]
    fn toml_values_override_defaults() {
        let toml: TomlConfig = toml::from_str(
            r#"
            bind_address = "0.0.0.0:9000"

            [spotify]
            client_id = "abc"
            client_secret = "def"
            http_timeout_secs = 3

            [recommender]
            bpm_tolerance = 8
            top_n = 10
            retry_delay_ms = 250
            "#,
        )
        .unwrap();

        let config = resolve_with(toml, &no_env);
        assert_eq!(config.bind_address, "0.0.0.0:9000");
        assert_eq!(config.spotify.client_id.as_deref(), Some("abc"));
        assert_eq!(config.spotify.http_timeout, Duration::from_secs(3));
        assert_eq!(config.recommender.bpm_tolerance, 8);
        assert_eq!(config.recommender.top_n, 10);
        assert_eq!(config.recommender.retry_delay, Duration::from_millis(250));
    }

    #[test]
    fn environment_overrides_toml() {
        let toml: TomlConfig = toml::from_str(
            r#"
            bind_address = "0.0.0.0:9000"

            [spotify]
            client_id = "from-toml"
            "#,
        )
        .unwrap();

        let env = |name: &str| match name {
            "CUEDECK_BIND_ADDRESS" => Some("127.0.0.1:5800".to_string()),
            "SPOTIFY_CLIENT_ID" => Some("from-env".to_string()),
            _ => None,
        };

        let config = resolve_with(toml, &env);
        assert_eq!(config.bind_address, "127.0.0.1:5800");
        assert_eq!(config.spotify.client_id.as_deref(), Some("from-env"));
    }

    #[test]
    fn prefixed_env_wins_over_bare_spotify_names() {
        let env = |name: &str| match name {
            "CUEDECK_SPOTIFY_CLIENT_ID" => Some("prefixed".to_string()),
            "SPOTIFY_CLIENT_ID" => Some("bare".to_string()),
            _ => None,
        };
        let config = resolve_with(TomlConfig::default(), &env);
        assert_eq!(config.spotify.client_id.as_deref(), Some("prefixed"));
    }
}
