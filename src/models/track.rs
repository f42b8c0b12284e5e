//! Track model
//!
//! A track is one playable audio item as the catalog describes it. The
//! engine only cares about `id`, `key` and `bpm`; title/artist/artwork are
//! display metadata carried through untouched.

use serde::{Deserialize, Serialize};

/// Key assumed when the catalog cannot supply one
pub const DEFAULT_KEY: &str = "C";

/// Tempo assumed when the catalog cannot supply one
pub const DEFAULT_BPM: u32 = 128;

/// One playable audio item
///
/// `id` is opaque and stable across repeated retrieval from the catalog;
/// set-membership checks (already played, already surfaced) rely on it.
/// `key`/`bpm` are optional because providers may only deliver placeholder
/// metadata; readers go through [`Track::key_or_default`] /
/// [`Track::bpm_or_default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub artist: String,

    /// Display artwork reference, not used by the engine
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Musical key label, e.g. "C", "Am", "F#m"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Tempo in beats per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<u32>,
}

impl Track {
    /// Minimal track carrying only an id
    ///
    /// Used when detail resolution fails at commit time: the commit still
    /// goes through with this stub rather than being blocked.
    pub fn stub(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            artist: String::new(),
            image_url: None,
            key: None,
            bpm: None,
        }
    }

    pub fn key_or_default(&self) -> &str {
        self.key.as_deref().unwrap_or(DEFAULT_KEY)
    }

    pub fn bpm_or_default(&self) -> u32 {
        self.bpm.unwrap_or(DEFAULT_BPM)
    }
}
