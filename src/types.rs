use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tabled::Tabled;

/// Bearer credential obtained from the client-credentials exchange.
///
/// Passed explicitly into every API call so independent pipeline runs never
/// share session state.
#[derive(Debug, Clone)]
pub struct Credential {
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryPlaylistsResponse {
    pub playlists: PlaylistPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistPage {
    // Spotify returns null entries for playlists that are no longer available
    pub items: Vec<Option<PlaylistSummary>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistSummary {
    pub id: String,
    pub name: String,
    pub tracks: PlaylistTracksRef,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracksRef {
    pub href: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracksResponse {
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<PlaylistTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTrack {
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub popularity: u8,
}

/// One entry of a category's track listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListedTrack {
    pub id: String,
    pub name: String,
    pub popularity: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeaturesResponse {
    pub audio_features: Vec<Option<Value>>,
}

/// A listed track and whatever enrichment has been attached to it so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    pub id: String,
    pub name: String,
    pub popularity: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Value>,
}

impl From<ListedTrack> for TrackRecord {
    fn from(track: ListedTrack) -> Self {
        TrackRecord {
            id: track.id,
            name: track.name,
            popularity: track.popularity,
            features: None,
            analysis: None,
        }
    }
}

/// Track records of one category keyed by track id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet(BTreeMap<String, TrackRecord>);

impl ResultSet {
    pub fn from_listing(listing: Vec<ListedTrack>) -> Self {
        Self(
            listing
                .into_iter()
                .map(|t| (t.id.clone(), TrackRecord::from(t)))
                .collect(),
        )
    }

    pub fn get(&self, id: &str) -> Option<&TrackRecord> {
        self.0.get(id)
    }

    pub fn ids(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &TrackRecord> {
        self.0.values()
    }

    /// Attaches features to the record with the same id. Unknown ids are
    /// ignored and reported as `false`.
    pub fn attach_features(&mut self, id: &str, features: Value) -> bool {
        match self.0.get_mut(id) {
            Some(record) => {
                record.features = Some(features);
                true
            }
            None => false,
        }
    }

    pub fn attach_analysis(&mut self, id: &str, analysis: Value) -> bool {
        match self.0.get_mut(id) {
            Some(record) => {
                record.analysis = Some(analysis);
                true
            }
            None => false,
        }
    }

    pub fn count_with_features(&self) -> usize {
        self.0.values().filter(|r| r.features.is_some()).count()
    }

    pub fn count_with_analysis(&self) -> usize {
        self.0.values().filter(|r| r.analysis.is_some()).count()
    }
}

/// A per-track analysis request. The track id travels with the request so a
/// completion never has to be matched back by parsing its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub track_id: String,
    pub url: String,
}

/// A failed analysis request awaiting the retry pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub track_id: String,
    pub url: String,
    /// `None` when no HTTP response was received.
    pub status: Option<u16>,
    /// Seconds from the `Retry-After` header, `None` when absent.
    pub retry_after: Option<u64>,
}

impl FailureRecord {
    pub fn is_rate_limited(&self) -> bool {
        self.status == Some(429)
    }

    pub fn request(&self) -> AnalysisRequest {
        AnalysisRequest {
            track_id: self.track_id.clone(),
            url: self.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AnalysisBatch {
    pub successes: Vec<(String, Value)>,
    pub failures: Vec<FailureRecord>,
}

#[derive(Debug, Clone, Default)]
pub struct RetryOutcome {
    pub successes: Vec<(String, Value)>,
    pub residual: usize,
}

#[derive(Tabled)]
pub struct CategoryTableRow {
    pub key: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub name: String,
    pub popularity: u8,
    pub tempo: String,
    pub energy: String,
    pub analysis: String,
}
