//! # Spotify Integration Module
//!
//! Thin client for the parts of the Spotify Web API the enrichment pipeline
//! talks to. Every operation takes the [`Credential`] explicitly; the client
//! itself only holds the HTTP connection pool and the endpoint URLs, so one
//! [`SpotifyApi`] can serve any number of independent runs.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - client-credentials exchange ([`auth`])
//! - `GET /browse/categories/{id}/playlists` and the playlist `tracks.href`
//!   ([`categories`])
//! - `GET /audio-features?ids=` ([`features`])
//! - `GET /audio-analysis/{id}` via the feature's `analysis_url` ([`analysis`])
//!
//! ## Failure Policy
//!
//! Token, listing and feature calls are blocking stages: any non-2xx answer
//! is returned as [`PipelineError::Upstream`]. Analysis calls never fail the
//! caller; they are classified into [`crate::types::FailureRecord`]s and
//! handed to the single retry pass in [`retry`].

pub mod analysis;
pub mod auth;
pub mod categories;
pub mod features;
pub mod retry;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{config::Settings, error::PipelineError, types::Credential};

/// HTTP client bound to a pair of Spotify endpoints.
#[derive(Debug, Clone)]
pub struct SpotifyApi {
    client: Client,
    api_url: String,
    token_url: String,
}

impl SpotifyApi {
    pub fn new(api_url: &str, token_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
            token_url: token_url.to_string(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(&settings.api_url, &settings.token_url)
    }

    /// GET for the blocking stages. Non-2xx and transport failures become
    /// `Upstream`, an unreadable body becomes `Decode`.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        credential: &Credential,
    ) -> Result<T, PipelineError> {
        let response = self
            .client
            .get(url)
            .bearer_auth(&credential.access_token)
            .send()
            .await
            .map_err(|e| PipelineError::upstream(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Upstream {
                status: Some(status.as_u16()),
                url: url.to_string(),
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| PipelineError::Decode {
                url: url.to_string(),
                source,
            })
    }
}
