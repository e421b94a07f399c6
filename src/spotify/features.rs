use std::collections::HashMap;

use serde_json::Value;

use crate::{
    error::PipelineError,
    types::{AnalysisRequest, AudioFeaturesResponse, Credential},
    utils,
};

use super::SpotifyApi;

impl SpotifyApi {
    /// Fetches audio features for all given track ids in one request.
    ///
    /// The result is keyed by each feature object's own `id` field; Spotify
    /// does not promise to answer in request order, so position is never
    /// used. `null` entries (unknown ids) are dropped.
    ///
    /// An empty id list short-circuits to an empty map without a request.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Upstream`] on a non-2xx answer,
    /// [`PipelineError::Decode`] on an unexpected body.
    pub async fn fetch_features(
        &self,
        track_ids: &[String],
        credential: &Credential,
    ) -> Result<HashMap<String, Value>, PipelineError> {
        if track_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let api_url = format!(
            "{uri}/audio-features?ids={ids}",
            uri = self.api_url,
            ids = utils::join_ids(track_ids)
        );

        let response = self
            .get_json::<AudioFeaturesResponse>(&api_url, credential)
            .await?;

        Ok(response
            .audio_features
            .into_iter()
            .flatten()
            .filter_map(|features| {
                let id = features.get("id")?.as_str()?.to_string();
                Some((id, features))
            })
            .collect())
    }
}

/// Builds one analysis request per feature object that names an
/// `analysis_url`, ordered by track id.
pub fn analysis_requests(features: &HashMap<String, Value>) -> Vec<AnalysisRequest> {
    let mut requests: Vec<AnalysisRequest> = features
        .iter()
        .filter_map(|(id, f)| {
            let url = f.get("analysis_url")?.as_str()?;
            Some(AnalysisRequest {
                track_id: id.clone(),
                url: url.to_string(),
            })
        })
        .collect();
    requests.sort_by(|a, b| a.track_id.cmp(&b.track_id));
    requests
}
