use futures::{StreamExt, stream};
use reqwest::StatusCode;
use serde_json::Value;

use crate::{
    types::{AnalysisBatch, AnalysisRequest, Credential, FailureRecord},
    utils,
};

use super::SpotifyApi;

impl SpotifyApi {
    /// Requests the audio analysis of every track concurrently.
    ///
    /// At most `limit` requests are in flight at once; completions arrive in
    /// any order and are paired with the track id carried by their request.
    /// A `200 OK` with a JSON body is a success, anything else becomes a
    /// [`FailureRecord`]. Individual failures never abort the batch.
    pub async fn fetch_analyses(
        &self,
        requests: Vec<AnalysisRequest>,
        credential: &Credential,
        limit: usize,
    ) -> AnalysisBatch {
        let api = self;
        let results: Vec<Result<(String, Value), FailureRecord>> = stream::iter(requests)
            .map(move |request| async move {
                api.fetch_analysis(&request, credential)
                    .await
                    .map(|analysis| (request.track_id, analysis))
            })
            .buffer_unordered(limit.max(1))
            .collect()
            .await;

        let mut batch = AnalysisBatch::default();
        for result in results {
            match result {
                Ok(success) => batch.successes.push(success),
                Err(failure) => batch.failures.push(failure),
            }
        }
        batch
    }

    /// Issues a single analysis request and classifies the answer.
    ///
    /// # Arguments
    ///
    /// * `request` - Track id and the `analysis_url` from its audio features
    /// * `credential` - Bearer credential from [`SpotifyApi::authorize`]
    ///
    /// # Returns
    ///
    /// The analysis document on `200 OK` with a JSON body. Otherwise a
    /// [`FailureRecord`] with:
    /// - the response status and parsed `Retry-After` for non-200 answers
    /// - status `200` when the body is not valid JSON
    /// - no status when the request never got a response (connection
    ///   refused, timeout)
    ///
    /// # Example
    ///
    /// ```ignore
    /// let request = AnalysisRequest {
    ///     track_id: "4uLU6hMCjMI75M1A2tKUQC".to_string(),
    ///     url: "https://api.spotify.com/v1/audio-analysis/4uLU6hMCjMI75M1A2tKUQC".to_string(),
    /// };
    /// match api.fetch_analysis(&request, &credential).await {
    ///     Ok(analysis) => println!("{}", analysis["track"]["duration"]),
    ///     Err(failure) => println!("failed with {:?}", failure.status),
    /// }
    /// ```
    pub async fn fetch_analysis(
        &self,
        request: &AnalysisRequest,
        credential: &Credential,
    ) -> Result<Value, FailureRecord> {
        let failure = |status: Option<u16>, retry_after: Option<u64>| FailureRecord {
            track_id: request.track_id.clone(),
            url: request.url.clone(),
            status,
            retry_after,
        };

        let response = match self
            .client
            .get(&request.url)
            .bearer_auth(&credential.access_token)
            .send()
            .await
        {
            Ok(response) => response,
            // network or reqwest error
            Err(err) => return Err(failure(err.status().map(|s| s.as_u16()), None)),
        };

        let status = response.status();
        if status != StatusCode::OK {
            let retry_after = utils::parse_retry_after(response.headers());
            return Err(failure(Some(status.as_u16()), retry_after));
        }

        response
            .json::<Value>()
            .await
            .map_err(|_| failure(Some(status.as_u16()), None))
    }
}
