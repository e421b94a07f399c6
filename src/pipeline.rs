//! The category enrichment pipeline.
//!
//! ```text
//! authorize -> resolve_tracklist -> fetch_features -> fetch_analyses -> retry_once
//! ```
//!
//! The first three stages are blocking: each needs the previous stage's
//! output and any failure aborts the run. The analysis stages are best
//! effort: tracks whose analysis cannot be fetched are kept without it and
//! only counted.

use crate::{
    config::Settings,
    error::PipelineError,
    info,
    spotify::{SpotifyApi, features, retry::RetryOptions},
    types::{Credential, ResultSet},
    utils,
};

/// Outcome of one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub category: String,
    pub tracks: ResultSet,
    /// Analysis requests issued in the fan-out.
    pub analysis_requested: usize,
    /// Analysis requests that failed in the fan-out and were retried.
    pub analysis_retried: usize,
    /// Tracks still without analysis after the retry pass.
    pub residual_failures: usize,
}

pub struct Pipeline {
    api: SpotifyApi,
    settings: Settings,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Self {
        Self {
            api: SpotifyApi::from_settings(&settings),
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Authorizes with the configured client credentials.
    pub async fn authorize(&self) -> Result<Credential, PipelineError> {
        self.api
            .authorize(&self.settings.client_id, &self.settings.client_secret)
            .await
    }

    /// Authorizes and enriches the top tracks of `category`.
    pub async fn run(&self, category: &str) -> Result<PipelineReport, PipelineError> {
        let category = utils::validate_category(category)?;
        let credential = self.authorize().await?;
        self.run_with_credential(category, &credential).await
    }

    /// Enriches the top tracks of `category` with an existing credential.
    ///
    /// Several categories can share one credential; nothing from one run
    /// leaks into another.
    pub async fn run_with_credential(
        &self,
        category: &str,
        credential: &Credential,
    ) -> Result<PipelineReport, PipelineError> {
        let category = utils::validate_category(category)?;

        let listing = self.api.resolve_tracklist(category, credential).await?;
        info!("Category {} lists {} tracks", category, listing.len());
        let mut tracks = ResultSet::from_listing(listing);

        let mut features = self.api.fetch_features(&tracks.ids(), credential).await?;
        // feature objects for ids outside the listing are dropped here so
        // they never turn into analysis requests
        features.retain(|id, f| tracks.attach_features(id, f.clone()));
        info!(
            "Attached audio features to {}/{} tracks",
            tracks.count_with_features(),
            tracks.len()
        );

        let requests = features::analysis_requests(&features);
        let analysis_requested = requests.len();
        let batch = self
            .api
            .fetch_analyses(requests, credential, self.settings.max_concurrency)
            .await;
        for (id, analysis) in batch.successes {
            tracks.attach_analysis(&id, analysis);
        }

        let analysis_retried = batch.failures.len();
        let outcome = self
            .api
            .retry_once(batch.failures, credential, self.retry_options())
            .await;
        for (id, analysis) in outcome.successes {
            tracks.attach_analysis(&id, analysis);
        }

        info!(
            "Attached audio analysis to {}/{} tracks",
            tracks.count_with_analysis(),
            tracks.len()
        );

        Ok(PipelineReport {
            category: category.to_string(),
            tracks,
            analysis_requested,
            analysis_retried,
            residual_failures: outcome.residual,
        })
    }

    fn retry_options(&self) -> RetryOptions {
        RetryOptions {
            padding: self.settings.retry_padding,
            policy: self.settings.backoff_policy,
            max_wait: self.settings.max_retry_after,
            limit: self.settings.max_concurrency,
        }
    }
}
