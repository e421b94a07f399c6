use std::time::Duration;

use tokio::time::sleep;

use crate::{
    config::BackoffPolicy,
    info,
    types::{AnalysisRequest, Credential, FailureRecord, RetryOutcome},
    warning,
};

use super::SpotifyApi;

/// Knobs of the single retry pass.
#[derive(Debug, Clone, Copy)]
pub struct RetryOptions {
    /// Added on top of the `Retry-After` seconds of the deciding 429.
    pub padding: Duration,
    pub policy: BackoffPolicy,
    /// Upper bound for the honoured `Retry-After`.
    pub max_wait: Duration,
    /// Maximum number of retry requests in flight.
    pub limit: usize,
}

/// Computes how long to wait before the retry pass.
///
/// Only rate-limited failures (status 429) count. Under
/// [`BackoffPolicy::First`] the first one found decides, under
/// [`BackoffPolicy::Max`] the largest `Retry-After` does. A missing
/// `Retry-After` counts as zero seconds. Without any 429 there is no wait.
///
/// A `Retry-After` above `options.max_wait` is clamped to it, so a hostile
/// or broken header can neither overflow the delay nor stall the run.
pub fn backoff_delay(failures: &[FailureRecord], options: &RetryOptions) -> Duration {
    let mut rate_limited = failures.iter().filter(|f| f.is_rate_limited());

    let retry_after = match options.policy {
        BackoffPolicy::First => rate_limited.next().map(|f| f.retry_after.unwrap_or(0)),
        BackoffPolicy::Max => rate_limited.map(|f| f.retry_after.unwrap_or(0)).max(),
    };

    let Some(secs) = retry_after else {
        return Duration::ZERO;
    };

    let mut wait = Duration::from_secs(secs);
    if wait > options.max_wait {
        warning!(
            "Retry-After of {} seconds exceeds the maximum, waiting {} seconds instead",
            secs,
            options.max_wait.as_secs()
        );
        wait = options.max_wait;
    }
    wait.saturating_add(options.padding)
}

impl SpotifyApi {
    /// Re-issues every failed analysis request exactly once.
    ///
    /// Waits for [`backoff_delay`], then requests all failed URLs
    /// concurrently. Successes are returned keyed by the id carried with each
    /// failure; every retry that fails again is only counted as residual.
    /// With no failures this returns immediately without waiting.
    pub async fn retry_once(
        &self,
        failures: Vec<FailureRecord>,
        credential: &Credential,
        options: RetryOptions,
    ) -> RetryOutcome {
        if failures.is_empty() {
            return RetryOutcome::default();
        }

        let delay = backoff_delay(&failures, &options);
        let requests: Vec<AnalysisRequest> = failures.iter().map(FailureRecord::request).collect();

        info!(
            "Retrying {} failed analysis requests in {} seconds",
            requests.len(),
            delay.as_secs()
        );
        if !delay.is_zero() {
            sleep(delay).await;
        }

        let batch = self
            .fetch_analyses(requests, credential, options.limit)
            .await;

        let residual = batch.failures.len();
        if residual > 0 {
            warning!(
                "{} analysis requests still failing after retry, their tracks stay without analysis",
                residual
            );
        }

        RetryOutcome {
            successes: batch.successes,
            residual,
        }
    }
}
