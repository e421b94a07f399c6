use std::path::PathBuf;

use crate::{
    config::{self, Settings},
    error,
    error::PipelineError,
    info,
    management::ResultSetManager,
    pipeline::{Pipeline, PipelineReport},
    success,
    types::Credential,
    utils, warning,
};

/// Runs the enrichment pipeline for one category and writes the result.
///
/// Terminates the program if configuration, authorization, or any of the
/// blocking stages (listing, features) fail. Analysis failures only show up
/// as a warning with the number of tracks left without analysis.
pub async fn fetch(category: String, output: Option<PathBuf>, concurrency: Option<usize>) {
    let pipeline = Pipeline::new(load_settings(output, concurrency));
    let credential = authorize(&pipeline).await;

    match enrich_and_save(&pipeline, &category, &credential).await {
        Ok(path) => success!("Wrote {}", path.display()),
        Err(e) => error!("Cannot fetch category {}. Err: {}", category, e),
    }
}

/// Runs the pipeline for every known category with a single credential.
///
/// A failing category is reported and skipped; the remaining categories are
/// still fetched.
pub async fn fetch_all(output: Option<PathBuf>, concurrency: Option<usize>) {
    let pipeline = Pipeline::new(load_settings(output, concurrency));
    let credential = authorize(&pipeline).await;

    let total = utils::KNOWN_CATEGORIES.len();
    let mut failed: Vec<String> = Vec::new();

    for (index, category) in utils::KNOWN_CATEGORIES.iter().enumerate() {
        info!("Fetching category {} ({}/{})", category, index + 1, total);
        match enrich_and_save(&pipeline, category, &credential).await {
            Ok(path) => success!("Wrote {}", path.display()),
            Err(e) => {
                warning!("Skipping category {}. Err: {}", category, e);
                failed.push(category.to_string());
            }
        }
    }

    if failed.is_empty() {
        success!("All {} categories fetched.", total);
    } else {
        warning!(
            "{} of {} categories failed: {}",
            failed.len(),
            total,
            failed.join(", ")
        );
    }
}

async fn enrich_and_save(
    pipeline: &Pipeline,
    category: &str,
    credential: &Credential,
) -> Result<PathBuf, PipelineError> {
    let report = pipeline.run_with_credential(category, credential).await?;
    summarize(&report);

    ResultSetManager::new(
        &report.category,
        &pipeline.settings().output_dir,
        Some(report.tracks),
    )
    .save()
    .await
}

fn summarize(report: &PipelineReport) {
    info!(
        "{}: {} tracks, {} with features, {} with analysis",
        report.category,
        report.tracks.len(),
        report.tracks.count_with_features(),
        report.tracks.count_with_analysis()
    );
    if report.analysis_retried > 0 {
        info!(
            "{}: {} of {} analysis requests needed a retry",
            report.category, report.analysis_retried, report.analysis_requested
        );
    }
}

async fn authorize(pipeline: &Pipeline) -> Credential {
    let pb = utils::spinner("Authorizing with Spotify...");
    let credential = pipeline.authorize().await;
    pb.finish_and_clear();

    match credential {
        Ok(credential) => credential,
        Err(e) => error!("Cannot authorize. Check your client credentials.\n Error: {}", e),
    }
}

fn load_settings(output: Option<PathBuf>, concurrency: Option<usize>) -> Settings {
    let mut settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!(
            "Cannot load configuration from {}. Err: {}",
            config::data_dir().join(".env").display(),
            e
        ),
    };

    if let Some(output) = output {
        settings.output_dir = output;
    }
    if let Some(concurrency) = concurrency {
        settings.max_concurrency = concurrency.max(1);
    }
    settings
}
