use std::path::PathBuf;

use tabled::Table;

use crate::{config, error, management::ResultSetManager, utils, warning};

/// Prints a previously written category file as a table, most popular
/// tracks first.
pub async fn show(category: String, output: Option<PathBuf>) {
    let category = match utils::validate_category(&category) {
        Ok(category) => category,
        Err(e) => error!("{}", e),
    };
    let dir = output.unwrap_or_else(config::output_dir);
    let manager = match ResultSetManager::new(category, &dir, None).load().await {
        Ok(manager) => manager,
        Err(e) => error!(
            "Cannot read results for category {}. Run sporlstats fetch {} first.\n Error: {}",
            category, category, e
        ),
    };

    let tracks = manager.tracks();
    if tracks.is_empty() {
        warning!("No tracks stored for category {}.", category);
        return;
    }

    let table = Table::new(utils::track_table_rows(tracks));
    println!(
        "Category: {category}\tTracks: {count}\tWith analysis: {analysed}\n{table}\n",
        category = category,
        count = tracks.len(),
        analysed = tracks.count_with_analysis(),
        table = table
    );
}
