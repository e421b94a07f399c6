use std::path::{Path, PathBuf};

use crate::{error::PipelineError, types::ResultSet};

/// Writes and reads the enriched result set of one category.
///
/// Each category lives in `<dir>/<category>.json` as a pretty-printed object
/// keyed by track id.
pub struct ResultSetManager {
    category: String,
    dir: PathBuf,
    tracks: ResultSet,
}

impl ResultSetManager {
    pub fn new(category: &str, dir: &Path, tracks: Option<ResultSet>) -> Self {
        Self {
            category: category.to_string(),
            dir: dir.to_path_buf(),
            tracks: tracks.unwrap_or_default(),
        }
    }

    /// Reads `<dir>/<category>.json` back into a new manager.
    ///
    /// # Returns
    ///
    /// A manager for the same category and directory holding the stored
    /// tracks.
    ///
    /// # Errors
    ///
    /// [`PipelineError::Io`] when the file is missing or unreadable,
    /// [`PipelineError::Serde`] when it does not hold a result set.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let manager = ResultSetManager::new("pop", &config::output_dir(), None)
    ///     .load()
    ///     .await?;
    /// println!("{} tracks", manager.tracks().len());
    /// ```
    pub async fn load(&self) -> Result<Self, PipelineError> {
        let content = async_fs::read_to_string(self.path()).await?;
        let tracks = serde_json::from_str(&content)?;
        Ok(Self {
            category: self.category.clone(),
            dir: self.dir.clone(),
            tracks,
        })
    }

    /// Writes the tracks as pretty-printed JSON, creating the directory if
    /// needed. An existing file for the category is replaced.
    ///
    /// # Returns
    ///
    /// The path that was written.
    pub async fn save(&self) -> Result<PathBuf, PipelineError> {
        let path = self.path();
        if let Some(parent) = path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.tracks)?;
        async_fs::write(&path, json).await?;
        Ok(path)
    }

    pub fn tracks(&self) -> &ResultSet {
        &self.tracks
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{category}.json", category = self.category))
    }
}
