use crate::{
    error::PipelineError,
    info,
    types::{CategoryPlaylistsResponse, Credential, ListedTrack, PlaylistTracksResponse},
    utils,
};

use super::SpotifyApi;

/// Upper bound of tracks taken from a category's playlist.
pub const MAX_TRACKS: usize = 100;

impl SpotifyApi {
    /// Resolves a category key to the track listing of its first playlist.
    ///
    /// 1. `GET /browse/categories/{category}/playlists`
    /// 2. `GET` the first playlist's `tracks.href`, used verbatim since paging
    ///    and field selection are up to Spotify
    /// 3. Extract id, name and popularity of each entry
    ///
    /// Only the first page of the playlist is read. Entries without a track
    /// or without an id (local files, removed tracks) are skipped, and the
    /// listing is capped at [`MAX_TRACKS`].
    ///
    /// # Errors
    ///
    /// - [`PipelineError::InvalidArgument`] for an empty category or a
    ///   category without playlists
    /// - [`PipelineError::Upstream`] if either request answers non-2xx
    /// - [`PipelineError::Decode`] if a body does not have the expected shape
    pub async fn resolve_tracklist(
        &self,
        category: &str,
        credential: &Credential,
    ) -> Result<Vec<ListedTrack>, PipelineError> {
        let category = utils::validate_category(category)?;

        let playlists_url = format!(
            "{uri}/browse/categories/{category}/playlists",
            uri = self.api_url,
            category = category
        );
        let playlists = self
            .get_json::<CategoryPlaylistsResponse>(&playlists_url, credential)
            .await?;

        let Some(playlist) = playlists.playlists.items.into_iter().flatten().next() else {
            return Err(PipelineError::InvalidArgument(format!(
                "category '{category}' has no playlists"
            )));
        };

        info!(
            "Using playlist {} ({}) for category {}",
            playlist.name, playlist.id, category
        );

        let tracks = self
            .get_json::<PlaylistTracksResponse>(&playlist.tracks.href, credential)
            .await?;

        Ok(tracks
            .items
            .into_iter()
            .filter_map(|item| item.track)
            .filter_map(|track| {
                let id = track.id.filter(|id| !id.is_empty())?;
                Some(ListedTrack {
                    id,
                    name: track.name,
                    popularity: track.popularity.min(100),
                })
            })
            .take(MAX_TRACKS)
            .collect())
    }
}
