//! In-process stand-in for the Spotify Web API.
//!
//! Serves the token, browse, playlist, audio-features and audio-analysis
//! endpoints from an axum router on an ephemeral port and counts every hit,
//! so tests can assert on which requests the pipeline issued.

#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Form, Json, Router,
    extract::{Path, Query, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use sporlstats::config::Settings;

pub const ACCESS_TOKEN: &str = "test-access-token";

/// What the analysis endpoint answers for one attempt.
#[derive(Debug, Clone, Copy)]
pub enum Reply {
    Ok,
    Status(u16),
    RateLimited(Option<u64>),
    /// `200 OK` with a body that is not JSON.
    NotJson,
}

#[derive(Debug, Clone)]
pub struct MockSetup {
    pub token_status: u16,
    pub category_has_playlists: bool,
    pub tracks: Vec<Value>,
    pub features_status: u16,
    /// Replies per track id, one per attempt. Attempts beyond the plan get
    /// `Reply::Ok`.
    pub analysis_plan: HashMap<String, Vec<Reply>>,
    /// Ids whose `analysis_url` points at a port nobody listens on.
    pub unreachable_analysis: Vec<String>,
    /// Feature objects returned on top of the requested ids.
    pub extra_features: Vec<String>,
}

impl Default for MockSetup {
    fn default() -> Self {
        Self {
            token_status: 200,
            category_has_playlists: true,
            tracks: vec![
                track_item("t1", "First", 90),
                track_item("t2", "Second", 80),
                track_item("t3", "Third", 70),
            ],
            features_status: 200,
            analysis_plan: HashMap::new(),
            unreachable_analysis: Vec::new(),
            extra_features: Vec::new(),
        }
    }
}

impl MockSetup {
    pub fn with_analysis(mut self, id: &str, replies: Vec<Reply>) -> Self {
        self.analysis_plan.insert(id.to_string(), replies);
        self
    }

    pub fn with_unreachable_analysis(mut self, id: &str) -> Self {
        self.unreachable_analysis.push(id.to_string());
        self
    }

    pub fn with_extra_feature(mut self, id: &str) -> Self {
        self.extra_features.push(id.to_string());
        self
    }
}

pub fn track_item(id: &str, name: &str, popularity: u8) -> Value {
    json!({
        "added_at": "2026-10-01T00:00:00Z",
        "track": { "id": id, "name": name, "popularity": popularity, "uri": format!("spotify:track:{id}") }
    })
}

pub struct MockState {
    base_url: String,
    closed_url: String,
    setup: MockSetup,
    pub token_hits: AtomicUsize,
    pub playlist_hits: AtomicUsize,
    pub features_hits: AtomicUsize,
    pub tracks_query: Mutex<Option<String>>,
    pub features_ids: Mutex<Option<String>>,
    pub analysis_hits: Mutex<HashMap<String, usize>>,
}

impl MockState {
    pub fn analysis_hits_for(&self, id: &str) -> usize {
        self.analysis_hits
            .lock()
            .unwrap()
            .get(id)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_analysis_hits(&self) -> usize {
        self.analysis_hits.lock().unwrap().values().sum()
    }
}

pub struct MockSpotify {
    pub base_url: String,
    pub state: Arc<MockState>,
}

impl MockSpotify {
    pub async fn start(setup: MockSetup) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        // bind and release a port so connections to it are refused
        let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let closed_url = format!("http://{}", closed.local_addr().unwrap());
        drop(closed);

        let state = Arc::new(MockState {
            base_url: base_url.clone(),
            closed_url,
            setup,
            token_hits: AtomicUsize::new(0),
            playlist_hits: AtomicUsize::new(0),
            features_hits: AtomicUsize::new(0),
            tracks_query: Mutex::new(None),
            features_ids: Mutex::new(None),
            analysis_hits: Mutex::new(HashMap::new()),
        });

        let app = Router::new()
            .route("/api/token", post(token))
            .route("/v1/browse/categories/{category}/playlists", get(playlists))
            .route("/v1/playlists/{id}/tracks", get(playlist_tracks))
            .route("/v1/audio-features", get(audio_features))
            .route("/v1/audio-analysis/{id}", get(audio_analysis))
            .with_state(Arc::clone(&state));

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, state }
    }

    /// Settings aimed at this server, without retry padding so tests do
    /// not sleep.
    pub fn settings(&self) -> Settings {
        let mut settings = Settings::new(
            "client-id",
            "client-secret",
            &format!("{}/v1", self.base_url),
            &format!("{}/api/token", self.base_url),
        );
        settings.retry_padding = Duration::ZERO;
        settings
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {ACCESS_TOKEN}"))
        .unwrap_or(false)
}

async fn token(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    state.token_hits.fetch_add(1, Ordering::SeqCst);

    let basic = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("Basic "))
        .unwrap_or(false);
    if !basic || form.get("grant_type").map(String::as_str) != Some("client_credentials") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    if state.setup.token_status != 200 {
        return status(state.setup.token_status).into_response();
    }

    Json(json!({
        "access_token": ACCESS_TOKEN,
        "token_type": "Bearer",
        "expires_in": 3600
    }))
    .into_response()
}

async fn playlists(
    State(state): State<Arc<MockState>>,
    Path(category): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state.playlist_hits.fetch_add(1, Ordering::SeqCst);

    let items = if state.setup.category_has_playlists {
        json!([{
            "id": format!("{category}-top"),
            "name": format!("Top {category}"),
            "tracks": {
                "href": format!("{}/v1/playlists/{category}-top/tracks?market=US&limit=100", state.base_url),
                "total": state.setup.tracks.len()
            }
        }])
    } else {
        json!([])
    };

    Json(json!({ "message": "Popular", "playlists": { "items": items } })).into_response()
}

async fn playlist_tracks(
    State(state): State<Arc<MockState>>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    *state.tracks_query.lock().unwrap() = query;

    Json(json!({ "items": state.setup.tracks, "next": null })).into_response()
}

async fn audio_features(
    State(state): State<Arc<MockState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    state.features_hits.fetch_add(1, Ordering::SeqCst);

    let ids = params.get("ids").cloned().unwrap_or_default();
    *state.features_ids.lock().unwrap() = Some(ids.clone());

    if state.setup.features_status != 200 {
        return status(state.setup.features_status).into_response();
    }

    let popularity: HashMap<String, u64> = state
        .setup
        .tracks
        .iter()
        .filter_map(|item| {
            let track = item.get("track")?;
            Some((
                track.get("id")?.as_str()?.to_string(),
                track.get("popularity")?.as_u64()?,
            ))
        })
        .collect();

    let analysis_url = |id: &str| {
        let base = if state.setup.unreachable_analysis.iter().any(|u| u == id) {
            &state.closed_url
        } else {
            &state.base_url
        };
        format!("{base}/v1/audio-analysis/{id}")
    };

    // answer in reverse order so callers cannot rely on position
    let mut features: Vec<Value> = ids
        .split(',')
        .rev()
        .map(|id| match popularity.get(id) {
            Some(pop) => json!({
                "id": id,
                "tempo": *pop as f64,
                "energy": 0.5,
                "analysis_url": analysis_url(id)
            }),
            None => Value::Null,
        })
        .collect();

    for id in &state.setup.extra_features {
        features.push(json!({
            "id": id,
            "tempo": 100.0,
            "energy": 0.5,
            "analysis_url": analysis_url(id)
        }));
    }

    Json(json!({ "audio_features": features })).into_response()
}

async fn audio_analysis(
    State(state): State<Arc<MockState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let attempt = {
        let mut hits = state.analysis_hits.lock().unwrap();
        let count = hits.entry(id.clone()).or_insert(0);
        *count += 1;
        *count - 1
    };

    let reply = state
        .setup
        .analysis_plan
        .get(&id)
        .and_then(|plan| plan.get(attempt))
        .copied()
        .unwrap_or(Reply::Ok);

    match reply {
        Reply::Ok => Json(json!({
            "track": { "id": id, "duration": 180.5 },
            "segments": [{ "start": 0.0, "loudness_max": -7.1 }]
        }))
        .into_response(),
        Reply::Status(code) => status(code).into_response(),
        Reply::RateLimited(Some(secs)) => (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, secs.to_string())],
        )
            .into_response(),
        Reply::RateLimited(None) => StatusCode::TOO_MANY_REQUESTS.into_response(),
        Reply::NotJson => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/html")],
            "<html>maintenance</html>",
        )
            .into_response(),
    }
}

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}
