use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path as AxumPath, Query, State};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use catalog::{CatalogSnapshot, CatalogSource, FetchError};
use navigation::{
    build_scene, MapView, MapViewSettings, NavigationConfig, NavigationError, RenderMode,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::source::FeedSource;

#[derive(Clone)]
pub struct AppState {
    source: Arc<FeedSource>,
    navigation: Arc<NavigationConfig>,
    map: Arc<MapViewSettings>,
    snapshot: Arc<RwLock<Option<Arc<CatalogSnapshot>>>>,
}

impl AppState {
    pub fn new(source: FeedSource, navigation: NavigationConfig, map: MapViewSettings) -> Self {
        Self {
            source: Arc::new(source),
            navigation: Arc::new(navigation),
            map: Arc::new(map),
            snapshot: Arc::new(RwLock::new(None)),
        }
    }

    /// Cached snapshot, loading the feed on first use or after invalidation.
    async fn snapshot(&self) -> Result<Arc<CatalogSnapshot>, FetchError> {
        if let Some(snapshot) = self.snapshot.read().await.as_ref() {
            return Ok(Arc::clone(snapshot));
        }

        let mut slot = self.snapshot.write().await;
        if let Some(snapshot) = slot.as_ref() {
            return Ok(Arc::clone(snapshot));
        }
        let loaded = Arc::new(self.source.load().await?);
        info!(
            source = %self.source.describe(),
            panoramas = loaded.len(),
            version = loaded.version(),
            "catalog loaded"
        );
        *slot = Some(Arc::clone(&loaded));
        Ok(loaded)
    }
}

#[derive(Debug, Deserialize)]
struct SceneQuery {
    mode: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    Router::new()
        .route("/healthz", get(healthz))
        .route("/api/map", get(get_map))
        .route("/api/panoramas", get(list_panoramas))
        .route("/api/panoramas/:id/scene", get(get_scene))
        .route("/api/catalog/invalidate", post(invalidate_catalog))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("panorama navigator listening on http://{addr}");
    axum::serve(listener, router(state)).await
}

async fn healthz() -> Response {
    (StatusCode::OK, "ok").into_response()
}

async fn get_map(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let snapshot = match state.snapshot().await {
        Ok(s) => s,
        Err(err) => return fetch_failed(err),
    };
    let settings = state.map.as_ref().clone();
    let projector = settings.projector();
    match MapView::build(settings, snapshot.records(), &projector) {
        Ok(view) => versioned_json(&headers, snapshot.version(), &view),
        Err(err) => {
            error!("map view failed: {err}");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

async fn list_panoramas(State(state): State<AppState>, headers: HeaderMap) -> Response {
    match state.snapshot().await {
        Ok(snapshot) => versioned_json(&headers, snapshot.version(), snapshot.records()),
        Err(err) => fetch_failed(err),
    }
}

async fn get_scene(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Query(query): Query<SceneQuery>,
) -> Response {
    let mut config = state.navigation.as_ref().clone();
    if let Some(raw) = query.mode.as_deref() {
        match raw.parse::<RenderMode>() {
            Ok(mode) => config.render_mode = mode,
            Err(msg) => return api_error(StatusCode::BAD_REQUEST, msg).into_response(),
        }
    }

    let snapshot = match state.snapshot().await {
        Ok(s) => s,
        Err(err) => return fetch_failed(err),
    };
    match build_scene(&id, &snapshot, &config) {
        Ok(scene) => (StatusCode::OK, Json(scene)).into_response(),
        Err(err) => navigation_error(err),
    }
}

async fn invalidate_catalog(State(state): State<AppState>) -> Response {
    let dropped = state.snapshot.write().await.take().is_some();
    info!(dropped, "catalog invalidated");
    (StatusCode::OK, Json(json!({ "invalidated": dropped }))).into_response()
}

fn api_error(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "error": message.into() })))
}

fn fetch_failed(err: FetchError) -> Response {
    warn!("feed unavailable: {err}");
    api_error(StatusCode::BAD_GATEWAY, err.to_string()).into_response()
}

fn navigation_error(err: NavigationError) -> Response {
    let status = match &err {
        NavigationError::NotFound(_) => StatusCode::NOT_FOUND,
        NavigationError::Fetch(_) => StatusCode::BAD_GATEWAY,
        NavigationError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.to_string()).into_response()
}

/// JSON body tagged with the snapshot version; answers `304` when the
/// client already holds it.
fn versioned_json<T: Serialize + ?Sized>(request: &HeaderMap, version: &str, body: &T) -> Response {
    let etag = HeaderValue::from_str(&format!("\"{version}\"")).ok();
    if let Some(etag) = &etag {
        let matches = request
            .get(http::header::IF_NONE_MATCH)
            .is_some_and(|v| v.as_bytes() == etag.as_bytes());
        if matches {
            return StatusCode::NOT_MODIFIED.into_response();
        }
    }

    let mut response = (StatusCode::OK, Json(body)).into_response();
    if let Some(etag) = etag {
        response.headers_mut().insert(http::header::ETAG, etag);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::{router, AppState};
    use crate::source::{FeedSource, FileCatalogSource};
    use navigation::{MapViewSettings, NavigationConfig};
    use serde_json::Value;
    use std::path::Path;

    const FEED: &str = r#"[
        {"id": "a", "x": 0, "y": 0, "displayName": "Gate"},
        {"id": "b", "x": 100, "y": 0, "rotation": 45},
        {"id": "c", "x": 5000, "y": 5000}
    ]"#;

    async fn spawn(feed: &Path) -> String {
        let state = AppState::new(
            FeedSource::File(FileCatalogSource::new(feed)),
            NavigationConfig::default(),
            MapViewSettings::default(),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn scene_lists_reachable_hotspots() {
        let dir = tempfile::tempdir().unwrap();
        let feed = dir.path().join("feed.json");
        std::fs::write(&feed, FEED).unwrap();
        let base = spawn(&feed).await;

        let scene: Value = reqwest::get(format!("{base}/api/panoramas/a/scene"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(scene["title"], "Gate");
        assert_eq!(scene["mode"], "flat");
        assert_eq!(scene["hotspots"].as_array().unwrap().len(), 1);
        assert_eq!(scene["hotspots"][0]["targetId"], "b");

        let scene: Value = reqwest::get(format!("{base}/api/panoramas/b/scene?mode=spherical"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(scene["mode"], "spherical");
        assert_eq!(scene["rotationOffset"], 45.0);
        assert_eq!(scene["hotspots"][0]["kind"], "spherical");
    }

    #[tokio::test]
    async fn errors_map_to_statuses() {
        let dir = tempfile::tempdir().unwrap();
        let feed = dir.path().join("feed.json");
        std::fs::write(&feed, FEED).unwrap();
        let base = spawn(&feed).await;

        let resp = reqwest::get(format!("{base}/api/panoramas/zz/scene")).await.unwrap();
        assert_eq!(resp.status().as_u16(), 404);
        let body: Value = resp.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("zz"));

        let resp = reqwest::get(format!("{base}/api/panoramas/a/scene?mode=cube"))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 400);
    }

    #[tokio::test]
    async fn missing_feed_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let base = spawn(&dir.path().join("absent.json")).await;
        let resp = reqwest::get(format!("{base}/api/panoramas")).await.unwrap();
        assert_eq!(resp.status().as_u16(), 502);
    }

    #[tokio::test]
    async fn snapshot_is_cached_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let feed = dir.path().join("feed.json");
        std::fs::write(&feed, FEED).unwrap();
        let base = spawn(&feed).await;
        let client = reqwest::Client::new();

        let resp = client.get(format!("{base}/api/panoramas")).send().await.unwrap();
        let etag = resp.headers()["etag"].to_str().unwrap().to_string();
        let records: Value = resp.json().await.unwrap();
        assert_eq!(records.as_array().unwrap().len(), 3);

        let resp = client
            .get(format!("{base}/api/panoramas"))
            .header("if-none-match", &etag)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 304);

        std::fs::write(&feed, r#"[{"id": "a", "x": 0, "y": 0}]"#).unwrap();
        let records: Value = client
            .get(format!("{base}/api/panoramas"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(records.as_array().unwrap().len(), 3);

        let body: Value = client
            .post(format!("{base}/api/catalog/invalidate"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["invalidated"], true);

        let resp = client.get(format!("{base}/api/panoramas")).send().await.unwrap();
        assert_ne!(resp.headers()["etag"].to_str().unwrap(), etag);
        let records: Value = resp.json().await.unwrap();
        assert_eq!(records.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn map_lists_markers() {
        let dir = tempfile::tempdir().unwrap();
        let feed = dir.path().join("feed.json");
        std::fs::write(&feed, FEED).unwrap();
        let base = spawn(&feed).await;

        let view: Value = reqwest::get(format!("{base}/api/map"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(view["markers"].as_array().unwrap().len(), 3);
        assert_eq!(view["markers"][0]["panoramaId"], "a");
        assert_eq!(view["markers"][0]["label"], "Gate");
        assert_eq!(view["settings"]["maxZoom"], 7);
    }
}
