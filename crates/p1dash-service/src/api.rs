//! HTTP endpoints for the dashboard service.
//!
//! # Concurrency and Lock Acquisition
//!
//! - **`state.config`** (RwLock): read briefly to copy out the settings a handler needs.
//! - **`state.store`** (Mutex): held for the duration of a generation pass, which
//!   runs on the blocking pool.
//!
//! When both are needed, `config` is read and released before `store` is locked.
//!
//! ## Error Handling
//!
//! Every failure is returned as `{"status": "error", "message": ...}` via [`AppError`].
//!
//! # Example
//!
//! ```ignore
//! use p1dash_service::api;
//!
//! let app = api::router().with_state(state);
//! ```

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
};
use p1dash_core::{Dashboard, LatestReading};
use p1dash_store::Store;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::pipeline::{self, PipelineError};
use crate::state::{AppState, CollectionStats};

/// Create the API router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        // Rendered page
        .route("/", get(index))
        .route("/refresh", get(refresh))
        // JSON API
        .route("/api/health", get(health))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/readings/latest", get(get_latest_reading))
}

/// Serve the last rendered page.
async fn index(State(state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    let path = state.config.read().await.output.path.clone();

    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AppError::NotFound(format!(
            "{} not found; open /refresh to generate it",
            path.display()
        ))),
        Err(e) => Err(AppError::Internal(format!(
            "Failed to read {}: {}",
            path.display(),
            e
        ))),
    }
}

/// Status response for `/refresh`.
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub status: &'static str,
    pub message: String,
}

/// Re-run the generation pass and rewrite the page.
async fn refresh(State(state): State<Arc<AppState>>) -> Result<Json<RefreshResponse>, AppError> {
    let (options, output) = {
        let config = state.config.read().await;
        let options = config
            .dashboard
            .loader_options()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        (options, config.output.path.clone())
    };

    let dashboard = blocking(&state, move |store| {
        pipeline::generate(store, &options, &output)
    })
    .await?
    .map_err(|e| {
        warn!("Refresh failed: {}", e);
        AppError::Pipeline(e)
    })?;

    info!("Dashboard refreshed at {}", dashboard.generated_at);
    Ok(Json(RefreshResponse {
        status: "success",
        message: "Dashboard is vernieuwd.".to_string(),
    }))
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    /// Stored readings.
    pub reading_count: u64,
    /// Collector health.
    pub collector: CollectorHealth,
}

/// Collector health information.
#[derive(Debug, Serialize)]
pub struct CollectorHealth {
    pub running: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub started_at: Option<OffsetDateTime>,
    #[serde(flatten)]
    pub stats: CollectionStats,
}

/// Health check endpoint.
async fn health(State(state): State<Arc<AppState>>) -> Result<Json<HealthResponse>, AppError> {
    let reading_count = state.store.lock().await.count_readings()?;
    let stats = state.collector.stats.read().await.clone();

    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: OffsetDateTime::now_utc(),
        reading_count,
        collector: CollectorHealth {
            running: state.collector.is_running(),
            started_at: state.collector.started_at(),
            stats,
        },
    }))
}

/// The aggregate snapshot, computed fresh from the store.
async fn get_dashboard(State(state): State<Arc<AppState>>) -> Result<Json<Dashboard>, AppError> {
    let options = state
        .config
        .read()
        .await
        .dashboard
        .loader_options()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let now = OffsetDateTime::now_utc();
    let dashboard = blocking(&state, move |store| {
        pipeline::build_dashboard(store, &options, now)
    })
    .await??;
    Ok(Json(dashboard))
}

/// The newest stored sample.
async fn get_latest_reading(
    State(state): State<Arc<AppState>>,
) -> Result<Json<LatestReading>, AppError> {
    let options = state
        .config
        .read()
        .await
        .dashboard
        .loader_options()
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let latest = blocking(&state, move |store| pipeline::latest_reading(store, &options))
        .await??
        .ok_or_else(|| AppError::NotFound(p1dash_core::Error::NoData.to_string()))?;

    Ok(Json(latest))
}

/// Run a synchronous store pass on the blocking pool, holding the store lock.
async fn blocking<T, F>(state: &Arc<AppState>, f: F) -> Result<T, AppError>
where
    T: Send + 'static,
    F: FnOnce(&Store) -> T + Send + 'static,
{
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || {
        let store = state.store.blocking_lock();
        f(&store)
    })
    .await
    .map_err(|e| AppError::Internal(format!("Store task failed: {}", e)))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound(String),
    Store(p1dash_store::Error),
    Pipeline(PipelineError),
    Internal(String),
}

impl From<p1dash_store::Error> for AppError {
    fn from(e: p1dash_store::Error) -> Self {
        AppError::Store(e)
    }
}

impl From<PipelineError> for AppError {
    fn from(e: PipelineError) -> Self {
        match e {
            PipelineError::Engine(p1dash_core::Error::NoData) => {
                AppError::NotFound(p1dash_core::Error::NoData.to_string())
            }
            other => AppError::Pipeline(other),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Store(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Pipeline(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "status": "error",
            "message": message,
        });

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt;
    use p1dash_core::p1dash_types::{RawReading, Reading};
    use time::macros::datetime;
    use tower::ServiceExt;

    use crate::config::Config;

    fn create_test_state(dir: &tempfile::TempDir) -> Arc<AppState> {
        let store = Store::open_in_memory().unwrap();
        let mut config = Config::default();
        config.output.path = dir.path().join("energie_dashboard.html");
        AppState::new(store, config)
    }

    async fn seed(state: &AppState) {
        let t0 = datetime!(2024-03-05 09:00 UTC);
        let readings: Vec<Reading> = [0.0, 0.010, 0.022, 0.022]
            .iter()
            .enumerate()
            .map(|(i, kwh)| {
                Reading::new(
                    t0 + time::Duration::minutes(15 * i as i64),
                    -3000.0,
                    1000.0 + kwh,
                    250.0,
                )
            })
            .collect();
        state.store.lock().await.insert_readings(&readings).unwrap();
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    fn json(body: &str) -> serde_json::Value {
        serde_json::from_str(body).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_test_state(&dir);
        seed(&state).await;

        let (status, body) = get(router().with_state(state), "/api/health").await;
        assert_eq!(status, StatusCode::OK);

        let json = json(&body);
        assert_eq!(json["status"], "ok");
        assert!(json["version"].is_string());
        assert_eq!(json["reading_count"], 4);
        assert_eq!(json["collector"]["running"], false);
        assert_eq!(json["collector"]["failure_count"], 0);
    }

    #[tokio::test]
    async fn test_index_before_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_test_state(&dir);

        let (status, body) = get(router().with_state(state), "/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let json = json(&body);
        assert_eq!(json["status"], "error");
        assert!(json["message"].as_str().unwrap().contains("/refresh"));
    }

    #[tokio::test]
    async fn test_refresh_then_index() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_test_state(&dir);
        seed(&state).await;
        let app = router().with_state(state);

        let (status, body) = get(app.clone(), "/refresh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["status"], "success");

        let (status, html) = get(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("<html"));
        assert!(html.contains("\"2024-03-05\""));
    }

    #[tokio::test]
    async fn test_refresh_without_data() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_test_state(&dir);

        let (status, body) = get(router().with_state(state), "/refresh").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

        let json = json(&body);
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "No data found");
        assert!(!dir.path().join("energie_dashboard.html").exists());
    }

    #[tokio::test]
    async fn test_dashboard_json() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_test_state(&dir);
        seed(&state).await;

        let (status, body) = get(router().with_state(state), "/api/dashboard").await;
        assert_eq!(status, StatusCode::OK);

        let json = json(&body);
        let day = &json["periods"]["day"]["2024-03-05"];
        assert_eq!(day["type"], "line");
        assert_eq!(day["labels"][0], "10:00");
        assert_eq!(day["total_import"], 0.022);
        assert_eq!(json["latest"]["is_export"], true);
        assert_eq!(json["latest"]["active_w"], -300.0);
    }

    #[tokio::test]
    async fn test_dashboard_without_data() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_test_state(&dir);

        let (status, body) = get(router().with_state(state), "/api/dashboard").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json(&body)["message"], "No data found");
    }

    #[tokio::test]
    async fn test_latest_reading() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_test_state(&dir);

        let (status, _) = get(router().with_state(Arc::clone(&state)), "/api/readings/latest").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        seed(&state).await;
        let (status, body) = get(router().with_state(state), "/api/readings/latest").await;
        assert_eq!(status, StatusCode::OK);

        let json = json(&body);
        assert_eq!(json["label"], "2024-03-05 10:45");
        assert_eq!(json["import_kwh"], 1000.022);
        assert_eq!(json["export_kwh"], 250.0);
    }

    #[tokio::test]
    async fn test_latest_reading_skips_malformed_row() {
        let dir = tempfile::tempdir().unwrap();
        let state = create_test_state(&dir);
        seed(&state).await;
        // A legacy row with an empty power column, newer than the seeded ones
        state
            .store
            .lock()
            .await
            .insert_raw(&[RawReading {
                timestamp: Some(1_709_640_000.0),
                active_power_w: None,
                import_kwh: Some(1000.5),
                export_kwh: Some(250.0),
            }])
            .unwrap();
        let app = router().with_state(state);

        let (status, _) = get(app.clone(), "/api/dashboard").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(app, "/api/readings/latest").await;
        assert_eq!(status, StatusCode::OK);

        let json = json(&body);
        assert_eq!(json["label"], "2024-03-05 10:45");
        assert_eq!(json["import_kwh"], 1000.022);
        assert_eq!(json["active_w"], -300.0);
    }
}
