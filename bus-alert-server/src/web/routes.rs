//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use tracing::debug;

use crate::config::EntryId;
use crate::domain::StopId;
use crate::scheduler::{ArrivalSource, PollScheduler};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router<S: ArrivalSource + Clone>(state: AppState<S>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/entries", get(list_entries::<S>))
        .route("/entries/:entry_id/stops", get(list_stops::<S>))
        .route(
            "/entries/:entry_id/stops/:stop_id/arrivals",
            get(stop_arrivals::<S>),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

async fn list_entries<S: ArrivalSource + Clone>(
    State(state): State<AppState<S>>,
) -> Json<EntryListResponse> {
    let entries = state
        .registry
        .entry_ids()
        .await
        .into_iter()
        .map(|id| id.to_string())
        .collect();

    Json(EntryListResponse { entries })
}

async fn list_stops<S: ArrivalSource + Clone>(
    State(state): State<AppState<S>>,
    Path(entry_id): Path<String>,
) -> Result<Json<StopListResponse>, AppError> {
    let manager = find_manager(&state, &entry_id).await?;

    let mut stops = Vec::new();
    for stop in manager.stops().await {
        let snapshot = manager.get_latest(stop.stop_id()).await;
        stops.push(StopSummary::new(&stop, snapshot.as_deref()));
    }

    Ok(Json(StopListResponse { entry_id, stops }))
}

/// Latest arrivals for a stop.
///
/// 404 means "never polled successfully"; a stop polled with nothing
/// arriving returns 200 with empty lists.
async fn stop_arrivals<S: ArrivalSource + Clone>(
    State(state): State<AppState<S>>,
    Path((entry_id, stop_id)): Path<(String, String)>,
) -> Result<Json<ArrivalsResponse>, AppError> {
    let manager = find_manager(&state, &entry_id).await?;

    let stop = StopId::parse(&stop_id).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    let snapshot = manager
        .get_latest(&stop)
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("no arrivals yet for stop {stop} in entry {entry_id}"),
        })?;

    Ok(Json(ArrivalsResponse::new(stop.as_str(), &snapshot)))
}

async fn find_manager<S: ArrivalSource + Clone>(
    state: &AppState<S>,
    entry_id: &str,
) -> Result<PollScheduler<S>, AppError> {
    state
        .registry
        .get(&EntryId::new(entry_id))
        .await
        .ok_or_else(|| AppError::NotFound {
            message: format!("unknown entry {entry_id}"),
        })
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        debug!(status = status.as_u16(), %message, "Request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::sync::Arc;

    use crate::config::EntryConfig;
    use crate::domain::{ScanInterval, StopConfig};
    use crate::registry::ManagerRegistry;
    use crate::tfl::{MockArrivalSource, MockResponse, RawArrival};

    fn stop_id(s: &str) -> StopId {
        StopId::parse(s).unwrap()
    }

    /// Entry "home" with stops A (two arrivals), E (empty), N (never polled).
    async fn spawn_app() -> SocketAddr {
        let source = MockArrivalSource::new();
        source
            .set(
                stop_id("A"),
                MockResponse::Arrivals(vec![
                    RawArrival::new("25", "High Street", "Ilford", 305),
                    RawArrival::new("9", "High Street", "Aldwych", 65),
                    RawArrival::new("25", "High Street", "Ilford", 125),
                ]),
            )
            .await;
        source
            .set(stop_id("E"), MockResponse::Arrivals(Vec::new()))
            .await;
        source.set(stop_id("N"), MockResponse::Status(500)).await;

        let registry = Arc::new(ManagerRegistry::new(source));
        let manager = registry
            .setup(&EntryConfig {
                id: EntryId::new("home"),
                scan_interval: ScanInterval::default(),
                stops: vec![
                    StopConfig::new(stop_id("A")).with_name("High Street"),
                    StopConfig::new(stop_id("E")),
                    StopConfig::new(stop_id("N")),
                ],
            })
            .await;
        manager.run_cycle().await;

        let app = create_router(AppState::new(registry));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    async fn get_json(addr: SocketAddr, path: &str) -> (u16, serde_json::Value) {
        let response = reqwest::get(format!("http://{addr}{path}")).await.unwrap();
        let status = response.status().as_u16();
        (status, response.json().await.unwrap())
    }

    #[tokio::test]
    async fn health() {
        let addr = spawn_app().await;
        let body = reqwest::get(format!("http://{addr}/health"))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");
    }

    #[tokio::test]
    async fn lists_entries() {
        let addr = spawn_app().await;
        let (status, body) = get_json(addr, "/entries").await;
        assert_eq!(status, 200);
        assert_eq!(body, serde_json::json!({"entries": ["home"]}));
    }

    #[tokio::test]
    async fn lists_stops_with_state() {
        let addr = spawn_app().await;
        let (status, body) = get_json(addr, "/entries/home/stops").await;
        assert_eq!(status, 200);
        assert_eq!(
            body,
            serde_json::json!({
                "entry_id": "home",
                "stops": [
                    {"stop_id": "A", "name": "High Street", "state": "3 buses"},
                    {"stop_id": "E", "name": "E", "state": "No buses"},
                    {"stop_id": "N", "name": "N", "state": null},
                ]
            })
        );
    }

    #[tokio::test]
    async fn arrivals_for_polled_stop() {
        let addr = spawn_app().await;
        let (status, body) = get_json(addr, "/entries/home/stops/A/arrivals").await;
        assert_eq!(status, 200);
        assert_eq!(body["stop_id"], "A");

        let minutes: Vec<u64> = body["arrivals"]
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["minutes"].as_u64().unwrap())
            .collect();
        assert_eq!(minutes, [1, 2, 5]);

        assert_eq!(
            body["grouped_arrivals"],
            serde_json::json!([
                {"line": "9", "destination": "Aldwych", "minutes": [1]},
                {"line": "25", "destination": "Ilford", "minutes": [2, 5]},
            ])
        );
    }

    #[tokio::test]
    async fn empty_snapshot_is_200() {
        let addr = spawn_app().await;
        let (status, body) = get_json(addr, "/entries/home/stops/E/arrivals").await;
        assert_eq!(status, 200);
        assert_eq!(body["arrivals"], serde_json::json!([]));
        assert_eq!(body["grouped_arrivals"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn never_polled_is_404() {
        let addr = spawn_app().await;
        let (status, body) = get_json(addr, "/entries/home/stops/N/arrivals").await;
        assert_eq!(status, 404);
        assert!(body["error"].as_str().unwrap().contains("stop N"));

        let (status, _) = get_json(addr, "/entries/home/stops/UNKNOWN/arrivals").await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn unknown_entry_is_404() {
        let addr = spawn_app().await;
        let (status, _) = get_json(addr, "/entries/away/stops").await;
        assert_eq!(status, 404);
        let (status, _) = get_json(addr, "/entries/away/stops/A/arrivals").await;
        assert_eq!(status, 404);
    }

    #[tokio::test]
    async fn invalid_stop_id_is_400() {
        let addr = spawn_app().await;
        let (status, _) = get_json(addr, "/entries/home/stops/a%20b/arrivals").await;
        assert_eq!(status, 400);
    }
}
