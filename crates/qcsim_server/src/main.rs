use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use qcsim_core::collapse::{simulate_collapse, CollapseRequest, CollapseResult};
use qcsim_core::config::AppConfig;
use qcsim_core::report::TextAssessment;
use qcsim_core::scanner::{scan, CrisisAnalysis, CrisisRecord};
use qcsim_io::{read_status, ErrorKind};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tower_http::cors::CorsLayer;

/// Shared, read-only server state.
struct AppState {
    /// Run directory reported by `/api/status`. The server never writes to it.
    run_dir: PathBuf,
}

#[derive(Serialize, Deserialize)]
struct ApiMessage {
    message: String,
}

#[derive(Deserialize)]
struct MetricsRequest {
    text: String,
}

fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/collapse", post(collapse))
        .route("/api/metrics", post(metrics))
        .route("/api/scan", post(scan_crisis))
        .route("/api/status", get(status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() {
    qcsim_core::init_logging();

    let config_path =
        PathBuf::from(std::env::var("QCSIM_CONFIG").unwrap_or_else(|_| "qcsim.toml".into()));
    let config = match AppConfig::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Invalid configuration {}: {:#}", config_path.display(), e);
            std::process::exit(1);
        }
    };

    let addr: SocketAddr = match config.server.addr.parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid server address {}: {}", config.server.addr, e);
            std::process::exit(1);
        }
    };
    let app = create_app(Arc::new(AppState {
        run_dir: config.server.run_dir.clone(),
    }));

    tracing::info!("qcsim API listening on {}", addr);
    tracing::info!("    Status: http://{}/api/status", addr);
    tracing::info!("    Run directory: {}", config.server.run_dir.display());

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Liveness check.
async fn root() -> Json<ApiMessage> {
    Json(ApiMessage {
        message: "qcsim API is alive".into(),
    })
}

async fn collapse(Json(payload): Json<CollapseRequest>) -> Json<CollapseResult> {
    Json(simulate_collapse(payload.intent_phase))
}

async fn metrics(Json(payload): Json<MetricsRequest>) -> Json<TextAssessment> {
    Json(TextAssessment::assess(&payload.text))
}

async fn scan_crisis(Json(record): Json<CrisisRecord>) -> Json<CrisisAnalysis> {
    Json(scan(&record))
}

/// Latest persisted snapshot of the configured run directory.
async fn status(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let run_dir = state.run_dir.clone();
    let result = tokio::task::spawn_blocking(move || read_status(&run_dir)).await;
    match result {
        Ok(Ok(Some(status))) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "run_dir": state.run_dir.display().to_string(),
                "status": status,
            })),
        ),
        Ok(Ok(None)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "run_dir": state.run_dir.display().to_string(),
                "status": null,
            })),
        ),
        Ok(Err(e)) => {
            tracing::warn!("Failed to read run status: {}", e);
            let code = match e.kind() {
                ErrorKind::PersistenceCorrupt => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            (code, Json(serde_json::json!({ "error": e.to_string() })))
        }
        Err(e) => {
            tracing::error!("Status task failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "status task failed" })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;
    use qcsim_core::engine::NullPerturbation;
    use qcsim_io::RunContext;
    use tower::util::ServiceExt;

    fn app_for(run_dir: PathBuf) -> Router {
        create_app(Arc::new(AppState { run_dir }))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<axum::body::Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(axum::body::Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_root_is_alive() {
        let response = app_for(PathBuf::from("unused"))
            .oneshot(
                Request::builder()
                    .uri("/")
                    .body(axum::body::Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["message"], "qcsim API is alive");
    }

    #[tokio::test]
    async fn test_collapse_zero_phase() {
        let response = app_for(PathBuf::from("unused"))
            .oneshot(post_json("/api/collapse", r#"{"intentPhase":0.0}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["alphaEigenvalues"][0], 1.0);
        assert_eq!(json["betaEigenvalues"][0], 0.0);
        assert_eq!(json["intentPhase"], 0.0);
        assert_eq!(
            json["message"],
            "Quantum simulation executed with intent phase 0.0"
        );
    }

    #[tokio::test]
    async fn test_collapse_rejects_missing_phase() {
        let response = app_for(PathBuf::from("unused"))
            .oneshot(post_json("/api/collapse", r#"{"phase":1}"#))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_metrics_route() {
        let response = app_for(PathBuf::from("unused"))
            .oneshot(post_json("/api/metrics", r#"{"text":""}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["region"], "rigid");
        assert!(json["moves"].as_array().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn test_scan_route() {
        let body = r#"{
            "name": "reference",
            "components": {"severity":0.85,"irreversibility":0.75,"time_pressure":0.9,
                           "response_capacity":0.8,"recovery_potential":0.7},
            "coverage": {"actual_articles":1400,"expected_articles":12000},
            "patterns": ["blockade","displacement"]
        }"#;
        let response = app_for(PathBuf::from("unused"))
            .oneshot(post_json("/api/scan", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["collapse"]["status"], "CATASTROPHIC");
        assert_eq!(json["coverage"]["status"], "EXTREME_SUPPRESSION");
        assert_eq!(json["geometries"][0]["geometry"], "YANG_MILLS");
    }

    #[tokio::test]
    async fn test_status_of_empty_and_advanced_run() {
        let dir = tempfile::tempdir().unwrap();
        let get_status = || {
            Request::builder()
                .uri("/api/status")
                .body(axum::body::Body::empty())
                .unwrap()
        };

        let response = app_for(dir.path().to_path_buf())
            .oneshot(get_status())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["status"].is_null());

        let mut ctx = RunContext::open(dir.path(), AppConfig::default()).unwrap();
        ctx.advance(&mut NullPerturbation).unwrap();
        ctx.close();

        let response = app_for(dir.path().to_path_buf())
            .oneshot(get_status())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"]["panel"]["cycle"], 1);
        assert_eq!(json["status"]["snapshot"]["cycle"], 1);
    }
}
