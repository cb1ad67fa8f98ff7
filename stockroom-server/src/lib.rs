#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod upload;
pub mod wire;

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Request};
use axum::http::{HeaderValue, Method, StatusCode};
use axum::middleware::{from_fn, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use stockroom_core::DashboardOptions;
use stockroom_pipeline::{CsvImportPipeline, ProductStore};

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub pipeline: Arc<CsvImportPipeline>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub dashboard: DashboardOptions,
    request_seq: Arc<AtomicU64>,
}

impl AppState {
    pub fn new(store: Arc<dyn ProductStore>, config: &ServerConfig) -> Self {
        let pipeline = CsvImportPipeline::new(Arc::clone(&store), config.validation_policy);
        Self {
            store,
            pipeline: Arc::new(pipeline),
            upload_dir: config.upload_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
            dashboard: config.dashboard,
            request_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Identifier threaded through the logs of one upload.
    pub fn next_request_id(&self) -> String {
        let seq = self.request_seq.fetch_add(1, Ordering::Relaxed) + 1;
        format!("upl-{}-{seq}", chrono::Utc::now().timestamp_millis())
    }
}

fn apply_cors_headers(resp: &mut Response) {
    let headers = resp.headers_mut();
    headers.insert("access-control-allow-origin", HeaderValue::from_static("*"));
    headers.insert(
        "access-control-allow-methods",
        HeaderValue::from_static("GET,POST,OPTIONS"),
    );
    headers.insert(
        "access-control-allow-headers",
        HeaderValue::from_static("content-type"),
    );
}

async fn cors_middleware(req: Request<Body>, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        apply_cors_headers(&mut resp);
        return resp;
    }

    let mut resp = next.run(req).await;
    apply_cors_headers(&mut resp);
    resp
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::healthz_handler))
        .route("/api/upload", post(handlers::upload_handler))
        .route("/api/validate", post(handlers::validate_handler))
        .route("/api/products", get(handlers::products_handler))
        .route("/api/dashboard", get(handlers::dashboard_handler))
        .route("/api/template", get(handlers::template_handler))
        .layer(from_fn(cors_middleware))
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .with_state(state)
}
