use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use stockroom_core::{dashboard, StoredProduct};
use stockroom_pipeline::{csv_template, ImportRequest, TEMPLATE_FILE_NAME};
use tracing::{info, warn};

use crate::error::ApiError;
use crate::upload::{rejection_error, spool_upload, SpooledUpload};
use crate::wire::{DashboardJson, DashboardQuery, ProductJson, UploadJson, ValidateJson};
use crate::AppState;

async fn receive(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(String, SpooledUpload), ApiError> {
    let request_id = state.next_request_id();
    let multipart = multipart.map_err(rejection_error)?;
    let upload = spool_upload(multipart, &state.upload_dir)
        .await
        .map_err(|err| {
            warn!("request_id={request_id} upload refused: {err}");
            err
        })?;
    info!(
        "request_id={request_id} received {} ({} bytes)",
        upload.file_name.as_deref().unwrap_or("-"),
        upload.bytes
    );
    Ok((request_id, upload))
}

fn import_request(request_id: String, upload: &SpooledUpload) -> ImportRequest {
    let request = ImportRequest::new(request_id, upload.path());
    match &upload.file_name {
        Some(name) => request.with_file_name(name.clone()),
        None => request,
    }
}

async fn load_products(state: &AppState) -> Result<Vec<StoredProduct>, ApiError> {
    let store = state.store.clone();
    tokio::task::spawn_blocking(move || store.list_products())
        .await
        .map_err(|e| ApiError::internal("Failed to load products", e))?
        .map_err(|e| ApiError::internal("Failed to load products", e))
}

pub async fn upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadJson>, ApiError> {
    let (request_id, upload) = receive(&state, multipart).await?;
    let summary = state
        .pipeline
        .execute(import_request(request_id.clone(), &upload))
        .await
        .map_err(|err| {
            warn!("request_id={request_id} import failed: {err}");
            err
        })?;
    // the spooled file is removed when `upload` drops here
    Ok(Json(UploadJson::from(summary)))
}

pub async fn validate_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ValidateJson>, ApiError> {
    let (request_id, upload) = receive(&state, multipart).await?;
    let report = state
        .pipeline
        .prevalidate(import_request(request_id, &upload))
        .await?;
    Ok(Json(ValidateJson::from(report)))
}

pub async fn products_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductJson>>, ApiError> {
    let products = load_products(&state).await?;
    Ok(Json(products.iter().map(ProductJson::from).collect()))
}

pub async fn dashboard_handler(
    State(state): State<AppState>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> Result<Json<DashboardJson>, ApiError> {
    let Query(query) = query.map_err(|rejection| ApiError::InvalidQuery(rejection.body_text()))?;
    let products = load_products(&state).await?;
    let options = query.resolve(state.dashboard);
    Ok(Json(DashboardJson::from(dashboard(&products, &options))))
}

pub async fn template_handler() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{TEMPLATE_FILE_NAME}\""),
            ),
        ],
        csv_template(),
    )
}

pub async fn healthz_handler() -> &'static str {
    "ok"
}
