use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use stockroom_pipeline::ImportError;
use thiserror::Error;

/// Message returned for any server-side import failure. Details are logged.
pub const UPLOAD_FAILED: &str = "Upload failed";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("No file uploaded")]
    MissingFile,

    #[error("{message}")]
    Multipart { status: StatusCode, message: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("{context}: {detail}")]
    Internal {
        context: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn internal(context: &'static str, detail: impl ToString) -> Self {
        ApiError::Internal {
            context,
            detail: detail.to_string(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Import(err) => match err {
                ImportError::UnsupportedFileType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                ImportError::MissingColumns(_) | ImportError::Parse(_) => StatusCode::BAD_REQUEST,
                ImportError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
                ImportError::Io(_) | ImportError::Store(_) | ImportError::Worker(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::MissingFile => StatusCode::BAD_REQUEST,
            ApiError::Multipart { status, .. } => *status,
            ApiError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub(crate) fn api_error_response(
    status: StatusCode,
    message: &str,
    details: Option<Vec<String>>,
) -> Response {
    let body = match details {
        Some(details) => json!({"error": message, "details": details}),
        None => json!({"error": message}),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            ApiError::Import(ImportError::Validation(issues)) => {
                let details = issues.iter().map(|i| i.to_string()).collect();
                api_error_response(status, "Validation failed", Some(details))
            }
            ApiError::Import(err) if !err.is_client_error() => {
                tracing::error!("import failed: {err}");
                api_error_response(status, UPLOAD_FAILED, None)
            }
            ApiError::Internal { context, detail } => {
                tracing::error!("{context}: {detail}");
                api_error_response(status, context, None)
            }
            other => api_error_response(status, &other.to_string(), None),
        }
    }
}
