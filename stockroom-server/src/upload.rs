//! Multipart upload spooling.
//!
//! The `file` field is streamed into a `NamedTempFile` inside the upload
//! directory through an async file handle. The temp file is removed when the `SpooledUpload` is dropped,
//! which happens when the handler returns on every path.

use std::path::Path;

use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use stockroom_pipeline::{is_csv_upload, ImportError};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::error::ApiError;

pub const FILE_FIELD: &str = "file";

pub struct SpooledUpload {
    pub file: NamedTempFile,
    pub file_name: Option<String>,
    pub bytes: usize,
}

impl SpooledUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Message returned when the body limit cuts an upload short.
pub const TOO_LARGE: &str = "File exceeds the upload size limit";

fn multipart_failure(status: StatusCode, body_text: String) -> ApiError {
    let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
        TOO_LARGE.to_string()
    } else {
        body_text
    };
    ApiError::Multipart { status, message }
}

fn multipart_error(err: MultipartError) -> ApiError {
    multipart_failure(err.status(), err.body_text())
}

pub fn rejection_error(rejection: MultipartRejection) -> ApiError {
    multipart_failure(rejection.status(), rejection.body_text())
}

/// Find the `file` field, check it is a CSV, and spool it to disk.
pub async fn spool_upload(
    mut multipart: Multipart,
    upload_dir: &Path,
) -> Result<SpooledUpload, ApiError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        if !is_csv_upload(file_name.as_deref(), content_type.as_deref()) {
            let shown = file_name.or(content_type).unwrap_or_else(|| "unknown".to_string());
            return Err(ImportError::UnsupportedFileType(shown).into());
        }

        tokio::fs::create_dir_all(upload_dir)
            .await
            .map_err(ImportError::from)?;
        let file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".csv")
            .tempfile_in(upload_dir)
            .map_err(ImportError::from)?;
        let mut writer = tokio::fs::File::from_std(file.reopen().map_err(ImportError::from)?);
        let mut bytes = 0;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            writer.write_all(&chunk).await.map_err(ImportError::from)?;
            bytes += chunk.len();
        }
        writer.flush().await.map_err(ImportError::from)?;

        return Ok(SpooledUpload {
            file,
            file_name,
            bytes,
        });
    }

    Err(ApiError::MissingFile)
}
