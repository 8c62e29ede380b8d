//! CSV upload handlers

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::{AppError, AppState};
use kharcha_core::{ensure_csv_filename, import_csv, ImportReport, ImportTarget};

/// Successful upload
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub ok: bool,
    pub message: String,
    pub rows: usize,
    pub skipped: usize,
    pub classified: usize,
    /// Version of the dataset that was replaced (shared or session)
    pub version: i64,
}

impl From<ImportReport> for UploadResponse {
    fn from(report: ImportReport) -> Self {
        Self {
            ok: true,
            message: format!("Successfully uploaded {} transactions", report.rows),
            rows: report.rows,
            skipped: report.skipped,
            classified: report.classified,
            version: report.version,
        }
    }
}

/// POST /api/upload_csv - Replace the shared dataset
///
/// Expects multipart form with:
/// - file: CSV file (required, `.csv` name, max 10MB by default)
pub async fn upload_csv(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let (filename, data) = read_csv_upload(multipart, state.config.max_upload_bytes).await?;
    info!(filename = %filename, bytes = data.len(), "Shared dataset upload");

    let report = import_csv(
        &state.db,
        data.as_slice(),
        ImportTarget::Shared,
        &state.settings.classifier,
    )
    .map_err(AppError::import)?;

    Ok(Json(report.into()))
}

/// Pull the `file` field out of a multipart form and check its name
pub(crate) async fn read_csv_upload(
    mut multipart: Multipart,
    max_bytes: usize,
) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field.file_name().unwrap_or_default().to_string();
        ensure_csv_filename(&filename).map_err(AppError::import)?;

        let bytes = field
            .bytes()
            .await
            .map_err(|_| AppError::bad_request("Failed to read file data"))?;

        if bytes.len() > max_bytes {
            return Err(AppError::bad_request(&format!(
                "File too large. Maximum size is {} MB",
                max_bytes / 1024 / 1024
            )));
        }

        return Ok((filename, bytes.to_vec()));
    }

    Err(AppError::bad_request("Missing file field"))
}
