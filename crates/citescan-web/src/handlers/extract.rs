use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};

use citescan_ingest::extract_from_files;

use super::ApiError;
use crate::models::ExtractResponse;
use crate::state::AppState;
use crate::upload;

pub async fn extract(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let form = upload::parse_multipart(multipart).await?;
    let file_count = form.files.len();

    // Decoding and matching are CPU-bound; keep them off the async workers.
    let worker_state = Arc::clone(&state);
    let report = tokio::task::spawn_blocking(move || {
        extract_from_files(&form.files, &form.keyword, &worker_state.parsing)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Extraction task failed: {e}")))??;

    tracing::info!(
        files = file_count,
        processed = report.processed_count(),
        skipped = report.skipped().count(),
        references = report.references.len(),
        "extract request served"
    );

    Ok(Json(report.into()))
}
