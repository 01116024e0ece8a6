//! Batch conversion handlers.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use fileforge_core::{BatchResult, ConversionRequest};

use super::handlers::{parse_domain, ApiError};
use crate::state::AppState;

/// Runs one batch for `{domain}`.
///
/// Batches of the same domain queue behind each other. The response is
/// always 200 with a `BatchResult`; a rejected batch has `success: false`.
pub async fn convert_batch(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
    Json(requests): Json<Vec<ConversionRequest>>,
) -> Result<Json<BatchResult>, ApiError> {
    let domain = parse_domain(&domain)?;

    let guard = state.begin_batch(domain).await;
    info!(domain = %domain, items = requests.len(), "Batch accepted");

    let result = state
        .batch_runner(domain)
        .convert_files(&requests, guard.token())
        .await;

    Ok(Json(result))
}

#[derive(Debug, Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

/// Cancels the batch currently running for `{domain}`, if any.
pub async fn cancel_batch(
    State(state): State<Arc<AppState>>,
    Path(domain): Path<String>,
) -> Result<Json<CancelResponse>, ApiError> {
    let domain = parse_domain(&domain)?;
    let cancelled = state.cancel_batch(domain);
    if cancelled {
        info!(domain = %domain, "Batch cancellation requested");
    }
    Ok(Json(CancelResponse { cancelled }))
}
