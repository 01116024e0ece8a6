use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use fileforge_core::{
    capabilities::{self, archive, document, normalize_token},
    tool::{check_tools, ToolStatus},
    Domain, SanitizedConfig,
};

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn not_found(error: impl Into<String>) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Parses a `{domain}` path segment.
pub(crate) fn parse_domain(raw: &str) -> Result<Domain, ApiError> {
    raw.parse::<Domain>().map_err(not_found)
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<SanitizedConfig> {
    Json(state.sanitized_config())
}

pub async fn get_tools(State(state): State<Arc<AppState>>) -> Json<Vec<ToolStatus>> {
    Json(check_tools(&state.config().tools))
}

#[derive(Debug, Serialize)]
pub struct CapabilitiesResponse {
    pub domain: Domain,
    pub default_target: &'static str,
    pub target_formats: Vec<&'static str>,
    /// Input formats that can be unpacked; archive domain only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extractable_formats: Option<Vec<&'static str>>,
    /// Input formats LibreOffice accepts; document domain only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_formats: Option<Vec<&'static str>>,
}

pub async fn get_capabilities(
    Path(domain): Path<String>,
) -> Result<Json<CapabilitiesResponse>, ApiError> {
    let domain = parse_domain(&domain)?;

    Ok(Json(CapabilitiesResponse {
        domain,
        default_target: domain.default_target(),
        target_formats: capabilities::target_formats(domain),
        extractable_formats: (domain == Domain::Archive).then(archive::extractable_formats),
        input_formats: (domain == Domain::Document).then(document::input_formats),
    }))
}

#[derive(Debug, Serialize)]
pub struct AllowedOutputsResponse {
    pub extension: String,
    pub outputs: &'static [&'static str],
}

/// Targets a document with extension `ext` may be converted to.
///
/// Unknown extensions get an empty list.
pub async fn get_allowed_outputs(Path(ext): Path<String>) -> Json<AllowedOutputsResponse> {
    let extension = normalize_token(&ext);
    let outputs = document::allowed_outputs(&extension);
    Json(AllowedOutputsResponse { extension, outputs })
}
