//! Build information endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct InfoResponse {
    pub version: String,
    pub commit: String,
    pub rustc_version: String,
    pub build_timestamp: String,
    pub build_time: Option<String>,
}

/// GET /info — release, commit and build time of the running binary.
#[tracing::instrument(skip(state))]
pub async fn get(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    let info = &state.build_info;
    Json(InfoResponse {
        version: info.version.clone(),
        commit: info.commit.clone(),
        rustc_version: info.rustc_version.clone(),
        build_timestamp: info.build_timestamp.clone(),
        build_time: info.build_time().map(|time| time.to_rfc3339()),
    })
}
