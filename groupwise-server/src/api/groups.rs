//! Grouping endpoint
//!
//! POST /api/groups takes a grouping request (ballots, name map, forbidden
//! pairs, restrictions, balance tags) and returns the groups, warnings and
//! the graph view.

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use groupwise_common::api::{process_request, GroupsRequest, GroupsResponse};
use tracing::{debug, info};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// POST /api/groups
///
/// The body is parsed here rather than by the `Json` extractor so malformed
/// payloads get the same error envelope as engine rejections.
pub async fn form_groups(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<GroupsResponse>> {
    let request: GroupsRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("malformed request body: {}", e)))?;

    debug!("Grouping request with {} ballots", request.ballots.len());

    // Partitioning is CPU-bound; keep it off the async workers
    let defaults = state.defaults.clone();
    let response = tokio::task::spawn_blocking(move || process_request(request, &defaults))
        .await
        .map_err(|e| ApiError::Internal(format!("grouping task failed: {}", e)))??;

    info!(
        "Formed {} groups ({} warnings)",
        response.groups.len(),
        response.warnings.len()
    );
    Ok(Json(response))
}

/// Build grouping routes
pub fn groups_routes() -> Router<AppState> {
    Router::new().route("/api/groups", post(form_groups))
}
