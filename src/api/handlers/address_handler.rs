//! Address registry handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::get,
    Router,
};

use crate::api::AppState;
use crate::domain::{AddressEntry, OrderSummary};
use crate::errors::{AppResult, OptionExt};

/// Create address registry routes
pub fn address_routes() -> Router<AppState> {
    Router::new()
        .route("/:site_id", get(get_address))
        .route("/:site_id/history", get(get_history))
}

/// Look up an address registry entry
#[utoipa::path(
    get,
    path = "/addresses/{site_id}",
    tag = "Addresses",
    params(
        ("site_id" = String, Path, description = "Site identifier")
    ),
    responses(
        (status = 200, description = "Registry entry", body = AddressEntry),
        (status = 404, description = "Unknown site identifier"),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_address(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> AppResult<Json<AddressEntry>> {
    let entry = state
        .order_service
        .find_address(&site_id)
        .await?
        .ok_or_not_found()?;

    Ok(Json(entry))
}

/// Most recent orders referencing a site, newest first.
///
/// Read failures degrade to an empty list rather than an error; the
/// history is display-only.
#[utoipa::path(
    get,
    path = "/addresses/{site_id}/history",
    tag = "Addresses",
    params(
        ("site_id" = String, Path, description = "Site identifier")
    ),
    responses(
        (status = 200, description = "Order history, possibly empty", body = [OrderSummary]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_history(
    State(state): State<AppState>,
    Path(site_id): Path<String>,
) -> Json<Vec<OrderSummary>> {
    Json(state.order_service.history(&site_id).await)
}
