//! Service-order handlers.

use axum::{extract::State, routing::post, Extension, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{CreatedOrder, LineItem, OrderCategory};
use crate::errors::AppResult;
use crate::services::OrderForm;
use crate::types::Created;

/// One line item of the order form.
///
/// `Serialize` is required by the collection-level length rule on
/// `CreateOrderRequest.items`, which records offending values in the error.
#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct LineItemRequest {
    /// Site identifier; may be blank for emergency orders
    #[schema(example = "P1042")]
    #[serde(default)]
    pub site_id: String,
    /// Free-text description of the work
    #[validate(length(min = 1, message = "Item description is required"))]
    #[schema(example = "IMPLANTACAO DE ABRIGO NA AV BRASIL, 120 BAIRRO CENTRO - PROX. AO TERMINAL")]
    pub description: String,
}

/// Order creation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub category: OrderCategory,
    /// Kind of work performed
    #[validate(length(min = 1, message = "Action type is required"))]
    #[schema(example = "Implantação")]
    pub action_type: String,
    /// Kind of item worked on
    #[validate(length(min = 1, message = "Item type is required"))]
    #[schema(example = "Abrigo")]
    pub item_type: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub complement: String,
    /// Accumulated line items
    #[validate(nested)]
    #[validate(length(min = 1, message = "Add at least one line item before generating the order"))]
    pub items: Vec<LineItemRequest>,
}

/// Create order routes
pub fn order_routes() -> Router<AppState> {
    Router::new().route("/", post(create_order))
}

/// Run the full order-creation workflow
#[utoipa::path(
    post,
    path = "/orders",
    tag = "Orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created, document rendered", body = CreatedOrder),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing or invalid token"),
        (status = 500, description = "Document generation or store failure")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_order(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<CreateOrderRequest>,
) -> AppResult<Created<CreatedOrder>> {
    let form = OrderForm {
        category: payload.category,
        action_type: payload.action_type,
        item_type: payload.item_type,
        street: payload.street,
        number: payload.number,
        neighborhood: payload.neighborhood,
        complement: payload.complement,
        items: payload
            .items
            .into_iter()
            .map(|item| LineItem {
                site_id: item.site_id,
                description: item.description,
            })
            .collect(),
    };

    let created = state
        .order_service
        .create_order(form, &current_user.username)
        .await?;

    Ok(Created(created))
}
