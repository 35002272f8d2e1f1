//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{address_handler, auth_handler, order_handler};
use crate::domain::{
    AddressEntry, AddressStatus, CreatedOrder, LineItem, OrderCategory, OrderSummary,
    UserResponse, UserRole,
};
use crate::services::{LoginResponse, TokenResponse};
use crate::types::MessageResponse;

/// OpenAPI documentation for the SIGP service-order API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "SIGP",
        version = "0.1.0",
        description = "Municipal transit-infrastructure service-order management: \
                       staff authentication, address registry and order generation",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication endpoints
        auth_handler::register,
        auth_handler::login,
        auth_handler::send_recovery_code,
        auth_handler::verify_recovery_code,
        auth_handler::reset_password,
        auth_handler::read_session,
        auth_handler::clear_session,
        // Address registry endpoints
        address_handler::get_address,
        address_handler::get_history,
        // Order endpoints
        order_handler::create_order,
    ),
    components(
        schemas(
            // Domain types
            UserRole,
            UserResponse,
            AddressStatus,
            AddressEntry,
            OrderCategory,
            LineItem,
            OrderSummary,
            CreatedOrder,
            // Auth types
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            auth_handler::RecoverRequest,
            auth_handler::VerifyCodeRequest,
            auth_handler::ResetPasswordRequest,
            TokenResponse,
            LoginResponse,
            MessageResponse,
            // Order handler types
            order_handler::LineItemRequest,
            order_handler::CreateOrderRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login, password recovery and session cache"),
        (name = "Addresses", description = "Address registry lookups and per-site order history"),
        (name = "Orders", description = "Service-order creation workflow")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token obtained from /auth/login"))
                        .build(),
                ),
            );
        }
    }
}
