//! Integration tests for API building blocks.
//!
//! These tests use mock services to exercise the service traits and the
//! HTTP-facing types without requiring a database or an SMTP relay.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{Local, Utc};
use tower::ServiceExt;
use uuid::Uuid;

use validator::Validate;

use sigp::api::create_router;
use sigp::api::handlers::order_handler::{CreateOrderRequest, LineItemRequest};
use sigp::config::Config;
use sigp::domain::{
    AddressEntry, AddressStatus, CreatedOrder, LineItem, OrderCategory, OrderSummary, UserResponse,
    UserRole,
};
use sigp::errors::{AppError, AppResult};
use sigp::infra::Database;
use sigp::AppState;
use sigp::services::{
    AuthService, Claims, LoginResponse, OrderForm, OrderService, RegisterInput, TokenResponse,
};

// =============================================================================
// Mock Services for Testing
// =============================================================================

/// Mock auth service that returns predefined responses
struct MockAuthService;

fn mock_user_response() -> UserResponse {
    UserResponse {
        id: Uuid::new_v4(),
        username: "jsilva".to_string(),
        email: "jsilva@example.com".to_string(),
        name: "João Silva".to_string(),
        is_admin: false,
    }
}

#[async_trait]
impl AuthService for MockAuthService {
    async fn register(&self, input: RegisterInput) -> AppResult<UserResponse> {
        Ok(UserResponse {
            id: Uuid::new_v4(),
            username: input.username,
            email: input.email,
            name: input.name,
            is_admin: false,
        })
    }

    async fn login(&self, identifier: String, _password: String) -> AppResult<LoginResponse> {
        if identifier == "ninguem" {
            return Err(AppError::UserNotFound);
        }
        Ok(LoginResponse {
            token: TokenResponse {
                access_token: "mock-token".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 86400,
            },
            user: mock_user_response(),
        })
    }

    async fn send_recovery_code(&self, email: String) -> AppResult<()> {
        if email == "ninguem@example.com" {
            return Err(AppError::UserNotFound);
        }
        Ok(())
    }

    async fn verify_recovery_code(&self, _email: String, code: String) -> AppResult<()> {
        if code == "123456" {
            Ok(())
        } else {
            Err(AppError::validation("Invalid recovery code"))
        }
    }

    async fn reset_password(
        &self,
        _email: String,
        code: String,
        password: String,
        password_confirm: String,
    ) -> AppResult<()> {
        if password != password_confirm {
            return Err(AppError::validation("Passwords do not match"));
        }
        self.verify_recovery_code(String::new(), code).await
    }

    fn session(&self) -> Option<UserResponse> {
        Some(mock_user_response())
    }

    fn clear_session(&self) {}

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        if token == "valid-test-token" {
            Ok(Claims {
                sub: Uuid::new_v4(),
                username: "jsilva".to_string(),
                role: "user".to_string(),
                exp: Utc::now().timestamp() + 3600,
                iat: Utc::now().timestamp(),
            })
        } else {
            Err(AppError::Unauthorized)
        }
    }
}

/// Mock order service for testing
struct MockOrderService;

#[async_trait]
impl OrderService for MockOrderService {
    async fn find_address(&self, site_id: &str) -> AppResult<Option<AddressEntry>> {
        if site_id != "P1042" {
            return Ok(None);
        }
        Ok(Some(AddressEntry {
            site_id: site_id.to_string(),
            street: "AV BRASIL".to_string(),
            number: "120".to_string(),
            neighborhood: "CENTRO".to_string(),
            complement: None,
            status: AddressStatus::Active,
            last_inspector: "jsilva".to_string(),
            last_inspection_at: Utc::now(),
        }))
    }

    async fn history(&self, site_id: &str) -> Vec<OrderSummary> {
        if site_id != "P1042" {
            return Vec::new();
        }
        vec![OrderSummary {
            number: 3,
            category: "URBMIDIA".to_string(),
            issued_on: Local::now().date_naive(),
            action_type: "Implantação".to_string(),
            item_type: "Abrigo".to_string(),
            street: "AV BRASIL".to_string(),
            neighborhood: "CENTRO".to_string(),
            created_by: "jsilva".to_string(),
        }]
    }

    async fn create_order(&self, form: OrderForm, _actor: &str) -> AppResult<CreatedOrder> {
        if form.items.is_empty() {
            return Err(AppError::validation(
                "Add at least one line item before generating the order",
            ));
        }
        Ok(CreatedOrder {
            number: 4,
            category: form.category.label().to_string(),
            year: 2026,
            document: "OS-004-2026-IDP1042.docx".to_string(),
        })
    }
}

// =============================================================================
// API Response Type Tests
// =============================================================================

#[tokio::test]
async fn test_api_response_structure() {
    use sigp::types::ApiResponse;

    let response: ApiResponse<String> = ApiResponse::success("test data".to_string());
    assert!(response.success);
    assert!(response.data.is_some());
    assert_eq!(response.data.unwrap(), "test data");
    assert!(response.message.is_none());
}

#[tokio::test]
async fn test_api_response_with_message() {
    use sigp::types::ApiResponse;

    let response: ApiResponse<i32> = ApiResponse::with_message(42, "Operation completed");
    assert!(response.success);
    assert_eq!(response.data.unwrap(), 42);
    assert_eq!(response.message.unwrap(), "Operation completed");
}

#[tokio::test]
async fn test_message_only_response() {
    use sigp::types::ApiResponse;

    let response: ApiResponse<()> = ApiResponse::message("Success");
    assert!(response.success);
    assert!(response.data.is_none());
    assert_eq!(response.message.unwrap(), "Success");
}

// =============================================================================
// Domain Model Tests
// =============================================================================

#[tokio::test]
async fn test_user_role_display() {
    assert_eq!(UserRole::User.to_string(), "user");
    assert_eq!(UserRole::Admin.to_string(), "admin");
}

#[tokio::test]
async fn test_user_role_from_str() {
    assert_eq!(UserRole::from("user"), UserRole::User);
    assert_eq!(UserRole::from("admin"), UserRole::Admin);
    // Unknown values default to User
    assert_eq!(UserRole::from("invalid"), UserRole::User);
}

#[tokio::test]
async fn test_address_status_round_trip() {
    assert_eq!(AddressStatus::from("active"), AddressStatus::Active);
    assert_eq!(AddressStatus::from("inactive"), AddressStatus::Inactive);
    // Legacy rows with a blank status column count as active
    assert_eq!(AddressStatus::from(""), AddressStatus::Active);
    assert_eq!(AddressStatus::Inactive.to_string(), "inactive");
}

#[tokio::test]
async fn test_order_category_serde_names() {
    let urb: OrderCategory = serde_json::from_str("\"URBMIDIA\"").unwrap();
    assert_eq!(urb, OrderCategory::UrbMidia);
    let parada: OrderCategory = serde_json::from_str("\"PROXIMA_PARADA\"").unwrap();
    assert_eq!(parada, OrderCategory::ProximaParada);
    assert_eq!(parada.label(), "PROXIMA PARADA");
    assert_eq!(parada.template_file(), "proxima_parada.docx");
}

#[tokio::test]
async fn test_create_order_request_requires_line_items() {
    let empty = CreateOrderRequest {
        category: OrderCategory::UrbMidia,
        action_type: "Implantação".to_string(),
        item_type: "Abrigo".to_string(),
        street: String::new(),
        number: String::new(),
        neighborhood: String::new(),
        complement: String::new(),
        items: Vec::new(),
    };
    assert!(empty.validate().is_err());

    let filled = CreateOrderRequest {
        items: vec![LineItemRequest {
            site_id: "P1042".to_string(),
            description: "IMPLANTACAO DE ABRIGO NA AV BRASIL".to_string(),
        }],
        ..empty
    };
    assert!(filled.validate().is_ok());
}

#[tokio::test]
async fn test_create_order_request_rejects_blank_item_description() {
    let request = CreateOrderRequest {
        category: OrderCategory::UrbMidia,
        action_type: "Implantação".to_string(),
        item_type: "Abrigo".to_string(),
        street: String::new(),
        number: String::new(),
        neighborhood: String::new(),
        complement: String::new(),
        items: vec![LineItemRequest {
            site_id: "P1042".to_string(),
            description: String::new(),
        }],
    };
    assert!(request.validate().is_err());
}

// =============================================================================
// Error Type Tests
// =============================================================================

#[tokio::test]
async fn test_app_error_types() {
    let not_found = AppError::NotFound;
    let unauthorized = AppError::Unauthorized;
    let validation = AppError::validation("invalid field");
    let internal = AppError::internal("server error");

    assert!(matches!(not_found, AppError::NotFound));
    assert!(matches!(unauthorized, AppError::Unauthorized));
    assert!(matches!(validation, AppError::Validation(_)));
    assert!(matches!(internal, AppError::Internal(_)));
}

#[tokio::test]
async fn test_app_error_status_codes() {
    use axum::response::IntoResponse;

    let response = AppError::NotFound.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = AppError::Unauthorized.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The login flow separates unknown account from wrong password
    let response = AppError::UserNotFound.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = AppError::InvalidCredentials.into_response();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = AppError::mail("relay refused the message").into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let response = AppError::document("template missing").into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let response = AppError::conflict("Username or e-mail").into_response();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

// =============================================================================
// JWT Claims Tests
// =============================================================================

#[tokio::test]
async fn test_claims_structure() {
    let claims = Claims {
        sub: Uuid::new_v4(),
        username: "jsilva".to_string(),
        role: "user".to_string(),
        exp: Utc::now().timestamp() + 3600,
        iat: Utc::now().timestamp(),
    };

    assert!(!claims.username.is_empty());
    assert!(claims.exp > claims.iat);
}

// =============================================================================
// Mock Service Tests
// =============================================================================

#[tokio::test]
async fn test_mock_auth_service_login() {
    let service = MockAuthService;
    let result = service
        .login("jsilva".to_string(), "segredo1".to_string())
        .await;

    assert!(result.is_ok());
    let login = result.unwrap();
    assert_eq!(login.token.token_type, "Bearer");
    assert_eq!(login.user.username, "jsilva");
}

#[tokio::test]
async fn test_mock_auth_service_unknown_user() {
    let service = MockAuthService;
    let result = service
        .login("ninguem".to_string(), "segredo1".to_string())
        .await;
    assert!(matches!(result, Err(AppError::UserNotFound)));
}

#[tokio::test]
async fn test_mock_auth_service_verify_valid_token() {
    let service = MockAuthService;
    let result = service.verify_token("valid-test-token");

    assert!(result.is_ok());
    assert_eq!(result.unwrap().username, "jsilva");
}

#[tokio::test]
async fn test_mock_auth_service_verify_invalid_token() {
    let service = MockAuthService;
    let result = service.verify_token("invalid-token");
    assert!(matches!(result, Err(AppError::Unauthorized)));
}

#[tokio::test]
async fn test_mock_order_service_find_address() {
    let service = MockOrderService;

    let found = service.find_address("P1042").await.unwrap();
    assert_eq!(found.unwrap().status, AddressStatus::Active);

    let missing = service.find_address("P9999").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_mock_order_service_history() {
    let service = MockOrderService;

    let history = service.history("P1042").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].category, "URBMIDIA");

    assert!(service.history("P9999").await.is_empty());
}

#[tokio::test]
async fn test_mock_order_service_create_order() {
    let service = MockOrderService;

    let form = OrderForm {
        category: OrderCategory::UrbMidia,
        action_type: "Implantação".to_string(),
        item_type: "Abrigo".to_string(),
        street: "AV BRASIL".to_string(),
        number: "120".to_string(),
        neighborhood: "CENTRO".to_string(),
        complement: String::new(),
        items: vec![LineItem {
            site_id: "P1042".to_string(),
            description: "IMPLANTACAO DE ABRIGO NA AV BRASIL".to_string(),
        }],
    };
    let created = service.create_order(form, "jsilva").await.unwrap();
    assert_eq!(created.category, "URBMIDIA");
    assert!(created.document.ends_with(".docx"));

    let empty = OrderForm {
        category: OrderCategory::UrbMidia,
        action_type: String::new(),
        item_type: String::new(),
        street: String::new(),
        number: String::new(),
        neighborhood: String::new(),
        complement: String::new(),
        items: Vec::new(),
    };
    let rejected = service.create_order(empty, "jsilva").await;
    assert!(matches!(rejected, Err(AppError::Validation(_))));
}

// =============================================================================
// Router Tests (mock services, in-memory database for the health check)
// =============================================================================

async fn test_router() -> Router {
    let config = Config::for_tests();
    let database = Arc::new(
        Database::connect_without_migrations(&config)
            .await
            .expect("sqlite connect"),
    );
    let state = AppState::new(Arc::new(MockAuthService), Arc::new(MockOrderService), database);
    create_router(state)
}

async fn body_string(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_root_endpoint() {
    let response = test_router()
        .await
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "SIGP service-order API");
}

#[tokio::test]
async fn test_health_endpoint() {
    let response = test_router()
        .await
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("healthy"));
}

#[tokio::test]
async fn test_protected_route_rejects_missing_token() {
    let response = test_router()
        .await
        .oneshot(
            Request::builder()
                .uri("/addresses/P1042")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_route_rejects_bad_token() {
    let response = test_router()
        .await
        .oneshot(
            Request::builder()
                .uri("/addresses/P1042")
                .header(header::AUTHORIZATION, "Bearer garbage")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_address_lookup_with_valid_token() {
    let response = test_router()
        .await
        .oneshot(
            Request::builder()
                .uri("/addresses/P1042")
                .header(header::AUTHORIZATION, "Bearer valid-test-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_string(response).await;
    assert!(body.contains("\"site_id\":\"P1042\""));
    assert!(body.contains("\"status\":\"active\""));
}

#[tokio::test]
async fn test_unknown_address_is_404() {
    let response = test_router()
        .await
        .oneshot(
            Request::builder()
                .uri("/addresses/P9999")
                .header(header::AUTHORIZATION, "Bearer valid-test-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_history_route_returns_list() {
    let response = test_router()
        .await
        .oneshot(
            Request::builder()
                .uri("/addresses/P1042/history")
                .header(header::AUTHORIZATION, "Bearer valid-test-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_string(response).await.contains("URBMIDIA"));
}

#[tokio::test]
async fn test_create_order_without_items_is_400() {
    let payload = serde_json::json!({
        "category": "URBMIDIA",
        "action_type": "Implantação",
        "item_type": "Abrigo",
        "items": []
    });

    let response = test_router()
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .header(header::AUTHORIZATION, "Bearer valid-test-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_order_with_valid_payload_is_201() {
    let payload = serde_json::json!({
        "category": "URBMIDIA",
        "action_type": "Implantação",
        "item_type": "Abrigo",
        "items": [
            { "site_id": "P1042", "description": "IMPLANTACAO DE ABRIGO NA AV BRASIL" }
        ]
    });

    let response = test_router()
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .header(header::AUTHORIZATION, "Bearer valid-test-token")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(body_string(response).await.contains(".docx"));
}

#[tokio::test]
async fn test_login_route_maps_unknown_user_to_404() {
    let payload = serde_json::json!({
        "identifier": "ninguem",
        "password": "whatever1"
    });

    let response = test_router()
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_string(response).await.contains("USER_NOT_FOUND"));
}
