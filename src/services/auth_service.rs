//! Authentication service.
//!
//! Covers registration, identifier-based login with the legacy-format
//! password fallback, the e-mailed recovery-code flow and the same-day
//! session cache. Password hashing itself lives in the domain Password
//! value object; repository access goes through the Unit of Work.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{
    Config, RECOVERY_CODE_MAX, RECOVERY_CODE_MIN, RECOVERY_CODE_TTL_MINUTES,
    RECOVERY_MAIL_SUBJECT, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER,
};
use crate::domain::{Password, PasswordMatch, User, UserResponse};
use crate::errors::{AppError, AppResult};
use crate::infra::{Mailer, SessionCache, UnitOfWork};

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Successful login: the token plus the user snapshot the client caches.
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    #[serde(flatten)]
    pub token: TokenResponse,
    pub user: UserResponse,
}

/// Registration fields, already shape-validated at the handler boundary.
#[derive(Debug, Clone)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub name: String,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register a new ordinary user
    async fn register(&self, input: RegisterInput) -> AppResult<UserResponse>;

    /// Login by username or e-mail; caches the session snapshot on success
    async fn login(&self, identifier: String, password: String) -> AppResult<LoginResponse>;

    /// E-mail a 6-digit recovery code to an existing account
    async fn send_recovery_code(&self, email: String) -> AppResult<()>;

    /// Check a previously issued recovery code without consuming it
    async fn verify_recovery_code(&self, email: String, code: String) -> AppResult<()>;

    /// Consume a recovery code and set a new password
    async fn reset_password(
        &self,
        email: String,
        code: String,
        password: String,
        password_confirm: String,
    ) -> AppResult<()>;

    /// Cached user snapshot, if one was written today
    fn session(&self) -> Option<UserResponse>;

    /// Drop the cached session snapshot
    fn clear_session(&self);

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Generate JWT token for a user (shared helper to avoid duplication)
fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

/// Verify JWT token and extract claims (shared helper)
fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

/// A recovery code waiting to be consumed, keyed by e-mail.
struct PendingReset {
    code: String,
    expires_at: DateTime<Utc>,
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    mailer: Arc<dyn Mailer>,
    session: Arc<SessionCache>,
    config: Config,
    pending_resets: Mutex<HashMap<String, PendingReset>>,
}

impl<U: UnitOfWork> Authenticator<U> {
    /// Create new auth service instance with Unit of Work
    pub fn new(
        uow: Arc<U>,
        mailer: Arc<dyn Mailer>,
        session: Arc<SessionCache>,
        config: Config,
    ) -> Self {
        Self {
            uow,
            mailer,
            session,
            config,
            pending_resets: Mutex::new(HashMap::new()),
        }
    }

    fn take_pending(&self, email: &str) -> Option<PendingReset> {
        self.pending_resets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&email.to_lowercase())
    }

    fn store_pending(&self, email: &str, pending: PendingReset) {
        self.pending_resets
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(email.to_lowercase(), pending);
    }

    /// Validate a code against the pending entry; on success the entry is
    /// left in place (or restored) so reset can still consume it.
    fn check_code(&self, email: &str, code: &str) -> AppResult<PendingReset> {
        let pending = self
            .take_pending(email)
            .ok_or_else(|| AppError::validation("No recovery code was requested for this e-mail"))?;

        if pending.expires_at < Utc::now() {
            return Err(AppError::validation("The recovery code has expired"));
        }
        if pending.code != code.trim() {
            // Put it back so the user can retry with a typo fixed
            self.store_pending(email, pending);
            return Err(AppError::validation("Invalid recovery code"));
        }

        Ok(pending)
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, input: RegisterInput) -> AppResult<UserResponse> {
        // Fail fast, before any store access
        if input.password != input.password_confirm {
            return Err(AppError::validation("Passwords do not match"));
        }
        let password_hash = Password::new(&input.password)?.into_string();

        if self.uow.users().exists(&input.username, &input.email).await? {
            return Err(AppError::conflict("Username or e-mail"));
        }

        let user = self
            .uow
            .users()
            .create(input.username, input.email, password_hash, input.name)
            .await?;

        Ok(UserResponse::from(user))
    }

    async fn login(&self, identifier: String, password: String) -> AppResult<LoginResponse> {
        let user = self
            .uow
            .users()
            .find_by_identifier(&identifier)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let stored = Password::from_stored(user.password_hash.clone());
        let outcome = stored.verify(&password);
        if !outcome.is_match() {
            return Err(AppError::InvalidCredentials);
        }

        // First successful login against a legacy plaintext row migrates
        // it to a real hash. A failure here must not block the login.
        if outcome == PasswordMatch::VerifiedLegacy {
            match Password::new(&password) {
                Ok(rehashed) => {
                    if let Err(e) = self
                        .uow
                        .users()
                        .update_password(&user.email, rehashed.into_string())
                        .await
                    {
                        tracing::warn!(user = %user.username, "Legacy password rehash failed: {}", e);
                    } else {
                        tracing::info!(user = %user.username, "Migrated legacy password to hashed format");
                    }
                }
                Err(e) => {
                    tracing::warn!(user = %user.username, "Legacy password rehash skipped: {}", e);
                }
            }
        }

        let token = generate_token(&user, &self.config)?;
        let user = UserResponse::from(user);
        self.session.write(&user);

        Ok(LoginResponse { token, user })
    }

    async fn send_recovery_code(&self, email: String) -> AppResult<()> {
        self.uow
            .users()
            .find_by_email(&email)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let code = rand::thread_rng()
            .gen_range(RECOVERY_CODE_MIN..=RECOVERY_CODE_MAX)
            .to_string();
        let body = format!(
            "Your password recovery code is: {}\n\nIt expires in {} minutes.",
            code, RECOVERY_CODE_TTL_MINUTES
        );

        self.mailer.send(&email, RECOVERY_MAIL_SUBJECT, &body).await?;

        self.store_pending(
            &email,
            PendingReset {
                code,
                expires_at: Utc::now() + Duration::minutes(RECOVERY_CODE_TTL_MINUTES),
            },
        );

        Ok(())
    }

    async fn verify_recovery_code(&self, email: String, code: String) -> AppResult<()> {
        let pending = self.check_code(&email, &code)?;
        self.store_pending(&email, pending);
        Ok(())
    }

    async fn reset_password(
        &self,
        email: String,
        code: String,
        password: String,
        password_confirm: String,
    ) -> AppResult<()> {
        if password != password_confirm {
            return Err(AppError::validation("Passwords do not match"));
        }

        let pending = self.check_code(&email, &code)?;
        let hash = match Password::new(&password) {
            Ok(hashed) => hashed.into_string(),
            Err(e) => {
                // Too-short password keeps the code usable for a retry
                self.store_pending(&email, pending);
                return Err(e);
            }
        };

        self.uow.users().update_password(&email, hash).await
    }

    fn session(&self) -> Option<UserResponse> {
        self.session.read()
    }

    fn clear_session(&self) {
        self.session.clear();
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }
}
