//! User repository - Credential store access.

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use uuid::Uuid;

use super::entities::user::{self, Entity as UserEntity};
use crate::config::ROLE_USER;
use crate::domain::User;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Credential-store operations consumed by the auth flows.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Look up a user by username or e-mail
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>>;

    /// Look up a user by e-mail only (recovery flow)
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Whether a user with this username or e-mail already exists
    async fn exists(&self, username: &str, email: &str) -> AppResult<bool>;

    /// Insert a new ordinary user with a hashed password
    async fn create(
        &self,
        username: String,
        email: String,
        password_hash: String,
        name: String,
    ) -> AppResult<User>;

    /// Update a user's password hash by e-mail
    async fn update_password(&self, email: &str, password_hash: String) -> AppResult<()>;
}

/// SeaORM-backed credential store.
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<User>> {
        find_by_identifier(&self.db, identifier).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(User::from))
    }

    async fn exists(&self, username: &str, email: &str) -> AppResult<bool> {
        let result = UserEntity::find()
            .filter(
                Condition::any()
                    .add(user::Column::Username.eq(username))
                    .add(user::Column::Email.eq(email)),
            )
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.is_some())
    }

    async fn create(
        &self,
        username: String,
        email: String,
        password_hash: String,
        name: String,
    ) -> AppResult<User> {
        let now = Utc::now();
        let active_model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username),
            email: Set(email),
            password_hash: Set(password_hash),
            name: Set(name),
            role: Set(ROLE_USER.to_string()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model
            .insert(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(User::from(model))
    }

    async fn update_password(&self, email: &str, password_hash: String) -> AppResult<()> {
        let model = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(AppError::from)?
            .ok_or(AppError::UserNotFound)?;

        let mut active: user::ActiveModel = model.into();
        active.password_hash = Set(password_hash);
        active.updated_at = Set(Utc::now());

        active.update(&self.db).await.map_err(AppError::from)?;
        Ok(())
    }
}

/// Shared username-or-email lookup.
async fn find_by_identifier<C: ConnectionTrait>(
    db: &C,
    identifier: &str,
) -> AppResult<Option<User>> {
    let result = UserEntity::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(identifier))
                .add(user::Column::Email.eq(identifier)),
        )
        .one(db)
        .await
        .map_err(AppError::from)?;

    Ok(result.map(User::from))
}
