//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::services::auth_service::{AccountInfo, AuthError, AuthService, Role};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }

    fn validate_signup(&self, name: &str, email: &str, password: &str) -> Result<(), AuthError> {
        if name.trim().len() < 3 || name.len() > 50 {
            return Err(AuthError::Validation(
                "Name must be between 3 and 50 characters".to_string(),
            ));
        }
        if !email.contains('@') || email.len() > 50 {
            return Err(AuthError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        self.validate_password(password)
    }

    fn validate_password(&self, password: &str) -> Result<(), AuthError> {
        if password.len() < self.security.min_password_length {
            return Err(AuthError::Validation(format!(
                "Password must be at least {} characters",
                self.security.min_password_length
            )));
        }
        Ok(())
    }

    async fn account_for(&self, user: crate::db::User) -> Result<AccountInfo, AuthError> {
        let roles = self.store.roles_for_user(user.id).await?;
        Ok(AccountInfo {
            id: user.id,
            name: user.name,
            email: user.email,
            roles,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        roles: &[Role],
    ) -> Result<AccountInfo, AuthError> {
        self.validate_signup(name, email, password)?;

        if self.store.get_user_by_email(email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let roles: Vec<Role> = if roles.is_empty() {
            vec![Role::Student]
        } else {
            roles.to_vec()
        };
        let role_names: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();

        let user = self
            .store
            .create_user(name, email, password, &role_names, Some(&self.security))
            .await?;

        // 1:1 domain records backing the role-scoped routes.
        if roles.contains(&Role::Student) {
            self.store.create_student(user.id).await?;
        }
        if roles.contains(&Role::Teacher) {
            self.store.create_teacher(user.id).await?;
        }

        info!(user_id = user.id, roles = ?role_names, "Account created");
        self.account_for(user).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<AccountInfo, AuthError> {
        if !self.store.verify_user_password(email, password).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        self.account_for(user).await
    }

    async fn get_account(&self, email: &str) -> Result<AccountInfo, AuthError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| AuthError::UserNotFound(email.to_string()))?;

        self.account_for(user).await
    }

    async fn change_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        self.validate_password(new_password)?;

        if !self
            .store
            .verify_user_password(email, current_password)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        self.store
            .update_user_password(email, new_password, Some(&self.security))
            .await?;

        info!(email, "Password changed");
        Ok(())
    }
}
