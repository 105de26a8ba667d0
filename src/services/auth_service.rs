//! Account management: signup, credential checks and password changes.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Roles a user account can carry. An account may hold several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "STUDENT")]
    Student,
    #[serde(rename = "TEACHER")]
    Teacher,
    #[serde(rename = "ADMIN")]
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Student => "STUDENT",
            Self::Teacher => "TEACHER",
            Self::Admin => "ADMIN",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "STUDENT" => Some(Self::Student),
            "TEACHER" => Some(Self::Teacher),
            "ADMIN" => Some(Self::Admin),
            _ => None,
        }
    }
}

/// An authenticated account with its role set.
#[derive(Debug, Clone, Serialize)]
pub struct AccountInfo {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("An account with this email already exists")]
    EmailTaken,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Creates a user, its role rows and the linked student/teacher
    /// records. An empty role list defaults to student.
    async fn signup(
        &self,
        name: &str,
        email: &str,
        password: &str,
        roles: &[Role],
    ) -> Result<AccountInfo, AuthError>;

    /// Verifies credentials and returns the account on success.
    async fn login(&self, email: &str, password: &str) -> Result<AccountInfo, AuthError>;

    /// Loads the account behind a session email.
    async fn get_account(&self, email: &str) -> Result<AccountInfo, AuthError>;

    /// Replaces the password after re-verifying the current one.
    async fn change_password(
        &self,
        email: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
