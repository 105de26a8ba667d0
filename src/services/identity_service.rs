//! Domain service resolving an authenticated caller to a student or
//! teacher record.
//!
//! A user carrying a role without the linked domain record is a
//! data-integrity fault and surfaces as an internal error, never a
//! silent default.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// User exists and carries the role, but the 1:1 domain record is
    /// missing.
    #[error("{role} record missing for user {user_id}")]
    MissingRoleRecord { role: &'static str, user_id: i32 },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for IdentityError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// A resolved student caller.
#[derive(Debug, Clone)]
pub struct StudentIdentity {
    pub student_id: i32,
    pub user_id: i32,
    pub name: String,
}

/// A resolved teacher caller.
#[derive(Debug, Clone)]
pub struct TeacherIdentity {
    pub teacher_id: i32,
    pub user_id: i32,
    pub name: String,
}

#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    /// Resolves a caller email to its student record.
    async fn resolve_student(&self, email: &str) -> Result<StudentIdentity, IdentityError>;

    /// Resolves a caller email to its teacher record.
    async fn resolve_teacher(&self, email: &str) -> Result<TeacherIdentity, IdentityError>;
}
