//! `SeaORM` implementation of the `IdentityService` trait.

use crate::db::Store;
use crate::services::identity_service::{
    IdentityError, IdentityService, StudentIdentity, TeacherIdentity,
};
use async_trait::async_trait;

pub struct SeaOrmIdentityService {
    store: Store,
}

impl SeaOrmIdentityService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl IdentityService for SeaOrmIdentityService {
    async fn resolve_student(&self, email: &str) -> Result<StudentIdentity, IdentityError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| IdentityError::UserNotFound(email.to_string()))?;

        let student = self
            .store
            .get_student_by_user_id(user.id)
            .await?
            .ok_or(IdentityError::MissingRoleRecord {
                role: "Student",
                user_id: user.id,
            })?;

        Ok(StudentIdentity {
            student_id: student.id,
            user_id: user.id,
            name: user.name,
        })
    }

    async fn resolve_teacher(&self, email: &str) -> Result<TeacherIdentity, IdentityError> {
        let user = self
            .store
            .get_user_by_email(email)
            .await?
            .ok_or_else(|| IdentityError::UserNotFound(email.to_string()))?;

        let teacher = self
            .store
            .get_teacher_by_user_id(user.id)
            .await?
            .ok_or(IdentityError::MissingRoleRecord {
                role: "Teacher",
                user_id: user.id,
            })?;

        Ok(TeacherIdentity {
            teacher_id: teacher.id,
            user_id: user.id,
            name: user.name,
        })
    }
}
