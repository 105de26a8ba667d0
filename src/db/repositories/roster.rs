use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{students, teachers, users};

/// Queries over the student and teacher rosters. Both tables are thin
/// 1:1 links to `users`; name lookups join through that relation.
pub struct RosterRepository {
    conn: DatabaseConnection,
}

impl RosterRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create_student(&self, user_id: i32) -> Result<students::Model> {
        let active = students::ActiveModel {
            user_id: Set(user_id),
            ..Default::default()
        };
        active
            .insert(&self.conn)
            .await
            .context("Failed to insert student")
    }

    pub async fn create_teacher(&self, user_id: i32) -> Result<teachers::Model> {
        let active = teachers::ActiveModel {
            user_id: Set(user_id),
            ..Default::default()
        };
        active
            .insert(&self.conn)
            .await
            .context("Failed to insert teacher")
    }

    pub async fn student_by_id(&self, id: i32) -> Result<Option<students::Model>> {
        students::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query student by ID")
    }

    pub async fn teacher_by_id(&self, id: i32) -> Result<Option<teachers::Model>> {
        teachers::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query teacher by ID")
    }

    pub async fn student_by_user_id(&self, user_id: i32) -> Result<Option<students::Model>> {
        students::Entity::find()
            .filter(students::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query student by user ID")
    }

    pub async fn teacher_by_user_id(&self, user_id: i32) -> Result<Option<teachers::Model>> {
        teachers::Entity::find()
            .filter(teachers::Column::UserId.eq(user_id))
            .one(&self.conn)
            .await
            .context("Failed to query teacher by user ID")
    }

    /// Student together with its owning user, for display names.
    pub async fn student_with_user(
        &self,
        id: i32,
    ) -> Result<Option<(students::Model, users::Model)>> {
        let row = students::Entity::find_by_id(id)
            .find_also_related(users::Entity)
            .one(&self.conn)
            .await
            .context("Failed to query student with user")?;

        Ok(row.and_then(|(student, user)| user.map(|u| (student, u))))
    }

    pub async fn list_students(&self) -> Result<Vec<(students::Model, users::Model)>> {
        let rows = students::Entity::find()
            .find_also_related(users::Entity)
            .order_by_asc(students::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list students")?;

        Ok(rows
            .into_iter()
            .filter_map(|(student, user)| user.map(|u| (student, u)))
            .collect())
    }

    pub async fn list_teachers(&self) -> Result<Vec<(teachers::Model, users::Model)>> {
        let rows = teachers::Entity::find()
            .find_also_related(users::Entity)
            .order_by_asc(teachers::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list teachers")?;

        Ok(rows
            .into_iter()
            .filter_map(|(teacher, user)| user.map(|u| (teacher, u)))
            .collect())
    }
}
