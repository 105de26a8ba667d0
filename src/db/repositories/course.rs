use anyhow::{Context, Result};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::entities::{courses, enrollments};

pub struct CourseRepository {
    conn: DatabaseConnection,
}

impl CourseRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    pub async fn create(&self, course_code: &str, name: &str) -> Result<courses::Model> {
        let active = courses::ActiveModel {
            course_code: Set(course_code.to_string()),
            name: Set(name.to_string()),
            teacher_id: Set(None),
            ..Default::default()
        };
        active
            .insert(&self.conn)
            .await
            .context("Failed to insert course")
    }

    pub async fn get(&self, id: i32) -> Result<Option<courses::Model>> {
        courses::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query course by ID")
    }

    pub async fn get_by_code(&self, course_code: &str) -> Result<Option<courses::Model>> {
        courses::Entity::find()
            .filter(courses::Column::CourseCode.eq(course_code))
            .one(&self.conn)
            .await
            .context("Failed to query course by code")
    }

    pub async fn update(
        &self,
        id: i32,
        course_code: &str,
        name: &str,
    ) -> Result<Option<courses::Model>> {
        let Some(course) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: courses::ActiveModel = course.into();
        active.course_code = Set(course_code.to_string());
        active.name = Set(name.to_string());
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to update course")?;

        Ok(Some(updated))
    }

    pub async fn assign_teacher(&self, id: i32, teacher_id: i32) -> Result<Option<courses::Model>> {
        let Some(course) = self.get(id).await? else {
            return Ok(None);
        };

        let mut active: courses::ActiveModel = course.into();
        active.teacher_id = Set(Some(teacher_id));
        let updated = active
            .update(&self.conn)
            .await
            .context("Failed to assign teacher")?;

        Ok(Some(updated))
    }

    pub async fn list_all(&self) -> Result<Vec<courses::Model>> {
        courses::Entity::find()
            .order_by_asc(courses::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list courses")
    }

    /// Courses assigned to a teacher
    pub async fn list_for_teacher(&self, teacher_id: i32) -> Result<Vec<courses::Model>> {
        courses::Entity::find()
            .filter(courses::Column::TeacherId.eq(teacher_id))
            .order_by_asc(courses::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list courses for teacher")
    }

    /// Courses a student is enrolled in
    pub async fn list_for_student(&self, student_id: i32) -> Result<Vec<courses::Model>> {
        let course_ids: Vec<i32> = enrollments::Entity::find()
            .filter(enrollments::Column::StudentId.eq(student_id))
            .all(&self.conn)
            .await
            .context("Failed to list enrollments for student")?
            .into_iter()
            .map(|e| e.course_id)
            .collect();

        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        courses::Entity::find()
            .filter(courses::Column::Id.is_in(course_ids))
            .order_by_asc(courses::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list enrolled courses")
    }

    /// Enroll a student; re-enrolling is a no-op.
    pub async fn enroll(&self, student_id: i32, course_id: i32) -> Result<()> {
        let active = enrollments::ActiveModel {
            student_id: Set(student_id),
            course_id: Set(course_id),
        };

        enrollments::Entity::insert(active)
            .on_conflict(
                OnConflict::columns([
                    enrollments::Column::StudentId,
                    enrollments::Column::CourseId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.conn)
            .await
            .context("Failed to enroll student")?;

        Ok(())
    }

    pub async fn enrolled_student_ids(&self, course_id: i32) -> Result<Vec<i32>> {
        let mut ids: Vec<i32> = enrollments::Entity::find()
            .filter(enrollments::Column::CourseId.eq(course_id))
            .all(&self.conn)
            .await
            .context("Failed to list enrollments for course")?
            .into_iter()
            .map(|e| e.student_id)
            .collect();

        ids.sort_unstable();
        Ok(ids)
    }
}
