use anyhow::{Context, Result};
use chrono::NaiveDate;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

use crate::entities::attendance;

pub struct AttendanceRepository {
    conn: DatabaseConnection,
}

impl AttendanceRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// All rows for one student in one course, oldest first.
    pub async fn list_for_student_course(
        &self,
        student_id: i32,
        course_id: i32,
    ) -> Result<Vec<attendance::Model>> {
        attendance::Entity::find()
            .filter(attendance::Column::StudentId.eq(student_id))
            .filter(attendance::Column::CourseId.eq(course_id))
            .order_by_asc(attendance::Column::Date)
            .all(&self.conn)
            .await
            .context("Failed to list attendance for student and course")
    }

    /// All rows for one course on one date.
    pub async fn list_for_course_date(
        &self,
        course_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<attendance::Model>> {
        attendance::Entity::find()
            .filter(attendance::Column::CourseId.eq(course_id))
            .filter(attendance::Column::Date.eq(date))
            .order_by_asc(attendance::Column::StudentId)
            .all(&self.conn)
            .await
            .context("Failed to list attendance for course and date")
    }

    /// Every row for a course, for detail reports.
    pub async fn list_for_course(&self, course_id: i32) -> Result<Vec<attendance::Model>> {
        attendance::Entity::find()
            .filter(attendance::Column::CourseId.eq(course_id))
            .order_by_asc(attendance::Column::StudentId)
            .order_by_asc(attendance::Column::Date)
            .all(&self.conn)
            .await
            .context("Failed to list attendance for course")
    }

    /// Count of rows with one status for a student in a course.
    pub async fn count_status(
        &self,
        student_id: i32,
        course_id: i32,
        status: &str,
    ) -> Result<u64> {
        attendance::Entity::find()
            .filter(attendance::Column::StudentId.eq(student_id))
            .filter(attendance::Column::CourseId.eq(course_id))
            .filter(attendance::Column::Status.eq(status))
            .count(&self.conn)
            .await
            .context("Failed to count attendance by status")
    }

    /// Persist a batch of marks for one (course, date) in a single
    /// transaction. Each row upserts through the unique
    /// (student, course, date) index, so replays overwrite the status
    /// instead of violating the invariant.
    pub async fn upsert_batch(
        &self,
        course_id: i32,
        date: NaiveDate,
        marks: &[(i32, String)],
    ) -> Result<usize> {
        let txn = self.conn.begin().await.context("Failed to open transaction")?;

        for (student_id, status) in marks {
            let active = attendance::ActiveModel {
                student_id: Set(*student_id),
                course_id: Set(course_id),
                date: Set(date),
                status: Set(status.clone()),
                ..Default::default()
            };

            attendance::Entity::insert(active)
                .on_conflict(
                    OnConflict::columns([
                        attendance::Column::StudentId,
                        attendance::Column::CourseId,
                        attendance::Column::Date,
                    ])
                    .update_column(attendance::Column::Status)
                    .to_owned(),
                )
                .exec_without_returning(&txn)
                .await
                .context("Failed to upsert attendance row")?;
        }

        txn.commit().await.context("Failed to commit attendance batch")?;

        Ok(marks.len())
    }

    /// Distinct course ids among `course_ids` that have any row on `date`.
    pub async fn course_ids_recorded_on(
        &self,
        course_ids: &[i32],
        date: NaiveDate,
    ) -> Result<Vec<i32>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = attendance::Entity::find()
            .filter(attendance::Column::CourseId.is_in(course_ids.to_vec()))
            .filter(attendance::Column::Date.eq(date))
            .all(&self.conn)
            .await
            .context("Failed to query recorded courses for date")?;

        let mut ids: Vec<i32> = rows.into_iter().map(|r| r.course_id).collect();
        ids.sort_unstable();
        ids.dedup();
        Ok(ids)
    }
}
