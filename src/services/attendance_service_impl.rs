//! `SeaORM` implementation of the `AttendanceService` trait.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::info;

use crate::clock::Clock;
use crate::db::Store;
use crate::services::attendance_service::{
    attendance_percentage, check_edit_window, dedupe_last_write, AttendanceError,
    AttendanceRow, AttendanceService, AttendanceStatus, AttendanceSummary, CourseDetailRow,
    CourseRecordedToday, Mark,
};

pub struct SeaOrmAttendanceService {
    store: Store,
    clock: Arc<dyn Clock>,
}

impl SeaOrmAttendanceService {
    #[must_use]
    pub fn new(store: Store, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    async fn counts_for(
        &self,
        student_id: i32,
        course_id: i32,
    ) -> Result<(u64, u64, u64), AttendanceError> {
        let present = self
            .store
            .count_attendance_status(student_id, course_id, AttendanceStatus::Present.as_str())
            .await?;
        let absent = self
            .store
            .count_attendance_status(student_id, course_id, AttendanceStatus::Absent.as_str())
            .await?;
        let late = self
            .store
            .count_attendance_status(student_id, course_id, AttendanceStatus::Late.as_str())
            .await?;
        Ok((present, absent, late))
    }

    async fn student_name(&self, student_id: i32) -> Result<String, AttendanceError> {
        let (_, user) = self
            .store
            .get_student_with_user(student_id)
            .await?
            .ok_or(AttendanceError::StudentNotFound(student_id))?;
        Ok(user.name)
    }
}

#[async_trait]
impl AttendanceService for SeaOrmAttendanceService {
    async fn ensure_course_teacher(
        &self,
        teacher_id: i32,
        course_id: i32,
    ) -> Result<(), AttendanceError> {
        let course = self
            .store
            .get_course(course_id)
            .await?
            .ok_or(AttendanceError::CourseNotFound(course_id))?;

        if course.teacher_id == Some(teacher_id) {
            Ok(())
        } else {
            Err(AttendanceError::NotCourseTeacher)
        }
    }

    async fn record_attendance(
        &self,
        teacher_id: i32,
        course_id: i32,
        date: NaiveDate,
        marks: Vec<Mark>,
    ) -> Result<usize, AttendanceError> {
        // Date rules are evaluated before ownership: an out-of-window
        // date answers with the violated rule, not with Forbidden.
        let course = self
            .store
            .get_course(course_id)
            .await?
            .ok_or(AttendanceError::CourseNotFound(course_id))?;
        check_edit_window(self.clock.today(), date)?;
        if course.teacher_id != Some(teacher_id) {
            return Err(AttendanceError::NotCourseTeacher);
        }

        // Every referenced student must exist before anything is written.
        for mark in &marks {
            if self.store.get_student(mark.student_id).await?.is_none() {
                return Err(AttendanceError::StudentNotFound(mark.student_id));
            }
        }

        let deduped = dedupe_last_write(&marks);
        if deduped.is_empty() {
            return Ok(0);
        }

        let written = self
            .store
            .upsert_attendance_batch(course_id, date, &deduped)
            .await?;

        info!(
            course_id,
            %date,
            records = written,
            "Attendance batch recorded"
        );
        Ok(written)
    }

    async fn attendance_for_student_course(
        &self,
        student_id: i32,
        course_id: i32,
    ) -> Result<Vec<AttendanceRow>, AttendanceError> {
        if self.store.get_course(course_id).await?.is_none() {
            return Err(AttendanceError::CourseNotFound(course_id));
        }

        self.store
            .list_attendance_for_student_course(student_id, course_id)
            .await?
            .into_iter()
            .map(AttendanceRow::try_from)
            .collect()
    }

    async fn attendance_for_course_date(
        &self,
        teacher_id: i32,
        course_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRow>, AttendanceError> {
        self.ensure_course_teacher(teacher_id, course_id).await?;

        self.store
            .list_attendance_for_course_date(course_id, date)
            .await?
            .into_iter()
            .map(AttendanceRow::try_from)
            .collect()
    }

    async fn summarize(
        &self,
        student_id: i32,
        course_id: i32,
    ) -> Result<AttendanceSummary, AttendanceError> {
        if self.store.get_course(course_id).await?.is_none() {
            return Err(AttendanceError::CourseNotFound(course_id));
        }
        let student_name = self.student_name(student_id).await?;

        let (present, absent, late) = self.counts_for(student_id, course_id).await?;
        let total = present + absent + late;

        Ok(AttendanceSummary {
            subject_id: student_id,
            subject_name: student_name,
            present,
            absent,
            late,
            total,
            percentage: attendance_percentage(present, late, total),
        })
    }

    async fn summarize_overall(
        &self,
        student_id: i32,
    ) -> Result<AttendanceSummary, AttendanceError> {
        let student_name = self.student_name(student_id).await?;

        // Sum raw counts across courses, then derive the percentage once.
        // Averaging per-course percentages would weight sparse courses
        // the same as dense ones.
        let mut present = 0;
        let mut absent = 0;
        let mut late = 0;
        for course in self.store.list_courses_for_student(student_id).await? {
            let (p, a, l) = self.counts_for(student_id, course.id).await?;
            present += p;
            absent += a;
            late += l;
        }
        let total = present + absent + late;

        Ok(AttendanceSummary {
            subject_id: student_id,
            subject_name: student_name,
            present,
            absent,
            late,
            total,
            percentage: attendance_percentage(present, late, total),
        })
    }

    async fn course_detail_report(
        &self,
        teacher_id: i32,
        course_id: i32,
    ) -> Result<Vec<CourseDetailRow>, AttendanceError> {
        self.ensure_course_teacher(teacher_id, course_id).await?;

        let records = self.store.list_attendance_for_course(course_id).await?;

        let mut names: HashMap<i32, String> = HashMap::new();
        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            if !names.contains_key(&record.student_id) {
                let name = self.student_name(record.student_id).await?;
                names.insert(record.student_id, name);
            }
            rows.push(CourseDetailRow {
                student_id: record.student_id,
                student_name: names[&record.student_id].clone(),
                date: record.date,
                status: AttendanceStatus::parse(&record.status)?,
            });
        }
        Ok(rows)
    }

    async fn course_summary_report(
        &self,
        teacher_id: i32,
        course_id: i32,
    ) -> Result<Vec<AttendanceSummary>, AttendanceError> {
        self.ensure_course_teacher(teacher_id, course_id).await?;

        // Already sorted by student id; report order is deterministic.
        let student_ids = self.store.enrolled_student_ids(course_id).await?;

        let mut summaries = Vec::with_capacity(student_ids.len());
        for student_id in student_ids {
            let student_name = self.student_name(student_id).await?;
            let (present, absent, late) = self.counts_for(student_id, course_id).await?;
            let total = present + absent + late;
            summaries.push(AttendanceSummary {
                subject_id: student_id,
                subject_name: student_name,
                present,
                absent,
                late,
                total,
                percentage: attendance_percentage(present, late, total),
            });
        }
        Ok(summaries)
    }

    async fn courses_recorded_today(
        &self,
        teacher_id: i32,
    ) -> Result<Vec<CourseRecordedToday>, AttendanceError> {
        let courses = self.store.list_courses_for_teacher(teacher_id).await?;
        let ids: Vec<i32> = courses.iter().map(|c| c.id).collect();
        let recorded = self
            .store
            .course_ids_recorded_on(&ids, self.clock.today())
            .await?;

        Ok(courses
            .into_iter()
            .map(|course| CourseRecordedToday {
                recorded: recorded.binary_search(&course.id).is_ok(),
                course_id: course.id,
                course_code: course.course_code,
                name: course.name,
            })
            .collect())
    }
}
