//! Attendance domain types, policy helpers and the service trait.
//!
//! Policy lives here so it can be unit-tested without a database:
//! the two-day edit window, last-write-wins de-duplication and the
//! percentage formula (late counts as attended).

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::attendance;

/// How many days back from today a record may still be written.
/// 1 means today and yesterday are writable, anything older is locked.
pub const EDIT_WINDOW_DAYS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    #[serde(rename = "PRESENT")]
    Present,
    #[serde(rename = "ABSENT")]
    Absent,
    #[serde(rename = "LATE")]
    Late,
}

impl AttendanceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "PRESENT",
            Self::Absent => "ABSENT",
            Self::Late => "LATE",
        }
    }

    pub fn parse(value: &str) -> Result<Self, AttendanceError> {
        match value {
            "PRESENT" => Ok(Self::Present),
            "ABSENT" => Ok(Self::Absent),
            "LATE" => Ok(Self::Late),
            other => Err(AttendanceError::BadStatus(other.to_string())),
        }
    }
}

/// One student's status within a batch submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mark {
    pub student_id: i32,
    pub status: AttendanceStatus,
}

/// A stored attendance record with its status decoded.
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceRow {
    pub id: i32,
    pub student_id: i32,
    pub course_id: i32,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl TryFrom<attendance::Model> for AttendanceRow {
    type Error = AttendanceError;

    fn try_from(model: attendance::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            student_id: model.student_id,
            course_id: model.course_id,
            date: model.date,
            status: AttendanceStatus::parse(&model.status)?,
        })
    }
}

/// Counts and the derived attendance percentage for one subject (a
/// student, scoped to one course or overall).
#[derive(Debug, Clone, Serialize)]
pub struct AttendanceSummary {
    pub subject_id: i32,
    pub subject_name: String,
    pub present: u64,
    pub absent: u64,
    pub late: u64,
    pub total: u64,
    pub percentage: f64,
}

/// A detail-report line: one record joined with the student's name.
#[derive(Debug, Clone, Serialize)]
pub struct CourseDetailRow {
    pub student_id: i32,
    pub student_name: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Per-course recording state for a teacher's dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct CourseRecordedToday {
    pub course_id: i32,
    pub course_code: String,
    pub name: String,
    pub recorded: bool,
}

#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("Course {0} not found")]
    CourseNotFound(i32),

    #[error("Student {0} not found")]
    StudentNotFound(i32),

    #[error("You are not the teacher of this course")]
    NotCourseTeacher,

    #[error("Cannot record attendance for a future date")]
    FutureDate,

    #[error("Attendance for this date is locked and can no longer be changed")]
    LockedDate,

    #[error("Unknown attendance status in store: {0}")]
    BadStatus(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<anyhow::Error> for AttendanceError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[async_trait::async_trait]
pub trait AttendanceService: Send + Sync {
    /// Verifies that `teacher_id` is the assigned teacher of `course_id`.
    async fn ensure_course_teacher(
        &self,
        teacher_id: i32,
        course_id: i32,
    ) -> Result<(), AttendanceError>;

    /// Writes a batch of marks for one course and date. The whole batch
    /// is applied in one transaction or not at all. Returns the number
    /// of rows written after de-duplication.
    async fn record_attendance(
        &self,
        teacher_id: i32,
        course_id: i32,
        date: NaiveDate,
        marks: Vec<Mark>,
    ) -> Result<usize, AttendanceError>;

    /// Full per-date history for one student in one course.
    async fn attendance_for_student_course(
        &self,
        student_id: i32,
        course_id: i32,
    ) -> Result<Vec<AttendanceRow>, AttendanceError>;

    /// All records for one course on one date, for the recording form.
    async fn attendance_for_course_date(
        &self,
        teacher_id: i32,
        course_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<AttendanceRow>, AttendanceError>;

    /// Counts and percentage for one student in one course.
    async fn summarize(
        &self,
        student_id: i32,
        course_id: i32,
    ) -> Result<AttendanceSummary, AttendanceError>;

    /// Counts summed across all of the student's courses, with the
    /// percentage recomputed from the sums (never averaged).
    async fn summarize_overall(&self, student_id: i32)
        -> Result<AttendanceSummary, AttendanceError>;

    /// Every record of the course joined with student names.
    async fn course_detail_report(
        &self,
        teacher_id: i32,
        course_id: i32,
    ) -> Result<Vec<CourseDetailRow>, AttendanceError>;

    /// One summary per enrolled student, ordered by student id.
    async fn course_summary_report(
        &self,
        teacher_id: i32,
        course_id: i32,
    ) -> Result<Vec<AttendanceSummary>, AttendanceError>;

    /// Which of the teacher's courses already have records for today.
    async fn courses_recorded_today(
        &self,
        teacher_id: i32,
    ) -> Result<Vec<CourseRecordedToday>, AttendanceError>;
}

/// Rejects dates outside the writable window: strictly future dates and
/// anything older than `EDIT_WINDOW_DAYS` before today.
pub(crate) fn check_edit_window(today: NaiveDate, date: NaiveDate) -> Result<(), AttendanceError> {
    if date > today {
        return Err(AttendanceError::FutureDate);
    }
    if date < today - Duration::days(EDIT_WINDOW_DAYS) {
        return Err(AttendanceError::LockedDate);
    }
    Ok(())
}

/// Collapses repeated student ids, keeping each student's last mark.
/// Order of first appearance is preserved.
pub(crate) fn dedupe_last_write(marks: &[Mark]) -> Vec<(i32, String)> {
    let mut index = std::collections::HashMap::new();
    let mut out: Vec<(i32, String)> = Vec::with_capacity(marks.len());
    for mark in marks {
        let status = mark.status.as_str().to_string();
        if let Some(&at) = index.get(&mark.student_id) {
            out[at] = (mark.student_id, status);
        } else {
            index.insert(mark.student_id, out.len());
            out.push((mark.student_id, status));
        }
    }
    out
}

/// `(present + late) / total * 100`, or 0 when there are no records.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn attendance_percentage(present: u64, late: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (present + late) as f64 / total as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn window_accepts_today_and_yesterday() {
        let today = date(2024, 3, 15);
        assert!(check_edit_window(today, today).is_ok());
        assert!(check_edit_window(today, date(2024, 3, 14)).is_ok());
    }

    #[test]
    fn window_rejects_future_dates() {
        let today = date(2024, 3, 15);
        assert!(matches!(
            check_edit_window(today, date(2024, 3, 16)),
            Err(AttendanceError::FutureDate)
        ));
        assert!(matches!(
            check_edit_window(today, date(2025, 1, 1)),
            Err(AttendanceError::FutureDate)
        ));
    }

    #[test]
    fn window_rejects_locked_dates() {
        let today = date(2024, 3, 15);
        assert!(matches!(
            check_edit_window(today, date(2024, 3, 13)),
            Err(AttendanceError::LockedDate)
        ));
        assert!(matches!(
            check_edit_window(today, date(2023, 3, 15)),
            Err(AttendanceError::LockedDate)
        ));
    }

    #[test]
    fn window_spans_month_boundaries() {
        let today = date(2024, 3, 1);
        assert!(check_edit_window(today, date(2024, 2, 29)).is_ok());
        assert!(matches!(
            check_edit_window(today, date(2024, 2, 28)),
            Err(AttendanceError::LockedDate)
        ));
    }

    #[test]
    fn percentage_counts_late_as_attended() {
        let pct = attendance_percentage(3, 1, 5);
        assert!((pct - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn percentage_of_empty_history_is_zero() {
        assert!(attendance_percentage(0, 0, 0).abs() < f64::EPSILON);
    }

    #[test]
    fn percentage_all_absent_is_zero() {
        assert!(attendance_percentage(0, 0, 4).abs() < f64::EPSILON);
    }

    #[test]
    fn dedupe_keeps_last_mark_per_student() {
        let marks = vec![
            Mark {
                student_id: 1,
                status: AttendanceStatus::Present,
            },
            Mark {
                student_id: 2,
                status: AttendanceStatus::Absent,
            },
            Mark {
                student_id: 1,
                status: AttendanceStatus::Late,
            },
        ];
        let deduped = dedupe_last_write(&marks);
        assert_eq!(
            deduped,
            vec![(1, "LATE".to_string()), (2, "ABSENT".to_string())]
        );
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [
            AttendanceStatus::Present,
            AttendanceStatus::Absent,
            AttendanceStatus::Late,
        ] {
            assert_eq!(AttendanceStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(matches!(
            AttendanceStatus::parse("EXCUSED"),
            Err(AttendanceError::BadStatus(_))
        ));
    }
}
