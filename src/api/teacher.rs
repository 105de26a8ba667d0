//! Routes for the teacher role: recording attendance and reports.

use axum::{
    Extension, Json, Router,
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::auth::{self, CurrentUser};
use super::{ApiError, ApiResponse, AppState, CourseDto};
use crate::services::{
    AttendanceRow, AttendanceSummary, CourseDetailRow, CourseRecordedToday, Mark, Role,
};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/courses", get(my_courses))
        .route("/attendance", post(record_attendance))
        .route("/attendance/status-today", get(status_today))
        .route("/attendance/{course_id}", get(attendance_for_date))
        .route("/reports/course-detail/{course_id}", get(course_detail))
        .route("/reports/course-summary/{course_id}", get(course_summary))
        .route_layer(middleware::from_fn(|req, next| {
            auth::require_role(Role::Teacher, req, next)
        }))
}

#[derive(Deserialize)]
pub struct DateQuery {
    pub date: NaiveDate,
}

#[derive(Deserialize)]
pub struct RecordAttendanceRequest {
    pub course_id: i32,
    pub date: NaiveDate,
    pub records: Vec<Mark>,
}

#[derive(Serialize)]
pub struct RecordAttendanceResponse {
    pub records_written: usize,
}

/// GET /teacher/courses
/// Courses assigned to the calling teacher
pub async fn my_courses(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<CourseDto>>>, ApiError> {
    let teacher = state.identity_service().resolve_teacher(&user.email).await?;

    let courses = state
        .store()
        .list_courses_for_teacher(teacher.teacher_id)
        .await?
        .into_iter()
        .map(CourseDto::from)
        .collect();

    Ok(Json(ApiResponse::success(courses)))
}

/// POST /teacher/attendance
/// Record one batch of marks for a course and date. The batch either
/// applies completely or not at all.
pub async fn record_attendance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<RecordAttendanceRequest>,
) -> Result<Json<ApiResponse<RecordAttendanceResponse>>, ApiError> {
    let teacher = state.identity_service().resolve_teacher(&user.email).await?;

    let records_written = state
        .attendance_service()
        .record_attendance(
            teacher.teacher_id,
            payload.course_id,
            payload.date,
            payload.records,
        )
        .await?;

    Ok(Json(ApiResponse::success(RecordAttendanceResponse {
        records_written,
    })))
}

/// GET /teacher/attendance/status-today
/// Which of the teacher's courses already have records for today
pub async fn status_today(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<CourseRecordedToday>>>, ApiError> {
    let teacher = state.identity_service().resolve_teacher(&user.email).await?;

    let statuses = state
        .attendance_service()
        .courses_recorded_today(teacher.teacher_id)
        .await?;

    Ok(Json(ApiResponse::success(statuses)))
}

/// GET /teacher/attendance/{course_id}?date=YYYY-MM-DD
/// Records for one course on one date, for the recording form
pub async fn attendance_for_date(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<i32>,
    Query(query): Query<DateQuery>,
) -> Result<Json<ApiResponse<Vec<AttendanceRow>>>, ApiError> {
    let teacher = state.identity_service().resolve_teacher(&user.email).await?;

    let rows = state
        .attendance_service()
        .attendance_for_course_date(teacher.teacher_id, course_id, query.date)
        .await?;

    Ok(Json(ApiResponse::success(rows)))
}

/// GET /teacher/reports/course-detail/{course_id}
/// Every record of the course joined with student names
pub async fn course_detail(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<CourseDetailRow>>>, ApiError> {
    let teacher = state.identity_service().resolve_teacher(&user.email).await?;

    let rows = state
        .attendance_service()
        .course_detail_report(teacher.teacher_id, course_id)
        .await?;

    Ok(Json(ApiResponse::success(rows)))
}

/// GET /teacher/reports/course-summary/{course_id}
/// One summary per enrolled student, ordered by student id
pub async fn course_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<AttendanceSummary>>>, ApiError> {
    let teacher = state.identity_service().resolve_teacher(&user.email).await?;

    let summaries = state
        .attendance_service()
        .course_summary_report(teacher.teacher_id, course_id)
        .await?;

    Ok(Json(ApiResponse::success(summaries)))
}
