//! Routes for the student role: own courses, history and summaries.

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware,
    routing::get,
};
use std::sync::Arc;

use super::auth::{self, CurrentUser};
use super::{ApiError, ApiResponse, AppState, CourseDto};
use crate::services::{AttendanceRow, AttendanceSummary, Role};

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/courses", get(my_courses))
        .route("/attendance/{course_id}", get(my_attendance))
        .route("/attendance-summary/{course_id}", get(my_attendance_summary))
        .route("/overall-summary", get(my_overall_summary))
        .route_layer(middleware::from_fn(|req, next| {
            auth::require_role(Role::Student, req, next)
        }))
}

/// GET /student/courses
/// Courses the calling student is enrolled in
pub async fn my_courses(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<Vec<CourseDto>>>, ApiError> {
    let student = state.identity_service().resolve_student(&user.email).await?;

    let courses = state
        .store()
        .list_courses_for_student(student.student_id)
        .await?
        .into_iter()
        .map(CourseDto::from)
        .collect();

    Ok(Json(ApiResponse::success(courses)))
}

/// GET /student/attendance/{course_id}
/// The calling student's per-date records in one course
pub async fn my_attendance(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<AttendanceRow>>>, ApiError> {
    let student = state.identity_service().resolve_student(&user.email).await?;

    let rows = state
        .attendance_service()
        .attendance_for_student_course(student.student_id, course_id)
        .await?;

    Ok(Json(ApiResponse::success(rows)))
}

/// GET /student/attendance-summary/{course_id}
/// Counts and percentage for one course
pub async fn my_attendance_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(course_id): Path<i32>,
) -> Result<Json<ApiResponse<AttendanceSummary>>, ApiError> {
    let student = state.identity_service().resolve_student(&user.email).await?;

    let summary = state
        .attendance_service()
        .summarize(student.student_id, course_id)
        .await?;

    Ok(Json(ApiResponse::success(summary)))
}

/// GET /student/overall-summary
/// Counts summed across all enrolled courses
pub async fn my_overall_summary(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<AttendanceSummary>>, ApiError> {
    let student = state.identity_service().resolve_student(&user.email).await?;

    let summary = state
        .attendance_service()
        .summarize_overall(student.student_id)
        .await?;

    Ok(Json(ApiResponse::success(summary)))
}
