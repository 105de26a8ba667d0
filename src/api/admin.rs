//! Routes for the admin role: course catalogue, teacher assignment,
//! enrollment and roster listings.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post, put},
};
use serde::Deserialize;
use std::sync::Arc;

use super::auth;
use super::{ApiError, ApiResponse, AppState, CourseDto, MessageResponse, PersonDto};
use crate::services::Role;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/courses", get(list_courses))
        .route("/courses", post(create_course))
        .route("/courses/{id}", put(update_course))
        .route("/courses/{id}/teacher/{teacher_id}", put(assign_teacher))
        .route("/enrollments", post(enroll_student))
        .route("/students", get(list_students))
        .route("/teachers", get(list_teachers))
        .route_layer(middleware::from_fn(|req, next| {
            auth::require_role(Role::Admin, req, next)
        }))
}

#[derive(Deserialize)]
pub struct CreateCourseRequest {
    pub course_code: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct UpdateCourseRequest {
    pub course_code: String,
    pub name: String,
}

#[derive(Deserialize)]
pub struct EnrollStudentRequest {
    pub student_id: i32,
    pub course_id: i32,
}

fn validate_course_fields(course_code: &str, name: &str) -> Result<(), ApiError> {
    if course_code.trim().is_empty() {
        return Err(ApiError::validation("Course code is required"));
    }
    if name.trim().is_empty() {
        return Err(ApiError::validation("Course name is required"));
    }
    Ok(())
}

/// GET /admin/courses
pub async fn list_courses(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CourseDto>>>, ApiError> {
    let courses = state
        .store()
        .list_courses()
        .await?
        .into_iter()
        .map(CourseDto::from)
        .collect();

    Ok(Json(ApiResponse::success(courses)))
}

/// POST /admin/courses
/// Create a course. Course codes are unique.
pub async fn create_course(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCourseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CourseDto>>), ApiError> {
    validate_course_fields(&payload.course_code, &payload.name)?;

    if state
        .store()
        .get_course_by_code(&payload.course_code)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "Course code '{}' already exists",
            payload.course_code
        )));
    }

    let course = state
        .store()
        .create_course(&payload.course_code, &payload.name)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CourseDto::from(course))),
    ))
}

/// PUT /admin/courses/{id}
/// Rename a course or change its code
pub async fn update_course(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateCourseRequest>,
) -> Result<Json<ApiResponse<CourseDto>>, ApiError> {
    validate_course_fields(&payload.course_code, &payload.name)?;

    if let Some(existing) = state
        .store()
        .get_course_by_code(&payload.course_code)
        .await?
        && existing.id != id
    {
        return Err(ApiError::Conflict(format!(
            "Course code '{}' already exists",
            payload.course_code
        )));
    }

    let course = state
        .store()
        .update_course(id, &payload.course_code, &payload.name)
        .await?
        .ok_or_else(|| ApiError::not_found("Course", id))?;

    Ok(Json(ApiResponse::success(CourseDto::from(course))))
}

/// PUT /admin/courses/{id}/teacher/{teacher_id}
/// Assign a teacher to a course, replacing any previous assignment
pub async fn assign_teacher(
    State(state): State<Arc<AppState>>,
    Path((id, teacher_id)): Path<(i32, i32)>,
) -> Result<Json<ApiResponse<CourseDto>>, ApiError> {
    if state.store().get_teacher(teacher_id).await?.is_none() {
        return Err(ApiError::not_found("Teacher", teacher_id));
    }

    let course = state
        .store()
        .assign_course_teacher(id, teacher_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Course", id))?;

    Ok(Json(ApiResponse::success(CourseDto::from(course))))
}

/// POST /admin/enrollments
/// Enroll a student in a course. Enrolling twice is a no-op.
pub async fn enroll_student(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EnrollStudentRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    if state.store().get_student(payload.student_id).await?.is_none() {
        return Err(ApiError::not_found("Student", payload.student_id));
    }
    if state.store().get_course(payload.course_id).await?.is_none() {
        return Err(ApiError::not_found("Course", payload.course_id));
    }

    state
        .store()
        .enroll_student(payload.student_id, payload.course_id)
        .await?;

    Ok(Json(ApiResponse::success(MessageResponse {
        message: "Student enrolled".to_string(),
    })))
}

/// GET /admin/students
pub async fn list_students(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<PersonDto>>>, ApiError> {
    let students = state
        .store()
        .list_students()
        .await?
        .into_iter()
        .map(|(student, user)| PersonDto {
            id: student.id,
            user_id: user.id,
            name: user.name,
            email: user.email,
        })
        .collect();

    Ok(Json(ApiResponse::success(students)))
}

/// GET /admin/teachers
pub async fn list_teachers(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<PersonDto>>>, ApiError> {
    let teachers = state
        .store()
        .list_teachers()
        .await?
        .into_iter()
        .map(|(teacher, user)| PersonDto {
            id: teacher.id,
            user_id: user.id,
            name: user.name,
            email: user.email,
        })
        .collect();

    Ok(Json(ApiResponse::success(teachers)))
}
