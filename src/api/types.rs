use serde::Serialize;

use crate::entities::courses;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CourseDto {
    pub id: i32,
    pub course_code: String,
    pub name: String,
    pub teacher_id: Option<i32>,
}

impl From<courses::Model> for CourseDto {
    fn from(model: courses::Model) -> Self {
        Self {
            id: model.id,
            course_code: model.course_code,
            name: model.name,
            teacher_id: model.teacher_id,
        }
    }
}

/// A student or teacher roster entry joined with its user account.
#[derive(Debug, Serialize)]
pub struct PersonDto {
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}
