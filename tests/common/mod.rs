#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::NaiveDate;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use rollcall::clock::FixedClock;
use rollcall::config::Config;

/// Admin account seeded by the initial migration.
pub const ADMIN_EMAIL: &str = "admin@rollcall.local";
pub const ADMIN_PASSWORD: &str = "password";

/// The date every test app's clock is pinned to.
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

pub fn yesterday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
}

pub async fn spawn_app() -> Router {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;

    let state = rollcall::api::create_app_state_with_clock(config, Arc::new(FixedClock(today())))
        .await
        .expect("Failed to create app state");
    rollcall::api::router(state)
}

/// Sends one request and returns status plus parsed JSON body (Null for
/// non-JSON bodies such as the logout response).
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// Registers an account through the public signup endpoint.
pub async fn signup(app: &Router, name: &str, email: &str, password: &str, roles: &[&str]) {
    let (status, body) = request(
        app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": name,
            "email": email,
            "password": password,
            "roles": roles,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "signup failed: {body}");
}

/// Logs in and returns the session cookie to send on later requests.
pub async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    json!({"email": email, "password": password}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK, "login failed for {email}");

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login response carried no session cookie")
        .to_str()
        .unwrap();
    cookie.split(';').next().unwrap().to_string()
}

/// Looks up a roster entry id (student or teacher) by email via the
/// admin listing endpoints.
pub async fn roster_id(app: &Router, admin_cookie: &str, uri: &str, email: &str) -> i32 {
    let (status, body) = request(app, "GET", uri, Some(admin_cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["email"] == email)
        .unwrap_or_else(|| panic!("{email} not found in {uri}"))["id"]
        .as_i64()
        .unwrap() as i32
}

/// A course with one assigned teacher and one enrolled student, plus
/// live sessions for all three roles.
pub struct TestSchool {
    pub admin_cookie: String,
    pub teacher_cookie: String,
    pub student_cookie: String,
    pub course_id: i32,
    pub teacher_id: i32,
    pub student_id: i32,
}

pub async fn setup_school(app: &Router) -> TestSchool {
    let admin_cookie = login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await;

    signup(app, "Tina Teacher", "tina@school.test", "teachpass1", &["TEACHER"]).await;
    signup(app, "Sam Student", "sam@school.test", "studpass1", &["STUDENT"]).await;
    let teacher_cookie = login(app, "tina@school.test", "teachpass1").await;
    let student_cookie = login(app, "sam@school.test", "studpass1").await;

    let teacher_id = roster_id(app, &admin_cookie, "/api/admin/teachers", "tina@school.test").await;
    let student_id = roster_id(app, &admin_cookie, "/api/admin/students", "sam@school.test").await;

    let (status, body) = request(
        app,
        "POST",
        "/api/admin/courses",
        Some(&admin_cookie),
        Some(json!({"course_code": "CS101", "name": "Intro to Programming"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "course creation failed: {body}");
    let course_id = body["data"]["id"].as_i64().unwrap() as i32;

    let (status, _) = request(
        app,
        "PUT",
        &format!("/api/admin/courses/{course_id}/teacher/{teacher_id}"),
        Some(&admin_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(
        app,
        "POST",
        "/api/admin/enrollments",
        Some(&admin_cookie),
        Some(json!({"student_id": student_id, "course_id": course_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    TestSchool {
        admin_cookie,
        teacher_cookie,
        student_cookie,
        course_id,
        teacher_id,
        student_id,
    }
}

/// Posts one attendance batch as the given teacher.
pub async fn record(
    app: &Router,
    teacher_cookie: &str,
    course_id: i32,
    date: &str,
    records: Value,
) -> (StatusCode, Value) {
    request(
        app,
        "POST",
        "/api/teacher/attendance",
        Some(teacher_cookie),
        Some(json!({
            "course_id": course_id,
            "date": date,
            "records": records,
        })),
    )
    .await
}
