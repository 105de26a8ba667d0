mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{ADMIN_EMAIL, ADMIN_PASSWORD, login, request, signup, spawn_app};

#[tokio::test]
async fn signup_and_login_flow() {
    let app = spawn_app().await;

    signup(&app, "Alice Adams", "alice@school.test", "password123", &["STUDENT"]).await;
    let cookie = login(&app, "alice@school.test", "password123").await;

    let (status, body) = request(&app, "GET", "/api/user/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Alice Adams");
    assert_eq!(body["data"]["email"], "alice@school.test");
    assert_eq!(body["data"]["roles"], json!(["STUDENT"]));
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let app = spawn_app().await;

    let (status, _) = request(&app, "GET", "/api/user/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, "GET", "/api/student/courses", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(&app, "GET", "/api/admin/courses", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let app = spawn_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": ADMIN_EMAIL, "password": "not-the-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn signup_rejects_duplicate_email() {
    let app = spawn_app().await;

    signup(&app, "Bob Brown", "bob@school.test", "password123", &["STUDENT"]).await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Bob Again",
            "email": "bob@school.test",
            "password": "password456",
            "roles": ["STUDENT"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn signup_rejects_short_password() {
    let app = spawn_app().await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Carol Clark",
            "email": "carol@school.test",
            "password": "short",
            "roles": ["STUDENT"],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signup_defaults_to_student_role() {
    let app = spawn_app().await;

    let (status, body) = request(
        &app,
        "POST",
        "/api/auth/signup",
        None,
        Some(json!({
            "name": "Dana Doe",
            "email": "dana@school.test",
            "password": "password123",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["roles"], json!(["STUDENT"]));

    // The student record exists, so student routes work.
    let cookie = login(&app, "dana@school.test", "password123").await;
    let (status, _) = request(&app, "GET", "/api/student/courses", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn role_guards_reject_wrong_role() {
    let app = spawn_app().await;

    signup(&app, "Eve Evans", "eve@school.test", "password123", &["STUDENT"]).await;
    let student_cookie = login(&app, "eve@school.test", "password123").await;

    let (status, _) = request(&app, "GET", "/api/teacher/courses", Some(&student_cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(&app, "GET", "/api/admin/courses", Some(&student_cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin_cookie = login(&app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let (status, _) = request(&app, "GET", "/api/student/courses", Some(&admin_cookie), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = spawn_app().await;

    signup(&app, "Finn Ford", "finn@school.test", "password123", &["STUDENT"]).await;
    let cookie = login(&app, "finn@school.test", "password123").await;

    let (status, _) = request(&app, "POST", "/api/auth/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = request(&app, "GET", "/api/user/me", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let app = spawn_app().await;

    signup(&app, "Gail Green", "gail@school.test", "password123", &["STUDENT"]).await;
    let cookie = login(&app, "gail@school.test", "password123").await;

    let (status, _) = request(
        &app,
        "POST",
        "/api/user/change-password",
        Some(&cookie),
        Some(json!({"current_password": "wrong", "new_password": "newpassword1"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = request(
        &app,
        "POST",
        "/api/user/change-password",
        Some(&cookie),
        Some(json!({"current_password": "password123", "new_password": "newpassword1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Old credentials are gone, new ones work.
    let (status, _) = request(
        &app,
        "POST",
        "/api/auth/login",
        None,
        Some(json!({"email": "gail@school.test", "password": "password123"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    login(&app, "gail@school.test", "newpassword1").await;
}

#[tokio::test]
async fn teacher_signup_can_use_teacher_routes() {
    let app = spawn_app().await;

    signup(&app, "Hank Hill", "hank@school.test", "password123", &["TEACHER"]).await;
    let cookie = login(&app, "hank@school.test", "password123").await;

    let (status, body) = request(&app, "GET", "/api/teacher/courses", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}
