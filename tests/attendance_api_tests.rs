mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{login, record, request, setup_school, signup, spawn_app};

#[tokio::test]
async fn teacher_records_attendance_for_today() {
    let app = spawn_app().await;
    let school = setup_school(&app).await;

    let (status, body) = record(
        &app,
        &school.teacher_cookie,
        school.course_id,
        "2024-03-15",
        json!([{"student_id": school.student_id, "status": "PRESENT"}]),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "record failed: {body}");
    assert_eq!(body["data"]["records_written"], 1);

    let (status, body) = request(
        &app,
        "GET",
        &format!(
            "/api/teacher/attendance/{}?date=2024-03-15",
            school.course_id
        ),
        Some(&school.teacher_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["student_id"], school.student_id);
    assert_eq!(rows[0]["status"], "PRESENT");
}

#[tokio::test]
async fn yesterday_is_still_writable() {
    let app = spawn_app().await;
    let school = setup_school(&app).await;

    let (status, _) = record(
        &app,
        &school.teacher_cookie,
        school.course_id,
        "2024-03-14",
        json!([{"student_id": school.student_id, "status": "LATE"}]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn future_dates_are_rejected() {
    let app = spawn_app().await;
    let school = setup_school(&app).await;

    let (status, body) = record(
        &app,
        &school.teacher_cookie,
        school.course_id,
        "2024-03-16",
        json!([{"student_id": school.student_id, "status": "PRESENT"}]),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn dates_older_than_the_window_are_locked() {
    let app = spawn_app().await;
    let school = setup_school(&app).await;

    let (status, _) = record(
        &app,
        &school.teacher_cookie,
        school.course_id,
        "2024-03-13",
        json!([{"student_id": school.student_id, "status": "PRESENT"}]),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn resubmitting_a_date_overwrites_the_status() {
    let app = spawn_app().await;
    let school = setup_school(&app).await;

    record(
        &app,
        &school.teacher_cookie,
        school.course_id,
        "2024-03-15",
        json!([{"student_id": school.student_id, "status": "PRESENT"}]),
    )
    .await;
    record(
        &app,
        &school.teacher_cookie,
        school.course_id,
        "2024-03-15",
        json!([{"student_id": school.student_id, "status": "ABSENT"}]),
    )
    .await;

    // One row per (student, course, date), holding the latest status.
    let (status, body) = request(
        &app,
        "GET",
        &format!("/api/student/attendance/{}", school.course_id),
        Some(&school.student_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "ABSENT");
}

#[tokio::test]
async fn duplicate_marks_in_one_batch_keep_the_last() {
    let app = spawn_app().await;
    let school = setup_school(&app).await;

    let (status, body) = record(
        &app,
        &school.teacher_cookie,
        school.course_id,
        "2024-03-15",
        json!([
            {"student_id": school.student_id, "status": "PRESENT"},
            {"student_id": school.student_id, "status": "LATE"},
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["records_written"], 1);

    let (_, body) = request(
        &app,
        "GET",
        &format!("/api/student/attendance/{}", school.course_id),
        Some(&school.student_cookie),
        None,
    )
    .await;
    assert_eq!(body["data"][0]["status"], "LATE");
}

#[tokio::test]
async fn unknown_student_aborts_the_whole_batch() {
    let app = spawn_app().await;
    let school = setup_school(&app).await;

    let (status, _) = record(
        &app,
        &school.teacher_cookie,
        school.course_id,
        "2024-03-15",
        json!([
            {"student_id": school.student_id, "status": "PRESENT"},
            {"student_id": 9999, "status": "ABSENT"},
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Nothing was written, including the valid mark.
    let (_, body) = request(
        &app,
        "GET",
        &format!("/api/student/attendance/{}", school.course_id),
        Some(&school.student_cookie),
        None,
    )
    .await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn only_the_assigned_teacher_may_record() {
    let app = spawn_app().await;
    let school = setup_school(&app).await;

    signup(&app, "Olga Other", "olga@school.test", "password123", &["TEACHER"]).await;
    let other_cookie = login(&app, "olga@school.test", "password123").await;

    let (status, _) = record(
        &app,
        &other_cookie,
        school.course_id,
        "2024-03-15",
        json!([{"student_id": school.student_id, "status": "PRESENT"}]),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = request(
        &app,
        "GET",
        &format!(
            "/api/teacher/reports/course-summary/{}",
            school.course_id
        ),
        Some(&other_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn date_rules_are_checked_before_ownership() {
    let app = spawn_app().await;
    let school = setup_school(&app).await;

    signup(&app, "Wendy West", "wendy@school.test", "password123", &["TEACHER"]).await;
    let other_cookie = login(&app, "wendy@school.test", "password123").await;

    // A non-owning teacher submitting a future date hears about the
    // date rule, not about ownership.
    let (status, body) = record(
        &app,
        &other_cookie,
        school.course_id,
        "2024-03-16",
        json!([{"student_id": school.student_id, "status": "PRESENT"}]),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "got: {body}");

    let (status, _) = record(
        &app,
        &other_cookie,
        school.course_id,
        "2024-03-13",
        json!([{"student_id": school.student_id, "status": "PRESENT"}]),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn recording_against_a_missing_course_is_not_found() {
    let app = spawn_app().await;
    let school = setup_school(&app).await;

    let (status, _) = record(
        &app,
        &school.teacher_cookie,
        9999,
        "2024-03-15",
        json!([{"student_id": school.student_id, "status": "PRESENT"}]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let app = spawn_app().await;
    let school = setup_school(&app).await;

    let (status, body) = record(
        &app,
        &school.teacher_cookie,
        school.course_id,
        "2024-03-15",
        json!([]),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["records_written"], 0);
}

#[tokio::test]
async fn status_today_flips_after_recording() {
    let app = spawn_app().await;
    let school = setup_school(&app).await;

    let (status, body) = request(
        &app,
        "GET",
        "/api/teacher/attendance/status-today",
        Some(&school.teacher_cookie),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let courses = body["data"].as_array().unwrap();
    assert_eq!(courses.len(), 1);
    assert_eq!(courses[0]["course_id"], school.course_id);
    assert_eq!(courses[0]["recorded"], false);

    record(
        &app,
        &school.teacher_cookie,
        school.course_id,
        "2024-03-15",
        json!([{"student_id": school.student_id, "status": "PRESENT"}]),
    )
    .await;

    let (_, body) = request(
        &app,
        "GET",
        "/api/teacher/attendance/status-today",
        Some(&school.teacher_cookie),
        None,
    )
    .await;
    assert_eq!(body["data"][0]["recorded"], true);
}

#[tokio::test]
async fn yesterdays_records_do_not_count_as_today() {
    let app = spawn_app().await;
    let school = setup_school(&app).await;

    record(
        &app,
        &school.teacher_cookie,
        school.course_id,
        "2024-03-14",
        json!([{"student_id": school.student_id, "status": "PRESENT"}]),
    )
    .await;

    let (_, body) = request(
        &app,
        "GET",
        "/api/teacher/attendance/status-today",
        Some(&school.teacher_cookie),
        None,
    )
    .await;
    assert_eq!(body["data"][0]["recorded"], false);
}
