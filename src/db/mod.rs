use anyhow::Result;
use chrono::NaiveDate;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::SecurityConfig;
use crate::entities::{attendance, courses, students, teachers, users};

pub mod migrator;
pub mod repositories;

pub use repositories::user::User;

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        // An in-memory database exists per connection; pin the pool to one
        // connection so migrations and queries see the same database.
        let in_memory = db_url.contains(":memory:");
        let (max_connections, min_connections) = if in_memory {
            (1, 1)
        } else {
            (max_connections, min_connections)
        };

        if !in_memory {
            let path_str = db_url.trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    fn roster_repo(&self) -> repositories::roster::RosterRepository {
        repositories::roster::RosterRepository::new(self.conn.clone())
    }

    fn course_repo(&self) -> repositories::course::CourseRepository {
        repositories::course::CourseRepository::new(self.conn.clone())
    }

    fn attendance_repo(&self) -> repositories::attendance::AttendanceRepository {
        repositories::attendance::AttendanceRepository::new(self.conn.clone())
    }

    // -- users ------------------------------------------------------------

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password: &str,
        roles: &[String],
        config: Option<&SecurityConfig>,
    ) -> Result<User> {
        self.user_repo()
            .create(name, email, password, roles, config)
            .await
    }

    pub async fn roles_for_user(&self, user_id: i32) -> Result<Vec<String>> {
        self.user_repo().roles_for(user_id).await
    }

    pub async fn verify_user_password(&self, email: &str, password: &str) -> Result<bool> {
        self.user_repo().verify_password(email, password).await
    }

    pub async fn update_user_password(
        &self,
        email: &str,
        new_password: &str,
        config: Option<&SecurityConfig>,
    ) -> Result<()> {
        self.user_repo()
            .update_password(email, new_password, config)
            .await
    }

    // -- roster -----------------------------------------------------------

    pub async fn create_student(&self, user_id: i32) -> Result<students::Model> {
        self.roster_repo().create_student(user_id).await
    }

    pub async fn create_teacher(&self, user_id: i32) -> Result<teachers::Model> {
        self.roster_repo().create_teacher(user_id).await
    }

    pub async fn get_student(&self, id: i32) -> Result<Option<students::Model>> {
        self.roster_repo().student_by_id(id).await
    }

    pub async fn get_teacher(&self, id: i32) -> Result<Option<teachers::Model>> {
        self.roster_repo().teacher_by_id(id).await
    }

    pub async fn get_student_by_user_id(&self, user_id: i32) -> Result<Option<students::Model>> {
        self.roster_repo().student_by_user_id(user_id).await
    }

    pub async fn get_teacher_by_user_id(&self, user_id: i32) -> Result<Option<teachers::Model>> {
        self.roster_repo().teacher_by_user_id(user_id).await
    }

    pub async fn get_student_with_user(
        &self,
        id: i32,
    ) -> Result<Option<(students::Model, users::Model)>> {
        self.roster_repo().student_with_user(id).await
    }

    pub async fn list_students(&self) -> Result<Vec<(students::Model, users::Model)>> {
        self.roster_repo().list_students().await
    }

    pub async fn list_teachers(&self) -> Result<Vec<(teachers::Model, users::Model)>> {
        self.roster_repo().list_teachers().await
    }

    // -- courses ----------------------------------------------------------

    pub async fn create_course(&self, course_code: &str, name: &str) -> Result<courses::Model> {
        self.course_repo().create(course_code, name).await
    }

    pub async fn get_course(&self, id: i32) -> Result<Option<courses::Model>> {
        self.course_repo().get(id).await
    }

    pub async fn get_course_by_code(&self, course_code: &str) -> Result<Option<courses::Model>> {
        self.course_repo().get_by_code(course_code).await
    }

    pub async fn update_course(
        &self,
        id: i32,
        course_code: &str,
        name: &str,
    ) -> Result<Option<courses::Model>> {
        self.course_repo().update(id, course_code, name).await
    }

    pub async fn assign_course_teacher(
        &self,
        id: i32,
        teacher_id: i32,
    ) -> Result<Option<courses::Model>> {
        self.course_repo().assign_teacher(id, teacher_id).await
    }

    pub async fn list_courses(&self) -> Result<Vec<courses::Model>> {
        self.course_repo().list_all().await
    }

    pub async fn list_courses_for_teacher(&self, teacher_id: i32) -> Result<Vec<courses::Model>> {
        self.course_repo().list_for_teacher(teacher_id).await
    }

    pub async fn list_courses_for_student(&self, student_id: i32) -> Result<Vec<courses::Model>> {
        self.course_repo().list_for_student(student_id).await
    }

    pub async fn enroll_student(&self, student_id: i32, course_id: i32) -> Result<()> {
        self.course_repo().enroll(student_id, course_id).await
    }

    pub async fn enrolled_student_ids(&self, course_id: i32) -> Result<Vec<i32>> {
        self.course_repo().enrolled_student_ids(course_id).await
    }

    // -- attendance -------------------------------------------------------

    pub async fn list_attendance_for_student_course(
        &self,
        student_id: i32,
        course_id: i32,
    ) -> Result<Vec<attendance::Model>> {
        self.attendance_repo()
            .list_for_student_course(student_id, course_id)
            .await
    }

    pub async fn list_attendance_for_course_date(
        &self,
        course_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<attendance::Model>> {
        self.attendance_repo()
            .list_for_course_date(course_id, date)
            .await
    }

    pub async fn list_attendance_for_course(
        &self,
        course_id: i32,
    ) -> Result<Vec<attendance::Model>> {
        self.attendance_repo().list_for_course(course_id).await
    }

    pub async fn count_attendance_status(
        &self,
        student_id: i32,
        course_id: i32,
        status: &str,
    ) -> Result<u64> {
        self.attendance_repo()
            .count_status(student_id, course_id, status)
            .await
    }

    pub async fn upsert_attendance_batch(
        &self,
        course_id: i32,
        date: NaiveDate,
        marks: &[(i32, String)],
    ) -> Result<usize> {
        self.attendance_repo()
            .upsert_batch(course_id, date, marks)
            .await
    }

    pub async fn course_ids_recorded_on(
        &self,
        course_ids: &[i32],
        date: NaiveDate,
    ) -> Result<Vec<i32>> {
        self.attendance_repo()
            .course_ids_recorded_on(course_ids, date)
            .await
    }
}
