pub mod prelude;

pub mod attendance;
pub mod courses;
pub mod enrollments;
pub mod students;
pub mod teachers;
pub mod user_roles;
pub mod users;
