pub use super::attendance::Entity as Attendance;
pub use super::courses::Entity as Courses;
pub use super::enrollments::Entity as Enrollments;
pub use super::students::Entity as Students;
pub use super::teachers::Entity as Teachers;
pub use super::user_roles::Entity as UserRoles;
pub use super::users::Entity as Users;
