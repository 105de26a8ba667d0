pub mod attendance_service;
pub mod attendance_service_impl;
pub mod auth_service;
pub mod auth_service_impl;
pub mod identity_service;
pub mod identity_service_impl;

pub use attendance_service::{
    AttendanceError, AttendanceRow, AttendanceService, AttendanceStatus, AttendanceSummary,
    CourseDetailRow, CourseRecordedToday, Mark,
};
pub use attendance_service_impl::SeaOrmAttendanceService;
pub use auth_service::{AccountInfo, AuthError, AuthService, Role};
pub use auth_service_impl::SeaOrmAuthService;
pub use identity_service::{IdentityError, IdentityService, StudentIdentity, TeacherIdentity};
pub use identity_service_impl::SeaOrmIdentityService;
