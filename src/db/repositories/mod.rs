pub mod attendance;
pub mod course;
pub mod roster;
pub mod user;
