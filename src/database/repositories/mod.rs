pub mod assignment;
pub mod attendance;
pub mod event;
pub mod team;
pub mod user;
