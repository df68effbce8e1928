pub mod assignments;
pub mod attendance;
pub mod calendar;
pub mod events;
pub mod shared;
pub mod teams;
pub mod users;
