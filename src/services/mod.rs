pub mod assignments;
pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod events;
pub mod policy;
pub mod teams;
pub mod users;

pub use assignments::AssignmentService;
pub use attendance::{AttendanceService, Registration};
pub use auth::Claims;
pub use calendar::{CalendarService, DateWindow};
pub use events::EventService;
pub use teams::TeamService;
pub use users::UserService;
