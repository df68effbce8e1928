pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;

use sqlx::SqlitePool;

pub use config::Config;
pub use error::AppError;
use services::{
    AssignmentService, AttendanceService, CalendarService, EventService, TeamService, UserService,
};

/// Services shared by every worker, all built over the same pool.
#[derive(Clone)]
pub struct AppState {
    pub events: EventService,
    pub assignments: AssignmentService,
    pub attendance: AttendanceService,
    pub calendar: CalendarService,
    pub teams: TeamService,
    pub users: UserService,
}

impl AppState {
    pub fn new(pool: SqlitePool) -> Self {
        let assignments = AssignmentService::new(pool.clone());

        Self {
            events: EventService::new(pool.clone(), assignments.clone()),
            assignments,
            attendance: AttendanceService::new(pool.clone()),
            calendar: CalendarService::new(pool.clone()),
            teams: TeamService::new(pool.clone()),
            users: UserService::new(pool),
        }
    }
}
