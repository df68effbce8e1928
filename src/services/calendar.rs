use chrono::NaiveDate;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{EventWithAssignment, EventWithAttendeeCount};
use crate::database::repositories::event as event_repo;
use crate::error::AppError;
use crate::services::events::parse_date;

/// An inclusive `[start, end]` range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AppError> {
        if start > end {
            return Err(AppError::validation("start must not be after end"));
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, AppError> {
        Self::new(parse_date(start, "start")?, parse_date(end, "end")?)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Clone)]
pub struct CalendarService {
    pool: SqlitePool,
}

impl CalendarService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Published events on a user's calendar within the window: their own
    /// personal events, team events they are assigned to, and anything they
    /// approved. Each row carries the user's assignment status if there is one.
    pub async fn for_user(
        &self,
        user_id: Uuid,
        window: DateWindow,
    ) -> Result<Vec<EventWithAssignment>, AppError> {
        Ok(event_repo::get_calendar_for_user(&self.pool, user_id, window.start, window.end).await?)
    }

    /// Every published event within the window.
    pub async fn global(&self, window: DateWindow) -> Result<Vec<EventWithAttendeeCount>, AppError> {
        Ok(event_repo::get_published_in_range(&self.pool, window.start, window.end).await?)
    }
}
