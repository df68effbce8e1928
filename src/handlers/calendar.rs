use actix_web::{HttpResponse, web};
use serde::Deserialize;

use crate::AppState;
use crate::database::models::Actor;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;
use crate::services::DateWindow;

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub start: String,
    pub end: String,
}

pub async fn my_calendar(
    state: web::Data<AppState>,
    actor: Actor,
    query: web::Query<CalendarQuery>,
) -> Result<HttpResponse, AppError> {
    let window = DateWindow::parse(&query.start, &query.end)?;
    let events = state.calendar.for_user(actor.user_id, window).await?;

    Ok(ApiResponse::success(events))
}

pub async fn global_calendar(
    state: web::Data<AppState>,
    _actor: Actor,
    query: web::Query<CalendarQuery>,
) -> Result<HttpResponse, AppError> {
    let window = DateWindow::parse(&query.start, &query.end)?;
    let events = state.calendar.global(window).await?;

    Ok(ApiResponse::success(events))
}
