use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{Actor, CreateEventInput, EventStatus, UpdateEventInput};
use crate::error::AppError;
use crate::handlers::shared::{ApiResponse, parse_filter};

#[derive(Debug, Deserialize)]
pub struct EventListQuery {
    pub status: Option<String>,
}

pub async fn list_events(
    state: web::Data<AppState>,
    _actor: Actor,
    query: web::Query<EventListQuery>,
) -> Result<HttpResponse, AppError> {
    let status = parse_filter::<EventStatus>(query.status.as_deref())?;
    let events = state.events.list(status).await?;

    Ok(ApiResponse::success(events))
}

pub async fn create_event(
    state: web::Data<AppState>,
    actor: Actor,
    input: web::Json<CreateEventInput>,
) -> Result<HttpResponse, AppError> {
    let event = state.events.create(&actor, input.into_inner()).await?;

    Ok(ApiResponse::created(event))
}

pub async fn get_event(
    state: web::Data<AppState>,
    _actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let event = state.events.get(path.into_inner()).await?;

    Ok(ApiResponse::success(event))
}

pub async fn update_event(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
    input: web::Json<UpdateEventInput>,
) -> Result<HttpResponse, AppError> {
    let event = state
        .events
        .update(&actor, path.into_inner(), input.into_inner())
        .await?;

    Ok(ApiResponse::success(event))
}

pub async fn delete_event(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.events.delete(&actor, path.into_inner()).await?;

    Ok(ApiResponse::message("Event deleted"))
}

pub async fn my_events(
    state: web::Data<AppState>,
    actor: Actor,
) -> Result<HttpResponse, AppError> {
    let events = state.events.my_events(&actor).await?;

    Ok(ApiResponse::success(events))
}
