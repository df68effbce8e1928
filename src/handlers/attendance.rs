use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::Actor;
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

pub async fn register(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let registration = state.attendance.register(&actor, path.into_inner()).await?;

    // A reactivated registration keeps its row, so it is not a new resource.
    if registration.is_created() {
        Ok(ApiResponse::created(registration.into_attendance()))
    } else {
        Ok(ApiResponse::success(registration.into_attendance()))
    }
}

pub async fn cancel(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let attendance = state.attendance.cancel(&actor, path.into_inner()).await?;

    Ok(ApiResponse::success(attendance))
}

pub async fn attendees(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let attendees = state.attendance.attendees(&actor, path.into_inner()).await?;

    Ok(ApiResponse::success(attendees))
}

pub async fn my_registrations(
    state: web::Data<AppState>,
    actor: Actor,
) -> Result<HttpResponse, AppError> {
    let registrations = state.attendance.my_registrations(actor.user_id).await?;

    Ok(ApiResponse::success(registrations))
}
