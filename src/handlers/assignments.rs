use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{
    Actor, AssignmentQuery, AssignmentStatus, PendingCount, RespondAssignmentInput,
};
use crate::error::AppError;
use crate::handlers::shared::{ApiResponse, parse_filter};
use crate::services::AssignmentService;

pub async fn my_assignments(
    state: web::Data<AppState>,
    actor: Actor,
    query: web::Query<AssignmentQuery>,
) -> Result<HttpResponse, AppError> {
    let status = parse_filter::<AssignmentStatus>(query.status.as_deref())?;
    let assignments = state
        .assignments
        .list_for_user(actor.user_id, status)
        .await?;

    Ok(ApiResponse::success(assignments))
}

pub async fn pending_count(
    state: web::Data<AppState>,
    actor: Actor,
) -> Result<HttpResponse, AppError> {
    let count = state.assignments.pending_count(actor.user_id).await?;

    Ok(ApiResponse::success(PendingCount { count }))
}

pub async fn respond(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
    input: web::Json<RespondAssignmentInput>,
) -> Result<HttpResponse, AppError> {
    let status = AssignmentService::parse_response(&input.status)?;
    let assignment = state
        .assignments
        .respond(&actor, path.into_inner(), status)
        .await?;

    Ok(ApiResponse::success(assignment))
}

pub async fn respond_for_event(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
    input: web::Json<RespondAssignmentInput>,
) -> Result<HttpResponse, AppError> {
    let status = AssignmentService::parse_response(&input.status)?;
    let assignment = state
        .assignments
        .respond_for_event(&actor, path.into_inner(), status)
        .await?;

    Ok(ApiResponse::success(assignment))
}

pub async fn event_assignments(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let assignments = state
        .assignments
        .list_for_event(&actor, path.into_inner())
        .await?;

    Ok(ApiResponse::success(assignments))
}
