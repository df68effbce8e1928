use actix_web::{HttpResponse, web};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{Actor, CreateUserInput};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

#[derive(Debug, Deserialize)]
pub struct UserSearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn me(state: web::Data<AppState>, actor: Actor) -> Result<HttpResponse, AppError> {
    let user = state.users.get(actor.user_id).await?;

    Ok(ApiResponse::success(user))
}

pub async fn list_users(
    state: web::Data<AppState>,
    _actor: Actor,
) -> Result<HttpResponse, AppError> {
    let users = state.users.list().await?;

    Ok(ApiResponse::success(users))
}

pub async fn search_users(
    state: web::Data<AppState>,
    _actor: Actor,
    query: web::Query<UserSearchQuery>,
) -> Result<HttpResponse, AppError> {
    let users = state.users.search(&query.q).await?;

    Ok(ApiResponse::success(users))
}

pub async fn get_user(
    state: web::Data<AppState>,
    _actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let user = state.users.get(path.into_inner()).await?;

    Ok(ApiResponse::success(user))
}

pub async fn provision_user(
    state: web::Data<AppState>,
    actor: Actor,
    input: web::Json<CreateUserInput>,
) -> Result<HttpResponse, AppError> {
    let user = state.users.provision(&actor, input.into_inner()).await?;

    Ok(ApiResponse::created(user))
}
