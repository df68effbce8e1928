use actix_web::{HttpResponse, web};
use uuid::Uuid;

use crate::AppState;
use crate::database::models::{Actor, AddTeamMemberInput, CreateTeamInput, UpdateTeamInput};
use crate::error::AppError;
use crate::handlers::shared::ApiResponse;

pub async fn create_team(
    state: web::Data<AppState>,
    actor: Actor,
    input: web::Json<CreateTeamInput>,
) -> Result<HttpResponse, AppError> {
    let team = state.teams.create(&actor, input.into_inner()).await?;

    Ok(ApiResponse::created(team))
}

pub async fn list_teams(
    state: web::Data<AppState>,
    _actor: Actor,
) -> Result<HttpResponse, AppError> {
    let teams = state.teams.list().await?;

    Ok(ApiResponse::success(teams))
}

pub async fn my_teams(
    state: web::Data<AppState>,
    actor: Actor,
) -> Result<HttpResponse, AppError> {
    let teams = state.teams.my_teams(actor.user_id).await?;

    Ok(ApiResponse::success(teams))
}

pub async fn get_team(
    state: web::Data<AppState>,
    _actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let team = state.teams.get(path.into_inner()).await?;

    Ok(ApiResponse::success(team))
}

pub async fn update_team(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
    input: web::Json<UpdateTeamInput>,
) -> Result<HttpResponse, AppError> {
    let team = state
        .teams
        .update(&actor, path.into_inner(), input.into_inner())
        .await?;

    Ok(ApiResponse::success(team))
}

pub async fn delete_team(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    state.teams.delete(&actor, path.into_inner()).await?;

    Ok(ApiResponse::message("Team deleted"))
}

pub async fn get_team_members(
    state: web::Data<AppState>,
    _actor: Actor,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let members = state.teams.members(path.into_inner()).await?;

    Ok(ApiResponse::success(members))
}

pub async fn add_team_member(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<Uuid>,
    input: web::Json<AddTeamMemberInput>,
) -> Result<HttpResponse, AppError> {
    let member = state
        .teams
        .add_member(&actor, path.into_inner(), input.user_id)
        .await?;

    Ok(ApiResponse::created(member))
}

pub async fn remove_team_member(
    state: web::Data<AppState>,
    actor: Actor,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (team_id, user_id) = path.into_inner();
    state.teams.remove_member(&actor, team_id, user_id).await?;

    Ok(ApiResponse::message("Member removed"))
}
