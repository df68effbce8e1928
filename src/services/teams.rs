use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{
    Actor, CreateTeamInput, Team, TeamMember, TeamMemberWithUser, TeamWithMembers,
    UpdateTeamInput,
};
use crate::database::repositories::{event as event_repo, team as team_repo, user as user_repo};
use crate::database::transaction::DatabaseTransaction;
use crate::error::AppError;
use crate::services::policy;

const MANAGE_TEAMS: &str = "Only admins can manage teams";

#[derive(Clone)]
pub struct TeamService {
    pool: SqlitePool,
}

impl TeamService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, actor: &Actor, input: CreateTeamInput) -> Result<Team, AppError> {
        policy::require(policy::can_manage_teams(actor), MANAGE_TEAMS)?;

        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name is required"));
        }

        let now = Utc::now();
        let team = Team {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: input.description,
            created_by: actor.user_id,
            created_at: now,
            updated_at: now,
        };

        let team = team_repo::create_team(&self.pool, &team).await?;
        log::info!("Team {} ({}) created by {}", team.id, team.name, actor.user_id);
        Ok(team)
    }

    pub async fn list(&self) -> Result<Vec<Team>, AppError> {
        Ok(team_repo::get_all(&self.pool).await?)
    }

    pub async fn get(&self, team_id: Uuid) -> Result<TeamWithMembers, AppError> {
        let team = self.find(team_id).await?;
        let members = team_repo::get_team_members(&self.pool, team_id).await?;
        Ok(TeamWithMembers { team, members })
    }

    pub async fn update(
        &self,
        actor: &Actor,
        team_id: Uuid,
        input: UpdateTeamInput,
    ) -> Result<Team, AppError> {
        policy::require(policy::can_manage_teams(actor), MANAGE_TEAMS)?;

        let mut team = self.find(team_id).await?;
        if let Some(name) = input.name.as_ref().into_option() {
            if name.trim().is_empty() {
                return Err(AppError::validation("name cannot be empty"));
            }
        }
        input
            .name
            .map(|name| name.trim().to_string())
            .apply_to(&mut team.name);
        input.description.apply_to(&mut team.description);

        team_repo::update_team(&self.pool, &team)
            .await?
            .ok_or_else(|| AppError::not_found("Team not found"))
    }

    /// Teams that still own events cannot be deleted; the events would lose
    /// their team reference.
    pub async fn delete(&self, actor: &Actor, team_id: Uuid) -> Result<(), AppError> {
        policy::require(policy::can_manage_teams(actor), MANAGE_TEAMS)?;

        DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                if !team_repo::lock_for_update(&mut **tx, team_id).await? {
                    return Err(AppError::not_found("Team not found"));
                }

                let events = event_repo::count_for_team(&mut **tx, team_id).await?;
                if events > 0 {
                    return Err(AppError::conflict(format!(
                        "Team still has {events} events"
                    )));
                }

                team_repo::delete_team(&mut **tx, team_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Team not found"))
            })
        })
        .await?;

        log::info!("Team {} deleted by {}", team_id, actor.user_id);
        Ok(())
    }

    pub async fn add_member(
        &self,
        actor: &Actor,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<TeamMember, AppError> {
        policy::require(policy::can_manage_teams(actor), MANAGE_TEAMS)?;

        self.find(team_id).await?;
        if !user_repo::exists(&self.pool, user_id).await? {
            return Err(AppError::not_found("User not found"));
        }

        let member = team_repo::add_team_member(&self.pool, team_id, user_id)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "User is already a member of this team"))?;

        log::info!("User {} added to team {}", user_id, team_id);
        Ok(member)
    }

    pub async fn remove_member(
        &self,
        actor: &Actor,
        team_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        policy::require(policy::can_manage_teams(actor), MANAGE_TEAMS)?;

        team_repo::remove_team_member(&self.pool, team_id, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User is not a member of this team"))?;

        log::info!("User {} removed from team {}", user_id, team_id);
        Ok(())
    }

    pub async fn members(&self, team_id: Uuid) -> Result<Vec<TeamMemberWithUser>, AppError> {
        self.find(team_id).await?;
        Ok(team_repo::get_team_members(&self.pool, team_id).await?)
    }

    pub async fn my_teams(&self, user_id: Uuid) -> Result<Vec<Team>, AppError> {
        Ok(team_repo::get_user_teams(&self.pool, user_id).await?)
    }

    async fn find(&self, team_id: Uuid) -> Result<Team, AppError> {
        team_repo::find_by_id(&self.pool, team_id)
            .await?
            .ok_or_else(|| AppError::not_found("Team not found"))
    }
}
