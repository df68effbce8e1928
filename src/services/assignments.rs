use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::database::models::{Actor, Assignment, AssignmentStatus, AssignmentWithDetails};
use crate::database::repositories::{
    assignment as assignment_repo, event as event_repo, team as team_repo,
};
use crate::database::transaction::DatabaseTransaction;
use crate::error::AppError;
use crate::services::policy;

/// Team fan-out and the assignee's accept/reject workflow.
#[derive(Clone)]
pub struct AssignmentService {
    pool: SqlitePool,
}

impl AssignmentService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates a pending assignment for every current member of the team.
    ///
    /// Members that already hold an assignment for the event are skipped, so
    /// running this again is harmless. Any other failure rolls back the whole
    /// batch. Returns the number of rows created.
    pub async fn fan_out(&self, event_id: Uuid, team_id: Uuid) -> Result<usize, AppError> {
        DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                let members = team_repo::get_member_user_ids(&mut **tx, team_id).await?;

                let mut created = 0;
                for user_id in members {
                    let assignment = Assignment::new(event_id, user_id, AssignmentStatus::Pending);
                    if assignment_repo::insert_if_absent(&mut **tx, &assignment).await? {
                        created += 1;
                    }
                }

                Ok(created)
            })
        })
        .await
    }

    /// Parses a response status from a request body.
    pub fn parse_response(raw: &str) -> Result<AssignmentStatus, AppError> {
        raw.parse::<AssignmentStatus>()
            .ok()
            .filter(AssignmentStatus::is_response)
            .ok_or_else(|| AppError::validation("status must be 'approved' or 'rejected'"))
    }

    pub async fn respond(
        &self,
        actor: &Actor,
        assignment_id: Uuid,
        status: AssignmentStatus,
    ) -> Result<Assignment, AppError> {
        if !status.is_response() {
            return Err(AppError::validation(
                "status must be 'approved' or 'rejected'",
            ));
        }

        let assignment = assignment_repo::find_by_id(&self.pool, assignment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Assignment not found"))?;

        if assignment.user_id != actor.user_id {
            log::warn!(
                "User {} tried to respond to assignment {} owned by {}",
                actor.user_id,
                assignment_id,
                assignment.user_id
            );
            return Err(AppError::forbidden(
                "You can only respond to your own assignments",
            ));
        }

        if assignment.status != AssignmentStatus::Pending {
            return Err(AppError::conflict("Assignment already responded"));
        }

        // The update only matches a pending row, so a concurrent response that
        // got there first leaves us with nothing.
        let updated = assignment_repo::respond(&self.pool, assignment_id, status, Utc::now())
            .await?
            .ok_or_else(|| AppError::conflict("Assignment already responded"))?;

        log::info!(
            "Assignment {} for event {} marked {}",
            updated.id,
            updated.event_id,
            updated.status
        );

        Ok(updated)
    }

    /// Responds to the caller's own assignment on an event.
    pub async fn respond_for_event(
        &self,
        actor: &Actor,
        event_id: Uuid,
        status: AssignmentStatus,
    ) -> Result<Assignment, AppError> {
        let assignment =
            assignment_repo::find_by_event_and_user(&self.pool, event_id, actor.user_id)
                .await?
                .ok_or_else(|| AppError::not_found("Assignment not found"))?;

        self.respond(actor, assignment.id, status).await
    }

    /// Assignments of a user ordered by event date then start time.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        status: Option<AssignmentStatus>,
    ) -> Result<Vec<AssignmentWithDetails>, AppError> {
        Ok(assignment_repo::get_by_user(&self.pool, user_id, status).await?)
    }

    /// Assignments of an event ordered by assignee name. Visible to whoever
    /// may manage the event and to the assignees themselves.
    pub async fn list_for_event(
        &self,
        actor: &Actor,
        event_id: Uuid,
    ) -> Result<Vec<AssignmentWithDetails>, AppError> {
        let event = event_repo::find_by_id(&self.pool, event_id)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;

        let assignments = assignment_repo::get_by_event(&self.pool, event_id).await?;
        let is_assigned = assignments
            .iter()
            .any(|a| a.assignment.user_id == actor.user_id);

        policy::require(
            policy::can_view_assignments(&event, actor, is_assigned),
            "You can only view assignments for your events",
        )?;

        Ok(assignments)
    }

    pub async fn pending_count(&self, user_id: Uuid) -> Result<i64, AppError> {
        Ok(assignment_repo::count_pending_for_user(&self.pool, user_id).await?)
    }
}

/// Makes `user_ids` the exact participant set of an event.
///
/// Rows for users not listed are deleted; listed users end up with an
/// approved assignment, reusing their existing row when there is one. Runs
/// inside the caller's transaction so readers never see a partial set.
pub async fn replace_participants(
    tx: &mut Transaction<'_, Sqlite>,
    event_id: Uuid,
    user_ids: &[Uuid],
) -> Result<(), AppError> {
    let removed = assignment_repo::delete_for_event_except(tx, event_id, user_ids).await?;

    for user_id in user_ids {
        let assignment = Assignment::new(event_id, *user_id, AssignmentStatus::Approved);
        assignment_repo::upsert_status(&mut **tx, &assignment).await?;
    }

    log::debug!(
        "Replaced participants of event {}: {} kept/added, {} removed",
        event_id,
        user_ids.len(),
        removed
    );

    Ok(())
}
