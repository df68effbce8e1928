//! Capability checks over (actor, resource).
//!
//! Every role-based decision in the crate goes through this module. The
//! predicates are pure; callers turn a `false` into [`AppError::Forbidden`]
//! with [`require`].

use crate::database::models::{Actor, Event, EventType};
use crate::error::AppError;

/// Only admins may create events for a team.
pub fn can_create_team_event(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Admins may change any event. Otherwise the creator of a personal event or
/// the event's designated speaker may.
pub fn can_mutate_event(event: &Event, actor: &Actor) -> bool {
    if actor.is_admin() {
        return true;
    }

    let is_owner = event.event_type == EventType::Personal && event.created_by == actor.user_id;
    let is_speaker = event.speaker_id == Some(actor.user_id);

    is_owner || is_speaker
}

pub fn can_view_attendee_list(event: &Event, actor: &Actor) -> bool {
    actor.is_admin() || event.speaker_id == Some(actor.user_id)
}

/// Assignees may see who else is on their event.
pub fn can_view_assignments(event: &Event, actor: &Actor, is_assigned: bool) -> bool {
    is_assigned || can_mutate_event(event, actor)
}

/// Team and membership management is an admin task.
pub fn can_manage_teams(actor: &Actor) -> bool {
    actor.is_admin()
}

pub fn can_provision_users(actor: &Actor) -> bool {
    actor.is_admin()
}

/// Turns a failed capability check into a `Forbidden` error.
pub fn require(allowed: bool, message: &str) -> Result<(), AppError> {
    if allowed {
        Ok(())
    } else {
        Err(AppError::forbidden(message))
    }
}
