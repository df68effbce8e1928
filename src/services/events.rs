use chrono::{NaiveDate, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use uuid::Uuid;

use crate::database::models::{
    Actor, CreateEventInput, Event, EventStatus, EventType, EventWithAttendeeCount,
    EventWithParticipants, MyEvents, UpdateEventInput,
};
use crate::database::repositories::{
    assignment as assignment_repo, attendance as attendance_repo, event as event_repo,
    team as team_repo, user as user_repo,
};
use crate::database::transaction::DatabaseTransaction;
use crate::error::AppError;
use crate::services::assignments::{AssignmentService, replace_participants};
use crate::services::policy;

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("{field} must be a date in YYYY-MM-DD format")))
}

fn required(value: &str, field: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(())
}

fn validate_capacity(capacity: Option<i64>) -> Result<(), AppError> {
    match capacity {
        Some(value) if value < 1 => Err(AppError::validation("capacity must be at least 1")),
        _ => Ok(()),
    }
}

/// `Cancelled` is terminal. Every other move, including back to `Draft`, is allowed.
fn check_transition(from: EventStatus, to: EventStatus) -> Result<(), AppError> {
    if from == EventStatus::Cancelled && to != EventStatus::Cancelled {
        return Err(AppError::conflict("Cancelled events cannot be reopened"));
    }
    Ok(())
}

fn dedup(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(&id) {
            seen.push(id);
        }
    }
    seen
}

/// Event lifecycle: create, patch, delete and the read side of events.
#[derive(Clone)]
pub struct EventService {
    pool: SqlitePool,
    assignments: AssignmentService,
}

impl EventService {
    pub fn new(pool: SqlitePool, assignments: AssignmentService) -> Self {
        Self { pool, assignments }
    }

    pub async fn create(
        &self,
        actor: &Actor,
        input: CreateEventInput,
    ) -> Result<EventWithParticipants, AppError> {
        let date = parse_date(&input.date, "date")?;
        required(&input.title, "title")?;
        required(&input.start_time, "startTime")?;
        required(&input.end_time, "endTime")?;
        required(&input.location, "location")?;
        validate_capacity(input.capacity)?;

        let event_type = input.event_type.unwrap_or_default();
        let status = input.status.unwrap_or_default();
        let participants = dedup(input.participant_ids);

        match event_type {
            EventType::Team => {
                policy::require(
                    policy::can_create_team_event(actor),
                    "Only admins can create team events",
                )?;
                let team_id = input
                    .team_id
                    .ok_or_else(|| AppError::validation("teamId is required for team events"))?;
                if team_repo::find_by_id(&self.pool, team_id).await?.is_none() {
                    return Err(AppError::not_found("Team not found"));
                }
                if !participants.is_empty() {
                    return Err(AppError::validation(
                        "Participants can only be set on personal events",
                    ));
                }
            }
            EventType::Personal => {
                if input.team_id.is_some() {
                    return Err(AppError::validation(
                        "Personal events cannot belong to a team",
                    ));
                }
            }
        }

        if let Some(speaker_id) = input.speaker_id {
            if !user_repo::exists(&self.pool, speaker_id).await? {
                return Err(AppError::not_found("Speaker not found"));
            }
        }
        for user_id in &participants {
            if !user_repo::exists(&self.pool, *user_id).await? {
                return Err(AppError::not_found(format!("User {user_id} not found")));
            }
        }

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            description: input.description,
            date,
            start_time: input.start_time,
            end_time: input.end_time,
            location: input.location,
            capacity: input.capacity,
            status,
            event_type,
            team_id: input.team_id,
            speaker_id: input.speaker_id,
            created_by: actor.user_id,
            created_at: now,
            updated_at: now,
        };

        let event = DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                let event = event_repo::create_event(&mut **tx, &event).await?;
                if !participants.is_empty() {
                    replace_participants(tx, event.id, &participants).await?;
                }
                Ok(event)
            })
        })
        .await?;

        log::info!(
            "Created {} event {} ({}) by {}",
            event.event_type,
            event.id,
            event.title,
            actor.user_id
        );

        if let Some(team_id) = event.team_id {
            match self.assignments.fan_out(event.id, team_id).await {
                Ok(created) => log::info!(
                    "Fanned out event {} to {} members of team {}",
                    event.id,
                    created,
                    team_id
                ),
                Err(e) => log::warn!(
                    "Fan-out for event {} to team {} failed, event kept: {}",
                    event.id,
                    team_id,
                    e
                ),
            }
        }

        self.get(event.id).await
    }

    pub async fn get(&self, event_id: Uuid) -> Result<EventWithParticipants, AppError> {
        let event = self.find(event_id).await?;
        let participants = assignment_repo::get_by_event(&self.pool, event_id).await?;

        Ok(EventWithParticipants {
            event,
            participants,
        })
    }

    pub async fn find(&self, event_id: Uuid) -> Result<Event, AppError> {
        event_repo::find_by_id(&self.pool, event_id)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))
    }

    pub async fn list(
        &self,
        status: Option<EventStatus>,
    ) -> Result<Vec<EventWithAttendeeCount>, AppError> {
        Ok(event_repo::get_all_with_attendee_count(&self.pool, status).await?)
    }

    /// Personal events the actor created and team events they are assigned to.
    pub async fn my_events(&self, actor: &Actor) -> Result<MyEvents, AppError> {
        let personal = event_repo::get_personal_for_user(&self.pool, actor.user_id).await?;
        let team = event_repo::get_team_events_for_user(&self.pool, actor.user_id).await?;

        Ok(MyEvents { personal, team })
    }

    /// Applies a partial update.
    ///
    /// Only fields present in `input` change. The event row is locked first
    /// so a capacity change and concurrent registrations cannot interleave.
    pub async fn update(
        &self,
        actor: &Actor,
        event_id: Uuid,
        input: UpdateEventInput,
    ) -> Result<EventWithParticipants, AppError> {
        let actor = *actor;
        let UpdateEventInput {
            title,
            description,
            date,
            start_time,
            end_time,
            location,
            capacity,
            status,
            speaker_id,
            participant_ids,
        } = input;

        let date = match date.into_option() {
            Some(raw) => Some(parse_date(&raw, "date")?),
            None => None,
        };
        for (value, field) in [
            (title.as_ref(), "title"),
            (start_time.as_ref(), "startTime"),
            (end_time.as_ref(), "endTime"),
            (location.as_ref(), "location"),
        ] {
            if let Some(value) = value.into_option() {
                required(value, field)?;
            }
        }
        if let Some(capacity) = capacity.as_ref().into_option() {
            validate_capacity(*capacity)?;
        }
        let participants = participant_ids.into_option().map(dedup);

        DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                if !event_repo::lock_for_update(&mut **tx, event_id).await? {
                    return Err(AppError::not_found("Event not found"));
                }
                let mut event = event_repo::find_by_id(&mut **tx, event_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Event not found"))?;

                if !policy::can_mutate_event(&event, &actor) {
                    log::warn!("User {} may not update event {}", actor.user_id, event_id);
                    return Err(AppError::forbidden("You can only update your own events"));
                }

                if let Some(next) = status.as_ref().into_option() {
                    check_transition(event.status, *next)?;
                }
                if let Some(Some(limit)) = capacity.as_ref().into_option() {
                    let registered = attendance_repo::count_registered(&mut **tx, event_id).await?;
                    if registered > *limit {
                        return Err(AppError::conflict(format!(
                            "Capacity cannot be lower than the {registered} current registrations"
                        )));
                    }
                }
                if participants.is_some() && event.event_type == EventType::Team {
                    return Err(AppError::validation(
                        "Participants can only be set on personal events",
                    ));
                }
                if let Some(Some(speaker_id)) = speaker_id.as_ref().into_option() {
                    ensure_speaker_exists(tx, *speaker_id).await?;
                }
                if let Some(participants) = &participants {
                    ensure_users_exist(tx, participants).await?;
                }

                title
                    .map(|title| title.trim().to_string())
                    .apply_to(&mut event.title);
                description.apply_to(&mut event.description);
                if let Some(date) = date {
                    event.date = date;
                }
                start_time.apply_to(&mut event.start_time);
                end_time.apply_to(&mut event.end_time);
                location.apply_to(&mut event.location);
                capacity.apply_to(&mut event.capacity);
                status.apply_to(&mut event.status);
                speaker_id.apply_to(&mut event.speaker_id);

                let event = event_repo::update_event(&mut **tx, &event)
                    .await?
                    .ok_or_else(|| AppError::not_found("Event not found"))?;

                if let Some(participants) = participants {
                    replace_participants(tx, event_id, &participants).await?;
                }

                Ok(event)
            })
        })
        .await?;

        log::info!("Event {} updated by {}", event_id, actor.user_id);

        self.get(event_id).await
    }

    /// Deletes the event along with its assignments and registrations.
    pub async fn delete(&self, actor: &Actor, event_id: Uuid) -> Result<(), AppError> {
        let event = self.find(event_id).await?;
        policy::require(
            policy::can_mutate_event(&event, actor),
            "You can only delete your own events",
        )?;

        DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                event_repo::delete_event(tx, event_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Event not found"))
            })
        })
        .await?;

        log::info!("Event {} deleted by {}", event_id, actor.user_id);
        Ok(())
    }
}

// Call only after the event's write lock is held.
async fn ensure_speaker_exists(
    tx: &mut Transaction<'_, Sqlite>,
    speaker_id: Uuid,
) -> Result<(), AppError> {
    if !user_repo::exists(&mut **tx, speaker_id).await? {
        return Err(AppError::not_found("Speaker not found"));
    }
    Ok(())
}

async fn ensure_users_exist(
    tx: &mut Transaction<'_, Sqlite>,
    user_ids: &[Uuid],
) -> Result<(), AppError> {
    for user_id in user_ids {
        if !user_repo::exists(&mut **tx, *user_id).await? {
            return Err(AppError::not_found(format!("User {user_id} not found")));
        }
    }
    Ok(())
}
