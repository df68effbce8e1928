use chrono::{NaiveDate, Utc};
use sqlx::{Executor, Sqlite, Transaction};
use uuid::Uuid;

use crate::database::models::{
    Event, EventStatus, EventWithAssignment, EventWithAttendeeCount, EventWithParticipantCount,
};

const EVENT_COLUMNS: &str = r#"
    e.id,
    e.title,
    e.description,
    e.date,
    e.start_time,
    e.end_time,
    e.location,
    e.capacity,
    e.status,
    e.event_type,
    e.team_id,
    e.speaker_id,
    e.created_by,
    e.created_at,
    e.updated_at
"#;

const ATTENDEE_COUNT: &str = r#"
    (
        SELECT COUNT(*)
        FROM attendance a
        WHERE a.event_id = e.id AND a.status = 'registered'
    ) AS attendee_count
"#;

pub async fn create_event<'e, E>(executor: E, event: &Event) -> Result<Event, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Event>(
        r#"
            INSERT INTO
                events (
                    id,
                    title,
                    description,
                    date,
                    start_time,
                    end_time,
                    location,
                    capacity,
                    status,
                    event_type,
                    team_id,
                    speaker_id,
                    created_by,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING
                *
        "#,
    )
    .bind(event.id)
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.date)
    .bind(&event.start_time)
    .bind(&event.end_time)
    .bind(&event.location)
    .bind(event.capacity)
    .bind(event.status)
    .bind(event.event_type)
    .bind(event.team_id)
    .bind(event.speaker_id)
    .bind(event.created_by)
    .bind(event.created_at)
    .bind(event.updated_at)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Event>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Event>(&format!("SELECT {EVENT_COLUMNS} FROM events e WHERE e.id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Takes the write lock on an event for the rest of the transaction.
///
/// Must be the first statement of the transaction so that concurrent callers
/// queue here instead of reading stale counts. Returns `false` when the event
/// does not exist.
pub async fn lock_for_update<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE events SET updated_at = updated_at WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn update_event<'e, E>(executor: E, event: &Event) -> Result<Option<Event>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Event>(
        r#"
            UPDATE
                events
            SET
                title = ?,
                description = ?,
                date = ?,
                start_time = ?,
                end_time = ?,
                location = ?,
                capacity = ?,
                status = ?,
                speaker_id = ?,
                updated_at = ?
            WHERE
                id = ?
            RETURNING
                *
        "#,
    )
    .bind(&event.title)
    .bind(&event.description)
    .bind(event.date)
    .bind(&event.start_time)
    .bind(&event.end_time)
    .bind(&event.location)
    .bind(event.capacity)
    .bind(event.status)
    .bind(event.speaker_id)
    .bind(Utc::now())
    .bind(event.id)
    .fetch_optional(executor)
    .await
}

/// Hard-deletes an event together with its assignments and attendance rows.
pub async fn delete_event(
    tx: &mut Transaction<'_, Sqlite>,
    id: Uuid,
) -> Result<Option<()>, sqlx::Error> {
    sqlx::query("DELETE FROM attendance WHERE event_id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;

    sqlx::query("DELETE FROM event_assignments WHERE event_id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;

    let result = sqlx::query("DELETE FROM events WHERE id = ?")
        .bind(id)
        .execute(&mut **tx)
        .await?;

    Ok(if result.rows_affected() > 0 {
        Some(())
    } else {
        None
    })
}

pub async fn get_all_with_attendee_count<'e, E>(
    executor: E,
    status: Option<EventStatus>,
) -> Result<Vec<EventWithAttendeeCount>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, EventWithAttendeeCount>(&format!(
        r#"
            SELECT {EVENT_COLUMNS}, {ATTENDEE_COUNT}
            FROM events e
            WHERE (? IS NULL OR e.status = ?)
            ORDER BY e.date, e.start_time
        "#
    ))
    .bind(status)
    .bind(status)
    .fetch_all(executor)
    .await
}

/// Every published event dated within `[start, end]`.
pub async fn get_published_in_range<'e, E>(
    executor: E,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<EventWithAttendeeCount>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, EventWithAttendeeCount>(&format!(
        r#"
            SELECT {EVENT_COLUMNS}, {ATTENDEE_COUNT}
            FROM events e
            WHERE e.status = 'published'
              AND e.date >= ?
              AND e.date <= ?
            ORDER BY e.date, e.start_time
        "#
    ))
    .bind(start)
    .bind(end)
    .fetch_all(executor)
    .await
}

/// Published events in `[start, end]` that belong on one user's calendar:
/// personal events they created, team events they are assigned to, and any
/// event where their assignment is approved.
pub async fn get_calendar_for_user<'e, E>(
    executor: E,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<EventWithAssignment>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, EventWithAssignment>(&format!(
        r#"
            SELECT {EVENT_COLUMNS}, ea.status AS assignment_status
            FROM events e
            LEFT JOIN event_assignments ea ON ea.event_id = e.id AND ea.user_id = ?
            WHERE e.status = 'published'
              AND e.date >= ?
              AND e.date <= ?
              AND (
                    (e.event_type = 'personal' AND e.created_by = ?)
                 OR (e.event_type = 'team' AND ea.id IS NOT NULL)
                 OR ea.status = 'approved'
              )
            ORDER BY e.date, e.start_time
        "#
    ))
    .bind(user_id)
    .bind(start)
    .bind(end)
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn get_personal_for_user<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<EventWithParticipantCount>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, EventWithParticipantCount>(&format!(
        r#"
            SELECT
                {EVENT_COLUMNS},
                (SELECT COUNT(*) FROM event_assignments ea WHERE ea.event_id = e.id) AS participant_count
            FROM events e
            WHERE e.event_type = 'personal' AND e.created_by = ?
            ORDER BY e.date, e.start_time
        "#
    ))
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn get_team_events_for_user<'e, E>(
    executor: E,
    user_id: Uuid,
) -> Result<Vec<EventWithAssignment>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, EventWithAssignment>(&format!(
        r#"
            SELECT {EVENT_COLUMNS}, ea.status AS assignment_status
            FROM events e
            INNER JOIN event_assignments ea ON ea.event_id = e.id
            WHERE e.event_type = 'team' AND ea.user_id = ?
            ORDER BY e.date, e.start_time
        "#
    ))
    .bind(user_id)
    .fetch_all(executor)
    .await
}

pub async fn count_for_team<'e, E>(executor: E, team_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM events WHERE team_id = ?")
        .bind(team_id)
        .fetch_one(executor)
        .await
}
