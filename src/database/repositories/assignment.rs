use chrono::{DateTime, Utc};
use sqlx::{Executor, QueryBuilder, Sqlite, Transaction};
use uuid::Uuid;

use crate::database::models::{Assignment, AssignmentStatus, AssignmentWithDetails};

const DETAILS_QUERY: &str = r#"
    SELECT
        ea.id,
        ea.event_id,
        ea.user_id,
        ea.status,
        ea.assigned_at,
        ea.responded_at,
        u.name AS user_name,
        u.email AS user_email,
        e.title AS event_title,
        e.date AS event_date,
        e.start_time AS event_start_time
    FROM
        event_assignments ea
        INNER JOIN users u ON ea.user_id = u.id
        INNER JOIN events e ON ea.event_id = e.id
"#;

/// Inserts the assignment unless one already exists for the same
/// (event, user) pair. Returns whether a row was written.
pub async fn insert_if_absent<'e, E>(executor: E, assignment: &Assignment) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
            INSERT INTO
                event_assignments (id, event_id, user_id, status, assigned_at, responded_at)
            VALUES
                (?, ?, ?, ?, ?, ?)
            ON CONFLICT (event_id, user_id) DO NOTHING
        "#,
    )
    .bind(assignment.id)
    .bind(assignment.event_id)
    .bind(assignment.user_id)
    .bind(assignment.status)
    .bind(assignment.assigned_at)
    .bind(assignment.responded_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Inserts the assignment, or moves an existing row for the same
/// (event, user) pair to the given status while keeping its identity.
pub async fn upsert_status<'e, E>(executor: E, assignment: &Assignment) -> Result<Assignment, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Assignment>(
        r#"
            INSERT INTO
                event_assignments (id, event_id, user_id, status, assigned_at, responded_at)
            VALUES
                (?, ?, ?, ?, ?, ?)
            ON CONFLICT (event_id, user_id) DO UPDATE SET
                status = excluded.status
            RETURNING
                id, event_id, user_id, status, assigned_at, responded_at
        "#,
    )
    .bind(assignment.id)
    .bind(assignment.event_id)
    .bind(assignment.user_id)
    .bind(assignment.status)
    .bind(assignment.assigned_at)
    .bind(assignment.responded_at)
    .fetch_one(executor)
    .await
}

/// Deletes every assignment of the event whose user is not in `keep`.
pub async fn delete_for_event_except(
    tx: &mut Transaction<'_, Sqlite>,
    event_id: Uuid,
    keep: &[Uuid],
) -> Result<u64, sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> =
        QueryBuilder::new("DELETE FROM event_assignments WHERE event_id = ");
    builder.push_bind(event_id);

    if !keep.is_empty() {
        builder.push(" AND user_id NOT IN (");
        let mut separated = builder.separated(", ");
        for user_id in keep {
            separated.push_bind(*user_id);
        }
        separated.push_unseparated(")");
    }

    let result = builder.build().execute(&mut **tx).await?;
    Ok(result.rows_affected())
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Assignment>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Assignment>(
        r#"
            SELECT id, event_id, user_id, status, assigned_at, responded_at
            FROM event_assignments
            WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_event_and_user<'e, E>(
    executor: E,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Assignment>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Assignment>(
        r#"
            SELECT id, event_id, user_id, status, assigned_at, responded_at
            FROM event_assignments
            WHERE event_id = ? AND user_id = ?
        "#,
    )
    .bind(event_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn get_by_user<'e, E>(
    executor: E,
    user_id: Uuid,
    status: Option<AssignmentStatus>,
) -> Result<Vec<AssignmentWithDetails>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, AssignmentWithDetails>(&format!(
        r#"
            {DETAILS_QUERY}
            WHERE ea.user_id = ? AND (? IS NULL OR ea.status = ?)
            ORDER BY e.date, e.start_time
        "#
    ))
    .bind(user_id)
    .bind(status)
    .bind(status)
    .fetch_all(executor)
    .await
}

pub async fn get_by_event<'e, E>(
    executor: E,
    event_id: Uuid,
) -> Result<Vec<AssignmentWithDetails>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, AssignmentWithDetails>(&format!(
        r#"
            {DETAILS_QUERY}
            WHERE ea.event_id = ?
            ORDER BY u.name
        "#
    ))
    .bind(event_id)
    .fetch_all(executor)
    .await
}

/// Records the assignee's answer. Only a pending assignment is updated, so a
/// second response (or a lost race with a concurrent one) returns `None`.
pub async fn respond<'e, E>(
    executor: E,
    id: Uuid,
    status: AssignmentStatus,
    responded_at: DateTime<Utc>,
) -> Result<Option<Assignment>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Assignment>(
        r#"
            UPDATE
                event_assignments
            SET
                status = ?,
                responded_at = ?
            WHERE
                id = ?
                AND status = 'pending'
            RETURNING
                id, event_id, user_id, status, assigned_at, responded_at
        "#,
    )
    .bind(status)
    .bind(responded_at)
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn count_pending_for_user<'e, E>(executor: E, user_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM event_assignments WHERE user_id = ? AND status = 'pending'",
    )
    .bind(user_id)
    .fetch_one(executor)
    .await
}
