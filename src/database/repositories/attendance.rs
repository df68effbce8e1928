use sqlx::{Executor, Sqlite};
use uuid::Uuid;

use crate::database::models::{Attendance, AttendanceStatus, AttendanceWithUser};

pub async fn create_attendance<'e, E>(
    executor: E,
    attendance: &Attendance,
) -> Result<Attendance, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Attendance>(
        r#"
            INSERT INTO
                attendance (id, event_id, user_id, status, created_at)
            VALUES
                (?, ?, ?, ?, ?)
            RETURNING
                id, event_id, user_id, status, created_at
        "#,
    )
    .bind(attendance.id)
    .bind(attendance.event_id)
    .bind(attendance.user_id)
    .bind(attendance.status)
    .bind(attendance.created_at)
    .fetch_one(executor)
    .await
}

pub async fn find_by_event_and_user<'e, E>(
    executor: E,
    event_id: Uuid,
    user_id: Uuid,
) -> Result<Option<Attendance>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Attendance>(
        r#"
            SELECT id, event_id, user_id, status, created_at
            FROM attendance
            WHERE event_id = ? AND user_id = ?
        "#,
    )
    .bind(event_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await
}

pub async fn update_status<'e, E>(
    executor: E,
    id: Uuid,
    status: AttendanceStatus,
) -> Result<Option<Attendance>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Attendance>(
        r#"
            UPDATE attendance
            SET status = ?
            WHERE id = ?
            RETURNING id, event_id, user_id, status, created_at
        "#,
    )
    .bind(status)
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn count_registered<'e, E>(executor: E, event_id: Uuid) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM attendance WHERE event_id = ? AND status = 'registered'",
    )
    .bind(event_id)
    .fetch_one(executor)
    .await
}

/// Registered attendees of an event in registration order.
pub async fn get_registered_for_event<'e, E>(
    executor: E,
    event_id: Uuid,
) -> Result<Vec<AttendanceWithUser>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, AttendanceWithUser>(
        r#"
            SELECT
                a.id,
                a.event_id,
                a.user_id,
                a.status,
                a.created_at,
                u.name AS user_name,
                u.email AS user_email
            FROM
                attendance a
                INNER JOIN users u ON a.user_id = u.id
            WHERE
                a.event_id = ?
                AND a.status = 'registered'
            ORDER BY
                a.created_at
        "#,
    )
    .bind(event_id)
    .fetch_all(executor)
    .await
}

pub async fn get_by_user<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Attendance>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Attendance>(
        r#"
            SELECT id, event_id, user_id, status, created_at
            FROM attendance
            WHERE user_id = ?
            ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}
