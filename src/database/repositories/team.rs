use chrono::Utc;
use sqlx::{Executor, Sqlite};
use uuid::Uuid;

use crate::database::models::{Team, TeamMember, TeamMemberWithUser};

// Team management methods
pub async fn create_team<'e, E>(executor: E, team: &Team) -> Result<Team, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Team>(
        r#"
            INSERT INTO
                teams (
                    id,
                    name,
                    description,
                    created_by,
                    created_at,
                    updated_at
                )
            VALUES
                (?, ?, ?, ?, ?, ?)
            RETURNING
                id,
                name,
                description,
                created_by,
                created_at,
                updated_at
        "#,
    )
    .bind(team.id)
    .bind(&team.name)
    .bind(&team.description)
    .bind(team.created_by)
    .bind(team.created_at)
    .bind(team.updated_at)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<Team>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Team>(
        r#"
            SELECT
                id,
                name,
                description,
                created_by,
                created_at,
                updated_at
            FROM
                teams
            WHERE
                id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_all<'e, E>(executor: E) -> Result<Vec<Team>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Team>(
        r#"
            SELECT
                id,
                name,
                description,
                created_by,
                created_at,
                updated_at
            FROM
                teams
            ORDER BY
                name
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn update_team<'e, E>(executor: E, team: &Team) -> Result<Option<Team>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Team>(
        r#"
            UPDATE
                teams
            SET
                name = ?,
                description = ?,
                updated_at = ?
            WHERE
                id = ?
            RETURNING
                id,
                name,
                description,
                created_by,
                created_at,
                updated_at
        "#,
    )
    .bind(&team.name)
    .bind(&team.description)
    .bind(Utc::now())
    .bind(team.id)
    .fetch_optional(executor)
    .await
}

/// Takes the database write lock via a no-op update on the team row.
/// Returns false when the team does not exist.
pub async fn lock_for_update<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("UPDATE teams SET updated_at = updated_at WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_team<'e, E>(executor: E, id: Uuid) -> Result<Option<()>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM teams WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(if result.rows_affected() > 0 {
        Some(())
    } else {
        None
    })
}

// Team member management
pub async fn add_team_member<'e, E>(
    executor: E,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<TeamMember, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, TeamMember>(
        r#"
            INSERT INTO
                team_members (
                    id,
                    team_id,
                    user_id,
                    created_at
                )
            VALUES
                (?, ?, ?, ?)
            RETURNING
                id,
                team_id,
                user_id,
                created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(team_id)
    .bind(user_id)
    .bind(Utc::now())
    .fetch_one(executor)
    .await
}

pub async fn remove_team_member<'e, E>(
    executor: E,
    team_id: Uuid,
    user_id: Uuid,
) -> Result<Option<()>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
            DELETE FROM team_members
            WHERE
                team_id = ?
                AND user_id = ?
        "#,
    )
    .bind(team_id)
    .bind(user_id)
    .execute(executor)
    .await?;

    Ok(if result.rows_affected() > 0 {
        Some(())
    } else {
        None
    })
}

pub async fn get_team_members<'e, E>(
    executor: E,
    team_id: Uuid,
) -> Result<Vec<TeamMemberWithUser>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, TeamMemberWithUser>(
        r#"
            SELECT
                tm.id,
                tm.team_id,
                tm.user_id,
                tm.created_at,
                u.name AS user_name,
                u.email AS user_email
            FROM
                team_members tm
                INNER JOIN users u ON tm.user_id = u.id
            WHERE
                tm.team_id = ?
            ORDER BY
                u.name
        "#,
    )
    .bind(team_id)
    .fetch_all(executor)
    .await
}

/// Ids of the team's members at the time of the call.
pub async fn get_member_user_ids<'e, E>(executor: E, team_id: Uuid) -> Result<Vec<Uuid>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM team_members WHERE team_id = ?")
        .bind(team_id)
        .fetch_all(executor)
        .await
}

pub async fn is_member<'e, E>(executor: E, team_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM team_members WHERE team_id = ? AND user_id = ?)",
    )
    .bind(team_id)
    .bind(user_id)
    .fetch_one(executor)
    .await
}

pub async fn get_user_teams<'e, E>(executor: E, user_id: Uuid) -> Result<Vec<Team>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Team>(
        r#"
            SELECT
                t.id,
                t.name,
                t.description,
                t.created_by,
                t.created_at,
                t.updated_at
            FROM
                teams t
                INNER JOIN team_members tm ON t.id = tm.team_id
            WHERE
                tm.user_id = ?
            ORDER BY
                t.name
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await
}
