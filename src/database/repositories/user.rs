use sqlx::{Executor, Sqlite};
use uuid::Uuid;

use crate::database::models::User;

pub async fn create_user<'e, E>(executor: E, user: &User) -> Result<User, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"
            INSERT INTO
                users (id, email, name, role, created_at, updated_at)
            VALUES
                (?, ?, ?, ?, ?, ?)
            RETURNING
                id, email, name, role, created_at, updated_at
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(&user.name)
    .bind(user.role)
    .bind(user.created_at)
    .bind(user.updated_at)
    .fetch_one(executor)
    .await
}

pub async fn find_by_id<'e, E>(executor: E, id: Uuid) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"
            SELECT id, email, name, role, created_at, updated_at
            FROM users
            WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_email<'e, E>(executor: E, email: &str) -> Result<Option<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"
            SELECT id, email, name, role, created_at, updated_at
            FROM users
            WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(executor)
    .await
}

pub async fn get_all<'e, E>(executor: E) -> Result<Vec<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, User>(
        r#"
            SELECT id, email, name, role, created_at, updated_at
            FROM users
            ORDER BY created_at DESC
        "#,
    )
    .fetch_all(executor)
    .await
}

pub async fn search<'e, E>(executor: E, query: &str, limit: i64) -> Result<Vec<User>, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let pattern = format!("%{}%", query.to_lowercase());
    sqlx::query_as::<_, User>(
        r#"
            SELECT id, email, name, role, created_at, updated_at
            FROM users
            WHERE lower(name) LIKE ? OR lower(email) LIKE ?
            ORDER BY name
            LIMIT ?
        "#,
    )
    .bind(&pattern)
    .bind(&pattern)
    .bind(limit)
    .fetch_all(executor)
    .await
}

pub async fn exists<'e, E>(executor: E, id: Uuid) -> Result<bool, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = ?)")
        .bind(id)
        .fetch_one(executor)
        .await
}
