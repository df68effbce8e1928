use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{Actor, CreateUserInput, User};
use crate::database::repositories::user as user_repo;
use crate::error::AppError;
use crate::services::policy;

const MIN_SEARCH_LEN: usize = 2;
const SEARCH_LIMIT: i64 = 20;

/// User directory. Accounts are provisioned here; credentials live elsewhere.
#[derive(Clone)]
pub struct UserService {
    pool: SqlitePool,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn provision(&self, actor: &Actor, input: CreateUserInput) -> Result<User, AppError> {
        policy::require(
            policy::can_provision_users(actor),
            "Only admins can provision users",
        )?;

        let email = input.email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AppError::validation("email must be a valid address"));
        }
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name is required"));
        }

        let user = User::new(email, name.to_string(), input.role.unwrap_or_default());
        let user = user_repo::create_user(&self.pool, &user)
            .await
            .map_err(|e| AppError::conflict_on_unique(e, "A user with this email already exists"))?;

        log::info!("User {} provisioned with role {}", user.id, user.role);
        Ok(user)
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(user_repo::get_all(&self.pool).await?)
    }

    /// Case-insensitive match on name or email. Very short queries match nothing.
    pub async fn search(&self, query: &str) -> Result<Vec<User>, AppError> {
        let query = query.trim();
        if query.chars().count() < MIN_SEARCH_LEN {
            return Ok(Vec::new());
        }
        Ok(user_repo::search(&self.pool, query, SEARCH_LIMIT).await?)
    }

    pub async fn get(&self, user_id: Uuid) -> Result<User, AppError> {
        user_repo::find_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
