#![allow(dead_code)]

use std::time::Duration;

use anyhow::Result;
use fake::Fake;
use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::Sentence;
use fake::faker::name::en::Name;
use sqlx::SqlitePool;
use tempfile::TempDir;
use uuid::Uuid;

use agenda::AppState;
use agenda::config::Config;
use agenda::database::models::*;
use agenda::database::repositories::{team as team_repo, user as user_repo};
use agenda::database::{PoolSettings, init_database};

pub fn setup_test_env() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A throwaway SQLite database with migrations applied. The file lives in a
/// temporary directory that is removed on drop.
pub struct TestDb {
    pub pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let database_url = format!("sqlite:{}/test.db", temp_dir.path().display());
        let pool = init_database(
            &database_url,
            PoolSettings {
                max_connections: 5,
                acquire_timeout: Duration::from_secs(10),
            },
        )
        .await?;

        Ok(TestDb {
            pool,
            _temp_dir: temp_dir,
        })
    }
}

pub struct TestContext {
    pub db: TestDb,
    pub pool: SqlitePool,
    pub state: AppState,
    pub config: Config,
}

impl TestContext {
    pub async fn new() -> Result<Self> {
        let db = TestDb::new().await?;
        let pool = db.pool.clone();
        let state = AppState::new(pool.clone());

        Ok(TestContext {
            db,
            pool,
            state,
            config: Config::test_config(),
        })
    }

    pub async fn create_user(&self, role: Role) -> User {
        let name: String = Name().fake();
        let email = format!("{}@example.com", Uuid::new_v4().simple());

        user_repo::create_user(&self.pool, &User::new(email, name, role))
            .await
            .unwrap()
    }

    pub async fn create_user_named(&self, name: &str, role: Role) -> User {
        let email = format!("{}@example.com", Uuid::new_v4().simple());

        user_repo::create_user(&self.pool, &User::new(email, name.to_string(), role))
            .await
            .unwrap()
    }

    /// Creates a team owned by `admin` with the given members.
    pub async fn create_team(&self, admin: &User, members: &[&User]) -> Team {
        let team = self
            .state
            .teams
            .create(
                &Actor::from(admin),
                CreateTeamInput {
                    name: CompanyName().fake(),
                    description: Sentence(3..8).fake(),
                },
            )
            .await
            .unwrap();

        for member in members {
            team_repo::add_team_member(&self.pool, team.id, member.id)
                .await
                .unwrap();
        }

        team
    }

    /// Creates a published personal event owned by `owner`.
    pub async fn create_published_event(&self, owner: &User, capacity: Option<i64>) -> Event {
        self.state
            .events
            .create(
                &Actor::from(owner),
                CreateEventInput {
                    capacity,
                    status: Some(EventStatus::Published),
                    ..event_input("2026-06-15")
                },
            )
            .await
            .unwrap()
            .event
    }

    pub fn token_for(&self, user: &User) -> String {
        agenda::services::Claims::issue(&self.config, user.id, user.role).unwrap()
    }
}

/// A valid personal event body on the given day.
pub fn event_input(date: &str) -> CreateEventInput {
    CreateEventInput {
        title: Sentence(2..5).fake(),
        description: Sentence(5..12).fake(),
        date: date.to_string(),
        start_time: "10:00".to_string(),
        end_time: "11:30".to_string(),
        location: "Main hall".to_string(),
        ..Default::default()
    }
}

pub fn actor(user: &User) -> Actor {
    Actor::from(user)
}
