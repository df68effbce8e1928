use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum AssignmentStatus {
        #[default]
        Pending => "pending",
        Approved => "approved",
        Rejected => "rejected",
    }
}

impl AssignmentStatus {
    /// Statuses an assignee may answer with.
    pub fn is_response(&self) -> bool {
        matches!(self, AssignmentStatus::Approved | AssignmentStatus::Rejected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub status: AssignmentStatus,
    pub assigned_at: DateTime<Utc>,
    pub responded_at: Option<DateTime<Utc>>,
}

impl Assignment {
    pub fn new(event_id: Uuid, user_id: Uuid, status: AssignmentStatus) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            status,
            assigned_at: Utc::now(),
            responded_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentWithDetails {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub assignment: Assignment,
    pub user_name: String,
    pub user_email: String,
    pub event_title: String,
    pub event_date: NaiveDate,
    pub event_start_time: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RespondAssignmentInput {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentQuery {
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingCount {
    pub count: i64,
}
