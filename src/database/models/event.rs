use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::macros::string_enum;
use super::{AssignmentStatus, AssignmentWithDetails, Patch};

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum EventStatus {
        #[default]
        Draft => "draft",
        Published => "published",
        Cancelled => "cancelled",
    }
}

string_enum! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
    #[serde(rename_all = "lowercase")]
    pub enum EventType {
        #[default]
        Personal => "personal",
        Team => "team",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    /// `None` means unbounded.
    pub capacity: Option<i64>,
    pub status: EventStatus,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub team_id: Option<Uuid>,
    pub speaker_id: Option<Uuid>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub capacity: Option<i64>,
    pub status: Option<EventStatus>,
    #[serde(rename = "type")]
    pub event_type: Option<EventType>,
    pub team_id: Option<Uuid>,
    pub speaker_id: Option<Uuid>,
    #[serde(default)]
    pub participant_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventInput {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub date: Patch<String>,
    #[serde(default)]
    pub start_time: Patch<String>,
    #[serde(default)]
    pub end_time: Patch<String>,
    #[serde(default)]
    pub location: Patch<String>,
    #[serde(default)]
    pub capacity: Patch<Option<i64>>,
    #[serde(default)]
    pub status: Patch<EventStatus>,
    #[serde(default)]
    pub speaker_id: Patch<Option<Uuid>>,
    #[serde(default)]
    pub participant_ids: Patch<Vec<Uuid>>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventWithAttendeeCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub attendee_count: i64,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventWithParticipantCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub participant_count: i64,
}

/// An event as seen by one user: carries that user's assignment status, if any.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct EventWithAssignment {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub event: Event,
    pub assignment_status: Option<AssignmentStatus>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWithParticipants {
    #[serde(flatten)]
    pub event: Event,
    pub participants: Vec<AssignmentWithDetails>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyEvents {
    pub personal: Vec<EventWithParticipantCount>,
    pub team: Vec<EventWithAssignment>,
}
