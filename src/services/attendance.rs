use sqlx::SqlitePool;
use uuid::Uuid;

use crate::database::models::{
    Actor, Attendance, AttendanceStatus, AttendanceWithUser, EventStatus,
};
use crate::database::repositories::{attendance as attendance_repo, event as event_repo};
use crate::database::transaction::DatabaseTransaction;
use crate::error::AppError;
use crate::services::policy;

/// Result of a successful registration.
#[derive(Debug, Clone)]
pub enum Registration {
    /// A new attendance row was written.
    Created(Attendance),
    /// A cancelled row was flipped back to registered, keeping its identity.
    Reactivated(Attendance),
}

impl Registration {
    pub fn is_created(&self) -> bool {
        matches!(self, Registration::Created(_))
    }

    pub fn into_attendance(self) -> Attendance {
        match self {
            Registration::Created(attendance) | Registration::Reactivated(attendance) => attendance,
        }
    }
}

#[derive(Clone)]
pub struct AttendanceService {
    pool: SqlitePool,
}

impl AttendanceService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Registers the actor for a published event.
    ///
    /// The event row is write-locked before anything is read, so concurrent
    /// registrations for the same event run one after another and the
    /// capacity count cannot go stale between the check and the insert.
    pub async fn register(&self, actor: &Actor, event_id: Uuid) -> Result<Registration, AppError> {
        let user_id = actor.user_id;

        let registration = DatabaseTransaction::run(&self.pool, move |tx| {
            Box::pin(async move {
                if !event_repo::lock_for_update(&mut **tx, event_id).await? {
                    return Err(AppError::not_found("Event not found"));
                }
                let event = event_repo::find_by_id(&mut **tx, event_id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Event not found"))?;

                if event.status != EventStatus::Published {
                    return Err(AppError::validation(
                        "Registration is only open for published events",
                    ));
                }

                let existing =
                    attendance_repo::find_by_event_and_user(&mut **tx, event_id, user_id).await?;
                match existing.as_ref().map(|row| row.status) {
                    Some(AttendanceStatus::Registered) => {
                        return Err(AppError::conflict("Already registered for this event"));
                    }
                    Some(AttendanceStatus::Attended) => {
                        return Err(AppError::conflict("Already attended this event"));
                    }
                    _ => {}
                }

                if let Some(capacity) = event.capacity {
                    let registered = attendance_repo::count_registered(&mut **tx, event_id).await?;
                    if registered >= capacity {
                        return Err(AppError::conflict("Event is at full capacity"));
                    }
                }

                match existing {
                    Some(row) => {
                        let attendance = attendance_repo::update_status(
                            &mut **tx,
                            row.id,
                            AttendanceStatus::Registered,
                        )
                        .await?
                        .ok_or_else(|| AppError::not_found("Registration not found"))?;
                        Ok(Registration::Reactivated(attendance))
                    }
                    None => {
                        let attendance = attendance_repo::create_attendance(
                            &mut **tx,
                            &Attendance::registered(event_id, user_id),
                        )
                        .await?;
                        Ok(Registration::Created(attendance))
                    }
                }
            })
        })
        .await?;

        log::info!("User {} registered for event {}", user_id, event_id);
        Ok(registration)
    }

    /// Cancels the actor's registration. Cancelling twice is a no-op.
    pub async fn cancel(&self, actor: &Actor, event_id: Uuid) -> Result<Attendance, AppError> {
        let existing =
            attendance_repo::find_by_event_and_user(&self.pool, event_id, actor.user_id)
                .await?
                .ok_or_else(|| AppError::not_found("Registration not found"))?;

        if existing.status == AttendanceStatus::Cancelled {
            return Ok(existing);
        }

        let attendance =
            attendance_repo::update_status(&self.pool, existing.id, AttendanceStatus::Cancelled)
                .await?
                .ok_or_else(|| AppError::not_found("Registration not found"))?;

        log::info!(
            "User {} cancelled registration for event {}",
            actor.user_id,
            event_id
        );
        Ok(attendance)
    }

    /// Registered attendees in registration order.
    pub async fn attendees(
        &self,
        actor: &Actor,
        event_id: Uuid,
    ) -> Result<Vec<AttendanceWithUser>, AppError> {
        let event = event_repo::find_by_id(&self.pool, event_id)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))?;

        policy::require(
            policy::can_view_attendee_list(&event, actor),
            "Only admins and the speaker can view attendees",
        )?;

        Ok(attendance_repo::get_registered_for_event(&self.pool, event_id).await?)
    }

    pub async fn my_registrations(&self, user_id: Uuid) -> Result<Vec<Attendance>, AppError> {
        Ok(attendance_repo::get_by_user(&self.pool, user_id).await?)
    }

    pub async fn registered_count(&self, event_id: Uuid) -> Result<i64, AppError> {
        Ok(attendance_repo::count_registered(&self.pool, event_id).await?)
    }
}
