use pretty_assertions::assert_eq;
use serde_json::json;

use agenda::AppError;
use agenda::database::models::*;
use agenda::database::repositories::{assignment as assignment_repo, attendance as attendance_repo};

mod common;
use common::{actor, event_input};

fn patch(value: serde_json::Value) -> UpdateEventInput {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_create_personal_event_uses_defaults() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;

    let created = ctx
        .state
        .events
        .create(&actor(&owner), event_input("2026-04-02"))
        .await
        .unwrap();

    assert_eq!(created.event.status, EventStatus::Draft);
    assert_eq!(created.event.event_type, EventType::Personal);
    assert_eq!(created.event.created_by, owner.id);
    assert_eq!(created.event.team_id, None);
    assert_eq!(created.event.capacity, None);
    assert!(created.participants.is_empty());
}

#[tokio::test]
async fn test_create_rejects_malformed_date() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;

    let result = ctx
        .state
        .events
        .create(&actor(&owner), event_input("04/02/2026"))
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_create_rejects_zero_capacity() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;

    let result = ctx
        .state
        .events
        .create(
            &actor(&owner),
            CreateEventInput {
                capacity: Some(0),
                ..event_input("2026-04-02")
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_team_event_requires_admin() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let admin = ctx.create_user(Role::Admin).await;
    let speaker = ctx.create_user(Role::Speaker).await;
    let team = ctx.create_team(&admin, &[&speaker]).await;

    let result = ctx
        .state
        .events
        .create(
            &actor(&speaker),
            CreateEventInput {
                event_type: Some(EventType::Team),
                team_id: Some(team.id),
                ..event_input("2026-04-02")
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_team_event_needs_a_resolvable_team() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let admin = ctx.create_user(Role::Admin).await;

    let missing_team = ctx
        .state
        .events
        .create(
            &actor(&admin),
            CreateEventInput {
                event_type: Some(EventType::Team),
                ..event_input("2026-04-02")
            },
        )
        .await;
    assert!(matches!(missing_team, Err(AppError::Validation(_))));

    let unknown_team = ctx
        .state
        .events
        .create(
            &actor(&admin),
            CreateEventInput {
                event_type: Some(EventType::Team),
                team_id: Some(uuid::Uuid::new_v4()),
                ..event_input("2026-04-02")
            },
        )
        .await;
    assert!(matches!(unknown_team, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_personal_event_cannot_reference_team() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let admin = ctx.create_user(Role::Admin).await;
    let team = ctx.create_team(&admin, &[]).await;

    let result = ctx
        .state
        .events
        .create(
            &actor(&admin),
            CreateEventInput {
                team_id: Some(team.id),
                ..event_input("2026-04-02")
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_team_event_fans_out_pending_assignments() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let admin = ctx.create_user(Role::Admin).await;
    let a = ctx.create_user(Role::Attendee).await;
    let b = ctx.create_user(Role::Attendee).await;
    let c = ctx.create_user(Role::Speaker).await;
    let team = ctx.create_team(&admin, &[&a, &b, &c]).await;

    let created = ctx
        .state
        .events
        .create(
            &actor(&admin),
            CreateEventInput {
                event_type: Some(EventType::Team),
                team_id: Some(team.id),
                ..event_input("2026-04-02")
            },
        )
        .await
        .unwrap();

    assert_eq!(created.participants.len(), 3);
    assert!(
        created
            .participants
            .iter()
            .all(|p| p.assignment.status == AssignmentStatus::Pending)
    );

    let mut assigned: Vec<_> = created
        .participants
        .iter()
        .map(|p| p.assignment.user_id)
        .collect();
    let mut expected = vec![a.id, b.id, c.id];
    assigned.sort();
    expected.sort();
    assert_eq!(assigned, expected);
}

#[tokio::test]
async fn test_fan_out_is_a_membership_snapshot() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let admin = ctx.create_user(Role::Admin).await;
    let early = ctx.create_user(Role::Attendee).await;
    let late = ctx.create_user(Role::Attendee).await;
    let team = ctx.create_team(&admin, &[&early]).await;

    let created = ctx
        .state
        .events
        .create(
            &actor(&admin),
            CreateEventInput {
                event_type: Some(EventType::Team),
                team_id: Some(team.id),
                ..event_input("2026-04-02")
            },
        )
        .await
        .unwrap();

    ctx.state
        .teams
        .add_member(&actor(&admin), team.id, late.id)
        .await
        .unwrap();

    let assignments = assignment_repo::get_by_event(&ctx.pool, created.event.id)
        .await
        .unwrap();
    assert_eq!(assignments.len(), 1);
    assert_eq!(assignments[0].assignment.user_id, early.id);
}

#[tokio::test]
async fn test_failed_fan_out_keeps_event_and_rolls_back_assignments() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let admin = ctx.create_user(Role::Admin).await;
    let accepted = ctx.create_user(Role::Attendee).await;
    let refused = ctx.create_user(Role::Attendee).await;
    let team = ctx.create_team(&admin, &[&accepted, &refused]).await;

    sqlx::query(&format!(
        "CREATE TRIGGER refuse_assignment BEFORE INSERT ON event_assignments \
         WHEN NEW.user_id = x'{}' \
         BEGIN SELECT RAISE(ABORT, 'assignment refused'); END",
        refused.id.simple()
    ))
    .execute(&ctx.pool)
    .await
    .unwrap();

    let created = ctx
        .state
        .events
        .create(
            &actor(&admin),
            CreateEventInput {
                event_type: Some(EventType::Team),
                team_id: Some(team.id),
                ..event_input("2026-04-02")
            },
        )
        .await
        .unwrap();

    assert_eq!(created.event.team_id, Some(team.id));
    assert!(created.participants.is_empty());
    let stored = ctx.state.events.find(created.event.id).await.unwrap();
    assert_eq!(stored.id, created.event.id);
    assert_eq!(
        ctx.state.assignments.pending_count(accepted.id).await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_personal_participants_are_pre_approved() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;
    let friend = ctx.create_user(Role::Attendee).await;

    let created = ctx
        .state
        .events
        .create(
            &actor(&owner),
            CreateEventInput {
                participant_ids: vec![friend.id, friend.id],
                ..event_input("2026-04-02")
            },
        )
        .await
        .unwrap();

    assert_eq!(created.participants.len(), 1);
    assert_eq!(created.participants[0].assignment.user_id, friend.id);
    assert_eq!(
        created.participants[0].assignment.status,
        AssignmentStatus::Approved
    );
}

#[tokio::test]
async fn test_unknown_participant_fails_without_creating_event() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;

    let result = ctx
        .state
        .events
        .create(
            &actor(&owner),
            CreateEventInput {
                participant_ids: vec![uuid::Uuid::new_v4()],
                ..event_input("2026-04-02")
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(ctx.state.events.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_update_with_unknown_users_is_not_found() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;
    let friend = ctx.create_user(Role::Attendee).await;

    let created = ctx
        .state
        .events
        .create(
            &actor(&owner),
            CreateEventInput {
                participant_ids: vec![friend.id],
                ..event_input("2026-04-02")
            },
        )
        .await
        .unwrap();
    let event_id = created.event.id;

    let unknown_speaker = ctx
        .state
        .events
        .update(
            &actor(&owner),
            event_id,
            patch(json!({ "title": "Renamed", "speakerId": uuid::Uuid::new_v4() })),
        )
        .await;
    assert!(matches!(unknown_speaker, Err(AppError::NotFound(_))));

    let unknown_participant = ctx
        .state
        .events
        .update(
            &actor(&owner),
            event_id,
            patch(json!({ "participantIds": [friend.id, uuid::Uuid::new_v4()] })),
        )
        .await;
    assert!(matches!(unknown_participant, Err(AppError::NotFound(_))));

    let stored = ctx.state.events.get(event_id).await.unwrap();
    assert_eq!(stored.event.title, created.event.title);
    assert_eq!(stored.event.speaker_id, None);
    assert_eq!(stored.participants.len(), 1);
    assert_eq!(stored.participants[0].assignment.user_id, friend.id);
}

#[tokio::test]
async fn test_replacing_participants_keeps_retained_rows() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;
    let kept = ctx.create_user(Role::Attendee).await;
    let dropped = ctx.create_user(Role::Attendee).await;
    let added = ctx.create_user(Role::Attendee).await;

    let created = ctx
        .state
        .events
        .create(
            &actor(&owner),
            CreateEventInput {
                participant_ids: vec![kept.id, dropped.id],
                ..event_input("2026-04-02")
            },
        )
        .await
        .unwrap();
    let event_id = created.event.id;
    let kept_before = assignment_repo::find_by_event_and_user(&ctx.pool, event_id, kept.id)
        .await
        .unwrap()
        .unwrap();

    let updated = ctx
        .state
        .events
        .update(
            &actor(&owner),
            event_id,
            patch(json!({ "participantIds": [kept.id, added.id] })),
        )
        .await
        .unwrap();

    assert_eq!(updated.participants.len(), 2);
    let kept_after = assignment_repo::find_by_event_and_user(&ctx.pool, event_id, kept.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(kept_after.id, kept_before.id);
    assert!(
        assignment_repo::find_by_event_and_user(&ctx.pool, event_id, dropped.id)
            .await
            .unwrap()
            .is_none()
    );
    assert!(
        assignment_repo::find_by_event_and_user(&ctx.pool, event_id, added.id)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_participants_rejected_on_team_event_update() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let admin = ctx.create_user(Role::Admin).await;
    let member = ctx.create_user(Role::Attendee).await;
    let team = ctx.create_team(&admin, &[&member]).await;

    let created = ctx
        .state
        .events
        .create(
            &actor(&admin),
            CreateEventInput {
                event_type: Some(EventType::Team),
                team_id: Some(team.id),
                ..event_input("2026-04-02")
            },
        )
        .await
        .unwrap();

    let result = ctx
        .state
        .events
        .update(
            &actor(&admin),
            created.event.id,
            patch(json!({ "participantIds": [] })),
        )
        .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_update_by_stranger_is_forbidden_but_admin_succeeds() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;
    let stranger = ctx.create_user(Role::Attendee).await;
    let admin = ctx.create_user(Role::Admin).await;
    let event = ctx.create_published_event(&owner, None).await;

    let denied = ctx
        .state
        .events
        .update(
            &actor(&stranger),
            event.id,
            patch(json!({ "title": "Hijacked" })),
        )
        .await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    let updated = ctx
        .state
        .events
        .update(
            &actor(&admin),
            event.id,
            patch(json!({ "title": "Renamed by admin" })),
        )
        .await
        .unwrap();
    assert_eq!(updated.event.title, "Renamed by admin");
}

#[tokio::test]
async fn test_speaker_may_update_their_event() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let admin = ctx.create_user(Role::Admin).await;
    let speaker = ctx.create_user(Role::Speaker).await;
    let team = ctx.create_team(&admin, &[]).await;

    let created = ctx
        .state
        .events
        .create(
            &actor(&admin),
            CreateEventInput {
                event_type: Some(EventType::Team),
                team_id: Some(team.id),
                speaker_id: Some(speaker.id),
                ..event_input("2026-04-02")
            },
        )
        .await
        .unwrap();

    let updated = ctx
        .state
        .events
        .update(
            &actor(&speaker),
            created.event.id,
            patch(json!({ "location": "Room 12" })),
        )
        .await
        .unwrap();

    assert_eq!(updated.event.location, "Room 12");
}

#[tokio::test]
async fn test_patch_leaves_absent_fields_untouched() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;
    let event = ctx.create_published_event(&owner, Some(40)).await;

    let updated = ctx
        .state
        .events
        .update(
            &actor(&owner),
            event.id,
            patch(json!({ "description": "", "endTime": "12:00" })),
        )
        .await
        .unwrap()
        .event;

    assert_eq!(updated.description, "");
    assert_eq!(updated.end_time, "12:00");
    assert_eq!(updated.title, event.title);
    assert_eq!(updated.date, event.date);
    assert_eq!(updated.start_time, event.start_time);
    assert_eq!(updated.location, event.location);
    assert_eq!(updated.capacity, Some(40));
    assert_eq!(updated.status, EventStatus::Published);
}

#[tokio::test]
async fn test_explicit_null_clears_capacity() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;
    let event = ctx.create_published_event(&owner, Some(5)).await;

    let updated = ctx
        .state
        .events
        .update(&actor(&owner), event.id, patch(json!({ "capacity": null })))
        .await
        .unwrap();

    assert_eq!(updated.event.capacity, None);
}

#[tokio::test]
async fn test_capacity_cannot_drop_below_registrations() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;
    let event = ctx.create_published_event(&owner, Some(5)).await;

    for _ in 0..2 {
        let attendee = ctx.create_user(Role::Attendee).await;
        ctx.state
            .attendance
            .register(&actor(&attendee), event.id)
            .await
            .unwrap();
    }

    let too_low = ctx
        .state
        .events
        .update(&actor(&owner), event.id, patch(json!({ "capacity": 1 })))
        .await;
    assert!(matches!(too_low, Err(AppError::Conflict(_))));

    let exact = ctx
        .state
        .events
        .update(&actor(&owner), event.id, patch(json!({ "capacity": 2 })))
        .await
        .unwrap();
    assert_eq!(exact.event.capacity, Some(2));
}

#[tokio::test]
async fn test_status_transitions() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;
    let event = ctx.create_published_event(&owner, None).await;
    let owner = actor(&owner);

    let draft = ctx
        .state
        .events
        .update(&owner, event.id, patch(json!({ "status": "draft" })))
        .await
        .unwrap();
    assert_eq!(draft.event.status, EventStatus::Draft);

    let cancelled = ctx
        .state
        .events
        .update(&owner, event.id, patch(json!({ "status": "cancelled" })))
        .await
        .unwrap();
    assert_eq!(cancelled.event.status, EventStatus::Cancelled);

    let reopened = ctx
        .state
        .events
        .update(&owner, event.id, patch(json!({ "status": "published" })))
        .await;
    assert!(matches!(reopened, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_update_missing_event_is_not_found() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let admin = ctx.create_user(Role::Admin).await;

    let result = ctx
        .state
        .events
        .update(
            &actor(&admin),
            uuid::Uuid::new_v4(),
            patch(json!({ "title": "Ghost" })),
        )
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_delete_removes_assignments_and_attendance() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;
    let friend = ctx.create_user(Role::Attendee).await;
    let attendee = ctx.create_user(Role::Attendee).await;

    let created = ctx
        .state
        .events
        .create(
            &actor(&owner),
            CreateEventInput {
                status: Some(EventStatus::Published),
                participant_ids: vec![friend.id],
                ..event_input("2026-04-02")
            },
        )
        .await
        .unwrap();
    let event_id = created.event.id;
    ctx.state
        .attendance
        .register(&actor(&attendee), event_id)
        .await
        .unwrap();

    let denied = ctx.state.events.delete(&actor(&friend), event_id).await;
    assert!(matches!(denied, Err(AppError::Forbidden(_))));

    ctx.state.events.delete(&actor(&owner), event_id).await.unwrap();

    assert!(matches!(
        ctx.state.events.get(event_id).await,
        Err(AppError::NotFound(_))
    ));
    assert!(
        assignment_repo::get_by_event(&ctx.pool, event_id)
            .await
            .unwrap()
            .is_empty()
    );
    assert!(
        attendance_repo::find_by_event_and_user(&ctx.pool, event_id, attendee.id)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_list_counts_registered_attendees() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let owner = ctx.create_user(Role::Attendee).await;
    let published = ctx.create_published_event(&owner, None).await;
    ctx.state
        .events
        .create(&actor(&owner), event_input("2026-06-20"))
        .await
        .unwrap();

    let attendee = ctx.create_user(Role::Attendee).await;
    ctx.state
        .attendance
        .register(&actor(&attendee), published.id)
        .await
        .unwrap();

    let all = ctx.state.events.list(None).await.unwrap();
    assert_eq!(all.len(), 2);

    let only_published = ctx
        .state
        .events
        .list(Some(EventStatus::Published))
        .await
        .unwrap();
    assert_eq!(only_published.len(), 1);
    assert_eq!(only_published[0].event.id, published.id);
    assert_eq!(only_published[0].attendee_count, 1);
}

#[tokio::test]
async fn test_my_events_splits_personal_and_team() {
    common::setup_test_env();
    let ctx = common::TestContext::new().await.unwrap();
    let admin = ctx.create_user(Role::Admin).await;
    let member = ctx.create_user(Role::Attendee).await;
    let team = ctx.create_team(&admin, &[&member]).await;

    ctx.state
        .events
        .create(&actor(&member), event_input("2026-04-01"))
        .await
        .unwrap();
    ctx.state
        .events
        .create(
            &actor(&admin),
            CreateEventInput {
                event_type: Some(EventType::Team),
                team_id: Some(team.id),
                ..event_input("2026-04-02")
            },
        )
        .await
        .unwrap();

    let mine = ctx.state.events.my_events(&actor(&member)).await.unwrap();

    assert_eq!(mine.personal.len(), 1);
    assert_eq!(mine.personal[0].participant_count, 0);
    assert_eq!(mine.team.len(), 1);
    assert_eq!(
        mine.team[0].assignment_status,
        Some(AssignmentStatus::Pending)
    );
}
