//! Integration tests for the reminder session.
//!
//! These tests drive a full session through the public API with a paused
//! tokio clock and a mock notification sink:
//! - Start, remind, drink, stop workflow
//! - Permission prompt flow
//! - Recovery after sink failures
//! - History export

use chrono::{Local, TimeZone};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use hydrate::notification::{MockNotificationSink, NOTIFICATION_TITLE, PERMISSION_GRANTED_BODY};
use hydrate::reminder::{Clock, ReminderEvent, ReminderMachine, Session, SessionHandle};
use hydrate::types::{History, HistoryEvent, Permission, ReminderConfig, ReminderState};

// ============================================================================
// Test Helpers
// ============================================================================

struct Harness {
    handle: SessionHandle,
    task: JoinHandle<History>,
    events: mpsc::UnboundedReceiver<ReminderEvent>,
}

/// Starts a session with a 1-minute frequency and a fixed wall clock (09:05).
fn spawn_session(sink: MockNotificationSink) -> Harness {
    let (event_tx, events) = mpsc::unbounded_channel();
    let config = ReminderConfig::default().with_frequency_minutes(1);
    let machine = ReminderMachine::new(config, sink, event_tx)
        .with_wall_clock(|| Local.with_ymd_and_hms(2024, 6, 1, 9, 5, 0).unwrap());
    let (session, handle) = Session::new(machine, Clock::new());

    Harness {
        handle,
        task: tokio::spawn(session.run()),
        events,
    }
}

fn drain(events: &mut mpsc::UnboundedReceiver<ReminderEvent>) -> Vec<ReminderEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

// ============================================================================
// Workflow
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_full_reminder_cycle() {
    let sink = MockNotificationSink::granted();
    let Harness {
        handle,
        task,
        mut events,
    } = spawn_session(sink.clone());

    handle.start().unwrap();
    sleep(Duration::from_millis(60_500)).await;

    assert_eq!(
        sink.shown(),
        vec![(
            NOTIFICATION_TITLE.to_string(),
            "[09:05 AM] Time to drink some water".to_string()
        )]
    );
    let states: Vec<_> = drain(&mut events)
        .into_iter()
        .filter_map(|event| match event {
            ReminderEvent::StateChanged { to, .. } => Some(to),
            _ => None,
        })
        .collect();
    assert_eq!(
        states,
        vec![ReminderState::Started, ReminderState::StartedOvertime]
    );

    handle.drink().unwrap();
    sleep(Duration::from_millis(30_250)).await;
    let status = handle.status().await.unwrap();
    assert_eq!(status.state, ReminderState::Started);
    assert_eq!(status.remaining_seconds, Some(30));

    handle.stop().unwrap();
    sleep(Duration::from_secs(300)).await;
    assert_eq!(sink.notification_count(), 1);

    handle.quit().unwrap();
    let history = task.await.unwrap();
    let recorded: Vec<_> = history.entries().iter().map(|e| e.event).collect();
    assert_eq!(
        recorded,
        vec![HistoryEvent::Start, HistoryEvent::Drink, HistoryEvent::Stop]
    );
}

#[tokio::test(start_paused = true)]
async fn test_overtime_replaces_previous_notification() {
    let sink = MockNotificationSink::granted();
    let harness = spawn_session(sink.clone());

    harness.handle.start().unwrap();
    // initial reminder at 60s, overtime reminder at 60s + 59s
    sleep(Duration::from_millis(119_500)).await;

    let handles = sink.handles();
    assert_eq!(handles.len(), 2);
    assert_eq!(sink.dismissed(), vec![handles[0].clone()]);
}

#[tokio::test(start_paused = true)]
async fn test_restart_while_started_resets_countdown() {
    let sink = MockNotificationSink::granted();
    let harness = spawn_session(sink.clone());

    harness.handle.start().unwrap();
    sleep(Duration::from_millis(45_500)).await;
    harness.handle.start().unwrap();
    sleep(Duration::from_millis(30_250)).await;

    // the first countdown would have reminded at 60s
    assert_eq!(sink.notification_count(), 0);
    let status = harness.handle.status().await.unwrap();
    assert_eq!(status.remaining_seconds, Some(30));
    assert_eq!(status.history_len, 2);
}

// ============================================================================
// Permission
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_reminders_wait_for_permission() {
    let sink = MockNotificationSink::new(Permission::Default);
    let Harness {
        handle, mut events, ..
    } = spawn_session(sink.clone());

    handle.start().unwrap();
    sleep(Duration::from_millis(60_500)).await;
    assert_eq!(sink.notification_count(), 0);
    assert!(drain(&mut events).contains(&ReminderEvent::ReminderSuppressed));

    handle.request_permission().unwrap();
    sleep(Duration::from_millis(10)).await;
    assert_eq!(sink.bodies(), vec![PERMISSION_GRANTED_BODY.to_string()]);
    assert!(drain(&mut events).contains(&ReminderEvent::PermissionChanged {
        permission: Permission::Granted
    }));

    // next overtime reminder at 60s + 59s
    sleep(Duration::from_secs(60)).await;
    assert_eq!(sink.notification_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_denied_permission_keeps_session_running() {
    let sink = MockNotificationSink::new(Permission::Default);
    sink.set_request_answer(Permission::Denied);
    let harness = spawn_session(sink.clone());

    harness.handle.request_permission().unwrap();
    harness.handle.start().unwrap();
    sleep(Duration::from_millis(60_500)).await;

    let status = harness.handle.status().await.unwrap();
    assert_eq!(status.permission, Permission::Denied);
    assert_eq!(status.state, ReminderState::StartedOvertime);
    assert_eq!(sink.notification_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_revoked_permission_suppresses_later_reminders() {
    let sink = MockNotificationSink::granted();
    let harness = spawn_session(sink.clone());

    harness.handle.start().unwrap();
    sleep(Duration::from_millis(60_500)).await;
    assert_eq!(sink.notification_count(), 1);

    sink.set_permission(Permission::Denied);
    sleep(Duration::from_secs(120)).await;
    assert_eq!(sink.notification_count(), 1);
}

// ============================================================================
// Failure Handling
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_sink_failure_does_not_stop_reminders() {
    let sink = MockNotificationSink::granted();
    sink.set_should_fail(true);
    let harness = spawn_session(sink.clone());

    harness.handle.start().unwrap();
    sleep(Duration::from_millis(60_500)).await;
    assert_eq!(sink.notification_count(), 0);
    assert_eq!(
        harness.handle.status().await.unwrap().state,
        ReminderState::StartedOvertime
    );

    sink.set_should_fail(false);
    sleep(Duration::from_secs(60)).await;
    assert_eq!(sink.notification_count(), 1);
}

// ============================================================================
// History Export
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_history_serializes_as_array() {
    let harness = spawn_session(MockNotificationSink::granted());

    harness.handle.start().unwrap();
    harness.handle.drink().unwrap();
    harness.handle.quit().unwrap();
    let history = harness.task.await.unwrap();

    let json = serde_json::to_value(&history).unwrap();
    let entries = json.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["event"], "Start");
    assert_eq!(entries[1]["event"], "Drink");
    assert!(entries[0]["time"]
        .as_str()
        .unwrap()
        .starts_with("2024-06-01T09:05:00"));
}

#[tokio::test(start_paused = true)]
async fn test_status_serializes_with_camel_case_keys() {
    let harness = spawn_session(MockNotificationSink::granted());

    harness.handle.start().unwrap();
    sleep(Duration::from_millis(500)).await;
    let status = harness.handle.status().await.unwrap();

    let json = serde_json::to_value(&status).unwrap();
    assert_eq!(json["state"], "started");
    assert_eq!(json["remainingSeconds"], 60);
    assert_eq!(json["permission"], "granted");
    assert_eq!(json["frequencyMinutes"], 1);
    assert_eq!(json["historyLength"], 1);
}
