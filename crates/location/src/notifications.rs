//! User-facing notifications.
//!
//! Systems anywhere in the app emit [`NotificationEvent`]s; this module
//! collects them into [`NotificationLog`] and expires them on a per-severity
//! timer. The `ui` crate renders the log as toasts. The type lives in this
//! crate so that every other crate can emit without circular dependencies.

use bevy::prelude::*;

// =============================================================================
// Severity
// =============================================================================

/// How loudly a notification should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationSeverity {
    /// Something went wrong or needs the user's attention (save failed,
    /// location access denied).
    Warning,
    /// Neutral information (spot cleared).
    Info,
    /// Good news (spot saved).
    Positive,
}

impl NotificationSeverity {
    /// Seconds a notification of this severity stays on screen.
    pub fn ttl_seconds(self) -> f32 {
        match self {
            NotificationSeverity::Warning => 8.0,
            NotificationSeverity::Info => 5.0,
            NotificationSeverity::Positive => 4.0,
        }
    }

    /// Short label for display.
    pub fn label(self) -> &'static str {
        match self {
            NotificationSeverity::Warning => "WARNING",
            NotificationSeverity::Info => "INFO",
            NotificationSeverity::Positive => "OK",
        }
    }
}

// =============================================================================
// Event and log
// =============================================================================

/// Event emitted by other systems to show a notification.
#[derive(Event, Debug, Clone)]
pub struct NotificationEvent {
    pub text: String,
    pub severity: NotificationSeverity,
}

/// A notification currently on screen.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub text: String,
    pub severity: NotificationSeverity,
    /// App time in seconds when the notification was created.
    pub created_at: f32,
}

/// Active notifications, oldest first.
#[derive(Resource, Default)]
pub struct NotificationLog {
    pub active: Vec<Notification>,
    next_id: u64,
}

impl NotificationLog {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Add a notification from an event.
    pub fn push(&mut self, event: &NotificationEvent, now: f32) {
        let id = self.next_id();
        self.active.push(Notification {
            id,
            text: event.text.clone(),
            severity: event.severity,
            created_at: now,
        });
    }

    /// Drop notifications whose severity TTL has elapsed.
    pub fn sweep(&mut self, now: f32) {
        self.active
            .retain(|n| now - n.created_at < n.severity.ttl_seconds());
    }
}

// =============================================================================
// Systems
// =============================================================================

/// Collects `NotificationEvent`s into the log.
fn collect_notifications(
    mut events: EventReader<NotificationEvent>,
    mut log: ResMut<NotificationLog>,
    time: Res<Time>,
) {
    for event in events.read() {
        log.push(event, time.elapsed_secs());
    }
}

/// Expires old notifications.
fn sweep_expired_notifications(mut log: ResMut<NotificationLog>, time: Res<Time>) {
    if log.active.is_empty() {
        return;
    }
    log.sweep(time.elapsed_secs());
}

// =============================================================================
// Plugin
// =============================================================================

pub struct NotificationsPlugin;

impl Plugin for NotificationsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NotificationLog>()
            .add_event::<NotificationEvent>()
            .add_systems(
                Update,
                (collect_notifications, sweep_expired_notifications).chain(),
            );
    }
}

// =============================================================================
// Tests
// =============================================================================
