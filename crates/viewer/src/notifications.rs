//! In-app notifications.
//!
//! Fetch and decode failures emit `NotificationEvent`s; the log keeps the
//! active ones for the ticker to draw. Warnings linger longer than info
//! lines; both auto-expire and can be dismissed early.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NotificationPriority {
    Warning,
    Info,
}

impl NotificationPriority {
    /// Seconds before the notification expires on its own.
    pub fn auto_dismiss_secs(&self) -> f64 {
        match self {
            NotificationPriority::Warning => 20.0,
            NotificationPriority::Info => 8.0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NotificationPriority::Warning => "WARNING",
            NotificationPriority::Info => "INFO",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Notification {
    pub id: u64,
    pub text: String,
    pub priority: NotificationPriority,
    created_at: f64,
    dismissed: bool,
}

/// Event emitted by loaders and decoders to surface a problem or a status
/// line to the user.
#[derive(Event, Debug, Clone)]
pub struct NotificationEvent {
    pub text: String,
    pub priority: NotificationPriority,
}

impl NotificationEvent {
    pub fn warning(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            priority: NotificationPriority::Warning,
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            priority: NotificationPriority::Info,
        }
    }
}

/// Currently visible notifications.
#[derive(Resource)]
pub struct NotificationLog {
    pub active: Vec<Notification>,
    next_id: u64,
}

impl Default for NotificationLog {
    fn default() -> Self {
        Self {
            active: Vec::new(),
            next_id: 1,
        }
    }
}

impl NotificationLog {
    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn push(&mut self, event: &NotificationEvent, now: f64) {
        let id = self.next_id();
        self.active.push(Notification {
            id,
            text: event.text.clone(),
            priority: event.priority,
            created_at: now,
            dismissed: false,
        });
    }

    pub fn dismiss(&mut self, id: u64) {
        if let Some(notification) = self.active.iter_mut().find(|n| n.id == id) {
            notification.dismissed = true;
        }
    }

    /// Drop dismissed and expired notifications.
    pub fn sweep(&mut self, now: f64) {
        self.active.retain(|n| {
            !n.dismissed && now - n.created_at < n.priority.auto_dismiss_secs()
        });
    }
}

pub fn collect_notifications(
    mut events: EventReader<NotificationEvent>,
    mut log: ResMut<NotificationLog>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs_f64();
    for event in events.read() {
        log.push(event, now);
    }
    log.sweep(now);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_outlive_info_lines() {
        let mut log = NotificationLog::default();
        log.push(&NotificationEvent::warning("fetch failed"), 0.0);
        log.push(&NotificationEvent::info("layer loaded"), 0.0);
        assert_eq!(log.active.len(), 2);

        log.sweep(10.0);
        assert_eq!(log.active.len(), 1);
        assert_eq!(log.active[0].priority, NotificationPriority::Warning);

        log.sweep(30.0);
        assert!(log.active.is_empty());
    }

    #[test]
    fn dismissal_removes_on_next_sweep() {
        let mut log = NotificationLog::default();
        log.push(&NotificationEvent::warning("a"), 0.0);
        log.push(&NotificationEvent::warning("b"), 0.0);
        let first = log.active[0].id;
        log.dismiss(first);
        log.sweep(0.1);
        assert_eq!(log.active.len(), 1);
        assert_eq!(log.active[0].text, "b");
    }

    #[test]
    fn ids_are_unique_and_increasing() {
        let mut log = NotificationLog::default();
        for _ in 0..3 {
            log.push(&NotificationEvent::info("x"), 0.0);
        }
        let ids: Vec<u64> = log.active.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
