pub mod auth;
pub mod comments;
pub mod posts;
pub mod route;
pub mod subscription;

use colored::Colorize;
use newsdesk_interaction::NotificationLevel;
use newsdesk_interaction::notification::NotificationReceiver;
use serde::Serialize;

/// Chooses between human-readable and JSON output.
pub struct Output {
    json: bool,
}

impl Output {
    pub fn new(json: bool) -> Self {
        Self { json }
    }

    pub fn is_json(&self) -> bool {
        self.json
    }

    /// Prints `value` as JSON when requested; otherwise runs `human`.
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce()) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human();
        }
        Ok(())
    }

    pub fn success(&self, message: &str) {
        if !self.json {
            println!("{}", message.green());
        }
    }
}

/// Prints whatever the gateway reported while the command ran.
pub fn drain_notifications(notifications: &mut NotificationReceiver) {
    while let Ok(notification) = notifications.try_recv() {
        let line = format!("{}: {}", notification.level, notification.message);
        match notification.level {
            NotificationLevel::Warning => eprintln!("{}", line.yellow()),
            NotificationLevel::Error => eprintln!("{}", line.red()),
        }
    }
}
