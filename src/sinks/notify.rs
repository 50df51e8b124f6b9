// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Notifications for events a human may want to know about.
//!
//! Every notification is appended to `notifications.log` as
//! `[YYYY-MM-DD HH:MM:SS] [LEVEL] kind: message | {details}`. HIGH level
//! notifications (or all of them with `NOTIFY_ALL=1`) are also posted to a
//! chat webhook when one is configured.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::{json, Value};
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::config::Config;
use crate::engine_core::constants::timeouts;
use crate::engine_core::dispatcher::DispatchRecord;
use crate::engine_core::errors::HookError;
use crate::engine_core::events::EventKind;
use crate::engine_core::models::PolicyDecision;
use crate::engine_core::traits::Sink;
use crate::sinks::append_line;
use crate::utils::time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Info,
    High,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Info => f.write_str("INFO"),
            Level::High => f.write_str("HIGH"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    SecurityBlock,
    SessionComplete,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::SecurityBlock => "security_block",
            NotificationKind::SessionComplete => "session_complete",
        }
    }

    pub fn level(&self) -> Level {
        match self {
            NotificationKind::SecurityBlock => Level::High,
            NotificationKind::SessionComplete => Level::Info,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub details: Option<Value>,
    pub at: DateTime<Utc>,
}

impl Notification {
    /// Notification for a dispatch record, if the event warrants one.
    pub fn from_record(record: &DispatchRecord) -> Option<Self> {
        let envelope = &record.envelope;
        let session_id = envelope.session_id();

        match (&record.decision, envelope.event_kind()) {
            (PolicyDecision::Deny { rule, reason }, _) => Some(Self {
                kind: NotificationKind::SecurityBlock,
                message: format!(
                    "Blocked {} command: {}",
                    envelope.tool_name().unwrap_or("unknown"),
                    reason
                ),
                details: Some(json!({
                    "session_id": session_id,
                    "rule": rule.to_string(),
                })),
                at: envelope.timestamp(),
            }),
            (_, EventKind::SessionStop) => {
                let id = if session_id.is_empty() { "unknown" } else { session_id };
                let short: String = id.chars().take(8).collect();
                Some(Self {
                    kind: NotificationKind::SessionComplete,
                    message: format!("Session completed: {}...", short),
                    details: Some(json!({ "session_id": id })),
                    at: envelope.timestamp(),
                })
            }
            _ => None,
        }
    }

    pub fn level(&self) -> Level {
        self.kind.level()
    }

    /// The `notifications.log` line, without the trailing newline.
    pub fn log_line(&self) -> String {
        let mut line = format!(
            "[{}] [{}] {}: {}",
            time::log_stamp(self.at),
            self.level(),
            self.kind.as_str(),
            self.message
        );
        if let Some(details) = &self.details {
            line.push_str(" | ");
            line.push_str(&details.to_string());
        }
        line
    }

    pub fn webhook_payload(&self) -> Value {
        let marker = match self.level() {
            Level::High => ":red_circle:",
            Level::Info => ":large_blue_circle:",
        };
        json!({
            "text": format!("{} *hookwarden*: {}", marker, self.message),
            "username": "hookwarden",
        })
    }
}

pub struct NotifySink {
    path: PathBuf,
    webhook: Option<(Client, String)>,
    notify_all: bool,
}

impl NotifySink {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            webhook: None,
            notify_all: false,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, HookError> {
        let webhook = match &config.webhook_url {
            Some(url) => {
                let client = Client::builder()
                    .timeout(timeouts::WEBHOOK)
                    .build()
                    .map_err(|e| {
                        HookError::ConfigurationError(format!(
                            "Failed to create HTTP client: {}",
                            e
                        ))
                    })?;
                Some((client, url.clone()))
            }
            None => None,
        };

        Ok(Self {
            path: config.notifications_log_path(),
            webhook,
            notify_all: config.notify_all,
        })
    }

    fn should_post(&self, notification: &Notification) -> bool {
        notification.level() == Level::High || self.notify_all
    }

    async fn post(&self, client: &Client, url: &str, notification: &Notification) {
        let result = client
            .post(url)
            .json(&notification.webhook_payload())
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        match result {
            Ok(_) => debug!(kind = notification.kind.as_str(), "Webhook delivered"),
            Err(e) => warn!(error = %e, "Webhook delivery failed"),
        }
    }
}

#[async_trait]
impl Sink for NotifySink {
    fn name(&self) -> &'static str {
        "notify"
    }

    async fn record(&self, record: &DispatchRecord) -> Result<(), HookError> {
        let Some(notification) = Notification::from_record(record) else {
            return Ok(());
        };

        let logged = append_line(&self.path, notification.log_line()).await;

        // The webhook is attempted even when the local log could not be written
        if let Some((client, url)) = &self.webhook {
            if self.should_post(&notification) {
                self.post(client, url, &notification).await;
            }
        }

        logged.map_err(|e| HookError::sink(self.name(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::tests::sample_record;
    use chrono::TimeZone;

    #[test]
    fn test_log_line_format() {
        let n = Notification {
            kind: NotificationKind::SessionComplete,
            message: "Session completed: abcdefgh...".to_string(),
            details: Some(json!({"session_id": "abcdefgh1234"})),
            at: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        };
        let line = n.log_line();
        let (stamp, rest) = line.split_at(21);
        assert!(stamp.starts_with('[') && stamp.ends_with(']'));
        assert_eq!(
            rest,
            " [INFO] session_complete: Session completed: abcdefgh... | {\"session_id\":\"abcdefgh1234\"}"
        );
    }

    #[test]
    fn test_denial_is_high_level() {
        let record = sample_record(json!({
            "hook_event_name": "PreToolUse",
            "tool_name": "Bash",
            "tool_input": {"command": "git push --force origin main"},
            "session_id": "s"
        }));
        let n = Notification::from_record(&record).unwrap();
        assert_eq!(n.kind, NotificationKind::SecurityBlock);
        assert_eq!(n.level(), Level::High);
        assert!(n.message.starts_with("Blocked Bash command: matches dangerous pattern"));
        assert!(!n.message.contains("git push"));
    }

    #[test]
    fn test_allowed_action_has_no_notification() {
        let record = sample_record(json!({
            "hook_event_name": "PreToolUse",
            "tool_name": "Bash",
            "tool_input": {"command": "ls"}
        }));
        assert!(Notification::from_record(&record).is_none());
    }

    #[tokio::test]
    async fn test_stop_event_written_to_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notifications.log");
        let sink = NotifySink::new(path.clone());
        let record = sample_record(json!({
            "hook_event_name": "Stop",
            "session_id": "1234567890"
        }));

        sink.record(&record).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[INFO] session_complete: Session completed: 12345678..."));
        assert!(content.ends_with("{\"session_id\":\"1234567890\"}\n"));
    }

    #[test]
    fn test_info_not_posted_unless_notify_all() {
        let mut sink = NotifySink::new(PathBuf::from("unused"));
        let n = Notification {
            kind: NotificationKind::SessionComplete,
            message: "done".into(),
            details: None,
            at: Utc::now(),
        };
        assert!(!sink.should_post(&n));
        sink.notify_all = true;
        assert!(sink.should_post(&n));
    }
}
