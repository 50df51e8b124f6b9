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

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;
use uuid::Uuid;

use crate::engine_core::dispatcher::DispatchRecord;
use crate::engine_core::errors::HookError;
use crate::engine_core::events::EventKind;
use crate::engine_core::models::PolicyDecision;
use crate::engine_core::traits::Sink;
use crate::sinks::append_line;
use crate::utils::time;

/// One line of `audit.log`.
#[derive(Serialize)]
struct AuditEntry<'a> {
    id: String,
    timestamp: String,
    event: &'a str,
    session_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    action: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    decision: Option<&'a PolicyDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    command_fingerprint: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
    input: &'a Value,
}

/// Append-only JSONL audit trail. One line per event.
pub struct AuditSink {
    path: PathBuf,
}

impl AuditSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn entry_line(record: &DispatchRecord) -> Result<String, HookError> {
        let envelope = &record.envelope;
        let outcome = envelope.outcome();

        let entry = AuditEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: time::rfc3339(envelope.timestamp()),
            event: envelope.event_kind().host_name(),
            session_id: envelope.session_id(),
            tool: envelope.tool_name(),
            action: envelope.action_kind().map(|a| a.as_str()),
            // Only the gate produces a decision worth keeping
            decision: (envelope.event_kind() == EventKind::PreAction).then_some(&record.decision),
            command_fingerprint: record.command_fingerprint.as_deref(),
            success: outcome.map(|o| o.success),
            error: outcome.and_then(|o| o.error.as_deref()),
            input: envelope.parameters(),
        };
        Ok(serde_json::to_string(&entry)?)
    }
}

#[async_trait]
impl Sink for AuditSink {
    fn name(&self) -> &'static str {
        "audit"
    }

    async fn record(&self, record: &DispatchRecord) -> Result<(), HookError> {
        let line = Self::entry_line(record)?;
        append_line(&self.path, line)
            .await
            .map_err(|e| HookError::sink(self.name(), e))
    }
}
