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

//! Advisors: passive system messages for lifecycle events.
//!
//! Advisors never make permission decisions. They run after the dispatcher,
//! only for events that had no denial, and their output is display-only.

pub mod context;
pub mod session;
pub mod subagent;

use std::path::Path;
use tracing::warn;

use crate::config::Config;
use crate::engine_core::dispatcher::DispatchRecord;
use crate::engine_core::events::EventKind;
use crate::engine_core::models::HookResponse;
use crate::sinks::append_line;

/// Run the advisor for this record's event, if any.
///
/// Returns the message to show the host. Session log entries are written
/// here too; failures to write them are logged and ignored.
pub async fn advise(config: &Config, record: &DispatchRecord) -> Option<HookResponse> {
    let envelope = &record.envelope;
    match envelope.event_kind() {
        EventKind::SessionStart => {
            let report = session::EnvironmentReport::from_env(&config.required_env);
            let (branch, status) = tokio::join!(context::git_branch(), context::git_status());
            let entry = report.log_entry(
                envelope.session_id(),
                envelope.timestamp(),
                branch.as_deref(),
                status.map_or(0, |s| s.total),
            );
            write_session_log(&config.session_log_path(), entry, true).await;
            Some(HookResponse::message(report.message()))
        }
        EventKind::PromptSubmit => context::gather(&config.active_context_path())
            .await
            .map(HookResponse::message),
        EventKind::SubagentStop => {
            let entry = subagent::completion_entry(subagent::agent_name(envelope), envelope.timestamp());
            write_session_log(&config.session_log_path(), entry, false).await;
            None
        }
        _ => None,
    }
}

/// Append to the session log. Without `create`, an absent log is left alone.
async fn write_session_log(path: &Path, entry: String, create: bool) {
    if !create && !path.exists() {
        return;
    }
    if let Err(e) = append_line(path, entry).await {
        warn!(path = %path.display(), error = %e, "Failed to write session log");
    }
}
