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

//! hookwarden Constants - Single source of truth for all configuration values.
//!
//! This module centralizes the wire field names, marker strings, file names
//! and limits so the engines, sinks and tests agree on them.

/// Host event names as they appear in the hook payload
pub mod events {
    pub const PRE_TOOL_USE: &str = "PreToolUse";
    pub const POST_TOOL_USE: &str = "PostToolUse";
    pub const SESSION_START: &str = "SessionStart";
    pub const STOP: &str = "Stop";
    pub const SUBAGENT_STOP: &str = "SubagentStop";
    pub const USER_PROMPT_SUBMIT: &str = "UserPromptSubmit";
}

/// Host tool names mapped onto action kinds
pub mod tools {
    pub const BASH: &str = "Bash";
    pub const WRITE: &str = "Write";
    pub const EDIT: &str = "Edit";
    pub const MULTI_EDIT: &str = "MultiEdit";
    pub const NOTEBOOK_EDIT: &str = "NotebookEdit";
    pub const READ: &str = "Read";
    pub const TASK: &str = "Task";
    pub const WEB_FETCH: &str = "WebFetch";
    pub const WEB_SEARCH: &str = "WebSearch";
}

/// Top-level payload fields consumed by the envelope itself.
/// Everything else on a lifecycle event becomes envelope parameters.
pub mod fields {
    pub const HOOK_EVENT_NAME: &str = "hook_event_name";
    pub const HOOK_TYPE: &str = "hook_type";
    pub const TOOL_NAME: &str = "tool_name";
    pub const TOOL_INPUT: &str = "tool_input";
    pub const TOOL_RESULT: &str = "tool_result";
    pub const TOOL_RESPONSE: &str = "tool_response";
    pub const SESSION_ID: &str = "session_id";
    pub const COMMAND: &str = "command";
}

/// Redaction markers and defaults
pub mod redaction {
    /// Placeholder substituted for any sensitive value
    pub const REDACTED_MARKER: &str = "[REDACTED]";
    /// Appended after a truncated text value
    pub const TRUNCATION_MARKER: &str = "...[truncated]";
    /// Maximum characters kept from a text value
    pub const DEFAULT_TRUNCATE_AT: usize = 200;
}

/// Host permission decision wire values
pub mod decision {
    pub const DENY: &str = "deny";
    /// Prefix for every human-readable denial reason shown to the host
    pub const BLOCKED_PREFIX: &str = "BLOCKED: ";
    /// Reason given when a shell gate payload exceeds the input limit
    pub const OVERSIZED_REASON: &str = "payload too large to inspect";
}

/// Files written under the state directory
pub mod files {
    pub const DEFAULT_STATE_DIR: &str = ".claude";
    pub const AUDIT_LOG: &str = "audit.log";
    pub const METRICS_LOG: &str = "metrics.jsonl";
    pub const NOTIFICATIONS_LOG: &str = "notifications.log";
    pub const SESSION_LOG: &str = "memory/session_log.md";
    pub const ACTIVE_CONTEXT: &str = "memory/active_context.md";
}

/// Configuration Environment Variables
pub mod config {
    /// Optional variables the session-start check reports when present
    pub const OPTIONAL_ENV_VARS: &[&str] = &["OPENAI_API_KEY", "ANTHROPIC_API_KEY"];

    pub const ENV_RULES_PATH: &str = "HOOKWARDEN_RULES_PATH";
    pub const ENV_STATE_DIR: &str = "HOOKWARDEN_STATE_DIR";
    pub const ENV_LOG_LEVEL: &str = "HOOKWARDEN_LOG_LEVEL";
    pub const ENV_LOG_FORMAT: &str = "HOOKWARDEN_LOG_FORMAT";
    pub const ENV_REQUIRED_VARS: &str = "HOOKWARDEN_REQUIRED_ENV";
    pub const ENV_WEBHOOK_URL: &str = "SLACK_WEBHOOK_URL";
    pub const ENV_NOTIFY_ALL: &str = "NOTIFY_ALL";
}

/// Timeouts for the best-effort side channels
pub mod timeouts {
    use std::time::Duration;

    pub const WEBHOOK: Duration = Duration::from_secs(5);
    pub const GIT_BRANCH: Duration = Duration::from_secs(2);
    pub const GIT_STATUS: Duration = Duration::from_secs(3);
}

/// Input limits (DoS protection)
pub mod limits {
    /// Maximum accepted hook payload size (10 MB)
    pub const MAX_PAYLOAD_BYTES: u64 = 10 * 1024 * 1024;
    /// Subagent output longer than this is condensed
    pub const SUBAGENT_CONDENSE_THRESHOLD: usize = 3000;
    /// Target size for condensed subagent output
    pub const SUBAGENT_SUMMARY_MAX: usize = 2000;
    /// Active task text is clipped to this many characters
    pub const ACTIVE_TASK_MAX: usize = 100;
}

/// Cost model used by the usage estimator (USD per 1K tokens)
pub mod pricing {
    pub const COST_PER_1K_INPUT: f64 = 0.015;
    pub const COST_PER_1K_OUTPUT: f64 = 0.075;
    pub const DEFAULT_OUTPUT_TOKENS: u64 = 100;
}
