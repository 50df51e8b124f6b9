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

//! Domain models for hookwarden.
//!
//! This module contains the host wire shapes (what arrives on stdin, what we
//! print on stdout) and the policy decision type. It is free of I/O.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::engine_core::constants::{decision, fields};
use crate::engine_core::errors::HookError;
use crate::engine_core::events::EventKind;

/// Raw hook payload as sent by the host.
///
/// Older hosts send `hook_type` and `tool_result`; newer ones send
/// `hook_event_name` and `tool_response`. Both spellings are accepted.
///
/// Parsing is lenient: only a payload that is not a JSON object is
/// malformed. A scalar where a string is expected is stringified, and any
/// other shape is treated as absent, so an odd `session_id` can never keep a
/// shell command away from the gate.
#[derive(Debug, Clone, Default)]
pub struct HookInput {
    pub hook_event_name: Option<String>,
    pub hook_type: Option<String>,
    pub tool_name: Option<String>,
    pub tool_input: Option<Value>,
    pub tool_result: Option<Value>,
    pub tool_response: Option<Value>,
    pub session_id: Option<String>,
    /// Event-specific fields (`prompt`, `agent_name`, `output`, ...)
    pub extra: Map<String, Value>,
}

impl HookInput {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, HookError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| HookError::MalformedInput(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, HookError> {
        let Value::Object(mut map) = value else {
            return Err(HookError::MalformedInput(
                "payload is not a JSON object".to_string(),
            ));
        };

        Ok(Self {
            hook_event_name: take_text(&mut map, fields::HOOK_EVENT_NAME),
            hook_type: take_text(&mut map, fields::HOOK_TYPE),
            tool_name: take_text(&mut map, fields::TOOL_NAME),
            tool_input: take_present(&mut map, fields::TOOL_INPUT),
            tool_result: take_present(&mut map, fields::TOOL_RESULT),
            tool_response: take_present(&mut map, fields::TOOL_RESPONSE),
            session_id: take_text(&mut map, fields::SESSION_ID),
            extra: map,
        })
    }

    pub fn event_name(&self) -> Option<&str> {
        self.hook_event_name
            .as_deref()
            .or(self.hook_type.as_deref())
    }

    pub fn result(&self) -> Option<&Value> {
        self.tool_result.as_ref().or(self.tool_response.as_ref())
    }

    /// Every plain string value of `key` found in raw, possibly truncated,
    /// JSON bytes. Used only when a payload is too large to parse.
    pub fn sniff_text(raw: &[u8], key: &str) -> Vec<String> {
        let pattern = format!(r#""{}"\s*:\s*"([^"\\]*)""#, regex::escape(key));
        let Ok(re) = regex::bytes::Regex::new(&pattern) else {
            return Vec::new();
        };
        re.captures_iter(raw)
            .filter_map(|caps| caps.get(1))
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
            .collect()
    }
}

fn take_present(map: &mut Map<String, Value>, key: &str) -> Option<Value> {
    map.remove(key).filter(|v| !v.is_null())
}

fn take_text(map: &mut Map<String, Value>, key: &str) -> Option<String> {
    match take_present(map, key)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Identifies which rule produced a policy decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "tier", content = "id", rename_all = "snake_case")]
pub enum RuleId {
    /// Index into the safe-prefix list
    SafePrefix(usize),
    /// Name of the protected file that was referenced
    ProtectedFile(String),
    /// Id of the dangerous pattern that matched
    DangerousPattern(String),
    DefaultAllow,
    EmptyCommand,
    NotShell,
    UnreadableCommand,
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleId::SafePrefix(idx) => write!(f, "safe_prefix:{}", idx),
            RuleId::ProtectedFile(name) => write!(f, "protected_file:{}", name),
            RuleId::DangerousPattern(id) => write!(f, "dangerous:{}", id),
            RuleId::DefaultAllow => f.write_str("default_allow"),
            RuleId::EmptyCommand => f.write_str("empty_command"),
            RuleId::NotShell => f.write_str("not_shell"),
            RuleId::UnreadableCommand => f.write_str("unreadable_command"),
        }
    }
}

/// Result of classifying one proposed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PolicyDecision {
    Allow { rule: RuleId },
    Deny { rule: RuleId, reason: String },
}

impl PolicyDecision {
    pub fn allow(rule: RuleId) -> Self {
        PolicyDecision::Allow { rule }
    }

    pub fn deny(rule: RuleId, reason: impl Into<String>) -> Self {
        PolicyDecision::Deny {
            rule,
            reason: reason.into(),
        }
    }

    pub fn is_allow(&self) -> bool {
        matches!(self, PolicyDecision::Allow { .. })
    }

    pub fn is_deny(&self) -> bool {
        matches!(self, PolicyDecision::Deny { .. })
    }

    pub fn rule(&self) -> &RuleId {
        match self {
            PolicyDecision::Allow { rule } | PolicyDecision::Deny { rule, .. } => rule,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            PolicyDecision::Allow { .. } => None,
            PolicyDecision::Deny { reason, .. } => Some(reason),
        }
    }

}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionOutput {
    pub hook_event_name: String,
    pub permission_decision: &'static str,
    pub permission_decision_reason: String,
}

/// The single JSON object we may print for the host.
///
/// A denial always travels as `Permission`; `Message` is display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HookResponse {
    Permission {
        #[serde(rename = "hookSpecificOutput")]
        output: PermissionOutput,
    },
    Message {
        #[serde(rename = "systemMessage")]
        system_message: String,
    },
}

impl HookResponse {
    pub fn deny(event: EventKind, reason: &str) -> Self {
        HookResponse::Permission {
            output: PermissionOutput {
                hook_event_name: event.host_name().to_string(),
                permission_decision: decision::DENY,
                permission_decision_reason: format!("{}{}", decision::BLOCKED_PREFIX, reason),
            },
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        HookResponse::Message {
            system_message: text.into(),
        }
    }

    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            HookResponse::Permission { output } if output.permission_decision == decision::DENY
        )
    }

    pub fn to_json(&self) -> Result<String, HookError> {
        Ok(serde_json::to_string(self)?)
    }
}
