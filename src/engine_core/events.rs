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

//! Event envelope.
//!
//! The envelope is the single record every stage of the pipeline reads:
//! the policy engine, the redactor, the sinks and the advisors. It is
//! decoupled from the host's wire format (see [`crate::engine_core::models`]).
//!
//! Envelopes are immutable. Modified copies come only from
//! [`EventEnvelope::redacted`], which sanitizes parameters and outcome, and
//! [`EventEnvelope::with_command_masked`], which hides the command text of a
//! denied action. Kind, session and timestamp are always carried over.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

use crate::engine::redactor::Redactor;
use crate::engine_core::constants::redaction::REDACTED_MARKER;
use crate::engine_core::constants::{events, fields, tools};
use crate::engine_core::errors::HookError;
use crate::engine_core::models::HookInput;

/// Lifecycle point at which the host invoked us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    PreAction,
    PostAction,
    SessionStart,
    SessionStop,
    SubagentStop,
    PromptSubmit,
}

impl EventKind {
    /// Event name the host uses for this kind.
    pub fn host_name(&self) -> &'static str {
        match self {
            EventKind::PreAction => events::PRE_TOOL_USE,
            EventKind::PostAction => events::POST_TOOL_USE,
            EventKind::SessionStart => events::SESSION_START,
            EventKind::SessionStop => events::STOP,
            EventKind::SubagentStop => events::SUBAGENT_STOP,
            EventKind::PromptSubmit => events::USER_PROMPT_SUBMIT,
        }
    }

    /// Whether envelopes of this kind describe a tool action.
    pub fn carries_action(&self) -> bool {
        matches!(self, EventKind::PreAction | EventKind::PostAction)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_name())
    }
}

impl FromStr for EventKind {
    type Err = HookError;

    /// Accepts host names (`PreToolUse`) as well as kebab/snake spellings
    /// (`pre-tool-use`, `pre_action`), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "pretooluse" | "preaction" => Ok(EventKind::PreAction),
            "posttooluse" | "postaction" => Ok(EventKind::PostAction),
            "sessionstart" => Ok(EventKind::SessionStart),
            "stop" | "sessionstop" => Ok(EventKind::SessionStop),
            "subagentstop" => Ok(EventKind::SubagentStop),
            "userpromptsubmit" | "promptsubmit" => Ok(EventKind::PromptSubmit),
            _ => Err(HookError::MalformedInput(format!(
                "unknown event kind '{}'",
                s
            ))),
        }
    }
}

/// Category of the executor the agent is trying to use.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ActionKind {
    ShellExecute,
    FileWrite,
    FileEdit,
    FileRead,
    SubtaskSpawn,
    NetworkFetch,
    Other(String),
}

impl ActionKind {
    pub fn from_tool_name(tool_name: &str) -> Self {
        match tool_name {
            tools::BASH => ActionKind::ShellExecute,
            tools::WRITE => ActionKind::FileWrite,
            tools::EDIT | tools::MULTI_EDIT | tools::NOTEBOOK_EDIT => ActionKind::FileEdit,
            tools::READ => ActionKind::FileRead,
            tools::TASK => ActionKind::SubtaskSpawn,
            tools::WEB_FETCH | tools::WEB_SEARCH => ActionKind::NetworkFetch,
            other => ActionKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ActionKind::ShellExecute => "shell-execute",
            ActionKind::FileWrite => "file-write",
            ActionKind::FileEdit => "file-edit",
            ActionKind::FileRead => "file-read",
            ActionKind::SubtaskSpawn => "subtask-spawn",
            ActionKind::NetworkFetch => "network-fetch",
            ActionKind::Other(name) => name.as_str(),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result descriptor attached to a PostAction envelope.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Outcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub result: Value,
}

impl Outcome {
    /// An object result fails if it has an `error` key or mentions `Error`
    /// anywhere in its text. Non-object results count as success.
    pub fn from_result(result: Value) -> Self {
        let (success, error) = match &result {
            Value::Object(map) => {
                let error = map.get("error").map(|e| match e {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                });
                let mentions_error = result.to_string().contains("Error");
                (error.is_none() && !mentions_error, error)
            }
            _ => (true, None),
        };

        Self {
            success,
            error,
            result,
        }
    }
}

/// How the `command` parameter of a shell action looks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandField<'a> {
    /// No command parameter at all; nothing will be executed.
    Missing,
    Text(&'a str),
    /// Present but not a plain string, or parameters are not a mapping.
    Unreadable,
}

/// One intercepted action attempt or lifecycle event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventEnvelope {
    event_kind: EventKind,
    action_kind: Option<ActionKind>,
    tool_name: Option<String>,
    parameters: Value,
    outcome: Option<Outcome>,
    session_id: String,
    timestamp: DateTime<Utc>,
}

impl EventEnvelope {
    /// Build an envelope from a parsed hook payload.
    ///
    /// `override_kind` wins over the payload's event name (the host may be
    /// configured to call us per event). `received_at` is the dispatcher's
    /// clock; any timestamp inside the payload is ignored.
    pub fn from_input(
        input: HookInput,
        override_kind: Option<EventKind>,
        received_at: DateTime<Utc>,
    ) -> Result<Self, HookError> {
        let event_kind = match override_kind {
            Some(kind) => kind,
            None => input
                .event_name()
                .ok_or_else(|| HookError::MalformedInput("missing event name".to_string()))?
                .parse::<EventKind>()?,
        };

        let session_id = input.session_id.clone().unwrap_or_default();

        if !event_kind.carries_action() {
            return Ok(Self {
                event_kind,
                action_kind: None,
                tool_name: None,
                parameters: Value::Object(input.extra),
                outcome: None,
                session_id,
                timestamp: received_at,
            });
        }

        let tool_name = input
            .tool_name
            .clone()
            .unwrap_or_else(|| "unknown".to_string());
        let outcome = match event_kind {
            EventKind::PostAction => input.result().cloned().map(Outcome::from_result),
            _ => None,
        };

        Ok(Self {
            event_kind,
            action_kind: Some(ActionKind::from_tool_name(&tool_name)),
            tool_name: Some(tool_name),
            parameters: input.tool_input.unwrap_or_else(|| Value::Object(Map::new())),
            outcome,
            session_id,
            timestamp: received_at,
        })
    }

    pub fn event_kind(&self) -> EventKind {
        self.event_kind
    }

    pub fn action_kind(&self) -> Option<&ActionKind> {
        self.action_kind.as_ref()
    }

    pub fn tool_name(&self) -> Option<&str> {
        self.tool_name.as_deref()
    }

    pub fn parameters(&self) -> &Value {
        &self.parameters
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Whether this is the pre-execution gate for a shell command.
    pub fn is_shell_gate(&self) -> bool {
        self.event_kind == EventKind::PreAction
            && self.action_kind == Some(ActionKind::ShellExecute)
    }

    /// Look up a string parameter.
    pub fn parameter_str(&self, key: &str) -> Option<&str> {
        self.parameters.get(key).and_then(Value::as_str)
    }

    /// The `command` parameter, as the policy engine sees it.
    pub fn command(&self) -> CommandField<'_> {
        let Value::Object(map) = &self.parameters else {
            return CommandField::Unreadable;
        };
        match map.get(fields::COMMAND) {
            None | Some(Value::Null) => CommandField::Missing,
            Some(Value::String(s)) => CommandField::Text(s),
            Some(_) => CommandField::Unreadable,
        }
    }

    /// Same envelope with parameters and outcome passed through the redactor.
    pub fn redacted(&self, redactor: &Redactor) -> Self {
        Self {
            event_kind: self.event_kind,
            action_kind: self.action_kind.clone(),
            tool_name: self.tool_name.clone(),
            parameters: redactor.redact(&self.parameters),
            outcome: self.outcome.as_ref().map(|o| Outcome {
                success: o.success,
                error: o.error.as_deref().map(|e| redactor.truncate_text(e)),
                result: redactor.redact(&o.result),
            }),
            session_id: self.session_id.clone(),
            timestamp: self.timestamp,
        }
    }

    /// Same envelope with the `command` parameter replaced by the redaction
    /// marker. A blocked command may carry the very secret it was blocked for.
    pub fn with_command_masked(&self) -> Self {
        let mut masked = self.clone();
        if let Value::Object(map) = &mut masked.parameters {
            if let Some(command) = map.get_mut(fields::COMMAND) {
                *command = Value::String(REDACTED_MARKER.to_string());
            }
        }
        masked
    }
}
