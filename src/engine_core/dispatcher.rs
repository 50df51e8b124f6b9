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

//! Decision Dispatcher.
//!
//! Turns one hook payload into an envelope, runs the policy engine where it
//! applies, and produces the record every downstream stage consumes. It does
//! not know about stdio, files or the network; the binary wires it to those.
//!
//! Routing:
//!
//! | event | policy | response |
//! |---|---|---|
//! | PreAction / shell | `classify` | permission denial on Deny |
//! | PreAction / other | allow | none |
//! | PostAction | none | none |
//! | SubagentStop | none | condensation message, if any |
//! | other lifecycle | none | none (advisors may add one) |
//!
//! Whatever leaves this module in a [`DispatchRecord`] is already redacted.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::advisors::subagent;
use crate::engine::rules::CompiledRules;
use crate::engine::usage::UsageEstimate;
use crate::engine_core::constants::{decision, fields, tools};
use crate::engine_core::errors::HookError;
use crate::engine_core::events::{CommandField, EventEnvelope, EventKind};
use crate::engine_core::models::{HookInput, HookResponse, PolicyDecision, RuleId};
use crate::utils::security::fingerprint;

/// Everything one invocation produced.
#[derive(Debug, Clone)]
pub struct DispatchRecord {
    /// Redacted envelope; the only form sinks ever see. A denied command is
    /// masked here too
    pub envelope: EventEnvelope,
    pub decision: PolicyDecision,
    /// SHA-256 of the denied command, so repeat offenders can be
    /// correlated without storing the command text
    pub command_fingerprint: Option<String>,
    pub usage: Option<UsageEstimate>,
    pub response: Option<HookResponse>,
}

impl DispatchRecord {
    pub fn is_denied(&self) -> bool {
        self.decision.is_deny()
    }
}

pub struct Dispatcher {
    rules: Arc<CompiledRules>,
}

impl Dispatcher {
    pub fn new(rules: Arc<CompiledRules>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &CompiledRules {
        &self.rules
    }

    /// Parse raw stdin bytes and dispatch.
    pub fn dispatch_bytes(
        &self,
        bytes: &[u8],
        override_kind: Option<EventKind>,
    ) -> Result<DispatchRecord, HookError> {
        let input = HookInput::from_slice(bytes)?;
        self.dispatch(input, override_kind, Utc::now())
    }

    /// Response for a payload too large to parse, judged from the readable
    /// prefix. A shell gate, or one that cannot be ruled out, is denied.
    pub fn oversized(prefix: &[u8], override_kind: Option<EventKind>) -> Option<HookResponse> {
        let kind = override_kind.or_else(|| {
            [fields::HOOK_EVENT_NAME, fields::HOOK_TYPE]
                .iter()
                .flat_map(|key| HookInput::sniff_text(prefix, key))
                .find_map(|name| name.parse::<EventKind>().ok())
        });
        let tool_names = HookInput::sniff_text(prefix, fields::TOOL_NAME);
        let maybe_shell = tool_names.is_empty() || tool_names.iter().any(|t| t == tools::BASH);

        match kind {
            Some(EventKind::PreAction) | None if maybe_shell => {
                warn!(bytes = prefix.len(), "Denying shell gate payload too large to inspect");
                Some(HookResponse::deny(EventKind::PreAction, decision::OVERSIZED_REASON))
            }
            _ => None,
        }
    }

    /// Primary entry point. Synchronous: nothing on the decision path awaits.
    pub fn dispatch(
        &self,
        input: HookInput,
        override_kind: Option<EventKind>,
        received_at: DateTime<Utc>,
    ) -> Result<DispatchRecord, HookError> {
        let envelope = EventEnvelope::from_input(input, override_kind, received_at)?;
        debug!(
            event = %envelope.event_kind(),
            tool = envelope.tool_name().unwrap_or("-"),
            "Dispatching event"
        );

        let (decision, response) = match envelope.event_kind() {
            EventKind::PreAction => {
                let decision = self.rules.evaluator.evaluate(&envelope);
                let response = decision
                    .reason()
                    .map(|reason| HookResponse::deny(EventKind::PreAction, reason));
                (decision, response)
            }
            EventKind::SubagentStop => (
                PolicyDecision::allow(RuleId::NotShell),
                subagent::condense_envelope(&envelope).map(|c| HookResponse::message(c.message())),
            ),
            _ => (PolicyDecision::allow(RuleId::NotShell), None),
        };

        let command_fingerprint = match (&decision, envelope.command()) {
            (PolicyDecision::Deny { .. }, CommandField::Text(command)) => {
                Some(fingerprint(command))
            }
            _ => None,
        };
        if let PolicyDecision::Deny { rule, .. } = &decision {
            info!(
                rule = %rule,
                session = envelope.session_id(),
                fingerprint = command_fingerprint.as_deref().unwrap_or("-"),
                "Blocked shell command"
            );
        }

        // Usage is measured on the raw parameters; only the numbers survive
        let usage = match envelope.event_kind() {
            EventKind::PostAction => UsageEstimate::from_envelope(&envelope),
            _ => None,
        };

        let mut redacted = envelope.redacted(&self.rules.redactor);
        if decision.is_deny() {
            redacted = redacted.with_command_masked();
        }

        Ok(DispatchRecord {
            envelope: redacted,
            decision,
            command_fingerprint,
            usage,
            response,
        })
    }
}
