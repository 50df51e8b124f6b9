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

//! Subagent output condensation.
//!
//! Long subagent reports are reduced to their headline sections so they do
//! not flood the parent agent's context.

use chrono::{DateTime, Utc};

use crate::engine_core::constants::limits::{SUBAGENT_CONDENSE_THRESHOLD, SUBAGENT_SUMMARY_MAX};
use crate::engine_core::events::{EventEnvelope, EventKind};
use crate::utils::time;

const PRIORITY_MARKERS: &[&str] = &[
    "## Summary",
    "### Summary",
    "# Summary",
    "## Files",
    "### Files",
    "# Files",
    "## Created",
    "## Modified",
    "## Changed",
    "## Errors",
    "## Issues",
    "## Blockers",
    "## Next Steps",
    "## Recommendations",
    "APPROVE",
    "REQUEST_CHANGES",
    "NEEDS_DISCUSSION",
];

const TRUNCATED_SUFFIX: &str = "\n\n[Output truncated]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condensed {
    pub agent_name: String,
    pub original_chars: usize,
    pub text: String,
}

impl Condensed {
    pub fn condensed_chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn message(&self) -> String {
        format!(
            "[SubagentStop] {} output condensed from {} to {} chars",
            self.agent_name,
            self.original_chars,
            self.condensed_chars()
        )
    }
}

fn has_marker(line: &str) -> bool {
    PRIORITY_MARKERS.iter().any(|m| line.contains(m))
}

/// Keep priority sections and bullet lines, then clip to `max_chars`.
/// Output already within `max_chars` is returned unchanged.
pub fn condense(output: &str, max_chars: usize) -> String {
    if output.chars().count() <= max_chars {
        return output.to_string();
    }

    let mut kept: Vec<&str> = Vec::new();
    let mut in_priority = false;

    for line in output.split('\n') {
        if has_marker(line) {
            in_priority = true;
            kept.push(line);
        } else if line.starts_with('#') && in_priority {
            // A heading without a marker closes the section and is dropped
            in_priority = false;
        } else if in_priority || line.starts_with("- ") || line.starts_with("* ") {
            kept.push(line);
        }
    }

    let joined = kept.join("\n");
    match joined.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &joined[..cut], TRUNCATED_SUFFIX),
        None => joined,
    }
}

/// Condense a SubagentStop envelope's output when it is over the threshold.
pub fn condense_envelope(envelope: &EventEnvelope) -> Option<Condensed> {
    if envelope.event_kind() != EventKind::SubagentStop {
        return None;
    }
    let output = envelope.parameter_str("output")?;
    let original_chars = output.chars().count();
    if original_chars <= SUBAGENT_CONDENSE_THRESHOLD {
        return None;
    }

    Some(Condensed {
        agent_name: agent_name(envelope).to_string(),
        original_chars,
        text: condense(output, SUBAGENT_SUMMARY_MAX),
    })
}

pub fn agent_name(envelope: &EventEnvelope) -> &str {
    envelope.parameter_str("agent_name").unwrap_or("unknown")
}

/// Session log line recording that a subagent finished.
pub fn completion_entry(agent_name: &str, at: DateTime<Utc>) -> String {
    format!(
        "- [{}] Subagent `{}` completed",
        time::clock_stamp(at),
        agent_name
    )
}
