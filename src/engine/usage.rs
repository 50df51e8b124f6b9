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

//! Rough token and cost estimates per completed action.
//!
//! The numbers are heuristics derived from parameter sizes. They are meant
//! for trend reports, not billing.

use serde::Serialize;
use serde_json::Value;

use crate::engine_core::constants::pricing::{
    COST_PER_1K_INPUT, COST_PER_1K_OUTPUT, DEFAULT_OUTPUT_TOKENS,
};
use crate::engine_core::constants::tools;
use crate::engine_core::events::EventEnvelope;

const FALLBACK_TOKENS: u64 = 50;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsageEstimate {
    pub tool: String,
    pub estimated_tokens: u64,
    pub estimated_cost_usd: f64,
    /// Only set for sub-task spawns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subagent_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl UsageEstimate {
    /// Estimate for an action envelope. Lifecycle envelopes yield `None`.
    pub fn from_envelope(envelope: &EventEnvelope) -> Option<Self> {
        let tool = envelope.tool_name()?;
        let params = envelope.parameters();
        let estimated_tokens = estimate_tokens(tool, params);

        let (subagent_type, model) = if tool == tools::TASK {
            (
                Some(envelope.parameter_str("subagent_type").unwrap_or("").to_string()),
                Some(envelope.parameter_str("model").unwrap_or("default").to_string()),
            )
        } else {
            (None, None)
        };

        Some(Self {
            tool: tool.to_string(),
            estimated_tokens,
            estimated_cost_usd: estimate_cost(estimated_tokens, DEFAULT_OUTPUT_TOKENS),
            subagent_type,
            model,
        })
    }
}

/// Character length of a string parameter. Absent counts as empty;
/// a non-text value makes the whole estimate fall back.
fn text_len(params: &Value, key: &str) -> Option<f64> {
    match params.get(key) {
        None | Some(Value::Null) => Some(0.0),
        Some(Value::String(s)) => Some(s.chars().count() as f64),
        Some(_) => None,
    }
}

pub fn estimate_tokens(tool: &str, params: &Value) -> u64 {
    let estimate = match tool {
        tools::READ => text_len(params, "file_path").map(|n| n * 0.5),
        tools::WRITE => text_len(params, "content").map(|n| n * 0.3),
        tools::EDIT => text_len(params, "old_string")
            .zip(text_len(params, "new_string"))
            .map(|(a, b)| (a + b) * 0.3),
        tools::BASH => text_len(params, "command").map(|n| n * 0.5 + 100.0),
        "Grep" => text_len(params, "pattern").map(|n| 50.0 + n * 2.0),
        "Glob" => Some(30.0),
        tools::TASK => Some(500.0),
        tools::WEB_FETCH => Some(200.0),
        tools::WEB_SEARCH => Some(150.0),
        _ => None,
    };
    estimate.map_or(FALLBACK_TOKENS, |t| t as u64)
}

/// USD cost rounded to six decimals.
pub fn estimate_cost(input_tokens: u64, output_tokens: u64) -> f64 {
    let cost = (input_tokens as f64 / 1000.0) * COST_PER_1K_INPUT
        + (output_tokens as f64 / 1000.0) * COST_PER_1K_OUTPUT;
    (cost * 1_000_000.0).round() / 1_000_000.0
}
