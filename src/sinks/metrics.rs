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
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::engine_core::dispatcher::DispatchRecord;
use crate::engine_core::errors::HookError;
use crate::engine_core::traits::Sink;
use crate::sinks::append_line;
use crate::utils::time;

/// One line of `metrics.jsonl`. Also read back by the summary report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub timestamp: String,
    /// First 8 characters of the session id
    #[serde(default)]
    pub session_id: String,
    pub tool: String,
    #[serde(default)]
    pub estimated_tokens: u64,
    #[serde(default)]
    pub estimated_cost_usd: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subagent_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl MetricRecord {
    /// Only completed actions carry a usage estimate.
    pub fn from_record(record: &DispatchRecord) -> Option<Self> {
        let usage = record.usage.as_ref()?;
        let envelope = &record.envelope;

        Some(Self {
            timestamp: time::rfc3339(envelope.timestamp()),
            session_id: envelope.session_id().chars().take(8).collect(),
            tool: usage.tool.clone(),
            estimated_tokens: usage.estimated_tokens,
            estimated_cost_usd: usage.estimated_cost_usd,
            subagent_type: usage.subagent_type.clone(),
            model: usage.model.clone(),
        })
    }
}

pub struct MetricsSink {
    path: PathBuf,
}

impl MetricsSink {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl Sink for MetricsSink {
    fn name(&self) -> &'static str {
        "metrics"
    }

    async fn record(&self, record: &DispatchRecord) -> Result<(), HookError> {
        let Some(metric) = MetricRecord::from_record(record) else {
            return Ok(());
        };
        let line = serde_json::to_string(&metric)?;
        append_line(&self.path, line)
            .await
            .map_err(|e| HookError::sink(self.name(), e))
    }
}
