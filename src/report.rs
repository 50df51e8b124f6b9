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

//! Usage summary over `metrics.jsonl`.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::path::Path;
use tracing::debug;

use crate::engine_core::constants::tools;
use crate::engine_core::errors::HookError;
use crate::sinks::metrics::MetricRecord;

const TOP_TOOLS: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    Today,
    Week,
}

impl Period {
    pub fn label(&self) -> &'static str {
        match self {
            Period::All => "all",
            Period::Today => "today",
            Period::Week => "last 7 days",
        }
    }

    /// Earliest timestamp included, relative to `now`.
    pub fn since(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            Period::All => None,
            Period::Today => {
                let local = now.with_timezone(&Local).date_naive();
                let midnight = local.and_hms_opt(0, 0, 0)?;
                Local
                    .from_local_datetime(&midnight)
                    .earliest()
                    .map(|dt| dt.with_timezone(&Utc))
            }
            Period::Week => Some(now - Duration::days(7)),
        }
    }
}

/// Read metric records, skipping lines that do not parse.
pub fn load_metrics(
    path: &Path,
    since: Option<DateTime<Utc>>,
) -> Result<Vec<MetricRecord>, HookError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: MetricRecord = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                debug!(line = idx + 1, error = %e, "Skipping unreadable metric line");
                continue;
            }
        };
        if let Some(since) = since {
            match DateTime::parse_from_rfc3339(&record.timestamp) {
                Ok(ts) if ts.with_timezone(&Utc) >= since => {}
                _ => continue,
            }
        }
        records.push(record);
    }
    Ok(records)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_tool_calls: usize,
    pub unique_sessions: usize,
    pub subagents_spawned: usize,
    pub total_estimated_tokens: u64,
    pub total_estimated_cost: f64,
    /// Most frequent first; ties keep first-seen order
    pub tools_by_frequency: Vec<(String, usize)>,
}

/// `None` when there is nothing to summarize.
pub fn summarize(records: &[MetricRecord]) -> Option<Summary> {
    if records.is_empty() {
        return None;
    }

    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut sessions: HashSet<&str> = HashSet::new();
    let mut subagents = 0;

    for r in records {
        match index.get(r.tool.as_str()) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(r.tool.as_str(), order.len());
                order.push((r.tool.clone(), 1));
            }
        }
        if !r.session_id.is_empty() {
            sessions.insert(r.session_id.as_str());
        }
        if r.tool == tools::TASK {
            subagents += 1;
        }
    }
    order.sort_by(|a, b| b.1.cmp(&a.1));

    Some(Summary {
        total_tool_calls: records.len(),
        unique_sessions: sessions.len(),
        subagents_spawned: subagents,
        total_estimated_tokens: records.iter().map(|r| r.estimated_tokens).sum(),
        total_estimated_cost: records.iter().map(|r| r.estimated_cost_usd).sum(),
        tools_by_frequency: order,
    })
}

fn thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Plain-text report for the terminal.
pub fn render(summary: Option<&Summary>, period: Period) -> String {
    let Some(s) = summary else {
        return "Error: No metrics found\n".to_string();
    };

    let rule = "=".repeat(50);
    let mut out = String::new();
    let _ = writeln!(out, "\n{}", rule);
    let _ = writeln!(out, "HOOKWARDEN METRICS SUMMARY ({})", period.label());
    let _ = writeln!(out, "{}\n", rule);

    let _ = writeln!(out, "Total Tool Calls:      {}", thousands(s.total_tool_calls as u64));
    let _ = writeln!(out, "Unique Sessions:       {}", s.unique_sessions);
    let _ = writeln!(out, "Subagents Spawned:     {}", s.subagents_spawned);
    let _ = writeln!(out, "Estimated Tokens:      {}", thousands(s.total_estimated_tokens));
    let _ = writeln!(out, "Estimated Cost:        ${:.4}", s.total_estimated_cost);

    let _ = writeln!(out, "\n{:30} {:>10}", "Tool Usage", "Count");
    let _ = writeln!(out, "{}", "-".repeat(42));
    for (tool, count) in s.tools_by_frequency.iter().take(TOP_TOOLS) {
        let _ = writeln!(out, "{:30} {:>10}", tool, thousands(*count as u64));
    }
    let _ = writeln!(out, "\n{}", rule);
    out
}
