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

//! Persistence and transmission of dispatch records.
//!
//! Every sink is best-effort. A failing sink is logged and skipped; it can
//! never change a decision that was already written to the host.

pub mod audit;
pub mod metrics;
pub mod notify;

use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::Config;
use crate::engine_core::dispatcher::DispatchRecord;
use crate::engine_core::errors::HookError;
use crate::engine_core::traits::Sink;

/// Fan-out over a fixed list of sinks.
pub struct SinkSet {
    sinks: Vec<Box<dyn Sink>>,
}

impl SinkSet {
    pub fn new(sinks: Vec<Box<dyn Sink>>) -> Self {
        Self { sinks }
    }

    /// Audit, metrics and notification sinks wired from configuration.
    pub fn from_config(config: &Config) -> Result<Self, HookError> {
        Ok(Self::new(vec![
            Box::new(audit::AuditSink::new(config.audit_log_path())),
            Box::new(metrics::MetricsSink::new(config.metrics_log_path())),
            Box::new(notify::NotifySink::from_config(config)?),
        ]))
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Hand the record to every sink. Returns how many failed.
    pub async fn record_all(&self, record: &DispatchRecord) -> usize {
        let mut failures = 0;
        for sink in &self.sinks {
            match sink.record(record).await {
                Ok(()) => debug!(sink = sink.name(), "Recorded event"),
                Err(e) => {
                    failures += 1;
                    warn!(sink = sink.name(), error = %e, "Sink failed, event dropped");
                }
            }
        }
        failures
    }
}

/// Append one line to `path`, creating parent directories as needed.
///
/// The line is written with a single `write_all` on a file opened in append
/// mode, so concurrent hook processes never interleave partial lines.
pub async fn append_line(path: &Path, line: String) -> Result<(), HookError> {
    let path: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || append_line_blocking(&path, &line))
        .await
        .map_err(|e| HookError::sink("append", e))?
}

fn append_line_blocking(path: &Path, line: &str) -> Result<(), HookError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut buf = String::with_capacity(line.len() + 1);
    buf.push_str(line);
    buf.push('\n');

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(buf.as_bytes())?;
    Ok(())
}
