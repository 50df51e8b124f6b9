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

use crate::engine::rules::{CompiledRules, RuleSet};
use crate::engine_core::constants::{config as keys, files};
use crate::engine_core::errors::HookError;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::warn;

const DEFAULT_REQUIRED_ENV: &[&str] = &["GITHUB_TOKEN"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub rules_path: Option<PathBuf>,
    /// Directory holding the audit, metrics and notification logs
    pub state_dir: PathBuf,
    pub log_level: String,
    pub log_format: String, // "json" or "text"
    pub webhook_url: Option<String>,
    /// Send every notification to the webhook, not only HIGH ones
    pub notify_all: bool,
    /// Variables the session-start check reports as missing
    pub required_env: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, HookError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, HookError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let log_format = get(keys::ENV_LOG_FORMAT).unwrap_or_else(|| "text".to_string());
        if log_format != "json" && log_format != "text" {
            return Err(HookError::ConfigurationError(format!(
                "{} must be 'json' or 'text', got '{}'",
                keys::ENV_LOG_FORMAT,
                log_format
            )));
        }

        Ok(Self {
            rules_path: get(keys::ENV_RULES_PATH).map(PathBuf::from),
            state_dir: get(keys::ENV_STATE_DIR)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(files::DEFAULT_STATE_DIR)),
            log_level: get(keys::ENV_LOG_LEVEL).unwrap_or_else(|| "warn".to_string()),
            log_format,
            webhook_url: get(keys::ENV_WEBHOOK_URL),
            notify_all: get(keys::ENV_NOTIFY_ALL)
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            required_env: get(keys::ENV_REQUIRED_VARS)
                .map(|s| {
                    s.split(',')
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| DEFAULT_REQUIRED_ENV.iter().map(|s| s.to_string()).collect()),
        })
    }

    pub fn audit_log_path(&self) -> PathBuf {
        self.state_dir.join(files::AUDIT_LOG)
    }

    pub fn metrics_log_path(&self) -> PathBuf {
        self.state_dir.join(files::METRICS_LOG)
    }

    pub fn notifications_log_path(&self) -> PathBuf {
        self.state_dir.join(files::NOTIFICATIONS_LOG)
    }

    pub fn session_log_path(&self) -> PathBuf {
        self.state_dir.join(files::SESSION_LOG)
    }

    pub fn active_context_path(&self) -> PathBuf {
        self.state_dir.join(files::ACTIVE_CONTEXT)
    }

    /// Compile the configured rule set. A missing or broken rules file is
    /// logged and replaced by the built-in rules so the gate stays up.
    pub fn load_rules(&self) -> Result<CompiledRules, HookError> {
        if let Some(path) = &self.rules_path {
            match RuleSet::load(path).and_then(|rules| rules.compile()) {
                Ok(compiled) => return Ok(compiled),
                Err(e) => warn!(
                    path = %path.display(),
                    error = %e,
                    "Rule set rejected, falling back to built-in rules"
                ),
            }
        }
        CompiledRules::builtin()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rules_path: None,
            state_dir: PathBuf::from(files::DEFAULT_STATE_DIR),
            log_level: "warn".to_string(),
            log_format: "text".to_string(),
            webhook_url: None,
            notify_all: false,
            required_env: DEFAULT_REQUIRED_ENV.iter().map(|s| s.to_string()).collect(),
        }
    }
}
