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

//! Session start environment check.

use chrono::{DateTime, Utc};
use std::fmt::Write;

use crate::engine_core::constants::config::OPTIONAL_ENV_VARS;
use crate::utils::time;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvStatus {
    pub name: String,
    pub set: bool,
    pub required: bool,
}

/// Which of the interesting environment variables are present.
/// Values are never read beyond an emptiness check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentReport {
    pub vars: Vec<EnvStatus>,
}

impl EnvironmentReport {
    /// Required variables are always listed; optional ones only when set.
    pub fn check<F>(required: &[String], lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_set = |name: &str| lookup(name).is_some_and(|v| !v.is_empty());

        let mut vars: Vec<EnvStatus> = required
            .iter()
            .map(|name| EnvStatus {
                name: name.clone(),
                set: is_set(name.as_str()),
                required: true,
            })
            .collect();

        vars.extend(
            OPTIONAL_ENV_VARS
                .iter()
                .filter(|name| is_set(**name))
                .map(|name| EnvStatus {
                    name: name.to_string(),
                    set: true,
                    required: false,
                }),
        );

        Self { vars }
    }

    pub fn from_env(required: &[String]) -> Self {
        Self::check(required, |name| std::env::var(name).ok())
    }

    pub fn missing(&self) -> impl Iterator<Item = &str> {
        self.vars
            .iter()
            .filter(|v| v.required && !v.set)
            .map(|v| v.name.as_str())
    }

    pub fn message(&self) -> String {
        let warnings: Vec<String> = self
            .missing()
            .map(|name| format!("Missing env var: {}", name))
            .collect();

        if warnings.is_empty() {
            "startup hook success: Success".to_string()
        } else {
            format!("[Session Init] Warnings: {}", warnings.join("; "))
        }
    }

    /// Markdown block appended to the session log.
    pub fn log_entry(
        &self,
        session_id: &str,
        at: DateTime<Utc>,
        branch: Option<&str>,
        uncommitted: usize,
    ) -> String {
        let short: String = session_id.chars().take(8).collect();
        let mut entry = format!("\n## Session {} - {}\n\n**Environment:**\n", short, time::log_stamp(at));
        for var in &self.vars {
            let (icon, state) = if var.set { ("Y", "set") } else { ("X", "MISSING") };
            let _ = writeln!(entry, "- {} {}: {}", icon, var.name, state);
        }
        let _ = write!(
            entry,
            "\n**Git:** {} ({} uncommitted)\n\n---",
            branch.unwrap_or("unknown"),
            uncommitted
        );
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn report(vars: &[(&str, &str)], required: &[&str]) -> EnvironmentReport {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let required: Vec<String> = required.iter().map(|s| s.to_string()).collect();
        EnvironmentReport::check(&required, |k| env.get(k).cloned())
    }

    #[test]
    fn test_missing_required_var_warns() {
        let r = report(&[], &["GITHUB_TOKEN"]);
        assert_eq!(r.message(), "[Session Init] Warnings: Missing env var: GITHUB_TOKEN");
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let r = report(&[("GITHUB_TOKEN", "")], &["GITHUB_TOKEN", "NPM_TOKEN"]);
        assert_eq!(
            r.message(),
            "[Session Init] Warnings: Missing env var: GITHUB_TOKEN; Missing env var: NPM_TOKEN"
        );
    }

    #[test]
    fn test_all_present_reports_success() {
        let r = report(
            &[("GITHUB_TOKEN", "ghp_x"), ("ANTHROPIC_API_KEY", "k")],
            &["GITHUB_TOKEN"],
        );
        assert_eq!(r.message(), "startup hook success: Success");
        assert_eq!(r.vars.len(), 2);
        assert!(r.vars.iter().all(|v| v.set));
    }

    #[test]
    fn test_log_entry_never_contains_values() {
        let r = report(&[("GITHUB_TOKEN", "ghp_secret")], &["GITHUB_TOKEN", "OTHER"]);
        let entry = r.log_entry("abcdef1234", Utc::now(), Some("main"), 3);
        assert!(entry.starts_with("\n## Session abcdef12 - "));
        assert!(entry.contains("- Y GITHUB_TOKEN: set\n"));
        assert!(entry.contains("- X OTHER: MISSING\n"));
        assert!(entry.ends_with("**Git:** main (3 uncommitted)\n\n---"));
        assert!(!entry.contains("ghp_secret"));
    }
}
