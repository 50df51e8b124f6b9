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

//! Pattern matching for the three classification tiers.
//!
//! All matching is case-insensitive. Regexes come from the `regex` crate,
//! which guarantees linear-time matching, so evaluation stays bounded by
//! the command length and the number of rules.

use regex::{Regex, RegexBuilder};

use crate::engine::rules::DangerousPattern;
use crate::engine_core::errors::HookError;

/// A protected file name with its pre-lowered search forms.
#[derive(Debug, Clone)]
struct ProtectedName {
    name: String,
    lowered: String,
    lowered_backslash: String,
}

/// A compiled entry of the dangerous-pattern tier.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub id: String,
    pub description: String,
    regex: Regex,
}

#[derive(Debug, Clone)]
pub struct PatternMatcher {
    safe_prefixes: Vec<Regex>,
    protected: Vec<ProtectedName>,
    dangerous: Vec<CompiledPattern>,
}

impl PatternMatcher {
    pub fn compile(
        safe_prefixes: &[String],
        protected_files: &[String],
        dangerous: &[DangerousPattern],
    ) -> Result<Self, HookError> {
        let safe_prefixes = safe_prefixes
            .iter()
            .enumerate()
            .map(|(idx, p)| {
                // Safe prefixes only ever match at the start of the command,
                // including every branch of an alternation
                let anchored = format!("^(?:{})", p.strip_prefix('^').unwrap_or(p.as_str()));
                build_regex(&format!("safe_prefix:{}", idx), &anchored)
            })
            .collect::<Result<Vec<_>, _>>()?;

        let protected = protected_files
            .iter()
            .map(|name| {
                let lowered = name.to_lowercase();
                ProtectedName {
                    name: name.clone(),
                    lowered_backslash: lowered.replace('/', "\\"),
                    lowered,
                }
            })
            .collect();

        let dangerous = dangerous
            .iter()
            .map(|d| {
                Ok(CompiledPattern {
                    id: d.id.clone(),
                    description: d.description.clone(),
                    regex: build_regex(&d.id, &d.pattern)?,
                })
            })
            .collect::<Result<Vec<_>, HookError>>()?;

        Ok(Self {
            safe_prefixes,
            protected,
            dangerous,
        })
    }

    /// Index of the first safe prefix matching the (already trimmed) command.
    pub fn first_safe_prefix(&self, command: &str) -> Option<usize> {
        self.safe_prefixes.iter().position(|re| re.is_match(command))
    }

    /// Name of the first protected file the command refers to.
    pub fn first_protected(&self, command: &str) -> Option<&str> {
        let lowered = command.to_lowercase();
        self.protected
            .iter()
            .find(|p| lowered.contains(&p.lowered) || lowered.contains(&p.lowered_backslash))
            .map(|p| p.name.as_str())
    }

    /// First dangerous pattern matching anywhere in the command.
    pub fn first_dangerous(&self, command: &str) -> Option<&CompiledPattern> {
        self.dangerous.iter().find(|p| p.regex.is_match(command))
    }
}

fn build_regex(id: &str, pattern: &str) -> Result<Regex, HookError> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|e| HookError::InvalidPattern {
            id: id.to_string(),
            reason: e.to_string(),
        })
}
