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

//! Rule set definition and compilation.
//!
//! A [`RuleSet`] is plain data: it can come from the built-in defaults or
//! from a YAML file. [`CompiledRules`] is what the engines run on; it is
//! built once at startup and never mutated afterwards.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::engine::evaluator::PolicyEvaluator;
use crate::engine::pattern_matcher::PatternMatcher;
use crate::engine::redactor::Redactor;
use crate::engine_core::constants::redaction;
use crate::engine_core::errors::HookError;
use crate::utils::policy_validator::PolicyValidator;

const DEFAULT_SAFE_PREFIXES: &[&str] = &[
    r"^npm\s+(install|i|ci|run|test|build)",
    r"^npx\s+",
    r"^yarn\s+(install|add|remove|run)",
    r"^pip\s+install",
    r"^git\s+(status|log|diff|branch|checkout|fetch|pull|add|commit)",
    r"^node\s+",
    r"^tsc\s+",
    r"^eslint\s+",
    r"^prettier\s+",
];

const DEFAULT_PROTECTED_FILES: &[&str] = &[".env", ".env.local", ".env.production"];

const RECURSIVE_DELETE: &str = "unscoped recursive delete";
const HISTORY_DESTRUCTIVE: &str = "history-destructive version control operation";

// (id, description, pattern); evaluated in this order
const DEFAULT_DANGEROUS_PATTERNS: &[(&str, &str, &str)] = &[
    ("recursive_delete_root", RECURSIVE_DELETE, r"rm\s+(-rf|-fr|--recursive)\s+[/\\]"),
    ("recursive_delete_wildcard", RECURSIVE_DELETE, r"rm\s+(-rf|-fr|--recursive)\s+\*"),
    ("windows_recursive_delete", RECURSIVE_DELETE, r"del\s+/s\s+/q\s+c:\\"),
    ("windows_rmdir_tree", RECURSIVE_DELETE, r"rmdir\s+/s\s+/q"),
    ("powershell_recursive_remove", RECURSIVE_DELETE, r"Remove-Item\s+.*-Recurse\s+.*-Force"),
    (
        "force_push_protected_branch",
        HISTORY_DESTRUCTIVE,
        r"git\s+push\b.*\s(-f|--force)\b.*\s(main|master)\b",
    ),
    (
        "force_push_protected_branch_trailing_flag",
        HISTORY_DESTRUCTIVE,
        r"git\s+push\b.*\s(main|master)\b.*\s(-f|--force)\b",
    ),
    (
        "hard_reset_protected_branch",
        HISTORY_DESTRUCTIVE,
        r"git\s+reset\s+--hard\s+origin/(main|master)",
    ),
    ("git_clean_ignored", HISTORY_DESTRUCTIVE, r"git\s+clean\s+-fdx"),
    (
        "inline_credential",
        "inline credential assignment",
        r#"(api[_-]?key|password|secret|token)\s*=\s*["'][^"']+["']"#,
    ),
    (
        "world_writable_root",
        "world-writable permission change on root path",
        r"chmod\s+(-R\s+)?777\s+/",
    ),
    (
        "remote_script_to_shell",
        "remote download piped into shell",
        r"(curl|wget)\b.*\|\s*(sudo\s+)?(ba|z|da|k)?sh\b",
    ),
];

const DEFAULT_SENSITIVE_KEYS: &[&str] = &[
    "password",
    "secret",
    "token",
    "api_key",
    "apikey",
    "credential",
    "auth",
    "bearer",
    "private_key",
];

/// One entry of the dangerous-pattern tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DangerousPattern {
    /// Stable identifier recorded in the audit trail
    pub id: String,
    /// Category text used in the denial reason (never the matched text)
    pub description: String,
    /// Regular expression, matched case-insensitively anywhere in the command
    pub pattern: String,
}

/// Declarative rule set. Missing YAML keys fall back to the built-in lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuleSet {
    pub safe_prefixes: Vec<String>,
    pub protected_files: Vec<String>,
    pub dangerous_patterns: Vec<DangerousPattern>,
    pub sensitive_keys: Vec<String>,
    pub truncate_at: usize,
}

impl Default for RuleSet {
    fn default() -> Self {
        Self {
            safe_prefixes: DEFAULT_SAFE_PREFIXES.iter().map(|s| s.to_string()).collect(),
            protected_files: DEFAULT_PROTECTED_FILES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            dangerous_patterns: DEFAULT_DANGEROUS_PATTERNS
                .iter()
                .map(|(id, description, pattern)| DangerousPattern {
                    id: id.to_string(),
                    description: description.to_string(),
                    pattern: pattern.to_string(),
                })
                .collect(),
            sensitive_keys: DEFAULT_SENSITIVE_KEYS.iter().map(|s| s.to_string()).collect(),
            truncate_at: redaction::DEFAULT_TRUNCATE_AT,
        }
    }
}

impl RuleSet {
    pub fn from_yaml(content: &str) -> Result<Self, HookError> {
        Ok(serde_yaml_ng::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, HookError> {
        let content = std::fs::read_to_string(path)?;
        let rules = Self::from_yaml(&content)?;
        info!(path = %path.display(), "Loaded rule set");
        Ok(rules)
    }

    /// Validate and compile. Fails on the first invalid entry.
    pub fn compile(&self) -> Result<CompiledRules, HookError> {
        PolicyValidator::validate_rule_set(self)?;

        let matcher = PatternMatcher::compile(
            &self.safe_prefixes,
            &self.protected_files,
            &self.dangerous_patterns,
        )?;
        debug!(
            safe = self.safe_prefixes.len(),
            protected = self.protected_files.len(),
            dangerous = self.dangerous_patterns.len(),
            "Compiled rule set"
        );

        Ok(CompiledRules {
            evaluator: PolicyEvaluator::new(matcher),
            redactor: Redactor::new(&self.sensitive_keys, self.truncate_at),
        })
    }
}

/// Immutable, compiled rules shared by every stage of one invocation.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub evaluator: PolicyEvaluator,
    pub redactor: Redactor,
}

impl CompiledRules {
    /// Compile the built-in rule set.
    pub fn builtin() -> Result<Self, HookError> {
        RuleSet::default().compile()
    }
}
