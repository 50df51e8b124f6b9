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

// Structural rule set validation - fail-fast at config load time.
// Regex syntax is checked later, when the patterns are compiled.

use crate::engine::rules::{DangerousPattern, RuleSet};
use crate::engine_core::errors::HookError;

use std::collections::HashSet;

/// Validates rule sets for structural correctness
pub struct PolicyValidator;

impl PolicyValidator {
    /// Validate a rule set - call after loading from YAML
    pub fn validate_rule_set(rules: &RuleSet) -> Result<(), HookError> {
        if rules.truncate_at == 0 {
            return Err(HookError::ConfigurationError(
                "truncate_at must be greater than zero".to_string(),
            ));
        }

        Self::validate_entries("safe_prefixes", &rules.safe_prefixes)?;
        Self::validate_entries("protected_files", &rules.protected_files)?;
        Self::validate_entries("sensitive_keys", &rules.sensitive_keys)?;
        Self::validate_dangerous_patterns(&rules.dangerous_patterns)?;

        Ok(())
    }

    /// Every entry of a plain list must carry some non-blank text
    fn validate_entries(list: &str, entries: &[String]) -> Result<(), HookError> {
        for (idx, entry) in entries.iter().enumerate() {
            if entry.trim().is_empty() {
                return Err(HookError::ConfigurationError(format!(
                    "{} entry #{} is empty",
                    list,
                    idx + 1
                )));
            }
        }
        Ok(())
    }

    fn validate_dangerous_patterns(patterns: &[DangerousPattern]) -> Result<(), HookError> {
        let mut seen = HashSet::new();

        for (idx, pattern) in patterns.iter().enumerate() {
            let context = format!("dangerous_patterns entry #{}", idx + 1);

            if pattern.id.trim().is_empty() {
                return Err(HookError::ConfigurationError(format!(
                    "{}: id cannot be empty",
                    context
                )));
            }
            if !seen.insert(pattern.id.as_str()) {
                return Err(HookError::ConfigurationError(format!(
                    "{}: duplicate id '{}'",
                    context, pattern.id
                )));
            }
            // The description is what the host shows on denial
            if pattern.description.trim().is_empty() {
                return Err(HookError::ConfigurationError(format!(
                    "{} ('{}'): description cannot be empty",
                    context, pattern.id
                )));
            }
            if pattern.pattern.trim().is_empty() {
                return Err(HookError::ConfigurationError(format!(
                    "{} ('{}'): pattern cannot be empty",
                    context, pattern.id
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(id: &str, description: &str, regex: &str) -> DangerousPattern {
        DangerousPattern {
            id: id.to_string(),
            description: description.to_string(),
            pattern: regex.to_string(),
        }
    }

    #[test]
    fn test_default_rule_set_is_valid() {
        assert!(PolicyValidator::validate_rule_set(&RuleSet::default()).is_ok());
    }

    #[test]
    fn test_zero_threshold_rejected() {
        let rules = RuleSet {
            truncate_at: 0,
            ..RuleSet::default()
        };
        let err = PolicyValidator::validate_rule_set(&rules).unwrap_err();
        assert!(err.to_string().contains("truncate_at"));
    }

    #[test]
    fn test_blank_protected_file_rejected() {
        let rules = RuleSet {
            protected_files: vec![".env".to_string(), "  ".to_string()],
            ..RuleSet::default()
        };
        let err = PolicyValidator::validate_rule_set(&rules).unwrap_err();
        assert!(err.to_string().contains("protected_files entry #2"));
    }

    #[test]
    fn test_duplicate_pattern_id_rejected() {
        let rules = RuleSet {
            dangerous_patterns: vec![
                pattern("wipe", "unscoped recursive delete", r"rm\s+-rf\s+/"),
                pattern("wipe", "unscoped recursive delete", r"rm\s+-rf\s+\*"),
            ],
            ..RuleSet::default()
        };
        let err = PolicyValidator::validate_rule_set(&rules).unwrap_err();
        assert!(err.to_string().contains("duplicate id 'wipe'"));
    }

    #[test]
    fn test_pattern_requires_description() {
        let rules = RuleSet {
            dangerous_patterns: vec![pattern("wipe", "", r"rm\s+-rf\s+/")],
            ..RuleSet::default()
        };
        let result = PolicyValidator::validate_rule_set(&rules);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("description cannot be empty"));
    }
}
