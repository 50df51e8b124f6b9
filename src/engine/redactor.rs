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

//! Redaction of sensitive values before anything leaves the process.
//!
//! Rules, applied per entry of a mapping:
//!
//! - a key whose lower-cased form contains a sensitive substring gets its
//!   value replaced by `[REDACTED]`, whatever the value was
//! - nested mappings and sequences are walked with the same rules
//! - text longer than the threshold keeps its first `truncate_at`
//!   characters followed by `...[truncated]`
//!
//! The input is never mutated and the result is idempotent:
//! `redact(redact(x)) == redact(x)`.

use serde_json::{Map, Value};

use crate::engine_core::constants::redaction::{REDACTED_MARKER, TRUNCATION_MARKER};

#[derive(Debug, Clone)]
pub struct Redactor {
    sensitive: Vec<String>,
    truncate_at: usize,
}

impl Redactor {
    pub fn new(sensitive_keys: &[String], truncate_at: usize) -> Self {
        Self {
            sensitive: sensitive_keys.iter().map(|k| k.to_lowercase()).collect(),
            truncate_at,
        }
    }

    pub fn truncate_at(&self) -> usize {
        self.truncate_at
    }

    pub fn is_sensitive_key(&self, key: &str) -> bool {
        let lowered = key.to_lowercase();
        self.sensitive.iter().any(|s| lowered.contains(s.as_str()))
    }

    /// Sanitize a parameter mapping. Non-mapping input is returned as-is.
    pub fn redact(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(self.redact_map(map)),
            other => other.clone(),
        }
    }

    /// Clip text to the threshold, counting characters rather than bytes.
    pub fn truncate_text(&self, text: &str) -> String {
        match text.char_indices().nth(self.truncate_at) {
            Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATION_MARKER),
            None => text.to_string(),
        }
    }

    fn redact_map(&self, map: &Map<String, Value>) -> Map<String, Value> {
        map.iter()
            .map(|(key, value)| {
                let redacted = if self.is_sensitive_key(key) {
                    Value::String(REDACTED_MARKER.to_string())
                } else {
                    self.redact_value(value)
                };
                (key.clone(), redacted)
            })
            .collect()
    }

    fn redact_value(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => Value::Object(self.redact_map(map)),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.redact_value(v)).collect()),
            Value::String(s) => Value::String(self.truncate_text(s)),
            other => other.clone(),
        }
    }
}
