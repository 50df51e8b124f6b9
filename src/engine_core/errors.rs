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

// Domain error types - nothing here is ever shown to the host verbatim

use thiserror::Error;

/// Main error type for hookwarden
#[derive(Error, Debug)]
pub enum HookError {
    /// The hook payload could not be understood. The binary stays silent.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// A rule set pattern failed to compile
    #[error("Invalid pattern '{id}': {reason}")]
    InvalidPattern { id: String, reason: String },

    /// Configuration error (rule set validation, bad env values)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// A sink could not record an event. Never propagated past the sink layer.
    #[error("Sink failure ({sink}): {error}")]
    SinkFailure { sink: String, error: String },

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl HookError {
    /// Wrap any error raised inside a sink so callers can log and drop it.
    pub fn sink(sink: &str, error: impl std::fmt::Display) -> Self {
        HookError::SinkFailure {
            sink: sink.to_string(),
            error: error.to_string(),
        }
    }
}
