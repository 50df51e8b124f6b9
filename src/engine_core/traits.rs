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

//! Sink Trait.
//!
//! Defines the interface between the dispatcher's output and the places it
//! is persisted or transmitted (audit trail, metrics, notifications).

use async_trait::async_trait;

use crate::engine_core::dispatcher::DispatchRecord;
use crate::engine_core::errors::HookError;

/// Consumer of dispatch records. Only ever sees redacted envelopes.
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name used in logs and `SinkFailure` errors
    fn name(&self) -> &'static str;

    /// Record one dispatch. Errors are logged by the caller and dropped.
    async fn record(&self, record: &DispatchRecord) -> Result<(), HookError>;
}
