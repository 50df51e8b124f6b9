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

//! hookwarden: governance hooks for autonomous coding agents.
//!
//! The host invokes the binary once per lifecycle event with a JSON payload
//! on stdin. This library holds the pieces that turn that payload into a
//! decision: the event envelope, the safety policy engine, the redactor,
//! the dispatcher, and the best-effort sinks and advisors that run after it.

pub mod advisors;
pub mod config;
pub mod engine;
pub mod engine_core;
pub mod report;
pub mod sinks;
pub mod utils;
