// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use arbitrary::{Arbitrary, Unstructured};
use hookwarden::engine::rules::CompiledRules;
use hookwarden::engine_core::dispatcher::Dispatcher;
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

/// Hook payloads shaped like the host's, with fuzzed field contents.
#[derive(Debug, Arbitrary)]
struct FuzzHookInput {
    event: u8,
    tool_name: String,
    command: String,
    extra_key: String,
    extra_value: String,
    session_id: String,
}

const EVENTS: &[&str] = &[
    "PreToolUse",
    "PostToolUse",
    "SessionStart",
    "UserPromptSubmit",
    "SubagentStop",
    "Stop",
];

fuzz_target!(|data: &[u8]| {
    let Ok(rules) = CompiledRules::builtin() else {
        return;
    };
    let dispatcher = Dispatcher::new(Arc::new(rules));

    // Raw bytes straight into the envelope parser
    let _ = dispatcher.dispatch_bytes(data, None);

    let mut unstructured = Unstructured::new(data);
    if let Ok(input) = FuzzHookInput::arbitrary(&mut unstructured) {
        let payload = serde_json::json!({
            "hook_event_name": EVENTS[input.event as usize % EVENTS.len()],
            "tool_name": input.tool_name,
            "tool_input": {
                "command": input.command,
                input.extra_key: input.extra_value
            },
            "session_id": input.session_id
        });
        let bytes = payload.to_string();
        if let Ok(record) = dispatcher.dispatch_bytes(bytes.as_bytes(), None) {
            // Denials always carry a response for the host
            if record.is_denied() {
                assert!(record.response.is_some());
            }
        }
    }
});
