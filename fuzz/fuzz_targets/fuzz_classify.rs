// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use hookwarden::engine::rules::CompiledRules;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(command) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(rules) = CompiledRules::builtin() else {
        return;
    };

    let decision = rules.evaluator.classify(command);

    // A denial must never echo the command back
    if let Some(reason) = decision.reason() {
        if command.len() > 16 {
            assert!(!reason.contains(command));
        }
    }
});
