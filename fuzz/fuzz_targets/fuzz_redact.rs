// Copyright 2026 BadCompany
// Licensed under the Apache License, Version 2.0

#![no_main]

use hookwarden::engine::rules::CompiledRules;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };
    let Ok(rules) = CompiledRules::builtin() else {
        return;
    };

    let once = rules.redactor.redact(&value);
    let twice = rules.redactor.redact(&once);
    assert_eq!(once, twice);
});
