use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hookwarden::engine::rules::{CompiledRules, RuleSet};
use hookwarden::engine_core::dispatcher::Dispatcher;
use hookwarden::utils::policy_validator::PolicyValidator;
use serde_json::json;
use std::sync::Arc;

fn bench_classify(c: &mut Criterion) {
    let rules = CompiledRules::builtin().unwrap();

    c.bench_function("classify_safe_prefix", |b| {
        b.iter(|| rules.evaluator.classify(black_box("npm install express")))
    });
    c.bench_function("classify_default_allow", |b| {
        b.iter(|| rules.evaluator.classify(black_box("ls -la /usr/local/share/doc")))
    });

    // Worst case: scans every tier and every pattern
    let long = format!("echo {}", "a".repeat(4096));
    c.bench_function("classify_long_command", |b| {
        b.iter(|| rules.evaluator.classify(black_box(&long)))
    });
}

fn bench_redact(c: &mut Criterion) {
    let rules = CompiledRules::builtin().unwrap();
    let params = json!({
        "command": "deploy --env production",
        "headers": [{"authorization": "Bearer abc"}, {"accept": "application/json"}],
        "config": {"db": {"password": "hunter2", "host": "db.internal"}},
        "content": "x".repeat(2048),
    });

    c.bench_function("redact_nested_params", |b| {
        b.iter(|| rules.redactor.redact(black_box(&params)))
    });
}

fn bench_dispatch(c: &mut Criterion) {
    let dispatcher = Dispatcher::new(Arc::new(CompiledRules::builtin().unwrap()));
    let payload = json!({
        "hook_event_name": "PreToolUse",
        "tool_name": "Bash",
        "tool_input": {"command": "git push --force origin main"},
        "session_id": "bench-session"
    })
    .to_string();

    c.bench_function("dispatch_pre_action_deny", |b| {
        b.iter(|| dispatcher.dispatch_bytes(black_box(payload.as_bytes()), None))
    });
}

fn bench_rule_set(c: &mut Criterion) {
    let rules = RuleSet::default();

    c.bench_function("rule_set_validation", |b| {
        b.iter(|| PolicyValidator::validate_rule_set(black_box(&rules)))
    });
    c.bench_function("rule_set_compile", |b| b.iter(|| black_box(&rules).compile()));
}

criterion_group!(benches, bench_classify, bench_redact, bench_dispatch, bench_rule_set);
criterion_main!(benches);
