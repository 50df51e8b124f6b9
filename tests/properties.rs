use hookwarden::engine::rules::CompiledRules;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

const SENSITIVE: &[&str] = &[
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

fn rules() -> CompiledRules {
    CompiledRules::builtin().unwrap()
}

fn arb_key() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_]{1,12}",
        Just("password".to_string()),
        Just("API_KEY".to_string()),
        Just("x-auth-token".to_string()),
        Just("PrivateKey".to_string()),
    ]
}

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "\\PC{0,300}".prop_map(Value::String),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::vec((arb_key(), inner), 0..6)
                .prop_map(|entries| Value::Object(entries.into_iter().collect::<Map<_, _>>())),
        ]
    })
}

/// Every sensitive key anywhere in the tree maps to the marker.
fn assert_no_leak(value: &Value) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let lowered = k.to_lowercase();
                if SENSITIVE.iter().any(|s| lowered.contains(s)) {
                    assert_eq!(v, &json!("[REDACTED]"), "key {} leaked", k);
                } else {
                    assert_no_leak(v);
                }
            }
        }
        Value::Array(items) => items.iter().for_each(assert_no_leak),
        _ => {}
    }
}

proptest! {
    #[test]
    fn test_redact_is_idempotent(tree in arb_json()) {
        let r = rules().redactor;
        let input = json!({"root": tree});
        let once = r.redact(&input);
        let twice = r.redact(&once);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_redact_never_leaks_sensitive_values(tree in arb_json()) {
        let r = rules().redactor;
        let out = r.redact(&json!({"root": tree, "nested": {"token": "t"}}));
        assert_no_leak(&out);
    }

    #[test]
    fn test_long_strings_truncate_to_fixed_length(s in "[a-zA-Z0-9 ]{201,600}") {
        let r = rules().redactor;
        let out = r.redact(&json!({"content": s}));
        let text = out["content"].as_str().unwrap();
        prop_assert_eq!(text.chars().count(), 214);
        prop_assert!(text.ends_with("...[truncated]"));
    }

    #[test]
    fn test_short_strings_untouched(s in "\\PC{0,200}") {
        let r = rules().redactor;
        let input = json!({"content": s});
        prop_assert_eq!(r.redact(&input), input);
    }

    #[test]
    fn test_classify_is_deterministic(cmd in "\\PC{0,200}") {
        let e = rules().evaluator;
        prop_assert_eq!(e.classify(&cmd), e.classify(&cmd));
    }

    #[test]
    fn test_safe_prefix_short_circuits_any_suffix(suffix in "\\PC{0,120}") {
        let e = rules().evaluator;
        let cmd = format!("npm install {}", suffix);
        prop_assert!(e.classify(&cmd).is_allow());
    }

    #[test]
    fn test_protected_file_always_denied(prefix in "[a-z ]{0,20}", suffix in "[a-z ]{0,20}") {
        let e = rules().evaluator;
        let cmd = format!("cat {}.env{}", prefix, suffix);
        prop_assert!(e.classify(&cmd).is_deny());
    }
}
