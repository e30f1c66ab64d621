//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - list-mode rule evaluation (dedupe, order, subset of input)
//! - wildcard merges touching exactly the checks of one type

use crate::keyvalue::{KeyValue, KeyValueOutcome};
use crate::model::CheckMap;
use crate::test_support::TestCheck;
use proptest::prelude::*;
use serde_json::{Value, json};
use shipshape_types::Severity;

fn arb_token() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-e]").unwrap()
}

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop::sample::select(Severity::ALL.to_vec())
}

fn list_rule(disallowed: Vec<String>) -> KeyValue {
    KeyValue {
        key: "$.values".to_string(),
        is_list: true,
        disallowed,
        ..KeyValue::default()
    }
}

proptest! {
    #[test]
    fn violations_are_distinct_and_in_first_seen_order(
        values in prop::collection::vec(arb_token(), 0..20),
        disallowed in prop::collection::vec(arb_token(), 1..4),
    ) {
        let doc = json!({ "values": values });
        let outcome = list_rule(disallowed.clone()).check(&doc);

        let mut expected: Vec<String> = Vec::new();
        for v in &values {
            if disallowed.contains(v) && !expected.contains(v) {
                expected.push(v.clone());
            }
        }

        if expected.is_empty() {
            prop_assert_eq!(outcome, KeyValueOutcome::Equal);
        } else {
            prop_assert_eq!(outcome, KeyValueOutcome::DisallowedFound(expected));
        }
    }

    #[test]
    fn allow_list_containing_everything_is_equal(
        values in prop::collection::vec(arb_token(), 1..20),
    ) {
        let rule = KeyValue {
            key: "values".to_string(),
            is_list: true,
            allowed: values.clone(),
            ..KeyValue::default()
        };
        let doc = json!({ "values": values });
        prop_assert_eq!(rule.check(&doc), KeyValueOutcome::Equal);
    }

    #[test]
    fn blank_entries_never_violate(blanks in prop::collection::vec(prop_oneof![Just(Value::Null), Just(json!("")), Just(json!("  "))], 1..10)) {
        let rule = KeyValue {
            key: "values".to_string(),
            is_list: true,
            allowed: vec!["only".to_string()],
            ..KeyValue::default()
        };
        let doc = json!({ "values": blanks });
        prop_assert_eq!(rule.check(&doc), KeyValueOutcome::Equal);
    }

    #[test]
    fn wildcard_merge_sets_severity_on_its_type_only(
        count in 1usize..6,
        severity in arb_severity(),
    ) {
        let mut base = CheckMap::new();
        for i in 0..count {
            base.push("target", Box::new(TestCheck::new(&format!("t{i}"))));
        }
        base.push("bystander", Box::new(TestCheck::new("b")));

        let mut wildcard = TestCheck::new("");
        wildcard.base.severity = Some(severity);
        let mut incoming = CheckMap::new();
        incoming.push("target", Box::new(wildcard));
        base.merge(incoming).unwrap();

        prop_assert_eq!(base.len(), count + 1);
        for check in base.get("target").unwrap() {
            prop_assert_eq!(check.base().severity, Some(severity));
        }
        prop_assert_eq!(base.find("bystander", "b").unwrap().base().severity, None);
    }
}
