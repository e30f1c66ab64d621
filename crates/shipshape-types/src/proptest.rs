//! Property-based tests for the types crate.
//!
//! These tests use proptest to verify invariants around:
//! - remediation status roll-up for arbitrary outcome multisets
//! - result status derivation from breaches

use crate::{Breach, CheckResult, CheckStatus, CheckType, RemediationCounts, RemediationStatus, Severity};
use proptest::prelude::*;

fn arb_status() -> impl Strategy<Value = RemediationStatus> {
    prop_oneof![
        Just(RemediationStatus::NoSupport),
        Just(RemediationStatus::Success),
        Just(RemediationStatus::Failed),
        Just(RemediationStatus::Partial),
    ]
}

fn tally(statuses: &[RemediationStatus]) -> RemediationCounts {
    let mut counts = RemediationCounts::default();
    for s in statuses {
        counts.record(*s);
    }
    counts
}

proptest! {
    #[test]
    fn any_partial_rolls_up_to_partial(mut statuses in prop::collection::vec(arb_status(), 0..20)) {
        statuses.push(RemediationStatus::Partial);
        prop_assert_eq!(tally(&statuses).overall(), RemediationStatus::Partial);
    }

    #[test]
    fn uniform_outcomes_roll_up_to_themselves(status in arb_status(), n in 1usize..20) {
        let statuses = vec![status; n];
        prop_assert_eq!(tally(&statuses).overall(), status);
    }

    #[test]
    fn success_mixed_with_unsuccessful_is_partial(
        successes in 1usize..10,
        failures in 0usize..10,
        unsupported in 0usize..10,
    ) {
        prop_assume!(failures + unsupported > 0);
        let mut statuses = vec![RemediationStatus::Success; successes];
        statuses.extend(vec![RemediationStatus::Failed; failures]);
        statuses.extend(vec![RemediationStatus::NoSupport; unsupported]);
        prop_assert_eq!(tally(&statuses).overall(), RemediationStatus::Partial);
    }

    #[test]
    fn roll_up_ignores_order(mut statuses in prop::collection::vec(arb_status(), 0..20)) {
        let before = tally(&statuses).overall();
        statuses.reverse();
        prop_assert_eq!(tally(&statuses).overall(), before);
    }

    #[test]
    fn status_is_fail_iff_breaches(
        breaches in 0usize..5,
        passes in 0usize..5,
        remediate in any::<bool>(),
    ) {
        let mut r = CheckResult::new("c", CheckType::from("file"), Severity::Normal);
        r.passes = (0..passes).map(|i| format!("pass {i}")).collect();
        r.breaches = (0..breaches).map(|i| Breach::value(format!("breach {i}"))).collect();
        r.determine_status(remediate);

        let expected = if breaches > 0 { CheckStatus::Fail } else { CheckStatus::Pass };
        prop_assert_eq!(r.status, Some(expected));
    }
}
