use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use shipshape_types::{
    Breach, CheckResult, CheckType, RemediationCounts, ResultList, Severity, ValueBreach,
};
use tracing::{debug, info_span, warn};

use crate::check::{Check, RunContext};
use crate::model::CheckMap;

#[derive(Debug, Default)]
struct Tally {
    check_count_by_type: BTreeMap<CheckType, u32>,
    breach_count_by_type: BTreeMap<CheckType, u32>,
    breach_count_by_severity: BTreeMap<Severity, u32>,
    remediation_count_by_type: BTreeMap<CheckType, u32>,
    remediation_counts: RemediationCounts,
    results: Vec<CheckResult>,
}

/// Thread-safe accumulator for one run.
///
/// Scalar totals are atomics; the per-type/per-severity maps and the result
/// vector share one mutex.
#[derive(Debug)]
pub struct ResultCollector {
    remediation_performed: bool,
    total_checks: AtomicU32,
    total_breaches: AtomicU32,
    total_remediations: AtomicU32,
    total_unsupported_remediations: AtomicU32,
    tally: Mutex<Tally>,
}

impl ResultCollector {
    pub fn new(remediation_performed: bool) -> Self {
        Self {
            remediation_performed,
            total_checks: AtomicU32::new(0),
            total_breaches: AtomicU32::new(0),
            total_remediations: AtomicU32::new(0),
            total_unsupported_remediations: AtomicU32::new(0),
            tally: Mutex::new(Tally::default()),
        }
    }

    pub fn incr_checks(&self, check_type: &CheckType, count: u32) {
        self.total_checks.fetch_add(count, Ordering::Relaxed);
        *self
            .tally
            .lock()
            .check_count_by_type
            .entry(check_type.clone())
            .or_default() += count;
    }

    pub fn add_result(&self, result: CheckResult) {
        let breaches = result.breaches.len() as u32;
        let remediations = result.remediation_counts();

        self.total_breaches.fetch_add(breaches, Ordering::Relaxed);
        self.total_remediations
            .fetch_add(remediations.successful, Ordering::Relaxed);
        self.total_unsupported_remediations
            .fetch_add(remediations.unsupported, Ordering::Relaxed);

        let mut tally = self.tally.lock();
        if breaches > 0 {
            *tally
                .breach_count_by_type
                .entry(result.check_type.clone())
                .or_default() += breaches;
        }
        for breach in &result.breaches {
            *tally
                .breach_count_by_severity
                .entry(breach.severity)
                .or_default() += 1;
        }
        if remediations.successful > 0 {
            *tally
                .remediation_count_by_type
                .entry(result.check_type.clone())
                .or_default() += remediations.successful;
        }
        tally.remediation_counts.add(&remediations);
        tally.results.push(result);
    }

    pub fn total_checks(&self) -> u32 {
        self.total_checks.load(Ordering::Relaxed)
    }

    pub fn total_breaches(&self) -> u32 {
        self.total_breaches.load(Ordering::Relaxed)
    }

    /// Freezes the collector into a result list sorted by check name.
    pub fn into_result_list(self) -> ResultList {
        let tally = self.tally.into_inner();
        let mut list = ResultList {
            remediation_performed: self.remediation_performed,
            total_checks: self.total_checks.into_inner(),
            total_breaches: self.total_breaches.into_inner(),
            total_remediations: self.total_remediations.into_inner(),
            total_unsupported_remediations: self.total_unsupported_remediations.into_inner(),
            check_count_by_type: tally.check_count_by_type,
            breach_count_by_type: tally.breach_count_by_type,
            breach_count_by_severity: tally.breach_count_by_severity,
            remediation_count_by_type: tally.remediation_count_by_type,
            remediation_counts: tally.remediation_counts,
            results: tally.results,
        };
        list.sort();
        list
    }
}

/// Runs every check concurrently, one thread per check, and aggregates the
/// results.
pub fn run_checks(checks: &mut CheckMap, ctx: &RunContext, remediate: bool) -> ResultList {
    let collector = ResultCollector::new(remediate);
    for (check_type, bucket) in checks.iter() {
        collector.incr_checks(check_type, bucket.len() as u32);
    }
    debug!(total = collector.total_checks(), "running checks");

    std::thread::scope(|scope| {
        for check in checks.checks_mut() {
            let collector = &collector;
            scope.spawn(move || process_check(collector, check.as_mut(), ctx, remediate));
        }
    });

    collector.into_result_list()
}

/// Drives one check through its lifecycle and hands its result to the
/// collector. A panic inside the check becomes a breach on that check.
pub fn process_check(
    collector: &ResultCollector,
    check: &mut dyn Check,
    ctx: &RunContext,
    remediate: bool,
) {
    let span = info_span!(
        "check",
        check_type = %check.check_type(),
        check_name = %check.name()
    );
    let _entered = span.enter();
    debug!("processing check");

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| run_lifecycle(&mut *check, ctx, remediate)));
    if let Err(payload) = outcome {
        let message = panic_message(payload.as_ref());
        warn!(%message, "check panicked");
        check
            .base_mut()
            .add_breach(Breach::new(ValueBreach::labelled("check panicked", message)));
    }

    let base = check.base_mut();
    base.result.determine_status(remediate);
    debug!(
        breaches = base.result.breaches.len(),
        passes = base.result.passes.len(),
        "check processed"
    );
    collector.add_result(base.result.clone());
}

fn run_lifecycle(check: &mut dyn Check, ctx: &RunContext, remediate: bool) {
    if check.requires_data() {
        debug!("fetching data");
        check.fetch_data(ctx);
        if !check.base().has_breaches() && check.has_data(true) {
            check.unmarshal_data_map();
        }
    }
    if !check.base().has_breaches() {
        debug!("running check");
        check.run_check(ctx);
    }
    if remediate && check.base().has_breaches() {
        debug!("performing remediation");
        check.remediate(ctx);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
