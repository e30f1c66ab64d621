//! The `run` use case: load policy, run every check, produce a result list.

use anyhow::Context;
use camino::Utf8PathBuf;
use shipshape_domain::{RunContext, run_checks};
use shipshape_settings::{Overrides, load_configs, resolve_config};
use shipshape_types::{CheckStatus, ResultList, Severity};
use tracing::info;

/// Input for the audit use case.
#[derive(Clone, Debug)]
pub struct AuditInput<'a> {
    /// `(label, text)` pairs in merge order; the label names the source in
    /// error messages.
    pub sources: &'a [(String, String)],
    pub overrides: Overrides,
}

#[derive(Debug)]
pub struct AuditOutput {
    pub results: ResultList,
    pub project_dir: Utf8PathBuf,
    pub fail_severity: Severity,
}

pub fn run_audit(input: AuditInput<'_>) -> anyhow::Result<AuditOutput> {
    let registry = shipshape_checks::default_registry();
    let cfg = load_configs(
        input.sources.iter().map(|(label, text)| (label.as_str(), text.as_str())),
        &registry,
    )?;
    let resolved = resolve_config(cfg, input.overrides).context("resolve config")?;

    let ctx = RunContext::new(resolved.project_dir.clone());
    let mut checks = resolved.checks;
    info!(
        project_dir = %resolved.project_dir,
        checks = checks.len(),
        remediate = resolved.remediate,
        "starting audit"
    );
    let results = run_checks(&mut checks, &ctx, resolved.remediate);
    info!(
        status = %results.status(),
        breaches = results.total_breaches,
        "audit finished"
    );

    Ok(AuditOutput {
        results,
        project_dir: resolved.project_dir,
        fail_severity: resolved.fail_severity,
    })
}

/// 2 when failures were asked to be fatal and the run has a breach at or
/// above `fail_severity`; 0 otherwise.
pub fn exit_code(results: &ResultList, fail_severity: Severity, error_on_failure: bool) -> i32 {
    if error_on_failure
        && results.status() == CheckStatus::Fail
        && results.breaches_at_or_above(fail_severity) > 0
    {
        2
    } else {
        0
    }
}
