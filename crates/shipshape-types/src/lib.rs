//! Stable DTOs used across the shipshape workspace.
//!
//! This crate holds data and the pure rules attached to it:
//! - severities and check-type tags
//! - breach shapes and their human-readable rendering
//! - remediation outcomes and how many of them roll up into one status
//! - per-check results and the run-level result list

#![forbid(unsafe_code)]

pub mod breach;
pub mod ids;
pub mod remediation;
pub mod report;
pub mod result;
pub mod severity;

#[cfg(test)]
mod proptest;

pub use breach::{Breach, BreachKind, KeyValueBreach, KeyValuesBreach, ValueBreach};
pub use ids::{CHECK_DRUSH_YAML, CHECK_FILE, CHECK_JSON, CHECK_YAML, CHECK_YAMLLINT, CheckType};
pub use remediation::{Remediation, RemediationCounts, RemediationStatus};
pub use report::ResultList;
pub use result::{CheckResult, CheckStatus};
pub use severity::{ParseSeverityError, Severity};
