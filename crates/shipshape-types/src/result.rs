use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::breach::Breach;
use crate::ids::CheckType;
use crate::remediation::{RemediationCounts, RemediationStatus};
use crate::severity::Severity;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum CheckStatus {
    Pass,
    Fail,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CheckStatus::Pass => "Pass",
            CheckStatus::Fail => "Fail",
        })
    }
}

/// Outcome of one check.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct CheckResult {
    pub name: String,
    pub severity: Severity,
    pub check_type: CheckType,
    /// Derived from the breaches by [`CheckResult::determine_status`]; unset
    /// until the check has been processed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<CheckStatus>,
    #[serde(default)]
    pub passes: Vec<String>,
    #[serde(default)]
    pub breaches: Vec<Breach>,
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Messages from breaches that were fixed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remediations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation_status: Option<RemediationStatus>,
}

impl CheckResult {
    pub fn new(name: impl Into<String>, check_type: CheckType, severity: Severity) -> Self {
        Self {
            name: name.into(),
            check_type,
            severity,
            ..Self::default()
        }
    }

    pub fn remediation_counts(&self) -> RemediationCounts {
        RemediationCounts::from_breaches(&self.breaches)
    }

    /// Fixes the final status of the result.
    ///
    /// `status` is `Fail` exactly when breaches exist, regardless of whether
    /// they were remediated. When remediation ran, the per-check remediation
    /// status and the list of successful remediation messages are filled in
    /// as well. Passes and warnings are sorted for stable output.
    pub fn determine_status(&mut self, remediation_performed: bool) {
        self.passes.sort();
        self.warnings.sort();

        if remediation_performed && !self.breaches.is_empty() {
            self.remediation_status = Some(self.remediation_counts().overall());
            self.remediations = self
                .breaches
                .iter()
                .filter_map(|b| b.remediation.as_ref())
                .filter(|r| r.status == RemediationStatus::Success)
                .flat_map(|r| r.messages.iter().cloned())
                .collect();
        }

        self.status = Some(if self.breaches.is_empty() {
            CheckStatus::Pass
        } else {
            CheckStatus::Fail
        });
    }
}
