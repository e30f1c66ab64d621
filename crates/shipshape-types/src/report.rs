use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::breach::Breach;
use crate::ids::CheckType;
use crate::remediation::{RemediationCounts, RemediationStatus};
use crate::result::{CheckResult, CheckStatus};
use crate::severity::Severity;

/// Everything a run produced, plus the counters reporters need.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct ResultList {
    pub remediation_performed: bool,
    pub total_checks: u32,
    pub total_breaches: u32,
    pub total_remediations: u32,
    pub total_unsupported_remediations: u32,
    pub check_count_by_type: BTreeMap<CheckType, u32>,
    pub breach_count_by_type: BTreeMap<CheckType, u32>,
    pub breach_count_by_severity: BTreeMap<Severity, u32>,
    pub remediation_count_by_type: BTreeMap<CheckType, u32>,
    #[serde(default)]
    pub remediation_counts: RemediationCounts,
    pub results: Vec<CheckResult>,
}

impl ResultList {
    pub fn new(remediation_performed: bool) -> Self {
        Self {
            remediation_performed,
            ..Self::default()
        }
    }

    /// `Fail` if any result failed.
    pub fn status(&self) -> CheckStatus {
        if self
            .results
            .iter()
            .any(|r| r.status == Some(CheckStatus::Fail))
        {
            CheckStatus::Fail
        } else {
            CheckStatus::Pass
        }
    }

    /// Rolled-up remediation outcome, or `None` when remediation was not
    /// requested for this run.
    pub fn remediation_status(&self) -> Option<RemediationStatus> {
        self.remediation_performed
            .then(|| self.remediation_counts.overall())
    }

    pub fn breaches(&self) -> impl Iterator<Item = &Breach> {
        self.results.iter().flat_map(|r| r.breaches.iter())
    }

    pub fn breaches_by_check_name(&self, name: &str) -> Vec<&Breach> {
        self.breaches().filter(|b| b.check_name == name).collect()
    }

    pub fn breaches_by_severity(&self, severity: Severity) -> Vec<&Breach> {
        self.breaches().filter(|b| b.severity == severity).collect()
    }

    /// Number of breaches whose severity is at or above `threshold`.
    pub fn breaches_at_or_above(&self, threshold: Severity) -> usize {
        self.breaches().filter(|b| b.severity >= threshold).count()
    }

    pub fn remediations_by_check_name(&self, name: &str) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.name == name)
            .flat_map(|r| r.remediations.iter().map(String::as_str))
            .collect()
    }

    pub fn sort(&mut self) {
        self.results
            .sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.check_type.cmp(&b.check_type)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn failing(name: &str, severity: Severity) -> CheckResult {
        let mut r = CheckResult::new(name, CheckType::from("file"), severity);
        let mut b = Breach::value("bad");
        b.set_common_values(&r.check_type, name, severity);
        r.breaches.push(b);
        r.determine_status(false);
        r
    }

    fn passing(name: &str) -> CheckResult {
        let mut r = CheckResult::new(name, CheckType::from("file"), Severity::Normal);
        r.determine_status(false);
        r
    }

    #[test]
    fn status_fails_if_any_result_fails() {
        let mut rl = ResultList::new(false);
        rl.results.push(passing("a"));
        assert_eq!(rl.status(), CheckStatus::Pass);
        rl.results.push(failing("b", Severity::Low));
        assert_eq!(rl.status(), CheckStatus::Fail);
    }

    #[test]
    fn remediation_status_is_unset_without_remediation() {
        let rl = ResultList::new(false);
        assert_eq!(rl.remediation_status(), None);

        let rl = ResultList::new(true);
        assert_eq!(rl.remediation_status(), Some(RemediationStatus::Success));
    }

    #[test]
    fn breach_queries() {
        let mut rl = ResultList::new(false);
        rl.results.push(failing("a", Severity::Low));
        rl.results.push(failing("b", Severity::Critical));

        assert_eq!(rl.breaches_by_check_name("a").len(), 1);
        assert_eq!(rl.breaches_by_severity(Severity::Critical).len(), 1);
        assert_eq!(rl.breaches_at_or_above(Severity::High), 1);
        assert_eq!(rl.breaches_at_or_above(Severity::Low), 2);
    }

    #[test]
    fn sort_orders_by_name() {
        let mut rl = ResultList::new(false);
        rl.results.push(passing("zeta"));
        rl.results.push(passing("alpha"));
        rl.sort();
        let names: Vec<_> = rl.results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn severity_map_serializes_with_string_keys() {
        let mut rl = ResultList::new(false);
        rl.breach_count_by_severity.insert(Severity::High, 2);
        let v = serde_json::to_value(&rl).expect("serialize");
        assert_eq!(v["breach-count-by-severity"]["high"], 2);
    }
}
