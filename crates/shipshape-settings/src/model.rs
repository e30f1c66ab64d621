use std::collections::BTreeMap;

use camino::Utf8PathBuf;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use shipshape_domain::{CheckMap, MergeError};
use shipshape_types::Severity;

/// `shipshape.yml` as written by users.
///
/// Check entries stay untyped here; each one is decoded by the registry entry
/// for its type tag.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_dir: Option<String>,

    /// Breaches at or above this severity make the run fail when exit codes
    /// are requested. Defaults to `high`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_severity: Option<Severity>,

    /// Map of check type -> list of check definitions.
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, Vec<serde_json::Value>>")]
    pub checks: BTreeMap<String, serde_yaml::Value>,
}

/// One or more policy documents, decoded and merged.
#[derive(Debug, Default)]
pub struct Config {
    pub project_dir: Option<Utf8PathBuf>,
    pub fail_severity: Option<Severity>,
    pub checks: Option<CheckMap>,
    pub remediate: bool,
}

impl Config {
    /// Layers `incoming` on top of this config.
    ///
    /// Scalars are replaced only when `incoming` sets them. When this config
    /// has no checks yet, the incoming checks are adopted as they are;
    /// otherwise they are merged with [`CheckMap::merge`].
    pub fn merge(&mut self, incoming: Config) -> Result<(), MergeError> {
        if let Some(dir) = incoming.project_dir.filter(|d| !d.as_str().is_empty()) {
            self.project_dir = Some(dir);
        }
        if incoming.fail_severity.is_some() {
            self.fail_severity = incoming.fail_severity;
        }
        self.remediate |= incoming.remediate;

        if let Some(checks) = incoming.checks {
            match self.checks.as_mut() {
                Some(existing) => existing.merge(checks)?,
                None => self.checks = Some(checks),
            }
        }
        Ok(())
    }

    pub fn filter_checks_to_run(&mut self, check_types: &[String], exclude_db: bool) {
        if let Some(checks) = self.checks.as_mut() {
            checks.filter(check_types, exclude_db);
        }
    }

    pub fn check_count(&self) -> usize {
        self.checks.as_ref().map_or(0, CheckMap::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_config_yaml;
    use shipshape_checks::default_registry;

    fn parse(yaml: &str) -> Config {
        parse_config_yaml(yaml, &default_registry()).expect("valid config")
    }

    #[test]
    fn scalars_only_override_when_set() {
        let mut base = parse("project-dir: /srv/a\nfail-severity: low\n");
        base.merge(parse("checks: {}\n")).expect("merge");
        assert_eq!(base.project_dir.as_deref().map(|p| p.as_str()), Some("/srv/a"));
        assert_eq!(base.fail_severity, Some(Severity::Low));

        base.merge(parse("project-dir: /srv/b\nfail-severity: critical\n"))
            .expect("merge");
        assert_eq!(base.project_dir.as_deref().map(|p| p.as_str()), Some("/srv/b"));
        assert_eq!(base.fail_severity, Some(Severity::Critical));
    }

    #[test]
    fn empty_base_adopts_incoming_checks() {
        let mut base = Config::default();
        base.merge(parse(
            "checks:\n  file:\n    - name: a\n      disallowed-pattern: x\n",
        ))
        .expect("merge");
        assert_eq!(base.check_count(), 1);
    }

    #[test]
    fn same_name_is_merged_and_new_names_appended() {
        let mut base = parse(
            "checks:\n  file:\n    - name: a\n      path: web\n      disallowed-pattern: x\n",
        );
        base.merge(parse(
            "checks:\n  file:\n    - name: a\n      severity: critical\n    - name: b\n      disallowed-pattern: y\n",
        ))
        .expect("merge");

        let checks = base.checks.as_ref().expect("checks");
        assert_eq!(checks.len(), 2);
        let a = checks.find("file", "a").expect("a");
        assert_eq!(a.base().severity, Some(Severity::Critical));
    }

    #[test]
    fn wildcard_sets_severity_for_whole_type() {
        let mut base = parse(concat!(
            "checks:\n",
            "  file:\n",
            "    - {name: a, disallowed-pattern: x}\n",
            "    - {name: b, disallowed-pattern: y}\n",
            "    - {name: c, disallowed-pattern: z}\n",
            "  yaml:\n",
            "    - {name: d, file: a.yml}\n",
        ));
        base.merge(parse("checks:\n  file:\n    - severity: critical\n"))
            .expect("merge");

        let checks = base.checks.as_ref().expect("checks");
        for name in ["a", "b", "c"] {
            assert_eq!(
                checks.find("file", name).and_then(|c| c.base().severity),
                Some(Severity::Critical)
            );
        }
        assert_eq!(checks.find("yaml", "d").and_then(|c| c.base().severity), None);
        assert_eq!(checks.len(), 4);
    }

    #[test]
    fn filter_drops_other_types_and_database_checks() {
        let mut cfg = parse(concat!(
            "checks:\n",
            "  file:\n",
            "    - {name: f, disallowed-pattern: x}\n",
            "  yaml:\n",
            "    - {name: y, file: a.yml}\n",
            "  drush-yaml:\n",
            "    - {name: d, config-name: core.extension}\n",
        ));
        cfg.checks.as_mut().expect("checks").init_all();
        cfg.filter_checks_to_run(&["file".to_string(), "drush-yaml".to_string()], true);

        let checks = cfg.checks.as_ref().expect("checks");
        let types: Vec<_> = checks.types().map(|t| t.as_str()).collect();
        assert_eq!(types, vec!["file"]);
    }
}
