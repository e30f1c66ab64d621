//! Drupal configuration read through drush.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;
use shipshape_domain::merge::{merge_option, merge_string, merge_vec_by_key};
use shipshape_domain::{Check, CheckBase, KeyValue, MergeError, RunContext, downcast_check};
use shipshape_types::RemediationStatus;
use tracing::{info, warn};

use crate::command::{CommandError, run_command};
use crate::structured::{evaluate_rules, parse_documents, parse_yaml};

pub const DRUSH_DEFAULT_PATH: &str = "vendor/drush/drush/drush";

/// Runs `drush [@alias] <command> --format=yaml` and evaluates key-value rules
/// against the output, keyed by `config-name`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DrushYamlCheck {
    #[serde(flatten)]
    pub base: CheckBase,
    #[serde(default)]
    pub drush_path: String,
    #[serde(default)]
    pub alias: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub config_name: String,
    #[serde(default)]
    pub values: Vec<KeyValue>,
    #[serde(default)]
    pub remediate_command: String,
    #[serde(default)]
    pub remediate_msg: String,
    /// Seconds before drush (or the remediation command) is killed.
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(skip)]
    documents: BTreeMap<String, Value>,
}

impl DrushYamlCheck {
    fn drush_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        if !self.alias.is_empty() {
            args.push(format!("@{}", self.alias));
        }
        args.extend(self.command.split_whitespace().map(str::to_string));
        args.push("--format=yaml".to_string());
        args
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

impl Check for DrushYamlCheck {
    fn base(&self) -> &CheckBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CheckBase {
        &mut self.base
    }

    fn merge(&mut self, other: &dyn Check) -> Result<(), MergeError> {
        let other = downcast_check::<Self>(other)?;
        self.base.merge(&other.base)?;
        merge_string(&mut self.drush_path, &other.drush_path);
        merge_string(&mut self.alias, &other.alias);
        merge_string(&mut self.command, &other.command);
        merge_string(&mut self.config_name, &other.config_name);
        merge_vec_by_key(&mut self.values, &other.values, |kv| kv.key.clone());
        merge_string(&mut self.remediate_command, &other.remediate_command);
        merge_string(&mut self.remediate_msg, &other.remediate_msg);
        merge_option(&mut self.timeout, &other.timeout);
        Ok(())
    }

    fn requires_database(&self) -> bool {
        true
    }

    fn fetch_data(&mut self, ctx: &RunContext) {
        let drush = if self.drush_path.is_empty() {
            DRUSH_DEFAULT_PATH
        } else {
            self.drush_path.as_str()
        };
        let drush = ctx.resolve(drush);

        match run_command(
            drush.as_str(),
            &self.drush_args(),
            Some(&ctx.project_dir),
            self.timeout(),
        ) {
            Ok(output) => self.base.insert_data(self.config_name.clone(), output),
            Err(CommandError::NotFound { program, source }) => {
                self.base.add_value_breach(program, source.to_string());
            }
            Err(e) => {
                let label = self.config_name.clone();
                self.base.add_value_breach(label, e.message());
            }
        }
    }

    fn unmarshal_data_map(&mut self) {
        self.documents = parse_documents(&mut self.base, "yaml error", parse_yaml);
    }

    fn run_check(&mut self, _ctx: &RunContext) {
        evaluate_rules(&mut self.base, &self.documents, &self.values);
    }

    fn remediate(&mut self, ctx: &RunContext) {
        if self.remediate_command.is_empty() {
            warn!("no remediation command specified");
            self.base.remediate_unsupported();
            return;
        }

        info!(command = %self.remediate_command, "running remediation command");
        let args = vec!["-c".to_string(), self.remediate_command.clone()];
        match run_command("sh", &args, Some(&ctx.project_dir), self.timeout()) {
            Ok(_) => {
                let message = if self.remediate_msg.is_empty() {
                    format!(
                        "remediation command for config '{}' ran successfully",
                        self.config_name
                    )
                } else {
                    self.remediate_msg.clone()
                };
                self.base.remediate_all(RemediationStatus::Success, &message);
            }
            Err(e) => {
                let message = format!(
                    "error running remediation command for config '{}' due to error: {}",
                    self.config_name,
                    e.message()
                );
                self.base.remediate_all(RemediationStatus::Failed, &message);
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use shipshape_domain::{ResultCollector, process_check};
    use shipshape_types::{CHECK_DRUSH_YAML, CheckResult, CheckType};
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// A project whose `vendor/drush/drush/drush` is a shell script.
    fn project(drush_script: &str) -> (TempDir, RunContext) {
        let tmp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
        let drush = root.join(DRUSH_DEFAULT_PATH);
        std::fs::create_dir_all(drush.parent().expect("parent")).expect("mkdir");
        std::fs::write(&drush, format!("#!/bin/sh\n{drush_script}\n")).expect("write");
        std::fs::set_permissions(&drush, std::fs::Permissions::from_mode(0o755)).expect("chmod");
        (tmp, RunContext::new(root))
    }

    fn check(yaml: &str) -> DrushYamlCheck {
        serde_yaml::from_str(yaml).expect("decode")
    }

    fn run(mut check: DrushYamlCheck, ctx: &RunContext, remediate: bool) -> CheckResult {
        check.init(&CheckType::from(CHECK_DRUSH_YAML));
        check.set_perform_remediation(remediate);
        let collector = ResultCollector::new(remediate);
        process_check(&collector, &mut check, ctx, remediate);
        collector.into_result_list().results.remove(0)
    }

    const RULES: &str = concat!(
        "name: modules\n",
        "command: config:get core.extension\n",
        "config-name: core.extension\n",
        "values:\n",
        "  - {key: module, is-list: true, disallowed: [devel]}\n",
    );

    #[test]
    fn passes_arguments_and_evaluates_output() {
        // Echo the arguments back so the test can see them.
        let (_tmp, ctx) = project("echo \"args: '$*'\"; echo 'module: [node, system]'");
        let mut c = check(RULES);
        c.alias = "prod".to_string();
        c.values.push(KeyValue::new("args", "@prod config:get core.extension --format=yaml"));
        let result = run(c, &ctx, false);

        assert!(result.breaches.is_empty(), "{:?}", result.breaches);
        assert_eq!(result.passes.len(), 2);
    }

    #[test]
    fn disallowed_module_is_a_breach() {
        let (_tmp, ctx) = project("echo 'module: [node, devel]'");
        let result = run(check(RULES), &ctx, false);
        assert_eq!(result.breaches.len(), 1);
    }

    #[test]
    fn failing_drush_reports_stderr() {
        let (_tmp, ctx) = project("echo '  Config core.extension does not exist  ' >&2; exit 1");
        let result = run(check(RULES), &ctx, false);
        assert_eq!(
            result.breaches[0].to_string(),
            "[core.extension] Config core.extension does not exist"
        );
    }

    #[test]
    fn missing_drush_binary() {
        let tmp = TempDir::new().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
        let result = run(check(RULES), &RunContext::new(root.clone()), false);
        assert_eq!(result.breaches.len(), 1);
        assert!(
            result.breaches[0]
                .to_string()
                .starts_with(&format!("[{}] ", root.join(DRUSH_DEFAULT_PATH)))
        );
    }

    #[test]
    fn slow_drush_times_out() {
        let (_tmp, ctx) = project("sleep 5");
        let mut c = check(RULES);
        c.timeout = Some(0);
        let result = run(c, &ctx, false);
        assert!(result.breaches[0].to_string().contains("timed out"));
    }

    #[test]
    fn remediation_without_command_is_unsupported() {
        let (_tmp, ctx) = project("echo 'module: [devel]'");
        let result = run(check(RULES), &ctx, true);
        assert_eq!(result.remediation_status, Some(RemediationStatus::NoSupport));
    }

    #[test]
    fn remediation_command_success_and_failure() {
        let (_tmp, ctx) = project("echo 'module: [devel]'");

        let mut ok = check(RULES);
        ok.remediate_command = "touch fixed".to_string();
        let result = run(ok, &ctx, true);
        assert_eq!(result.remediation_status, Some(RemediationStatus::Success));
        assert_eq!(
            result.remediations,
            vec!["remediation command for config 'core.extension' ran successfully"]
        );
        assert!(ctx.project_dir.join("fixed").exists());

        let mut failing = check(RULES);
        failing.remediate_command = "echo nope >&2; exit 1".to_string();
        let result = run(failing, &ctx, true);
        assert_eq!(result.remediation_status, Some(RemediationStatus::Failed));
        let message = &result.breaches[0]
            .remediation
            .as_ref()
            .expect("remediation")
            .messages[0];
        assert_eq!(
            message,
            "error running remediation command for config 'core.extension' due to error: nope"
        );
    }

    #[test]
    fn always_needs_a_database() {
        assert!(check("name: d\n").requires_database());
    }
}
