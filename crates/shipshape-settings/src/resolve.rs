use anyhow::Context;
use camino::Utf8PathBuf;
use shipshape_domain::{CheckMap, Registry};
use shipshape_types::Severity;
use tracing::debug;

use crate::decode::{ConfigError, parse_config_yaml};
use crate::model::Config;

/// Values given on the command line; they beat anything in the documents.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub project_dir: Option<Utf8PathBuf>,
    pub fail_severity: Option<Severity>,
    /// Only run checks of these types (all types when empty).
    pub check_types: Vec<String>,
    pub exclude_db: bool,
    pub remediate: bool,
}

#[derive(Debug)]
pub struct ResolvedConfig {
    pub project_dir: Utf8PathBuf,
    pub fail_severity: Severity,
    pub checks: CheckMap,
    pub remediate: bool,
}

pub fn load_configs<'a>(
    sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    registry: &Registry,
) -> anyhow::Result<Config> {
    let mut merged = Config::default();
    for (label, text) in sources {
        let cfg = parse_config_yaml(text, registry)
            .with_context(|| format!("invalid policy document {label}"))?;
        debug!(source = label, checks = cfg.check_count(), "loaded policy document");
        merged
            .merge(cfg)
            .map_err(ConfigError::from)
            .with_context(|| format!("failed to merge policy document {label}"))?;
    }
    Ok(merged)
}

pub fn resolve_config(cfg: Config, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    let project_dir = overrides
        .project_dir
        .or(cfg.project_dir)
        .unwrap_or_else(|| Utf8PathBuf::from("."));
    let fail_severity = overrides
        .fail_severity
        .or(cfg.fail_severity)
        .unwrap_or(Severity::High);
    let remediate = overrides.remediate || cfg.remediate;

    let mut checks = cfg.checks.unwrap_or_default();
    checks.init_all();
    for check in checks.checks_mut() {
        check.set_perform_remediation(remediate);
    }
    checks.filter(&overrides.check_types, overrides.exclude_db);

    debug!(
        project_dir = %project_dir,
        fail_severity = %fail_severity,
        checks = checks.len(),
        "resolved config"
    );

    Ok(ResolvedConfig {
        project_dir,
        fail_severity,
        checks,
        remediate,
    })
}
