use camino::Utf8PathBuf;
use shipshape_domain::{CheckMap, InvalidCheck, MergeError, Registry};
use tracing::{debug, warn};

use crate::model::{Config, PolicyDocument};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to parse policy document: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("list required under check type '{0}'")]
    NotAList(String),
    #[error(transparent)]
    Merge(#[from] MergeError),
}

/// Parse one `shipshape.yml` document.
///
/// Check types the registry does not know are skipped. A single entry that
/// fails to decode becomes an [`InvalidCheck`] so it is reported when the run
/// happens instead of aborting everything.
pub fn parse_config_yaml(input: &str, registry: &Registry) -> Result<Config, ConfigError> {
    if input.trim().is_empty() {
        return Ok(Config::default());
    }
    let doc: PolicyDocument = serde_yaml::from_str(input)?;
    decode_document(doc, registry)
}

pub(crate) fn decode_document(
    doc: PolicyDocument,
    registry: &Registry,
) -> Result<Config, ConfigError> {
    let mut checks = CheckMap::new();
    for (check_type, entries) in doc.checks {
        if !registry.contains(&check_type) {
            warn!(check_type = %check_type, "unknown check type; skipping");
            continue;
        }
        let entries = match entries {
            serde_yaml::Value::Sequence(entries) => entries,
            serde_yaml::Value::Null => continue,
            _ => return Err(ConfigError::NotAList(check_type)),
        };
        for (index, entry) in entries.into_iter().enumerate() {
            let name = entry_name(&entry);
            let Some(decoded) = registry.decode(&check_type, entry) else {
                continue;
            };
            match decoded {
                Ok(check) => {
                    debug!(check_type = %check_type, check_name = %check.name(), "decoded check");
                    checks.push(check_type.as_str(), check);
                }
                Err(e) => {
                    warn!(check_type = %check_type, index, error = %e, "invalid check definition");
                    let invalid = InvalidCheck::new(name, e.to_string())
                        .requiring_database(registry.requires_database(&check_type));
                    checks.push(check_type.as_str(), Box::new(invalid));
                }
            }
        }
    }

    Ok(Config {
        project_dir: doc
            .project_dir
            .filter(|d| !d.is_empty())
            .map(Utf8PathBuf::from),
        fail_severity: doc.fail_severity,
        checks: (!checks.is_empty()).then_some(checks),
        remediate: false,
    })
}

fn entry_name(entry: &serde_yaml::Value) -> String {
    entry
        .get("name")
        .and_then(serde_yaml::Value::as_str)
        .unwrap_or_default()
        .to_string()
}
