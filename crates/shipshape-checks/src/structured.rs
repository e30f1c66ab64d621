//! Shared plumbing for checks that evaluate key-value rules against parsed
//! config files: where the files come from, how they are parsed, and how rule
//! outcomes turn into breaches and passes.

use std::collections::BTreeMap;
use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use rayon::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use shipshape_domain::merge::{merge_option, merge_string, merge_vec};
use shipshape_domain::{CheckBase, DataMap, KeyValue, KeyValueOutcome, RunContext};
use shipshape_types::{Breach, KeyValueBreach, KeyValuesBreach};
use tracing::debug;

use crate::files::find_files;

/// Which files a check reads, relative to the project directory.
///
/// Exactly one of `file`, `files` or `pattern` is used, in that order of
/// preference. `pattern` is a regular expression matched against file names
/// under `path`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileSource {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub file: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub exclude_pattern: String,
    #[serde(default)]
    pub ignore_missing: Option<bool>,
}

impl FileSource {
    pub fn merge(&mut self, other: &FileSource) {
        merge_string(&mut self.path, &other.path);
        merge_string(&mut self.file, &other.file);
        merge_vec(&mut self.files, &other.files);
        merge_string(&mut self.pattern, &other.pattern);
        merge_string(&mut self.exclude_pattern, &other.exclude_pattern);
        merge_option(&mut self.ignore_missing, &other.ignore_missing);
    }

    fn ignore_missing(&self) -> bool {
        self.ignore_missing.unwrap_or(false)
    }

    /// Reads the configured files into `base`'s data map.
    ///
    /// The data map is always initialised, so a run where every file was
    /// skipped as missing still counts as having data.
    pub fn fetch(&self, base: &mut CheckBase, ctx: &RunContext) {
        base.data_map = Some(DataMap::new());
        let dir = Utf8Path::new(&self.path);

        let targets: Vec<(String, Utf8PathBuf)> = if !self.file.is_empty() {
            vec![(dir.join(&self.file).into_string(), ctx.resolve(dir.join(&self.file)))]
        } else if !self.files.is_empty() {
            self.files
                .iter()
                .map(|f| (dir.join(f).into_string(), ctx.resolve(dir.join(f))))
                .collect()
        } else if !self.pattern.is_empty() {
            match self.find(base, ctx) {
                Some(found) => found,
                None => return,
            }
        } else {
            base.add_breach(Breach::value("no file provided"));
            return;
        };

        let reads: Vec<(String, Utf8PathBuf, io::Result<Vec<u8>>)> = targets
            .into_par_iter()
            .map(|(key, full)| {
                let bytes = std::fs::read(&full);
                (key, full, bytes)
            })
            .collect();

        for (key, full, bytes) in reads {
            match bytes {
                Ok(bytes) => {
                    debug!(file = %full, bytes = bytes.len(), "read config file");
                    base.insert_data(key, bytes);
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound && self.ignore_missing() => {
                    base.add_pass(format!("File {full} does not exist"));
                }
                Err(e) => {
                    base.add_value_breach(format!("error reading file: {full}"), e.to_string());
                }
            }
        }
    }

    fn find(&self, base: &mut CheckBase, ctx: &RunContext) -> Option<Vec<(String, Utf8PathBuf)>> {
        let root = ctx.resolve(&self.path);
        let found = match find_files(&root, &self.pattern, &self.exclude_pattern, &[]) {
            Ok(found) => found,
            Err(e) if e.is_missing() && self.ignore_missing() => {
                base.add_pass(format!("Path {root} does not exist"));
                return None;
            }
            Err(e) => {
                base.add_value_breach(format!("error finding files in path: {root}"), e.to_string());
                return None;
            }
        };

        if found.is_empty() {
            if self.ignore_missing() {
                base.add_pass("no matching config files found");
            } else {
                base.add_breach(Breach::value("no matching yaml files found"));
            }
            return None;
        }

        Some(
            found
                .into_iter()
                .map(|full| {
                    let key = full
                        .strip_prefix(&ctx.project_dir)
                        .map(|rel| rel.as_str().to_string())
                        .unwrap_or_else(|_| full.as_str().to_string());
                    (key, full)
                })
                .collect(),
        )
    }
}

pub(crate) fn parse_yaml(bytes: &[u8]) -> Result<Value, String> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_yaml::from_slice(bytes).map_err(|e| e.to_string())
}

pub(crate) fn parse_json(bytes: &[u8]) -> Result<Value, String> {
    serde_json::from_slice(bytes).map_err(|e| e.to_string())
}

/// Parses every entry of `base`'s data map, stopping at the first entry
/// that fails.
///
/// The failure is recorded as a breach labelled `<label>: <source>` and no
/// documents are returned, so nothing is evaluated against a partial set.
pub(crate) fn parse_documents(
    base: &mut CheckBase,
    label: &str,
    parse: fn(&[u8]) -> Result<Value, String>,
) -> BTreeMap<String, Value> {
    let mut documents = BTreeMap::new();
    let mut failure = None;
    for (source, bytes) in base.data() {
        match parse(bytes) {
            Ok(doc) => {
                documents.insert(source.clone(), doc);
            }
            Err(e) => {
                failure = Some((source.clone(), e));
                break;
            }
        }
    }
    match failure {
        Some((source, error)) => {
            base.add_value_breach(format!("{label}: {source}"), error);
            BTreeMap::new()
        }
        None => documents,
    }
}

/// Parses every entry of `base`'s data map and returns the sources that
/// parsed. Each failure becomes its own `<label>: <source>` breach.
pub(crate) fn lint_documents(
    base: &mut CheckBase,
    label: &str,
    parse: fn(&[u8]) -> Result<Value, String>,
) -> Vec<String> {
    let mut valid = Vec::new();
    let mut failures = Vec::new();
    for (source, bytes) in base.data() {
        match parse(bytes) {
            Ok(_) => valid.push(source.clone()),
            Err(e) => failures.push((source.clone(), e)),
        }
    }
    for (source, error) in failures {
        base.add_value_breach(format!("{label}: {source}"), error);
    }
    valid
}

/// Evaluates every rule against every document.
pub(crate) fn evaluate_rules(
    base: &mut CheckBase,
    documents: &BTreeMap<String, Value>,
    rules: &[KeyValue],
) {
    for (source, document) in documents {
        for rule in rules {
            let outcome = rule.check(document);
            report_outcome(base, source, rule, outcome);
        }
    }
}

/// Records one rule outcome for the document identified by `source`.
pub(crate) fn report_outcome(
    base: &mut CheckBase,
    source: &str,
    rule: &KeyValue,
    outcome: KeyValueOutcome,
) {
    match outcome {
        KeyValueOutcome::Error(e) => base.add_breach(Breach::value(e.to_string())),
        KeyValueOutcome::NotFound => base.add_breach(Breach::new(KeyValueBreach {
            key_label: "config".to_string(),
            key: source.to_string(),
            value_label: "key not found".to_string(),
            value: rule.key.clone(),
            expected_value: None,
        })),
        KeyValueOutcome::NotEqual(mismatches) => {
            let actual = mismatches.into_iter().next().unwrap_or_default();
            base.add_breach(Breach::new(KeyValueBreach {
                key_label: source.to_string(),
                key: rule.key.clone(),
                value_label: "actual".to_string(),
                value: actual,
                expected_value: Some(rule.value.clone()),
            }));
        }
        KeyValueOutcome::DisallowedFound(values) => base.add_breach(Breach::new(KeyValuesBreach {
            key_label: "config".to_string(),
            key: source.to_string(),
            value_label: format!("disallowed {}", rule.key),
            values,
        })),
        KeyValueOutcome::Equal if rule.is_list => {
            base.add_pass(format!("[{source}] no disallowed '{}'", rule.key));
        }
        KeyValueOutcome::Equal => {
            base.add_pass(format!("[{source}] '{}' equals '{}'", rule.key, rule.value));
        }
    }
}
