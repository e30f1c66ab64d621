//! The lifecycle contract every check type implements.
//!
//! A check is decoded from a policy document, initialised once with its type
//! tag, optionally merged with same-named checks from later documents, and then
//! driven through `fetch_data -> has_data -> unmarshal_data_map -> run_check ->
//! remediate` by the engine. Everything it finds lands on its own
//! [`CheckResult`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use shipshape_types::{
    Breach, CheckResult, CheckType, RemediationStatus, Severity, ValueBreach,
};

use crate::merge::merge_option;

/// Raw bytes keyed by logical source (a file path, a config name).
pub type DataMap = BTreeMap<String, Vec<u8>>;

/// Per-run inputs shared read-only by every check.
#[derive(Clone, Debug)]
pub struct RunContext {
    pub project_dir: Utf8PathBuf,
}

impl RunContext {
    pub fn new(project_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
        }
    }

    /// Resolves `path` against the project directory unless it is absolute.
    pub fn resolve(&self, path: impl AsRef<Utf8Path>) -> Utf8PathBuf {
        let path = path.as_ref();
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_dir.join(path)
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(".")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    #[error("can only merge checks with the same name: '{existing}' <- '{incoming}'")]
    NameMismatch { existing: String, incoming: String },
    #[error("cannot merge check '{name}' into a {expected}")]
    IncompatibleType { name: String, expected: &'static str },
}

pub trait Check: Any + Send + fmt::Debug {
    fn base(&self) -> &CheckBase;
    fn base_mut(&mut self) -> &mut CheckBase;

    /// Overrides this check with the options set on `other`, which must be
    /// the same concrete type (see [`downcast_check`]).
    fn merge(&mut self, other: &dyn Check) -> Result<(), MergeError>;

    fn init(&mut self, check_type: &CheckType) {
        self.base_mut().init(check_type);
    }

    fn name(&self) -> &str {
        &self.base().name
    }

    fn check_type(&self) -> &CheckType {
        self.base().check_type()
    }

    fn severity(&self) -> Severity {
        self.base().severity()
    }

    fn requires_data(&self) -> bool {
        true
    }

    fn requires_database(&self) -> bool {
        self.base().requires_db
    }

    fn set_perform_remediation(&mut self, perform: bool) {
        self.base_mut().perform_remediation = perform;
    }

    fn should_perform_remediation(&self) -> bool {
        self.base().perform_remediation
    }

    /// Populates the data map. Failures are recorded as breaches.
    fn fetch_data(&mut self, _ctx: &RunContext) {}

    fn has_data(&mut self, fail_check: bool) -> bool {
        self.base_mut().has_data(fail_check)
    }

    /// Parses the raw data map. Parse failures are recorded as breaches.
    fn unmarshal_data_map(&mut self) {}

    fn run_check(&mut self, _ctx: &RunContext) {
        self.base_mut().add_breach(Breach::value("not implemented"));
    }

    fn remediate(&mut self, _ctx: &RunContext) {
        self.base_mut().remediate_unsupported();
    }

    fn result(&self) -> &CheckResult {
        &self.base().result
    }
}

/// Views `other` as the concrete check type `T`.
pub fn downcast_check<T: Check>(other: &dyn Check) -> Result<&T, MergeError> {
    let any: &dyn Any = other;
    any.downcast_ref::<T>()
        .ok_or_else(|| MergeError::IncompatibleType {
            name: other.name().to_string(),
            expected: std::any::type_name::<T>(),
        })
}

/// State shared by all check types, flattened into each concrete check's
/// policy fields.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckBase {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(skip)]
    check_type: CheckType,
    #[serde(skip)]
    pub requires_db: bool,
    #[serde(skip)]
    pub data_map: Option<DataMap>,
    #[serde(skip)]
    pub result: CheckResult,
    #[serde(skip)]
    pub perform_remediation: bool,
}

impl CheckBase {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Idempotent. The type tag is stamped once; later calls with a different
    /// tag leave it unchanged.
    pub fn init(&mut self, check_type: &CheckType) {
        if self.check_type.is_empty() {
            self.check_type = check_type.clone();
        }
        let severity = *self.severity.get_or_insert_with(Severity::default);
        if self.result.check_type.is_empty() {
            self.result = CheckResult::new(self.name.clone(), self.check_type.clone(), severity);
        }
    }

    pub fn check_type(&self) -> &CheckType {
        &self.check_type
    }

    pub fn severity(&self) -> Severity {
        self.severity.unwrap_or_default()
    }

    pub fn merge(&mut self, other: &CheckBase) -> Result<(), MergeError> {
        if !self.name.is_empty() && !other.name.is_empty() && self.name != other.name {
            return Err(MergeError::NameMismatch {
                existing: self.name.clone(),
                incoming: other.name.clone(),
            });
        }
        merge_option(&mut self.severity, &other.severity);
        self.result.severity = self.severity();
        Ok(())
    }

    pub fn has_data(&mut self, fail_check: bool) -> bool {
        if self.data_map.is_some() {
            return true;
        }
        if fail_check {
            self.add_breach(Breach::value("no data available"));
        }
        false
    }

    pub fn data(&self) -> impl Iterator<Item = (&String, &Vec<u8>)> {
        self.data_map.iter().flat_map(|m| m.iter())
    }

    pub fn insert_data(&mut self, key: impl Into<String>, bytes: Vec<u8>) {
        self.data_map
            .get_or_insert_with(DataMap::new)
            .insert(key.into(), bytes);
    }

    /// Appends a breach, stamping it with this check's type, name and
    /// severity.
    pub fn add_breach(&mut self, mut breach: Breach) {
        breach.set_common_values(&self.check_type, &self.name, self.severity());
        self.result.breaches.push(breach);
    }

    pub fn add_value_breach(&mut self, label: impl Into<String>, value: impl Into<String>) {
        self.add_breach(Breach::new(ValueBreach::labelled(label, value)));
    }

    pub fn add_pass(&mut self, message: impl Into<String>) {
        self.result.passes.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.result.warnings.push(message.into());
    }

    pub fn has_breaches(&self) -> bool {
        !self.result.breaches.is_empty()
    }

    pub fn remediate_unsupported(&mut self) {
        self.remediate_all(RemediationStatus::NoSupport, "");
    }

    /// Sets the same remediation outcome on every breach.
    pub fn remediate_all(&mut self, status: RemediationStatus, message: &str) {
        for breach in &mut self.result.breaches {
            breach.set_remediation(status, message);
        }
    }
}
