use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::CheckType;
use crate::remediation::{Remediation, RemediationStatus};
use crate::severity::Severity;

/// A single policy violation raised by a check.
///
/// The common fields (`check-type`, `check-name`, `severity`) are stamped when
/// the breach is appended to a result, not when it is constructed. The only
/// field that changes afterwards is `remediation`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct Breach {
    #[serde(default)]
    pub check_type: CheckType,
    #[serde(default)]
    pub check_name: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(flatten)]
    pub kind: BreachKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remediation: Option<Remediation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "breach-type", rename_all = "kebab-case")]
pub enum BreachKind {
    Value(ValueBreach),
    KeyValue(KeyValueBreach),
    KeyValues(KeyValuesBreach),
}

/// A labelled scalar, e.g. `[illegal file] web/info.php`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct ValueBreach {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_label: Option<String>,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct KeyValueBreach {
    #[serde(default)]
    pub key_label: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value_label: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_value: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct KeyValuesBreach {
    #[serde(default)]
    pub key_label: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value_label: String,
    #[serde(default)]
    pub values: Vec<String>,
}

impl ValueBreach {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    pub fn labelled(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            value_label: Some(label.into()),
            value: value.into(),
            expected_value: None,
        }
    }
}

impl Breach {
    pub fn new(kind: impl Into<BreachKind>) -> Self {
        Self {
            check_type: CheckType::default(),
            check_name: String::new(),
            severity: Severity::default(),
            kind: kind.into(),
            remediation: None,
        }
    }

    /// Shorthand for an unlabelled value breach.
    pub fn value(value: impl Into<String>) -> Self {
        Self::new(ValueBreach::new(value))
    }

    pub fn set_common_values(&mut self, check_type: &CheckType, check_name: &str, severity: Severity) {
        self.check_type = check_type.clone();
        self.check_name = check_name.to_string();
        self.severity = severity;
    }

    /// Records a remediation outcome. Messages accumulate across calls; an
    /// empty message only updates the status.
    pub fn set_remediation(&mut self, status: RemediationStatus, message: impl Into<String>) {
        let message = message.into();
        let remediation = self
            .remediation
            .get_or_insert_with(|| Remediation::new(status));
        remediation.status = status;
        if !message.is_empty() {
            remediation.messages.push(message);
        }
    }

    pub fn remediation_status(&self) -> Option<RemediationStatus> {
        self.remediation.as_ref().map(|r| r.status)
    }
}

impl From<ValueBreach> for BreachKind {
    fn from(value: ValueBreach) -> Self {
        BreachKind::Value(value)
    }
}

impl From<KeyValueBreach> for BreachKind {
    fn from(value: KeyValueBreach) -> Self {
        BreachKind::KeyValue(value)
    }
}

impl From<KeyValuesBreach> for BreachKind {
    fn from(value: KeyValuesBreach) -> Self {
        BreachKind::KeyValues(value)
    }
}

impl fmt::Display for Breach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.kind, f)
    }
}

impl fmt::Display for BreachKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreachKind::Value(b) => fmt::Display::fmt(b, f),
            BreachKind::KeyValue(b) => fmt::Display::fmt(b, f),
            BreachKind::KeyValues(b) => fmt::Display::fmt(b, f),
        }
    }
}

impl fmt::Display for ValueBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value_label.as_deref() {
            Some(label) if !label.is_empty() => write!(f, "[{label}] {}", self.value),
            _ => f.write_str(&self.value),
        }
    }
}

impl fmt::Display for KeyValueBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.expected_value.as_deref() {
            Some(expected) => write!(
                f,
                "[{}] '{}' equals '{}', expected '{expected}'",
                self.key_label, self.key, self.value
            ),
            None => write!(
                f,
                "[{}:{}] {}: {}",
                self.key_label, self.key, self.value_label, self.value
            ),
        }
    }
}

impl fmt::Display for KeyValuesBreach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}:{}] {}: [{}]",
            self.key_label,
            self.key,
            self.value_label,
            self.values.join(", ")
        )
    }
}
