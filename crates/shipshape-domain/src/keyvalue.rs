//! Key-value rule evaluation shared by every structured-data check.
//!
//! A rule names a path into a parsed document and says what the value(s)
//! found there must look like: equal to an expected value, or free of
//! disallowed entries, or limited to allowed entries.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::lookup::{self, PathError};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct KeyValue {
    pub key: String,
    #[serde(default, deserialize_with = "scalar_string")]
    pub value: String,
    #[serde(default)]
    pub truthy: bool,
    #[serde(default)]
    pub is_list: bool,
    #[serde(default)]
    pub optional: bool,
    #[serde(
        default,
        alias = "disallowed-values",
        deserialize_with = "scalar_strings"
    )]
    pub disallowed: Vec<String>,
    #[serde(default, alias = "allowed-values", deserialize_with = "scalar_strings")]
    pub allowed: Vec<String>,
}

/// Any YAML scalar as text (`1`, `true`, `1.5`); `null` becomes empty.
fn yaml_scalar_to_string(value: serde_yaml::Value) -> Result<String, String> {
    match value {
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Tagged(tagged) => yaml_scalar_to_string(tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => {
            Err("expected a scalar value".to_string())
        }
    }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = serde_yaml::Value::deserialize(deserializer)?;
    yaml_scalar_to_string(value).map_err(D::Error::custom)
}

fn scalar_strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Vec::<serde_yaml::Value>::deserialize(deserializer)?
        .into_iter()
        .map(|v| yaml_scalar_to_string(v).map_err(D::Error::custom))
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    #[error(transparent)]
    InvalidPath(#[from] PathError),
    #[error("list of allowed or disallowed values not provided")]
    MissingValueLists,
    #[error("A list of values was found but is-list is not set")]
    UnexpectedList,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyValueOutcome {
    Error(RuleError),
    NotFound,
    /// Carries the distinct mismatching values, first-seen order.
    NotEqual(Vec<String>),
    /// Carries the distinct violating values, first-seen order.
    DisallowedFound(Vec<String>),
    Equal,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Truthiness {
    True,
    False,
    Neither,
}

fn truthiness(value: &str) -> Truthiness {
    match value {
        "1" | "true" => Truthiness::True,
        "0" | "false" | "null" => Truthiness::False,
        _ => Truthiness::Neither,
    }
}

/// Renders a scalar the way it would appear in a config file.
pub fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !values.contains(&value) {
        values.push(value);
    }
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            ..Self::default()
        }
    }

    fn has_value_lists(&self) -> bool {
        !self.allowed.is_empty() || !self.disallowed.is_empty()
    }

    /// Compares `actual` with the expected value: by truthiness bucket when
    /// `truthy` is set, otherwise case-insensitively.
    pub fn equals(&self, actual: &str) -> bool {
        if self.truthy {
            let expected = truthiness(&self.value);
            return expected != Truthiness::Neither && expected == truthiness(actual);
        }
        self.value.to_lowercase() == actual.to_lowercase()
    }

    /// Blank values never violate; otherwise a value violates when it is
    /// disallowed, or when an allow-list exists and does not contain it.
    pub fn is_disallowed(&self, value: &str) -> bool {
        if value.trim().is_empty() {
            return false;
        }
        if self.disallowed.iter().any(|d| d == value) {
            return true;
        }
        !self.allowed.is_empty() && !self.allowed.iter().any(|a| a == value)
    }

    /// Looks the rule's key up in `document` and evaluates what was found.
    pub fn check(&self, document: &Value) -> KeyValueOutcome {
        match lookup::find(document, &self.key) {
            Ok(found) => self.evaluate(&found),
            Err(e) => KeyValueOutcome::Error(e.into()),
        }
    }

    /// Evaluates values already located by a path query.
    pub fn evaluate(&self, found: &[&Value]) -> KeyValueOutcome {
        if found.is_empty() {
            return if self.optional {
                KeyValueOutcome::Equal
            } else {
                KeyValueOutcome::NotFound
            };
        }

        if !self.has_value_lists() {
            if self.is_list {
                return KeyValueOutcome::Error(RuleError::MissingValueLists);
            }
            let mut not_equal = Vec::new();
            for item in found {
                if item.is_array() {
                    return KeyValueOutcome::Error(RuleError::UnexpectedList);
                }
                let actual = scalar_to_string(item);
                if !self.equals(&actual) {
                    push_unique(&mut not_equal, actual);
                }
            }
            return if not_equal.is_empty() {
                KeyValueOutcome::Equal
            } else {
                KeyValueOutcome::NotEqual(not_equal)
            };
        }

        let mut violations = Vec::new();
        for item in found {
            match item {
                Value::Array(elements) if self.is_list => {
                    for element in elements {
                        self.collect_violation(element, &mut violations);
                    }
                }
                Value::Array(_) => return KeyValueOutcome::Error(RuleError::UnexpectedList),
                scalar => self.collect_violation(scalar, &mut violations),
            }
        }
        if violations.is_empty() {
            KeyValueOutcome::Equal
        } else {
            KeyValueOutcome::DisallowedFound(violations)
        }
    }

    fn collect_violation(&self, value: &Value, violations: &mut Vec<String>) {
        if is_blank(value) {
            return;
        }
        let value = scalar_to_string(value);
        if self.is_disallowed(&value) {
            push_unique(violations, value);
        }
    }
}
