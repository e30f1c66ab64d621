//! Check-type tags.
//!
//! A tag is the key used under `checks:` in a policy document and the
//! `check-type` reported on every result and breach.

use std::borrow::Borrow;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const CHECK_FILE: &str = "file";
pub const CHECK_YAML: &str = "yaml";
pub const CHECK_YAMLLINT: &str = "yamllint";
pub const CHECK_JSON: &str = "json";
pub const CHECK_DRUSH_YAML: &str = "drush-yaml";

#[derive(
    Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct CheckType(String);

impl CheckType {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CheckType {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CheckType {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Borrow<str> for CheckType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CheckType {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CheckType {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
