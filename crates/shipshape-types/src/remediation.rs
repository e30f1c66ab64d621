use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::breach::Breach;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RemediationStatus {
    NoSupport,
    Success,
    Failed,
    Partial,
}

impl RemediationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RemediationStatus::NoSupport => "no-support",
            RemediationStatus::Success => "success",
            RemediationStatus::Failed => "failed",
            RemediationStatus::Partial => "partial",
        }
    }
}

impl fmt::Display for RemediationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of trying to fix one breach.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Remediation {
    pub status: RemediationStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<String>,
}

impl Remediation {
    pub fn new(status: RemediationStatus) -> Self {
        Self {
            status,
            messages: Vec::new(),
        }
    }
}

/// Tally of per-breach remediation outcomes.
///
/// `overall` folds the tally into a single status; rules are checked in order
/// and the first match wins:
/// 1. any `partial`, or some `success` alongside some `failed`/`no-support` => partial
/// 2. only `no-support` => no-support
/// 3. only `failed` => failed
/// 4. anything else (including an empty tally) => success
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "kebab-case")]
pub struct RemediationCounts {
    pub unsupported: u32,
    pub successful: u32,
    pub failed: u32,
    pub partial: u32,
}

impl RemediationCounts {
    pub fn from_breaches<'a>(breaches: impl IntoIterator<Item = &'a Breach>) -> Self {
        let mut counts = Self::default();
        for status in breaches.into_iter().filter_map(Breach::remediation_status) {
            counts.record(status);
        }
        counts
    }

    pub fn record(&mut self, status: RemediationStatus) {
        match status {
            RemediationStatus::NoSupport => self.unsupported += 1,
            RemediationStatus::Success => self.successful += 1,
            RemediationStatus::Failed => self.failed += 1,
            RemediationStatus::Partial => self.partial += 1,
        }
    }

    pub fn add(&mut self, other: &RemediationCounts) {
        self.unsupported += other.unsupported;
        self.successful += other.successful;
        self.failed += other.failed;
        self.partial += other.partial;
    }

    pub fn total(&self) -> u32 {
        self.unsupported + self.successful + self.failed + self.partial
    }

    pub fn overall(&self) -> RemediationStatus {
        let any_unsuccessful = self.failed > 0 || self.unsupported > 0;
        if self.partial > 0 || (self.successful > 0 && any_unsuccessful) {
            return RemediationStatus::Partial;
        }
        if self.unsupported > 0 && self.successful == 0 && self.failed == 0 {
            return RemediationStatus::NoSupport;
        }
        if self.failed > 0 && self.successful == 0 && self.unsupported == 0 {
            return RemediationStatus::Failed;
        }
        RemediationStatus::Success
    }
}
