//! Check orchestration for shipshape (no filesystem access of its own).
//!
//! Input: a [`CheckMap`] of decoded, initialised checks.
//! Output: a [`shipshape_types::ResultList`] with per-check results and
//! run-level counters.

#![forbid(unsafe_code)]

pub mod check;
pub mod engine;
pub mod invalid;
pub mod keyvalue;
pub mod lookup;
pub mod merge;
pub mod model;
pub mod registry;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use check::{Check, CheckBase, DataMap, MergeError, RunContext, downcast_check};
pub use engine::{ResultCollector, process_check, run_checks};
pub use invalid::InvalidCheck;
pub use keyvalue::{KeyValue, KeyValueOutcome, RuleError};
pub use model::CheckMap;
pub use registry::Registry;
