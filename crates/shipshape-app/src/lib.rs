//! Use case orchestration for shipshape.
//!
//! The CLI crate depends on this; it only handles argument parsing, reading
//! config sources and writing output.

#![forbid(unsafe_code)]

mod audit;
mod output;

pub use audit::{AuditInput, AuditOutput, exit_code, run_audit};
pub use output::{OutputFormat, ParseOutputFormatError};
