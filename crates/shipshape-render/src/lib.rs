//! Rendering of a finished [`ResultList`] for terminals and CI.
//!
//! Every renderer is a pure function returning a `String`; writing it out is
//! the caller's job.

#![forbid(unsafe_code)]

mod junit;
mod simple;
mod table;

use shipshape_types::ResultList;

pub use junit::render_junit;
pub use simple::render_simple;
pub use table::render_table;

/// Printed by the text renderers when no check ran at all.
pub const NO_RESULT: &str =
    "No result available; ensure your shipshape.yml is configured correctly.\n";

/// Pretty-printed JSON, newline terminated.
pub fn render_json(list: &ResultList) -> serde_json::Result<String> {
    let mut out = serde_json::to_string_pretty(list)?;
    out.push('\n');
    Ok(out)
}
