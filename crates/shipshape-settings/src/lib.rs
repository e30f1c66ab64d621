//! Policy document parsing, merging and resolution.
//!
//! This crate is IO-free: documents arrive as strings and leave as a
//! [`ResolvedConfig`] ready for the engine.

#![forbid(unsafe_code)]

mod decode;
mod model;
mod resolve;

pub use decode::{ConfigError, parse_config_yaml};
pub use model::{Config, PolicyDocument};
pub use resolve::{Overrides, ResolvedConfig};

use shipshape_domain::Registry;

/// Parse every document in order and merge them into one [`Config`].
///
/// `sources` pairs a label (file path or URL, used in error messages) with
/// the document text.
pub fn load_configs<'a>(
    sources: impl IntoIterator<Item = (&'a str, &'a str)>,
    registry: &Registry,
) -> anyhow::Result<Config> {
    resolve::load_configs(sources, registry)
}

/// Apply defaults and overrides, initialise every check and narrow the set
/// to the checks that should run.
pub fn resolve_config(cfg: Config, overrides: Overrides) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
