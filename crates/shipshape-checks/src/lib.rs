//! Built-in check types.
//!
//! This crate does filesystem IO and spawns external processes (drush and
//! remediation commands). Everything it finds is reported through the
//! [`shipshape_domain::Check`] lifecycle; nothing here decides run status.

#![forbid(unsafe_code)]

pub mod command;
pub mod drush;
pub mod file;
pub mod files;
pub mod json;
pub mod structured;
pub mod yaml;

use shipshape_domain::Registry;
use shipshape_types::{CHECK_DRUSH_YAML, CHECK_FILE, CHECK_JSON, CHECK_YAML, CHECK_YAMLLINT};

pub use command::{CommandError, run_command};
pub use drush::DrushYamlCheck;
pub use file::FileCheck;
pub use files::{FindError, find_files};
pub use json::JsonCheck;
pub use structured::FileSource;
pub use yaml::{YamlCheck, YamlLintCheck};

/// Registers every built-in check type. Call once at startup.
pub fn register_all(registry: &mut Registry) {
    registry
        .register::<FileCheck>(CHECK_FILE)
        .register::<YamlCheck>(CHECK_YAML)
        .register::<YamlLintCheck>(CHECK_YAMLLINT)
        .register::<JsonCheck>(CHECK_JSON)
        .register::<DrushYamlCheck>(CHECK_DRUSH_YAML);
}

pub fn default_registry() -> Registry {
    let mut registry = Registry::new();
    register_all(&mut registry);
    registry
}
