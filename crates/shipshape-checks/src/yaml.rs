use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use shipshape_domain::merge::merge_vec_by_key;
use shipshape_domain::{Check, CheckBase, KeyValue, MergeError, RunContext, downcast_check};

use crate::structured::{FileSource, evaluate_rules, lint_documents, parse_documents, parse_yaml};

/// Evaluates key-value rules against one or more YAML files.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct YamlCheck {
    #[serde(flatten)]
    pub base: CheckBase,
    #[serde(flatten)]
    pub source: FileSource,
    #[serde(default)]
    pub values: Vec<KeyValue>,
    #[serde(skip)]
    documents: BTreeMap<String, Value>,
}

impl Check for YamlCheck {
    fn base(&self) -> &CheckBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CheckBase {
        &mut self.base
    }

    fn merge(&mut self, other: &dyn Check) -> Result<(), MergeError> {
        let other = downcast_check::<Self>(other)?;
        self.base.merge(&other.base)?;
        self.source.merge(&other.source);
        merge_vec_by_key(&mut self.values, &other.values, |kv| kv.key.clone());
        Ok(())
    }

    fn fetch_data(&mut self, ctx: &RunContext) {
        self.source.fetch(&mut self.base, ctx);
    }

    fn unmarshal_data_map(&mut self) {
        self.documents = parse_documents(&mut self.base, "yaml error", parse_yaml);
    }

    fn run_check(&mut self, _ctx: &RunContext) {
        evaluate_rules(&mut self.base, &self.documents, &self.values);
    }
}

/// Only verifies that the files parse as YAML.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct YamlLintCheck {
    #[serde(flatten)]
    pub base: CheckBase,
    #[serde(flatten)]
    pub source: FileSource,
}

impl Check for YamlLintCheck {
    fn base(&self) -> &CheckBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CheckBase {
        &mut self.base
    }

    fn merge(&mut self, other: &dyn Check) -> Result<(), MergeError> {
        let other = downcast_check::<Self>(other)?;
        self.base.merge(&other.base)?;
        self.source.merge(&other.source);
        Ok(())
    }

    fn fetch_data(&mut self, ctx: &RunContext) {
        self.source.fetch(&mut self.base, ctx);
    }

    fn unmarshal_data_map(&mut self) {
        for source in lint_documents(&mut self.base, "yaml error", parse_yaml) {
            self.base.add_pass(format!("{source} has valid yaml."));
        }
    }

    // Parsing is the whole check.
    fn run_check(&mut self, _ctx: &RunContext) {}
}
