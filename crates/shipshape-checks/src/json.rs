use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use shipshape_domain::merge::merge_vec_by_key;
use shipshape_domain::{Check, CheckBase, KeyValue, MergeError, RunContext, downcast_check};

use crate::structured::{FileSource, evaluate_rules, parse_documents, parse_json};

/// Key-value rules over JSON files, e.g. `composer.json`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct JsonCheck {
    #[serde(flatten)]
    pub base: CheckBase,
    #[serde(flatten)]
    pub source: FileSource,
    #[serde(default)]
    pub key_values: Vec<KeyValue>,
    #[serde(skip)]
    documents: BTreeMap<String, Value>,
}

impl Check for JsonCheck {
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
        merge_vec_by_key(&mut self.key_values, &other.key_values, |kv| kv.key.clone());
        Ok(())
    }

    fn fetch_data(&mut self, ctx: &RunContext) {
        self.source.fetch(&mut self.base, ctx);
    }

    fn unmarshal_data_map(&mut self) {
        self.documents = parse_documents(&mut self.base, "json error", parse_json);
    }

    fn run_check(&mut self, _ctx: &RunContext) {
        evaluate_rules(&mut self.base, &self.documents, &self.key_values);
    }
}
