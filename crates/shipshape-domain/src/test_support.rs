use serde::Deserialize;
use shipshape_types::Breach;

use crate::check::{Check, CheckBase, MergeError, RunContext, downcast_check};
use crate::merge::merge_option;

/// Scriptable check for engine and merge tests.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TestCheck {
    #[serde(flatten)]
    pub base: CheckBase,
    #[serde(default)]
    pub option: Option<String>,
    #[serde(skip)]
    pub fetch_breach: Option<String>,
    #[serde(skip)]
    pub run_breaches: Vec<String>,
    #[serde(skip)]
    pub panic_on_run: bool,
    #[serde(skip)]
    pub needs_data: bool,
    #[serde(skip)]
    pub ran: bool,
}

impl TestCheck {
    pub fn new(name: &str) -> Self {
        Self {
            base: CheckBase::named(name),
            ..Self::default()
        }
    }

    pub fn breaching(name: &str, breaches: &[&str]) -> Self {
        Self {
            run_breaches: breaches.iter().map(|b| b.to_string()).collect(),
            ..Self::new(name)
        }
    }
}

impl Check for TestCheck {
    fn base(&self) -> &CheckBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CheckBase {
        &mut self.base
    }

    fn merge(&mut self, other: &dyn Check) -> Result<(), MergeError> {
        let other = downcast_check::<Self>(other)?;
        self.base.merge(&other.base)?;
        merge_option(&mut self.option, &other.option);
        Ok(())
    }

    fn requires_data(&self) -> bool {
        self.needs_data
    }

    fn fetch_data(&mut self, _ctx: &RunContext) {
        match &self.fetch_breach {
            Some(msg) => {
                let msg = msg.clone();
                self.base.add_breach(Breach::value(msg));
            }
            None => self.base.insert_data("source", b"data".to_vec()),
        }
    }

    fn run_check(&mut self, _ctx: &RunContext) {
        self.ran = true;
        if self.panic_on_run {
            panic!("boom");
        }
        if self.run_breaches.is_empty() {
            self.base.add_pass("all good");
        }
        for b in self.run_breaches.clone() {
            self.base.add_breach(Breach::value(b));
        }
    }
}
