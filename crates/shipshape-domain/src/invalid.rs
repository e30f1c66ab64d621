use crate::check::{Check, CheckBase, MergeError, RunContext};

/// Stands in for a policy entry that could not be decoded.
///
/// It never fetches data or evaluates policy; running it records the decode
/// error as a breach so the rest of the run carries on.
#[derive(Clone, Debug)]
pub struct InvalidCheck {
    base: CheckBase,
    error: String,
    requires_database: bool,
}

impl InvalidCheck {
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            base: CheckBase::named(name),
            error: error.into(),
            requires_database: false,
        }
    }

    /// Marks the placeholder as standing in for a database-backed check type,
    /// so excluding database checks drops it too.
    pub fn requiring_database(mut self, requires_database: bool) -> Self {
        self.requires_database = requires_database;
        self
    }

    pub fn error(&self) -> &str {
        &self.error
    }

    /// Same error, attached to another check's name.
    pub fn renamed(&self, name: &str) -> Self {
        Self::new(name, self.error.clone()).requiring_database(self.requires_database)
    }
}

impl Check for InvalidCheck {
    fn base(&self) -> &CheckBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CheckBase {
        &mut self.base
    }

    /// The decode error stays authoritative; later overrides are ignored.
    fn merge(&mut self, _other: &dyn Check) -> Result<(), MergeError> {
        Ok(())
    }

    fn requires_data(&self) -> bool {
        false
    }

    fn requires_database(&self) -> bool {
        self.requires_database
    }

    fn run_check(&mut self, _ctx: &RunContext) {
        let error = self.error.clone();
        self.base.add_value_breach("invalid configuration", error);
    }
}
