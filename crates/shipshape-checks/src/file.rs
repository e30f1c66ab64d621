use serde::Deserialize;
use shipshape_domain::merge::{merge_string, merge_vec};
use shipshape_domain::{Check, CheckBase, MergeError, RunContext, downcast_check};
use shipshape_types::Breach;

use crate::files::find_files;

/// Fails for every file under `path` whose name matches
/// `disallowed-pattern`.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FileCheck {
    #[serde(flatten)]
    pub base: CheckBase,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub disallowed_pattern: String,
    #[serde(default)]
    pub exclude_pattern: String,
    #[serde(default)]
    pub skip_dir: Vec<String>,
}

impl Check for FileCheck {
    fn base(&self) -> &CheckBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut CheckBase {
        &mut self.base
    }

    fn merge(&mut self, other: &dyn Check) -> Result<(), MergeError> {
        let other = downcast_check::<Self>(other)?;
        self.base.merge(&other.base)?;
        merge_string(&mut self.path, &other.path);
        merge_string(&mut self.disallowed_pattern, &other.disallowed_pattern);
        merge_string(&mut self.exclude_pattern, &other.exclude_pattern);
        merge_vec(&mut self.skip_dir, &other.skip_dir);
        Ok(())
    }

    fn requires_data(&self) -> bool {
        false
    }

    fn run_check(&mut self, ctx: &RunContext) {
        let root = ctx.resolve(&self.path);
        let found = match find_files(
            &root,
            &self.disallowed_pattern,
            &self.exclude_pattern,
            &self.skip_dir,
        ) {
            Ok(found) => found,
            Err(e) => {
                self.base.add_breach(Breach::value(e.to_string()));
                return;
            }
        };

        if found.is_empty() {
            self.base.add_pass("No illegal files");
            return;
        }
        for path in found {
            let shown = path
                .strip_prefix(&ctx.project_dir)
                .map(|rel| rel.to_string())
                .unwrap_or_else(|_| path.to_string());
            self.base.add_value_breach("illegal file", shown);
        }
    }
}
