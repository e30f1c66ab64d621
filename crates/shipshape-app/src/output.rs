use std::fmt;
use std::str::FromStr;

use anyhow::Context;
use shipshape_types::ResultList;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Junit,
    #[default]
    Simple,
    Table,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown output format: {0} (expected json, junit, simple or table)")]
pub struct ParseOutputFormatError(String);

impl OutputFormat {
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Json,
        OutputFormat::Junit,
        OutputFormat::Simple,
        OutputFormat::Table,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Junit => "junit",
            OutputFormat::Simple => "simple",
            OutputFormat::Table => "table",
        }
    }

    pub fn render(self, list: &ResultList) -> anyhow::Result<String> {
        Ok(match self {
            OutputFormat::Json => {
                shipshape_render::render_json(list).context("serialize result list")?
            }
            OutputFormat::Junit => shipshape_render::render_junit(list),
            OutputFormat::Simple => shipshape_render::render_simple(list),
            OutputFormat::Table => shipshape_render::render_table(list),
        })
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ParseOutputFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == wanted)
            .ok_or_else(|| ParseOutputFormatError(s.to_string()))
    }
}
