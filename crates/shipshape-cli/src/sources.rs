//! Reading policy documents from disk or over HTTP.

use anyhow::{Context, bail};
use tracing::debug;

fn is_url(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Reads every location in order, returning `(location, text)` pairs.
pub fn load_all(locations: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    locations
        .iter()
        .map(|location| Ok((location.clone(), load(location)?)))
        .collect()
}

pub fn load(location: &str) -> anyhow::Result<String> {
    if is_url(location) {
        return fetch(location);
    }
    debug!(file = location, "reading policy document");
    std::fs::read_to_string(location).with_context(|| format!("read config file {location}"))
}

fn fetch(url: &str) -> anyhow::Result<String> {
    debug!(url, "fetching policy document");
    let resp = reqwest::blocking::get(url).with_context(|| format!("fetch config {url}"))?;
    let status = resp.status();
    if !status.is_success() {
        bail!("fetch config {url}: HTTP {status}");
    }
    resp.text().with_context(|| format!("read body of {url}"))
}
