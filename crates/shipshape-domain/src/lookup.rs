//! Path queries over parsed documents.
//!
//! A key starting with `$` is an RFC 9535 JSONPath query evaluated by
//! `serde_json_path`, so filters, slices and unions are all available.
//! Any other key is a plain dotted member path (`page.front`,
//! `config.sort-packages`): each dot-separated part names an object member
//! verbatim.

use serde_json::Value;
use serde_json_path::JsonPath;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid path '{path}': {reason}")]
pub struct PathError {
    pub path: String,
    pub reason: String,
}

/// Compiles `key` into a JSONPath query.
pub fn compile(key: &str) -> Result<JsonPath, PathError> {
    let key = key.trim();
    let error = |reason: String| PathError {
        path: key.to_string(),
        reason,
    };
    if key.is_empty() {
        return Err(error("empty path".to_string()));
    }

    let query = if key.starts_with('$') {
        key.to_string()
    } else {
        dotted_to_query(key)
    };
    JsonPath::parse(&query).map_err(|e| error(e.to_string()))
}

fn dotted_to_query(key: &str) -> String {
    let mut query = String::from("$");
    for member in key.split('.') {
        query.push_str("['");
        for c in member.chars() {
            if matches!(c, '\'' | '\\') {
                query.push('\\');
            }
            query.push(c);
        }
        query.push_str("']");
    }
    query
}

/// Every value in `document` selected by `key`, in document order.
pub fn find<'a>(document: &'a Value, key: &str) -> Result<Vec<&'a Value>, PathError> {
    Ok(compile(key)?.query(document).all())
}
