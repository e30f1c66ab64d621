use std::collections::BTreeMap;
use std::fmt::Write as _;

use shipshape_types::{CheckResult, CheckType, ResultList};

/// One `<testsuite>` per check type, one `<testcase>` per check, one
/// `<error>` per breach.
pub fn render_junit(list: &ResultList) -> String {
    let mut suites: BTreeMap<&CheckType, Vec<&CheckResult>> = BTreeMap::new();
    for result in &list.results {
        suites.entry(&result.check_type).or_default().push(result);
    }

    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        out,
        "<testsuites tests=\"{}\" errors=\"{}\">",
        list.total_checks, list.total_breaches
    );
    for (check_type, results) in suites {
        let tests = list
            .check_count_by_type
            .get(check_type)
            .copied()
            .unwrap_or(results.len() as u32);
        let errors = list
            .breach_count_by_type
            .get(check_type)
            .copied()
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "    <testsuite name=\"{}\" tests=\"{tests}\" errors=\"{errors}\">",
            xml_escape(check_type.as_str())
        );
        for result in results {
            let name = xml_escape(&result.name);
            if result.breaches.is_empty() {
                let _ = writeln!(out, "        <testcase name=\"{name}\" classname=\"{name}\"></testcase>");
                continue;
            }
            let _ = writeln!(out, "        <testcase name=\"{name}\" classname=\"{name}\">");
            for breach in &result.breaches {
                let _ = writeln!(
                    out,
                    "            <error message=\"{}\"></error>",
                    xml_escape(&breach.to_string())
                );
            }
            out.push_str("        </testcase>\n");
        }
        out.push_str("    </testsuite>\n");
    }
    out.push_str("</testsuites>\n");
    out
}

fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
