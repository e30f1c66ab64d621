use std::fmt::Write as _;

use shipshape_types::{CheckStatus, RemediationStatus, ResultList};

use crate::NO_RESULT;

/// Human summary listing only what needs attention.
pub fn render_simple(list: &ResultList) -> String {
    if list.results.is_empty() {
        return NO_RESULT.to_string();
    }

    let mut out = String::new();

    if list.remediation_performed && list.total_breaches > 0 {
        match list.remediation_status() {
            Some(RemediationStatus::NoSupport) => {
                out.push_str(
                    "Breaches were detected but none of them could be fixed as remediation is not supported for them yet.\n\n",
                );
                out.push_str("# Non-remediated breaches\n\n");
            }
            Some(RemediationStatus::Failed) => {
                out.push_str(
                    "Breaches were detected but none of them could be fixed as there were errors when trying to remediate.\n\n",
                );
                out.push_str("# Non-remediated breaches\n\n");
            }
            Some(RemediationStatus::Partial) => {
                out.push_str(
                    "Breaches were detected but not all of them could be fixed as they are either not supported yet or there were errors when trying to remediate.\n\n",
                );
                out.push_str("# Remediations\n\n");
                push_remediations(&mut out, list);
                out.push_str("# Non-remediated breaches\n\n");
            }
            Some(RemediationStatus::Success) | None => {
                out.push_str("Breaches were detected but were all fixed successfully!\n\n");
                push_remediations(&mut out, list);
                return out;
            }
        }
    } else if list.status() == CheckStatus::Pass {
        out.push_str("Ship is in top shape; no breach detected!\n");
        return out;
    }

    if !list.remediation_performed {
        out.push_str("# Breaches were detected\n\n");
    }

    for result in &list.results {
        if result.breaches.is_empty()
            || result.remediation_status == Some(RemediationStatus::Success)
        {
            continue;
        }
        let _ = writeln!(out, "  ### {}", result.name);
        for breach in &result.breaches {
            if breach.remediation_status() == Some(RemediationStatus::Success) {
                continue;
            }
            let _ = writeln!(out, "     -- {breach}");
        }
        out.push('\n');
    }
    out
}

fn push_remediations(out: &mut String, list: &ResultList) {
    for result in &list.results {
        let fixed: Vec<&String> = result
            .breaches
            .iter()
            .filter_map(|b| b.remediation.as_ref())
            .filter(|r| r.status == RemediationStatus::Success)
            .flat_map(|r| r.messages.iter())
            .collect();
        if fixed.is_empty() {
            continue;
        }
        let _ = writeln!(out, "  ### {}", result.name);
        for message in fixed {
            let _ = writeln!(out, "     -- {message}");
        }
        out.push('\n');
    }
}
