use shipshape_types::ResultList;

use crate::NO_RESULT;

const PADDING: usize = 3;

/// One row per pass/breach pair, aligned into `NAME STATUS PASSES FAILS`
/// columns. Continuation rows leave name and status blank.
pub fn render_table(list: &ResultList) -> String {
    if list.results.is_empty() {
        return NO_RESULT.to_string();
    }

    let mut rows: Vec<[String; 4]> = vec![[
        "NAME".to_string(),
        "STATUS".to_string(),
        "PASSES".to_string(),
        "FAILS".to_string(),
    ]];
    for result in &list.results {
        let status = result.status.map(|s| s.to_string()).unwrap_or_default();
        let lines = result.passes.len().max(result.breaches.len()).max(1);
        for i in 0..lines {
            let pass = result.passes.get(i).cloned().unwrap_or_default();
            let fail = result
                .breaches
                .get(i)
                .map(ToString::to_string)
                .unwrap_or_default();
            if i == 0 {
                rows.push([result.name.clone(), status.clone(), pass, fail]);
            } else {
                rows.push([String::new(), String::new(), pass, fail]);
            }
        }
    }

    let mut widths = [0usize; 3];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let mut line = String::new();
        for (cell, width) in row.iter().zip(widths.iter()) {
            line.push_str(cell);
            let fill = width + PADDING - cell.chars().count();
            line.extend(std::iter::repeat_n(' ', fill));
        }
        line.push_str(&row[3]);
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use shipshape_types::{Breach, CheckResult, CheckType, Severity};

    #[test]
    fn empty_run() {
        assert_eq!(render_table(&ResultList::new(false)), NO_RESULT);
    }

    #[test]
    fn aligns_columns_and_adds_continuation_rows() {
        let mut ok = CheckResult::new("ok", CheckType::from("file"), Severity::Normal);
        ok.passes.push("No illegal files".to_string());
        ok.determine_status(false);

        let mut bad = CheckResult::new("site-name", CheckType::from("yaml"), Severity::High);
        bad.passes.push("p1".to_string());
        bad.breaches.push(Breach::value("b1"));
        bad.breaches.push(Breach::value("b2"));
        bad.determine_status(false);

        let mut list = ResultList::new(false);
        list.results = vec![ok, bad];

        let expected = concat!(
            "NAME        STATUS   PASSES             FAILS\n",
            "ok          Pass     No illegal files\n",
            "site-name   Fail     p1                 b1\n",
            "                                        b2\n",
        );
        assert_eq!(render_table(&list), expected);
    }
}
