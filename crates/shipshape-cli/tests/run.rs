use assert_cmd::Command;
use camino::{Utf8Path, Utf8PathBuf};
use predicates::prelude::*;
use tempfile::TempDir;

#[allow(deprecated)]
fn shipshape_cmd() -> Command {
    let mut cmd = Command::cargo_bin("shipshape").unwrap();
    cmd.env_remove("SHIPSHAPE_OUTPUT_FORMAT")
        .env_remove("SHIPSHAPE_ERROR_ON_FAILURE")
        .env_remove("SHIPSHAPE_FAIL_SEVERITY")
        .env_remove("RUST_LOG");
    cmd
}

fn fixture(name: &str) -> String {
    Utf8Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
        .into_string()
}

/// A project with a correctly named site and, optionally, an adminer.php.
fn project(with_adminer: bool) -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
    std::fs::create_dir_all(root.join("web")).expect("mkdir");
    std::fs::create_dir_all(root.join("config")).expect("mkdir");
    std::fs::write(root.join("web/index.php"), "<?php").expect("write");
    std::fs::write(root.join("config/system.site.yml"), "name: Example\n").expect("write");
    if with_adminer {
        std::fs::write(root.join("web/adminer.php"), "<?php").expect("write");
    }
    (tmp, root)
}

#[test]
fn clean_project_is_in_top_shape() {
    let (_tmp, root) = project(false);
    shipshape_cmd()
        .args(["run", root.as_str(), "-f", &fixture("site-policy.yml"), "-e"])
        .assert()
        .success()
        .stdout("Ship is in top shape; no breach detected!\n");
}

#[test]
fn high_severity_breach_fails_with_error_code() {
    let (_tmp, root) = project(true);
    shipshape_cmd()
        .args(["run", root.as_str(), "-f", &fixture("site-policy.yml"), "--error-code"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains("# Breaches were detected"))
        .stdout(predicate::str::contains("  ### illegal-files"))
        .stdout(predicate::str::contains("     -- [illegal file] web/adminer.php"));
}

#[test]
fn breaches_without_error_code_exit_zero() {
    let (_tmp, root) = project(true);
    shipshape_cmd()
        .args(["run", root.as_str(), "-f", &fixture("site-policy.yml")])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Breaches were detected"));
}

#[test]
fn later_documents_lower_severity_below_threshold() {
    let (_tmp, root) = project(true);
    shipshape_cmd()
        .args([
            "run",
            root.as_str(),
            "-f",
            &fixture("site-policy.yml"),
            "-f",
            &fixture("low-severity.yml"),
            "-e",
        ])
        .assert()
        .success();
}

#[test]
fn fail_severity_from_environment() {
    let (_tmp, root) = project(true);
    shipshape_cmd()
        .env("SHIPSHAPE_FAIL_SEVERITY", "critical")
        .args(["run", root.as_str(), "-f", &fixture("site-policy.yml"), "-e"])
        .assert()
        .success();
}

#[test]
fn json_output_is_a_result_list() {
    let (_tmp, root) = project(true);
    let output = shipshape_cmd()
        .env("SHIPSHAPE_OUTPUT_FORMAT", "json")
        .args(["run", root.as_str(), "-f", &fixture("site-policy.yml")])
        .output()
        .expect("run");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json");
    assert_eq!(json["total-checks"], 2);
    assert_eq!(json["total-breaches"], 1);
    assert_eq!(json["results"][0]["name"], "illegal-files");
    assert_eq!(json["results"][0]["status"], "Fail");
    assert_eq!(json["results"][0]["breaches"][0]["breach-type"], "value");
    assert_eq!(json["results"][1]["status"], "Pass");
}

#[test]
fn type_filter_limits_the_run() {
    let (_tmp, root) = project(true);
    shipshape_cmd()
        .args([
            "run",
            root.as_str(),
            "-f",
            &fixture("site-policy.yml"),
            "-t",
            "yaml",
            "-o",
            "table",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("site-name"))
        .stdout(predicate::str::contains("illegal-files").not());
}

#[test]
fn junit_output() {
    let (_tmp, root) = project(true);
    shipshape_cmd()
        .args(["run", root.as_str(), "-f", &fixture("site-policy.yml"), "-o", "junit"])
        .assert()
        .success()
        .stdout(predicate::str::contains("<testsuite name=\"file\" tests=\"1\" errors=\"1\">"));
}

#[test]
fn missing_policy_file_is_a_process_error() {
    let (_tmp, root) = project(false);
    shipshape_cmd()
        .args(["run", root.as_str(), "-f", "no-such-policy.yml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no-such-policy.yml"));
}
