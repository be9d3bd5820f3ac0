//! Integration tests for the tfplan-report CLI
//!
//! These tests verify CLI commands work correctly end-to-end.

use std::io::Write;
use std::process::{Command, Stdio};

const TEXT_PLAN: &str = r#"
Terraform used the selected providers to generate the following execution
plan. Resource actions are indicated with the following symbols:
  + create
  ~ update in-place

Terraform will perform the following actions:

  # aws_s3_bucket.example will be created
  + resource "aws_s3_bucket" "example" {
      + bucket = "my-bucket"
      + id     = (known after apply)
    }

  # aws_instance.web will be updated in-place
  ~ resource "aws_instance" "web" {
      ~ instance_type = "t2.micro" -> "t3.micro"
    }

Plan: 1 to add, 1 to change, 0 to destroy.

Changes to Outputs:
  + bucket_name = "my-bucket"
"#;

/// Get the path to the tfplan-report binary
fn tfplan_report_binary() -> std::path::PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test executable name
    path.pop(); // Remove deps directory

    // In debug mode, binary is at target/debug/tfplan-report
    path.push("tfplan-report");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    path
}

fn command() -> Command {
    let mut cmd = Command::new(tfplan_report_binary());
    cmd.env_remove("PLAN_FILE").env_remove("GITHUB_OUTPUT");
    cmd
}

/// Run tfplan-report and return output
fn run_tfplan_report(args: &[&str]) -> std::process::Output {
    command()
        .args(args)
        .output()
        .expect("Failed to execute tfplan-report")
}

/// Run tfplan-report with the given text piped to stdin
fn run_with_stdin(args: &[&str], stdin: &str) -> std::process::Output {
    let mut child = command()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn tfplan-report");

    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();

    child.wait_with_output().expect("Failed to wait for tfplan-report")
}

fn write_plan(dir: &tempfile::TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn test_version() {
    let output = run_tfplan_report(&["--version"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tfplan-report"));
}

#[test]
fn test_help() {
    let output = run_tfplan_report(&["--help"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("report"));
    assert!(stdout.contains("classify"));
}

#[test]
fn test_report_help_lists_styles() {
    let output = run_tfplan_report(&["report", "--help"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--style"));
    assert!(stdout.contains("azure"));
    assert!(stdout.contains("--github-output"));
}

#[test]
fn test_report_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write_plan(&dir, "plan.txt", TEXT_PLAN);

    let output = run_tfplan_report(&["report", "--input", &plan]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let expected = "Plan: 1 to add, 1 to change, 0 to destroy.\n\
                    ::group::Resources to be Created\n\
                    ::group::aws_s3_bucket.example\n\
                    bucket = \"my-bucket\"\n\
                    id     = (known after apply)\n\
                    ::endgroup::\n\
                    ::endgroup::\n\
                    ::group::Resources to be Updated\n\
                    ::group::aws_instance.web\n\
                    instance_type = \"t2.micro\" -> \"t3.micro\"\n\
                    ::endgroup::\n\
                    ::endgroup::\n\
                    ::group::Terraform Outputs\n\
                    + bucket_name = \"my-bucket\"\n\
                    ::endgroup::\n";
    assert_eq!(stdout, expected);
}

#[test]
fn test_report_from_stdin_with_azure_style() {
    let output = run_with_stdin(&["report", "--style", "azure"], TEXT_PLAN);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("##[group]aws_s3_bucket.example"));
    assert!(stdout.contains("##[endgroup]"));
    assert!(!stdout.contains("::group::"));
}

#[test]
fn test_report_no_changes() {
    let output = run_with_stdin(
        &["report"],
        "No changes. Your infrastructure matches the configuration.\n",
    );

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim_end(), "No changes detected.");
}

#[test]
fn test_report_writes_github_output() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write_plan(&dir, "plan.txt", TEXT_PLAN);
    let outputs = dir.path().join("github_output");

    let output = run_tfplan_report(&[
        "report",
        "--input",
        &plan,
        "--github-output",
        &outputs.to_string_lossy(),
    ]);

    assert!(output.status.success());

    let published = std::fs::read_to_string(&outputs).unwrap();
    assert!(published.starts_with("plan_status=success\nchange_count=2\nchanges={"));
    assert!(published.contains("\"aws_s3_bucket.example\""));
}

#[test]
fn test_classify_json_plan() {
    let dir = tempfile::tempdir().unwrap();
    let plan = write_plan(
        &dir,
        "plan.json",
        r#"{
            "format_version": "1.2",
            "resource_changes": [
                {
                    "address": "aws_instance.old",
                    "mode": "managed",
                    "type": "aws_instance",
                    "name": "old",
                    "change": {"actions": ["delete"], "before": {"ami": "ami-1"}, "after": null}
                }
            ]
        }"#,
    );

    let output = run_tfplan_report(&["classify", "--input", &plan]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let value: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(value["destroyed"][0]["name"], "aws_instance.old");
    assert_eq!(value["created"].as_array().unwrap().len(), 0);
    assert_eq!(value["summary_line"], "Plan: 0 to add, 0 to change, 1 to destroy.");
}

#[test]
fn test_malformed_json_fails() {
    let output = run_with_stdin(&["report", "--format", "json"], "{\"resource_changes\": [");

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Malformed JSON plan"));
}

#[test]
fn test_unrecognized_text_fails() {
    let output = run_with_stdin(&["classify"], "hello world\n");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_missing_input_file_fails() {
    let output = run_tfplan_report(&["report", "--input", "/definitely/not/here.txt"]);

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to read plan file"));
}
