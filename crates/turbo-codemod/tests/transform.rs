//! End-to-end tests for `turbo-codemod transform`.

#![cfg(not(target_os = "windows"))]

use serde_json::json;
use turbo_codemod_test_utils::Sandbox;

#[test]
fn test_list_transforms() {
    let sb = Sandbox::new();
    let out = sb.run("turbo-codemod", ["transform", "--list"]);
    assert_eq!(out.code, 0);

    let names: Vec<&str> = out
        .stdout
        .lines()
        .filter_map(|line| line.strip_prefix("- "))
        .filter_map(|line| line.split_whitespace().next())
        .collect();
    assert_eq!(
        names,
        [
            "add-package-manager",
            "create-turbo-config",
            "migrate-env-var-dependencies",
            "set-default-outputs",
        ]
    );
}

#[test]
fn test_invalid_transform_name() {
    let sb = Sandbox::new();
    let output = sb.snapshot_run("turbo-codemod", ["transform", "rename-everything", "."]);
    insta::assert_snapshot!(output, @r"
    Exit Code: 1
    --- STDOUT ---

    --- STDERR ---
    Error: Invalid transform choice (rename-everything), pick one of:
    - add-package-manager
    - create-turbo-config
    - migrate-env-var-dependencies
    - set-default-outputs
    ");
}

#[test]
fn test_create_turbo_config() {
    let mut sb = Sandbox::new();
    sb.write(
        "package.json",
        r#"{ "name": "demo", "turbo": { "pipeline": { "build": {} } } }"#,
    )
    .init_git();

    let out = sb.run("turbo-codemod", ["transform", "create-turbo-config", "."]);
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert_eq!(sb.read_json("package.json"), json!({ "name": "demo" }));
    assert_eq!(
        sb.read_json("turbo.json"),
        json!({ "$schema": "https://turbo.build/schema.json", "pipeline": { "build": {} } })
    );
    assert!(out.stdout.contains("turbo.json"));
}

#[test]
fn test_print_shows_diff_without_writing() {
    let mut sb = Sandbox::new();
    sb.write("turbo.json", r#"{"pipeline":{"dev":{"dependsOn":["$PORT"]}}}"#);

    let out = sb.run(
        "turbo-codemod",
        ["transform", "migrate-env-var-dependencies", ".", "--dry", "--print"],
    );
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert!(out.stderr.contains("--- a/turbo.json"));
    assert!(out.stderr.contains("+++ b/turbo.json"));
    assert!(out.stderr.contains("\"PORT\""));
    assert_eq!(sb.read("turbo.json"), r#"{"pipeline":{"dev":{"dependsOn":["$PORT"]}}}"#);
}

#[test]
fn test_fatal_transform_exits_non_zero() {
    let sb = Sandbox::new();
    let out = sb.run("turbo-codemod", ["transform", "set-default-outputs", ".", "--format", "json"]);
    assert_eq!(out.code, 1);
    assert!(out.stderr.contains("No turbo.json found at"));

    let report: serde_json::Value =
        serde_json::from_str(out.stdout.trim()).expect("json report");
    assert_eq!(report["transform"], "set-default-outputs");
    assert_eq!(report["changes"], json!({}));
    assert!(report["fatalError"].as_str().unwrap().starts_with("No turbo.json found at"));
}

#[test]
fn test_dirty_target_directory_is_refused() {
    let mut sb = Sandbox::new();
    sb.write("turbo.json", r#"{"pipeline":{"build":{}}}"#).init_git();
    sb.write("turbo.json", r#"{"pipeline":{"build":{"cache":false}}}"#);
    let target = sb.repo_path().to_string_lossy().into_owned();

    let out = sb.run("turbo-codemod", ["transform", "set-default-outputs", target.as_str()]);
    assert_eq!(out.code, 1);
    assert!(out.stderr.contains("Git directory is not clean"));
    assert_eq!(sb.read("turbo.json"), r#"{"pipeline":{"build":{"cache":false}}}"#);

    let out = sb.run(
        "turbo-codemod",
        ["transform", "set-default-outputs", target.as_str(), "--dry"],
    );
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert!(out.stderr.contains("SKIPPED"));
}
