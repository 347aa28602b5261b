//! End-to-end tests for `turbo-codemod migrate`.
//!
//! Versions are always passed explicitly so nothing reaches the network, and
//! package managers are faked on the sandbox `PATH`.

#![cfg(not(target_os = "windows"))]

use serde_json::json;
use turbo_codemod_test_utils::Sandbox;

const OLD_TURBO_PACKAGE_JSON: &str = r#"{
  "name": "no-turbo-json",
  "version": "1.0.0",
  "dependencies": {},
  "devDependencies": {
    "turbo": "1.0.0"
  },
  "turbo": {
    "pipeline": {
      "build": {
        "outputs": [".next/**"]
      },
      "dev": {
        "cache": false
      },
      "lint": {
        "outputs": []
      }
    }
  }
}
"#;

fn old_turbo() -> Sandbox {
    let mut sb = Sandbox::new();
    sb.write("package.json", OLD_TURBO_PACKAGE_JSON)
        .write("pnpm-lock.yaml", "lockfileVersion: 5.4\n")
        .fake_bin("pnpm", "7.1.0")
        .init_git();
    sb
}

#[test]
fn test_migrate_old_turbo_to_1_7() {
    let sb = old_turbo();
    let out = sb.run("turbo-codemod", ["migrate", ".", "--from", "1.0.0", "--to", "1.7.0"]);
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);

    assert_eq!(
        sb.read_json("package.json"),
        json!({
            "name": "no-turbo-json",
            "version": "1.0.0",
            "dependencies": {},
            "devDependencies": { "turbo": "1.0.0" },
            "packageManager": "pnpm@7.1.0"
        })
    );
    assert_eq!(
        sb.read_json("turbo.json"),
        json!({
            "$schema": "https://turbo.build/schema.json",
            "pipeline": {
                "build": { "outputs": [".next/**"] },
                "dev": { "cache": false, "outputs": ["dist/**", "build/**"] },
                "lint": {}
            }
        })
    );

    assert!(out.stderr.contains("Upgrade turbo with pnpm add turbo@1.7.0 --save-dev"));
    assert!(out.stderr.contains("Migration completed!"));
    for name in [
        "add-package-manager",
        "create-turbo-config",
        "migrate-env-var-dependencies",
        "set-default-outputs",
    ] {
        assert!(out.stdout.contains(name), "missing report for {name}");
    }
}

#[test]
fn test_migrate_dry_run_as_json() {
    let mut sb = Sandbox::new();
    sb.write("turbo.json", r#"{"pipeline":{"build":{}}}"#);
    let before = sb.read("turbo.json");

    let out = sb.run(
        "turbo-codemod",
        ["migrate", ".", "--from", "1.6.0", "--to", "1.7.0", "--dry", "--format", "json"],
    );
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert_eq!(sb.read("turbo.json"), before);

    let lines: Vec<serde_json::Value> = out
        .stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();
    assert_eq!(
        lines,
        [json!({
            "transform": "set-default-outputs",
            "changes": {
                "turbo.json": { "action": "skipped", "additions": 6, "deletions": 1 }
            }
        })]
    );
}

#[test]
fn test_migrate_same_version_does_nothing() {
    let sb = old_turbo();
    let out = sb.run("turbo-codemod", ["migrate", ".", "--from", "1.7.0", "--to", "1.7.0"]);
    assert_eq!(out.code, 0);
    assert!(out.stderr.contains("Nothing to do"));
    assert_eq!(sb.read("package.json"), OLD_TURBO_PACKAGE_JSON);
    assert!(!sb.exists("turbo.json"));
}

#[test]
fn test_migrate_refuses_dirty_tree() {
    let mut sb = old_turbo();
    sb.write("scratch.txt", "uncommitted");

    let out = sb.run("turbo-codemod", ["migrate", ".", "--from", "1.0.0", "--to", "1.7.0"]);
    assert_eq!(out.code, 1);
    assert!(out.stderr.contains("Git directory is not clean"));
    assert!(!sb.exists("turbo.json"));

    let out = sb.run(
        "turbo-codemod",
        ["migrate", ".", "--from", "1.0.0", "--to", "1.7.0", "--force"],
    );
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert!(sb.exists("turbo.json"));
}

#[test]
fn test_migrate_precondition_failures() {
    let sb = Sandbox::new();

    let out = sb.run("turbo-codemod", ["migrate", ".", "--from", "one", "--to", "1.7.0"]);
    assert_eq!(out.code, 1);
    assert!(out.stderr.contains("Invalid --from version: one"));

    let out = sb.run("turbo-codemod", ["migrate", "missing", "--from", "1.0.0", "--to", "1.7.0"]);
    assert_eq!(out.code, 1);
    assert!(out.stderr.contains("does not exist"));
}

#[test]
fn test_migrate_aborted_codemod_still_succeeds() {
    // No lockfile or packageManager field, so add-package-manager aborts.
    let mut sb = Sandbox::new();
    sb.write("package.json", r#"{ "name": "demo" }"#);

    let out = sb.run("turbo-codemod", ["migrate", ".", "--from", "1.0.0", "--to", "1.1.0"]);
    assert_eq!(out.code, 0, "stderr: {}", out.stderr);
    assert!(out.stderr.contains("Unable to determine package manager"));
    assert!(out.stderr.contains("Unable to determine turbo upgrade command"));
    assert_eq!(sb.read_json("package.json"), json!({ "name": "demo" }));
}

#[test]
fn test_migrate_uses_configured_registry() {
    let sb = old_turbo();
    let out = sb.run(
        "turbo-codemod",
        ["migrate", ".", "--from", "1.0.0", "--to", "canary", "--dry", "--registry", "http://127.0.0.1:9/"],
    );
    assert_eq!(out.code, 1);
    assert!(out.stderr.contains("Failed to fetch the latest version of turbo"));
    assert!(out.stderr.contains("http://127.0.0.1:9/turbo"));
    assert_eq!(sb.read("package.json"), OLD_TURBO_PACKAGE_JSON);
}
