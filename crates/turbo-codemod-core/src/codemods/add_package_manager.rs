use semver::Version;
use serde_json::Value;
use turbo_codemod_runner::{Changes, TransformerResults};

use super::{Codemod, PACKAGE_JSON, TransformContext, read_json};

/// Record the workspace's package manager in the root `package.json`.
pub struct AddPackageManager;

impl Codemod for AddPackageManager {
    fn name(&self) -> &'static str {
        "add-package-manager"
    }

    fn description(&self) -> &'static str {
        r#"Set the "packageManager" key in root "package.json" file"#
    }

    fn introduced_in(&self) -> Version {
        Version::new(1, 1, 0)
    }

    fn transform(&self, ctx: &TransformContext<'_>) -> TransformerResults {
        let mut runner = ctx.runner(self.name());
        runner
            .logger()
            .info(r#"Set "packageManager" key in root "package.json" file..."#);

        let Some(package_manager) = ctx.toolchain.package_manager(ctx.root) else {
            return runner.abort_transform(
                format!("Unable to determine package manager for {}", ctx.root.display()),
                Changes::new(),
            );
        };
        let Some(version) = ctx.toolchain.package_manager_version(package_manager, ctx.root)
        else {
            return runner.abort_transform(
                format!("Unable to determine the version of {package_manager}"),
                Changes::new(),
            );
        };

        let mut package_json = match read_json(&ctx.root.join(PACKAGE_JSON)) {
            Ok(Some(Value::Object(package_json))) => package_json,
            Ok(Some(_)) => {
                return runner.abort_transform(
                    format!("{PACKAGE_JSON} does not contain a JSON object"),
                    Changes::new(),
                );
            }
            Ok(None) => {
                return runner.abort_transform(
                    format!(
                        "No {PACKAGE_JSON} found at {}. Is the path correct?",
                        ctx.root.display()
                    ),
                    Changes::new(),
                );
            }
            Err(e) => return runner.abort_transform(format!("{e:#}"), Changes::new()),
        };

        let expected = format!("{package_manager}@{version}");
        if package_json.get("packageManager").and_then(Value::as_str) != Some(expected.as_str()) {
            package_json.insert("packageManager".to_string(), Value::String(expected));
            runner.modify_file(PACKAGE_JSON, Value::Object(package_json));
        }

        runner.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codemods::test_support::{StubToolchain, context};
    use crate::toolchain::PackageManager;
    use serde_json::json;
    use std::fs;
    use turbo_codemod_runner::FileAction;

    #[test]
    fn test_adds_package_manager_field() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(
            temp.path().join("package.json"),
            r#"{ "name": "demo", "version": "1.0.0" }"#,
        )?;
        let toolchain = StubToolchain {
            package_manager: Some((PackageManager::Pnpm, "7.1.0")),
        };

        let results = AddPackageManager.transform(&context(temp.path(), &toolchain, false));
        assert!(!results.is_fatal());
        assert_eq!(
            results.changes.get("package.json").unwrap().action,
            FileAction::Modified
        );

        let written: Value = serde_json::from_str(&fs::read_to_string(temp.path().join("package.json"))?)?;
        assert_eq!(
            written,
            json!({ "name": "demo", "version": "1.0.0", "packageManager": "pnpm@7.1.0" })
        );
        Ok(())
    }

    #[test]
    fn test_matching_field_is_left_alone() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(
            temp.path().join("package.json"),
            r#"{ "name": "demo", "packageManager": "yarn@1.22.19" }"#,
        )?;
        let toolchain = StubToolchain {
            package_manager: Some((PackageManager::Yarn, "1.22.19")),
        };

        let results = AddPackageManager.transform(&context(temp.path(), &toolchain, false));
        assert!(!results.is_fatal());
        assert!(results.changes.is_empty());
        Ok(())
    }

    #[test]
    fn test_aborts_without_package_manager() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(temp.path().join("package.json"), "{}")?;
        let toolchain = StubToolchain {
            package_manager: None,
        };

        let results = AddPackageManager.transform(&context(temp.path(), &toolchain, false));
        let error = results.fatal_error.expect("aborted");
        assert!(error.reason.starts_with("Unable to determine package manager"));
        Ok(())
    }
}
