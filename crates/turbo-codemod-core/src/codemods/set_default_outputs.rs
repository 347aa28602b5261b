use semver::Version;
use serde_json::{Map, Value, json};
use turbo_codemod_runner::{Changes, TransformerResults};

use super::{Codemod, TURBO_JSON, TransformContext, read_json};

/// Outputs turbo assumed before they had to be declared.
const DEFAULT_OUTPUTS: [&str; 2] = ["dist/**", "build/**"];

/// Make the old implicit task outputs explicit.
pub struct SetDefaultOutputs;

impl Codemod for SetDefaultOutputs {
    fn name(&self) -> &'static str {
        "set-default-outputs"
    }

    fn description(&self) -> &'static str {
        r#"Add the "outputs" key with defaults where it is missing in "turbo.json""#
    }

    fn introduced_in(&self) -> Version {
        Version::new(1, 7, 0)
    }

    fn transform(&self, ctx: &TransformContext<'_>) -> TransformerResults {
        let mut runner = ctx.runner(self.name());
        runner
            .logger()
            .info(r#"Adding default "outputs" key into tasks in "turbo.json""#);

        let mut config = match read_json(&ctx.root.join(TURBO_JSON)) {
            Ok(Some(Value::Object(config))) => config,
            Ok(Some(_)) => {
                return runner.abort_transform(
                    format!("{TURBO_JSON} does not contain a JSON object"),
                    Changes::new(),
                );
            }
            Ok(None) => {
                return runner.abort_transform(
                    format!(
                        "No {TURBO_JSON} found at {}. Is the path correct?",
                        ctx.root.display()
                    ),
                    Changes::new(),
                );
            }
            Err(e) => return runner.abort_transform(format!("{e:#}"), Changes::new()),
        };

        let mut changed = false;
        if let Some(Value::Object(pipeline)) = config.get_mut("pipeline") {
            for task in pipeline.values_mut() {
                if let Value::Object(task) = task {
                    changed |= set_outputs(task);
                }
            }
        }

        if changed {
            runner.modify_file(TURBO_JSON, Value::Object(config));
        }
        runner.finish()
    }
}

/// Returns whether the task was changed.
fn set_outputs(task: &mut Map<String, Value>) -> bool {
    match task.get("outputs") {
        None => {
            task.insert("outputs".to_string(), json!(DEFAULT_OUTPUTS));
            true
        }
        Some(Value::Array(outputs)) if outputs.is_empty() => {
            task.shift_remove("outputs");
            true
        }
        Some(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codemods::test_support::{StubToolchain, context};
    use std::fs;

    const TOOLCHAIN: StubToolchain = StubToolchain {
        package_manager: None,
    };

    #[test]
    fn test_sets_and_removes_outputs() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(
            temp.path().join("turbo.json"),
            r#"{
  "pipeline": {
    "build": { "outputs": [".next/**"] },
    "dev": { "cache": false },
    "lint": { "outputs": [] }
  }
}"#,
        )?;

        let results = SetDefaultOutputs.transform(&context(temp.path(), &TOOLCHAIN, false));
        assert!(!results.is_fatal());

        let written: Value =
            serde_json::from_str(&fs::read_to_string(temp.path().join("turbo.json"))?)?;
        insta::assert_json_snapshot!(written, @r#"
        {
          "pipeline": {
            "build": {
              "outputs": [
                ".next/**"
              ]
            },
            "dev": {
              "cache": false,
              "outputs": [
                "dist/**",
                "build/**"
              ]
            },
            "lint": {}
          }
        }
        "#);
        Ok(())
    }

    #[test]
    fn test_explicit_outputs_are_kept() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        fs::write(
            temp.path().join("turbo.json"),
            r#"{ "pipeline": { "build": { "outputs": ["out/**"] } } }"#,
        )?;

        let results = SetDefaultOutputs.transform(&context(temp.path(), &TOOLCHAIN, false));
        assert!(results.changes.is_empty());
        Ok(())
    }

    #[test]
    fn test_aborts_without_turbo_json() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        let results = SetDefaultOutputs.transform(&context(temp.path(), &TOOLCHAIN, false));
        assert_eq!(
            results.fatal_error.map(|e| e.reason),
            Some(format!(
                "No turbo.json found at {}. Is the path correct?",
                temp.path().display()
            ))
        );
        Ok(())
    }
}
