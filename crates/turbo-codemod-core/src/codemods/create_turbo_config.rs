use semver::Version;
use serde_json::{Map, Value};
use turbo_codemod_runner::{Changes, TransformerResults};

use super::{Codemod, PACKAGE_JSON, TURBO_JSON, TURBO_SCHEMA_URL, TransformContext, read_json};

/// Move the legacy `"turbo"` key of `package.json` into its own `turbo.json`.
pub struct CreateTurboConfig;

impl Codemod for CreateTurboConfig {
    fn name(&self) -> &'static str {
        "create-turbo-config"
    }

    fn description(&self) -> &'static str {
        r#"Create the "turbo.json" file from an existing "turbo" key in "package.json""#
    }

    fn introduced_in(&self) -> Version {
        Version::new(1, 1, 0)
    }

    fn transform(&self, ctx: &TransformContext<'_>) -> TransformerResults {
        let mut runner = ctx.runner(self.name());
        runner
            .logger()
            .info(r#"Migrating "package.json" "turbo" key to "turbo.json" file..."#);

        if ctx.root.join(TURBO_JSON).exists() {
            runner.logger().info(&format!("{TURBO_JSON} already exists"));
            return runner.finish();
        }

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

        let Some(turbo) = package_json.shift_remove("turbo") else {
            runner
                .logger()
                .info(&format!(r#"No "turbo" key found in {PACKAGE_JSON}"#));
            return runner.finish();
        };
        let Value::Object(turbo) = turbo else {
            return runner.abort_transform(
                format!(r#"The "turbo" key in {PACKAGE_JSON} is not an object"#),
                Changes::new(),
            );
        };

        let mut config = Map::new();
        config.insert("$schema".to_string(), Value::String(TURBO_SCHEMA_URL.to_string()));
        config.extend(turbo);

        runner.modify_file(TURBO_JSON, Value::Object(config));
        runner.modify_file(PACKAGE_JSON, Value::Object(package_json));
        runner.finish()
    }
}
