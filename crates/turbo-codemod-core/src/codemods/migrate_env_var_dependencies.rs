use semver::Version;
use serde_json::{Map, Value};
use turbo_codemod_runner::{Changes, TransformerResults};

use super::{Codemod, TURBO_JSON, TransformContext, read_json};

/// Move `$VAR` entries out of dependency lists and into dedicated env lists.
pub struct MigrateEnvVarDependencies;

impl Codemod for MigrateEnvVarDependencies {
    fn name(&self) -> &'static str {
        "migrate-env-var-dependencies"
    }

    fn description(&self) -> &'static str {
        r#"Migrate environment variable dependencies from "dependsOn" to "env" in "turbo.json""#
    }

    fn introduced_in(&self) -> Version {
        Version::new(1, 5, 0)
    }

    fn transform(&self, ctx: &TransformContext<'_>) -> TransformerResults {
        let mut runner = ctx.runner(self.name());
        runner
            .logger()
            .info(r#"Migrating environment variable dependencies from "dependsOn" to "env""#);

        let config = match read_json(&ctx.root.join(TURBO_JSON)) {
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

        let migrated = migrate_config(config.clone());
        if migrated != config {
            runner.modify_file(TURBO_JSON, Value::Object(migrated));
        }
        runner.finish()
    }
}

/// Split a dependency list into plain dependencies and env var names.
fn split_dependencies(deps: &[Value]) -> (Vec<Value>, Vec<String>) {
    let mut kept = Vec::new();
    let mut env = Vec::new();
    for dep in deps {
        match dep.as_str().and_then(|s| s.strip_prefix('$')) {
            Some(var) => env.push(var.to_string()),
            None => kept.push(dep.clone()),
        }
    }
    (kept, env)
}

/// Append `vars` to the existing env list stored at `key`, skipping duplicates.
/// The key is dropped when the merged list is empty.
fn merge_env(object: &mut Map<String, Value>, key: &str, vars: Vec<String>) {
    let mut env: Vec<Value> = match object.get(key) {
        Some(Value::Array(existing)) => existing.clone(),
        _ => Vec::new(),
    };
    for var in vars {
        let var = Value::String(var);
        if !env.contains(&var) {
            env.push(var);
        }
    }

    if env.is_empty() {
        object.shift_remove(key);
    } else {
        object.insert(key.to_string(), Value::Array(env));
    }
}

fn migrate_task(task: &mut Map<String, Value>) {
    // A non-array env is something we don't understand.
    if task.get("env").is_some_and(|env| !env.is_array()) {
        return;
    }

    let vars = match task.get("dependsOn") {
        Some(Value::Array(deps)) => {
            let (kept, vars) = split_dependencies(deps);
            task.insert("dependsOn".to_string(), Value::Array(kept));
            vars
        }
        _ => Vec::new(),
    };
    merge_env(task, "env", vars);
}

fn migrate_config(mut config: Map<String, Value>) -> Map<String, Value> {
    if let Some(Value::Object(pipeline)) = config.get_mut("pipeline") {
        for task in pipeline.values_mut() {
            if let Value::Object(task) = task {
                migrate_task(task);
            }
        }
    }

    if config
        .get("globalEnv")
        .is_some_and(|global_env| !global_env.is_array())
    {
        return config;
    }

    let vars = match config.get("globalDependencies") {
        Some(Value::Array(deps)) => {
            let (kept, vars) = split_dependencies(deps);
            if kept.is_empty() {
                config.shift_remove("globalDependencies");
            } else {
                config.insert("globalDependencies".to_string(), Value::Array(kept));
            }
            vars
        }
        _ => Vec::new(),
    };
    merge_env(&mut config, "globalEnv", vars);
    config
}
