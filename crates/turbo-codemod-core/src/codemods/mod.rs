use anyhow::{Context, Result};
use semver::Version;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;
use turbo_codemod_runner::{Runner, RunnerOptions, TransformerResults};

use crate::toolchain::Toolchain;

pub mod add_package_manager;
pub mod create_turbo_config;
pub mod migrate_env_var_dependencies;
pub mod set_default_outputs;

use add_package_manager::AddPackageManager;
use create_turbo_config::CreateTurboConfig;
use migrate_env_var_dependencies::MigrateEnvVarDependencies;
use set_default_outputs::SetDefaultOutputs;

pub const PACKAGE_JSON: &str = "package.json";
pub const TURBO_JSON: &str = "turbo.json";
pub const TURBO_SCHEMA_URL: &str = "https://turbo.build/schema.json";

/// Options shared by every codemod of a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct TransformOptions {
    /// Bypass the clean working tree check.
    pub force: bool,
    /// Report changes without writing them.
    pub dry: bool,
    /// Print a diff of every changed file.
    pub print: bool,
}

/// Context passed to a codemod for one invocation
pub struct TransformContext<'a> {
    /// Absolute path of the directory being transformed
    pub root: &'a Path,
    pub options: TransformOptions,
    pub toolchain: &'a dyn Toolchain,
}

impl TransformContext<'_> {
    /// A fresh runner scoped to this context's root and options.
    pub fn runner(&self, transform: &str) -> Runner {
        Runner::new(
            transform,
            self.root,
            RunnerOptions {
                dry: self.options.dry,
                print: self.options.print,
            },
        )
    }
}

pub trait Codemod {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    /// The release after which a project needs this codemod.
    fn introduced_in(&self) -> Version;
    fn transform(&self, ctx: &TransformContext<'_>) -> TransformerResults;
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Codemod {0} is registered more than once")]
    DuplicateName(String),

    #[error("Codemod {name} ({version}) is registered after a codemod introduced in {previous}")]
    OutOfOrder {
        name: String,
        version: Version,
        previous: Version,
    },
}

/// Ordered catalogue of codemods, ascending by the version that introduced them.
pub struct CodemodRegistry {
    codemods: Vec<Box<dyn Codemod>>,
}

impl CodemodRegistry {
    /// Build a registry, rejecting duplicate names and descending versions.
    pub fn new(codemods: Vec<Box<dyn Codemod>>) -> Result<Self, RegistryError> {
        let registry = Self { codemods };
        registry.validate()?;
        Ok(registry)
    }

    /// The codemods shipped with this tool.
    pub fn builtin() -> Self {
        Self {
            codemods: vec![
                Box::new(AddPackageManager),
                Box::new(CreateTurboConfig),
                Box::new(MigrateEnvVarDependencies),
                Box::new(SetDefaultOutputs),
            ],
        }
    }

    pub fn validate(&self) -> Result<(), RegistryError> {
        let mut previous: Option<Version> = None;
        for (idx, codemod) in self.codemods.iter().enumerate() {
            if self.codemods[..idx]
                .iter()
                .any(|earlier| earlier.name() == codemod.name())
            {
                return Err(RegistryError::DuplicateName(codemod.name().to_string()));
            }

            let version = codemod.introduced_in();
            if let Some(previous) = previous.as_ref()
                && version.cmp_precedence(previous).is_lt()
            {
                return Err(RegistryError::OutOfOrder {
                    name: codemod.name().to_string(),
                    version,
                    previous: previous.clone(),
                });
            }
            previous = Some(version);
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn Codemod> {
        self.iter().find(|codemod| codemod.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &dyn Codemod> {
        self.codemods.iter().map(|codemod| codemod.as_ref())
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.iter().map(|codemod| codemod.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.codemods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codemods.is_empty()
    }
}

/// Read a JSON document, returning `None` when the file does not exist.
pub(crate) fn read_json(path: &Path) -> Result<Option<Value>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    let value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(value))
}
