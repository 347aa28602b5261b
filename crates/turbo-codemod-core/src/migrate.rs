use colored::Colorize;
use semver::Version;
use std::path::{Path, PathBuf};
use turbo_codemod_runner::{ReportSink, TransformerResults};

use crate::codemods::{CodemodRegistry, TransformContext, TransformOptions};
use crate::resolve::codemods_for_migration;
use crate::toolchain::Toolchain;

#[derive(Debug, Clone, Default)]
pub struct MigrateOptions {
    pub force: bool,
    pub dry: bool,
    pub print: bool,
    /// Run the upgrade command instead of only printing it.
    pub install: bool,
    /// Current version, skipping detection.
    pub from: Option<String>,
    /// Target version or npm dist-tag.
    pub to: Option<String>,
}

impl MigrateOptions {
    fn transform_options(&self) -> TransformOptions {
        TransformOptions {
            force: self.force,
            dry: self.dry,
            print: self.print,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error("Directory {} does not exist", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("Unable to infer the version of turbo being used by {}", .0.display())]
    UnknownCurrentVersion(PathBuf),

    #[error("Failed to determine the current version of turbo")]
    CurrentVersion(#[source] anyhow::Error),

    #[error("Invalid {flag} version: {value}")]
    InvalidVersion {
        flag: &'static str,
        value: String,
        #[source]
        source: semver::Error,
    },

    #[error("Unable to fetch the latest version of turbo")]
    UnknownLatestVersion,

    #[error("Failed to fetch the latest version of turbo")]
    LatestVersion(#[source] anyhow::Error),

    #[error("Failed to upgrade turbo with `{command}`")]
    Install {
        command: String,
        #[source]
        source: anyhow::Error,
    },
}

/// What a completed migration did.
#[derive(Debug)]
pub struct MigrationReport {
    pub from: Version,
    pub to: Version,
    /// Results per codemod, in the order they ran.
    pub results: Vec<(&'static str, TransformerResults)>,
    pub upgrade_command: Option<String>,
    /// Whether `upgrade_command` was run.
    pub installed: bool,
}

#[derive(Debug)]
pub enum MigrationOutcome {
    /// Already on the requested version.
    UpToDate { version: Version },
    Migrated(MigrationReport),
}

/// Drives a version migration of one directory.
pub struct Migrator<'a> {
    registry: &'a CodemodRegistry,
    toolchain: &'a dyn Toolchain,
    sink: &'a mut dyn ReportSink,
}

impl<'a> Migrator<'a> {
    pub fn new(
        registry: &'a CodemodRegistry,
        toolchain: &'a dyn Toolchain,
        sink: &'a mut dyn ReportSink,
    ) -> Self {
        Self {
            registry,
            toolchain,
            sink,
        }
    }

    pub fn migrate(
        &mut self,
        directory: &Path,
        options: &MigrateOptions,
    ) -> Result<MigrationOutcome, MigrateError> {
        if !directory.is_dir() {
            return Err(MigrateError::DirectoryNotFound(directory.to_path_buf()));
        }
        let root = directory
            .canonicalize()
            .map_err(|_| MigrateError::DirectoryNotFound(directory.to_path_buf()))?;

        let from = self.current_version(&root, options)?;
        let to = self.target_version(options)?;
        log::debug!("Migrating {} from {from} to {to}", root.display());

        if from == to {
            eprintln!(
                "Nothing to do, current version ({}) is the same as the requested version ({})",
                from.to_string().bold(),
                to.to_string().bold()
            );
            return Ok(MigrationOutcome::UpToDate { version: from });
        }

        let codemods = codemods_for_migration(self.registry, &from, &to);
        if codemods.is_empty() {
            eprintln!("No codemods required to migrate from {from} to {to}");
        }

        eprintln!(
            "\nUpgrading turbo from {} to {}",
            from.to_string().bold(),
            to.to_string().bold()
        );

        let ctx = TransformContext {
            root: &root,
            options: options.transform_options(),
            toolchain: self.toolchain,
        };
        let mut results = Vec::with_capacity(codemods.len());
        for (idx, codemod) in codemods.iter().enumerate() {
            eprintln!(
                "\n({}/{}) {}",
                idx + 1,
                codemods.len(),
                format!("Running {}", codemod.name()).bold()
            );
            let result = codemod.transform(&ctx);
            if let Err(e) = self.sink.report(codemod.name(), &result) {
                log::warn!("Failed to report results of {}: {e:#}", codemod.name());
            }
            results.push((codemod.name(), result));
        }

        let upgrade_command = self.toolchain.upgrade_command(&root, options.to.as_deref());
        let mut installed = false;
        match &upgrade_command {
            Some(command) if options.install => {
                eprintln!("\nUpgrading turbo with {}", command.bold());
                self.toolchain
                    .run_command(command, &root)
                    .map_err(|source| MigrateError::Install {
                        command: command.clone(),
                        source,
                    })?;
                installed = true;
            }
            Some(command) => eprintln!("\nUpgrade turbo with {}", command.bold()),
            None => eprintln!("Unable to determine turbo upgrade command"),
        }

        eprintln!("\nMigration completed!");
        Ok(MigrationOutcome::Migrated(MigrationReport {
            from,
            to,
            results,
            upgrade_command,
            installed,
        }))
    }

    fn current_version(&self, root: &Path, options: &MigrateOptions) -> Result<Version, MigrateError> {
        if let Some(from) = &options.from {
            return parse_version("--from", from);
        }
        self.toolchain
            .current_version(root)
            .map_err(MigrateError::CurrentVersion)?
            .ok_or_else(|| MigrateError::UnknownCurrentVersion(root.to_path_buf()))
    }

    /// An explicit semver `--to` is used as is, anything else is treated as a dist-tag.
    fn target_version(&self, options: &MigrateOptions) -> Result<Version, MigrateError> {
        let tag = options.to.as_deref().unwrap_or("latest");
        if let Ok(version) = Version::parse(tag) {
            return Ok(version);
        }
        self.toolchain
            .latest_version(tag)
            .map_err(MigrateError::LatestVersion)?
            .ok_or(MigrateError::UnknownLatestVersion)
    }
}

fn parse_version(flag: &'static str, value: &str) -> Result<Version, MigrateError> {
    Version::parse(value).map_err(|source| MigrateError::InvalidVersion {
        flag,
        value: value.to_string(),
        source,
    })
}
