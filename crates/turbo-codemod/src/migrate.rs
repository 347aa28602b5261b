use anyhow::Result;
use clap::Args;
use std::path::PathBuf;
use turbo_codemod_core::toolchain::NpmRegistry;
use turbo_codemod_core::toolchain::npm::DEFAULT_REGISTRY;
use turbo_codemod_core::{CodemodRegistry, MigrateOptions, Migrator, SystemToolchain};

use crate::output::OutputFormat;
use crate::prompt;

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Migrate a repository to a newer version of turbo")]
pub struct MigrateArgs {
    /// Root of the repository to migrate
    #[arg(value_name = "PATH", value_hint = clap::ValueHint::DirPath)]
    pub path: Option<PathBuf>,

    /// Version of turbo to migrate from, instead of detecting it
    #[arg(long, value_name = "VERSION")]
    pub from: Option<String>,

    /// Version or npm dist-tag of turbo to migrate to
    #[arg(long, value_name = "VERSION")]
    pub to: Option<String>,

    /// Bypass the git working tree check
    #[arg(long)]
    pub force: bool,

    /// Dry run, no files are written
    #[arg(long)]
    pub dry: bool,

    /// Print transformed files
    #[arg(long)]
    pub print: bool,

    /// Install the new version of turbo after migrating
    #[arg(long)]
    pub install: bool,

    /// npm registry used to resolve dist-tags such as `latest`
    #[arg(long, value_name = "URL", default_value = DEFAULT_REGISTRY)]
    pub registry: String,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

pub fn execute(args: MigrateArgs) -> Result<()> {
    let directory = prompt::checked_directory(args.path, args.dry, args.force)?;

    let registry = CodemodRegistry::builtin();
    let toolchain = SystemToolchain::new(NpmRegistry::new(args.registry));
    let mut sink = args.format.sink();
    let options = MigrateOptions {
        force: args.force,
        dry: args.dry,
        print: args.print,
        install: args.install,
        from: args.from,
        to: args.to,
    };

    Migrator::new(&registry, &toolchain, sink.as_mut()).migrate(&directory, &options)?;
    Ok(())
}
