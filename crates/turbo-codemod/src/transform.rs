use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use turbo_codemod_core::{
    CodemodRegistry, SystemToolchain, TransformOptions, find_transform, run_transform,
};

use crate::output::OutputFormat;
use crate::prompt;

#[derive(Args, Debug, Default, Clone)]
#[command(about = "Apply a single codemod to a repository")]
pub struct TransformArgs {
    /// Name of the transform to apply
    #[arg(value_name = "TRANSFORM")]
    pub transform: Option<String>,

    /// Root of the repository to transform
    #[arg(value_name = "PATH", value_hint = clap::ValueHint::DirPath)]
    pub path: Option<PathBuf>,

    /// List the available transforms
    #[arg(long)]
    pub list: bool,

    /// Bypass the git working tree check
    #[arg(long)]
    pub force: bool,

    /// Dry run, no files are written
    #[arg(long)]
    pub dry: bool,

    /// Print transformed files
    #[arg(long)]
    pub print: bool,

    #[arg(long, value_enum, default_value_t)]
    pub format: OutputFormat,
}

pub fn execute(args: TransformArgs) -> Result<()> {
    let registry = CodemodRegistry::builtin();
    if args.list {
        for codemod in registry.iter() {
            println!("- {}  {}", codemod.name().cyan(), codemod.description().dimmed());
        }
        return Ok(());
    }

    // Reject a bad name before asking anything else
    if let Some(name) = &args.transform {
        find_transform(&registry, name)?;
    }
    let directory = prompt::checked_directory(args.path, args.dry, args.force)?;
    let name = prompt::transform(args.transform, registry.names())?;

    let options = TransformOptions {
        force: args.force,
        dry: args.dry,
        print: args.print,
    };
    let results = run_transform(&registry, &SystemToolchain::default(), &name, &directory, options)?;

    if let Err(e) = args.format.sink().report(&name, &results) {
        log::warn!("Failed to report results of {name}: {e:#}");
    }
    if let Some(error) = results.fatal_error {
        bail!("{name} failed: {error}");
    }
    Ok(())
}
