use anyhow::{Context, Result, bail};
use colored::Colorize;
use inquire::validator::Validation;
use inquire::{CustomUserError, Select, Text};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use turbo_codemod_core::git;

/// Returns true if running in an interactive terminal (both stdin and stdout are TTYs).
pub fn is_interactive() -> bool {
    std::io::stdin().is_terminal() && std::io::stdout().is_terminal()
}

/// The directory to run in: the argument if given, otherwise asked for.
/// Without a terminal the current directory is used.
pub fn directory(arg: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = arg {
        return Ok(dir);
    }
    if !is_interactive() {
        return Ok(PathBuf::from("."));
    }

    let answer = Text::new("Where is the root of the repo where the transform should run?")
        .with_default(".")
        .with_validator(|input: &str| -> Result<Validation, CustomUserError> {
            let dir = Path::new(input.trim());
            if dir.is_dir() {
                Ok(Validation::Valid)
            } else {
                let absolute = std::path::absolute(dir).unwrap_or_else(|_| dir.to_path_buf());
                Ok(Validation::Invalid(
                    format!("Directory {} does not exist", format!("({})", absolute.display()).dimmed())
                        .into(),
                ))
            }
        })
        .prompt()
        .context("Failed to read directory")?;
    Ok(PathBuf::from(answer.trim()))
}

/// [`directory`], followed by the git cleanliness check on the chosen tree.
/// Dry runs write nothing and skip the check.
pub fn checked_directory(arg: Option<PathBuf>, dry: bool, force: bool) -> Result<PathBuf> {
    let dir = directory(arg)?;
    if !dry {
        git::check_git_status(&dir, force)?;
    }
    Ok(dir)
}

/// The transform to apply: the argument if given, otherwise picked from `choices`.
pub fn transform(arg: Option<String>, choices: Vec<&'static str>) -> Result<String> {
    if let Some(name) = arg {
        return Ok(name);
    }
    if !is_interactive() {
        bail!("No transform given. Run with --list to see the available transforms");
    }

    let page_size = choices.len();
    let answer = Select::new("Which transform would you like to apply?", choices)
        .with_page_size(page_size)
        .prompt()
        .context("Failed to read transform")?;
    Ok(answer.to_string())
}
