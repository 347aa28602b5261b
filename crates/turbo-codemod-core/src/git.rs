use anyhow::{Result, bail};
use colored::Colorize;
use std::path::Path;
use std::process::Command;

fn git(repo_root: &Path) -> Command {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(repo_root);
    cmd
}

pub fn is_git_repo(path: &Path) -> bool {
    git(path)
        .args(["rev-parse", "--is-inside-work-tree"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim() == "true")
        .unwrap_or(false)
}

pub fn has_uncommitted_changes(repo_root: &Path) -> Result<bool> {
    let out = git(repo_root).args(["status", "--porcelain"]).output()?;
    if !out.status.success() {
        bail!("Failed to check git status");
    }
    Ok(!out.stdout.is_empty())
}

/// Refuse to touch a dirty working tree unless `force` is set.
///
/// Directories outside of git are treated as clean.
pub fn check_git_status(root: &Path, force: bool) -> Result<()> {
    if !is_git_repo(root) || !has_uncommitted_changes(root)? {
        return Ok(());
    }

    if force {
        log::warn!("Git directory {} is not clean", root.display());
        eprintln!(
            "{} Git directory is not clean, continuing because --force was passed",
            "WARNING".yellow().bold()
        );
        return Ok(());
    }

    bail!(
        "Git directory is not clean. Please stash or commit your changes before running codemods, or use --force to bypass this check"
    )
}
