use anyhow::{Context, Result, bail};
use semver::Version;
use std::path::Path;
use std::process::Command;

use super::npm::NpmRegistry;
use super::upgrade::{install_scope, upgrade_command};
use super::{PackageManager, Toolchain, detect_package_manager};

/// [`Toolchain`] backed by the real system: spawned processes and the npm registry.
#[derive(Debug, Clone, Default)]
pub struct SystemToolchain {
    registry: NpmRegistry,
}

impl SystemToolchain {
    pub fn new(registry: NpmRegistry) -> Self {
        Self { registry }
    }

    /// `turbo --version` through the repository's package manager.
    fn local_turbo_version(&self, root: &Path) -> Option<String> {
        match self.package_manager(root)? {
            PackageManager::Yarn => turbo_version(Path::new("yarn"), &["turbo", "--version"], root),
            PackageManager::Pnpm => turbo_version(Path::new("pnpm"), &["turbo", "--version"], root),
            PackageManager::Npm => {
                let bin = root.join("node_modules").join(".bin").join("turbo");
                if bin.exists() {
                    turbo_version(&bin, &["--version"], root)
                } else {
                    None
                }
            }
        }
    }
}

/// Trimmed stdout of a successful command, `None` if it could not be run or failed.
fn stdout_opt(mut cmd: Command) -> Option<String> {
    let out = cmd.output().ok()?;
    if !out.status.success() {
        return None;
    }
    let s = String::from_utf8_lossy(&out.stdout).trim().to_string();
    if s.is_empty() { None } else { Some(s) }
}

fn turbo_version(program: &Path, args: &[&str], root: &Path) -> Option<String> {
    let mut cmd = Command::new(program);
    cmd.args(args).current_dir(root);
    stdout_opt(cmd)
}

/// Parse `turbo --version` output. Package managers may print banners first,
/// so the version is taken from the last line.
fn parse_turbo_version(output: &str) -> Result<Version> {
    let line = output.lines().last().unwrap_or_default().trim();
    Version::parse(line).with_context(|| format!("Unexpected output from turbo --version: {line}"))
}

/// The first output that parses as a version. Output that does not parse is
/// skipped, and only reported when nothing else was found.
fn first_version(outputs: impl IntoIterator<Item = String>) -> Result<Option<Version>> {
    let mut unparsed = None;
    for output in outputs {
        match parse_turbo_version(&output) {
            Ok(version) => return Ok(Some(version)),
            Err(e) => {
                log::debug!("{e:#}");
                unparsed.get_or_insert(e);
            }
        }
    }
    match unparsed {
        Some(e) => Err(e),
        None => Ok(None),
    }
}

impl Toolchain for SystemToolchain {
    fn current_version(&self, root: &Path) -> Result<Option<Version>> {
        let global = std::iter::once_with(|| turbo_version(Path::new("turbo"), &["--version"], root));
        let local = std::iter::once_with(|| self.local_turbo_version(root));
        let version = first_version(global.chain(local).flatten())?;
        if version.is_none() {
            log::debug!("Unable to find a turbo binary for {}", root.display());
        }
        Ok(version)
    }

    fn latest_version(&self, tag: &str) -> Result<Option<Version>> {
        self.registry.dist_tag("turbo", tag)
    }

    fn package_manager(&self, root: &Path) -> Option<PackageManager> {
        detect_package_manager(root)
    }

    fn package_manager_version(&self, pm: PackageManager, root: &Path) -> Option<String> {
        let mut cmd = Command::new(pm.command());
        cmd.arg("--version").current_dir(root);
        stdout_opt(cmd)
    }

    fn upgrade_command(&self, root: &Path, to: Option<&str>) -> Option<String> {
        let pm = self.package_manager(root)?;
        let scope = install_scope(root, pm);
        Some(upgrade_command(pm, scope, to.unwrap_or("latest")))
    }

    fn run_command(&self, command: &str, root: &Path) -> Result<()> {
        let mut parts = command.split_whitespace();
        let Some(program) = parts.next() else {
            bail!("Empty command");
        };

        log::debug!("Running `{command}` in {}", root.display());
        let status = Command::new(program)
            .args(parts)
            .current_dir(root)
            .status()
            .with_context(|| format!("Failed to run `{command}`"))?;
        if !status.success() {
            bail!("`{command}` exited with {status}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_turbo_version() -> Result<()> {
        assert_eq!(parse_turbo_version("1.7.0\n")?, Version::new(1, 7, 0));
        assert_eq!(
            parse_turbo_version("yarn run v1.22.19\n1.6.3")?,
            Version::new(1, 6, 3)
        );
        assert!(parse_turbo_version("command not found").is_err());
        Ok(())
    }

    #[test]
    fn test_first_version_skips_unparsable_output() -> Result<()> {
        let outputs = ["turbo is not installed".to_string(), "1.6.3".to_string()];
        assert_eq!(first_version(outputs)?, Some(Version::new(1, 6, 3)));
        assert_eq!(first_version(Vec::new())?, None);

        let err = first_version(["oops".to_string()]).unwrap_err();
        assert!(err.to_string().contains("Unexpected output from turbo --version: oops"));
        Ok(())
    }

    #[cfg(unix)]
    #[test]
    fn test_local_turbo_binary_is_found() -> Result<()> {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir()?;
        std::fs::write(temp.path().join("package-lock.json"), "{}")?;
        let bin_dir = temp.path().join("node_modules").join(".bin");
        std::fs::create_dir_all(&bin_dir)?;
        let bin = bin_dir.join("turbo");
        std::fs::write(&bin, "#!/bin/sh\necho 1.2.3\n")?;
        std::fs::set_permissions(&bin, std::fs::Permissions::from_mode(0o755))?;

        let toolchain = SystemToolchain::default();
        assert_eq!(toolchain.local_turbo_version(temp.path()).as_deref(), Some("1.2.3"));
        Ok(())
    }

    #[test]
    fn test_upgrade_command_needs_package_manager() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let toolchain = SystemToolchain::default();
        assert_eq!(toolchain.upgrade_command(temp.path(), None), None);

        std::fs::write(temp.path().join("package-lock.json"), "{}")?;
        assert_eq!(
            toolchain.upgrade_command(temp.path(), Some("1.7.0")).as_deref(),
            Some("npm install turbo@1.7.0 --global")
        );
        Ok(())
    }

    #[test]
    fn test_failing_command_is_an_error() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let toolchain = SystemToolchain::default();
        assert!(toolchain.run_command("", temp.path()).is_err());
        assert!(
            toolchain
                .run_command("definitely-not-a-real-binary-1b2c", temp.path())
                .is_err()
        );
        Ok(())
    }
}
