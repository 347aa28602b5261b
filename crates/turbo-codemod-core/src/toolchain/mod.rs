//! Everything that needs to look outside the repository being migrated:
//! installed binaries, the package manager and the npm registry.

use anyhow::Result;
use semver::Version;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

pub mod npm;
pub mod system;
pub mod upgrade;

pub use npm::NpmRegistry;
pub use system::SystemToolchain;
pub use upgrade::{InstallScope, install_scope, upgrade_command};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    pub fn command(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "npm" => Some(PackageManager::Npm),
            "yarn" => Some(PackageManager::Yarn),
            "pnpm" => Some(PackageManager::Pnpm),
            _ => None,
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.command())
    }
}

/// Environment queries the migration depends on.
///
/// Lookups that can legitimately come up empty return `Ok(None)`; `Err` is
/// reserved for failures worth reporting.
pub trait Toolchain {
    /// Version of turbo installed for `root`.
    fn current_version(&self, root: &Path) -> Result<Option<Version>>;

    /// Version behind an npm dist-tag of turbo, e.g. `latest` or `canary`.
    fn latest_version(&self, tag: &str) -> Result<Option<Version>>;

    fn package_manager(&self, root: &Path) -> Option<PackageManager>;

    fn package_manager_version(&self, pm: PackageManager, root: &Path) -> Option<String>;

    /// Shell command that installs turbo `to` (or latest) for `root`.
    fn upgrade_command(&self, root: &Path, to: Option<&str>) -> Option<String>;

    fn run_command(&self, command: &str, root: &Path) -> Result<()>;
}

/// Guess the package manager of the workspace at `root` from its lockfiles,
/// falling back to the `packageManager` field of `package.json`.
pub fn detect_package_manager(root: &Path) -> Option<PackageManager> {
    if root.join("pnpm-workspace.yaml").exists() || root.join("pnpm-lock.yaml").exists() {
        return Some(PackageManager::Pnpm);
    }
    if root.join("yarn.lock").exists() {
        return Some(PackageManager::Yarn);
    }
    if root.join("package-lock.json").exists() {
        return Some(PackageManager::Npm);
    }

    let content = fs::read_to_string(root.join("package.json")).ok()?;
    let package_json: Value = serde_json::from_str(&content).ok()?;
    let field = package_json.get("packageManager")?.as_str()?;
    let name = field.split_once('@').map_or(field, |(name, _)| name);
    PackageManager::from_name(name)
}
