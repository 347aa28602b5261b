use serde_json::Value;
use std::fs;
use std::path::Path;

use super::PackageManager;

/// Where turbo is installed relative to the workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallScope {
    /// Listed in the root `package.json`. `workspace` is set for monorepo roots.
    Local { workspace: bool },
    Global,
}

/// Work out how turbo is installed for the workspace at `root`.
pub fn install_scope(root: &Path, pm: PackageManager) -> InstallScope {
    let package_json: Option<Value> = fs::read_to_string(root.join("package.json"))
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok());
    let Some(package_json) = package_json else {
        return InstallScope::Global;
    };

    let listed = ["dependencies", "devDependencies"]
        .iter()
        .any(|key| package_json.get(key).and_then(|deps| deps.get("turbo")).is_some());
    if !listed {
        return InstallScope::Global;
    }

    let workspace = match pm {
        PackageManager::Pnpm => root.join("pnpm-workspace.yaml").exists(),
        PackageManager::Yarn => package_json.get("workspaces").is_some(),
        PackageManager::Npm => false,
    };
    InstallScope::Local { workspace }
}

/// The command that installs `turbo@version` with `pm`.
pub fn upgrade_command(pm: PackageManager, scope: InstallScope, version: &str) -> String {
    let package = format!("turbo@{version}");
    match (pm, scope) {
        (PackageManager::Npm, InstallScope::Global) => format!("npm install {package} --global"),
        (PackageManager::Npm, InstallScope::Local { .. }) => {
            format!("npm install {package} --save-dev")
        }
        (PackageManager::Yarn, InstallScope::Global) => format!("yarn global add {package}"),
        (PackageManager::Yarn, InstallScope::Local { workspace }) => {
            let flag = if workspace { " -W" } else { "" };
            format!("yarn add {package} --dev{flag}")
        }
        (PackageManager::Pnpm, InstallScope::Global) => format!("pnpm add {package} --global"),
        (PackageManager::Pnpm, InstallScope::Local { workspace }) => {
            let flag = if workspace { " -w" } else { "" };
            format!("pnpm add {package} --save-dev{flag}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upgrade_commands() {
        use InstallScope::*;
        use PackageManager::*;

        let cases = [
            (Npm, Global, "npm install turbo@latest --global"),
            (Npm, Local { workspace: true }, "npm install turbo@latest --save-dev"),
            (Yarn, Global, "yarn global add turbo@latest"),
            (Yarn, Local { workspace: false }, "yarn add turbo@latest --dev"),
            (Yarn, Local { workspace: true }, "yarn add turbo@latest --dev -W"),
            (Pnpm, Global, "pnpm add turbo@latest --global"),
            (Pnpm, Local { workspace: false }, "pnpm add turbo@latest --save-dev"),
            (Pnpm, Local { workspace: true }, "pnpm add turbo@latest --save-dev -w"),
        ];
        for (pm, scope, expected) in cases {
            assert_eq!(upgrade_command(pm, scope, "latest"), expected);
        }
    }

    #[test]
    fn test_install_scope() -> anyhow::Result<()> {
        let temp = tempfile::tempdir()?;
        assert_eq!(install_scope(temp.path(), PackageManager::Npm), InstallScope::Global);

        fs::write(
            temp.path().join("package.json"),
            r#"{ "devDependencies": { "turbo": "1.0.0" }, "workspaces": ["apps/*"] }"#,
        )?;
        assert_eq!(
            install_scope(temp.path(), PackageManager::Yarn),
            InstallScope::Local { workspace: true }
        );
        assert_eq!(
            install_scope(temp.path(), PackageManager::Pnpm),
            InstallScope::Local { workspace: false }
        );

        fs::write(temp.path().join("pnpm-workspace.yaml"), "packages: []\n")?;
        assert_eq!(
            install_scope(temp.path(), PackageManager::Pnpm),
            InstallScope::Local { workspace: true }
        );

        fs::write(temp.path().join("package.json"), r#"{ "dependencies": {} }"#)?;
        assert_eq!(install_scope(temp.path(), PackageManager::Pnpm), InstallScope::Global);
        Ok(())
    }
}
