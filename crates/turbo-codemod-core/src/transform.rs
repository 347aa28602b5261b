use std::path::{Path, PathBuf};
use turbo_codemod_runner::TransformerResults;

use crate::codemods::{Codemod, CodemodRegistry, TransformContext, TransformOptions};
use crate::toolchain::Toolchain;

#[derive(Debug, thiserror::Error)]
pub enum TransformCommandError {
    #[error("Invalid transform choice ({name}), pick one of:\n{}", bullet_list(.choices))]
    UnknownTransform {
        name: String,
        choices: Vec<&'static str>,
    },

    #[error("Directory {} does not exist", .0.display())]
    DirectoryNotFound(PathBuf),
}

fn bullet_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Look up a transform by name, listing the valid choices when it doesn't exist.
pub fn find_transform<'a>(
    registry: &'a CodemodRegistry,
    name: &str,
) -> Result<&'a dyn Codemod, TransformCommandError> {
    registry
        .get(name)
        .ok_or_else(|| TransformCommandError::UnknownTransform {
            name: name.to_string(),
            choices: registry.names(),
        })
}

/// Apply a single named transform to `directory`.
pub fn run_transform(
    registry: &CodemodRegistry,
    toolchain: &dyn Toolchain,
    name: &str,
    directory: &Path,
    options: TransformOptions,
) -> Result<TransformerResults, TransformCommandError> {
    let codemod = find_transform(registry, name)?;
    let root = directory
        .canonicalize()
        .ok()
        .filter(|root| root.is_dir())
        .ok_or_else(|| TransformCommandError::DirectoryNotFound(directory.to_path_buf()))?;

    log::debug!("Running {} in {}", codemod.name(), root.display());
    Ok(codemod.transform(&TransformContext {
        root: &root,
        options,
        toolchain,
    }))
}
