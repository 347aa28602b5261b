//! Version-aware codemods for turbo repositories.
//!
//! A [`CodemodRegistry`] lists transforms by the release that introduced them.
//! [`Migrator`] works out which of them a repository needs to move between two
//! turbo versions and runs them in order, while [`run_transform`] applies a
//! single one by name.

pub mod codemods;
pub mod git;
pub mod migrate;
pub mod resolve;
pub mod toolchain;
pub mod transform;

pub use codemods::{Codemod, CodemodRegistry, RegistryError, TransformContext, TransformOptions};
pub use migrate::{MigrateError, MigrateOptions, MigrationOutcome, MigrationReport, Migrator};
pub use resolve::codemods_for_migration;
pub use toolchain::{PackageManager, SystemToolchain, Toolchain};
pub use transform::{TransformCommandError, find_transform, run_transform};
