use semver::Version;

use crate::codemods::{Codemod, CodemodRegistry};

/// Codemods a project on `from` needs to reach `to`, in registry order.
///
/// A codemod applies when `from < introduced_in <= to`. Build metadata is
/// ignored, and a downgrade selects nothing.
pub fn codemods_for_migration<'a>(
    registry: &'a CodemodRegistry,
    from: &Version,
    to: &Version,
) -> Vec<&'a dyn Codemod> {
    registry
        .iter()
        .filter(|codemod| {
            let introduced = codemod.introduced_in();
            introduced.cmp_precedence(from).is_gt() && introduced.cmp_precedence(to).is_le()
        })
        .collect()
}
