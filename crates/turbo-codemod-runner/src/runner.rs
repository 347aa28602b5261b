use std::fmt;
use std::path::{Path, PathBuf};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::file_transform::{Contents, FileTransform};
use crate::logger::{LogOutput, Logger};

/// What happened to a single tracked file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileAction {
    Unchanged,
    Skipped,
    Modified,
    Error,
}

impl fmt::Display for FileAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileAction::Unchanged => "unchanged",
            FileAction::Skipped => "skipped",
            FileAction::Modified => "modified",
            FileAction::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileResult {
    pub action: FileAction,
    pub additions: usize,
    pub deletions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fatal outcome of a transform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(transparent)]
#[error("{reason}")]
pub struct TransformError {
    pub reason: String,
}

impl TransformError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Per-file results, kept in the order the files were registered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes {
    entries: Vec<(String, FileResult)>,
}

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `result` for `file`, replacing any earlier result in place.
    pub fn insert(&mut self, file: impl Into<String>, result: FileResult) {
        let file = file.into();
        match self.entries.iter_mut().find(|(name, _)| *name == file) {
            Some((_, existing)) => *existing = result,
            None => self.entries.push((file, result)),
        }
    }

    pub fn get(&self, file: &str) -> Option<&FileResult> {
        self.entries
            .iter()
            .find(|(name, _)| name == file)
            .map(|(_, result)| result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FileResult)> {
        self.entries
            .iter()
            .map(|(name, result)| (name.as_str(), result))
    }

    pub fn has_errors(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, result)| result.action == FileAction::Error)
    }
}

impl Serialize for Changes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, result) in &self.entries {
            map.serialize_entry(name, result)?;
        }
        map.end()
    }
}

/// Outcome of one transform run.
///
/// Whenever any file ended in [`FileAction::Error`], `fatal_error` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformerResults {
    pub changes: Changes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal_error: Option<TransformError>,
}

impl TransformerResults {
    pub fn is_fatal(&self) -> bool {
        self.fatal_error.is_some()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunnerOptions {
    /// Compute and report changes without writing them.
    pub dry: bool,
    /// Print a diff for every changed file.
    pub print: bool,
}

/// Applies and reports on a batch of file edits for one transform.
pub struct Runner {
    root: PathBuf,
    options: RunnerOptions,
    modifications: Vec<FileTransform>,
    logger: Logger,
}

impl Runner {
    pub fn new(transform: impl Into<String>, root: impl Into<PathBuf>, options: RunnerOptions) -> Self {
        Self {
            root: root.into(),
            options,
            modifications: Vec::new(),
            logger: Logger::new(transform, options.dry),
        }
    }

    /// Route status lines and diffs to `out` instead of stderr.
    pub fn with_output(mut self, out: LogOutput) -> Self {
        self.logger = self.logger.with_output(out);
        self
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    /// Propose new contents for a file, tracking it on first use.
    pub fn modify_file(
        &mut self,
        file_path: impl AsRef<Path>,
        contents: impl Into<Contents>,
    ) -> &mut FileTransform {
        let transform = FileTransform::new(&self.root, file_path);
        let index = match self
            .modifications
            .iter()
            .position(|existing| existing.path() == transform.path())
        {
            Some(index) => index,
            None => {
                self.modifications.push(transform);
                self.modifications.len() - 1
            }
        };

        let tracked = &mut self.modifications[index];
        tracked.set_content(contents);
        tracked
    }

    /// Stop the transform with `reason`, keeping whatever changes were recorded.
    pub fn abort_transform(&self, reason: impl Into<String>, changes: Changes) -> TransformerResults {
        let reason = reason.into();
        self.logger.error(&reason);
        TransformerResults {
            changes,
            fatal_error: Some(TransformError::new(reason)),
        }
    }

    /// Apply (or skip, when dry) every tracked edit and collect the results.
    ///
    /// A failed write never stops the remaining edits from being attempted.
    /// An existing file that could not be read is an error and is left alone.
    pub fn finish(self) -> TransformerResults {
        let mut changes = Changes::new();

        for modification in &self.modifications {
            let name = modification.file_name();
            let mut result = FileResult {
                action: FileAction::Unchanged,
                additions: modification.additions(),
                deletions: modification.deletions(),
                error: None,
            };

            if let Some(reason) = modification.read_error() {
                self.logger.error(&format!("{name} {reason}"));
                result.action = FileAction::Error;
                result.additions = 0;
                result.deletions = 0;
                result.error = Some(reason.to_string());
            } else if modification.has_changes() {
                if self.options.dry {
                    result.action = FileAction::Skipped;
                    self.logger.skipped(name);
                } else {
                    match modification.write() {
                        Ok(()) => {
                            result.action = FileAction::Modified;
                            self.logger.modified(name);
                        }
                        Err(e) => {
                            let message = e.to_string();
                            self.logger.error(&format!("{name} {message}"));
                            result.action = FileAction::Error;
                            result.error = Some(message);
                        }
                    }
                }

                if self.options.print {
                    self.logger.diff(&modification.render_diff());
                }
            } else {
                self.logger.unchanged(name);
            }

            changes.insert(name, result);
        }

        if changes.has_errors() {
            return self.abort_transform("Encountered an error while transforming files", changes);
        }

        TransformerResults {
            changes,
            fatal_error: None,
        }
    }
}
