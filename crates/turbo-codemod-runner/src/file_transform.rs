use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::debug;
use serde_json::Value;
use similar::{ChangeTag, TextDiff};

/// Contents proposed for a file.
#[derive(Debug, Clone, PartialEq)]
pub enum Contents {
    /// Raw text, written verbatim.
    Text(String),
    /// A JSON document, written with two-space indentation.
    Json(Value),
}

impl From<String> for Contents {
    fn from(text: String) -> Self {
        Contents::Text(text)
    }
}

impl From<&str> for Contents {
    fn from(text: &str) -> Self {
        Contents::Text(text.to_string())
    }
}

impl From<Value> for Contents {
    fn from(value: Value) -> Self {
        Contents::Json(value)
    }
}

impl Contents {
    fn render(&self) -> String {
        match self {
            Contents::Text(text) => text.clone(),
            Contents::Json(value) => render_json(value),
        }
    }
}

/// Render a JSON document the way it is written to disk.
pub fn render_json(value: &Value) -> String {
    let mut out = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
    out.push('\n');
    out
}

/// A single proposed mutation of one file.
///
/// The on-disk content is read when the transform is created; nothing touches
/// the disk again until [`FileTransform::write`] is called.
#[derive(Debug, Clone)]
pub struct FileTransform {
    path: PathBuf,
    name: String,
    original: Option<String>,
    unreadable: Option<String>,
    proposed: Option<Contents>,
}

impl FileTransform {
    /// Track `file_path` (absolute, or relative to `root`).
    ///
    /// A missing file is not an error: it models a file that the transform
    /// is about to create. Any other read failure is kept and reported by
    /// [`FileTransform::read_error`], and such a file is never written.
    pub fn new(root: &Path, file_path: impl AsRef<Path>) -> Self {
        let file_path = file_path.as_ref();
        let path = if file_path.is_absolute() {
            file_path.to_path_buf()
        } else {
            root.join(file_path)
        };
        let name = path
            .strip_prefix(root)
            .unwrap_or(&path)
            .to_string_lossy()
            .replace('\\', "/");

        let (original, unreadable) = match fs::read_to_string(&path) {
            Ok(content) => (Some(content), None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => (None, None),
            Err(e) => {
                debug!("Failed to read {}: {e}", path.display());
                (None, Some(e.to_string()))
            }
        };

        Self {
            path,
            name,
            original,
            unreadable,
            proposed: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the root the transform was created with.
    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }

    /// Why an existing file could not be read, e.g. it is not valid UTF-8.
    pub fn read_error(&self) -> Option<&str> {
        self.unreadable.as_deref()
    }

    /// Replace the proposed contents. Last write wins.
    pub fn set_content(&mut self, contents: impl Into<Contents>) {
        self.proposed = Some(contents.into());
    }

    /// The text that [`FileTransform::write`] would persist.
    pub fn proposed_text(&self) -> Option<String> {
        self.proposed.as_ref().map(Contents::render)
    }

    pub fn additions(&self) -> usize {
        self.line_delta().0
    }

    pub fn deletions(&self) -> usize {
        self.line_delta().1
    }

    pub fn has_changes(&self) -> bool {
        let (additions, deletions) = self.line_delta();
        additions > 0 || deletions > 0
    }

    /// Persist the proposed contents, creating parent directories as needed.
    pub fn write(&self) -> io::Result<()> {
        if let Some(reason) = &self.unreadable {
            return Err(io::Error::other(format!(
                "refusing to overwrite {}: {reason}",
                self.path.display()
            )));
        }
        let Some(contents) = self.proposed_text() else {
            return Ok(());
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, contents)
    }

    /// Unified diff between the original and proposed contents.
    pub fn render_diff(&self) -> String {
        let Some((before, after)) = self.comparison() else {
            return String::new();
        };
        let diff = TextDiff::from_lines(before.as_str(), after.as_str());
        format!(
            "{}",
            diff.unified_diff().context_radius(3).header(
                &format!("a/{}", self.name),
                &format!("b/{}", self.name)
            )
        )
    }

    /// The two texts that are compared line by line.
    ///
    /// JSON proposals are compared against a canonical rendering of the
    /// original document so that formatting alone never counts as a change.
    fn comparison(&self) -> Option<(String, String)> {
        let proposed = self.proposed.as_ref()?;
        let before = match (proposed, self.original.as_deref()) {
            (_, None) => String::new(),
            (Contents::Json(_), Some(original)) => match serde_json::from_str::<Value>(original) {
                Ok(value) => render_json(&value),
                Err(_) => original.to_string(),
            },
            (Contents::Text(_), Some(original)) => original.to_string(),
        };
        Some((before, proposed.render()))
    }

    fn line_delta(&self) -> (usize, usize) {
        let Some((before, after)) = self.comparison() else {
            return (0, 0);
        };
        let diff = TextDiff::from_lines(before.as_str(), after.as_str());
        diff.iter_all_changes()
            .fold((0, 0), |(additions, deletions), change| match change.tag() {
                ChangeTag::Insert => (additions + 1, deletions),
                ChangeTag::Delete => (additions, deletions + 1),
                ChangeTag::Equal => (additions, deletions),
            })
    }
}
