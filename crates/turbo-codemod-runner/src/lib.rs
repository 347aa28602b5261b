//! # turbo-codemod-runner
//!
//! Tracks proposed edits to files, applies or skips them (dry run), and
//! aggregates the outcome of every edit into a single [`TransformerResults`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use turbo_codemod_runner::{Runner, RunnerOptions};
//!
//! let mut runner = Runner::new("rename-key", "/path/to/repo", RunnerOptions::default());
//! runner.modify_file("turbo.json", "{}\n");
//! let results = runner.finish();
//! assert!(!results.is_fatal());
//! ```

mod file_transform;
mod logger;
mod report;
mod runner;

pub use file_transform::{Contents, FileTransform, render_json};
pub use logger::{LogOutput, Logger};
pub use report::{JsonReport, ReportSink, TableReport, render_table};
pub use runner::{
    Changes, FileAction, FileResult, Runner, RunnerOptions, TransformError, TransformerResults,
};
