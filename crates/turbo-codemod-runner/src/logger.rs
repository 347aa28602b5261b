use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use colored::{ColoredString, Colorize};
use log::debug;

/// Destination shared by every clone of a [`Logger`].
pub type LogOutput = Arc<Mutex<dyn Write + Send>>;

/// Status lines emitted while a transform runs.
///
/// Lines go to stderr by default so that machine-readable reports on stdout
/// stay clean.
#[derive(Clone)]
pub struct Logger {
    transform: String,
    dry: bool,
    out: LogOutput,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("transform", &self.transform)
            .field("dry", &self.dry)
            .finish_non_exhaustive()
    }
}

impl Logger {
    pub fn new(transform: impl Into<String>, dry: bool) -> Self {
        Self {
            transform: transform.into(),
            dry,
            out: Arc::new(Mutex::new(io::stderr())),
        }
    }

    /// Send every line to `out` instead of stderr.
    pub fn with_output(mut self, out: LogOutput) -> Self {
        self.out = out;
        self
    }

    pub fn modified(&self, message: &str) {
        self.emit(" MODIFIED ".green().reversed(), message, message.bold());
    }

    pub fn unchanged(&self, message: &str) {
        self.emit(" UNCHANGED ".bright_black().reversed(), message, message.dimmed());
    }

    pub fn skipped(&self, message: &str) {
        self.emit(" SKIPPED ".yellow().reversed(), message, message.dimmed());
    }

    pub fn error(&self, message: &str) {
        self.emit(" ERROR ".red().reversed(), message, message.normal());
    }

    pub fn info(&self, message: &str) {
        self.emit(" INFO ".white().reversed(), message, message.normal());
    }

    /// Print a unified diff with added lines in green and removed lines in red.
    pub fn diff(&self, diff: &str) {
        for line in diff.lines() {
            let styled = if line.starts_with("+++") || line.starts_with("---") {
                line.bold()
            } else if line.starts_with('+') {
                line.green()
            } else if line.starts_with('-') {
                line.red()
            } else if line.starts_with("@@") {
                line.cyan()
            } else {
                line.dimmed()
            };
            self.write_line(format_args!("{styled}"));
        }
    }

    fn emit(&self, label: ColoredString, message: &str, styled: ColoredString) {
        debug!("[{}] {}", self.transform, message);
        if self.dry {
            self.write_line(format_args!("{label} {styled} {}", "(dry run)".dimmed()));
        } else {
            self.write_line(format_args!("{label} {styled}"));
        }
    }

    fn write_line(&self, line: fmt::Arguments<'_>) {
        let Ok(mut out) = self.out.lock() else {
            return;
        };
        if let Err(e) = writeln!(out, "{line}") {
            debug!("Failed to write log line: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_go_to_configured_output() {
        let buffer = Arc::new(Mutex::new(Vec::<u8>::new()));
        let logger = Logger::new("demo", true).with_output(buffer.clone());
        logger.skipped("turbo.json");
        logger.diff("--- a/turbo.json\n+++ b/turbo.json\n+added\n");

        let text = String::from_utf8(buffer.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("SKIPPED"));
        assert!(lines[0].contains("turbo.json"));
        assert!(lines[0].contains("(dry run)"));
        assert!(lines[1].contains("--- a/turbo.json"));
        assert!(lines[3].contains("+added"));
    }
}
