//! Diagnostic sinks for malformed input.
//!
//! The file sink appends one line per report and never fails the caller:
//! write errors are only logged.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::ports::DiagnosticSink;

pub const DEFAULT_ERROR_LOG: &str = "error_log.txt";

/// Appends reports to a text file, creating it on first use.
#[derive(Debug, Clone)]
pub struct FileDiagnosticSink {
    path: PathBuf,
}

impl FileDiagnosticSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileDiagnosticSink {
    fn default() -> Self {
        Self::new(DEFAULT_ERROR_LOG)
    }
}

impl DiagnosticSink for FileDiagnosticSink {
    fn report(&self, message: &str) {
        let result = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut file| writeln!(file, "{}", message.trim_end()));
        if let Err(e) = result {
            log::error!(
                "Cannot append to diagnostic log {}: {}",
                self.path.display(),
                e
            );
        }
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn report(&self, message: &str) {
        (**self).report(message)
    }
}
