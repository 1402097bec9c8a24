// Infrastructure implementations for pycallmap.

pub mod config;
pub mod diagnostics;
pub mod python_extractor;

pub use config::AppConfig;
pub use diagnostics::{FileDiagnosticSink, DEFAULT_ERROR_LOG};
pub use python_extractor::{extract_source, extract_tree, parse_python, PythonExtractor};
