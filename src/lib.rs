// Main library entry point for pycallmap.
//
// source file → tree-sitter-python → descriptors → positioned graph → exporters

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod ports;

pub use domain::{ExtractOptions, Extraction, Graph, LayoutParams};
pub use error::{ConfigError, ExtractError, GraphError};
