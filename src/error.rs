// Error types for pycallmap.

use thiserror::Error;

/// Why a source file produced no descriptors.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("cannot read source: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid syntax at line {line}, column {column}")]
    Syntax { line: usize, column: usize },

    #[error("tree-sitter language error: {0}")]
    Language(String),
}

/// Rejected graph edit. The snapshot the edit was applied to stays valid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("unknown node '{0}'")]
    UnknownNode(String),

    #[error("node '{0}' already exists")]
    DuplicateNode(String),

    #[error("unknown group '{0}'")]
    UnknownGroup(String),

    #[error("edge index {index} out of range ({len} edges)")]
    EdgeOutOfRange { index: usize, len: usize },

    #[error("edge {index} points at a node that is not in the graph")]
    DanglingEdge { index: usize },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),
}
