//! Build-time error taxonomy.
//!
//! Every variant is fatal: the pipeline stops and nothing is written.

use std::io;
use std::path::PathBuf;

use svelteesp32_core::UnknownBackend;
use thiserror::Error;

/// The input tree cannot be read.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("source directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("source path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("source directory is empty: {}", .0.display())]
    Empty(PathBuf),

    #[error("symlink cycle: {} leads back to {}", .child.display(), .ancestor.display())]
    SymlinkCycle { ancestor: PathBuf, child: PathBuf },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to walk {}: {reason}", .root.display())]
    Walk { root: PathBuf, reason: String },
}

/// A declared build-time invariant or option is violated.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing index file: no '{entry}' found in source files (use noindexcheck to allow)")]
    MissingIndex { entry: String },

    #[error("more than one '{entry}' found: {}", .paths.join(", "))]
    DuplicateIndex { entry: String, paths: Vec<String> },

    #[error("too many CSS files: {count} found, at most {max} allowed ({})", .paths.join(", "))]
    TooManyCss {
        count: usize,
        max: usize,
        paths: Vec<String>,
    },

    #[error("{field} exceeded: {actual} bytes, limit is {limit} bytes")]
    SizeLimitExceeded {
        field: &'static str,
        actual: usize,
        limit: usize,
    },

    #[error("sourcepath is required")]
    MissingSourcePath,

    #[error("{field} must be a valid Rust identifier: '{value}'")]
    InvalidIdentifier { field: &'static str, value: String },

    #[error("basepath {reason}: '{value}'")]
    InvalidBasePath { value: String, reason: &'static str },

    #[error("invalid {field}: '{value}' (expected true, false or compiler)")]
    InvalidToggle { field: &'static str, value: String },

    #[error("invalid {field}: '{value}' (positive number with optional k/m suffix)")]
    InvalidSize { field: &'static str, value: String },

    #[error("invalid {field}: {reason}")]
    InvalidOption { field: &'static str, reason: String },

    #[error("invalid exclude pattern '{pattern}': {reason}")]
    InvalidExclude { pattern: String, reason: String },

    #[error("config file not found: {}", .0.display())]
    RcNotFound(PathBuf),

    #[error("invalid config file {}: {reason}", .path.display())]
    RcFile { path: PathBuf, reason: String },

    #[error(
        "config file uses npm package variables but package.json not found in {} (fields: {})",
        .dir.display(),
        .fields.join(", ")
    )]
    PackageJsonMissing { dir: PathBuf, fields: Vec<String> },
}

/// The table cannot be turned into source for the requested backend.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error(transparent)]
    UnsupportedBackend(#[from] UnknownBackend),

    #[error("generated table violates its contract: {0}")]
    Contract(String),

    #[error("failed to format generated source")]
    Format(#[from] std::fmt::Error),

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Any failure of the packing pipeline.
#[derive(Debug, Error)]
pub enum PackError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Emit(#[from] EmitError),

    #[error("failed to compress {path}: {source}")]
    Compress {
        path: String,
        #[source]
        source: io::Error,
    },
}
