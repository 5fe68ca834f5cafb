//! Source tree scanner.
//!
//! Walks the web bundle deterministically, follows symlinks (rejecting
//! cycles) and applies the exclude globs.

use std::fs;
use std::path::{Component, Path, PathBuf};

use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;

use crate::error::{ConfigError, PackError, ScanError};

/// Excluded unless the caller says otherwise: OS and VCS clutter.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    ".DS_Store",
    "Thumbs.db",
    ".git",
    ".svn",
    "*.swp",
    "*~",
    ".gitignore",
    ".gitattributes",
];

/// Precompressed siblings produced by bundlers; never embedded.
const PRECOMPRESSED_EXTENSIONS: &[&str] = &["gz", "br", "brotli"];

/// One regular file found under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedFile {
    /// Path relative to the root, `/`-separated.
    pub relative: String,
    pub source: PathBuf,
    pub bytes: Vec<u8>,
}

/// Scan `root`, returning files sorted by relative path.
pub fn scan(root: &Path, exclude: &[String]) -> Result<Vec<ScannedFile>, PackError> {
    if !root.exists() {
        return Err(ScanError::RootNotFound(root.to_path_buf()).into());
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()).into());
    }

    let overrides = build_overrides(root, exclude)?;
    let mut builder = WalkBuilder::new(root);
    builder
        .standard_filters(false)
        .follow_links(true)
        .overrides(overrides)
        .sort_by_file_name(|a, b| a.cmp(b));

    let mut files = Vec::new();
    for entry in builder.build() {
        let entry = entry.map_err(|err| walk_error(root, err))?;
        if !entry.file_type().is_some_and(|kind| kind.is_file()) {
            continue;
        }

        let path = entry.path();
        let relative = relative_path(root, path)?;
        if is_precompressed(&relative) {
            tracing::debug!("skipping precompressed file {}", relative);
            continue;
        }

        let bytes = fs::read(path).map_err(|source| ScanError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        files.push(ScannedFile {
            relative,
            source: path.to_path_buf(),
            bytes,
        });
    }

    if files.is_empty() {
        return Err(ScanError::Empty(root.to_path_buf()).into());
    }
    files.sort_by(|a, b| a.relative.cmp(&b.relative));
    Ok(files)
}

fn build_overrides(root: &Path, exclude: &[String]) -> Result<Override, ConfigError> {
    let mut builder = OverrideBuilder::new(root);
    let patterns = DEFAULT_EXCLUDES
        .iter()
        .copied()
        .chain(exclude.iter().map(String::as_str));
    for pattern in patterns {
        builder
            .add(&format!("!{pattern}"))
            .map_err(|err| ConfigError::InvalidExclude {
                pattern: pattern.to_string(),
                reason: err.to_string(),
            })?;
    }
    builder.build().map_err(|err| ConfigError::InvalidExclude {
        pattern: exclude.join(","),
        reason: err.to_string(),
    })
}

fn walk_error(root: &Path, err: ignore::Error) -> ScanError {
    match err {
        ignore::Error::Loop { ancestor, child } => ScanError::SymlinkCycle { ancestor, child },
        ignore::Error::WithPath { err, .. } | ignore::Error::WithDepth { err, .. } => {
            walk_error(root, *err)
        }
        ignore::Error::Io(source) => ScanError::Io {
            path: root.to_path_buf(),
            source,
        },
        other => ScanError::Walk {
            root: root.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

fn relative_path(root: &Path, path: &Path) -> Result<String, ScanError> {
    let stripped = path.strip_prefix(root).map_err(|_| ScanError::Walk {
        root: root.to_path_buf(),
        reason: format!("{} is outside the source directory", path.display()),
    })?;

    let mut segments = Vec::new();
    for component in stripped.components() {
        if let Component::Normal(segment) = component {
            let segment = segment.to_str().ok_or_else(|| ScanError::Walk {
                root: root.to_path_buf(),
                reason: format!("file name is not valid UTF-8: {}", path.display()),
            })?;
            segments.push(segment);
        }
    }
    Ok(segments.join("/"))
}

fn is_precompressed(relative: &str) -> bool {
    relative
        .rsplit_once('.')
        .is_some_and(|(_, ext)| PRECOMPRESSED_EXTENSIONS.iter().any(|p| ext.eq_ignore_ascii_case(p)))
}
