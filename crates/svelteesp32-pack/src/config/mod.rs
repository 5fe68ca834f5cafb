//! Packer configuration.
//!
//! Options arrive from three layers: built-in defaults, an rc file
//! (`.svelteesp32rc.json`) and command-line flags. [`Options`] holds the raw,
//! all-optional form shared by the rc file and the CLI; [`Options::resolve`]
//! validates it into a [`PackConfig`].
//!
//! Build scripts usually skip the raw layer and fill a [`PackConfig`]
//! directly, starting from [`PackConfig::new`].

pub mod rc;

use std::path::PathBuf;

use regex::Regex;
use serde::{Deserialize, Deserializer};
use svelteesp32_core::Backend;

use crate::error::{ConfigError, EmitError, PackError};

pub const DEFAULT_OUTPUT_FILE: &str = "svelteesp32.rs";
pub const DEFAULT_METHOD_NAME: &str = "init_svelte_static_files";
pub const DEFAULT_DEFINE: &str = "SVELTEESP32";
pub const DEFAULT_ENTRY: &str = "index.html";
pub const DEFAULT_MAX_CSS: usize = 1;

/// Three-way switch for ETag and gzip support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// Always on.
    On,
    /// Always off.
    Off,
    /// Decided when the consuming crate is compiled, through a cargo feature.
    Compiler,
}

impl Toggle {
    pub fn parse(field: &'static str, value: &str) -> Result<Self, ConfigError> {
        match value {
            "true" => Ok(Toggle::On),
            "false" => Ok(Toggle::Off),
            "compiler" => Ok(Toggle::Compiler),
            _ => Err(ConfigError::InvalidToggle {
                field,
                value: value.to_string(),
            }),
        }
    }

    /// Whether the generated code may need this feature's data.
    pub fn is_possible(self) -> bool {
        !matches!(self, Toggle::Off)
    }
}

/// Validated packer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PackConfig {
    /// Backend the registration function is generated for.
    pub engine: Backend,
    /// Directory holding the compiled web application.
    pub source_path: PathBuf,
    /// Generated Rust module.
    pub output_file: PathBuf,
    pub etag: Toggle,
    pub gzip: Toggle,
    /// `Cache-Control: max-age` in seconds; 0 disables it.
    pub cache_time: u64,
    /// Add a creation timestamp comment (makes output non-reproducible).
    pub created: bool,
    pub version: Option<String>,
    /// Name of the generated registration function.
    pub method_name: String,
    /// Prefix of the generated constants.
    pub define: String,
    /// Extra gitignore-style exclude globs.
    pub exclude: Vec<String>,
    /// URL prefix for every route, empty or `/segment[/segment...]`.
    pub base_path: String,
    pub max_size: Option<usize>,
    pub max_gzip_size: Option<usize>,
    /// Accept a bundle without an entry document.
    pub no_index_check: bool,
    /// File name of the entry document.
    pub entry: String,
    /// Maximum number of CSS assets.
    pub max_css: usize,
    /// Serve the entry document for unmatched HTML navigations.
    pub spa_fallback: bool,
    /// Run everything but do not write the output.
    pub dry_run: bool,
    /// Invocation recorded in the output header.
    pub command_line: Option<String>,
}

impl PackConfig {
    /// Configuration with every option at its default.
    pub fn new(source_path: impl Into<PathBuf>, engine: Backend) -> Self {
        Self {
            engine,
            source_path: source_path.into(),
            output_file: PathBuf::from(DEFAULT_OUTPUT_FILE),
            etag: Toggle::Off,
            gzip: Toggle::On,
            cache_time: 0,
            created: false,
            version: None,
            method_name: DEFAULT_METHOD_NAME.to_string(),
            define: DEFAULT_DEFINE.to_string(),
            exclude: Vec::new(),
            base_path: String::new(),
            max_size: None,
            max_gzip_size: None,
            no_index_check: false,
            entry: DEFAULT_ENTRY.to_string(),
            max_css: DEFAULT_MAX_CSS,
            spa_fallback: true,
            dry_run: false,
            command_line: None,
        }
    }

    /// Check options that cannot be expressed by the types alone.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_identifier("espmethod", &self.method_name)?;
        validate_identifier("define", &self.define)?;
        validate_base_path(&self.base_path)?;
        if self.entry.is_empty() || self.entry.contains('/') {
            return Err(ConfigError::InvalidOption {
                field: "entry",
                reason: format!("'{}' must be a plain file name", self.entry),
            });
        }
        Ok(())
    }

    /// Cargo feature that switches `compiler`-mode options in the consumer.
    pub fn feature_name(&self, option: &str) -> String {
        format!("{}-{}", self.define.to_ascii_lowercase(), option)
    }
}

/// Raw options as found in an rc file or on the command line.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Options {
    pub engine: Option<String>,
    pub sourcepath: Option<String>,
    pub outputfile: Option<String>,
    pub espmethod: Option<String>,
    pub define: Option<String>,
    #[serde(deserialize_with = "toggle_value")]
    pub gzip: Option<String>,
    #[serde(deserialize_with = "toggle_value")]
    pub etag: Option<String>,
    pub cachetime: Option<u64>,
    pub created: Option<bool>,
    pub version: Option<String>,
    pub exclude: Option<Vec<String>>,
    pub basepath: Option<String>,
    pub maxsize: Option<SizeLimit>,
    pub maxgzipsize: Option<SizeLimit>,
    pub noindexcheck: Option<bool>,
    pub dryrun: Option<bool>,
    pub entry: Option<String>,
    pub maxcss: Option<usize>,
    pub spafallback: Option<bool>,
}

/// Tri-state options may be written as JSON booleans in an rc file.
fn toggle_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Flag(bool),
        Text(String),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Flag(flag) => flag.to_string(),
        Raw::Text(text) => text,
    }))
}

/// A size limit written either as a byte count or as text like `400k`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SizeLimit {
    Bytes(u64),
    Text(String),
}

impl SizeLimit {
    fn to_bytes(&self, field: &'static str) -> Result<usize, ConfigError> {
        match self {
            SizeLimit::Bytes(0) => Err(ConfigError::InvalidSize {
                field,
                value: "0".to_string(),
            }),
            SizeLimit::Bytes(bytes) => usize::try_from(*bytes).map_err(|_| ConfigError::InvalidSize {
                field,
                value: bytes.to_string(),
            }),
            SizeLimit::Text(text) => parse_size(field, text),
        }
    }
}

impl Options {
    /// Layer `overrides` on top of `self`; set values in `overrides` win.
    pub fn merge(self, overrides: Options) -> Options {
        Options {
            engine: overrides.engine.or(self.engine),
            sourcepath: overrides.sourcepath.or(self.sourcepath),
            outputfile: overrides.outputfile.or(self.outputfile),
            espmethod: overrides.espmethod.or(self.espmethod),
            define: overrides.define.or(self.define),
            gzip: overrides.gzip.or(self.gzip),
            etag: overrides.etag.or(self.etag),
            cachetime: overrides.cachetime.or(self.cachetime),
            created: overrides.created.or(self.created),
            version: overrides.version.or(self.version),
            exclude: overrides.exclude.or(self.exclude),
            basepath: overrides.basepath.or(self.basepath),
            maxsize: overrides.maxsize.or(self.maxsize),
            maxgzipsize: overrides.maxgzipsize.or(self.maxgzipsize),
            noindexcheck: overrides.noindexcheck.or(self.noindexcheck),
            dryrun: overrides.dryrun.or(self.dryrun),
            entry: overrides.entry.or(self.entry),
            maxcss: overrides.maxcss.or(self.maxcss),
            spafallback: overrides.spafallback.or(self.spafallback),
        }
    }

    /// Apply defaults and validate.
    pub fn resolve(self) -> Result<PackConfig, PackError> {
        let engine: Backend = self
            .engine
            .as_deref()
            .unwrap_or("async")
            .parse()
            .map_err(EmitError::from)?;
        let source_path = self
            .sourcepath
            .filter(|path| !path.is_empty())
            .ok_or(ConfigError::MissingSourcePath)?;

        let mut config = PackConfig::new(source_path, engine);
        if let Some(output) = self.outputfile {
            config.output_file = PathBuf::from(output);
        }
        if let Some(etag) = self.etag {
            config.etag = Toggle::parse("etag", &etag)?;
        }
        if let Some(gzip) = self.gzip {
            config.gzip = Toggle::parse("gzip", &gzip)?;
        }
        config.cache_time = self.cachetime.unwrap_or(0);
        config.created = self.created.unwrap_or(false);
        config.version = self.version.filter(|version| !version.is_empty());
        if let Some(method) = self.espmethod {
            config.method_name = method;
        }
        if let Some(define) = self.define {
            config.define = define;
        }
        config.exclude = split_patterns(self.exclude.unwrap_or_default());
        config.base_path = self.basepath.unwrap_or_default();
        config.max_size = self
            .maxsize
            .map(|limit| limit.to_bytes("maxsize"))
            .transpose()?;
        config.max_gzip_size = self
            .maxgzipsize
            .map(|limit| limit.to_bytes("maxgzipsize"))
            .transpose()?;
        config.no_index_check = self.noindexcheck.unwrap_or(false);
        config.dry_run = self.dryrun.unwrap_or(false);
        if let Some(entry) = self.entry {
            config.entry = entry;
        }
        config.max_css = self.maxcss.unwrap_or(DEFAULT_MAX_CSS);
        config.spa_fallback = self.spafallback.unwrap_or(true);

        config.validate()?;
        Ok(config)
    }
}

/// Split comma-separated entries so `--exclude "*.map,*.md"` works.
fn split_patterns(patterns: Vec<String>) -> Vec<String> {
    patterns
        .iter()
        .flat_map(|pattern| pattern.split(','))
        .map(str::trim)
        .filter(|pattern| !pattern.is_empty())
        .map(String::from)
        .collect()
}

/// Strict and reserved keywords of every edition the generated module may
/// be compiled under.
const RESERVED: &[&str] = &[
    // strict
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "Self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while",
    // reserved
    "abstract", "become", "box", "do", "final", "gen", "macro", "override", "priv", "try",
    "typeof", "unsized", "virtual", "yield",
];

fn compile(field: &'static str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|e| ConfigError::InvalidOption {
        field,
        reason: e.to_string(),
    })
}

/// Accept a non-keyword Rust identifier.
pub fn validate_identifier(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let ident = compile(field, r"^[A-Za-z_][A-Za-z0-9_]*$")?;
    if !ident.is_match(value) || value == "_" || RESERVED.contains(&value) {
        return Err(ConfigError::InvalidIdentifier {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Accept `""` or `/segment[/segment...]` without a trailing slash.
pub fn validate_base_path(value: &str) -> Result<(), ConfigError> {
    let reason = if value.is_empty() {
        return Ok(());
    } else if !value.starts_with('/') {
        "must start with /"
    } else if value.ends_with('/') {
        "must not end with /"
    } else if value.contains("//") {
        "must not contain //"
    } else {
        return Ok(());
    };
    Err(ConfigError::InvalidBasePath {
        value: value.to_string(),
        reason,
    })
}

/// Parse sizes like `409600`, `400k`, `1.5m` into bytes.
pub fn parse_size(field: &'static str, value: &str) -> Result<usize, ConfigError> {
    let size = compile(field, r"^(\d+(?:\.\d+)?)\s*([KMkm])?$")?;

    let invalid = || ConfigError::InvalidSize {
        field,
        value: value.to_string(),
    };
    let captures = size.captures(value.trim()).ok_or_else(invalid)?;
    let number: f64 = captures[1].parse().map_err(|_| invalid())?;
    let multiplier = match captures.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(suffix) if suffix == "k" => 1024.0,
        Some(suffix) if suffix == "m" => 1024.0 * 1024.0,
        _ => 1.0,
    };

    let bytes = (number * multiplier).round();
    if !bytes.is_finite() || bytes <= 0.0 || bytes > usize::MAX as f64 {
        return Err(invalid());
    }
    Ok(bytes as usize)
}
