//! Pipeline driver: scan, classify, compress, fingerprint, emit, write.

use std::fs;
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};

use crate::asset::PackedAsset;
use crate::classify::classify_files;
use crate::compress::compress_assets;
use crate::config::PackConfig;
use crate::emit::{emit, Totals};
use crate::error::{ConfigError, EmitError, PackError};
use crate::fingerprint::fingerprint_assets;
use crate::scan::scan;

/// Result of a successful pipeline run, before anything is written.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub assets: Vec<PackedAsset>,
    /// Generated module source.
    pub source: String,
    pub totals: Totals,
}

/// What happened to the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The file already held identical content and was not touched.
    Unchanged,
    DryRun,
}

/// End-of-run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    pub original_size: usize,
    pub gzip_size: usize,
    pub handler_count: usize,
    pub output_file: PathBuf,
    pub output_size: usize,
    pub outcome: WriteOutcome,
}

impl Summary {
    fn new(bundle: &Bundle, config: &PackConfig, outcome: WriteOutcome) -> Self {
        Self {
            files: bundle.totals.count,
            original_size: bundle.totals.size,
            gzip_size: bundle.totals.size_gzip,
            handler_count: bundle.totals.handler_count,
            output_file: config.output_file.clone(),
            output_size: bundle.source.len(),
            outcome,
        }
    }
}

/// Run every stage and return the generated source without writing it.
pub fn pack(config: &PackConfig) -> Result<Bundle, PackError> {
    config.validate()?;

    let files = scan(&config.source_path, &config.exclude)?;
    tracing::debug!("scanned {} files in {}", files.len(), config.source_path.display());

    let mut assets = classify_files(files, config)?;
    compress_assets(&mut assets, config.gzip)?;
    fingerprint_assets(&mut assets);

    let totals = Totals::of(&assets, config);
    check_size_limits(&totals, config)?;

    let created = config
        .created
        .then(|| Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true));
    let source = emit(&assets, config, created.as_deref())?;

    Ok(Bundle {
        assets,
        source,
        totals,
    })
}

fn check_size_limits(totals: &Totals, config: &PackConfig) -> Result<(), ConfigError> {
    if let Some(limit) = config.max_size {
        if totals.size > limit {
            return Err(ConfigError::SizeLimitExceeded {
                field: "maxsize",
                actual: totals.size,
                limit,
            });
        }
    }
    if let Some(limit) = config.max_gzip_size {
        if totals.size_gzip > limit {
            return Err(ConfigError::SizeLimitExceeded {
                field: "maxgzipsize",
                actual: totals.size_gzip,
                limit,
            });
        }
    }
    Ok(())
}

/// Pack and write the output file, unless this is a dry run.
pub fn build(config: &PackConfig) -> Result<Summary, PackError> {
    let bundle = pack(config)?;
    tracing::info!(
        "{} files, {}kB original size, {}kB gzip size",
        bundle.totals.count,
        kilobytes(bundle.totals.size),
        kilobytes(bundle.totals.size_gzip)
    );

    let outcome = if config.dry_run {
        tracing::info!(
            "dry run: {} ({}kB) not written",
            config.output_file.display(),
            kilobytes(bundle.source.len())
        );
        WriteOutcome::DryRun
    } else {
        write_output(config, &bundle.source)?
    };

    Ok(Summary::new(&bundle, config, outcome))
}

/// [`build`] for use from a cargo build script: also asks cargo to re-run
/// when the source directory changes.
pub fn build_script(config: &PackConfig) -> Result<Summary, PackError> {
    println!("cargo:rerun-if-changed={}", config.source_path.display());
    build(config)
}

fn write_output(config: &PackConfig, source: &str) -> Result<WriteOutcome, EmitError> {
    let path = &config.output_file;
    let write_error = |source| EmitError::Write {
        path: path.clone(),
        source,
    };

    if fs::read(path).is_ok_and(|existing| existing == source.as_bytes()) {
        tracing::info!("{} unchanged ({}kB)", path.display(), kilobytes(source.len()));
        return Ok(WriteOutcome::Unchanged);
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(write_error)?;
    }
    fs::write(path, source).map_err(write_error)?;
    tracing::info!("{} {}kB size", path.display(), kilobytes(source.len()));
    Ok(WriteOutcome::Written)
}

fn kilobytes(bytes: usize) -> usize {
    (bytes + 512) / 1024
}

#[cfg(test)]
mod tests {
    use super::*;
    use svelteesp32_core::Backend;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<!doctype html><title>x</title>").unwrap();
        fs::write(dir.path().join("app.js"), "console.log(1)".repeat(200)).unwrap();
        dir
    }

    #[test]
    fn test_kilobytes_rounds() {
        assert_eq!(kilobytes(0), 0);
        assert_eq!(kilobytes(511), 0);
        assert_eq!(kilobytes(512), 1);
        assert_eq!(kilobytes(2048), 2);
    }

    #[test]
    fn test_size_limits() {
        let site = site();
        let mut config = PackConfig::new(site.path(), Backend::Async);
        config.max_size = Some(100);
        let err = pack(&config).unwrap_err();
        assert!(matches!(
            err,
            PackError::Config(ConfigError::SizeLimitExceeded { field: "maxsize", .. })
        ));

        config.max_size = None;
        config.max_gzip_size = Some(10);
        let err = pack(&config).unwrap_err();
        assert!(matches!(
            err,
            PackError::Config(ConfigError::SizeLimitExceeded { field: "maxgzipsize", .. })
        ));
    }

    #[test]
    fn test_write_then_unchanged() {
        let site = site();
        let out = tempfile::tempdir().unwrap();
        let mut config = PackConfig::new(site.path(), Backend::Pool);
        config.output_file = out.path().join("nested/dir/svelteesp32.rs");

        let first = build(&config).unwrap();
        assert_eq!(first.outcome, WriteOutcome::Written);
        assert_eq!(first.files, 2);
        assert!(config.output_file.is_file());

        let second = build(&config).unwrap();
        assert_eq!(second.outcome, WriteOutcome::Unchanged);
        assert_eq!(second.output_size, first.output_size);
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let site = site();
        let out = tempfile::tempdir().unwrap();
        let mut config = PackConfig::new(site.path(), Backend::Async);
        config.output_file = out.path().join("svelteesp32.rs");
        config.dry_run = true;

        let summary = build(&config).unwrap();
        assert_eq!(summary.outcome, WriteOutcome::DryRun);
        assert!(!config.output_file.exists());
    }

    #[test]
    fn test_invalid_config_fails_before_scan() {
        let mut config = PackConfig::new("/does/not/exist", Backend::Async);
        config.method_name = "not valid".to_string();
        assert!(matches!(
            pack(&config),
            Err(PackError::Config(ConfigError::InvalidIdentifier { .. }))
        ));
    }
}
