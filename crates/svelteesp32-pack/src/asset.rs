//! Build-time view of one asset while it moves through the pipeline.

use std::path::PathBuf;

/// One file of the web bundle, enriched stage by stage.
///
/// Created by the classifier from a scanned file; the compressor fills
/// `gzip`, the fingerprinter fills `etag` and `gzip_etag`.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedAsset {
    /// File on disk.
    pub source: PathBuf,
    /// Path relative to the source directory, `/`-separated.
    pub relative: String,
    /// Served URL path: base path + `/` + relative path.
    pub path: String,
    /// Identifier stem used for generated statics and flags.
    pub dataname: String,
    /// Lowercase extension without the dot, empty when there is none.
    pub extension: String,
    pub mime: &'static str,
    pub compressible: bool,
    pub entry: bool,
    /// Bytes as found on disk.
    pub original: Vec<u8>,
    /// Gzip representation, kept only when it pays off.
    pub gzip: Option<Vec<u8>>,
    /// Validator of the identity representation.
    pub etag: Option<String>,
    /// Validator of the gzip representation.
    pub gzip_etag: Option<String>,
}

impl PackedAsset {
    pub fn original_len(&self) -> usize {
        self.original.len()
    }

    /// Bytes served when gzip is (or is not) in effect.
    pub fn stored(&self, gzip_active: bool) -> &[u8] {
        match &self.gzip {
            Some(gzip) if gzip_active => gzip,
            _ => &self.original,
        }
    }

    pub fn is_css(&self) -> bool {
        self.mime == "text/css"
    }

    /// Compressed size as a percentage of the original.
    pub fn gzip_ratio(&self) -> Option<f64> {
        let gzip = self.gzip.as_ref()?;
        if self.original.is_empty() {
            return None;
        }
        Some(gzip.len() as f64 * 100.0 / self.original.len() as f64)
    }
}
