//! Content classification.
//!
//! Maps every scanned file to a MIME type, a compressible flag and a unique
//! identifier stem, flags the entry document and enforces the entry and CSS
//! bounds.

use std::collections::{BTreeMap, HashSet};

use crate::asset::PackedAsset;
use crate::config::PackConfig;
use crate::error::ConfigError;
use crate::scan::ScannedFile;

/// MIME type of files with an unknown extension.
pub const FALLBACK_MIME: &str = "application/octet-stream";

/// Extension, MIME type, compressible.
const MIME_TABLE: &[(&str, &str, bool)] = &[
    // Documents
    ("html", "text/html", true),
    ("htm", "text/html", true),
    ("xhtml", "application/xhtml+xml", true),
    ("css", "text/css", true),
    ("txt", "text/plain", true),
    ("md", "text/markdown", true),
    ("csv", "text/csv", true),
    ("xml", "application/xml", true),
    // Scripts and data
    ("js", "text/javascript", true),
    ("mjs", "text/javascript", true),
    ("cjs", "text/javascript", true),
    ("json", "application/json", true),
    ("map", "application/json", true),
    ("webmanifest", "application/manifest+json", true),
    ("wasm", "application/wasm", true),
    // Images
    ("svg", "image/svg+xml", true),
    ("ico", "image/x-icon", true),
    ("png", "image/png", false),
    ("jpg", "image/jpeg", false),
    ("jpeg", "image/jpeg", false),
    ("gif", "image/gif", false),
    ("webp", "image/webp", false),
    ("avif", "image/avif", false),
    ("bmp", "image/bmp", true),
    // Fonts
    ("woff", "font/woff", false),
    ("woff2", "font/woff2", false),
    ("ttf", "font/ttf", true),
    ("otf", "font/otf", true),
    ("eot", "application/vnd.ms-fontobject", true),
    // Media and archives
    ("mp3", "audio/mpeg", false),
    ("ogg", "audio/ogg", false),
    ("wav", "audio/wav", false),
    ("mp4", "video/mp4", false),
    ("webm", "video/webm", false),
    ("pdf", "application/pdf", false),
    ("zip", "application/zip", false),
];

/// Result of classifying one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification<'a> {
    pub mime: &'static str,
    pub compressible: bool,
    /// Extension as written in the path.
    pub extension: &'a str,
}

/// Extension of the final path segment, without the dot.
pub fn extension(relative: &str) -> &str {
    let name = file_name(relative);
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext,
        _ => "",
    }
}

/// Final segment of a `/`-separated path.
pub fn file_name(relative: &str) -> &str {
    relative.rsplit('/').next().unwrap_or(relative)
}

/// Look up the MIME type of a path. Pure function of the extension.
pub fn classify(relative: &str) -> Classification<'_> {
    let extension = extension(relative);
    let (mime, compressible) = MIME_TABLE
        .iter()
        .find(|(ext, _, _)| ext.eq_ignore_ascii_case(extension))
        .map(|(_, mime, compressible)| (*mime, *compressible))
        .unwrap_or((FALLBACK_MIME, false));
    Classification {
        mime,
        compressible,
        extension,
    }
}

/// Turn a relative path into an identifier stem: `assets/index-4f2a.js`
/// becomes `ASSETS_INDEX_4F2A_JS`.
pub fn dataname(relative: &str) -> String {
    let mut name: String = relative
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

/// Classify every scanned file and check the entry and CSS bounds.
///
/// Files keep their scan order.
pub fn classify_files(
    files: Vec<ScannedFile>,
    config: &PackConfig,
) -> Result<Vec<PackedAsset>, ConfigError> {
    let mut taken = HashSet::new();
    let mut assets: Vec<PackedAsset> = files
        .into_iter()
        .map(|file| {
            let Classification {
                mime,
                compressible,
                extension,
            } = classify(&file.relative);
            let extension = extension.to_ascii_lowercase();
            let dataname = unique_dataname(dataname(&file.relative), &mut taken);
            PackedAsset {
                path: format!("{}/{}", config.base_path, file.relative),
                dataname,
                extension,
                mime,
                compressible,
                entry: false,
                original: file.bytes,
                gzip: None,
                etag: None,
                gzip_etag: None,
                source: file.source,
                relative: file.relative,
            }
        })
        .collect();

    mark_entry(&mut assets, &config.entry, config.no_index_check)?;
    check_css(&assets, config.max_css)?;
    Ok(assets)
}

fn unique_dataname(base: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(base.clone()) {
        return base;
    }
    let mut suffix = 2;
    loop {
        let candidate = format!("{base}_{suffix}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        suffix += 1;
    }
}

/// Flag the single file named `entry`.
fn mark_entry(assets: &mut [PackedAsset], entry: &str, no_index_check: bool) -> Result<(), ConfigError> {
    let matches: Vec<usize> = assets
        .iter()
        .enumerate()
        .filter(|(_, asset)| file_name(&asset.relative) == entry)
        .map(|(index, _)| index)
        .collect();

    match matches.as_slice() {
        [] if no_index_check => Ok(()),
        [] => Err(ConfigError::MissingIndex {
            entry: entry.to_string(),
        }),
        [index] => {
            assets[*index].entry = true;
            Ok(())
        }
        _ => Err(ConfigError::DuplicateIndex {
            entry: entry.to_string(),
            paths: matches.iter().map(|&i| assets[i].relative.clone()).collect(),
        }),
    }
}

fn check_css(assets: &[PackedAsset], max: usize) -> Result<(), ConfigError> {
    let css: Vec<String> = assets
        .iter()
        .filter(|asset| asset.is_css())
        .map(|asset| asset.relative.clone())
        .collect();
    if css.len() > max {
        return Err(ConfigError::TooManyCss {
            count: css.len(),
            max,
            paths: css,
        });
    }
    Ok(())
}

/// Number of assets per lowercase extension, sorted by extension.
pub fn extension_counts(assets: &[PackedAsset]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for asset in assets {
        *counts.entry(asset.extension.clone()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use svelteesp32_core::Backend;

    fn scanned(relative: &str) -> ScannedFile {
        ScannedFile {
            relative: relative.to_string(),
            source: PathBuf::from("/web").join(relative),
            bytes: relative.as_bytes().to_vec(),
        }
    }

    fn config() -> PackConfig {
        PackConfig::new("/web", Backend::Async)
    }

    #[test]
    fn test_classify_known_types() {
        let html = classify("index.html");
        assert_eq!(html.mime, "text/html");
        assert!(html.compressible);

        let css = classify("assets/INDEX.CSS");
        assert_eq!(css.mime, "text/css");
        assert_eq!(css.extension, "CSS");

        assert_eq!(classify("logo.png").mime, "image/png");
        assert!(!classify("logo.png").compressible);
        assert_eq!(classify("fonts/a.woff2").mime, "font/woff2");
    }

    #[test]
    fn test_classify_unknown_is_binary() {
        let unknown = classify("data.blob");
        assert_eq!(unknown.mime, FALLBACK_MIME);
        assert!(!unknown.compressible);

        assert_eq!(classify("LICENSE").extension, "");
        assert_eq!(classify(".hidden").extension, "");
        assert_eq!(classify("dir.v2/README").extension, "");
    }

    #[test]
    fn test_dataname() {
        assert_eq!(dataname("index.html"), "INDEX_HTML");
        assert_eq!(dataname("assets/index-Bq3c.js"), "ASSETS_INDEX_BQ3C_JS");
        assert_eq!(dataname("404.html"), "_404_HTML");
        assert_eq!(dataname("ünï.txt"), "_N__TXT");
    }

    #[test]
    fn test_datanames_are_unique() {
        let files = vec![scanned("a-b.js"), scanned("a.b.js"), scanned("a_b.js"), scanned("index.html")];
        let assets = classify_files(files, &config()).unwrap();
        let names: Vec<_> = assets.iter().map(|a| a.dataname.as_str()).collect();
        assert_eq!(names, vec!["A_B_JS", "A_B_JS_2", "A_B_JS_3", "INDEX_HTML"]);
    }

    #[test]
    fn test_served_paths_use_base_path() {
        let mut config = config();
        config.base_path = "/ui".to_string();
        let assets = classify_files(vec![scanned("index.html"), scanned("assets/app.js")], &config).unwrap();
        assert_eq!(assets[0].path, "/ui/index.html");
        assert_eq!(assets[1].path, "/ui/assets/app.js");
        assert_eq!(assets[1].extension, "js");
    }

    #[test]
    fn test_entry_detection() {
        let assets = classify_files(vec![scanned("app.js"), scanned("index.html")], &config()).unwrap();
        assert!(!assets[0].entry);
        assert!(assets[1].entry);
    }

    #[test]
    fn test_missing_entry() {
        let err = classify_files(vec![scanned("app.js")], &config()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingIndex { .. }));

        let mut config = config();
        config.no_index_check = true;
        let assets = classify_files(vec![scanned("app.js")], &config).unwrap();
        assert!(assets.iter().all(|a| !a.entry));
    }

    #[test]
    fn test_duplicate_entry() {
        let mut config = config();
        config.no_index_check = true;
        let err = classify_files(vec![scanned("index.html"), scanned("admin/index.html")], &config).unwrap_err();
        match err {
            ConfigError::DuplicateIndex { paths, .. } => {
                assert_eq!(paths, vec!["index.html", "admin/index.html"]);
            }
            other => panic!("expected DuplicateIndex, got {other:?}"),
        }
    }

    #[test]
    fn test_custom_entry_name() {
        let mut config = config();
        config.entry = "app.html".to_string();
        let assets = classify_files(vec![scanned("app.html"), scanned("index.html")], &config).unwrap();
        assert!(assets[0].entry);
        assert!(!assets[1].entry);
    }

    #[test]
    fn test_css_limit() {
        let files = || vec![scanned("index.html"), scanned("a.css"), scanned("b.css")];
        let err = classify_files(files(), &config()).unwrap_err();
        assert!(matches!(err, ConfigError::TooManyCss { count: 2, max: 1, .. }));

        let mut config = config();
        config.max_css = 2;
        assert!(classify_files(files(), &config).is_ok());
    }

    #[test]
    fn test_extension_counts() {
        let assets = classify_files(
            vec![scanned("index.html"), scanned("a.js"), scanned("b.JS"), scanned("LICENSE")],
            &config(),
        )
        .unwrap();
        let counts = extension_counts(&assets);
        let expected: BTreeMap<String, usize> =
            [("".to_string(), 1), ("html".to_string(), 1), ("js".to_string(), 2)].into();
        assert_eq!(counts, expected);
    }
}
