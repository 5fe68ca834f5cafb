//! Deterministic gzip precompression.

use std::io::{self, Write};

use flate2::write::GzEncoder;
use flate2::Compression;

use crate::asset::PackedAsset;
use crate::config::Toggle;
use crate::error::PackError;

/// Files up to this size are stored as-is.
pub const MIN_COMPRESS_LEN: usize = 1024;

/// Gzip with the best level. The header carries no mtime or file name, so
/// equal input always yields equal output.
pub fn gzip(bytes: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(bytes.len() / 2), Compression::best());
    encoder.write_all(bytes)?;
    encoder.finish()
}

/// The compressed form must be below 85% of the original.
pub fn worth_keeping(original_len: usize, compressed_len: usize) -> bool {
    compressed_len.saturating_mul(20) < original_len.saturating_mul(17)
}

/// Fill `gzip` for every eligible asset.
pub fn compress_assets(assets: &mut [PackedAsset], mode: Toggle) -> Result<(), PackError> {
    if !mode.is_possible() {
        tracing::debug!("gzip disabled, storing {} files uncompressed", assets.len());
        return Ok(());
    }
    for asset in assets.iter_mut() {
        compress_asset(asset)?;
    }
    Ok(())
}

fn compress_asset(asset: &mut PackedAsset) -> Result<(), PackError> {
    let len = asset.original_len();
    if !asset.compressible {
        tracing::info!("[{}] x gzip unused (not compressible, {} bytes)", asset.relative, len);
        return Ok(());
    }

    let compressed = gzip(&asset.original).map_err(|source| PackError::Compress {
        path: asset.relative.clone(),
        source,
    })?;
    let ratio = if len == 0 { 0.0 } else { compressed.len() as f64 * 100.0 / len as f64 };

    if len > MIN_COMPRESS_LEN && worth_keeping(len, compressed.len()) {
        tracing::info!(
            "[{}] \u{2713} gzip used ({} -> {} = {:.1}%)",
            asset.relative,
            len,
            compressed.len(),
            ratio
        );
        asset.gzip = Some(compressed);
    } else {
        let reason = if len <= MIN_COMPRESS_LEN { " (too small)" } else { "" };
        tracing::info!(
            "[{}] x gzip unused{} ({} -> {} = {:.1}%)",
            asset.relative,
            reason,
            len,
            compressed.len(),
            ratio
        );
    }
    Ok(())
}
