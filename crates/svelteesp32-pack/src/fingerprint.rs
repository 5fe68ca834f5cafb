//! Content fingerprints used as ETag validators.

use crate::asset::PackedAsset;

/// Bytes of the blake3 digest kept in the token.
pub const FINGERPRINT_BYTES: usize = 16;

/// Quoted validator token for `bytes`: blake3, truncated, lowercase hex.
pub fn fingerprint(bytes: &[u8]) -> String {
    let digest = blake3::hash(bytes);
    format!("\"{}\"", hex::encode(&digest.as_bytes()[..FINGERPRINT_BYTES]))
}

/// Fingerprint both stored representations of every asset.
pub fn fingerprint_assets(assets: &mut [PackedAsset]) {
    for asset in assets.iter_mut() {
        asset.etag = Some(fingerprint(&asset.original));
        asset.gzip_etag = asset.gzip.as_deref().map(fingerprint);
    }
}
