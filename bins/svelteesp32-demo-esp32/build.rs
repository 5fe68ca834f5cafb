//! Packs `demo/web` for the ESP-IDF HTTP daemon and sets up the IDF
//! environment.

use std::path::PathBuf;

use svelteesp32_core::Backend;
use svelteesp32_pack::{PackConfig, Toggle};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);

    let mut config = PackConfig::new(manifest_dir.join("../../demo/web"), Backend::Espidf);
    config.output_file = out_dir.join("svelteesp32.rs");
    config.etag = Toggle::On;
    config.version = Some(std::env::var("CARGO_PKG_VERSION")?);
    svelteesp32_pack::build_script(&config)?;

    // Required for esp-idf-svc to find the IDF toolchain
    embuild::espidf::sysenv::output();
    Ok(())
}
