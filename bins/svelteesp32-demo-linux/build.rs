//! Packs `demo/web` once per host backend, plus a module whose gzip and
//! ETag switches follow cargo features.

use std::path::PathBuf;

use svelteesp32_core::Backend;
use svelteesp32_pack::{PackConfig, Toggle};

fn main() -> anyhow::Result<()> {
    let manifest_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR")?);
    let out_dir = PathBuf::from(std::env::var("OUT_DIR")?);
    let web = manifest_dir.join("../../demo/web");

    let mut config = PackConfig::new(web.clone(), Backend::Async);
    config.output_file = out_dir.join("svelteesp32_async.rs");
    config.etag = Toggle::On;
    config.version = Some(std::env::var("CARGO_PKG_VERSION")?);
    svelteesp32_pack::build_script(&config)?;

    let mut config = PackConfig::new(web, Backend::Pool);
    config.output_file = out_dir.join("svelteesp32_pool.rs");
    config.define = "SVELTEESP32_POOL".to_string();
    config.method_name = "init_pool_static_files".to_string();
    config.etag = Toggle::Compiler;
    config.cache_time = 3600;
    svelteesp32_pack::build(&config)?;

    // Both options left to cargo features, so both branches get type-checked.
    let mut config = PackConfig::new(manifest_dir.join("../../demo/web"), Backend::Async);
    config.output_file = out_dir.join("svelteesp32_compiler.rs");
    config.define = "SVELTEESP32_COMPILER".to_string();
    config.method_name = "init_compiler_static_files".to_string();
    config.gzip = Toggle::Compiler;
    config.etag = Toggle::Compiler;
    svelteesp32_pack::build(&config)?;

    Ok(())
}
