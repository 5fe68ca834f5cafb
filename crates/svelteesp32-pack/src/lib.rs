//! # svelteesp32-pack
//!
//! Build-time packer for single-page applications served from a
//! microcontroller.
//!
//! The pipeline runs once per build:
//!
//! ```text
//! scan -> classify -> compress -> fingerprint -> emit
//! ```
//!
//! and produces a Rust module holding every file of the web bundle as a
//! static byte slice, a frozen [`AssetTable`](svelteesp32_core::AssetTable),
//! summary constants for compile-time checks and one registration function
//! for the selected backend.
//!
//! ## Usage from a build script
//!
//! ```rust,ignore
//! use svelteesp32_core::Backend;
//! use svelteesp32_pack::PackConfig;
//!
//! let out_dir = std::env::var("OUT_DIR")?;
//! let mut config = PackConfig::new("web/dist", Backend::Async);
//! config.output_file = format!("{out_dir}/svelteesp32.rs").into();
//! svelteesp32_pack::build_script(&config)?;
//! ```

pub mod asset;
pub mod classify;
pub mod compress;
pub mod config;
pub mod emit;
pub mod error;
pub mod fingerprint;
pub mod pipeline;
pub mod scan;

pub use asset::PackedAsset;
pub use config::{Options, PackConfig, Toggle};
pub use error::{ConfigError, EmitError, PackError, ScanError};
pub use pipeline::{build, build_script, pack, Bundle, Summary, WriteOutcome};
