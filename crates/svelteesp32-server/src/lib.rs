//! # svelteesp32-server
//!
//! Thread-pool backend: a small blocking HTTP server built on `tiny_http`
//! with a fixed number of worker threads and a bounded handler table.
//!
//! Routes are registered up front, either from an embedded
//! [`AssetTable`](svelteesp32_core::AssetTable) through [`register`] or by
//! the application with
//! [`PoolServer::on`]. Both count against
//! [`ServerConfig::max_handlers`]. [`PoolServer::run`] then freezes the
//! table and starts the workers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! include!(concat!(env!("OUT_DIR"), "/svelteesp32.rs"));
//!
//! let mut server = PoolServer::new(ServerConfig {
//!     max_handlers: SVELTEESP32_HANDLER_COUNT + 2,
//!     ..Default::default()
//! });
//! init_svelte_static_files(&mut server)?; // calls svelteesp32_server::register
//! server.on(Method::Get, "/api/status", |_req| PoolResponse::json(200, "{}"))?;
//! server.run()?.wait();
//! ```

pub mod config;
pub mod http;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use http::{PoolRequest, PoolResponse};
pub use router::{register, Handler, PoolServer};
pub use server::{RunningServer, ServerError};
pub use svelteesp32_core::Method;
