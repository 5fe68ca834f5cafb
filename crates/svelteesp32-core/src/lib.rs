//! # svelteesp32-core
//!
//! Runtime side of the embedded web application.
//!
//! This crate provides:
//! - The frozen asset table emitted by `svelteesp32-pack` (Asset, AssetTable)
//! - Per-request resolution and response logic (exact match, SPA fallback,
//!   conditional GET)
//! - The registration capability every HTTP server adapter implements
//!
//! This crate is intentionally runtime-agnostic and contains no async code
//! and no allocation on the request path, making it usable on both Linux
//! (tokio, thread pools) and ESP32 (esp-idf) targets.

pub mod asset;
pub mod backend;
pub mod register;
pub mod request;

pub use asset::{Asset, AssetTable, Encoding, Route, ServeOptions};
pub use backend::{Backend, UnknownBackend};
pub use register::{register, RegistrationError, RouteRegistrar};
pub use request::{encode_path, handle, path_matches, resolve, respond, Method, RequestHead, Resolution, Response, Status};
