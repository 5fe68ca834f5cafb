//! ESP-IDF backend for embedded web applications.
//!
//! Wires an [`AssetTable`] into the native HTTP daemon (`esp_http_server`)
//! through `esp-idf-svc`:
//! - one GET URI handler per asset, plus the root alias of the entry document
//! - a `/*` handler per known method serving the SPA fallback, when the
//!   daemon was configured with `uri_match_wildcard`
//!
//! The daemon binds a handler to one method and answers `405` itself on a
//! method mismatch, so the wildcard takes [`Method::KNOWN`] slots. Every
//! handler only borrows from the static table.
//!
//! # Example
//!
//! ```ignore
//! include!(concat!(env!("OUT_DIR"), "/svelteesp32.rs"));
//!
//! let config = Configuration {
//!     max_uri_handlers: SVELTEESP32_HANDLER_COUNT + 2,
//!     uri_match_wildcard: true,
//!     ..Default::default()
//! };
//! let mut server = EspHttpServer::new(&config)?;
//! // two application handlers
//! server.fn_handler("/api/status", Method::Get, status)?;
//! server.fn_handler("/api/toggle", Method::Post, toggle)?;
//! init_svelte_static_files(&mut server, &config, 2)?;
//! ```

pub mod wifi;

pub use esp_idf_svc::http::server::{Configuration, EspHttpServer};

use esp_idf_svc::http::server::{EspHttpConnection, Request};
use esp_idf_svc::http::Method as EspMethod;
use esp_idf_svc::io::Write;
use log::{debug, warn};

use svelteesp32_core::{AssetTable, Method, RegistrationError, RequestHead, Response, Route, RouteRegistrar};

/// URI pattern of the fallback handler.
const WILDCARD: &str = "/*";

/// Register every route of `table` on `server`.
///
/// `config` must be the configuration the server was created with; its
/// `max_uri_handlers` bounds how many handlers fit. `handlers_in_use` is the
/// number of URI handlers the application already registered on `server`.
pub fn register<'a>(
    server: &mut EspHttpServer<'a>,
    config: &Configuration,
    handlers_in_use: usize,
    table: &'static AssetTable,
) -> Result<usize, RegistrationError> {
    let mut registrar = EspRegistrar {
        server,
        table,
        capacity: config.max_uri_handlers.saturating_sub(handlers_in_use),
        wildcard: config.uri_match_wildcard,
        added: 0,
    };
    let added = svelteesp32_core::register(table, &mut registrar)?;
    debug!("registered {} URI handlers for {} embedded files", added, table.len());
    Ok(added)
}

struct EspRegistrar<'s, 'a> {
    server: &'s mut EspHttpServer<'a>,
    table: &'static AssetTable,
    capacity: usize,
    wildcard: bool,
    added: usize,
}

impl RouteRegistrar for EspRegistrar<'_, '_> {
    fn handler_capacity(&self) -> Option<usize> {
        Some(self.capacity.saturating_sub(self.added))
    }

    fn add_route(&mut self, route: Route) -> Result<(), RegistrationError> {
        let options = self.table.options();
        let asset = route.asset;
        // httpd matches the raw request target
        let wire_path = svelteesp32_core::encode_path(route.path);
        self.server
            .fn_handler(&wire_path, EspMethod::Get, move |req| {
                let response = {
                    let head = EspRequest::new(&req);
                    svelteesp32_core::respond(options, asset, &head)
                };
                send(req, response)
            })
            .map_err(|e| server_error(route.path, e))?;
        self.added += 1;
        Ok(())
    }

    fn add_fallback(&mut self, table: &'static AssetTable) -> Result<(), RegistrationError> {
        if !self.wildcard {
            warn!("uri_match_wildcard is off, SPA fallback not registered");
            return Ok(());
        }
        for method in Method::KNOWN {
            self.server
                .fn_handler(WILDCARD, esp_method(method), move |req| {
                    let response = {
                        let head = EspRequest::new(&req);
                        svelteesp32_core::handle(table, &head)
                    };
                    send(req, response)
                })
                .map_err(|e| server_error(WILDCARD, e))?;
            self.added += 1;
        }
        Ok(())
    }

    fn fallback_handlers(&self) -> usize {
        Method::KNOWN.len()
    }
}

fn server_error(path: &str, error: impl std::fmt::Display) -> RegistrationError {
    RegistrationError::Server {
        path: path.to_string(),
        reason: error.to_string(),
    }
}

fn send(req: Request<&mut EspHttpConnection<'_>>, response: Response) -> anyhow::Result<()> {
    let headers: Vec<(&str, &str)> = response.headers().collect();
    let mut out = req.into_response(response.status.code(), Some(response.status.reason()), &headers)?;
    if !response.body.is_empty() {
        out.write_all(response.body)?;
    }
    Ok(())
}

/// The parts of a daemon request the core reads.
struct EspRequest<'r> {
    method: Method,
    uri: &'r str,
    accept: Option<&'r str>,
    if_none_match: Option<&'r str>,
}

impl<'r> EspRequest<'r> {
    fn new(req: &'r Request<&mut EspHttpConnection<'_>>) -> Self {
        Self {
            method: method(req.method()),
            uri: req.uri(),
            accept: req.header("Accept"),
            if_none_match: req.header("If-None-Match"),
        }
    }
}

impl RequestHead for EspRequest<'_> {
    fn method(&self) -> Method {
        self.method
    }

    fn path(&self) -> &str {
        self.uri
    }

    fn header(&self, name: &str) -> Option<&str> {
        if name.eq_ignore_ascii_case("Accept") {
            self.accept
        } else if name.eq_ignore_ascii_case("If-None-Match") {
            self.if_none_match
        } else {
            None
        }
    }
}

fn esp_method(method: Method) -> EspMethod {
    match method {
        Method::Get | Method::Other => EspMethod::Get,
        Method::Head => EspMethod::Head,
        Method::Post => EspMethod::Post,
        Method::Put => EspMethod::Put,
        Method::Delete => EspMethod::Delete,
        Method::Patch => EspMethod::Patch,
        Method::Options => EspMethod::Options,
    }
}

fn method(method: EspMethod) -> Method {
    match method {
        EspMethod::Get => Method::Get,
        EspMethod::Head => Method::Head,
        EspMethod::Post => Method::Post,
        EspMethod::Put => Method::Put,
        EspMethod::Delete => Method::Delete,
        EspMethod::Patch => Method::Patch,
        EspMethod::Options => Method::Options,
        _ => Method::Other,
    }
}
