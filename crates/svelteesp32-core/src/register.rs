//! Route registration.
//!
//! Every HTTP server integration exposes the same minimal capability set
//! through [`RouteRegistrar`]. [`register`] wires a table into any of them,
//! checking the server's handler capacity before a single route is added.

use crate::asset::{AssetTable, Route};
use thiserror::Error;

/// Errors raised while wiring a table into a server.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The server cannot hold as many handlers as the table needs.
    #[error("server accepts {capacity} handlers but {required} are required")]
    CapacityExceeded { required: usize, capacity: usize },

    /// The server's router cannot express this path.
    #[error("path cannot be registered: {0}")]
    InvalidPath(String),

    /// The server rejected the registration.
    #[error("failed to register {path}: {reason}")]
    Server { path: String, reason: String },
}

/// A server instance that accepts route registrations.
///
/// Implementations install a handler that calls
/// [`respond`](crate::respond) for the route's asset, and for the fallback a
/// handler that calls [`handle`](crate::handle) on the whole table.
pub trait RouteRegistrar {
    /// Handler slots still free, or `None` if the server is unbounded.
    fn handler_capacity(&self) -> Option<usize>;

    /// Register one exact-path GET route.
    fn add_route(&mut self, route: Route) -> Result<(), RegistrationError>;

    /// Register the catch-all handler for unmatched paths.
    fn add_fallback(&mut self, table: &'static AssetTable) -> Result<(), RegistrationError>;

    /// Handler slots the fallback occupies. Servers that bind handlers to
    /// a single method need one per method.
    fn fallback_handlers(&self) -> usize {
        1
    }
}

/// Register every route of `table` with `registrar`.
///
/// Returns the number of handlers added. Fails with
/// [`RegistrationError::CapacityExceeded`] before registering anything when
/// the server is too small.
pub fn register<R>(table: &'static AssetTable, registrar: &mut R) -> Result<usize, RegistrationError>
where
    R: RouteRegistrar + ?Sized,
{
    let fallback = if table.fallback().is_some() {
        registrar.fallback_handlers()
    } else {
        0
    };
    let required = table.route_count() + fallback;
    if let Some(capacity) = registrar.handler_capacity() {
        if required > capacity {
            return Err(RegistrationError::CapacityExceeded { required, capacity });
        }
    }

    for route in table.routes() {
        registrar.add_route(route)?;
    }
    if table.fallback().is_some() {
        registrar.add_fallback(table)?;
    }

    Ok(required)
}
