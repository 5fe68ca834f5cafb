//! Handler table for the thread-pool server.

use svelteesp32_core::{
    path_matches, Asset, AssetTable, Method, RegistrationError, Route, RouteRegistrar, ServeOptions,
};

use crate::config::ServerConfig;
use crate::http::{PoolRequest, PoolResponse};

/// Application handler.
pub type Handler = Box<dyn Fn(&PoolRequest) -> PoolResponse + Send + Sync + 'static>;

enum Target {
    Asset {
        options: &'static ServeOptions,
        asset: &'static Asset,
    },
    Custom {
        method: Method,
        handler: Handler,
    },
}

struct Entry {
    path: String,
    target: Target,
}

/// A thread-pool HTTP server that has not been started yet.
///
/// Embedded files and application handlers share one bounded table of
/// [`ServerConfig::max_handlers`] slots.
pub struct PoolServer {
    pub(crate) config: ServerConfig,
    entries: Vec<Entry>,
    fallback: Option<&'static AssetTable>,
}

impl PoolServer {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            fallback: None,
        }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Handlers registered so far, including the fallback.
    pub fn handler_count(&self) -> usize {
        self.entries.len() + usize::from(self.fallback.is_some())
    }

    /// Register an application handler for `method` on the exact `path`.
    pub fn on<F>(&mut self, method: Method, path: &str, handler: F) -> Result<(), RegistrationError>
    where
        F: Fn(&PoolRequest) -> PoolResponse + Send + Sync + 'static,
    {
        self.reserve(path)?;
        let taken = self.entries.iter().any(|entry| {
            entry.path == path
                && match &entry.target {
                    Target::Asset { .. } => true,
                    Target::Custom { method: existing, .. } => *existing == method,
                }
        });
        if taken {
            return Err(duplicate(path));
        }

        self.entries.push(Entry {
            path: path.to_string(),
            target: Target::Custom {
                method,
                handler: Box::new(handler),
            },
        });
        tracing::debug!("handler {:?} {}", method, path);
        Ok(())
    }

    /// Answer a request from the handler table.
    ///
    /// Application handlers first, then the exact-path file routes, then
    /// the fallback.
    pub fn dispatch(&self, req: &PoolRequest) -> PoolResponse {
        let path = req.path();

        let mut path_known = false;
        for entry in self.entries.iter().filter(|entry| path_matches(&entry.path, path)) {
            if let Target::Custom { method, handler } = &entry.target {
                if *method == req.method {
                    return handler(req);
                }
                path_known = true;
            }
        }
        if path_known {
            return PoolResponse::text(405, "Method Not Allowed");
        }

        let asset = self.entries.iter().find_map(|entry| match entry.target {
            Target::Asset { options, asset } if path_matches(&entry.path, path) => Some((options, asset)),
            _ => None,
        });
        if let Some((options, asset)) = asset {
            return svelteesp32_core::respond(options, asset, req).into();
        }

        match self.fallback {
            Some(table) => svelteesp32_core::handle(table, req).into(),
            None => svelteesp32_core::Response::not_found().into(),
        }
    }

    fn reserve(&self, path: &str) -> Result<(), RegistrationError> {
        if !path.starts_with('/') {
            return Err(RegistrationError::InvalidPath(path.to_string()));
        }
        if self.handler_count() >= self.config.max_handlers {
            return Err(RegistrationError::CapacityExceeded {
                required: self.handler_count() + 1,
                capacity: self.config.max_handlers,
            });
        }
        Ok(())
    }
}

/// Register every route of `table` on `server`.
///
/// Fails before adding anything when fewer than
/// [`AssetTable::handler_count`] slots are free.
pub fn register(server: &mut PoolServer, table: &'static AssetTable) -> Result<usize, RegistrationError> {
    let mut registrar = TableRegistrar { server, table };
    let added = svelteesp32_core::register(table, &mut registrar)?;
    tracing::debug!("registered {} handlers for {} embedded files", added, table.len());
    Ok(added)
}

struct TableRegistrar<'a> {
    server: &'a mut PoolServer,
    table: &'static AssetTable,
}

impl RouteRegistrar for TableRegistrar<'_> {
    fn handler_capacity(&self) -> Option<usize> {
        Some(
            self.server
                .config
                .max_handlers
                .saturating_sub(self.server.handler_count()),
        )
    }

    fn add_route(&mut self, route: Route) -> Result<(), RegistrationError> {
        self.server.reserve(route.path)?;
        if self.server.entries.iter().any(|entry| entry.path == route.path) {
            return Err(duplicate(route.path));
        }
        self.server.entries.push(Entry {
            path: route.path.to_string(),
            target: Target::Asset {
                options: self.table.options(),
                asset: route.asset,
            },
        });
        Ok(())
    }

    fn add_fallback(&mut self, table: &'static AssetTable) -> Result<(), RegistrationError> {
        if self.server.fallback.is_some() {
            return Err(RegistrationError::Server {
                path: "*".to_string(),
                reason: "fallback already registered".to_string(),
            });
        }
        self.server.reserve("/")?;
        self.server.fallback = Some(table);
        Ok(())
    }
}

fn duplicate(path: &str) -> RegistrationError {
    RegistrationError::Server {
        path: path.to_string(),
        reason: "path already registered".to_string(),
    }
}
