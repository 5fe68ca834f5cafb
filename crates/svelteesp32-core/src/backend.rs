//! Backend selector shared by the packer and the adapters.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::request::Method;

/// The HTTP server integration a table is packed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Event-driven async server (axum on tokio).
    Async,
    /// Thread-pool server (tiny_http with worker threads).
    Pool,
    /// The vendor's native HTTP daemon (`esp_http_server` via esp-idf-svc).
    Espidf,
}

/// Backend name that matches none of the supported kinds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported backend '{0}' (expected one of: async, pool, espidf)")]
pub struct UnknownBackend(pub String);

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Async, Backend::Pool, Backend::Espidf];

    pub const fn as_str(self) -> &'static str {
        match self {
            Backend::Async => "async",
            Backend::Pool => "pool",
            Backend::Espidf => "espidf",
        }
    }

    /// Handler slots the SPA fallback takes on this server. The native
    /// daemon binds each handler to one method, so the wildcard is
    /// registered once per known method.
    pub const fn fallback_handlers(self) -> usize {
        match self {
            Backend::Async | Backend::Pool => 1,
            Backend::Espidf => Method::KNOWN.len(),
        }
    }

    /// Human-readable server name for log output.
    pub const fn server_name(self) -> &'static str {
        match self {
            Backend::Async => "axum (async)",
            Backend::Pool => "tiny_http (thread pool)",
            Backend::Espidf => "ESP-IDF httpd",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|backend| backend.as_str() == s)
            .ok_or_else(|| UnknownBackend(s.to_string()))
    }
}
