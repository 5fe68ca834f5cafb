//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};

/// Configuration for the thread-pool server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind to. Port 0 picks a free port.
    pub bind_addr: SocketAddr,
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum number of handlers, static files and application routes
    /// together.
    pub max_handlers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 80)),
            workers: 4,
            max_handlers: 32,
        }
    }
}
