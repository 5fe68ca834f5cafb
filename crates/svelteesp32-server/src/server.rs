//! Worker pool and lifecycle.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tiny_http::Server;

use crate::http::PoolRequest;
use crate::router::PoolServer;

/// How long a worker blocks before rechecking the stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {reason}")]
    Bind { addr: SocketAddr, reason: String },

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// A started server. Dropping it does not stop the workers; call
/// [`RunningServer::shutdown`].
pub struct RunningServer {
    addr: SocketAddr,
    server: Arc<Server>,
    stop: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl PoolServer {
    /// Bind the listener and start the worker threads.
    pub fn run(self) -> Result<RunningServer, ServerError> {
        let bind_addr = self.config.bind_addr;
        let server = Server::http(bind_addr).map_err(|e| ServerError::Bind {
            addr: bind_addr,
            reason: e.to_string(),
        })?;
        let addr = server.server_addr().to_ip().unwrap_or(bind_addr);
        let server = Arc::new(server);
        let stop = Arc::new(AtomicBool::new(false));
        let workers = self.config.workers.max(1);

        tracing::info!(
            "listening on http://{} with {} workers and {} handlers",
            addr,
            workers,
            self.handler_count()
        );

        let router = Arc::new(self);
        let mut running = RunningServer {
            addr,
            server,
            stop,
            workers: Vec::with_capacity(workers),
        };

        for id in 0..workers {
            let server = Arc::clone(&running.server);
            let stop = Arc::clone(&running.stop);
            let router = Arc::clone(&router);
            let spawned = thread::Builder::new()
                .name(format!("svelteesp32-worker-{id}"))
                .spawn(move || worker(&server, &router, &stop));
            match spawned {
                Ok(handle) => running.workers.push(handle),
                Err(e) => {
                    running.shutdown();
                    return Err(ServerError::Spawn(e));
                }
            }
        }

        Ok(running)
    }
}

impl RunningServer {
    /// The bound address. Reports the real port when bound to port 0.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until every worker has exited.
    pub fn wait(mut self) {
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("worker thread panicked");
            }
        }
    }

    /// Stop accepting requests and join the workers.
    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        for _ in 0..self.workers.len() {
            self.server.unblock();
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!("worker thread panicked");
            }
        }
        tracing::info!("server on {} stopped", self.addr);
    }
}

fn worker(server: &Server, router: &PoolServer, stop: &AtomicBool) {
    while !stop.load(Ordering::SeqCst) {
        let request = match server.recv_timeout(POLL_INTERVAL) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => {
                if !stop.load(Ordering::SeqCst) {
                    tracing::warn!("failed to receive request: {}", e);
                }
                continue;
            }
        };

        let req = PoolRequest::from_tiny(&request);
        let response = router.dispatch(&req);
        tracing::trace!("{} {} -> {}", request.method(), request.url(), response.status);
        if let Err(e) = request.respond(response.into_tiny()) {
            tracing::debug!("failed to send response: {}", e);
        }
    }
}
