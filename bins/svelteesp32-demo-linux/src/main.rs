//! Demo: one web application, served by both host backends.
//!
//! - async backend (axum) on port 8080
//! - thread-pool backend (tiny_http) on port 8081
//!
//! Both expose `GET /api/status` and `POST /api/toggle` next to the embedded
//! files. The LED state is owned here and shared with every handler.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, routing::post, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use svelteesp32_server::{Method, PoolResponse, PoolServer, ServerConfig};

mod web {
    include!(concat!(env!("OUT_DIR"), "/svelteesp32_async.rs"));
}

mod pool {
    include!(concat!(env!("OUT_DIR"), "/svelteesp32_pool.rs"));
}

/// Same bundle with gzip and ETag chosen by cargo features. Only served by
/// the tests.
#[cfg_attr(not(test), allow(dead_code))]
mod compiler {
    include!(concat!(env!("OUT_DIR"), "/svelteesp32_compiler.rs"));
}

// The demo bundle: index.html, one stylesheet, one script.
const _: () = assert!(web::SVELTEESP32_COUNT == 3, "unexpected file count in demo/web");
const _: () = assert!(web::SVELTEESP32_FILE_INDEX_HTML);
const _: () = assert!(pool::SVELTEESP32_POOL_CSS_FILES == 1);
const _: () = assert!(compiler::SVELTEESP32_COMPILER_COUNT == web::SVELTEESP32_COUNT);

/// Application routes added next to the embedded files on the pool server.
const POOL_API_ROUTES: usize = 2;

/// LED state shared by all handlers.
#[derive(Debug, Clone, Default)]
struct Led(Arc<AtomicBool>);

impl Led {
    fn is_on(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::SeqCst)
    }
}

#[derive(Debug, Serialize)]
struct Status {
    led: bool,
    version: &'static str,
    files: usize,
}

impl Status {
    fn of(led: &Led) -> Self {
        Self {
            led: led.is_on(),
            version: web::SVELTEESP32_VERSION,
            files: web::SVELTEESP32_COUNT,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,svelteesp32_web=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let led = Led::default();
    let async_addr: SocketAddr = "0.0.0.0:8080".parse()?;
    let pool_addr: SocketAddr = "0.0.0.0:8081".parse()?;

    let mut pool_server = pool_server(led.clone(), pool_addr)?.run()?;

    let app = app(led)?.layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(async_addr).await?;

    tracing::info!(
        "serving {} embedded files ({} bytes stored)",
        web::SVELTEESP32_COUNT,
        web::SVELTEESP32_SIZE_GZIP
    );
    tracing::info!("   async: http://localhost:{}", async_addr.port());
    tracing::info!("   pool:  http://localhost:{}", pool_server.addr().port());

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for Ctrl+C: {}", e);
            }
            tracing::info!("Received Ctrl+C, shutting down...");
        })
        .await?;

    tokio::task::spawn_blocking(move || pool_server.shutdown()).await?;
    tracing::info!("Shutdown complete");
    Ok(())
}

/// The axum application: API routes plus the embedded files.
fn app(led: Led) -> anyhow::Result<Router> {
    let router = Router::new()
        .route("/api/status", get(status))
        .route("/api/toggle", post(toggle))
        .with_state(led);
    Ok(web::init_svelte_static_files(router)?)
}

async fn status(State(led): State<Led>) -> Json<Status> {
    Json(Status::of(&led))
}

async fn toggle(State(led): State<Led>) -> Json<Status> {
    let on = led.toggle();
    tracing::info!("LED {}", if on { "on" } else { "off" });
    Json(Status::of(&led))
}

/// The thread-pool server with the same API.
fn pool_server(led: Led, bind_addr: SocketAddr) -> anyhow::Result<PoolServer> {
    let mut server = PoolServer::new(ServerConfig {
        bind_addr,
        workers: 2,
        max_handlers: pool::SVELTEESP32_POOL_HANDLER_COUNT + POOL_API_ROUTES,
    });
    pool::init_pool_static_files(&mut server)?;

    let status_led = led.clone();
    server.on(Method::Get, "/api/status", move |_| status_response(&status_led))?;
    server.on(Method::Post, "/api/toggle", move |_| {
        led.toggle();
        status_response(&led)
    })?;
    Ok(server)
}

fn status_response(led: &Led) -> PoolResponse {
    match serde_json::to_string(&Status::of(led)) {
        Ok(body) => PoolResponse::json(200, body),
        Err(e) => PoolResponse::text(500, e.to_string()),
    }
}
