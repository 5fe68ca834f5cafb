//! Reference firmware: the demo web application on the ESP-IDF HTTP daemon.
//!
//! Requires the ESP32 Rust toolchain. Wi-Fi credentials come from the
//! `WIFI_SSID` / `WIFI_PASS` environment variables at build time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::hal::prelude::Peripherals;
use esp_idf_svc::http::Method;
use esp_idf_svc::io::Write;
use log::{error, info};
use serde::Serialize;

use svelteesp32_esp32::{wifi, Configuration, EspHttpServer};

include!(concat!(env!("OUT_DIR"), "/svelteesp32.rs"));

const _: () = assert!(SVELTEESP32_COUNT == 3, "unexpected file count in demo/web");
const _: () = assert!(SVELTEESP32_FILE_INDEX_HTML);

const WIFI_SSID: &str = env!("WIFI_SSID");
const WIFI_PASS: &str = env!("WIFI_PASS");

/// `/api/status` and `/api/toggle`.
const API_HANDLERS: usize = 2;

fn main() -> anyhow::Result<()> {
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;

    let station = match wifi::connect(WIFI_SSID, WIFI_PASS, peripherals.modem, sysloop) {
        Ok(station) => station,
        Err(e) => {
            // Nothing to serve without a network.
            error!("Wi-Fi failed: {:?}", e);
            loop {
                std::thread::sleep(std::time::Duration::from_secs(1));
            }
        }
    };

    let config = Configuration {
        max_uri_handlers: SVELTEESP32_HANDLER_COUNT + API_HANDLERS,
        uri_match_wildcard: true,
        ..Default::default()
    };
    let mut server = EspHttpServer::new(&config)?;

    let led = Arc::new(AtomicBool::new(false));
    add_api(&mut server, &led)?;
    let added = init_svelte_static_files(&mut server, &config, API_HANDLERS)?;

    info!(
        "serving {} files through {} handlers on http://{}/",
        SVELTEESP32_COUNT, added, station.ip
    );

    // Keep the server and the Wi-Fi driver alive.
    loop {
        std::thread::sleep(std::time::Duration::from_secs(60));
    }
}

/// API handlers go first so the `/*` fallback does not shadow them.
fn add_api(server: &mut EspHttpServer<'static>, led: &Arc<AtomicBool>) -> anyhow::Result<()> {
    let state = Arc::clone(led);
    server.fn_handler("/api/status", Method::Get, move |req| -> anyhow::Result<()> {
        let body = serde_json::to_string(&Status::new(state.load(Ordering::SeqCst)))?;
        req.into_response(200, Some("OK"), &[("Content-Type", "application/json")])?
            .write_all(body.as_bytes())?;
        Ok(())
    })?;

    let state = Arc::clone(led);
    server.fn_handler("/api/toggle", Method::Post, move |req| -> anyhow::Result<()> {
        let on = !state.fetch_xor(true, Ordering::SeqCst);
        info!("LED {}", if on { "on" } else { "off" });
        let body = serde_json::to_string(&Status::new(on))?;
        req.into_response(200, Some("OK"), &[("Content-Type", "application/json")])?
            .write_all(body.as_bytes())?;
        Ok(())
    })?;
    Ok(())
}

#[derive(Debug, Serialize)]
struct Status {
    led: bool,
    version: &'static str,
    files: usize,
}

impl Status {
    fn new(led: bool) -> Self {
        Self {
            led,
            version: SVELTEESP32_VERSION,
            files: SVELTEESP32_COUNT,
        }
    }
}
