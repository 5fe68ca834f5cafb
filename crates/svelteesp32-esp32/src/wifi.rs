//! Station-mode Wi-Fi bring-up for the reference firmware.

use anyhow::{anyhow, bail, Result};
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::{modem::Modem, peripheral},
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};
use log::info;

/// A connected station. Keep it alive for as long as the network is needed.
pub struct Station {
    pub wifi: Box<EspWifi<'static>>,
    pub ip: std::net::Ipv4Addr,
}

/// Join `ssid` and wait for a DHCP lease.
///
/// An empty `password` joins an open network.
pub fn connect(
    ssid: &str,
    password: &str,
    modem: impl peripheral::Peripheral<P = Modem> + 'static,
    sysloop: EspSystemEventLoop,
) -> Result<Station> {
    if ssid.is_empty() {
        bail!("Wi-Fi SSID cannot be empty");
    }

    let mut esp_wifi = EspWifi::new(modem, sysloop.clone(), None)?;
    let mut wifi = BlockingWifi::wrap(&mut esp_wifi, sysloop)?;

    wifi.set_configuration(&Configuration::Client(ClientConfiguration {
        ssid: ssid
            .try_into()
            .map_err(|_| anyhow!("SSID longer than 32 bytes"))?,
        password: password
            .try_into()
            .map_err(|_| anyhow!("password longer than 64 bytes"))?,
        auth_method: if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        },
        ..Default::default()
    }))?;

    wifi.start()?;
    info!("connecting to '{}'", ssid);
    wifi.connect()?;
    wifi.wait_netif_up()?;

    let ip = wifi.wifi().sta_netif().get_ip_info()?.ip;
    info!("Wi-Fi up, address {}", ip);

    Ok(Station {
        wifi: Box::new(esp_wifi),
        ip,
    })
}
