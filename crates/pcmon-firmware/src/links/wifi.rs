//! Wireless link: Wi-Fi station plus a UDP socket.
//!
//! Every datagram that arrives on the telemetry port is offered to the
//! inbound slot of [`WIRELESS`] as one record and makes its sender the echo
//! peer. Lines the monitor writes to the link are sent back to that peer.
//! The peer is forgotten after [`PEER_TIMEOUT`] without traffic.

use alloc::string::ToString;

use embassy_futures::select::{Either3, select3};
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpEndpoint, Runner, Stack};
use embassy_time::{Duration, Instant, Timer};
use esp_radio::wifi::{
    ClientConfig, ModeConfig, WifiController, WifiDevice, WifiEvent, WifiStaState,
};
use log::{debug, info, warn};
use pcmon_core::transport::{PACKET_CAPACITY, PacketChannel};

use crate::settings;

/// Shared between the UDP task and the monitor loop.
pub static WIRELESS: PacketChannel = PacketChannel::new();

const PEER_TIMEOUT: Duration = Duration::from_secs(10);
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Keeps the station associated, reconnecting after drops.
#[embassy_executor::task]
pub async fn connection_task(mut controller: WifiController<'static>) {
    let Some(ssid) = settings::WIFI_SSID else {
        warn!("No SSID configured, Wi-Fi stays off");
        return;
    };

    loop {
        if esp_radio::wifi::sta_state() == WifiStaState::Connected {
            controller.wait_for_event(WifiEvent::StaDisconnected).await;
            WIRELESS.set_peer_connected(false);
            Timer::after(RECONNECT_DELAY).await;
        }

        if !matches!(controller.is_started(), Ok(true)) {
            let client = ClientConfig::default()
                .with_ssid(ssid.to_string())
                .with_password(settings::WIFI_PASSWORD.to_string());
            if let Err(e) = controller.set_config(&ModeConfig::Client(client)) {
                warn!("Wi-Fi config rejected: {:?}", e);
                return;
            }
            info!("Starting Wi-Fi");
            if let Err(e) = controller.start_async().await {
                warn!("Wi-Fi start failed: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
                continue;
            }
        }

        match controller.connect_async().await {
            Ok(()) => info!("Wi-Fi connected to {}", ssid),
            Err(e) => {
                info!("Wi-Fi connect failed: {:?}", e);
                Timer::after(RECONNECT_DELAY).await;
            }
        }
    }
}

#[embassy_executor::task]
pub async fn net_task(mut runner: Runner<'static, WifiDevice<'static>>) {
    runner.run().await
}

/// Moves datagrams between the socket and [`WIRELESS`].
#[embassy_executor::task]
pub async fn udp_task(stack: Stack<'static>, port: u16) {
    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!("Listening for telemetry on {}:{}", config.address.address(), port);
    }

    let mut rx_meta = [PacketMetadata::EMPTY; 4];
    let mut rx_buffer = [0u8; 1024];
    let mut tx_meta = [PacketMetadata::EMPTY; 4];
    let mut tx_buffer = [0u8; 1024];
    let mut socket = UdpSocket::new(
        stack,
        &mut rx_meta,
        &mut rx_buffer,
        &mut tx_meta,
        &mut tx_buffer,
    );
    if let Err(e) = socket.bind(port) {
        warn!("UDP bind on {} failed: {:?}", port, e);
        return;
    }

    let mut datagram = [0u8; PACKET_CAPACITY];
    let mut peer: Option<(IpEndpoint, Instant)> = None;

    loop {
        let event = select3(
            socket.recv_from(&mut datagram),
            WIRELESS.outbound().wait(),
            Timer::after(Duration::from_secs(1)),
        )
        .await;

        match event {
            Either3::First(Ok((len, meta))) => {
                if peer.is_none_or(|(endpoint, _)| endpoint != meta.endpoint) {
                    info!("Wireless peer {}", meta.endpoint);
                }
                peer = Some((meta.endpoint, Instant::now()));
                WIRELESS.set_peer_connected(true);
                if let Err(e) = WIRELESS.inbound().offer(&datagram[..len]) {
                    debug!("Dropped datagram: {}", e);
                }
            }
            Either3::First(Err(e)) => debug!("UDP receive failed: {:?}", e),
            Either3::Second(mut line) => {
                let Some((endpoint, _)) = peer else {
                    continue;
                };
                if line.push(b'\n').is_err() {
                    debug!("Echo line too long for a datagram");
                    continue;
                }
                if let Err(e) = socket.send_to(&line, endpoint).await {
                    debug!("UDP send failed: {:?}", e);
                }
            }
            Either3::Third(()) => {
                if let Some((_, last_seen)) = peer
                    && last_seen.elapsed() > PEER_TIMEOUT
                {
                    info!("Wireless peer timed out");
                    peer = None;
                    WIRELESS.set_peer_connected(false);
                }
            }
        }
    }
}
