//! Receiver discovery
//!
//! Receivers answer a `Link_Wi-Fi` broadcast on port 48899 with a short
//! `ip,mac,` text reply. Discovery broadcasts the probe a fixed number of
//! times, collects whatever answers arrive during and shortly after the
//! broadcast window, and returns one [`Receiver`] per replying address.
//! Silence is not an error.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use crate::pacing::{Clock, SystemClock};
use crate::receiver::Receiver;
use crate::Result;

/// Port receivers listen on for discovery probes
pub const DISCOVERY_PORT: u16 = 48899;

/// Probe payload
pub const DISCOVERY_PAYLOAD: &[u8] = b"Link_Wi-Fi";

const MAX_REPLY_SIZE: usize = 512;

/// Timing and addressing of a discovery run
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Where probes are sent (normally the limited broadcast address)
    pub target: SocketAddr,
    /// Number of probes
    pub repeats: u32,
    /// Spacing between probes
    pub interval: Duration,
    /// Extra listening time after the last probe
    pub linger: Duration,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            target: SocketAddr::new(IpAddr::V4(Ipv4Addr::BROADCAST), DISCOVERY_PORT),
            repeats: 20,
            interval: Duration::from_millis(50),
            linger: Duration::from_millis(250),
        }
    }
}

/// Broadcast on the local network and return every receiver that answered.
pub fn discover() -> Result<Vec<Receiver>> {
    discover_with(&DiscoveryConfig::default())
}

/// Run discovery with custom timing or target.
pub fn discover_with(config: &DiscoveryConfig) -> Result<Vec<Receiver>> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let socket = UdpSocket::bind(SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0))?;
    socket.set_broadcast(true)?;

    tracing::info!(
        "Discovering receivers via {} ({} probes, {:?} apart)",
        config.target,
        config.repeats,
        config.interval
    );

    let mut found: BTreeMap<IpAddr, Receiver> = BTreeMap::new();

    for _ in 0..config.repeats {
        socket.send_to(DISCOVERY_PAYLOAD, config.target)?;
        collect_replies(&socket, clock.as_ref(), config.interval, &mut found)?;
    }
    collect_replies(&socket, clock.as_ref(), config.linger, &mut found)?;

    let receivers: Vec<Receiver> = found.into_values().collect();
    tracing::info!("Discovery finished: {} receiver(s) found", receivers.len());
    for receiver in &receivers {
        tracing::debug!("Found receiver {}", receiver);
    }

    Ok(receivers)
}

/// Read replies until `window` has passed.
fn collect_replies(
    socket: &UdpSocket,
    clock: &dyn Clock,
    window: Duration,
    found: &mut BTreeMap<IpAddr, Receiver>,
) -> Result<()> {
    let deadline = clock.now() + window;
    let mut buf = [0u8; MAX_REPLY_SIZE];

    loop {
        let now = clock.now();
        if now >= deadline {
            return Ok(());
        }
        // A zero timeout would mean "block forever"
        let remaining = (deadline - now).max(Duration::from_millis(1));
        socket.set_read_timeout(Some(remaining))?;

        match socket.recv_from(&mut buf) {
            Ok((len, source)) => {
                if let Some(receiver) = parse_reply(&buf[..len], source) {
                    found.entry(receiver.address).or_insert(receiver);
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Ok(());
            }
            Err(e) if matches!(e.kind(), ErrorKind::ConnectionReset | ErrorKind::ConnectionRefused) => {
                // Windows reports ICMP port unreachable from earlier probes here
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Turn a reply datagram into a receiver.
///
/// The sender address is authoritative; the MAC text after the first comma is
/// kept as hardware id when present. Echoed probes are ignored.
fn parse_reply(data: &[u8], source: SocketAddr) -> Option<Receiver> {
    if data.is_empty() || data == DISCOVERY_PAYLOAD {
        return None;
    }

    let text = String::from_utf8_lossy(data);
    let mut fields = text.trim().split(',').map(str::trim);
    let reported_ip = fields.next().unwrap_or_default();
    let hardware_id = fields
        .next()
        .filter(|mac| !mac.is_empty())
        .map(str::to_string);

    if reported_ip.parse::<IpAddr>().ok() != Some(source.ip()) {
        tracing::warn!(
            "Discovery reply from {} reports address '{}'",
            source.ip(),
            reported_ip
        );
    }

    let mut receiver = Receiver::new(source.ip());
    receiver.hardware_id = hardware_id;
    Some(receiver)
}
