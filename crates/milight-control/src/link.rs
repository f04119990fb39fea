//! UDP link to a single receiver
//!
//! Commands are fire-and-forget: the receiver never answers, so a successful
//! [`ControllerLink::send`] only means the datagram left this host.

use std::net::{SocketAddr, UdpSocket};
use std::sync::Arc;
use std::time::Duration;

use crate::codec::Command;
use crate::pacing::{Clock, Pacer, SystemClock};
use crate::receiver::Receiver;
use crate::sink::CommandSink;
use crate::{error::ControlError, Result};

/// Paced UDP sender bound to one receiver
pub struct ControllerLink {
    socket: UdpSocket,
    receiver: Receiver,
    pacer: Pacer,
}

impl ControllerLink {
    /// Open a link using the wall clock for pacing.
    pub fn connect(receiver: Receiver) -> Result<Self> {
        Self::with_clock(receiver, Arc::new(SystemClock))
    }

    /// Open a link with an explicit pacing clock
    pub fn with_clock(receiver: Receiver, clock: Arc<dyn Clock>) -> Result<Self> {
        let target = receiver.socket_addr();
        let bind_addr = if target.is_ipv4() {
            SocketAddr::from(([0u8; 4], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };

        let socket = UdpSocket::bind(bind_addr)?;
        socket.connect(target)?;

        let mut pacer = Pacer::new(receiver.delay, clock);
        pacer.set_enabled(receiver.auto_delay);

        tracing::info!(
            "Controller link opened to {} (delay {:?}, auto-delay {})",
            receiver,
            receiver.delay,
            receiver.auto_delay
        );

        Ok(Self {
            socket,
            receiver,
            pacer,
        })
    }

    /// Send one command, waiting first if the previous one left too recently.
    pub fn send(&mut self, command: &Command) -> Result<()> {
        self.pacer.wait_turn();

        let written = self.socket.send(command.as_bytes())?;
        if written != command.as_bytes().len() {
            return Err(ControlError::IoError(std::io::Error::new(
                std::io::ErrorKind::WriteZero,
                format!("short write: {} of 3 bytes", written),
            )));
        }
        self.pacer.mark_sent();

        tracing::trace!("Sent {} to {}", command, self.receiver.socket_addr());

        Ok(())
    }

    /// The receiver this link talks to
    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// Current spacing between commands
    pub fn delay(&self) -> Duration {
        self.pacer.interval()
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.receiver.delay = delay;
        self.pacer.set_interval(delay);
    }

    pub fn auto_delay(&self) -> bool {
        self.pacer.is_enabled()
    }

    /// Disable to pace commands manually
    pub fn set_auto_delay(&mut self, enabled: bool) {
        self.receiver.auto_delay = enabled;
        self.pacer.set_enabled(enabled);
    }

    /// Local address of the underlying socket
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}

impl CommandSink for ControllerLink {
    fn send(&mut self, command: Command) -> Result<()> {
        ControllerLink::send(self, &command)
    }
}

impl std::fmt::Debug for ControllerLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerLink")
            .field("receiver", &self.receiver)
            .field("pacer", &self.pacer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;
    use crate::pacing::ManualClock;
    use crate::pacing::DEFAULT_DELAY;

    fn listener() -> (UdpSocket, Receiver) {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        socket
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();
        let addr = socket.local_addr().unwrap();
        (socket, Receiver::new(addr.ip()).with_port(addr.port()))
    }

    #[test]
    fn test_sends_three_bytes() {
        let (socket, receiver) = listener();
        let mut link = ControllerLink::with_clock(receiver, Arc::new(ManualClock::new())).unwrap();

        link.send(&codec::rgb::on()).unwrap();

        let mut buf = [0u8; 16];
        let (len, _) = socket.recv_from(&mut buf).unwrap();
        assert_eq!(&buf[..len], &[0x22, 0x00, 0x55]);
    }

    #[test]
    fn test_pacing_between_sends() {
        let (socket, receiver) = listener();
        let clock = ManualClock::new();
        let mut link = ControllerLink::with_clock(receiver, Arc::new(clock.clone())).unwrap();

        link.send(&codec::rgb::on()).unwrap();
        link.send(&codec::rgb::off()).unwrap();

        assert_eq!(clock.sleeps(), vec![DEFAULT_DELAY]);

        let mut buf = [0u8; 16];
        for expected in [0x22u8, 0x21] {
            let (len, _) = socket.recv_from(&mut buf).unwrap();
            assert_eq!(len, 3);
            assert_eq!(buf[0], expected);
        }
    }

    #[test]
    fn test_auto_delay_off() {
        let (_socket, receiver) = listener();
        let clock = ManualClock::new();
        let mut link = ControllerLink::with_clock(
            receiver.with_auto_delay(false),
            Arc::new(clock.clone()),
        )
        .unwrap();
        assert!(!link.auto_delay());

        link.send(&codec::rgb::on()).unwrap();
        link.send(&codec::rgb::on()).unwrap();
        assert!(clock.sleeps().is_empty());
    }

    #[test]
    fn test_delay_setting() {
        let (_socket, receiver) = listener();
        let clock = ManualClock::new();
        let mut link = ControllerLink::with_clock(receiver, Arc::new(clock.clone())).unwrap();
        link.set_delay(Duration::from_millis(120));
        assert_eq!(link.delay(), Duration::from_millis(120));
        assert_eq!(link.receiver().delay, Duration::from_millis(120));

        link.send(&codec::rgb::on()).unwrap();
        link.send(&codec::rgb::on()).unwrap();
        assert_eq!(clock.sleeps(), vec![Duration::from_millis(120)]);
    }
}
