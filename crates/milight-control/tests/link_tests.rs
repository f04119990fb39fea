use std::net::UdpSocket;
use std::sync::Arc;
use std::time::Duration;

use milight_control::{Color, Controller, ControllerLink, Lights, ManualClock, Receiver};

fn listener() -> (UdpSocket, Receiver) {
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();
    let addr = socket.local_addr().unwrap();
    (socket, Receiver::new(addr.ip()).with_port(addr.port()))
}

fn receive(socket: &UdpSocket, count: usize) -> Vec<Vec<u8>> {
    let mut buf = [0u8; 16];
    (0..count)
        .map(|_| {
            let (len, _) = socket.recv_from(&mut buf).unwrap();
            buf[..len].to_vec()
        })
        .collect()
}

#[test]
fn test_controller_over_udp() {
    let (socket, receiver) = listener();
    let clock = ManualClock::new();
    let link = ControllerLink::with_clock(receiver, Arc::new(clock.clone())).unwrap();
    let mut controller = Controller::new(link);

    controller.rgbw().switch_on(1).unwrap();
    controller.rgbw().set_true_color(1, Color::new(0, 0, 255)).unwrap();

    let datagrams = receive(&socket, 3);
    assert_eq!(datagrams[0], vec![0x45, 0x00, 0x55]);
    assert_eq!(datagrams[1][0], 0x40);
    assert_eq!(datagrams[2], vec![0x4E, 14, 0x55]);

    // Three sends, two waits between them
    assert_eq!(clock.sleeps().len(), 2);
}

#[test]
fn test_pacing_skips_wait_when_interval_passed() {
    let (socket, receiver) = listener();
    let clock = ManualClock::new();
    let mut link = ControllerLink::with_clock(
        receiver.with_delay(Duration::from_millis(100)),
        Arc::new(clock.clone()),
    )
    .unwrap();

    link.send(&milight_control::codec::rgb::on()).unwrap();
    clock.advance(Duration::from_millis(60));
    link.send(&milight_control::codec::rgb::off()).unwrap();
    clock.advance(Duration::from_millis(150));
    link.send(&milight_control::codec::rgb::on()).unwrap();

    assert_eq!(clock.sleeps(), vec![Duration::from_millis(40)]);
    assert_eq!(receive(&socket, 3).len(), 3);
}

#[test]
fn test_link_exposes_receiver() {
    let (_socket, receiver) = listener();
    let expected = receiver.socket_addr();
    let controller = Controller::new(
        ControllerLink::with_clock(receiver, Arc::new(ManualClock::new())).unwrap(),
    );
    assert_eq!(controller.receiver().socket_addr(), expected);
    assert!(controller.sink().local_addr().unwrap().ip().is_loopback());
}
