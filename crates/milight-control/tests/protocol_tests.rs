use milight_control::codec::{self, Command};
use milight_control::{
    Color, CommandSink, ControlError, Controller, Family, Lights, RecordingSink,
};
use proptest::prelude::*;

fn recording() -> Controller<RecordingSink> {
    Controller::new(RecordingSink::new())
}

fn bytes(commands: &[Command]) -> Vec<[u8; 3]> {
    commands.iter().map(|c| *c.as_bytes()).collect()
}

/// Drops the first `failures` commands with an I/O error, records the rest
struct DroppingSink {
    failures: usize,
    sent: Vec<Command>,
}

impl CommandSink for DroppingSink {
    fn send(&mut self, command: Command) -> milight_control::Result<()> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused").into());
        }
        self.sent.push(command);
        Ok(())
    }
}

fn dropping(failures: usize) -> Controller<DroppingSink> {
    Controller::new(DroppingSink {
        failures,
        sent: Vec::new(),
    })
}

#[test]
fn test_every_command_is_terminated() {
    let mut controller = recording();
    for group in 0..=4 {
        controller.rgbw().switch_on(group).unwrap();
        controller.rgbw().set_brightness(group, 50).unwrap();
        controller.rgbw().set_night_mode(group).unwrap();
        controller.white().switch_on(group).unwrap();
        controller.white().warmer(group).unwrap();
    }
    controller.rgb().speed_down().unwrap();

    let sent = controller.sink().commands();
    assert!(!sent.is_empty());
    assert!(sent.iter().all(|c| c.as_bytes()[2] == 0x55));
}

#[test]
fn test_repeated_scoped_commands_select_once() {
    let mut controller = recording();
    controller.rgbw().set_hue(2, 120.0).unwrap();
    controller.rgbw().set_hue(2, 240.0).unwrap();
    controller.rgbw().set_brightness(2, 10).unwrap();

    let sent = bytes(controller.sink().commands());
    assert_eq!(
        sent,
        vec![
            [0x47, 0x00, 0x55],
            [0x40, codec::hue_to_byte(120.0), 0x55],
            [0x40, codec::hue_to_byte(240.0), 0x55],
            [0x4E, 4, 0x55],
        ]
    );
}

#[test]
fn test_families_are_addressed_independently() {
    let mut controller = recording();
    controller.rgbw().switch_on(1).unwrap();
    controller.white().brightness_down(1).unwrap();
    controller.rgbw().speed_up(1).unwrap();

    let sent = bytes(controller.sink().commands());
    assert_eq!(
        sent,
        vec![
            [0x45, 0x00, 0x55],
            [0x38, 0x00, 0x55],
            [0x34, 0x00, 0x55],
            [0x44, 0x00, 0x55],
        ]
    );
    assert_eq!(controller.addresses().active(Family::Rgbw).map(|g| g.number()), Some(1));
    assert_eq!(controller.addresses().active(Family::White).map(|g| g.number()), Some(1));
}

#[test]
fn test_switch_white_records_group() {
    let mut controller = recording();
    controller.rgbw().switch_white(3).unwrap();
    controller.rgbw().set_brightness(3, 100).unwrap();
    assert_eq!(
        bytes(controller.sink().commands()),
        vec![[0xC9, 0x00, 0x55], [0x4E, 27, 0x55]]
    );
}

#[test]
fn test_night_mode_does_not_select() {
    let mut controller = recording();
    controller.rgbw().set_night_mode(2).unwrap();
    controller.rgbw().set_brightness(2, 0).unwrap();
    assert_eq!(
        bytes(controller.sink().commands()),
        vec![[0x48, 0xC8, 0x55], [0x47, 0x00, 0x55], [0x4E, 0x00, 0x55]]
    );
}

#[test]
fn test_true_color_saturated() {
    let mut controller = recording();
    controller.rgbw().set_true_color(0, Color::new(255, 0, 0)).unwrap();
    assert_eq!(
        bytes(controller.sink().commands()),
        vec![[0x42, 0x00, 0x55], [0x40, 0xB0, 0x55], [0x4E, 14, 0x55]]
    );
}

#[test]
fn test_true_color_grey_goes_white() {
    let mut controller = recording();
    controller.rgbw().switch_on(4).unwrap();
    controller.rgbw().set_true_color(4, Color::new(128, 128, 128)).unwrap();
    assert_eq!(
        bytes(controller.sink().commands()),
        vec![[0x4B, 0x00, 0x55], [0xCB, 0x00, 0x55], [0x4E, 14, 0x55]]
    );
}

#[test]
fn test_true_color_black_goes_white_at_zero() {
    let mut controller = recording();
    controller.rgbw().switch_on(1).unwrap();
    controller.rgbw().set_true_color(1, Color::BLACK).unwrap();
    let sent = bytes(controller.sink().commands());
    assert_eq!(sent[1], [0xC5, 0x00, 0x55]);
    assert_eq!(sent[2], [0x4E, 0x00, 0x55]);
}

#[test]
fn test_invalid_groups_never_reach_the_sink() {
    let mut controller = recording();
    let results = [
        controller.rgbw().switch_on(5),
        controller.rgbw().switch_off(200),
        controller.rgbw().set_true_color(5, Color::WHITE),
        controller.rgbw().set_night_mode(8),
        controller.white().switch_on(5),
        controller.white().cooler(5),
        controller.lights(Family::RgbLegacy).switch_off(5),
    ];
    for result in results {
        assert!(matches!(result, Err(ControlError::InvalidGroup(_))));
    }
    assert!(controller.sink().commands().is_empty());
}

#[test]
fn test_reset_addresses_forces_reselect() {
    let mut controller = recording();
    controller.rgbw().switch_on(2).unwrap();
    controller.reset_addresses();
    controller.rgbw().cycle_mode(2).unwrap();
    assert_eq!(
        bytes(controller.sink().commands()),
        vec![[0x47, 0x00, 0x55], [0x47, 0x00, 0x55], [0x4D, 0x00, 0x55]]
    );
}

#[test]
fn test_all_helpers() {
    let mut controller = recording();
    controller.all_on().unwrap();
    controller.all_hue(0.0).unwrap();
    assert_eq!(
        bytes(controller.sink().commands()),
        vec![
            [0x42, 0x00, 0x55],
            [0x45, 0x00, 0x55],
            [0x22, 0x00, 0x55],
            [0x40, 0xB0, 0x55],
            [0x20, 0xB0, 0x55],
        ]
    );
}

#[test]
fn test_failed_select_is_sent_again() {
    let mut controller = dropping(1);
    let err = controller.rgbw().set_brightness(2, 100).unwrap_err();
    assert!(matches!(err, ControlError::IoError(_)));
    assert_eq!(controller.addresses().active(Family::Rgbw), None);

    controller.rgbw().set_brightness(2, 100).unwrap();
    assert_eq!(
        bytes(&controller.sink().sent),
        vec![[0x47, 0x00, 0x55], [0x4E, 27, 0x55]]
    );
}

#[test]
fn test_failed_select_keeps_previous_group() {
    let mut controller = dropping(0);
    controller.white().switch_on(1).unwrap();
    controller.sink_mut().failures = 1;

    assert!(controller.white().warmer(3).is_err());
    assert_eq!(controller.addresses().active(Family::White).map(|g| g.number()), Some(1));

    controller.white().warmer(3).unwrap();
    assert_eq!(
        bytes(&controller.sink().sent),
        vec![[0x38, 0x00, 0x55], [0x37, 0x00, 0x55], [0x3E, 0x00, 0x55]]
    );
}

#[test]
fn test_failed_select_before_true_color() {
    let mut controller = dropping(1);
    assert!(controller.rgbw().set_true_color(4, Color::new(255, 0, 0)).is_err());
    assert_eq!(controller.addresses().active(Family::Rgbw), None);

    controller.rgbw().set_true_color(4, Color::new(255, 0, 0)).unwrap();
    assert_eq!(controller.sink().sent[0].as_bytes(), &[0x4B, 0x00, 0x55]);
    assert_eq!(controller.sink().sent.len(), 3);
}

proptest! {
    #[test]
    fn prop_selection_precedes_scoped_commands(groups in proptest::collection::vec(0u8..=4, 1..20)) {
        let mut controller = recording();
        for &group in &groups {
            controller.rgbw().set_brightness(group, 50).unwrap();
        }

        // Every brightness command must be preceded by the "on" of its group,
        // either directly or through an earlier run of the same group.
        let sent = controller.into_sink().drain();
        let mut active = None;
        let mut index = 0;
        for command in sent {
            if command.opcode() == codec::rgbw::BRIGHTNESS {
                prop_assert_eq!(active, Some(groups[index]));
                index += 1;
            } else {
                let group = [0x42u8, 0x45, 0x47, 0x49, 0x4B]
                    .iter()
                    .position(|&op| op == command.opcode());
                prop_assert!(group.is_some());
                active = group.map(|g| g as u8);
            }
        }
        prop_assert_eq!(index, groups.len());
    }

    #[test]
    fn prop_selects_only_on_change(groups in proptest::collection::vec(1u8..=4, 1..20)) {
        let mut controller = recording();
        for &group in &groups {
            controller.white().warmer(group).unwrap();
        }
        let changes = 1 + groups.windows(2).filter(|w| w[0] != w[1]).count();
        prop_assert_eq!(controller.sink().commands().len(), groups.len() + changes);
    }

    #[test]
    fn prop_out_of_range_groups_rejected(group in 5u8..=255) {
        let mut controller = recording();
        prop_assert!(controller.rgbw().set_hue(group, 10.0).is_err());
        prop_assert!(controller.sink().commands().is_empty());
    }
}
