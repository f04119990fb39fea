//! MiLight command codec
//!
//! Pure mapping from lighting intents to 3-byte receiver commands.
//!
//! Every datagram the receiver accepts has the same shape:
//!
//! | Byte | Meaning |
//! |------|---------|
//! | 0 | opcode |
//! | 1 | parameter (0x00 when unused) |
//! | 2 | terminator, always 0x55 |
//!
//! Nothing in here performs I/O or remembers which group was selected last;
//! that is the job of [`AddressBook`](crate::address::AddressBook) and the
//! [`Controller`](crate::lights::Controller).

use std::fmt;

use crate::color::Color;
use crate::target::{Family, Group};

/// Last byte of every command
pub const TERMINATOR: u8 = 0x55;

/// Saturation or luminosity percentage below which true color falls back to white
pub const TRUE_COLOR_THRESHOLD: i32 = 15;

/// A single 3-byte receiver command
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command([u8; 3]);

impl Command {
    /// Command with an unused parameter byte
    pub const fn new(opcode: u8) -> Self {
        Self([opcode, 0x00, TERMINATOR])
    }

    pub const fn with_param(opcode: u8, param: u8) -> Self {
        Self([opcode, param, TERMINATOR])
    }

    pub fn opcode(&self) -> u8 {
        self.0[0]
    }

    pub fn param(&self) -> u8 {
        self.0[1]
    }

    /// Wire representation
    pub fn as_bytes(&self) -> &[u8; 3] {
        &self.0
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Command[{:02X} {:02X} {:02X}]", self.0[0], self.0[1], self.0[2])
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02X} {:02X} {:02X}", self.0[0], self.0[1], self.0[2])
    }
}

/// Receiver hue byte for a hue in degrees.
///
/// `(256 + 176 - round(hue / 360 * 255)) mod 256`. The receiver's color wheel
/// starts at 176 and runs backwards. Hues outside 0..=360 are first wrapped
/// into 0..360.
pub fn hue_to_byte(hue: f32) -> u8 {
    let hue = if (0.0..=360.0).contains(&hue) {
        hue
    } else {
        hue.rem_euclid(360.0)
    };
    let step = (f64::from(hue) / 360.0 * 255.0).round() as i32;
    (256 + 176 - step).rem_euclid(256) as u8
}

/// Receiver brightness byte for a percentage.
///
/// 0 (or less) switches the LEDs fully down; anything else lands on one of the
/// 26 firmware levels 2..=27. Values above 100 are clamped.
pub fn brightness_to_byte(percentage: i32) -> u8 {
    if percentage <= 0 {
        return 0x00;
    }
    (percentage.min(100) / 4 + 2) as u8
}

/// "On" command for a family and group; for RGB-legacy the group is ignored.
pub fn power_on(family: Family, group: Group) -> Command {
    match family {
        Family::Rgbw => rgbw::on(group),
        Family::White => white::on(group),
        Family::RgbLegacy => rgb::on(),
    }
}

/// "Off" command for a family and group; for RGB-legacy the group is ignored.
pub fn power_off(family: Family, group: Group) -> Command {
    match family {
        Family::Rgbw => rgbw::off(group),
        Family::White => white::off(group),
        Family::RgbLegacy => rgb::off(),
    }
}

/// Whether a color is too pale or too dark to be shown as a pure hue.
pub fn prefers_white(color: Color) -> bool {
    let saturation = (color.saturation() * 100.0) as i32;
    let luminosity = (color.luminosity() * 100.0) as i32;
    saturation < TRUE_COLOR_THRESHOLD || luminosity < TRUE_COLOR_THRESHOLD
}

/// Brightness percentage that represents a color's luminosity
pub fn luminosity_percentage(color: Color) -> i32 {
    (color.luminosity() * 100.0) as i32
}

/// RGBW bulb opcodes
pub mod rgbw {
    use super::{brightness_to_byte, hue_to_byte, prefers_white, luminosity_percentage, Command};
    use crate::color::Color;
    use crate::target::Group;

    const ON: [u8; 5] = [0x42, 0x45, 0x47, 0x49, 0x4B];
    const OFF: [u8; 5] = [0x41, 0x46, 0x48, 0x4A, 0x4C];
    const WHITE: [u8; 5] = [0xC2, 0xC5, 0xC7, 0xC9, 0xCB];
    const NIGHT: [u8; 5] = [0xC1, 0xC6, 0xC8, 0xCA, 0xCC];

    pub const HUE: u8 = 0x40;
    pub const BRIGHTNESS: u8 = 0x4E;
    pub const MODE: u8 = 0x4D;
    pub const SPEED_UP: u8 = 0x44;
    pub const SPEED_DOWN: u8 = 0x43;

    pub fn on(group: Group) -> Command {
        Command::new(ON[group.index()])
    }

    pub fn off(group: Group) -> Command {
        Command::new(OFF[group.index()])
    }

    pub fn white(group: Group) -> Command {
        Command::new(WHITE[group.index()])
    }

    /// Night mode rides on the group's off opcode with the night byte as parameter.
    pub fn night(group: Group) -> Command {
        Command::with_param(OFF[group.index()], NIGHT[group.index()])
    }

    pub fn hue(hue: f32) -> Command {
        Command::with_param(HUE, hue_to_byte(hue))
    }

    pub fn brightness(percentage: i32) -> Command {
        Command::with_param(BRIGHTNESS, brightness_to_byte(percentage))
    }

    pub fn cycle_mode() -> Command {
        Command::new(MODE)
    }

    pub fn speed_up() -> Command {
        Command::new(SPEED_UP)
    }

    pub fn speed_down() -> Command {
        Command::new(SPEED_DOWN)
    }

    /// Hue or white command followed by a brightness command.
    ///
    /// Group selection is not included; callers prepend it when needed.
    pub fn true_color(group: Group, color: Color) -> [Command; 2] {
        let tint = if prefers_white(color) {
            white(group)
        } else {
            hue(color.hue())
        };
        [tint, brightness(luminosity_percentage(color))]
    }
}

/// Tunable white bulb opcodes
pub mod white {
    use super::Command;
    use crate::target::Group;

    const ON: [u8; 5] = [0x45, 0x38, 0x3D, 0x37, 0x32];
    const OFF: [u8; 5] = [0x39, 0x3B, 0x33, 0x3A, 0x36];

    pub const BRIGHTNESS_UP: u8 = 0x3C;
    pub const BRIGHTNESS_DOWN: u8 = 0x34;
    pub const WARMER: u8 = 0x3E;
    pub const COOLER: u8 = 0x3F;

    pub fn on(group: Group) -> Command {
        Command::new(ON[group.index()])
    }

    pub fn off(group: Group) -> Command {
        Command::new(OFF[group.index()])
    }

    pub fn brightness_up() -> Command {
        Command::new(BRIGHTNESS_UP)
    }

    pub fn brightness_down() -> Command {
        Command::new(BRIGHTNESS_DOWN)
    }

    pub fn warmer() -> Command {
        Command::new(WARMER)
    }

    pub fn cooler() -> Command {
        Command::new(COOLER)
    }
}

/// Legacy RGB bulb and strip opcodes (no groups)
pub mod rgb {
    use super::{hue_to_byte, Command};

    pub const ON: u8 = 0x22;
    pub const OFF: u8 = 0x21;
    pub const BRIGHTNESS_UP: u8 = 0x23;
    pub const BRIGHTNESS_DOWN: u8 = 0x24;
    pub const HUE: u8 = 0x20;
    pub const NEXT_EFFECT: u8 = 0x27;
    pub const PREVIOUS_EFFECT: u8 = 0x28;
    pub const SPEED_UP: u8 = 0x25;
    pub const SPEED_DOWN: u8 = 0x26;

    pub fn on() -> Command {
        Command::new(ON)
    }

    pub fn off() -> Command {
        Command::new(OFF)
    }

    pub fn brightness_up() -> Command {
        Command::new(BRIGHTNESS_UP)
    }

    pub fn brightness_down() -> Command {
        Command::new(BRIGHTNESS_DOWN)
    }

    pub fn hue(hue: f32) -> Command {
        Command::with_param(HUE, hue_to_byte(hue))
    }

    pub fn next_effect() -> Command {
        Command::new(NEXT_EFFECT)
    }

    pub fn previous_effect() -> Command {
        Command::new(PREVIOUS_EFFECT)
    }

    pub fn speed_up() -> Command {
        Command::new(SPEED_UP)
    }

    pub fn speed_down() -> Command {
        Command::new(SPEED_DOWN)
    }
}
