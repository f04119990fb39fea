//! Bulb family controls
//!
//! A [`Controller`] owns the command sink and the group selection state for
//! one receiver. Family views ([`RgbwLights`], [`WhiteLights`], [`RgbLights`])
//! borrow it mutably, so all commands for a receiver go through a single
//! writer and the selection cache always matches what was sent.
//!
//! ```rust,no_run
//! use milight_control::{Color, Controller, Lights, Receiver};
//!
//! # fn main() -> milight_control::Result<()> {
//! let mut controller = Controller::connect(Receiver::parse("192.168.1.40")?)?;
//! controller.rgbw().switch_on(1)?;
//! controller.rgbw().set_true_color(1, Color::new(255, 120, 0))?;
//! controller.white().warmer(2)?;
//! # Ok(())
//! # }
//! ```

use crate::address::AddressBook;
use crate::codec::{self, Command};
use crate::color::Color;
use crate::link::ControllerLink;
use crate::receiver::Receiver;
use crate::sink::CommandSink;
use crate::target::{Family, Group};
use crate::Result;

/// Operations every bulb family supports
pub trait Lights {
    fn family(&self) -> Family;

    /// Switch a group on (0 = all groups). Also selects the group.
    fn switch_on(&mut self, group: u8) -> Result<()>;

    /// Switch a group off (0 = all groups)
    fn switch_off(&mut self, group: u8) -> Result<()>;
}

/// Protocol state and transport for one receiver
#[derive(Debug)]
pub struct Controller<S: CommandSink = ControllerLink> {
    sink: S,
    addresses: AddressBook,
}

impl Controller<ControllerLink> {
    /// Open a UDP link to a receiver.
    pub fn connect(receiver: Receiver) -> Result<Self> {
        Ok(Self::new(ControllerLink::connect(receiver)?))
    }

    /// The receiver this controller talks to
    pub fn receiver(&self) -> &Receiver {
        self.sink.receiver()
    }
}

impl<S: CommandSink> Controller<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            addresses: AddressBook::new(),
        }
    }

    pub fn rgbw(&mut self) -> RgbwLights<'_, S> {
        RgbwLights { controller: self }
    }

    pub fn white(&mut self) -> WhiteLights<'_, S> {
        WhiteLights { controller: self }
    }

    pub fn rgb(&mut self) -> RgbLights<'_, S> {
        RgbLights { controller: self }
    }

    /// Family view as a trait object, for code that only needs on/off
    pub fn lights(&mut self, family: Family) -> Box<dyn Lights + '_> {
        match family {
            Family::Rgbw => Box::new(self.rgbw()),
            Family::White => Box::new(self.white()),
            Family::RgbLegacy => Box::new(self.rgb()),
        }
    }

    /// Switch on every group of every family
    pub fn all_on(&mut self) -> Result<()> {
        for family in Family::ALL {
            self.lights(family).switch_on(0)?;
        }
        Ok(())
    }

    /// Switch off every group of every family
    pub fn all_off(&mut self) -> Result<()> {
        for family in Family::ALL {
            self.lights(family).switch_off(0)?;
        }
        Ok(())
    }

    /// RGBW to white, white bulbs on, legacy RGB to the hue of white
    pub fn all_white(&mut self) -> Result<()> {
        self.rgbw().switch_white(0)?;
        self.white().switch_on(0)?;
        self.rgb().set_color(Color::WHITE)
    }

    /// Set the hue of a color on all RGBW groups and legacy RGB bulbs
    pub fn all_color(&mut self, color: Color) -> Result<()> {
        self.rgbw().set_color(0, color)?;
        self.rgb().set_color(color)
    }

    /// Set a hue on all RGBW groups and legacy RGB bulbs
    pub fn all_hue(&mut self, hue: f32) -> Result<()> {
        self.rgbw().set_hue(0, hue)?;
        self.rgb().set_hue(hue)
    }

    /// Group selection state
    pub fn addresses(&self) -> &AddressBook {
        &self.addresses
    }

    /// Forget group selections, e.g. after the receiver restarted
    pub fn reset_addresses(&mut self) {
        self.addresses.reset();
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn emit(&mut self, command: Command) -> Result<()> {
        tracing::debug!("Sending {:?}", command);
        self.sink.send(command)
    }

    /// Send a command that selects `group` as a side effect.
    fn emit_selecting(&mut self, family: Family, group: Group, command: Command) -> Result<()> {
        self.emit(command)?;
        self.addresses.record(family, group);
        Ok(())
    }

    /// Select `group` if needed, then send a group-scoped parameter command.
    fn emit_scoped(&mut self, family: Family, group: Group, command: Command) -> Result<()> {
        self.select(family, group)?;
        self.emit(command)
    }

    /// Send the select for `group` if needed. The previous selection is
    /// kept when the select fails to go out.
    fn select(&mut self, family: Family, group: Group) -> Result<()> {
        let previous = self.addresses.active(family);
        if let Some(select) = self.addresses.ensure_addressed(family, group) {
            tracing::trace!("Selecting {} {} first", family, group);
            if let Err(e) = self.emit(select) {
                self.addresses.restore(family, previous);
                return Err(e);
            }
        }
        Ok(())
    }
}

/// Controls for RGBW bulbs
pub struct RgbwLights<'a, S: CommandSink> {
    controller: &'a mut Controller<S>,
}

impl<S: CommandSink> RgbwLights<'_, S> {
    const FAMILY: Family = Family::Rgbw;

    /// Switch a group to its white LED
    pub fn switch_white(&mut self, group: u8) -> Result<()> {
        let group = Group::new(group)?;
        self.controller
            .emit_selecting(Self::FAMILY, group, codec::rgbw::white(group))
    }

    /// Switch a group to night light
    pub fn set_night_mode(&mut self, group: u8) -> Result<()> {
        let group = Group::new(group)?;
        self.controller.emit(codec::rgbw::night(group))
    }

    /// Brightness 0-100; out of range values are clamped
    pub fn set_brightness(&mut self, group: u8, percentage: i32) -> Result<()> {
        let group = Group::new(group)?;
        self.controller
            .emit_scoped(Self::FAMILY, group, codec::rgbw::brightness(percentage))
    }

    /// Hue in degrees. Saturation and brightness are left alone.
    pub fn set_hue(&mut self, group: u8, hue: f32) -> Result<()> {
        let group = Group::new(group)?;
        self.controller
            .emit_scoped(Self::FAMILY, group, codec::rgbw::hue(hue))
    }

    /// Hue of a color only; see [`set_true_color`](Self::set_true_color)
    pub fn set_color(&mut self, group: u8, color: Color) -> Result<()> {
        self.set_hue(group, color.hue())
    }

    /// Closest rendition of a color: hue or white, plus brightness.
    ///
    /// Colors with less than 15% saturation or luminosity are shown as white
    /// light at the color's luminosity.
    pub fn set_true_color(&mut self, group: u8, color: Color) -> Result<()> {
        let group = Group::new(group)?;
        self.controller.select(Self::FAMILY, group)?;
        let [tint, level] = codec::rgbw::true_color(group, color);
        self.controller.emit(tint)?;
        self.controller.emit(level)
    }

    /// Cycle through the built-in effect modes
    pub fn cycle_mode(&mut self, group: u8) -> Result<()> {
        let group = Group::new(group)?;
        self.controller
            .emit_scoped(Self::FAMILY, group, codec::rgbw::cycle_mode())
    }

    pub fn speed_up(&mut self, group: u8) -> Result<()> {
        let group = Group::new(group)?;
        self.controller
            .emit_scoped(Self::FAMILY, group, codec::rgbw::speed_up())
    }

    pub fn speed_down(&mut self, group: u8) -> Result<()> {
        let group = Group::new(group)?;
        self.controller
            .emit_scoped(Self::FAMILY, group, codec::rgbw::speed_down())
    }
}

impl<S: CommandSink> Lights for RgbwLights<'_, S> {
    fn family(&self) -> Family {
        Self::FAMILY
    }

    fn switch_on(&mut self, group: u8) -> Result<()> {
        let group = Group::new(group)?;
        self.controller
            .emit_selecting(Self::FAMILY, group, codec::rgbw::on(group))
    }

    fn switch_off(&mut self, group: u8) -> Result<()> {
        let group = Group::new(group)?;
        self.controller.emit(codec::rgbw::off(group))
    }
}

/// Controls for tunable white bulbs
pub struct WhiteLights<'a, S: CommandSink> {
    controller: &'a mut Controller<S>,
}

impl<S: CommandSink> WhiteLights<'_, S> {
    const FAMILY: Family = Family::White;

    pub fn brightness_up(&mut self, group: u8) -> Result<()> {
        self.scoped(group, codec::white::brightness_up())
    }

    pub fn brightness_down(&mut self, group: u8) -> Result<()> {
        self.scoped(group, codec::white::brightness_down())
    }

    /// One step towards warm white
    pub fn warmer(&mut self, group: u8) -> Result<()> {
        self.scoped(group, codec::white::warmer())
    }

    /// One step towards cool white
    pub fn cooler(&mut self, group: u8) -> Result<()> {
        self.scoped(group, codec::white::cooler())
    }

    fn scoped(&mut self, group: u8, command: Command) -> Result<()> {
        let group = Group::new(group)?;
        self.controller.emit_scoped(Self::FAMILY, group, command)
    }
}

impl<S: CommandSink> Lights for WhiteLights<'_, S> {
    fn family(&self) -> Family {
        Self::FAMILY
    }

    fn switch_on(&mut self, group: u8) -> Result<()> {
        let group = Group::new(group)?;
        self.controller
            .emit_selecting(Self::FAMILY, group, codec::white::on(group))
    }

    fn switch_off(&mut self, group: u8) -> Result<()> {
        let group = Group::new(group)?;
        self.controller.emit(codec::white::off(group))
    }
}

/// Controls for legacy RGB bulbs and strips. These have no groups.
pub struct RgbLights<'a, S: CommandSink> {
    controller: &'a mut Controller<S>,
}

impl<S: CommandSink> RgbLights<'_, S> {
    pub fn switch_on(&mut self) -> Result<()> {
        self.controller.emit(codec::rgb::on())
    }

    pub fn switch_off(&mut self) -> Result<()> {
        self.controller.emit(codec::rgb::off())
    }

    pub fn brightness_up(&mut self) -> Result<()> {
        self.controller.emit(codec::rgb::brightness_up())
    }

    pub fn brightness_down(&mut self) -> Result<()> {
        self.controller.emit(codec::rgb::brightness_down())
    }

    pub fn set_hue(&mut self, hue: f32) -> Result<()> {
        self.controller.emit(codec::rgb::hue(hue))
    }

    /// Hue of a color; brightness and saturation are not supported
    pub fn set_color(&mut self, color: Color) -> Result<()> {
        self.set_hue(color.hue())
    }

    pub fn next_effect(&mut self) -> Result<()> {
        self.controller.emit(codec::rgb::next_effect())
    }

    pub fn previous_effect(&mut self) -> Result<()> {
        self.controller.emit(codec::rgb::previous_effect())
    }

    pub fn speed_up(&mut self) -> Result<()> {
        self.controller.emit(codec::rgb::speed_up())
    }

    pub fn speed_down(&mut self) -> Result<()> {
        self.controller.emit(codec::rgb::speed_down())
    }
}

impl<S: CommandSink> Lights for RgbLights<'_, S> {
    fn family(&self) -> Family {
        Family::RgbLegacy
    }

    /// Validates the group, then switches on all legacy bulbs.
    fn switch_on(&mut self, group: u8) -> Result<()> {
        Group::new(group)?;
        self.controller.emit(codec::rgb::on())
    }

    fn switch_off(&mut self, group: u8) -> Result<()> {
        Group::new(group)?;
        self.controller.emit(codec::rgb::off())
    }
}
