//! MiLight Control - Wi-Fi bulb receiver protocol
//!
//! This crate speaks the MiLight / LimitlessLED receiver protocol:
//! - **Codec**: 3-byte commands for RGBW, white and legacy RGB bulbs
//! - **Addressing**: group selection tracking so parameter commands reach the right group
//! - **Pacing**: minimum spacing between commands, with an injectable clock
//! - **Link**: fire-and-forget UDP transport to a receiver
//! - **Discovery**: broadcast lookup of receivers on the local network
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use milight_control::{discovery, Color, Controller, Lights};
//!
//! # fn main() -> milight_control::Result<()> {
//! let receivers = discovery::discover()?;
//! if let Some(receiver) = receivers.into_iter().next() {
//!     let mut controller = Controller::connect(receiver)?;
//!     controller.rgbw().switch_on(0)?;
//!     controller.rgbw().set_true_color(0, Color::new(30, 90, 200))?;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`codec`] - Command encoding
//! - [`address`] - Group selection state
//! - [`lights`] - Controller and family views
//! - [`link`] - UDP transport
//! - [`pacing`] - Command spacing and clocks
//! - [`discovery`] - Receiver discovery
//! - [`error`] - Error types

#![allow(missing_docs)]

// Protocol
/// Group selection tracking
pub mod address;
/// Command encoding
pub mod codec;
/// RGB color and HSL views
pub mod color;
/// Error types
pub mod error;
/// Group and bulb family definitions
pub mod target;

// Transport
/// Receiver discovery
pub mod discovery;
/// Controller and bulb family views
pub mod lights;
/// UDP link to a receiver
pub mod link;
/// Command spacing
pub mod pacing;
/// Receiver settings
pub mod receiver;
/// Command destinations
pub mod sink;

// Re-exports
pub use address::AddressBook;
pub use codec::Command;
pub use color::Color;
pub use discovery::{discover, discover_with, DiscoveryConfig};
pub use error::{ControlError, Result};
pub use lights::{Controller, Lights, RgbLights, RgbwLights, WhiteLights};
pub use link::ControllerLink;
pub use pacing::{Clock, ManualClock, Pacer, SystemClock};
pub use receiver::Receiver;
pub use sink::{CommandSink, RecordingSink};
pub use target::{Family, Group};
