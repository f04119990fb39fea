//! MiLight Ambient - screen-driven ambient lighting
//!
//! This crate turns what is on screen into bulb colors:
//! - **Sampling**: sparse grid over a capture region, plain or boosted averaging, smoothing
//! - **Capture**: monitor frames via `xcap` (feature `screen-capture`)
//! - **Driver**: cancellable sample-and-send loop for one RGBW group
//!
//! ## Feature Flags
//!
//! - `screen-capture`: Enable monitor capture (requires `xcap`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use milight_ambient::{AmbientConfig, AmbientDriver, MonitorSource, ScreenColor};
//! use milight_control::{Controller, Receiver};
//!
//! # fn main() -> milight_ambient::Result<()> {
//! let monitor = MonitorSource::primary()?;
//! let region = monitor.info().bounds();
//! let sampler = ScreenColor::new(monitor, region);
//! let controller = Controller::connect(Receiver::parse("192.168.1.40")?)?;
//!
//! let handle = AmbientDriver::new(sampler, controller, AmbientConfig::default())?.spawn()?;
//! std::thread::sleep(std::time::Duration::from_secs(10));
//! let exit = handle.stop()?;
//! exit.result?;
//! # Ok(())
//! # }
//! ```

#![allow(missing_docs)]

/// Monitor frame capture
pub mod capture;
/// Ambient loop
pub mod driver;
/// Error types
pub mod error;
/// Capture region and sampling lattice
pub mod grid;
/// Color averaging
pub mod sampler;

// Re-exports
pub use capture::{MonitorInfo, MonitorSource};
pub use driver::{
    AmbientConfig, AmbientDriver, AmbientExit, AmbientHandle, CancellationToken, DEFAULT_PERIOD,
};
pub use error::{AmbientError, Result};
pub use grid::{CaptureRegion, SampleGrid, DEFAULT_STRIDE};
pub use sampler::{AveragingMethod, ColorSource, FrameSource, ScreenColor};
