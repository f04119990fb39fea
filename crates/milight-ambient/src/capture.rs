//! Monitor capture
//!
//! [`MonitorSource`] grabs frames from a physical monitor via `xcap` when the
//! `screen-capture` feature is enabled. Without it, construction fails with
//! [`AmbientError::FeatureNotEnabled`] so callers can report a clear error.
//! Region coordinates are relative to the monitor's top-left corner.

use image::RgbaImage;

use crate::error::{AmbientError, Result};
use crate::grid::CaptureRegion;
use crate::sampler::FrameSource;

/// Name and geometry of an attached monitor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorInfo {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub is_primary: bool,
}

impl MonitorInfo {
    /// The whole monitor as a capture region
    pub fn bounds(&self) -> CaptureRegion {
        CaptureRegion::sized(self.width, self.height)
    }
}

impl std::fmt::Display for MonitorInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}x{}", self.name, self.width, self.height)?;
        if self.is_primary {
            write!(f, " (primary)")?;
        }
        Ok(())
    }
}

/// Crop a captured monitor frame to `region`, clamped to the frame.
fn crop(frame: &RgbaImage, region: &CaptureRegion) -> Result<RgbaImage> {
    let x = region.x.max(0) as u32;
    let y = region.y.max(0) as u32;
    if x >= frame.width() || y >= frame.height() {
        return Err(AmbientError::InvalidParameter(format!(
            "capture region at ({}, {}) lies outside the {}x{} monitor",
            region.x,
            region.y,
            frame.width(),
            frame.height()
        )));
    }
    if x == 0 && y == 0 && region.width == frame.width() && region.height == frame.height() {
        return Ok(frame.clone());
    }
    Ok(image::imageops::crop_imm(frame, x, y, region.width, region.height).to_image())
}

#[cfg(feature = "screen-capture")]
mod monitor {
    use super::*;
    use xcap::Monitor;

    /// Frames from one attached monitor
    pub struct MonitorSource {
        monitor: Monitor,
        info: MonitorInfo,
    }

    impl MonitorSource {
        /// The primary monitor, or the first one if none is marked primary
        pub fn primary() -> Result<Self> {
            let mut monitors = all_monitors()?;
            if monitors.is_empty() {
                return Err(AmbientError::NoMonitor("no monitors attached".to_string()));
            }
            let index = monitors.iter().position(|m| m.is_primary()).unwrap_or(0);
            Ok(Self::from_monitor(monitors.swap_remove(index)))
        }

        /// The monitor with the given name
        pub fn named(name: &str) -> Result<Self> {
            all_monitors()?
                .into_iter()
                .find(|m| m.name() == name)
                .map(Self::from_monitor)
                .ok_or_else(|| AmbientError::NoMonitor(format!("no monitor named '{}'", name)))
        }

        /// Attached monitors
        pub fn list() -> Result<Vec<MonitorInfo>> {
            Ok(all_monitors()?.iter().map(describe).collect())
        }

        pub fn info(&self) -> &MonitorInfo {
            &self.info
        }

        fn from_monitor(monitor: Monitor) -> Self {
            let info = describe(&monitor);
            tracing::info!(
                "Capturing monitor '{}' ({}x{})",
                info.name,
                info.width,
                info.height
            );
            Self { monitor, info }
        }
    }

    fn all_monitors() -> Result<Vec<Monitor>> {
        Monitor::all().map_err(|e| AmbientError::Capture(format!("listing monitors: {}", e)))
    }

    fn describe(monitor: &Monitor) -> MonitorInfo {
        MonitorInfo {
            name: monitor.name().to_string(),
            width: monitor.width(),
            height: monitor.height(),
            is_primary: monitor.is_primary(),
        }
    }

    impl FrameSource for MonitorSource {
        fn capture(&mut self, region: &CaptureRegion) -> Result<RgbaImage> {
            let shot = self
                .monitor
                .capture_image()
                .map_err(|e| AmbientError::Capture(e.to_string()))?;
            let (width, height) = (shot.width(), shot.height());
            // xcap may link a different `image` release; go through the raw buffer
            let frame = RgbaImage::from_raw(width, height, shot.into_raw()).ok_or_else(|| {
                AmbientError::Capture(format!("malformed {}x{} frame", width, height))
            })?;
            crop(&frame, region)
        }
    }
}

#[cfg(not(feature = "screen-capture"))]
mod monitor {
    use super::*;

    /// Frames from one attached monitor (requires the `screen-capture` feature)
    pub struct MonitorSource {
        info: MonitorInfo,
    }

    impl MonitorSource {
        pub fn primary() -> Result<Self> {
            Err(disabled())
        }

        pub fn named(_name: &str) -> Result<Self> {
            Err(disabled())
        }

        pub fn list() -> Result<Vec<MonitorInfo>> {
            Err(disabled())
        }

        pub fn info(&self) -> &MonitorInfo {
            &self.info
        }
    }

    impl FrameSource for MonitorSource {
        fn capture(&mut self, _region: &CaptureRegion) -> Result<RgbaImage> {
            Err(disabled())
        }
    }

    fn disabled() -> AmbientError {
        AmbientError::FeatureNotEnabled(
            "screen capture requires building with the `screen-capture` feature".to_string(),
        )
    }
}

pub use monitor::MonitorSource;
