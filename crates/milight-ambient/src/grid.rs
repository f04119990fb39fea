//! Capture region and sampling lattice

use serde::{Deserialize, Serialize};

use crate::error::{AmbientError, Result};

/// Default spacing between sampled pixels
pub const DEFAULT_STRIDE: u32 = 100;

/// Rectangle of the desktop to sample, in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Region of the given size at the origin
    pub fn sized(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Center point, relative to the region
    pub fn center(&self) -> (u32, u32) {
        (self.width / 2, self.height / 2)
    }
}

/// Points sampled from each frame, relative to the region's top-left corner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleGrid {
    region: CaptureRegion,
    stride: u32,
    points: Vec<(u32, u32)>,
}

impl SampleGrid {
    /// Lattice at `stride, 2*stride, ...` on both axes, strictly inside the region.
    ///
    /// A region smaller than the stride yields only its center point.
    pub fn new(region: CaptureRegion, stride: u32) -> Result<Self> {
        if stride == 0 {
            return Err(AmbientError::InvalidParameter(
                "grid stride must be at least 1".to_string(),
            ));
        }
        if region.is_empty() {
            return Err(AmbientError::InvalidParameter(format!(
                "capture region {}x{} is empty",
                region.width, region.height
            )));
        }

        let step = stride as usize;
        let mut points: Vec<(u32, u32)> = (stride..region.width)
            .step_by(step)
            .flat_map(|x| (stride..region.height).step_by(step).map(move |y| (x, y)))
            .collect();

        if points.is_empty() {
            points.push(region.center());
        }

        Ok(Self {
            region,
            stride,
            points,
        })
    }

    pub fn region(&self) -> CaptureRegion {
        self.region
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn points(&self) -> &[(u32, u32)] {
        &self.points
    }

    /// Number of sampled points; never zero
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
