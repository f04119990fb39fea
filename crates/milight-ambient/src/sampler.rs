//! Screen color sampling
//!
//! [`ScreenColor`] captures a region through a [`FrameSource`], reads the
//! pixels on a sparse [`SampleGrid`], averages them and optionally pushes the
//! result away from gray and mid-brightness so the bulbs show a clear color.

use image::RgbaImage;
use milight_control::Color;
use serde::{Deserialize, Serialize};

use crate::error::{AmbientError, Result};
use crate::grid::{CaptureRegion, SampleGrid, DEFAULT_STRIDE};

/// Something that can grab the pixels of a screen region
pub trait FrameSource {
    /// Capture `region`. The returned image has the region's size, with
    /// pixel (0, 0) at the region's top-left corner.
    fn capture(&mut self, region: &CaptureRegion) -> Result<RgbaImage>;
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn capture(&mut self, region: &CaptureRegion) -> Result<RgbaImage> {
        (**self).capture(region)
    }
}

/// Something that produces one color per call
pub trait ColorSource {
    fn sample(&mut self) -> Result<Color>;
}

impl<T: ColorSource + ?Sized> ColorSource for Box<T> {
    fn sample(&mut self) -> Result<Color> {
        (**self).sample()
    }
}

/// How sampled pixels are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AveragingMethod {
    /// Arithmetic mean of each channel
    Plain,
    /// Mean, then saturation and luminosity pushed away from the middle
    #[default]
    Boosted,
}

impl std::str::FromStr for AveragingMethod {
    type Err = AmbientError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "plain" | "average" => Ok(Self::Plain),
            "boosted" | "boost" => Ok(Self::Boosted),
            other => Err(AmbientError::InvalidParameter(format!(
                "unknown averaging method '{}'",
                other
            ))),
        }
    }
}

/// `16 (s - 0.5)^5 + 0.5`: flat around the middle, steep towards the ends
pub fn boost_saturation(saturation: f32) -> f32 {
    16.0 * (saturation - 0.5).powi(5) + 0.5
}

/// `4 (l - 0.5)^3 + 0.5`
pub fn boost_luminosity(luminosity: f32) -> f32 {
    4.0 * (luminosity - 0.5).powi(3) + 0.5
}

/// Boosted rendition of a color; hue is kept.
pub fn boost(color: Color) -> Color {
    Color::from_hsl(
        color.hue(),
        boost_saturation(color.saturation()),
        boost_luminosity(color.luminosity()),
    )
}

/// Per-channel mean of the pixels at `points`, truncated.
///
/// Points outside the frame are skipped. Fails when no point lies inside.
pub fn average(frame: &RgbaImage, points: &[(u32, u32)]) -> Result<Color> {
    let (width, height) = frame.dimensions();
    let mut sum = [0u64; 3];
    let mut count = 0u64;

    for &(x, y) in points {
        if x >= width || y >= height {
            continue;
        }
        let pixel = frame.get_pixel(x, y);
        for (total, channel) in sum.iter_mut().zip(pixel.0.iter()) {
            *total += u64::from(*channel);
        }
        count += 1;
    }

    if count == 0 {
        return Err(AmbientError::Capture(format!(
            "frame {}x{} contains none of the {} sample points",
            width,
            height,
            points.len()
        )));
    }

    let mean = |total: u64| (total / count) as u8;
    Ok(Color::new(mean(sum[0]), mean(sum[1]), mean(sum[2])))
}

/// Average color of a screen region
pub struct ScreenColor<F: FrameSource> {
    source: F,
    region: CaptureRegion,
    stride: u32,
    method: AveragingMethod,
    smoothing: bool,
    previous: Option<Color>,
    grid: Option<SampleGrid>,
}

impl<F: FrameSource> ScreenColor<F> {
    /// Sampler with the default stride, boosted averaging and smoothing.
    pub fn new(source: F, region: CaptureRegion) -> Self {
        Self {
            source,
            region,
            stride: DEFAULT_STRIDE,
            method: AveragingMethod::default(),
            smoothing: true,
            previous: None,
            grid: None,
        }
    }

    pub fn with_stride(mut self, stride: u32) -> Self {
        self.set_stride(stride);
        self
    }

    pub fn with_method(mut self, method: AveragingMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_smoothing(mut self, smoothing: bool) -> Self {
        self.smoothing = smoothing;
        self
    }

    pub fn region(&self) -> CaptureRegion {
        self.region
    }

    pub fn set_region(&mut self, region: CaptureRegion) {
        if region != self.region {
            self.region = region;
            self.grid = None;
        }
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn set_stride(&mut self, stride: u32) {
        if stride != self.stride {
            self.stride = stride;
            self.grid = None;
        }
    }

    pub fn method(&self) -> AveragingMethod {
        self.method
    }

    pub fn set_method(&mut self, method: AveragingMethod) {
        self.method = method;
    }

    pub fn smoothing(&self) -> bool {
        self.smoothing
    }

    /// Turning smoothing off also forgets the previous color.
    pub fn set_smoothing(&mut self, smoothing: bool) {
        self.smoothing = smoothing;
        if !smoothing {
            self.previous = None;
        }
    }

    /// Number of pixels read per sample
    pub fn pixel_amount(&mut self) -> Result<usize> {
        Ok(self.grid()?.len())
    }

    /// Current sampling lattice, rebuilt if region or stride changed
    pub fn grid(&mut self) -> Result<&SampleGrid> {
        let stale = self
            .grid
            .as_ref()
            .map_or(true, |g| g.region() != self.region || g.stride() != self.stride);
        if stale {
            let grid = SampleGrid::new(self.region, self.stride)?;
            tracing::debug!(
                "Sample grid rebuilt: {} points over {}x{} (stride {})",
                grid.len(),
                self.region.width,
                self.region.height,
                self.stride
            );
            self.grid = Some(grid);
        }
        self.grid
            .as_ref()
            .ok_or_else(|| AmbientError::InvalidParameter("sample grid unavailable".to_string()))
    }

    pub fn source(&self) -> &F {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut F {
        &mut self.source
    }

    /// Capture, average and (optionally) boost and smooth one color.
    pub fn sample(&mut self) -> Result<Color> {
        let region = self.region;
        self.grid()?;
        let frame = self.source.capture(&region)?;
        let points = self.grid.as_ref().map(SampleGrid::points).unwrap_or_default();

        let mean = average(&frame, points)?;
        let color = match self.method {
            AveragingMethod::Plain => mean,
            AveragingMethod::Boosted => boost(mean),
        };

        let color = match (self.smoothing, self.previous) {
            (true, Some(previous)) => color.blend(previous),
            _ => color,
        };
        if self.smoothing {
            self.previous = Some(color);
        }

        tracing::trace!("Sampled {} (mean {})", color, mean);
        Ok(color)
    }
}

impl<F: FrameSource> ColorSource for ScreenColor<F> {
    fn sample(&mut self) -> Result<Color> {
        ScreenColor::sample(self)
    }
}

impl<F: FrameSource> std::fmt::Debug for ScreenColor<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScreenColor")
            .field("region", &self.region)
            .field("stride", &self.stride)
            .field("method", &self.method)
            .field("smoothing", &self.smoothing)
            .field("previous", &self.previous)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use proptest::prelude::*;

    /// Serves a queue of solid frames, repeating the last one
    struct SolidFrames {
        colors: Vec<[u8; 3]>,
        captures: usize,
    }

    impl SolidFrames {
        fn new(colors: &[[u8; 3]]) -> Self {
            Self {
                colors: colors.to_vec(),
                captures: 0,
            }
        }
    }

    impl FrameSource for SolidFrames {
        fn capture(&mut self, region: &CaptureRegion) -> Result<RgbaImage> {
            let index = self.captures.min(self.colors.len() - 1);
            self.captures += 1;
            let [r, g, b] = self.colors[index];
            Ok(RgbaImage::from_pixel(region.width, region.height, Rgba([r, g, b, 255])))
        }
    }

    fn region() -> CaptureRegion {
        CaptureRegion::sized(400, 300)
    }

    #[test]
    fn test_boost_fixed_points() {
        assert!((boost_saturation(0.5) - 0.5).abs() < 1e-6);
        assert!((boost_luminosity(0.5) - 0.5).abs() < 1e-6);
        assert!((boost_saturation(1.0) - 1.0).abs() < 1e-6);
        assert!((boost_saturation(0.0) - 0.0).abs() < 1e-6);
        assert!((boost_luminosity(1.0) - 1.0).abs() < 1e-6);
        assert!((boost_luminosity(0.0) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_plain_average_of_solid_frame() {
        let mut sampler = ScreenColor::new(SolidFrames::new(&[[10, 200, 30]]), region())
            .with_method(AveragingMethod::Plain)
            .with_smoothing(false);
        assert_eq!(sampler.sample().unwrap(), Color::new(10, 200, 30));
    }

    #[test]
    fn test_plain_average_truncates() {
        let mut frame = RgbaImage::from_pixel(4, 1, Rgba([0, 0, 0, 255]));
        frame.put_pixel(1, 0, Rgba([255, 1, 3, 255]));
        let color = average(&frame, &[(0, 0), (1, 0)]).unwrap();
        assert_eq!(color, Color::new(127, 0, 1));
    }

    #[test]
    fn test_average_skips_points_outside_frame() {
        let frame = RgbaImage::from_pixel(2, 2, Rgba([40, 50, 60, 255]));
        let color = average(&frame, &[(1, 1), (5, 5)]).unwrap();
        assert_eq!(color, Color::new(40, 50, 60));
        assert!(average(&frame, &[(9, 9)]).is_err());
    }

    #[test]
    fn test_boosted_keeps_mid_gray() {
        // 50% lightness and no saturation: luminosity is a fixed point
        let mut sampler = ScreenColor::new(SolidFrames::new(&[[128, 128, 128]]), region())
            .with_smoothing(false);
        let color = sampler.sample().unwrap();
        assert!(color.r.abs_diff(128) <= 1);
        assert_eq!(color.r, color.g);
        assert_eq!(color.g, color.b);
    }

    #[test]
    fn test_boosted_pulls_dark_towards_middle() {
        let mut sampler =
            ScreenColor::new(SolidFrames::new(&[[40, 10, 10]]), region()).with_smoothing(false);
        let plain = Color::new(40, 10, 10);
        let boosted = sampler.sample().unwrap();
        assert!(boosted.luminosity() > plain.luminosity());
    }

    #[test]
    fn test_first_sample_is_not_smoothed() {
        let mut sampler = ScreenColor::new(SolidFrames::new(&[[200, 100, 50], [0, 0, 0]]), region())
            .with_method(AveragingMethod::Plain);
        assert_eq!(sampler.sample().unwrap(), Color::new(200, 100, 50));
        assert_eq!(sampler.sample().unwrap(), Color::new(100, 50, 25));
        assert_eq!(sampler.sample().unwrap(), Color::new(50, 25, 12));
    }

    #[test]
    fn test_disabling_smoothing_forgets_history() {
        let mut sampler = ScreenColor::new(SolidFrames::new(&[[200, 100, 50], [0, 0, 0]]), region())
            .with_method(AveragingMethod::Plain);
        sampler.sample().unwrap();
        sampler.set_smoothing(false);
        sampler.set_smoothing(true);
        assert_eq!(sampler.sample().unwrap(), Color::BLACK);
    }

    #[test]
    fn test_pixel_amount_follows_region_and_stride() {
        let mut sampler = ScreenColor::new(SolidFrames::new(&[[0, 0, 0]]), region());
        assert_eq!(sampler.pixel_amount().unwrap(), 3 * 2);

        sampler.set_stride(50);
        assert_eq!(sampler.pixel_amount().unwrap(), 7 * 5);

        sampler.set_region(CaptureRegion::sized(40, 40));
        assert_eq!(sampler.pixel_amount().unwrap(), 1);
    }

    #[test]
    fn test_grid_is_cached() {
        let mut sampler = ScreenColor::new(SolidFrames::new(&[[0, 0, 0]]), region());
        let first = sampler.grid().unwrap().points().as_ptr();
        sampler.set_stride(100);
        sampler.set_region(region());
        let second = sampler.grid().unwrap().points().as_ptr();
        assert_eq!(first, second);
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!("plain".parse::<AveragingMethod>().unwrap(), AveragingMethod::Plain);
        assert_eq!("Boosted".parse::<AveragingMethod>().unwrap(), AveragingMethod::Boosted);
        assert!("sharp".parse::<AveragingMethod>().is_err());
    }

    proptest! {
        #[test]
        fn prop_boost_stays_in_unit_range(v in 0.0f32..=1.0) {
            let s = boost_saturation(v);
            let l = boost_luminosity(v);
            prop_assert!((0.0..=1.0).contains(&s));
            prop_assert!((0.0..=1.0).contains(&l));
        }

        #[test]
        fn prop_boost_is_monotonic(a in 0.0f32..=1.0, b in 0.0f32..=1.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(boost_saturation(lo) <= boost_saturation(hi));
            prop_assert!(boost_luminosity(lo) <= boost_luminosity(hi));
        }
    }
}
