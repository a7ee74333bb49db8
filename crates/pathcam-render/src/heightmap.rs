//! Raster heightmap sampling
//!
//! Loads a grayscale raster once and interpolates a Z offset for
//! arbitrary (x, y) coordinates. Pixel values normalize to [0, 1]
//! (8-bit and 16-bit sources both supported) and are scaled into work
//! units by the configured scale factor. Document coordinates map 1:1
//! onto the raster grid; coordinates outside the raster clamp to the
//! nearest edge, so sampling never fails.

use std::path::Path;

use pathcam_core::error::{ResourceError, Result};

/// Maximum recursion depth for tolerance-driven segment subdivision.
///
/// The available material does not specify a limit, so it is exposed
/// here as a bounded constant: each level halves the segment, so depth
/// 10 refines a segment down to 1/1024 of its original length.
pub const MAX_SUBDIVISION_DEPTH: u32 = 10;

/// An immutable raster of normalized height samples
#[derive(Debug, Clone)]
pub struct RasterHeightMap {
    width: u32,
    height: u32,
    samples: Vec<f32>,
    scale: f64,
    tolerance: f64,
}

impl RasterHeightMap {
    /// Load a heightmap from a grayscale image file
    ///
    /// Fails with a [`ResourceError`] if the file is missing, is not a
    /// readable image, or contains no pixels. Loading happens once,
    /// before any command is emitted.
    pub fn from_path(path: &Path) -> Result<Self> {
        let image = image::open(path).map_err(|e| ResourceError::HeightMapLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let luma = image.to_luma16();
        let (width, height) = luma.dimensions();

        if width == 0 || height == 0 {
            return Err(ResourceError::EmptyHeightMap {
                path: path.display().to_string(),
            }
            .into());
        }

        let samples = luma
            .pixels()
            .map(|pixel| pixel.0[0] as f32 / u16::MAX as f32)
            .collect();

        Ok(Self {
            width,
            height,
            samples,
            scale: 1.0,
            tolerance: 0.01,
        })
    }

    /// Create a heightmap from normalized samples in row-major order
    ///
    /// # Panics
    ///
    /// Panics if the raster is empty or the sample count does not
    /// match `width * height`.
    pub fn from_samples(width: u32, height: u32, samples: Vec<f32>) -> Self {
        assert!(width > 0 && height > 0, "raster must be non-empty");
        assert_eq!(
            samples.len(),
            (width as usize) * (height as usize),
            "sample count must match raster dimensions"
        );
        Self {
            width,
            height,
            samples,
            scale: 1.0,
            tolerance: 0.01,
        }
    }

    /// Set the scale from normalized values to work units
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Set the Z deviation threshold for segment subdivision
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.tolerance = tolerance;
    }

    /// The configured Z scale factor
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// The configured subdivision tolerance
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Raster dimensions in samples
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Interpolated Z offset at (x, y), in work units
    ///
    /// Bilinear interpolation between the four neighboring samples;
    /// out-of-bounds coordinates clamp to the raster edge.
    pub fn sample(&self, x: f64, y: f64) -> f64 {
        let fx = x.clamp(0.0, (self.width - 1) as f64);
        let fy = y.clamp(0.0, (self.height - 1) as f64);

        let x0 = fx.floor() as u32;
        let y0 = fy.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let tx = fx - x0 as f64;
        let ty = fy - y0 as f64;

        let at =
            |x: u32, y: u32| self.samples[y as usize * self.width as usize + x as usize] as f64;

        let top = at(x0, y0) * (1.0 - tx) + at(x1, y0) * tx;
        let bottom = at(x0, y1) * (1.0 - tx) + at(x1, y1) * tx;

        self.scale * (top * (1.0 - ty) + bottom * ty)
    }
}
