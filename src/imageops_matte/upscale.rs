use image::Luma;
use imageproc::definitions::Image;

use crate::error::FilterError;
use crate::utils::{generate_alpha, round_to_u8, validate_non_empty};

/// Maps destination pixel coordinates back onto a source grid.
///
/// `src = dst / (dst_size / src_size)`, so pixel centres are not shifted
/// and the first row and column map exactly onto the source's first row
/// and column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMapping {
    scale_x: f32,
    scale_y: f32,
}

impl GridMapping {
    pub fn new(src: (u32, u32), dst: (u32, u32)) -> Self {
        Self {
            scale_x: dst.0 as f32 / src.0 as f32,
            scale_y: dst.1 as f32 / src.1 as f32,
        }
    }

    #[inline]
    pub fn source_x(&self, x: u32) -> f32 {
        x as f32 / self.scale_x
    }

    #[inline]
    pub fn source_y(&self, y: u32) -> f32 {
        y as f32 / self.scale_y
    }
}

/// Bilinearly samples `alpha` at fractional source coordinates.
///
/// Coordinates are clamped into the grid and the right/bottom neighbours
/// are clamped to the last column/row. `alpha` must be non-empty.
#[inline]
pub fn sample_bilinear(alpha: &Image<Luma<u8>>, src_x: f32, src_y: f32) -> f32 {
    let (width, height) = alpha.dimensions();
    let sx = src_x.clamp(0.0, (width - 1) as f32);
    let sy = src_y.clamp(0.0, (height - 1) as f32);

    let x0 = sx.floor() as u32;
    let y0 = sy.floor() as u32;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let fx = sx - x0 as f32;
    let fy = sy - y0 as f32;

    let at = |x: u32, y: u32| f32::from(alpha.get_pixel(x, y)[0]);
    let top = lerp(at(x0, y0), at(x1, y0), fx);
    let bottom = lerp(at(x0, y1), at(x1, y1), fx);
    lerp(top, bottom, fy)
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (b - a).mul_add(t, a)
}

/// Trait for resampling an alpha buffer onto another resolution.
///
/// The operation produces a buffer with different dimensions, so there is
/// no `_mut` variant.
pub trait UpscaleAlphaExt {
    /// Bilinearly resamples the alpha buffer to `width` x `height`
    ///
    /// # Errors
    ///
    /// * `FilterError::EmptyImage` - When either the source or the target is empty
    /// * `FilterError::BufferAllocationFailed` - When the target buffer cannot be allocated
    ///
    /// # Examples
    ///
    /// ```
    /// use imageops_matte::{Image, UpscaleAlphaExt};
    /// use image::Luma;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let alpha: Image<Luma<u8>> = Image::from_pixel(16, 9, Luma([200]));
    /// let upscaled = alpha.upscale_alpha(64, 36)?;
    /// assert_eq!(upscaled.dimensions(), (64, 36));
    /// # Ok(())
    /// # }
    /// ```
    fn upscale_alpha(&self, width: u32, height: u32) -> Result<Image<Luma<u8>>, FilterError>;
}

impl UpscaleAlphaExt for Image<Luma<u8>> {
    fn upscale_alpha(&self, width: u32, height: u32) -> Result<Self, FilterError> {
        let (src_width, src_height) = self.dimensions();
        validate_non_empty(src_width, src_height)?;
        validate_non_empty(width, height)?;

        let mapping = GridMapping::new((src_width, src_height), (width, height));

        generate_alpha(width, height, |x, y| {
            round_to_u8(sample_bilinear(
                self,
                mapping.source_x(x),
                mapping.source_y(y),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_matches_requested_dimensions() {
        let alpha: Image<Luma<u8>> = Image::from_pixel(10, 7, Luma([128]));
        for (width, height) in [(10, 7), (20, 14), (33, 5), (3, 100)] {
            let upscaled = alpha.upscale_alpha(width, height).unwrap();
            assert_eq!(upscaled.dimensions(), (width, height));
        }
    }

    #[test]
    fn doubling_interpolates_between_samples() {
        let alpha: Image<Luma<u8>> =
            Image::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { 200 }]));

        let upscaled = alpha.upscale_alpha(4, 1).unwrap();
        let row: Vec<u8> = (0..4).map(|x| upscaled.get_pixel(x, 0)[0]).collect();

        // src_x = 0, 0.5, 1.0, 1.5 (clamped to 1.0)
        assert_eq!(row, vec![0, 100, 200, 200]);
    }

    #[test]
    fn same_size_is_identity() {
        let alpha: Image<Luma<u8>> = Image::from_fn(5, 4, |x, y| Luma([(x * 50 + y * 3) as u8]));
        let resampled = alpha.upscale_alpha(5, 4).unwrap();
        assert_eq!(resampled, alpha);
    }

    #[test]
    fn single_pixel_source_fills_target() {
        let alpha: Image<Luma<u8>> = Image::from_pixel(1, 1, Luma([42]));
        let upscaled = alpha.upscale_alpha(8, 8).unwrap();
        assert!(upscaled.pixels().all(|p| p[0] == 42));
    }

    #[test]
    fn empty_target_is_rejected() {
        let alpha: Image<Luma<u8>> = Image::from_pixel(2, 2, Luma([1]));
        assert!(matches!(
            alpha.upscale_alpha(0, 4),
            Err(FilterError::EmptyImage { .. })
        ));
    }

    #[test]
    fn grid_mapping_scales_by_ratio() {
        let mapping = GridMapping::new((1024, 512), (2048, 2048));
        assert_eq!(mapping.source_x(2046), 1023.0);
        assert_eq!(mapping.source_y(4), 1.0);
    }
}
