use image::Luma;
use imageproc::definitions::Image;

use crate::error::FilterError;
use crate::utils::{generate_alpha, round_to_u8, validate_non_empty, validate_radius, Footprint};

/// Trait for the small unweighted smoothing pass that follows feathering.
///
/// Each output pixel is the plain mean of the in-bounds neighbours whose
/// Euclidean distance is within the radius. With the usual radius of 1.2
/// that is the centre and its four orthogonal neighbours; diagonals
/// (distance √2) fall outside.
pub trait SmoothMatteExt {
    /// Applies the unweighted circular mean
    ///
    /// This consumes the original image.
    ///
    /// # Errors
    ///
    /// * `FilterError::InvalidRadius` - When the radius is negative or not finite
    /// * `FilterError::EmptyImage` - When the buffer has a zero dimension
    fn smooth_matte(self, radius: f32) -> Result<Image<Luma<u8>>, FilterError>;

    /// Applies the unweighted circular mean in-place
    fn smooth_matte_mut(&mut self, radius: f32) -> Result<&mut Self, FilterError>;
}

impl SmoothMatteExt for Image<Luma<u8>> {
    fn smooth_matte(self, radius: f32) -> Result<Self, FilterError> {
        smooth(&self, radius)
    }

    fn smooth_matte_mut(&mut self, radius: f32) -> Result<&mut Self, FilterError> {
        *self = smooth(self, radius)?;
        Ok(self)
    }
}

fn smooth(alpha: &Image<Luma<u8>>, radius: f32) -> Result<Image<Luma<u8>>, FilterError> {
    validate_radius(radius)?;
    let (width, height) = alpha.dimensions();
    validate_non_empty(width, height)?;

    let footprint = Footprint::circular(radius);

    generate_alpha(width, height, |x, y| {
        let (sum, count) = footprint
            .neighbours(x, y, width, height)
            .fold((0u32, 0u32), |(sum, count), (nx, ny, _)| {
                (sum + u32::from(alpha.get_pixel(nx, ny)[0]), count + 1)
            });

        if count > 0 {
            round_to_u8(sum as f32 / count as f32)
        } else {
            alpha.get_pixel(x, y)[0]
        }
    })
}
