//! Gaussian edge feathering.
//!
//! Each output alpha is the Gaussian-weighted mean of the in-bounds
//! neighbours within a circular footprint:
//!
//! ```text
//! w(d)     = exp(-d² / (2σ²))
//! alpha'_i = Σ w(d_ij) · alpha_j / Σ w(d_ij)
//! ```
//!
//! The weights are normalised per pixel, so uniform regions keep their
//! value exactly (up to rounding) even next to the image border.

use image::Luma;
use imageproc::definitions::Image;

use crate::error::FilterError;
use crate::utils::{generate_alpha, round_to_u8, validate_non_empty, validate_radius, Footprint};

/// Trait for softening hard alpha edges with a Gaussian kernel.
pub trait FeatherMatteExt {
    /// Applies Gaussian feathering
    ///
    /// This consumes the original image.
    ///
    /// # Arguments
    ///
    /// * `radius` - Footprint radius in pixels
    /// * `sigma` - Standard deviation of the Gaussian weights
    ///
    /// # Errors
    ///
    /// * `FilterError::InvalidRadius` - When the radius is negative or not finite
    /// * `FilterError::InvalidSigma` - When sigma is not strictly positive
    /// * `FilterError::EmptyImage` - When the buffer has a zero dimension
    fn feather_matte(self, radius: f32, sigma: f32) -> Result<Image<Luma<u8>>, FilterError>;

    /// Applies Gaussian feathering in-place
    fn feather_matte_mut(&mut self, radius: f32, sigma: f32) -> Result<&mut Self, FilterError>;
}

impl FeatherMatteExt for Image<Luma<u8>> {
    fn feather_matte(self, radius: f32, sigma: f32) -> Result<Self, FilterError> {
        feather(&self, radius, sigma)
    }

    fn feather_matte_mut(&mut self, radius: f32, sigma: f32) -> Result<&mut Self, FilterError> {
        *self = feather(self, radius, sigma)?;
        Ok(self)
    }
}

fn feather(
    alpha: &Image<Luma<u8>>,
    radius: f32,
    sigma: f32,
) -> Result<Image<Luma<u8>>, FilterError> {
    validate_radius(radius)?;
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(FilterError::InvalidSigma { sigma });
    }
    let (width, height) = alpha.dimensions();
    validate_non_empty(width, height)?;

    let footprint = Footprint::circular(radius);
    let inv_two_sigma_sq = 1.0 / (2.0 * sigma * sigma);
    let weights: Vec<f32> = footprint
        .taps()
        .iter()
        .map(|tap| (-tap.distance_sq * inv_two_sigma_sq).exp())
        .collect();
    tracing::trace!(radius, sigma, taps = footprint.len(), "feathering");

    generate_alpha(width, height, |x, y| {
        let (sum, total_weight) = footprint.neighbours(x, y, width, height).fold(
            (0.0f32, 0.0f32),
            |(sum, total), (nx, ny, index)| {
                let weight = weights[index];
                let value = f32::from(alpha.get_pixel(nx, ny)[0]);
                (weight.mul_add(value, sum), total + weight)
            },
        );

        if total_weight > 0.0 {
            round_to_u8(sum / total_weight)
        } else {
            alpha.get_pixel(x, y)[0]
        }
    })
}
