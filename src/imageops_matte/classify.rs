//! Probability mask classification.
//!
//! Turns the per-pixel foreground probabilities produced by a segmentation
//! model into the first alpha generation. Two thresholds split probability
//! space into three bands:
//!
//! ```text
//! p <  threshold               -> 0            (background)
//! p >  edge_limit              -> 255          (foreground)
//! threshold <= p <= edge_limit -> smoothstep   (transition)
//! ```
//!
//! Inside the transition band the value is normalised to `t` in `[0, 1]` and
//! shaped with the Hermite smoothstep `t² (3 - 2t)`, which gives a soft
//! edge before any spatial filtering happens.

use image::Luma;
use imageproc::definitions::Image;

use crate::error::FilterError;
use crate::utils::{generate_alpha, round_to_u8, validate_non_empty};

/// Trait for classifying a probability mask into an alpha buffer.
///
/// This operation changes the pixel type (`Luma<f32>` -> `Luma<u8>`), so
/// there is no `_mut` variant.
pub trait ClassifyMaskExt {
    /// Classifies each probability into an alpha value
    ///
    /// # Arguments
    ///
    /// * `threshold` - Probabilities below this become fully transparent
    /// * `edge_limit` - Probabilities above this become fully opaque
    ///
    /// # Errors
    ///
    /// * `FilterError::InvalidThresholds` - Unless `0 <= threshold < edge_limit <= 1`
    /// * `FilterError::EmptyImage` - When the mask has a zero dimension
    ///
    /// # Examples
    ///
    /// ```
    /// use imageops_matte::{ClassifyMaskExt, Image};
    /// use image::Luma;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mask: Image<Luma<f32>> = Image::from_pixel(4, 4, Luma([0.9]));
    /// let alpha = mask.classify_mask(0.3, 0.7)?;
    /// assert_eq!(alpha.get_pixel(0, 0)[0], 255);
    /// # Ok(())
    /// # }
    /// ```
    fn classify_mask(&self, threshold: f32, edge_limit: f32)
        -> Result<Image<Luma<u8>>, FilterError>;
}

impl ClassifyMaskExt for Image<Luma<f32>> {
    fn classify_mask(
        &self,
        threshold: f32,
        edge_limit: f32,
    ) -> Result<Image<Luma<u8>>, FilterError> {
        validate_thresholds(threshold, edge_limit)?;

        let (width, height) = self.dimensions();
        validate_non_empty(width, height)?;

        generate_alpha(width, height, |x, y| {
            let Luma([probability]) = *self.get_pixel(x, y);
            classify_probability(probability, threshold, edge_limit)
        })
    }
}

/// Maps one probability to an alpha value.
///
/// NaN is treated as background. The thresholds are assumed valid.
#[inline]
pub fn classify_probability(probability: f32, threshold: f32, edge_limit: f32) -> u8 {
    if probability.is_nan() || probability < threshold {
        0
    } else if probability > edge_limit {
        255
    } else {
        let t = (probability - threshold) / (edge_limit - threshold);
        let s = t * t * 2.0f32.mul_add(-t, 3.0);
        round_to_u8(s * 255.0)
    }
}

/// Validates the classifier band boundaries.
pub fn validate_thresholds(threshold: f32, edge_limit: f32) -> Result<(), FilterError> {
    let valid = threshold.is_finite()
        && edge_limit.is_finite()
        && 0.0 <= threshold
        && threshold < edge_limit
        && edge_limit <= 1.0;

    if valid {
        Ok(())
    } else {
        Err(FilterError::InvalidThresholds {
            threshold,
            edge_limit,
        })
    }
}
