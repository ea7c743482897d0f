use std::borrow::Cow;

use image::{imageops, imageops::FilterType, Rgba};
use imageproc::definitions::Image;

use crate::error::FilterError;
use crate::utils::validate_non_empty;

/// Computes the processing-resolution size for an image.
///
/// The longest side is clamped into `[min_size, max_size]` and the other
/// side follows the aspect ratio (at least 1 pixel). Images already in
/// range keep their size.
///
/// # Errors
///
/// * `FilterError::EmptyImage` - When the image has a zero dimension
///
/// # Examples
///
/// ```
/// use imageops_matte::processing_dimensions;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// assert_eq!(processing_dimensions(4000, 3000, 512, 1024)?, (1024, 768));
/// assert_eq!(processing_dimensions(200, 100, 512, 1024)?, (512, 256));
/// assert_eq!(processing_dimensions(800, 600, 512, 1024)?, (800, 600));
/// # Ok(())
/// # }
/// ```
pub fn processing_dimensions(
    width: u32,
    height: u32,
    min_size: u32,
    max_size: u32,
) -> Result<(u32, u32), FilterError> {
    validate_non_empty(width, height)?;

    let longest = width.max(height);
    let target = longest.clamp(min_size.min(max_size), max_size.max(min_size));
    if target == longest {
        return Ok((width, height));
    }

    let scale = f64::from(target) / f64::from(longest);
    let scaled = |side: u32| {
        if side == longest {
            target
        } else {
            ((f64::from(side) * scale).round() as u32).max(1)
        }
    };

    Ok((scaled(width), scaled(height)))
}

/// Resizes an image to its processing resolution.
///
/// Returns the input unchanged (borrowed) when it is already in range.
/// Both down- and upscaling use a triangle (bilinear) filter.
///
/// # Errors
///
/// * `FilterError::EmptyImage` - When the image has a zero dimension
pub fn to_processing_resolution(
    image: &Image<Rgba<u8>>,
    min_size: u32,
    max_size: u32,
) -> Result<Cow<'_, Image<Rgba<u8>>>, FilterError> {
    let (width, height) = image.dimensions();
    let (target_width, target_height) = processing_dimensions(width, height, min_size, max_size)?;

    if (target_width, target_height) == (width, height) {
        return Ok(Cow::Borrowed(image));
    }

    tracing::debug!(
        from = %format!("{width}x{height}"),
        to = %format!("{target_width}x{target_height}"),
        "resizing to processing resolution"
    );

    Ok(Cow::Owned(imageops::resize(
        image,
        target_width,
        target_height,
        FilterType::Triangle,
    )))
}
