use image::{ImageBuffer, Luma, Rgba};
use imageproc::definitions::Image;

use crate::error::FilterError;
use crate::imageops_matte::decontaminate::decontaminate_pixel;
use crate::imageops_matte::upscale::{sample_bilinear, GridMapping};
use crate::utils::{allocate_buffer, fill_rows, round_to_u8, validate_non_empty};

/// Trait for compositing a processing-resolution matte onto the original image.
///
/// For every pixel of the original image the matte is bilinearly sampled
/// at the matching processing-resolution coordinate, the result becomes
/// the pixel's alpha, and edge pixels are colour-decontaminated. The
/// original's own alpha channel is discarded.
pub trait ComposeMatteExt {
    /// Composites the matte onto the image
    ///
    /// This consumes the original image. The output has the original's
    /// dimensions regardless of the matte resolution.
    ///
    /// # Arguments
    ///
    /// * `alpha` - Final processing-resolution alpha buffer
    ///
    /// # Errors
    ///
    /// * `FilterError::EmptyImage` - When the image or the matte is empty
    /// * `FilterError::BufferAllocationFailed` - When the output cannot be allocated
    ///
    /// # Examples
    ///
    /// ```
    /// use imageops_matte::{ComposeMatteExt, Image};
    /// use image::{Luma, Rgba};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let original: Image<Rgba<u8>> = Image::from_pixel(40, 30, Rgba([10, 20, 30, 255]));
    /// let matte: Image<Luma<u8>> = Image::from_pixel(20, 15, Luma([255]));
    ///
    /// let composed = original.compose_matte(&matte)?;
    /// assert_eq!(composed.dimensions(), (40, 30));
    /// assert_eq!(composed.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    /// # Ok(())
    /// # }
    /// ```
    fn compose_matte(self, alpha: &Image<Luma<u8>>) -> Result<Image<Rgba<u8>>, FilterError>;

    /// Composites the matte onto the image in-place
    fn compose_matte_mut(&mut self, alpha: &Image<Luma<u8>>) -> Result<&mut Self, FilterError>;
}

impl ComposeMatteExt for Image<Rgba<u8>> {
    fn compose_matte(self, alpha: &Image<Luma<u8>>) -> Result<Self, FilterError> {
        compose(&self, alpha)
    }

    fn compose_matte_mut(&mut self, alpha: &Image<Luma<u8>>) -> Result<&mut Self, FilterError> {
        *self = compose(self, alpha)?;
        Ok(self)
    }
}

pub(crate) fn compose(
    original: &Image<Rgba<u8>>,
    alpha: &Image<Luma<u8>>,
) -> Result<Image<Rgba<u8>>, FilterError> {
    let (width, height) = original.dimensions();
    validate_non_empty(width, height)?;
    let (alpha_width, alpha_height) = alpha.dimensions();
    validate_non_empty(alpha_width, alpha_height)?;

    let mapping = GridMapping::new((alpha_width, alpha_height), (width, height));
    let mut buffer = allocate_buffer(width, height, 4)?;

    fill_rows(&mut buffer, width as usize * 4, |y, row| {
        let src_y = mapping.source_y(y);
        for (x, out) in row.chunks_exact_mut(4).enumerate() {
            let x = x as u32;
            let matte = round_to_u8(sample_bilinear(alpha, mapping.source_x(x), src_y));
            let Rgba([red, green, blue, _]) = *original.get_pixel(x, y);
            let [red, green, blue] = decontaminate_pixel([red, green, blue], matte);
            out.copy_from_slice(&[red, green, blue, matte]);
        }
    });

    ImageBuffer::from_raw(width, height, buffer)
        .ok_or(FilterError::BufferAllocationFailed { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_rgba_image;

    #[test]
    fn output_has_original_dimensions() {
        let original: Image<Rgba<u8>> = Image::from_pixel(37, 23, Rgba([1, 2, 3, 4]));
        let matte: Image<Luma<u8>> = Image::from_pixel(16, 10, Luma([0]));

        let composed = original.compose_matte(&matte).unwrap();

        assert_eq!(composed.dimensions(), (37, 23));
    }

    #[test]
    fn opaque_and_transparent_mattes_keep_colour() {
        let original = create_test_rgba_image();

        let opaque = original
            .clone()
            .compose_matte(&Image::from_pixel(1, 1, Luma([255])))
            .unwrap();
        let transparent = original
            .clone()
            .compose_matte(&Image::from_pixel(1, 1, Luma([0])))
            .unwrap();

        for ((source, solid), clear) in original
            .pixels()
            .zip(opaque.pixels())
            .zip(transparent.pixels())
        {
            assert_eq!(&solid.0[..3], &source.0[..3]);
            assert_eq!(solid[3], 255);
            assert_eq!(&clear.0[..3], &source.0[..3]);
            assert_eq!(clear[3], 0);
        }
    }

    #[test]
    fn edge_pixels_are_decontaminated() {
        let original: Image<Rgba<u8>> = Image::from_pixel(4, 1, Rgba([0, 0, 255, 255]));
        let matte: Image<Luma<u8>> =
            Image::from_fn(2, 1, |x, _| Luma([if x == 0 { 0 } else { 255 }]));

        let composed = original.compose_matte(&matte).unwrap();

        // x = 1 samples src_x = 0.5 -> alpha 128, inside the band
        let edge = composed.get_pixel(1, 0);
        assert_eq!(edge[3], 128);
        assert_eq!(
            [edge[0], edge[1], edge[2]],
            decontaminate_pixel([0, 0, 255], 128)
        );
    }

    #[test]
    fn mut_variant_matches_consuming_variant() {
        let original: Image<Rgba<u8>> =
            Image::from_fn(8, 8, |x, y| Rgba([x as u8 * 30, y as u8 * 30, 100, 255]));
        let matte: Image<Luma<u8>> = Image::from_fn(4, 4, |x, _| Luma([x as u8 * 80]));

        let expected = original.clone().compose_matte(&matte).unwrap();
        let mut in_place = original;
        in_place.compose_matte_mut(&matte).unwrap();

        assert_eq!(in_place, expected);
    }

    #[test]
    fn empty_matte_is_rejected() {
        let original: Image<Rgba<u8>> = Image::new(4, 4);
        let matte: Image<Luma<u8>> = Image::new(0, 0);
        assert!(matches!(
            original.compose_matte(&matte),
            Err(FilterError::EmptyImage { .. })
        ));
    }
}
