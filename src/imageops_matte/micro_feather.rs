use image::Rgba;
use imageproc::definitions::Image;

use crate::error::FilterError;
use crate::utils::{allocate_buffer, fill_rows, round_to_u8};

/// Alpha values strictly between these bounds count as edge pixels.
const EDGE_LOWER: u8 = 10;
const EDGE_UPPER: u8 = 245;

const CENTRE_WEIGHT: f32 = 0.7;
const NEIGHBOUR_WEIGHT: f32 = 0.075;

/// Trait for the final full-resolution anti-aliasing pass over the alpha channel.
///
/// Every interior pixel whose alpha lies in `(10, 245)` is replaced by
/// `0.7 * own + 0.075 * (top + bottom + left + right)`. Border rows and
/// columns and pixels outside the edge band are left untouched, as are
/// all colour channels. Neighbours are read from the alpha channel as it
/// was before the pass.
pub trait MicroFeatherExt {
    /// Applies one micro-feather pass
    ///
    /// This consumes the original image.
    ///
    /// # Errors
    ///
    /// * `FilterError::BufferAllocationFailed` - When the alpha snapshot cannot be allocated
    ///
    /// # Examples
    ///
    /// ```
    /// use imageops_matte::{Image, MicroFeatherExt};
    /// use image::Rgba;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut image: Image<Rgba<u8>> = Image::from_pixel(3, 3, Rgba([0, 0, 0, 200]));
    /// image.put_pixel(1, 1, Rgba([0, 0, 0, 100]));
    ///
    /// let feathered = image.micro_feather()?;
    /// // 0.7 * 100 + 0.075 * (4 * 200) = 130
    /// assert_eq!(feathered.get_pixel(1, 1)[3], 130);
    /// # Ok(())
    /// # }
    /// ```
    fn micro_feather(self) -> Result<Image<Rgba<u8>>, FilterError>;

    /// Applies one micro-feather pass in-place
    fn micro_feather_mut(&mut self) -> Result<&mut Self, FilterError>;
}

impl MicroFeatherExt for Image<Rgba<u8>> {
    fn micro_feather(mut self) -> Result<Self, FilterError> {
        self.micro_feather_mut()?;
        Ok(self)
    }

    fn micro_feather_mut(&mut self) -> Result<&mut Self, FilterError> {
        let (width, height) = self.dimensions();
        if width < 3 || height < 3 {
            return Ok(self);
        }

        let stride = width as usize;
        let last_row = height - 1;
        let mut alpha = allocate_buffer(width, height, 1)?;
        for (value, pixel) in alpha.iter_mut().zip(self.pixels()) {
            *value = pixel[3];
        }
        let at = |x: usize, y: usize| f32::from(alpha[y * stride + x]);

        fill_rows(&mut **self, stride * 4, |y, row| {
            if y == 0 || y == last_row {
                return;
            }
            let y = y as usize;

            for x in 1..stride - 1 {
                let own = alpha[y * stride + x];
                if own <= EDGE_LOWER || own >= EDGE_UPPER {
                    continue;
                }

                let neighbours = at(x, y - 1) + at(x, y + 1) + at(x - 1, y) + at(x + 1, y);
                let blended = NEIGHBOUR_WEIGHT.mul_add(neighbours, CENTRE_WEIGHT * f32::from(own));
                row[x * 4 + 3] = round_to_u8(blended);
            }
        });

        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itertools::iproduct;

    #[test]
    fn border_pixels_are_untouched() {
        let image: Image<Rgba<u8>> = Image::from_fn(5, 5, |x, y| {
            Rgba([7, 8, 9, if x == 2 && y == 2 { 255 } else { 100 }])
        });

        let feathered = image.clone().micro_feather().unwrap();

        for (y, x) in iproduct!(0..5u32, 0..5u32) {
            if x == 0 || y == 0 || x == 4 || y == 4 {
                assert_eq!(feathered.get_pixel(x, y), image.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn values_outside_the_edge_band_are_untouched() {
        let mut image: Image<Rgba<u8>> = Image::from_pixel(3, 3, Rgba([0, 0, 0, 128]));
        for alpha in [0, 10, 245, 255] {
            image.put_pixel(1, 1, Rgba([0, 0, 0, alpha]));
            let feathered = image.clone().micro_feather().unwrap();
            assert_eq!(feathered.get_pixel(1, 1)[3], alpha);
        }
    }

    #[test]
    fn neighbours_see_pre_pass_values() {
        // Two adjacent edge pixels; each is blended with the other's
        // original value.
        let mut image: Image<Rgba<u8>> = Image::from_pixel(4, 3, Rgba([0, 0, 0, 190]));
        image.put_pixel(1, 1, Rgba([0, 0, 0, 100]));
        image.put_pixel(2, 1, Rgba([0, 0, 0, 80]));

        let feathered = image.micro_feather().unwrap();

        // 0.7 * 100 + 0.075 * (190 + 190 + 190 + 80) = 118.75
        assert_eq!(feathered.get_pixel(1, 1)[3], 119);
        // 0.7 * 80 + 0.075 * (190 + 190 + 100 + 190) = 106.25
        assert_eq!(feathered.get_pixel(2, 1)[3], 106);
    }

    #[test]
    fn colour_channels_are_untouched() {
        let image: Image<Rgba<u8>> =
            Image::from_fn(6, 6, |x, y| Rgba([x as u8, y as u8, 50, 60 + (x * 20) as u8]));
        let feathered = image.clone().micro_feather().unwrap();

        for (before, after) in image.pixels().zip(feathered.pixels()) {
            assert_eq!(&before.0[..3], &after.0[..3]);
        }
    }

    #[test]
    fn linear_ramp_is_a_fixed_point() {
        let image: Image<Rgba<u8>> = Image::from_fn(64, 8, |x, _| Rgba([0, 0, 0, (x * 4) as u8]));
        let feathered = image.clone().micro_feather().unwrap();
        assert_eq!(feathered, image);
    }

    #[test]
    fn mut_variant_matches_consuming_variant() {
        let image: Image<Rgba<u8>> =
            Image::from_fn(7, 5, |x, y| Rgba([9, 9, 9, (x * 30 + y * 11) as u8]));

        let expected = image.clone().micro_feather().unwrap();
        let mut in_place = image;
        in_place.micro_feather_mut().unwrap();

        assert_eq!(in_place, expected);
    }

    #[test]
    fn tiny_images_are_untouched() {
        let image: Image<Rgba<u8>> = Image::from_pixel(2, 5, Rgba([1, 2, 3, 100]));
        assert_eq!(image.clone().micro_feather().unwrap(), image);
    }
}
