use image::Luma;
use imageproc::definitions::Image;

use crate::error::FilterError;
use crate::utils::{generate_alpha, validate_non_empty, validate_radius, Footprint};

/// Trait for shrinking the foreground of an alpha buffer.
///
/// Each output pixel is the minimum alpha found in a circular footprint of
/// the given radius around it. Only in-bounds neighbours are considered, so
/// border pixels are not pulled toward an implicit padding value.
///
/// Erosion removes the thin halo a segmentation model tends to leave
/// around the subject. It never increases alpha.
pub trait ErodeMatteExt {
    /// Erodes the alpha buffer with a circular footprint
    ///
    /// This consumes the original image.
    ///
    /// # Arguments
    ///
    /// * `radius` - Footprint radius in pixels (fractional radii are allowed)
    ///
    /// # Errors
    ///
    /// * `FilterError::InvalidRadius` - When the radius is negative or not finite
    /// * `FilterError::EmptyImage` - When the buffer has a zero dimension
    ///
    /// # Examples
    ///
    /// ```
    /// use imageops_matte::{ErodeMatteExt, Image};
    /// use image::Luma;
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let mut alpha: Image<Luma<u8>> = Image::from_pixel(5, 5, Luma([255]));
    /// alpha.put_pixel(2, 2, Luma([0]));
    ///
    /// let eroded = alpha.erode_matte(1.5)?;
    /// assert_eq!(eroded.get_pixel(1, 1)[0], 0);
    /// # Ok(())
    /// # }
    /// ```
    fn erode_matte(self, radius: f32) -> Result<Image<Luma<u8>>, FilterError>;

    /// Erodes the alpha buffer in-place
    ///
    /// The neighbourhood minimum is taken over the buffer as it was before
    /// the call; no pixel sees an already eroded neighbour.
    fn erode_matte_mut(&mut self, radius: f32) -> Result<&mut Self, FilterError>;
}

impl ErodeMatteExt for Image<Luma<u8>> {
    fn erode_matte(self, radius: f32) -> Result<Self, FilterError> {
        erode(&self, radius)
    }

    fn erode_matte_mut(&mut self, radius: f32) -> Result<&mut Self, FilterError> {
        *self = erode(self, radius)?;
        Ok(self)
    }
}

fn erode(alpha: &Image<Luma<u8>>, radius: f32) -> Result<Image<Luma<u8>>, FilterError> {
    validate_radius(radius)?;
    let (width, height) = alpha.dimensions();
    validate_non_empty(width, height)?;

    let footprint = Footprint::circular(radius);

    generate_alpha(width, height, |x, y| {
        footprint
            .neighbours(x, y, width, height)
            .map(|(nx, ny, _)| alpha.get_pixel(nx, ny)[0])
            .min()
            .unwrap_or(alpha.get_pixel(x, y)[0])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_step_alpha;
    use itertools::iproduct;

    #[test]
    fn single_hole_grows_to_the_footprint() {
        let mut alpha: Image<Luma<u8>> = Image::from_pixel(7, 7, Luma([255]));
        alpha.put_pixel(3, 3, Luma([0]));

        let eroded = alpha.erode_matte(1.5).unwrap();

        for (y, x) in iproduct!(0..7u32, 0..7u32) {
            let inside = x.abs_diff(3) <= 1 && y.abs_diff(3) <= 1;
            let expected = if inside { 0 } else { 255 };
            assert_eq!(eroded.get_pixel(x, y)[0], expected, "at ({x}, {y})");
        }
    }

    #[test]
    fn plus_footprint_skips_diagonals() {
        let mut alpha: Image<Luma<u8>> = Image::from_pixel(5, 5, Luma([200]));
        alpha.put_pixel(2, 2, Luma([10]));

        let eroded = alpha.erode_matte(1.2).unwrap();

        assert_eq!(eroded.get_pixel(2, 1)[0], 10);
        assert_eq!(eroded.get_pixel(1, 2)[0], 10);
        assert_eq!(eroded.get_pixel(1, 1)[0], 200);
    }

    #[test]
    fn border_pixels_only_see_in_bounds_neighbours() {
        let alpha: Image<Luma<u8>> = Image::from_pixel(3, 3, Luma([180]));
        let eroded = alpha.erode_matte(1.5).unwrap();
        assert!(eroded.pixels().all(|p| p[0] == 180));
    }

    #[test]
    fn vertical_edge_moves_by_one_column() {
        let eroded = create_step_alpha(8, 4, 4).erode_matte(1.5).unwrap();

        assert_eq!(eroded.get_pixel(4, 2)[0], 0);
        assert_eq!(eroded.get_pixel(5, 2)[0], 255);
    }

    #[test]
    fn mut_variant_matches_consuming_variant() {
        let alpha: Image<Luma<u8>> = Image::from_fn(6, 6, |x, y| Luma([(x * 40 + y * 7) as u8]));

        let expected = alpha.clone().erode_matte(1.5).unwrap();
        let mut in_place = alpha;
        in_place.erode_matte_mut(1.5).unwrap();

        assert_eq!(in_place, expected);
    }

    #[test]
    fn invalid_radius_is_rejected() {
        let alpha: Image<Luma<u8>> = Image::new(4, 4);
        assert!(matches!(
            alpha.erode_matte(-1.0),
            Err(FilterError::InvalidRadius { .. })
        ));
    }
}
