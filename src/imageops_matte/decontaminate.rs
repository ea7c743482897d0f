//! Colour decontamination for semi-transparent edge pixels.
//!
//! Pixels on a matte edge carry a mix of foreground and background colour.
//! For pixels whose alpha ratio `a = alpha / 255` lies strictly inside
//! `(0.1, 0.9)` the colour is pulled toward its own luma:
//!
//! ```text
//! gray     = 0.299 R + 0.587 G + 0.114 B
//! strength = min((1 - a) * 1.8, 0.9)
//! c'       = c (1 - strength) + gray * strength
//! ```
//!
//! Very transparent pixels (`a < 0.4`) are additionally blended 30% toward
//! the mean of their desaturated channels. Pixels outside the band keep
//! their colour untouched.

use image::Rgba;
use imageproc::definitions::Image;

use crate::utils::round_to_u8;

/// Alpha ratios at or below this are treated as background.
pub const DECONTAMINATION_LOWER: f32 = 0.1;
/// Alpha ratios at or above this are treated as foreground.
pub const DECONTAMINATION_UPPER: f32 = 0.9;

const NEUTRALIZATION_GAIN: f32 = 1.8;
const MAX_NEUTRALIZATION: f32 = 0.9;
const FAINT_EDGE_RATIO: f32 = 0.4;
const FAINT_EDGE_BLEND: f32 = 0.3;

/// Returns `true` when an alpha value falls inside the decontamination band.
#[inline]
pub fn in_decontamination_band(alpha: u8) -> bool {
    let ratio = f32::from(alpha) / 255.0;
    ratio > DECONTAMINATION_LOWER && ratio < DECONTAMINATION_UPPER
}

/// Decontaminates one RGB triple given its final alpha.
///
/// # Examples
///
/// ```
/// use imageops_matte::decontaminate_pixel;
///
/// // Opaque and transparent pixels keep their colour
/// assert_eq!(decontaminate_pixel([200, 40, 10], 255), [200, 40, 10]);
/// assert_eq!(decontaminate_pixel([200, 40, 10], 0), [200, 40, 10]);
///
/// // Edge pixels are desaturated
/// let [r, g, b] = decontaminate_pixel([200, 40, 10], 128);
/// assert!(r < 200 && g > 40 && b > 10);
/// ```
#[inline]
pub fn decontaminate_pixel(rgb: [u8; 3], alpha: u8) -> [u8; 3] {
    if !in_decontamination_band(alpha) {
        return rgb;
    }

    let ratio = f32::from(alpha) / 255.0;
    let [red, green, blue] = rgb.map(f32::from);

    let gray = 0.114f32.mul_add(blue, 0.299f32.mul_add(red, 0.587 * green));
    let strength = ((1.0 - ratio) * NEUTRALIZATION_GAIN).min(MAX_NEUTRALIZATION);

    let mut channels = [red, green, blue].map(|c| gray.mul_add(strength, c * (1.0 - strength)));

    if ratio < FAINT_EDGE_RATIO {
        let average = channels.iter().sum::<f32>() / 3.0;
        channels =
            channels.map(|c| average.mul_add(FAINT_EDGE_BLEND, c * (1.0 - FAINT_EDGE_BLEND)));
    }

    channels.map(round_to_u8)
}

/// Trait for decontaminating the edge colours of an RGBA image whose alpha
/// channel already holds the final matte.
pub trait DecontaminateEdgesExt {
    /// Decontaminates edge colours
    ///
    /// This consumes the original image. Alpha is left unchanged.
    fn decontaminate_edges(self) -> Self;

    /// Decontaminates edge colours in-place
    fn decontaminate_edges_mut(&mut self) -> &mut Self;
}

impl DecontaminateEdgesExt for Image<Rgba<u8>> {
    fn decontaminate_edges(mut self) -> Self {
        self.decontaminate_edges_mut();
        self
    }

    fn decontaminate_edges_mut(&mut self) -> &mut Self {
        self.pixels_mut()
            .for_each(|pixel| *pixel = decontaminate_rgba(*pixel));
        self
    }
}

/// Decontaminates an RGBA pixel using its own alpha channel.
#[inline]
pub fn decontaminate_rgba(pixel: Rgba<u8>) -> Rgba<u8> {
    let Rgba([red, green, blue, alpha]) = pixel;
    let [red, green, blue] = decontaminate_pixel([red, green, blue], alpha);
    Rgba([red, green, blue, alpha])
}
