//! Internal utility functions for imageops-matte.
//!
//! This module contains the buffer helpers and validation shared by the
//! individual refinement stages.

mod footprint;
pub use footprint::Footprint;

use image::{ImageBuffer, Luma};
use imageproc::definitions::{Clamp, Image};

use crate::error::FilterError;

/// Rounds a floating-point value to the nearest integer and clamps it to `[0, 255]`.
///
/// `Clamp<f32>` alone truncates, so rounding happens first.
#[inline]
pub fn round_to_u8(value: f32) -> u8 {
    <u8 as Clamp<f32>>::clamp(value.round())
}

/// Validates that an image has non-zero dimensions.
#[inline]
pub const fn validate_non_empty(width: u32, height: u32) -> Result<(), FilterError> {
    if width == 0 || height == 0 {
        Err(FilterError::EmptyImage { width, height })
    } else {
        Ok(())
    }
}

/// Largest neighbourhood radius any stage accepts.
///
/// A footprint of this radius already holds about 13,000 taps per pixel.
pub const MAX_RADIUS: f32 = 64.0;

/// Validates a neighbourhood radius.
///
/// # Returns
///
/// `Ok(())` if the radius lies in `[0, MAX_RADIUS]`
#[inline]
pub fn validate_radius(radius: f32) -> Result<(), FilterError> {
    if (0.0..=MAX_RADIUS).contains(&radius) {
        Ok(())
    } else {
        Err(FilterError::InvalidRadius { radius })
    }
}

/// Reserves a zeroed byte buffer for `channels` bytes per pixel.
///
/// Fails with `BufferAllocationFailed` instead of aborting when the
/// request overflows or the allocator refuses it.
pub fn allocate_buffer(width: u32, height: u32, channels: usize) -> Result<Vec<u8>, FilterError> {
    let failed = || FilterError::BufferAllocationFailed { width, height };

    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|pixels| pixels.checked_mul(channels))
        .ok_or_else(failed)?;

    let mut buffer = Vec::new();
    buffer.try_reserve_exact(len).map_err(|_| failed())?;
    buffer.resize(len, 0);
    Ok(buffer)
}

/// Fills every row of `buffer` with `fill_row(y, row)`.
///
/// Rows are independent, so with the `rayon` feature they are computed
/// in parallel. `row_len` must be non-zero.
pub fn fill_rows<F>(buffer: &mut [u8], row_len: usize, fill_row: F)
where
    F: Fn(u32, &mut [u8]) + Sync + Send,
{
    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        buffer
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| fill_row(y as u32, row));
    }

    #[cfg(not(feature = "rayon"))]
    buffer
        .chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| fill_row(y as u32, row));
}

/// Builds a new alpha buffer whose pixels are computed by `pixel_fn(x, y)`.
///
/// The closure only reads from buffers of the previous generation, so
/// output rows can be produced in any order.
pub fn generate_alpha<F>(
    width: u32,
    height: u32,
    pixel_fn: F,
) -> Result<Image<Luma<u8>>, FilterError>
where
    F: Fn(u32, u32) -> u8 + Sync + Send,
{
    validate_non_empty(width, height)?;

    let mut buffer = allocate_buffer(width, height, 1)?;
    fill_rows(&mut buffer, width as usize, |y, row| {
        for (x, value) in row.iter_mut().enumerate() {
            *value = pixel_fn(x as u32, y);
        }
    });

    ImageBuffer::from_raw(width, height, buffer)
        .ok_or(FilterError::BufferAllocationFailed { width, height })
}
