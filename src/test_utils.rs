//! Test utilities for imageops-matte
//!
//! Shared fixtures for the per-module unit tests.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use image::{Luma, Rgba};
use imageproc::definitions::Image;

#[global_allocator]
static ALLOC: TrackingAllocator = TrackingAllocator;

thread_local! {
    static WATCHED_SIZE: Cell<usize> = const { Cell::new(0) };
    static WATCHED_HITS: Cell<usize> = const { Cell::new(0) };
}

/// System allocator that counts, per thread, allocations of one watched size.
pub struct TrackingAllocator;

impl TrackingAllocator {
    fn record(size: usize) {
        let _ = WATCHED_SIZE.try_with(|watched| {
            if watched.get() != 0 && watched.get() == size {
                let _ = WATCHED_HITS.try_with(|hits| hits.set(hits.get() + 1));
            }
        });
    }
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        Self::record(layout.size());
        unsafe { System.alloc(layout) }
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        Self::record(layout.size());
        unsafe { System.alloc_zeroed(layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        Self::record(new_size);
        unsafe { System.realloc(ptr, layout, new_size) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }
}

/// Runs `f` and counts the allocations of exactly `size` bytes it made on this thread.
pub fn count_allocations_of<R>(size: usize, f: impl FnOnce() -> R) -> (R, usize) {
    WATCHED_HITS.with(|hits| hits.set(0));
    WATCHED_SIZE.with(|watched| watched.set(size));
    let result = f();
    WATCHED_SIZE.with(|watched| watched.set(0));
    (result, WATCHED_HITS.with(Cell::get))
}

/// Creates a 2x2 RGBA image with known pixel values:
/// - (0,0): [200, 150, 100, 255]
/// - (1,0): [100, 200, 150, 128]
/// - (0,1): [150, 100, 200, 64]
/// - (1,1): [50, 75, 25, 0]
pub fn create_test_rgba_image() -> Image<Rgba<u8>> {
    let mut image: Image<Rgba<u8>> = Image::new(2, 2);
    image.put_pixel(0, 0, Rgba([200, 150, 100, 255]));
    image.put_pixel(1, 0, Rgba([100, 200, 150, 128]));
    image.put_pixel(0, 1, Rgba([150, 100, 200, 64]));
    image.put_pixel(1, 1, Rgba([50, 75, 25, 0]));
    image
}

/// Alpha mask that is 0 left of `edge` and 255 from `edge` onwards.
pub fn create_step_alpha(width: u32, height: u32, edge: u32) -> Image<Luma<u8>> {
    Image::from_fn(width, height, |x, _| Luma([if x >= edge { 255 } else { 0 }]))
}

/// Single opaque pixel at `(x, y)` on a transparent background.
pub fn create_dot_alpha(width: u32, height: u32, x: u32, y: u32) -> Image<Luma<u8>> {
    let mut alpha: Image<Luma<u8>> = Image::new(width, height);
    alpha.put_pixel(x, y, Luma([255]));
    alpha
}

/// Largest absolute per-pixel difference between two alpha buffers.
pub fn max_alpha_difference(a: &Image<Luma<u8>>, b: &Image<Luma<u8>>) -> u8 {
    assert_eq!(a.dimensions(), b.dimensions());
    a.pixels()
        .zip(b.pixels())
        .map(|(p, q)| p[0].abs_diff(q[0]))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_test_rgba_image_with_valid_input_creates_image() {
        let image = create_test_rgba_image();
        assert_eq!(image.dimensions(), (2, 2));
        assert_eq!(image.get_pixel(0, 0), &Rgba([200, 150, 100, 255]));
        assert_eq!(image.get_pixel(1, 1), &Rgba([50, 75, 25, 0]));
    }

    #[test]
    fn create_step_alpha_splits_at_edge() {
        let alpha = create_step_alpha(6, 2, 3);
        assert_eq!(alpha.get_pixel(2, 1)[0], 0);
        assert_eq!(alpha.get_pixel(3, 1)[0], 255);
    }

    #[test]
    fn count_allocations_of_sees_only_the_watched_size() {
        let (lengths, hits) = count_allocations_of(4096, || {
            let watched: Vec<u8> = vec![1; 4096];
            let other: Vec<u8> = vec![1; 4095];
            (watched.len(), other.len())
        });
        assert_eq!(lengths, (4096, 4095));
        assert_eq!(hits, 1);
    }

    #[test]
    fn max_alpha_difference_finds_largest_gap() {
        let a = create_dot_alpha(3, 3, 1, 1);
        let b: Image<Luma<u8>> = Image::from_pixel(3, 3, Luma([10]));
        assert_eq!(max_alpha_difference(&a, &b), 245);
    }
}
