//! Segmentation capability consumed by the matte pipeline.
//!
//! The pipeline never runs a model itself. It receives a
//! [`SegmentationProvider`] that turns a processing-resolution RGBA image
//! into a per-pixel foreground probability mask. Which model sits behind
//! the provider, and how failures are retried, is the caller's business;
//! [`FallbackSegmenter`] covers the common "try the best model first, then
//! cheaper ones" policy.

use image::{Luma, Rgba};
use imageproc::definitions::Image;

use crate::error::SegmentationError;

/// Foreground probability per pixel, values in `[0, 1]`.
pub type ProbabilityMask = Image<Luma<f32>>;

/// Produces a foreground probability mask for an image.
pub trait SegmentationProvider {
    /// Human-readable provider name used in logs and errors
    fn name(&self) -> &str;

    /// Runs segmentation on a processing-resolution image
    ///
    /// # Errors
    ///
    /// Any [`SegmentationError`]; the pipeline aborts the run on failure.
    fn segment(&self, image: &Image<Rgba<u8>>) -> Result<ProbabilityMask, SegmentationError>;
}

impl<T: SegmentationProvider + ?Sized> SegmentationProvider for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn segment(&self, image: &Image<Rgba<u8>>) -> Result<ProbabilityMask, SegmentationError> {
        (**self).segment(image)
    }
}

/// Adapts a closure into a named [`SegmentationProvider`].
///
/// # Examples
///
/// ```
/// use imageops_matte::{FnSegmenter, Image, SegmentationProvider};
/// use image::{Luma, Rgba};
///
/// let provider = FnSegmenter::new("everything", |image: &Image<Rgba<u8>>| {
///     let (width, height) = image.dimensions();
///     Ok(Image::from_pixel(width, height, Luma([1.0])))
/// });
///
/// let image: Image<Rgba<u8>> = Image::new(8, 8);
/// let mask = provider.segment(&image).unwrap();
/// assert_eq!(mask.dimensions(), (8, 8));
/// ```
pub struct FnSegmenter<F> {
    name: String,
    segment_fn: F,
}

impl<F> FnSegmenter<F>
where
    F: Fn(&Image<Rgba<u8>>) -> Result<ProbabilityMask, SegmentationError>,
{
    pub fn new(name: impl Into<String>, segment_fn: F) -> Self {
        Self {
            name: name.into(),
            segment_fn,
        }
    }
}

impl<F> SegmentationProvider for FnSegmenter<F>
where
    F: Fn(&Image<Rgba<u8>>) -> Result<ProbabilityMask, SegmentationError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn segment(&self, image: &Image<Rgba<u8>>) -> Result<ProbabilityMask, SegmentationError> {
        (self.segment_fn)(image)
    }
}

/// Ordered list of providers where the first success wins.
///
/// A provider that returns an empty mask counts as a failure and the next
/// one is tried.
#[derive(Default)]
pub struct FallbackSegmenter {
    providers: Vec<Box<dyn SegmentationProvider>>,
}

impl FallbackSegmenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a provider to the end of the chain
    #[must_use]
    pub fn with_provider<P>(mut self, provider: P) -> Self
    where
        P: SegmentationProvider + 'static,
    {
        self.providers.push(Box::new(provider));
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl SegmentationProvider for FallbackSegmenter {
    fn name(&self) -> &str {
        "fallback"
    }

    fn segment(&self, image: &Image<Rgba<u8>>) -> Result<ProbabilityMask, SegmentationError> {
        let mut attempted = Vec::with_capacity(self.providers.len());
        let mut last_error = None;

        for provider in &self.providers {
            attempted.push(provider.name().to_string());

            let outcome = provider.segment(image).and_then(|mask| {
                let (width, height) = mask.dimensions();
                if width == 0 || height == 0 {
                    Err(SegmentationError::EmptyMask)
                } else {
                    Ok(mask)
                }
            });

            match outcome {
                Ok(mask) => {
                    tracing::debug!(provider = provider.name(), "segmentation succeeded");
                    return Ok(mask);
                }
                Err(error) => {
                    tracing::warn!(
                        provider = provider.name(),
                        error = %error,
                        "segmentation provider failed, trying next"
                    );
                    last_error = Some(error);
                }
            }
        }

        match last_error {
            Some(last) => Err(SegmentationError::AllProvidersFailed {
                attempted,
                last: Box::new(last),
            }),
            None => Err(SegmentationError::NoProviders),
        }
    }
}
