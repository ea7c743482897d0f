//! End-to-end matte refinement.
//!
//! ```text
//! original ──resize──▶ processing image ──provider──▶ probability mask
//!     │                                                    │
//!     │                      classify ▶ erode ▶ feather ▶ smooth
//!     │                                                    │
//!     └──────────── compose (upscale + decontaminate) ◀────┘
//!                                  │
//!                            micro-feather ──▶ RGBA output
//! ```
//!
//! Each stage consumes the complete buffer produced by the previous one.
//! A run either returns the full RGBA image or a single [`MatteError`].

use std::fmt;

use image::{Luma, Rgba};
use imageproc::definitions::Image;
use tracing::{debug, instrument};

use crate::config::MatteConfig;
use crate::error::{FilterError, MatteError, SegmentationError};
use crate::imageops_matte::classify::ClassifyMaskExt;
use crate::imageops_matte::composite::compose;
use crate::imageops_matte::erode::ErodeMatteExt;
use crate::imageops_matte::feather::FeatherMatteExt;
use crate::imageops_matte::micro_feather::MicroFeatherExt;
use crate::imageops_matte::resolution::to_processing_resolution;
use crate::imageops_matte::segmentation::{ProbabilityMask, SegmentationProvider};
use crate::imageops_matte::smooth::SmoothMatteExt;

/// Pipeline stages, reported to progress callbacks after they complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatteStage {
    Resizing,
    Segmenting,
    Classifying,
    Eroding,
    Feathering,
    Smoothing,
    Compositing,
    MicroFeathering,
}

impl MatteStage {
    /// Overall completion once this stage has finished
    pub const fn progress_percentage(self) -> u8 {
        match self {
            Self::Resizing => 10,
            Self::Segmenting => 50,
            Self::Classifying => 55,
            Self::Eroding => 60,
            Self::Feathering => 70,
            Self::Smoothing => 75,
            Self::Compositing => 95,
            Self::MicroFeathering => 100,
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::Resizing => "Resizing to processing resolution",
            Self::Segmenting => "Segmenting foreground",
            Self::Classifying => "Classifying probability mask",
            Self::Eroding => "Eroding mask edges",
            Self::Feathering => "Feathering edges",
            Self::Smoothing => "Smoothing matte",
            Self::Compositing => "Upscaling and decontaminating colours",
            Self::MicroFeathering => "Final edge anti-aliasing",
        }
    }
}

impl fmt::Display for MatteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Matte refinement pipeline with a validated configuration.
///
/// # Examples
///
/// ```
/// use imageops_matte::{FnSegmenter, Image, MatteConfig, MattePipeline};
/// use image::{Luma, Rgba};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pipeline = MattePipeline::new(MatteConfig::default())?;
///
/// // Everything right of centre is foreground
/// let provider = FnSegmenter::new("half", |image: &Image<Rgba<u8>>| {
///     let (width, height) = image.dimensions();
///     Ok(Image::from_fn(width, height, |x, _| {
///         Luma([if x >= width / 2 { 1.0 } else { 0.0 }])
///     }))
/// });
///
/// let original: Image<Rgba<u8>> = Image::from_pixel(1200, 800, Rgba([30, 60, 90, 255]));
/// let cutout = pipeline.remove_background(&original, &provider)?;
///
/// assert_eq!(cutout.dimensions(), (1200, 800));
/// assert_eq!(cutout.get_pixel(0, 400)[3], 0);
/// assert_eq!(cutout.get_pixel(1199, 400)[3], 255);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MattePipeline {
    config: MatteConfig,
}

impl MattePipeline {
    /// Creates a pipeline after validating `config`.
    ///
    /// # Errors
    ///
    /// * `MatteError::InvalidConfig` - When the configuration is inconsistent
    pub fn new(config: MatteConfig) -> Result<Self, MatteError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub const fn config(&self) -> &MatteConfig {
        &self.config
    }

    /// Removes the background of `original` using `provider` for segmentation.
    ///
    /// # Errors
    ///
    /// * `MatteError::SegmentationFailure` - When the provider fails or returns an empty mask
    /// * `MatteError::InvalidMaskDimensions` - When the mask does not match the processing image
    /// * `MatteError::BufferAllocationFailure` - When a buffer cannot be allocated
    /// * `MatteError::Filter` - When the original image is empty
    pub fn remove_background<P>(
        &self,
        original: &Image<Rgba<u8>>,
        provider: &P,
    ) -> Result<Image<Rgba<u8>>, MatteError>
    where
        P: SegmentationProvider + ?Sized,
    {
        self.remove_background_with_progress(original, provider, |_, _| {})
    }

    /// Same as [`MattePipeline::remove_background`], reporting each completed stage.
    ///
    /// The callback receives the stage and the overall completion percentage.
    #[instrument(
        skip(self, original, provider, progress),
        fields(
            provider = provider.name(),
            dimensions = %format!("{}x{}", original.width(), original.height())
        )
    )]
    pub fn remove_background_with_progress<P, F>(
        &self,
        original: &Image<Rgba<u8>>,
        provider: &P,
        mut progress: F,
    ) -> Result<Image<Rgba<u8>>, MatteError>
    where
        P: SegmentationProvider + ?Sized,
        F: FnMut(MatteStage, u8),
    {
        let mut report = |stage: MatteStage| {
            debug!(stage = ?stage, percent = stage.progress_percentage(), "{}", stage);
            progress(stage, stage.progress_percentage());
        };

        let processing =
            to_processing_resolution(original, self.config.min_size, self.config.max_size)?;
        report(MatteStage::Resizing);

        let mask = provider
            .segment(&processing)
            .map_err(|source| MatteError::SegmentationFailure {
                provider: provider.name().to_string(),
                source,
            })?;

        let (mask_width, mask_height) = mask.dimensions();
        if mask_width == 0 || mask_height == 0 {
            return Err(MatteError::SegmentationFailure {
                provider: provider.name().to_string(),
                source: SegmentationError::EmptyMask,
            });
        }
        if mask.dimensions() != processing.dimensions() {
            return Err(MatteError::InvalidMaskDimensions {
                expected: processing.dimensions(),
                actual: mask.dimensions(),
            });
        }
        report(MatteStage::Segmenting);

        self.refine_stages(original, &mask, &mut report)
    }

    /// Refines an already computed probability mask against `original`.
    ///
    /// The mask's own resolution is taken as the processing resolution, so
    /// any non-empty mask is accepted.
    ///
    /// # Errors
    ///
    /// * `MatteError::BufferAllocationFailure` - When a buffer cannot be allocated
    /// * `MatteError::Filter` - When the image or the mask is empty
    pub fn refine(
        &self,
        original: &Image<Rgba<u8>>,
        mask: &ProbabilityMask,
    ) -> Result<Image<Rgba<u8>>, MatteError> {
        self.refine_with_progress(original, mask, |_, _| {})
    }

    /// Same as [`MattePipeline::refine`], reporting each completed stage.
    #[instrument(
        skip(self, original, mask, progress),
        fields(
            dimensions = %format!("{}x{}", original.width(), original.height()),
            mask = %format!("{}x{}", mask.width(), mask.height())
        )
    )]
    pub fn refine_with_progress<F>(
        &self,
        original: &Image<Rgba<u8>>,
        mask: &ProbabilityMask,
        mut progress: F,
    ) -> Result<Image<Rgba<u8>>, MatteError>
    where
        F: FnMut(MatteStage, u8),
    {
        let mut report = |stage: MatteStage| {
            debug!(stage = ?stage, percent = stage.progress_percentage(), "{}", stage);
            progress(stage, stage.progress_percentage());
        };
        self.refine_stages(original, mask, &mut report)
    }

    /// Produces the generation-3 alpha buffer at the mask's resolution.
    ///
    /// # Errors
    ///
    /// * `MatteError::Filter` - When the mask is empty
    pub fn refine_alpha(&self, mask: &ProbabilityMask) -> Result<Image<Luma<u8>>, MatteError> {
        self.refine_alpha_stages(mask, &mut |_| {})
    }

    fn refine_alpha_stages(
        &self,
        mask: &ProbabilityMask,
        report: &mut dyn FnMut(MatteStage),
    ) -> Result<Image<Luma<u8>>, MatteError> {
        let config = &self.config;

        let classified = mask.classify_mask(config.threshold, config.edge_limit)?;
        report(MatteStage::Classifying);

        let eroded = classified.erode_matte(config.erosion_radius)?;
        report(MatteStage::Eroding);

        let feathered = eroded.feather_matte(config.feather_radius, config.feather_sigma)?;
        report(MatteStage::Feathering);

        let smoothed = feathered.smooth_matte(config.smoothing_radius)?;
        report(MatteStage::Smoothing);

        Ok(smoothed)
    }

    fn refine_stages(
        &self,
        original: &Image<Rgba<u8>>,
        mask: &ProbabilityMask,
        report: &mut dyn FnMut(MatteStage),
    ) -> Result<Image<Rgba<u8>>, MatteError> {
        let (width, height) = original.dimensions();
        if width == 0 || height == 0 {
            return Err(FilterError::EmptyImage { width, height }.into());
        }

        let alpha = self.refine_alpha_stages(mask, report)?;

        let mut composed = compose(original, &alpha)?;
        report(MatteStage::Compositing);

        composed.micro_feather_mut()?;
        report(MatteStage::MicroFeathering);

        Ok(composed)
    }
}

/// Refines `mask` against `original` with a one-off pipeline.
///
/// # Errors
///
/// Same as [`MattePipeline::new`] and [`MattePipeline::refine`].
pub fn refine_matte(
    original: &Image<Rgba<u8>>,
    mask: &ProbabilityMask,
    config: &MatteConfig,
) -> Result<Image<Rgba<u8>>, MatteError> {
    MattePipeline::new(*config)?.refine(original, mask)
}
