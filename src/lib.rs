//! Alpha-matte refinement for background removal.
//!
//! A segmentation model yields a soft foreground probability mask at a
//! reduced processing resolution. This crate turns that mask into a
//! production-quality matte and applies it to the full-resolution
//! original:
//!
//! 1. [`ClassifyMaskExt`] - probability to alpha with a smoothstep edge band
//! 2. [`ErodeMatteExt`] - circular min-filter against background halos
//! 3. [`FeatherMatteExt`] - normalized Gaussian over a circular footprint
//! 4. [`SmoothMatteExt`] - small unweighted mean
//! 5. [`ComposeMatteExt`] - bilinear upscale plus colour decontamination
//! 6. [`MicroFeatherExt`] - final 4-neighbour anti-aliasing
//!
//! [`MattePipeline`] runs all of it, optionally driving a
//! [`SegmentationProvider`] first.

mod config;
mod error;
mod imageops_matte;
mod utils;

#[cfg(test)]
mod test_utils;

pub use config::MatteConfig;
pub use error::{FilterError, MatteError, SegmentationError};
pub use imageops_matte::classify::{classify_probability, ClassifyMaskExt};
pub use imageops_matte::composite::ComposeMatteExt;
pub use imageops_matte::decontaminate::{decontaminate_pixel, DecontaminateEdgesExt};
pub use imageops_matte::erode::ErodeMatteExt;
pub use imageops_matte::feather::FeatherMatteExt;
pub use imageops_matte::micro_feather::MicroFeatherExt;
pub use imageops_matte::pipeline::{refine_matte, MattePipeline, MatteStage};
pub use imageops_matte::resolution::{processing_dimensions, to_processing_resolution};
pub use imageops_matte::segmentation::{
    FallbackSegmenter, FnSegmenter, ProbabilityMask, SegmentationProvider,
};
pub use imageops_matte::smooth::SmoothMatteExt;
pub use imageops_matte::upscale::UpscaleAlphaExt;
pub use utils::MAX_RADIUS;

pub use imageproc::definitions::Image;
