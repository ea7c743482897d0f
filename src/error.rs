use thiserror::Error;

/// Error type for the per-stage matte filters
///
/// Every stage of the refinement pipeline (classification, erosion,
/// feathering, smoothing, upscaling and the micro-feather pass) reports
/// its failures through this type.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// The input buffer has a zero dimension
    #[error("Image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    /// A neighbourhood radius is negative, too large or not finite
    #[error("Invalid radius: {radius} (must be within [0, 64])")]
    InvalidRadius { radius: f32 },

    /// The Gaussian sigma is not strictly positive
    #[error("Invalid sigma: {sigma} (must be finite and > 0)")]
    InvalidSigma { sigma: f32 },

    /// The classifier bands do not satisfy `0 <= threshold < edge_limit <= 1`
    #[error(
        "Invalid thresholds: threshold={threshold}, edge_limit={edge_limit} \
         (require 0 <= threshold < edge_limit <= 1)"
    )]
    InvalidThresholds { threshold: f32, edge_limit: f32 },

    /// The requested output buffer could not be allocated
    ///
    /// Raised when the byte size overflows `usize` or the allocator
    /// refuses the reservation.
    #[error("Failed to allocate a {width}x{height} buffer")]
    BufferAllocationFailed { width: u32, height: u32 },
}

/// Error type for segmentation providers
///
/// Providers wrap whatever their inference engine reports into one of
/// these variants so the pipeline can surface a single typed failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentationError {
    /// The model could not be loaded or is not available on this host
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Inference ran but failed
    #[error("Inference failed: {0}")]
    InferenceFailed(String),

    /// The provider cannot handle this input image
    #[error("Unsupported image: {0}")]
    UnsupportedImage(String),

    /// The provider returned a mask with a zero dimension
    #[error("Segmentation returned an empty mask")]
    EmptyMask,

    /// A fallback chain was built without any provider
    #[error("No segmentation providers configured")]
    NoProviders,

    /// Every provider in a fallback chain failed
    #[error("All segmentation providers failed (attempted: {})", attempted.join(", "))]
    AllProvidersFailed {
        /// Provider names in the order they were tried
        attempted: Vec<String>,
        /// Failure reported by the last provider
        #[source]
        last: Box<SegmentationError>,
    },
}

/// Error type for a complete matte refinement run
///
/// A run either returns a full RGBA buffer or one of these errors; there
/// is no partial output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatteError {
    /// The segmentation provider failed or returned an unusable mask
    #[error("Segmentation failed in provider '{provider}': {source}")]
    SegmentationFailure {
        provider: String,
        #[source]
        source: SegmentationError,
    },

    /// An intermediate or output buffer could not be allocated
    #[error("Image too large to process: {width}x{height}")]
    BufferAllocationFailure { width: u32, height: u32 },

    /// The mask returned by segmentation does not match the processing image
    #[error(
        "Mask dimensions do not match the processing image: \
         expected {expected:?}, actual {actual:?}"
    )]
    InvalidMaskDimensions {
        /// Expected dimensions (width, height)
        expected: (u32, u32),
        /// Actual dimensions (width, height)
        actual: (u32, u32),
    },

    /// The pipeline configuration is invalid
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A stage rejected its input
    #[error(transparent)]
    Filter(FilterError),
}

impl From<FilterError> for MatteError {
    fn from(error: FilterError) -> Self {
        match error {
            FilterError::BufferAllocationFailed { width, height } => {
                Self::BufferAllocationFailure { width, height }
            }
            other => Self::Filter(other),
        }
    }
}
