//! Configuration for the matte refinement pipeline.

use crate::error::MatteError;
use crate::utils::MAX_RADIUS;

/// Tunable constants of the refinement pipeline.
///
/// The defaults reproduce the fixed constants the pipeline was designed
/// around; they are exposed so tests and callers can override them.
///
/// # Examples
///
/// ```
/// use imageops_matte::MatteConfig;
///
/// let config = MatteConfig::default()
///     .with_processing_bounds(256, 768)
///     .with_feather(3.0, 1.2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatteConfig {
    /// Lower bound for the longest side at processing resolution
    pub min_size: u32,
    /// Upper bound for the longest side at processing resolution
    pub max_size: u32,
    /// Probabilities below this map to alpha 0
    pub threshold: f32,
    /// Probabilities above this map to alpha 255
    pub edge_limit: f32,
    /// Radius of the circular minimum filter
    pub erosion_radius: f32,
    /// Radius of the Gaussian feathering footprint
    pub feather_radius: f32,
    /// Sigma of the Gaussian feathering weights
    pub feather_sigma: f32,
    /// Radius of the secondary box smoother
    pub smoothing_radius: f32,
}

impl Default for MatteConfig {
    fn default() -> Self {
        Self {
            min_size: 512,
            max_size: 1024,
            threshold: 0.3,
            edge_limit: 0.7,
            erosion_radius: 1.5,
            feather_radius: 2.0,
            feather_sigma: 0.8,
            smoothing_radius: 1.2,
        }
    }
}

impl MatteConfig {
    #[must_use]
    pub const fn with_processing_bounds(mut self, min_size: u32, max_size: u32) -> Self {
        self.min_size = min_size;
        self.max_size = max_size;
        self
    }

    #[must_use]
    pub const fn with_thresholds(mut self, threshold: f32, edge_limit: f32) -> Self {
        self.threshold = threshold;
        self.edge_limit = edge_limit;
        self
    }

    #[must_use]
    pub const fn with_erosion_radius(mut self, radius: f32) -> Self {
        self.erosion_radius = radius;
        self
    }

    #[must_use]
    pub const fn with_feather(mut self, radius: f32, sigma: f32) -> Self {
        self.feather_radius = radius;
        self.feather_sigma = sigma;
        self
    }

    #[must_use]
    pub const fn with_smoothing_radius(mut self, radius: f32) -> Self {
        self.smoothing_radius = radius;
        self
    }

    /// Checks every field against the constraints the stages rely on.
    ///
    /// # Errors
    ///
    /// * `MatteError::InvalidConfig` - describing the first offending field
    pub fn validate(&self) -> Result<(), MatteError> {
        if self.min_size == 0 {
            return Err(MatteError::InvalidConfig(
                "min_size must be > 0".to_string(),
            ));
        }

        if self.min_size > self.max_size {
            return Err(MatteError::InvalidConfig(format!(
                "min_size ({}) must be <= max_size ({})",
                self.min_size, self.max_size
            )));
        }

        let thresholds_ok = self.threshold.is_finite()
            && self.edge_limit.is_finite()
            && 0.0 <= self.threshold
            && self.threshold < self.edge_limit
            && self.edge_limit <= 1.0;
        if !thresholds_ok {
            return Err(MatteError::InvalidConfig(format!(
                "thresholds must satisfy 0 <= threshold < edge_limit <= 1, got {} and {}",
                self.threshold, self.edge_limit
            )));
        }

        for (name, radius) in [
            ("erosion_radius", self.erosion_radius),
            ("feather_radius", self.feather_radius),
            ("smoothing_radius", self.smoothing_radius),
        ] {
            if !(0.0..=MAX_RADIUS).contains(&radius) {
                return Err(MatteError::InvalidConfig(format!(
                    "{name} must be within [0, {MAX_RADIUS}], got {radius}"
                )));
            }
        }

        if !self.feather_sigma.is_finite() || self.feather_sigma <= 0.0 {
            return Err(MatteError::InvalidConfig(format!(
                "feather_sigma must be finite and > 0, got {}",
                self.feather_sigma
            )));
        }

        Ok(())
    }
}
