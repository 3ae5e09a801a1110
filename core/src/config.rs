//! Frozen scene and render configuration consumed by the generator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest supported canvas edge in pixels.
pub const MIN_SCENE_EDGE_PX: u32 = 64;

/// Largest supported ground resolution in meters per pixel.
pub const MAX_METERS_PER_PX: f32 = 30.0;

/// The only render style the raster adapter currently supports.
pub const RENDER_STYLE_FLAT_RGB: &str = "flat_rgb";

/// Errors raised while constructing configuration values.
///
/// Configuration errors are fatal: they are reported before any generation
/// starts and are never retried.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The requested canvas is smaller than the supported minimum.
    #[error("scene must be at least {MIN_SCENE_EDGE_PX}x{MIN_SCENE_EDGE_PX} px, got {width_px}x{height_px}")]
    SceneTooSmall {
        /// Requested canvas width in pixels.
        width_px: u32,
        /// Requested canvas height in pixels.
        height_px: u32,
    },
    /// The ground resolution lies outside the supported range.
    #[error("meters_per_px must lie in (0, {MAX_METERS_PER_PX}], got {meters_per_px}")]
    MetersPerPxOutOfRange {
        /// Requested ground resolution.
        meters_per_px: f32,
    },
    /// The scene names a region partition this build does not provide.
    #[error("unsupported region partition kind: {kind}")]
    UnsupportedPartition {
        /// Partition tag taken from the scene configuration.
        kind: String,
    },
}

/// Immutable scene parameters shared by every sample of a run.
///
/// The biome, terrain, and partition tags are frozen to their single
/// supported values for now but travel with the scene so future variants
/// extend the schema instead of replacing it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneConfig {
    width_px: u32,
    height_px: u32,
    meters_per_px: f32,
    biome: String,
    terrain: String,
    region_partition: String,
}

impl SceneConfig {
    /// Creates a validated scene configuration with the default tags.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when either canvas edge is below
    /// [`MIN_SCENE_EDGE_PX`] or the ground resolution lies outside
    /// `(0, MAX_METERS_PER_PX]`.
    pub fn new(width_px: u32, height_px: u32, meters_per_px: f32) -> Result<Self, ConfigError> {
        if width_px < MIN_SCENE_EDGE_PX || height_px < MIN_SCENE_EDGE_PX {
            return Err(ConfigError::SceneTooSmall {
                width_px,
                height_px,
            });
        }
        if !(meters_per_px > 0.0 && meters_per_px <= MAX_METERS_PER_PX) {
            return Err(ConfigError::MetersPerPxOutOfRange { meters_per_px });
        }

        Ok(Self {
            width_px,
            height_px,
            meters_per_px,
            biome: String::from("temperate"),
            terrain: String::from("flat"),
            region_partition: String::from("quadrants"),
        })
    }

    /// Canvas width in pixels.
    #[must_use]
    pub const fn width_px(&self) -> u32 {
        self.width_px
    }

    /// Canvas height in pixels.
    #[must_use]
    pub const fn height_px(&self) -> u32 {
        self.height_px
    }

    /// Ground resolution in meters covered by one pixel.
    #[must_use]
    pub const fn meters_per_px(&self) -> f32 {
        self.meters_per_px
    }

    /// Biome tag describing the world distribution.
    #[must_use]
    pub fn biome(&self) -> &str {
        &self.biome
    }

    /// Terrain tag describing the world distribution.
    #[must_use]
    pub fn terrain(&self) -> &str {
        &self.terrain
    }

    /// Region partition tag used for localized statistics and changes.
    #[must_use]
    pub fn region_partition(&self) -> &str {
        &self.region_partition
    }

    /// Shorter canvas edge in pixels.
    #[must_use]
    pub fn min_edge_px(&self) -> u32 {
        self.width_px.min(self.height_px)
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            width_px: 512,
            height_px: 512,
            meters_per_px: 1.0,
            biome: String::from("temperate"),
            terrain: String::from("flat"),
            region_partition: String::from("quadrants"),
        }
    }
}

/// Rendering configuration consumed by the raster adapter.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    style: String,
}

impl RenderConfig {
    /// Creates a render configuration with the provided style tag.
    ///
    /// The tag is validated by the raster adapter, not here, so that a
    /// configuration file can carry styles this build does not know about
    /// and still fail with a single authoritative error.
    #[must_use]
    pub fn new(style: impl Into<String>) -> Self {
        Self {
            style: style.into(),
        }
    }

    /// Style tag selecting the render implementation.
    #[must_use]
    pub fn style(&self) -> &str {
        &self.style
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            style: String::from(RENDER_STYLE_FLAT_RGB),
        }
    }
}
