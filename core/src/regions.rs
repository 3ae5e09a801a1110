//! Region partition strategy used for localized statistics and changes.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, SceneConfig};

/// One of the four fixed quadrant regions of a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RegionId {
    /// North-west quadrant.
    NW,
    /// North-east quadrant.
    NE,
    /// South-west quadrant.
    SW,
    /// South-east quadrant.
    SE,
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NW => "NW",
            Self::NE => "NE",
            Self::SW => "SW",
            Self::SE => "SE",
        };
        f.write_str(name)
    }
}

/// Strategy mapping points to regions.
///
/// The generator, the stats aggregator, and the change operators only ever
/// talk to this trait, so a future partition (tiles, arbitrary polygons) can
/// be substituted without touching them.
pub trait RegionPartition {
    /// Classifies a point into exactly one region.
    fn region_of(&self, point: Vec2) -> RegionId;

    /// Enumerates every region of the partition in a fixed order.
    fn regions(&self) -> Vec<RegionId>;
}

/// Quadrant partition splitting the canvas at the midpoints `W/2`, `H/2`.
///
/// Classification uses strict `<` comparisons on the west and north axes, so
/// a point exactly on a midline belongs to the east/south side and the point
/// `(W/2, H/2)` classifies as [`RegionId::SE`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QuadrantPartition {
    width_px: u32,
    height_px: u32,
}

impl QuadrantPartition {
    /// Creates a quadrant partition for the provided canvas dimensions.
    #[must_use]
    pub const fn new(width_px: u32, height_px: u32) -> Self {
        Self {
            width_px,
            height_px,
        }
    }

    /// Creates the quadrant partition matching a scene's canvas.
    #[must_use]
    pub const fn for_scene(scene: &SceneConfig) -> Self {
        Self::new(scene.width_px(), scene.height_px())
    }
}

impl RegionPartition for QuadrantPartition {
    fn region_of(&self, point: Vec2) -> RegionId {
        let mid_x = self.width_px as f32 / 2.0;
        let mid_y = self.height_px as f32 / 2.0;

        let is_west = point.x < mid_x;
        let is_north = point.y < mid_y;

        match (is_north, is_west) {
            (true, true) => RegionId::NW,
            (true, false) => RegionId::NE,
            (false, true) => RegionId::SW,
            (false, false) => RegionId::SE,
        }
    }

    fn regions(&self) -> Vec<RegionId> {
        vec![RegionId::NW, RegionId::NE, RegionId::SW, RegionId::SE]
    }
}

/// Builds the partition named by the scene's `region_partition` tag.
///
/// # Errors
///
/// Returns [`ConfigError::UnsupportedPartition`] when the scene names a
/// partition kind this build does not provide. That is a fatal configuration
/// error: it is raised before generation starts and never retried.
pub fn partition_for_scene(scene: &SceneConfig) -> Result<Box<dyn RegionPartition>, ConfigError> {
    match scene.region_partition() {
        "quadrants" => Ok(Box::new(QuadrantPartition::for_scene(scene))),
        other => Err(ConfigError::UnsupportedPartition {
            kind: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{partition_for_scene, QuadrantPartition, RegionId, RegionPartition};
    use crate::config::SceneConfig;
    use glam::Vec2;

    #[test]
    fn every_point_maps_to_exactly_one_region() {
        let partition = QuadrantPartition::new(64, 64);
        let mut counts = [0u32; 4];
        for y in 0..64 {
            for x in 0..64 {
                let region = partition.region_of(Vec2::new(x as f32, y as f32));
                counts[region as usize] += 1;
            }
        }
        assert_eq!(counts, [32 * 32; 4]);
    }

    #[test]
    fn center_point_classifies_south_east() {
        let partition = QuadrantPartition::new(512, 512);
        assert_eq!(partition.region_of(Vec2::new(256.0, 256.0)), RegionId::SE);
    }

    #[test]
    fn midline_points_resolve_east_and_south() {
        let partition = QuadrantPartition::new(512, 512);
        assert_eq!(partition.region_of(Vec2::new(256.0, 10.0)), RegionId::NE);
        assert_eq!(partition.region_of(Vec2::new(10.0, 256.0)), RegionId::SW);
    }

    #[test]
    fn quadrant_corners_classify_as_expected() {
        let partition = QuadrantPartition::new(512, 512);
        assert_eq!(partition.region_of(Vec2::new(0.0, 0.0)), RegionId::NW);
        assert_eq!(partition.region_of(Vec2::new(511.0, 0.0)), RegionId::NE);
        assert_eq!(partition.region_of(Vec2::new(0.0, 511.0)), RegionId::SW);
        assert_eq!(partition.region_of(Vec2::new(511.0, 511.0)), RegionId::SE);
    }

    #[test]
    fn partition_enumerates_four_regions() {
        let partition = QuadrantPartition::new(128, 128);
        assert_eq!(
            partition.regions(),
            vec![RegionId::NW, RegionId::NE, RegionId::SW, RegionId::SE]
        );
    }

    #[test]
    fn scene_tag_selects_quadrants() {
        let scene = SceneConfig::default();
        let partition = partition_for_scene(&scene).expect("quadrants are supported");
        assert_eq!(partition.regions().len(), 4);
    }
}
