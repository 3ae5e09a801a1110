#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Canonical world state for synthmap scenes.
//!
//! A [`WorldState`] is an immutable value: the frozen scene parameters, the
//! ordered entity list, an optional derived-stats snapshot, and provenance
//! fixed at creation. All "mutation" constructs a new owned value via
//! [`WorldState::with_entities`] / [`WorldState::with_derived`]; prior
//! values remain valid, which is what makes batch generation trivially
//! parallel and change operators safe to replay.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use synthmap_core::{RegionId, SceneConfig};

pub mod constraints;
pub mod entities;

pub use entities::{
    BuildingEntity, Entity, Properties, RoadEntity, VegetationEntity, WaterEntity,
};

/// Version tag of the serialized world-state schema.
pub const SCHEMA_VERSION: &str = "v1";

/// Version tag of the generator that produced a state.
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reproducibility record fixed when a state is created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provenance {
    seed: u64,
    schema_version: String,
    generator_version: String,
}

impl Provenance {
    /// Creates provenance for the provided seed with the current versions.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            schema_version: String::from(SCHEMA_VERSION),
            generator_version: String::from(GENERATOR_VERSION),
        }
    }

    /// Seed the state was generated from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Schema version the state was written with.
    #[must_use]
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// Generator version the state was produced by.
    #[must_use]
    pub fn generator_version(&self) -> &str {
        &self.generator_version
    }
}

/// Aggregate statistics for one region of the scene.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionStats {
    /// Number of buildings whose centroid falls in the region.
    pub building_count: u32,
    /// Accumulated road centerline length in pixels.
    pub road_length_px: f32,
    /// Accumulated vegetation bounding-box area in pixels.
    pub vegetation_area_px: u64,
    /// Accumulated water bounding-box area in pixels.
    pub water_area_px: u64,
}

/// Scene-wide aggregate statistics.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    /// Number of buildings in the scene.
    pub building_count: u32,
    /// Total road centerline length in pixels.
    pub road_length_px: f32,
    /// Total vegetation bounding-box area in pixels.
    pub vegetation_area_px: u64,
    /// Total water bounding-box area in pixels.
    pub water_area_px: u64,
}

/// Statistics derived from the entity list by the analytics system.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DerivedState {
    /// Per-region statistics, one entry per partition region.
    pub region_stats: BTreeMap<RegionId, RegionStats>,
    /// Scene-wide statistics.
    pub global_stats: GlobalStats,
    /// Reserved entity-adjacency map; empty until a relation model lands.
    pub adjacency: BTreeMap<String, Vec<String>>,
}

/// Canonical structured scene description.
///
/// Images and labels are rendered *from* this value; it is never updated in
/// place.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    scene: SceneConfig,
    entities: Vec<Entity>,
    derived: Option<DerivedState>,
    provenance: Provenance,
}

impl WorldState {
    /// Creates a new world state with no derived stats attached.
    ///
    /// Entity order is meaningful: it is the generation order and is part of
    /// the deterministic output contract.
    #[must_use]
    pub fn new(scene: SceneConfig, entities: Vec<Entity>, provenance: Provenance) -> Self {
        debug_assert_unique_ids(&entities);
        Self {
            scene,
            entities,
            derived: None,
            provenance,
        }
    }

    /// Scene parameters the state was generated for.
    #[must_use]
    pub fn scene(&self) -> &SceneConfig {
        &self.scene
    }

    /// Entities in generation order.
    #[must_use]
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Derived statistics, if they have been computed for this exact value.
    #[must_use]
    pub fn derived(&self) -> Option<&DerivedState> {
        self.derived.as_ref()
    }

    /// Provenance fixed at creation.
    #[must_use]
    pub fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    /// Returns a new state with the provided entity list.
    ///
    /// Any previously attached derived stats are dropped: they described the
    /// old entity list and must be recomputed.
    #[must_use]
    pub fn with_entities(&self, entities: Vec<Entity>) -> Self {
        debug_assert_unique_ids(&entities);
        Self {
            scene: self.scene.clone(),
            entities,
            derived: None,
            provenance: self.provenance.clone(),
        }
    }

    /// Returns a new state with the provided derived stats attached.
    #[must_use]
    pub fn with_derived(&self, derived: DerivedState) -> Self {
        Self {
            scene: self.scene.clone(),
            entities: self.entities.clone(),
            derived: Some(derived),
            provenance: self.provenance.clone(),
        }
    }
}

fn debug_assert_unique_ids(entities: &[Entity]) {
    if cfg!(debug_assertions) {
        let mut seen = std::collections::BTreeSet::new();
        for entity in entities {
            assert!(
                seen.insert(entity.id().as_str().to_string()),
                "duplicate entity id: {}",
                entity.id()
            );
        }
    }
}
