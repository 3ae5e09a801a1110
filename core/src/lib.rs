#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the synthmap generator.
//!
//! This crate defines the vocabulary that connects the world generator, the
//! pure systems, and the rendering adapters: strongly-typed identifiers and
//! layer tags, the frozen scene/render configuration, the geometry kernel,
//! the deterministic RNG substream factory, and the region partition
//! strategy. Everything here is a pure value or a pure function; no module
//! in this crate performs I/O or holds global state.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod config;
pub mod geometry;
pub mod regions;
pub mod rng;

pub use config::{ConfigError, RenderConfig, SceneConfig, RENDER_STYLE_FLAT_RGB};
pub use geometry::BBox;
pub use regions::{partition_for_scene, QuadrantPartition, RegionId, RegionPartition};
pub use rng::{derive_seed, DrawStream};

/// Unique identifier assigned to a placed entity.
///
/// Identifiers are string tokens (`road_00000`, `bld_00017`, ...) so that
/// downstream dataset records can reference entities without knowing their
/// numeric insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(String);

impl EntityId {
    /// Creates a new entity identifier from the provided token.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Creates the canonical generator identifier `{prefix}_{index:05}`.
    #[must_use]
    pub fn indexed(prefix: &str, index: usize) -> Self {
        Self(format!("{prefix}_{index:05}"))
    }

    /// Retrieves the identifier token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier naming one generated sample, used for output file naming.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleId(String);

impl SampleId {
    /// Creates a new sample identifier.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Retrieves the identifier token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Layer a placed entity belongs to.
///
/// Layers drive both statistics bucketing and the rasterizer's fixed draw
/// order; they are deliberately coarse so new entity kinds can join an
/// existing layer without touching consumers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    /// Stroked centerline road networks.
    Roads,
    /// Building footprints.
    Buildings,
    /// Vegetation patches.
    Vegetation,
    /// Standing water bodies.
    Water,
}

impl fmt::Display for LayerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Roads => "roads",
            Self::Buildings => "buildings",
            Self::Vegetation => "vegetation",
            Self::Water => "water",
        };
        f.write_str(name)
    }
}

/// Kind of localized change applied between a T1 and a T2 state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    /// A new building is placed inside the target region.
    AddBuilding,
    /// An existing building inside the target region is removed.
    RemoveBuilding,
    /// A vegetation patch inside the target region is removed.
    ClearVegetation,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AddBuilding => "add_building",
            Self::RemoveBuilding => "remove_building",
            Self::ClearVegetation => "clear_vegetation",
        };
        f.write_str(name)
    }
}
