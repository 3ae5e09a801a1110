//! Placed scene entities and their geometry.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use synthmap_core::{EntityId, LayerKind};

/// Free-form string properties attached to an entity (class, density, ...).
pub type Properties = BTreeMap<String, String>;

/// Road entity: a stroked centerline polyline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoadEntity {
    id: EntityId,
    polyline: Vec<Vec2>,
    width_px: u32,
    properties: Properties,
}

impl RoadEntity {
    /// Creates a new road entity.
    ///
    /// # Panics
    ///
    /// Panics when `width_px` is zero; roads always stroke at least one
    /// pixel.
    #[must_use]
    pub fn new(id: EntityId, polyline: Vec<Vec2>, width_px: u32, properties: Properties) -> Self {
        assert!(width_px >= 1, "road stroke width must be at least 1 px");
        Self {
            id,
            polyline,
            width_px,
            properties,
        }
    }

    /// Identifier of the road.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Centerline vertices in canvas coordinates.
    #[must_use]
    pub fn polyline(&self) -> &[Vec2] {
        &self.polyline
    }

    /// Stroke width in pixels.
    #[must_use]
    pub const fn width_px(&self) -> u32 {
        self.width_px
    }

    /// Free-form properties of the road.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Building entity: a footprint polygon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BuildingEntity {
    id: EntityId,
    polygon: Vec<Vec2>,
    properties: Properties,
}

impl BuildingEntity {
    /// Creates a new building entity.
    ///
    /// # Panics
    ///
    /// Panics when `polygon` is empty.
    #[must_use]
    pub fn new(id: EntityId, polygon: Vec<Vec2>, properties: Properties) -> Self {
        assert!(!polygon.is_empty(), "building polygon must be non-empty");
        Self {
            id,
            polygon,
            properties,
        }
    }

    /// Identifier of the building.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Footprint vertices in canvas coordinates.
    #[must_use]
    pub fn polygon(&self) -> &[Vec2] {
        &self.polygon
    }

    /// Free-form properties of the building.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Vegetation entity: a patch polygon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VegetationEntity {
    id: EntityId,
    polygon: Vec<Vec2>,
    properties: Properties,
}

impl VegetationEntity {
    /// Creates a new vegetation entity.
    ///
    /// # Panics
    ///
    /// Panics when `polygon` is empty.
    #[must_use]
    pub fn new(id: EntityId, polygon: Vec<Vec2>, properties: Properties) -> Self {
        assert!(!polygon.is_empty(), "vegetation polygon must be non-empty");
        Self {
            id,
            polygon,
            properties,
        }
    }

    /// Identifier of the patch.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Patch vertices in canvas coordinates.
    #[must_use]
    pub fn polygon(&self) -> &[Vec2] {
        &self.polygon
    }

    /// Free-form properties of the patch.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// Water entity: a body polygon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaterEntity {
    id: EntityId,
    polygon: Vec<Vec2>,
    properties: Properties,
}

impl WaterEntity {
    /// Creates a new water entity.
    ///
    /// # Panics
    ///
    /// Panics when `polygon` is empty.
    #[must_use]
    pub fn new(id: EntityId, polygon: Vec<Vec2>, properties: Properties) -> Self {
        assert!(!polygon.is_empty(), "water polygon must be non-empty");
        Self {
            id,
            polygon,
            properties,
        }
    }

    /// Identifier of the water body.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        &self.id
    }

    /// Body vertices in canvas coordinates.
    #[must_use]
    pub fn polygon(&self) -> &[Vec2] {
        &self.polygon
    }

    /// Free-form properties of the water body.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        &self.properties
    }
}

/// One placed entity of the scene.
///
/// The tagged union is closed on purpose: the stats aggregator and the
/// rasterizer pattern-match on the variant rather than dispatching through
/// an open trait, so every consumer handles every kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    /// A stroked road centerline.
    Road(RoadEntity),
    /// A building footprint.
    Building(BuildingEntity),
    /// A vegetation patch.
    Vegetation(VegetationEntity),
    /// A water body.
    Water(WaterEntity),
}

impl Entity {
    /// Identifier of the entity, unique within one world state.
    #[must_use]
    pub fn id(&self) -> &EntityId {
        match self {
            Self::Road(road) => road.id(),
            Self::Building(building) => building.id(),
            Self::Vegetation(vegetation) => vegetation.id(),
            Self::Water(water) => water.id(),
        }
    }

    /// Layer the entity belongs to.
    #[must_use]
    pub const fn layer(&self) -> LayerKind {
        match self {
            Self::Road(_) => LayerKind::Roads,
            Self::Building(_) => LayerKind::Buildings,
            Self::Vegetation(_) => LayerKind::Vegetation,
            Self::Water(_) => LayerKind::Water,
        }
    }

    /// Free-form properties of the entity.
    #[must_use]
    pub fn properties(&self) -> &Properties {
        match self {
            Self::Road(road) => road.properties(),
            Self::Building(building) => building.properties(),
            Self::Vegetation(vegetation) => vegetation.properties(),
            Self::Water(water) => water.properties(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BuildingEntity, Entity, Properties, RoadEntity};
    use glam::Vec2;
    use synthmap_core::{EntityId, LayerKind};

    #[test]
    fn entity_layer_follows_variant() {
        let road = Entity::Road(RoadEntity::new(
            EntityId::indexed("road", 0),
            vec![Vec2::ZERO, Vec2::new(10.0, 0.0)],
            6,
            Properties::new(),
        ));
        assert_eq!(road.layer(), LayerKind::Roads);
        assert_eq!(road.id().as_str(), "road_00000");
    }

    #[test]
    #[should_panic(expected = "non-empty")]
    fn empty_building_polygon_panics() {
        let _ = BuildingEntity::new(EntityId::indexed("bld", 0), Vec::new(), Properties::new());
    }

    #[test]
    #[should_panic(expected = "at least 1 px")]
    fn zero_width_road_panics() {
        let _ = RoadEntity::new(
            EntityId::indexed("road", 0),
            vec![Vec2::ZERO],
            0,
            Properties::new(),
        );
    }

    #[test]
    fn entity_round_trips_through_bincode() {
        let entity = Entity::Building(BuildingEntity::new(
            EntityId::indexed("bld", 3),
            vec![Vec2::ZERO, Vec2::new(4.0, 0.0), Vec2::new(4.0, 4.0)],
            Properties::from([(String::from("class"), String::from("residential"))]),
        ));
        let bytes = bincode::serialize(&entity).expect("serialize");
        let restored: Entity = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, entity);
    }
}
