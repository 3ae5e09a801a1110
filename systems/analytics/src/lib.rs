#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Derived-statistics aggregation over a world state's entities.

use std::collections::BTreeMap;

use synthmap_core::{
    geometry::{polygon_centroid, polyline_length_px, BBox},
    RegionPartition,
};
use synthmap_world::{DerivedState, Entity, GlobalStats, RegionStats, WorldState};

/// Computes derived statistics in a single pass over the entity list.
///
/// Buildings increment the per-region and global building counts keyed by
/// their centroid's region. Roads accumulate global centerline length only;
/// they routinely span several regions, so a per-region split would be
/// arbitrary. Vegetation and water accumulate bounding-box pixel area both
/// per region (again keyed by centroid) and globally.
///
/// The result describes exactly the entity list it was computed from; any
/// state holding a different list must recompute.
#[must_use]
pub fn compute_derived_state(
    state: &WorldState,
    partition: &dyn RegionPartition,
) -> DerivedState {
    let mut region_stats: BTreeMap<_, _> = partition
        .regions()
        .into_iter()
        .map(|region| (region, RegionStats::default()))
        .collect();
    let mut global_stats = GlobalStats::default();

    for entity in state.entities() {
        match entity {
            Entity::Building(building) => {
                let region = partition.region_of(polygon_centroid(building.polygon()));
                if let Some(stats) = region_stats.get_mut(&region) {
                    stats.building_count += 1;
                }
                global_stats.building_count += 1;
            }
            Entity::Road(road) => {
                global_stats.road_length_px += polyline_length_px(road.polyline());
            }
            Entity::Vegetation(vegetation) => {
                let area = BBox::of_points(vegetation.polygon()).area_px();
                let region = partition.region_of(polygon_centroid(vegetation.polygon()));
                if let Some(stats) = region_stats.get_mut(&region) {
                    stats.vegetation_area_px += area;
                }
                global_stats.vegetation_area_px += area;
            }
            Entity::Water(water) => {
                let area = BBox::of_points(water.polygon()).area_px();
                let region = partition.region_of(polygon_centroid(water.polygon()));
                if let Some(stats) = region_stats.get_mut(&region) {
                    stats.water_area_px += area;
                }
                global_stats.water_area_px += area;
            }
        }
    }

    DerivedState {
        region_stats,
        global_stats,
        adjacency: BTreeMap::new(),
    }
}

/// Returns a new state with freshly computed derived statistics attached.
#[must_use]
pub fn attach_derived_state(state: &WorldState, partition: &dyn RegionPartition) -> WorldState {
    let derived = compute_derived_state(state, partition);
    state.with_derived(derived)
}

#[cfg(test)]
mod tests {
    use super::{attach_derived_state, compute_derived_state};
    use glam::Vec2;
    use synthmap_core::{EntityId, QuadrantPartition, RegionId, SceneConfig};
    use synthmap_world::{
        entities::Properties, BuildingEntity, Entity, Provenance, RoadEntity, VegetationEntity,
        WaterEntity, WorldState,
    };

    fn square(min: Vec2, size: f32) -> Vec<Vec2> {
        vec![
            min,
            min + Vec2::new(size, 0.0),
            min + Vec2::new(size, size),
            min + Vec2::new(0.0, size),
        ]
    }

    fn state_of(entities: Vec<Entity>) -> WorldState {
        WorldState::new(SceneConfig::default(), entities, Provenance::new(0))
    }

    #[test]
    fn buildings_bucket_by_centroid_region() {
        let entities = vec![
            Entity::Building(BuildingEntity::new(
                EntityId::indexed("bld", 0),
                square(Vec2::new(10.0, 10.0), 8.0),
                Properties::new(),
            )),
            Entity::Building(BuildingEntity::new(
                EntityId::indexed("bld", 1),
                square(Vec2::new(300.0, 300.0), 8.0),
                Properties::new(),
            )),
            Entity::Building(BuildingEntity::new(
                EntityId::indexed("bld", 2),
                square(Vec2::new(310.0, 290.0), 8.0),
                Properties::new(),
            )),
        ];
        let state = state_of(entities);
        let partition = QuadrantPartition::for_scene(state.scene());

        let derived = compute_derived_state(&state, &partition);
        assert_eq!(derived.region_stats[&RegionId::NW].building_count, 1);
        assert_eq!(derived.region_stats[&RegionId::SE].building_count, 2);
        assert_eq!(derived.global_stats.building_count, 3);
    }

    #[test]
    fn regional_building_counts_sum_to_global() {
        let mut entities = Vec::new();
        for index in 0..17 {
            let min = Vec2::new((index * 29 % 480) as f32, (index * 71 % 480) as f32);
            entities.push(Entity::Building(BuildingEntity::new(
                EntityId::indexed("bld", index),
                square(min, 10.0),
                Properties::new(),
            )));
        }
        let state = state_of(entities);
        let partition = QuadrantPartition::for_scene(state.scene());

        let derived = compute_derived_state(&state, &partition);
        let regional_sum: u32 = derived
            .region_stats
            .values()
            .map(|stats| stats.building_count)
            .sum();
        assert_eq!(regional_sum, derived.global_stats.building_count);
        assert_eq!(derived.global_stats.building_count, 17);
    }

    #[test]
    fn roads_accumulate_global_length_only() {
        let entities = vec![Entity::Road(RoadEntity::new(
            EntityId::indexed("road", 0),
            vec![Vec2::new(0.0, 0.0), Vec2::new(300.0, 400.0)],
            6,
            Properties::new(),
        ))];
        let state = state_of(entities);
        let partition = QuadrantPartition::for_scene(state.scene());

        let derived = compute_derived_state(&state, &partition);
        assert!((derived.global_stats.road_length_px - 500.0).abs() < 1e-3);
        for stats in derived.region_stats.values() {
            assert_eq!(stats.road_length_px, 0.0);
        }
    }

    #[test]
    fn vegetation_and_water_accumulate_bbox_area() {
        let entities = vec![
            Entity::Vegetation(VegetationEntity::new(
                EntityId::indexed("veg", 0),
                square(Vec2::new(20.0, 20.0), 50.0),
                Properties::new(),
            )),
            Entity::Water(WaterEntity::new(
                EntityId::indexed("water", 0),
                square(Vec2::new(300.0, 300.0), 100.0),
                Properties::new(),
            )),
        ];
        let state = state_of(entities);
        let partition = QuadrantPartition::for_scene(state.scene());

        let derived = compute_derived_state(&state, &partition);
        assert_eq!(derived.region_stats[&RegionId::NW].vegetation_area_px, 2500);
        assert_eq!(derived.region_stats[&RegionId::SE].water_area_px, 10000);
        assert_eq!(derived.global_stats.vegetation_area_px, 2500);
        assert_eq!(derived.global_stats.water_area_px, 10000);
    }

    #[test]
    fn empty_state_yields_zeroed_regions() {
        let state = state_of(Vec::new());
        let partition = QuadrantPartition::for_scene(state.scene());

        let derived = compute_derived_state(&state, &partition);
        assert_eq!(derived.region_stats.len(), 4);
        assert_eq!(derived.global_stats, Default::default());
        assert!(derived.adjacency.is_empty());
    }

    #[test]
    fn attach_derived_state_produces_new_value() {
        let state = state_of(Vec::new());
        let partition = QuadrantPartition::for_scene(state.scene());

        let with_stats = attach_derived_state(&state, &partition);
        assert!(state.derived().is_none());
        assert!(with_stats.derived().is_some());
    }
}
