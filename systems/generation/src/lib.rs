#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic layered world generation.
//!
//! The generator is a pure function of `(scene config, seed)`: it walks the
//! fixed layer pipeline roads → buildings → vegetation → water, assembles
//! the entity list in that order, and attaches derived statistics. Each
//! layer draws from its own labeled substream, so layers are independent:
//! changing how many draws one layer consumes never perturbs another
//! layer's output for the same seed.

use std::f32::consts::TAU;

use glam::Vec2;
use synthmap_core::{
    geometry::{clamp_polygon, clamp_polyline, point_to_polyline_distance, polygon_centroid, rect_polygon},
    DrawStream, EntityId, RegionPartition, SceneConfig,
};
use synthmap_system_analytics::attach_derived_state;
use synthmap_world::{
    entities::Properties, BuildingEntity, Entity, Provenance, RoadEntity, VegetationEntity,
    WaterEntity, WorldState,
};

/// Probability that a scene holds exactly one road instead of two.
const SINGLE_ROAD_P: f32 = 0.7;
/// Minimum start/end separation as a fraction of the shorter canvas edge.
const ROAD_MIN_SPAN_FRAC: f32 = 0.4;
/// Attempts to re-sample a road end point before accepting it regardless.
const ROAD_ENDPOINT_ATTEMPTS: u32 = 10;

/// Probability that a building candidate must sit near a road.
const NEAR_ROAD_P: f32 = 0.82;
/// Distance to the nearest road that counts as "near", in pixels.
const NEAR_ROAD_THRESH_PX: f32 = 18.0;
/// Extra centroid separation margin between buildings, in pixels.
const BUILDING_SEP_MARGIN_PX: f32 = 6.0;
/// Rejection-sampling attempt budget per targeted building.
const BUILDING_ATTEMPTS_PER_TARGET: u32 = 25;
/// Discrete building size buckets, in pixels per axis.
const BUILDING_SIZE_BUCKETS: [(u32, u32); 3] = [(8, 12), (12, 18), (18, 26)];
/// Building class tags drawn uniformly per accepted placement.
const BUILDING_CLASSES: [&str; 3] = ["residential", "industrial", "commercial"];

/// Vegetation density tags drawn uniformly per patch.
const VEGETATION_DENSITIES: [&str; 3] = ["low", "medium", "high"];

/// Probability that the scene contains a water body.
const WATER_P: f32 = 0.35;

/// Generates the T1 world state for a scene and seed.
///
/// Identical `(scene, seed)` inputs produce a bit-identical entity set,
/// order, and ids. Derived statistics are computed once at assembly end
/// using the provided partition.
#[must_use]
pub fn generate_world_state(
    scene: &SceneConfig,
    seed: u64,
    partition: &dyn RegionPartition,
) -> WorldState {
    let root = DrawStream::from_seed(seed);
    let mut roads_rng = root.split("roads");
    let mut buildings_rng = root.split("buildings");
    let mut vegetation_rng = root.split("vegetation");
    let mut water_rng = root.split("water");

    let mut entities: Vec<Entity> = Vec::new();

    let roads = generate_roads(scene, &mut roads_rng);
    let buildings = generate_buildings(scene, &mut buildings_rng, &roads);
    let vegetation = generate_vegetation(scene, &mut vegetation_rng);

    entities.extend(roads.into_iter().map(Entity::Road));
    entities.extend(buildings.into_iter().map(Entity::Building));
    entities.extend(vegetation.into_iter().map(Entity::Vegetation));
    if water_rng.chance(WATER_P) {
        entities.push(Entity::Water(generate_water(scene, &mut water_rng)));
    }

    let state = WorldState::new(scene.clone(), entities, Provenance::new(seed));
    attach_derived_state(&state, partition)
}

fn generate_roads(scene: &SceneConfig, rng: &mut DrawStream) -> Vec<RoadEntity> {
    let width = scene.width_px();
    let height = scene.height_px();
    let min_span = scene.min_edge_px() as f32 * ROAD_MIN_SPAN_FRAC;

    let road_count = if rng.chance(SINGLE_ROAD_P) { 1 } else { 2 };
    let mut roads = Vec::with_capacity(road_count);

    for index in 0..road_count {
        let start = sample_edge_point(rng, width, height);
        let mut end = sample_edge_point(rng, width, height);

        // Re-sample the exit a few times when it lands too close to the
        // entry, then accept whatever we have.
        let mut attempts = 0;
        while start.distance(end) < min_span && attempts < ROAD_ENDPOINT_ATTEMPTS {
            end = sample_edge_point(rng, width, height);
            attempts += 1;
        }

        let mid = (start + end) / 2.0;
        let bend_strength = rng.uniform(0.05, 0.18) * scene.min_edge_px() as f32;
        let bend_angle = rng.uniform(0.0, TAU);
        let bend = mid + bend_strength * Vec2::from_angle(bend_angle);

        let polyline = clamp_polyline(&[start, bend, end], width, height);
        let class = if index == 0 { "primary" } else { "secondary" };

        roads.push(RoadEntity::new(
            EntityId::indexed("road", index),
            polyline,
            rng.int_in(5, 9),
            Properties::from([(String::from("class"), String::from(class))]),
        ));
    }

    roads
}

fn generate_buildings(
    scene: &SceneConfig,
    rng: &mut DrawStream,
    roads: &[RoadEntity],
) -> Vec<BuildingEntity> {
    let width = scene.width_px();
    let height = scene.height_px();

    // Roads pull settlement density up.
    let target = if roads.is_empty() {
        rng.int_in(10, 30)
    } else {
        rng.int_in(30, 80)
    };
    let max_attempts = target * BUILDING_ATTEMPTS_PER_TARGET;

    let mut buildings: Vec<BuildingEntity> = Vec::new();
    let mut attempts = 0;

    while (buildings.len() as u32) < target && attempts < max_attempts {
        attempts += 1;

        let center = Vec2::new(
            rng.uniform(0.0, (width - 1) as f32),
            rng.uniform(0.0, (height - 1) as f32),
        );

        if !roads.is_empty() && rng.chance(NEAR_ROAD_P) {
            let nearest = roads
                .iter()
                .map(|road| point_to_polyline_distance(center, road.polyline()))
                .fold(f32::INFINITY, f32::min);
            if nearest > NEAR_ROAD_THRESH_PX {
                continue;
            }
        }

        let (w_lo, w_hi) = *rng.choice(&BUILDING_SIZE_BUCKETS);
        let (h_lo, h_hi) = *rng.choice(&BUILDING_SIZE_BUCKETS);
        let w_px = rng.int_in(w_lo, w_hi) as f32;
        let h_px = rng.int_in(h_lo, h_hi) as f32;
        let angle = rng.uniform(-0.4, 0.4);

        let polygon = clamp_polygon(&rect_polygon(center, w_px, h_px, angle), width, height);

        // Centroid-distance separation against the larger side. Deliberately
        // loose for elongated rotated footprints; density stats depend on it.
        let min_separation = w_px.max(h_px) / 2.0 + BUILDING_SEP_MARGIN_PX;
        let too_close = buildings
            .iter()
            .any(|placed| center.distance(polygon_centroid(placed.polygon())) < min_separation);
        if too_close {
            continue;
        }

        let class = *rng.choice(&BUILDING_CLASSES);
        buildings.push(BuildingEntity::new(
            EntityId::indexed("bld", buildings.len()),
            polygon,
            Properties::from([(String::from("class"), String::from(class))]),
        ));
    }

    buildings
}

fn generate_vegetation(scene: &SceneConfig, rng: &mut DrawStream) -> Vec<VegetationEntity> {
    let width = scene.width_px();
    let height = scene.height_px();

    let patch_count = rng.int_in(2, 5);
    let mut patches = Vec::with_capacity(patch_count as usize);

    for index in 0..patch_count {
        let center = Vec2::new(
            rng.uniform(0.0, (width - 1) as f32),
            rng.uniform(0.0, (height - 1) as f32),
        );
        let w_px = rng.int_in(60, 160) as f32;
        let h_px = rng.int_in(60, 160) as f32;
        let angle = rng.uniform(0.0, TAU);

        let polygon = clamp_polygon(&rect_polygon(center, w_px, h_px, angle), width, height);
        let density = *rng.choice(&VEGETATION_DENSITIES);

        patches.push(VegetationEntity::new(
            EntityId::indexed("veg", index as usize),
            polygon,
            Properties::from([(String::from("density"), String::from(density))]),
        ));
    }

    patches
}

fn generate_water(scene: &SceneConfig, rng: &mut DrawStream) -> WaterEntity {
    let width = scene.width_px();
    let height = scene.height_px();

    let center = Vec2::new(
        rng.uniform(0.0, (width - 1) as f32),
        rng.uniform(0.0, (height - 1) as f32),
    );
    let w_px = rng.int_in(80, 200) as f32;
    let h_px = rng.int_in(80, 200) as f32;
    let angle = rng.uniform(0.0, TAU);

    let polygon = clamp_polygon(&rect_polygon(center, w_px, h_px, angle), width, height);

    WaterEntity::new(
        EntityId::indexed("water", 0),
        polygon,
        Properties::from([(String::from("type"), String::from("lake"))]),
    )
}

fn sample_edge_point(rng: &mut DrawStream, width_px: u32, height_px: u32) -> Vec2 {
    let max_x = (width_px - 1) as f32;
    let max_y = (height_px - 1) as f32;

    match rng.int_in(0, 3) {
        0 => Vec2::new(rng.uniform(0.0, max_x), 0.0),
        1 => Vec2::new(max_x, rng.uniform(0.0, max_y)),
        2 => Vec2::new(rng.uniform(0.0, max_x), max_y),
        _ => Vec2::new(0.0, rng.uniform(0.0, max_y)),
    }
}
