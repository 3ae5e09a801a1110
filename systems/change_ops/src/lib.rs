#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Change operators deriving a localized T2 state from a T1 state.
//!
//! Every operator is a pure function `(T1 state, rng, region, partition) →
//! OpResult`: the input state is never touched, the produced state shares
//! unmodified entity data structurally, and derived statistics are dropped
//! from the copy because they describe the old entity list.
//!
//! Failure is data, not an exception. When an operator cannot find a valid
//! target or placement it returns the *unchanged* T1 state tagged with the
//! `failed = "true"` sentinel parameter, so batch callers can skip a failed
//! `(region, operator)` pair and move on without aborting.

use std::collections::BTreeMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use synthmap_core::{
    geometry::{clamp_polygon, polygon_centroid, rect_polygon},
    ChangeType, DrawStream, EntityId, RegionId, RegionPartition,
};
use synthmap_world::{entities::Properties, BuildingEntity, Entity, WorldState};

/// Sentinel parameter key marking a failed operator result.
pub const PARAM_FAILED: &str = "failed";
/// Parameter key carrying the failure reason, when one is known.
pub const PARAM_REASON: &str = "reason";

/// Placement attempts before add-building gives up on a region.
const ADD_BUILDING_ATTEMPTS: u32 = 250;

/// Normalized operator result.
#[derive(Clone, Debug, PartialEq)]
pub struct OpResult {
    /// The produced T2 state; equal to the input state for failed results.
    pub state_t2: WorldState,
    /// Identifiers of entities the operator added, each recorded once.
    pub added: Vec<EntityId>,
    /// Identifiers of entities the operator removed, each recorded once.
    pub removed: Vec<EntityId>,
    /// Identifiers of entities the operator modified, each recorded once.
    pub modified: Vec<EntityId>,
    /// String-keyed operator parameters, including the failure sentinel.
    pub params: BTreeMap<String, String>,
}

impl OpResult {
    fn applied(state_t2: WorldState) -> Self {
        Self {
            state_t2,
            added: Vec::new(),
            removed: Vec::new(),
            modified: Vec::new(),
            params: BTreeMap::new(),
        }
    }

    fn failed(state_t1: &WorldState, reason: Option<&str>) -> Self {
        let mut params = BTreeMap::new();
        let _ = params.insert(String::from(PARAM_FAILED), String::from("true"));
        if let Some(reason) = reason {
            let _ = params.insert(String::from(PARAM_REASON), String::from(reason));
        }
        Self {
            state_t2: state_t1.clone(),
            added: Vec::new(),
            removed: Vec::new(),
            modified: Vec::new(),
            params,
        }
    }

    /// Reports whether this result carries the failure sentinel.
    ///
    /// A failed result never changes entities; a genuine no-op success does
    /// not carry the sentinel, which is how the two are told apart.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.params.get(PARAM_FAILED).map(String::as_str) == Some("true")
    }
}

/// Ground-truth record of what changed between T1 and T2.
///
/// Created once per successful operator application and immutable
/// afterwards; downstream record assembly serializes it as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeLog {
    /// Kind of change that was applied.
    pub change_type: ChangeType,
    /// Region the change targeted.
    pub region: RegionId,
    /// Identifiers of added entities.
    pub added_ids: Vec<EntityId>,
    /// Identifiers of removed entities.
    pub removed_ids: Vec<EntityId>,
    /// Identifiers of modified entities.
    pub modified_ids: Vec<EntityId>,
    /// Operator parameters recorded at application time.
    pub params: BTreeMap<String, String>,
}

impl ChangeLog {
    /// Builds the change log for a successfully applied operator result.
    ///
    /// # Panics
    ///
    /// Panics when `result` carries the failure sentinel; failed results
    /// have no change to log.
    #[must_use]
    pub fn from_applied(change_type: ChangeType, region: RegionId, result: &OpResult) -> Self {
        assert!(
            !result.is_failed(),
            "cannot build a change log from a failed operator result"
        );
        Self {
            change_type,
            region,
            added_ids: result.added.clone(),
            removed_ids: result.removed.clone(),
            modified_ids: result.modified.clone(),
            params: result.params.clone(),
        }
    }
}

/// A named pure change operator.
pub trait ChangeOperator {
    /// Kind of change this operator applies.
    fn change_type(&self) -> ChangeType;

    /// Applies the operator to a T1 state, targeting `region`.
    fn apply(
        &self,
        state_t1: &WorldState,
        rng: &mut DrawStream,
        region: RegionId,
        partition: &dyn RegionPartition,
    ) -> OpResult;
}

/// Adds one building inside the target region.
///
/// The center is found by rejection sampling against the partition; on
/// exhaustion the result is a soft failure with the T1 state unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct AddBuildingOp;

impl ChangeOperator for AddBuildingOp {
    fn change_type(&self) -> ChangeType {
        ChangeType::AddBuilding
    }

    fn apply(
        &self,
        state_t1: &WorldState,
        rng: &mut DrawStream,
        region: RegionId,
        partition: &dyn RegionPartition,
    ) -> OpResult {
        let width = state_t1.scene().width_px();
        let height = state_t1.scene().height_px();

        for _ in 0..ADD_BUILDING_ATTEMPTS {
            let center = Vec2::new(
                rng.uniform(0.0, (width - 1) as f32),
                rng.uniform(0.0, (height - 1) as f32),
            );
            if partition.region_of(center) != region {
                continue;
            }

            let w_px = rng.int_in(10, 22) as f32;
            let h_px = rng.int_in(10, 22) as f32;
            let angle = rng.uniform(-0.4, 0.4);

            let polygon =
                clamp_polygon(&rect_polygon(center, w_px, h_px, angle), width, height);
            let id = EntityId::new(format!("bld_added_{}", rng.int_in(0, 2_000_000_000)));

            let mut entities = state_t1.entities().to_vec();
            entities.push(Entity::Building(BuildingEntity::new(
                id.clone(),
                polygon,
                Properties::from([(String::from("class"), String::from("new"))]),
            )));

            let mut result = OpResult::applied(state_t1.with_entities(entities));
            result.added.push(id);
            let _ = result
                .params
                .insert(String::from("w_px"), format!("{w_px:.2}"));
            let _ = result
                .params
                .insert(String::from("h_px"), format!("{h_px:.2}"));
            return result;
        }

        OpResult::failed(state_t1, None)
    }
}

/// Removes one building whose centroid falls in the target region.
#[derive(Clone, Copy, Debug, Default)]
pub struct RemoveBuildingOp;

impl ChangeOperator for RemoveBuildingOp {
    fn change_type(&self) -> ChangeType {
        ChangeType::RemoveBuilding
    }

    fn apply(
        &self,
        state_t1: &WorldState,
        rng: &mut DrawStream,
        region: RegionId,
        partition: &dyn RegionPartition,
    ) -> OpResult {
        let candidates: Vec<&BuildingEntity> = state_t1
            .entities()
            .iter()
            .filter_map(|entity| match entity {
                Entity::Building(building)
                    if partition.region_of(polygon_centroid(building.polygon())) == region =>
                {
                    Some(building)
                }
                _ => None,
            })
            .collect();

        if candidates.is_empty() {
            return OpResult::failed(state_t1, Some("no_buildings_in_region"));
        }

        let victim_id = rng.choice(&candidates).id().clone();
        remove_entity(state_t1, victim_id)
    }
}

/// Removes one vegetation patch whose centroid falls in the target region.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClearVegetationOp;

impl ChangeOperator for ClearVegetationOp {
    fn change_type(&self) -> ChangeType {
        ChangeType::ClearVegetation
    }

    fn apply(
        &self,
        state_t1: &WorldState,
        rng: &mut DrawStream,
        region: RegionId,
        partition: &dyn RegionPartition,
    ) -> OpResult {
        let candidates: Vec<&synthmap_world::VegetationEntity> = state_t1
            .entities()
            .iter()
            .filter_map(|entity| match entity {
                Entity::Vegetation(vegetation)
                    if partition.region_of(polygon_centroid(vegetation.polygon())) == region =>
                {
                    Some(vegetation)
                }
                _ => None,
            })
            .collect();

        if candidates.is_empty() {
            return OpResult::failed(state_t1, Some("no_veg_in_region"));
        }

        let victim_id = rng.choice(&candidates).id().clone();
        remove_entity(state_t1, victim_id)
    }
}

fn remove_entity(state_t1: &WorldState, victim_id: EntityId) -> OpResult {
    let entities = state_t1
        .entities()
        .iter()
        .filter(|entity| *entity.id() != victim_id)
        .cloned()
        .collect();

    let mut result = OpResult::applied(state_t1.with_entities(entities));
    result.removed.push(victim_id);
    result
}

/// The closed catalog of standard operators, in a fixed order.
#[must_use]
pub fn standard_operators() -> Vec<Box<dyn ChangeOperator>> {
    vec![
        Box::new(AddBuildingOp),
        Box::new(RemoveBuildingOp),
        Box::new(ClearVegetationOp),
    ]
}

#[cfg(test)]
mod tests {
    use super::{
        standard_operators, AddBuildingOp, ChangeLog, ChangeOperator, ClearVegetationOp,
        RemoveBuildingOp, PARAM_REASON,
    };
    use glam::Vec2;
    use synthmap_core::{
        ChangeType, DrawStream, EntityId, QuadrantPartition, RegionId, SceneConfig,
    };
    use synthmap_world::{
        entities::Properties, BuildingEntity, Entity, Provenance, VegetationEntity, WorldState,
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

    fn rng() -> DrawStream {
        DrawStream::from_seed(42).split("changes")
    }

    #[test]
    fn add_building_places_inside_target_region() {
        let t1 = state_of(Vec::new());
        let partition = QuadrantPartition::for_scene(t1.scene());

        let result = AddBuildingOp.apply(&t1, &mut rng(), RegionId::NE, &partition);
        assert!(!result.is_failed());
        assert_eq!(result.added.len(), 1);
        assert_eq!(result.state_t2.entities().len(), 1);
        assert!(result.params.contains_key("w_px"));

        let Entity::Building(added) = &result.state_t2.entities()[0] else {
            panic!("expected a building");
        };
        assert!(added.id().as_str().starts_with("bld_added_"));
        let centroid = synthmap_core::geometry::polygon_centroid(added.polygon());
        // The clamped polygon can straddle the midline; the sampled center
        // was in the region, so the centroid stays within a corner's reach.
        assert!(centroid.x >= 255.0 - 11.0);

        // T1 is untouched.
        assert!(t1.entities().is_empty());
    }

    #[test]
    fn add_building_result_invalidates_derived_stats() {
        let t1 = state_of(Vec::new());
        let partition = QuadrantPartition::for_scene(t1.scene());
        let result = AddBuildingOp.apply(&t1, &mut rng(), RegionId::SW, &partition);
        assert!(result.state_t2.derived().is_none());
    }

    #[test]
    fn remove_building_on_empty_region_fails_softly() {
        let t1 = state_of(vec![Entity::Building(BuildingEntity::new(
            EntityId::indexed("bld", 0),
            square(Vec2::new(10.0, 10.0), 8.0),
            Properties::new(),
        ))]);
        let partition = QuadrantPartition::for_scene(t1.scene());

        // The only building sits in NW; target SE instead.
        let result = RemoveBuildingOp.apply(&t1, &mut rng(), RegionId::SE, &partition);
        assert!(result.is_failed());
        assert_eq!(
            result.params.get(PARAM_REASON).map(String::as_str),
            Some("no_buildings_in_region")
        );
        assert_eq!(result.state_t2, t1);
        assert!(result.removed.is_empty());
    }

    #[test]
    fn remove_building_targets_centroid_region() {
        let t1 = state_of(vec![
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
        ]);
        let partition = QuadrantPartition::for_scene(t1.scene());

        let result = RemoveBuildingOp.apply(&t1, &mut rng(), RegionId::SE, &partition);
        assert!(!result.is_failed());
        assert_eq!(result.removed, vec![EntityId::indexed("bld", 1)]);
        assert_eq!(result.state_t2.entities().len(), 1);
        assert_eq!(t1.entities().len(), 2, "input state is never mutated");
    }

    #[test]
    fn clear_vegetation_on_empty_region_reports_reason() {
        let t1 = state_of(Vec::new());
        let partition = QuadrantPartition::for_scene(t1.scene());

        let result = ClearVegetationOp.apply(&t1, &mut rng(), RegionId::NW, &partition);
        assert!(result.is_failed());
        assert_eq!(
            result.params.get(PARAM_REASON).map(String::as_str),
            Some("no_veg_in_region")
        );
    }

    #[test]
    fn clear_vegetation_removes_one_patch() {
        let t1 = state_of(vec![Entity::Vegetation(VegetationEntity::new(
            EntityId::indexed("veg", 0),
            square(Vec2::new(40.0, 40.0), 60.0),
            Properties::new(),
        ))]);
        let partition = QuadrantPartition::for_scene(t1.scene());

        let result = ClearVegetationOp.apply(&t1, &mut rng(), RegionId::NW, &partition);
        assert!(!result.is_failed());
        assert_eq!(result.removed, vec![EntityId::indexed("veg", 0)]);
        assert!(result.state_t2.entities().is_empty());
    }

    /// Partition that classifies every point into NW, so any other target
    /// region is unsatisfiable.
    struct FixedPartition;

    impl synthmap_core::RegionPartition for FixedPartition {
        fn region_of(&self, _point: Vec2) -> RegionId {
            RegionId::NW
        }

        fn regions(&self) -> Vec<RegionId> {
            vec![RegionId::NW]
        }
    }

    #[test]
    fn add_building_exhaustion_returns_unchanged_state() {
        let t1 = state_of(Vec::new());
        let result = AddBuildingOp.apply(&t1, &mut rng(), RegionId::SE, &FixedPartition);
        assert!(result.is_failed());
        assert!(result.added.is_empty());
        assert_eq!(result.state_t2, t1);
    }

    #[test]
    fn operator_application_is_deterministic() {
        let t1 = state_of(Vec::new());
        let partition = QuadrantPartition::for_scene(t1.scene());

        let first = AddBuildingOp.apply(&t1, &mut rng(), RegionId::SE, &partition);
        let second = AddBuildingOp.apply(&t1, &mut rng(), RegionId::SE, &partition);
        assert_eq!(first, second);
    }

    #[test]
    fn change_log_captures_applied_result() {
        let t1 = state_of(Vec::new());
        let partition = QuadrantPartition::for_scene(t1.scene());
        let result = AddBuildingOp.apply(&t1, &mut rng(), RegionId::NE, &partition);

        let log = ChangeLog::from_applied(ChangeType::AddBuilding, RegionId::NE, &result);
        assert_eq!(log.change_type, ChangeType::AddBuilding);
        assert_eq!(log.region, RegionId::NE);
        assert_eq!(log.added_ids, result.added);
        assert!(log.removed_ids.is_empty());
    }

    #[test]
    #[should_panic(expected = "failed operator result")]
    fn change_log_rejects_failed_results() {
        let t1 = state_of(Vec::new());
        let partition = QuadrantPartition::for_scene(t1.scene());
        let result = RemoveBuildingOp.apply(&t1, &mut rng(), RegionId::NW, &partition);
        let _ = ChangeLog::from_applied(ChangeType::RemoveBuilding, RegionId::NW, &result);
    }

    #[test]
    fn catalog_lists_each_operator_once() {
        let kinds: Vec<ChangeType> = standard_operators()
            .iter()
            .map(|op| op.change_type())
            .collect();
        assert_eq!(
            kinds,
            vec![
                ChangeType::AddBuilding,
                ChangeType::RemoveBuilding,
                ChangeType::ClearVegetation
            ]
        );
    }
}
