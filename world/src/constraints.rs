//! Pure constraint validation over a finished world state.

use synthmap_core::{geometry::BBox, LayerKind};

use crate::{Entity, WorldState};

/// Minimum number of buildings a valid scene must contain.
const MIN_BUILDINGS: usize = 5;

/// Validates a finished state, returning one issue string per violation.
///
/// An empty list means the state is valid. The checks are advisory: the
/// retry policy that reacts to them lives with the orchestrator, not here.
/// The water check is a cheap bounding-box heuristic, not true polygon
/// containment; it only flags buildings whose bbox lies fully inside a
/// water bbox.
#[must_use]
pub fn validate_world_state(state: &WorldState) -> Vec<String> {
    let mut issues = Vec::new();

    let road_count = state
        .entities()
        .iter()
        .filter(|entity| entity.layer() == LayerKind::Roads)
        .count();
    let building_count = state
        .entities()
        .iter()
        .filter(|entity| entity.layer() == LayerKind::Buildings)
        .count();

    if road_count < 1 {
        issues.push(String::from("No roads generated."));
    }
    if building_count < MIN_BUILDINGS {
        issues.push(format!(
            "Too few buildings generated (<{MIN_BUILDINGS})."
        ));
    }

    let water_bboxes: Vec<BBox> = state
        .entities()
        .iter()
        .filter_map(|entity| match entity {
            Entity::Water(water) => Some(BBox::of_points(water.polygon())),
            _ => None,
        })
        .collect();

    for entity in state.entities() {
        let Entity::Building(building) = entity else {
            continue;
        };
        let building_bbox = BBox::of_points(building.polygon());
        for water_bbox in &water_bboxes {
            if water_bbox.encloses(&building_bbox) {
                issues.push(format!(
                    "Building {} bbox inside water bbox (heuristic).",
                    building.id()
                ));
            }
        }
    }

    issues
}
