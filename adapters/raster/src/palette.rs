//! Semantic class table and its fixed RGB palette.
//!
//! The class ids are the single-channel mask contract: downstream training
//! code depends on them, so the table is versioned and additions append,
//! never renumber.

use synthmap_core::LayerKind;

/// Version tag of the class table + palette pair.
pub const PALETTE_VERSION: &str = "v1";

/// One semantic class: name, mask id, and visualization color.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClassDef {
    /// Human-readable class name.
    pub name: &'static str,
    /// Class id written into the semantic mask.
    pub class_id: u8,
    /// RGB triple used for the visualization image.
    pub rgb: [u8; 3],
}

/// Background pixels not covered by any entity.
pub const BACKGROUND: ClassDef = ClassDef {
    name: "background",
    class_id: 0,
    rgb: [0, 0, 0],
};

/// Road pixels.
pub const ROADS: ClassDef = ClassDef {
    name: "roads",
    class_id: 1,
    rgb: [220, 220, 220],
};

/// Building pixels.
pub const BUILDINGS: ClassDef = ClassDef {
    name: "buildings",
    class_id: 2,
    rgb: [200, 80, 80],
};

/// Vegetation pixels.
pub const VEGETATION: ClassDef = ClassDef {
    name: "vegetation",
    class_id: 3,
    rgb: [80, 170, 80],
};

/// Water pixels.
pub const WATER: ClassDef = ClassDef {
    name: "water",
    class_id: 4,
    rgb: [70, 120, 220],
};

/// Every class of the current table, in id order.
pub const CLASS_TABLE: [ClassDef; 5] = [BACKGROUND, ROADS, BUILDINGS, VEGETATION, WATER];

/// Mask id for an entity layer.
#[must_use]
pub const fn class_id_for_layer(layer: LayerKind) -> u8 {
    match layer {
        LayerKind::Roads => ROADS.class_id,
        LayerKind::Buildings => BUILDINGS.class_id,
        LayerKind::Vegetation => VEGETATION.class_id,
        LayerKind::Water => WATER.class_id,
    }
}

/// Visualization color for a mask id; unknown ids render as background.
#[must_use]
pub fn rgb_for_class(class_id: u8) -> [u8; 3] {
    CLASS_TABLE
        .iter()
        .find(|class| class.class_id == class_id)
        .map_or(BACKGROUND.rgb, |class| class.rgb)
}
