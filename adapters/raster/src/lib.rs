#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Raster adapter converting a world state into image files.
//!
//! The semantic mask is the authoritative output: a single-channel image
//! whose pixel values are class ids (background = 0). The RGB visualization
//! is derived from the mask through the fixed palette, so the two can never
//! disagree about a pixel's class.

use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
};

use glam::Vec2;
use image::{GrayImage, RgbImage};
use synthmap_core::{
    geometry::point_to_segment_distance, LayerKind, RenderConfig, SampleId,
    RENDER_STYLE_FLAT_RGB,
};
use synthmap_world::{Entity, WorldState};
use thiserror::Error;

pub mod palette;

use palette::{class_id_for_layer, rgb_for_class, PALETTE_VERSION};

/// Errors raised by the raster adapter.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The render configuration names a style this adapter cannot produce.
    ///
    /// This is a fatal configuration error raised before any generation or
    /// drawing happens; it is never retried.
    #[error("unsupported render style: {style}")]
    UnsupportedStyle {
        /// Style tag taken from the render configuration.
        style: String,
    },
    /// The output directory could not be created.
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// An image file could not be written.
    #[error("failed to write image {path}: {source}")]
    WriteImage {
        /// Image path that could not be written.
        path: PathBuf,
        /// Underlying encoder error.
        source: image::ImageError,
    },
}

/// Temporal phase of a rendered state, selecting the file-name infix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderPhase {
    /// The initial state of a sample.
    T1,
    /// The changed state derived from T1.
    T2,
}

impl RenderPhase {
    /// File-name infix for the phase.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::T1 => "t1",
            Self::T2 => "t2",
        }
    }
}

impl fmt::Display for RenderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// References to the written image files plus lightweight metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderOutput {
    /// Path of the RGB visualization image.
    pub rgb_path: PathBuf,
    /// Path of the single-channel semantic mask image.
    pub semantic_mask_path: PathBuf,
    /// Rendered width in pixels.
    pub width_px: u32,
    /// Rendered height in pixels.
    pub height_px: u32,
    /// Renderer-specific extras (style, palette version, ...).
    pub extras: BTreeMap<String, String>,
}

/// Renderer producing the flat-RGB visualization and semantic mask.
#[derive(Clone, Debug)]
pub struct RasterRenderer {
    style: String,
}

impl RasterRenderer {
    /// Creates a renderer for the provided configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnsupportedStyle`] for any style other than
    /// [`RENDER_STYLE_FLAT_RGB`].
    pub fn new(config: &RenderConfig) -> Result<Self, RenderError> {
        if config.style() != RENDER_STYLE_FLAT_RGB {
            return Err(RenderError::UnsupportedStyle {
                style: config.style().to_string(),
            });
        }
        Ok(Self {
            style: config.style().to_string(),
        })
    }

    /// Rasterizes a state and writes its two PNG files.
    ///
    /// Files are named `{sample_id}_{phase}_rgb.png` and
    /// `{sample_id}_{phase}_semantic.png` inside `out_dir`, which is created
    /// when absent.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] when the output directory cannot be created
    /// or an image fails to encode.
    pub fn render(
        &self,
        state: &WorldState,
        out_dir: &Path,
        sample_id: &SampleId,
        phase: RenderPhase,
    ) -> Result<RenderOutput, RenderError> {
        std::fs::create_dir_all(out_dir).map_err(|source| RenderError::CreateDir {
            path: out_dir.to_path_buf(),
            source,
        })?;

        let rgb_path = out_dir.join(format!("{sample_id}_{phase}_rgb.png"));
        let semantic_mask_path = out_dir.join(format!("{sample_id}_{phase}_semantic.png"));

        let width = state.scene().width_px();
        let height = state.scene().height_px();

        let mask = rasterize_semantic(state);
        let rgb = rgb_from_mask(&mask, width, height);
        let gray = GrayImage::from_raw(width, height, mask)
            .expect("semantic buffer length matches the canvas");

        gray.save(&semantic_mask_path)
            .map_err(|source| RenderError::WriteImage {
                path: semantic_mask_path.clone(),
                source,
            })?;
        rgb.save(&rgb_path).map_err(|source| RenderError::WriteImage {
            path: rgb_path.clone(),
            source,
        })?;

        let mut extras = BTreeMap::new();
        let _ = extras.insert(String::from("style"), self.style.clone());
        let _ = extras.insert(String::from("palette"), String::from(PALETTE_VERSION));

        Ok(RenderOutput {
            rgb_path,
            semantic_mask_path,
            width_px: width,
            height_px: height,
            extras,
        })
    }
}

/// Rasterizes the semantic class mask into a row-major `width * height`
/// buffer of class ids.
///
/// Entities draw in fixed layer priority (vegetation, water, roads,
/// buildings), so later layers overpaint earlier ones wherever they overlap
/// and buildings always end up topmost. Within a layer, insertion order is
/// preserved.
#[must_use]
pub fn rasterize_semantic(state: &WorldState) -> Vec<u8> {
    let width = state.scene().width_px();
    let height = state.scene().height_px();
    let mut mask = vec![palette::BACKGROUND.class_id; (width * height) as usize];

    let mut ordered: Vec<&Entity> = state.entities().iter().collect();
    ordered.sort_by_key(|entity| draw_priority(entity.layer()));

    for entity in ordered {
        let class_id = class_id_for_layer(entity.layer());
        match entity {
            Entity::Road(road) => stroke_polyline(
                &mut mask,
                width,
                height,
                road.polyline(),
                road.width_px() as f32,
                class_id,
            ),
            Entity::Building(building) => {
                fill_polygon(&mut mask, width, height, building.polygon(), class_id);
            }
            Entity::Vegetation(vegetation) => {
                fill_polygon(&mut mask, width, height, vegetation.polygon(), class_id);
            }
            Entity::Water(water) => {
                fill_polygon(&mut mask, width, height, water.polygon(), class_id);
            }
        }
    }

    mask
}

const fn draw_priority(layer: LayerKind) -> u8 {
    match layer {
        LayerKind::Vegetation => 10,
        LayerKind::Water => 20,
        LayerKind::Roads => 30,
        LayerKind::Buildings => 40,
    }
}

fn rgb_from_mask(mask: &[u8], width: u32, height: u32) -> RgbImage {
    let mut rgb = Vec::with_capacity(mask.len() * 3);
    for class_id in mask {
        rgb.extend_from_slice(&rgb_for_class(*class_id));
    }
    RgbImage::from_raw(width, height, rgb).expect("rgb buffer length matches the canvas")
}

/// Strokes a polyline: a pixel is covered when it lies within half the
/// stroke width of any segment.
fn stroke_polyline(
    mask: &mut [u8],
    width: u32,
    height: u32,
    polyline: &[Vec2],
    stroke_px: f32,
    class_id: u8,
) {
    let radius = stroke_px / 2.0;

    for segment in polyline.windows(2) {
        let (a, b) = (segment[0], segment[1]);
        let x_lo = ((a.x.min(b.x) - radius).floor().max(0.0)) as u32;
        let x_hi = ((a.x.max(b.x) + radius).ceil().min((width - 1) as f32)) as u32;
        let y_lo = ((a.y.min(b.y) - radius).floor().max(0.0)) as u32;
        let y_hi = ((a.y.max(b.y) + radius).ceil().min((height - 1) as f32)) as u32;

        for y in y_lo..=y_hi {
            for x in x_lo..=x_hi {
                let pixel = Vec2::new(x as f32, y as f32);
                if point_to_segment_distance(pixel, a, b) <= radius {
                    mask[(y * width + x) as usize] = class_id;
                }
            }
        }
    }
}

/// Fills a polygon with even-odd scanline coverage sampled at integer pixel
/// coordinates. Polygons with fewer than three vertices cover nothing.
fn fill_polygon(mask: &mut [u8], width: u32, height: u32, polygon: &[Vec2], class_id: u8) {
    if polygon.len() < 3 {
        return;
    }

    let y_lo = polygon
        .iter()
        .map(|p| p.y)
        .fold(f32::INFINITY, f32::min)
        .floor()
        .max(0.0) as u32;
    let y_hi = polygon
        .iter()
        .map(|p| p.y)
        .fold(f32::NEG_INFINITY, f32::max)
        .ceil()
        .min((height - 1) as f32) as u32;

    let mut crossings: Vec<f32> = Vec::with_capacity(polygon.len());

    for y in y_lo..=y_hi {
        let scan_y = y as f32;
        crossings.clear();

        for index in 0..polygon.len() {
            let p1 = polygon[index];
            let p2 = polygon[(index + 1) % polygon.len()];
            let crosses = (p1.y <= scan_y && p2.y > scan_y) || (p2.y <= scan_y && p1.y > scan_y);
            if crosses {
                let t = (scan_y - p1.y) / (p2.y - p1.y);
                crossings.push(p1.x + t * (p2.x - p1.x));
            }
        }

        crossings.sort_by(|a, b| a.partial_cmp(b).expect("crossings are finite"));

        for span in crossings.chunks_exact(2) {
            let x_start = span[0].ceil().max(0.0) as u32;
            let x_end = span[1].floor().min((width - 1) as f32);
            if x_end < 0.0 {
                continue;
            }
            for x in x_start..=(x_end as u32) {
                mask[(y * width + x) as usize] = class_id;
            }
        }
    }
}
