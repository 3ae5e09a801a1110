//! Pure geometry kernel over pixel-space points.
//!
//! Points are [`glam::Vec2`] values in canvas coordinates: x grows to the
//! right, y grows downward, and valid coordinates lie in
//! `[0, width-1] x [0, height-1]`. Polylines and polygons are ordered point
//! sequences; no function here allocates global state or reads the clock.

use glam::Vec2;

/// Axis-aligned bounding box of a point set.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    min: Vec2,
    max: Vec2,
}

impl BBox {
    /// Computes the bounding box of the provided points.
    ///
    /// # Panics
    ///
    /// Panics when `points` is empty; callers own the non-empty guarantee.
    #[must_use]
    pub fn of_points(points: &[Vec2]) -> Self {
        assert!(
            !points.is_empty(),
            "BBox::of_points() requires at least one point"
        );

        let mut min = points[0];
        let mut max = points[0];
        for point in &points[1..] {
            min = min.min(*point);
            max = max.max(*point);
        }
        Self { min, max }
    }

    /// Lowest x/y corner of the box.
    #[must_use]
    pub const fn min(&self) -> Vec2 {
        self.min
    }

    /// Highest x/y corner of the box.
    #[must_use]
    pub const fn max(&self) -> Vec2 {
        self.max
    }

    /// Horizontal extent of the box in pixels.
    #[must_use]
    pub fn width(&self) -> f32 {
        (self.max.x - self.min.x).max(0.0)
    }

    /// Vertical extent of the box in pixels.
    #[must_use]
    pub fn height(&self) -> f32 {
        (self.max.y - self.min.y).max(0.0)
    }

    /// Covered area in whole pixels, truncated toward zero.
    #[must_use]
    pub fn area_px(&self) -> u64 {
        (self.width() * self.height()) as u64
    }

    /// Reports whether `other` lies fully inside this box (edges included).
    #[must_use]
    pub fn encloses(&self, other: &BBox) -> bool {
        other.min.x >= self.min.x
            && other.min.y >= self.min.y
            && other.max.x <= self.max.x
            && other.max.y <= self.max.y
    }
}

/// Clamps a point into the canvas bounds `[0, width-1] x [0, height-1]`.
#[must_use]
pub fn clamp_point(point: Vec2, width_px: u32, height_px: u32) -> Vec2 {
    Vec2::new(
        point.x.clamp(0.0, (width_px - 1) as f32),
        point.y.clamp(0.0, (height_px - 1) as f32),
    )
}

/// Clamps every vertex of a polyline into the canvas bounds.
#[must_use]
pub fn clamp_polyline(polyline: &[Vec2], width_px: u32, height_px: u32) -> Vec<Vec2> {
    polyline
        .iter()
        .map(|point| clamp_point(*point, width_px, height_px))
        .collect()
}

/// Clamps every vertex of a polygon into the canvas bounds.
#[must_use]
pub fn clamp_polygon(polygon: &[Vec2], width_px: u32, height_px: u32) -> Vec<Vec2> {
    clamp_polyline(polygon, width_px, height_px)
}

/// Total length of a polyline as the sum of its segment lengths.
///
/// Polylines with fewer than two points have zero length.
#[must_use]
pub fn polyline_length_px(polyline: &[Vec2]) -> f32 {
    polyline
        .windows(2)
        .map(|pair| pair[0].distance(pair[1]))
        .sum()
}

/// Arithmetic-mean centroid of a polygon's vertices.
///
/// The mean centroid is exact for rectangles and good enough for the blobby
/// footprints the generator produces.
///
/// # Panics
///
/// Panics when `polygon` is empty; callers own the non-empty guarantee.
#[must_use]
pub fn polygon_centroid(polygon: &[Vec2]) -> Vec2 {
    assert!(
        !polygon.is_empty(),
        "polygon_centroid() requires a non-empty polygon"
    );

    let sum: Vec2 = polygon.iter().copied().sum();
    sum / polygon.len() as f32
}

/// Builds a rectangle polygon centered at `center`, rotated by `angle_rad`.
///
/// The four corners are produced in winding order by applying the rotation
/// matrix to the half-extent corner offsets.
#[must_use]
pub fn rect_polygon(center: Vec2, width_px: f32, height_px: f32, angle_rad: f32) -> Vec<Vec2> {
    let half_w = width_px / 2.0;
    let half_h = height_px / 2.0;
    let corners = [
        Vec2::new(-half_w, -half_h),
        Vec2::new(half_w, -half_h),
        Vec2::new(half_w, half_h),
        Vec2::new(-half_w, half_h),
    ];

    if angle_rad == 0.0 {
        return corners.iter().map(|offset| center + *offset).collect();
    }

    let (sin_a, cos_a) = angle_rad.sin_cos();
    corners
        .iter()
        .map(|offset| {
            let rotated = Vec2::new(
                offset.x * cos_a - offset.y * sin_a,
                offset.x * sin_a + offset.y * cos_a,
            );
            center + rotated
        })
        .collect()
}

/// Distance from a point to the segment `a..b`.
///
/// The projection parameter is clamped to `[0, 1]` so endpoints bound the
/// answer; degenerate zero-length segments fall back to point distance.
#[must_use]
pub fn point_to_segment_distance(point: Vec2, a: Vec2, b: Vec2) -> f32 {
    let ab = b - a;
    let length_sq = ab.length_squared();
    if length_sq == 0.0 {
        return point.distance(a);
    }

    let t = ((point - a).dot(ab) / length_sq).clamp(0.0, 1.0);
    point.distance(a + ab * t)
}

/// Minimum distance from a point to any segment of a polyline.
///
/// Polylines with fewer than two points have no segments and yield
/// `f32::INFINITY`.
#[must_use]
pub fn point_to_polyline_distance(point: Vec2, polyline: &[Vec2]) -> f32 {
    polyline
        .windows(2)
        .map(|pair| point_to_segment_distance(point, pair[0], pair[1]))
        .fold(f32::INFINITY, f32::min)
}
