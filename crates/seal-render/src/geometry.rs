//! Seal layout math
//!
//! All functions work in image coordinates: origin top-left, y grows
//! downward, angles in degrees measured counter-clockwise from the +x axis.

/// A point in image space
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// The point at `radius` from `self` in direction `angle_deg`
    pub fn on_circle(self, radius: f32, angle_deg: f32) -> Self {
        let a = angle_deg.to_radians();
        Self::new(self.x + radius * a.cos(), self.y - radius * a.sin())
    }
}

/// Ratio of the star's inner vertices to its outer vertices
pub const STAR_INNER_RATIO: f32 = 0.4;

/// Arc covered by curved company text
pub const CURVED_TEXT_ARC_DEG: f32 = 270.0;

/// Where curved company text starts (lower left)
pub const CURVED_TEXT_START_DEG: f32 = 225.0;

/// Vertices of a five-pointed star, alternating outer and inner, starting at
/// the top point
pub fn star_points(center: Point, outer_radius: f32, inner_ratio: f32) -> [Point; 10] {
    let inner_radius = outer_radius * inner_ratio;
    std::array::from_fn(|i| {
        let radius = if i % 2 == 0 {
            outer_radius
        } else {
            inner_radius
        };
        center.on_circle(radius, 90.0 + i as f32 * 36.0)
    })
}

/// Placement of one glyph on a circular text arc
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphPlacement {
    /// Visual center of the glyph
    pub center: Point,
    /// Angular position on the arc
    pub angle_deg: f32,
    /// Clockwise rotation applied to the upright glyph so its top faces outward
    pub rotation_deg: f32,
}

/// Spread `char_count` glyphs evenly over an arc, running clockwise from
/// `start_deg`.
///
/// The arc is divided into `char_count + 1` gaps so the first and last
/// glyphs sit one gap in from each end; a single glyph lands on the arc
/// midpoint.
pub fn circular_text_placement(
    char_count: usize,
    center: Point,
    radius: f32,
    arc_deg: f32,
    start_deg: f32,
) -> Vec<GlyphPlacement> {
    if char_count == 0 {
        return Vec::new();
    }
    let gap = arc_deg / (char_count + 1) as f32;
    (0..char_count)
        .map(|i| {
            let angle_deg = start_deg - gap * (i + 1) as f32;
            GlyphPlacement {
                center: center.on_circle(radius, angle_deg),
                angle_deg,
                rotation_deg: 90.0 - angle_deg,
            }
        })
        .collect()
}

/// Font size for curved company text: shrinks for long names, clamped to 16..=32
pub fn curved_font_size(radius: f32, char_count: usize, ratio: f32) -> f32 {
    let base = (radius * ratio).floor();
    let size = if char_count > 14 {
        base - 4.0
    } else if char_count > 10 {
        base - 2.0
    } else {
        base
    };
    size.clamp(16.0, 32.0)
}

/// Font size for the straight center line of a round seal, clamped to 14..=24
pub fn center_font_size(radius: f32, ratio: f32) -> f32 {
    (radius * ratio).floor().clamp(14.0, 24.0)
}
