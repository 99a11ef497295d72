//! Anti-aliased drawing surface backed by a tiny-skia pixmap
//!
//! Callers draw in logical pixels; the surface applies a uniform scale so a
//! seal can be produced at any pixel density from the same layout math.

use crate::geometry::Point;
use image::{Rgba, RgbaImage};
use seal_types::{Rgb, SealError, SealResult};
use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

/// Horizontal and vertical extents of a run of text, in logical pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
    /// Distance from baseline to the top of the face, positive
    pub ascent: f32,
    /// Distance from baseline to the bottom of the face, negative
    pub descent: f32,
    pub line_gap: f32,
}

impl TextMetrics {
    pub fn height(&self) -> f32 {
        self.ascent - self.descent
    }

    pub fn line_height(&self) -> f32 {
        self.height() + self.line_gap
    }
}

/// Largest pixel density multiplier a canvas accepts
pub const MAX_SCALE: f32 = 8.0;

/// Upper bound on canvas area, 64 MiB of pixels
const MAX_CANVAS_PIXELS: u64 = 64 * 1024 * 1024;

fn glyph_id(face: &Face<'_>, ch: char) -> GlyphId {
    face.glyph_index(ch).unwrap_or(GlyphId(0))
}

fn font_scale(face: &Face<'_>, size: f32) -> f32 {
    size / f32::from(face.units_per_em().max(1))
}

/// Measure `text` set at `size` pixels
pub fn measure_text(face: &Face<'_>, text: &str, size: f32) -> TextMetrics {
    let scale = font_scale(face, size);
    let advance: f32 = text
        .chars()
        .map(|ch| f32::from(face.glyph_hor_advance(glyph_id(face, ch)).unwrap_or(0)))
        .sum();
    TextMetrics {
        width: advance * scale,
        ascent: f32::from(face.ascender()) * scale,
        descent: f32::from(face.descender()) * scale,
        line_gap: f32::from(face.line_gap()) * scale,
    }
}

/// Glyph outline in font units, scaled and flipped into y-down space with
/// the origin on the baseline
struct GlyphOutline {
    builder: PathBuilder,
    scale: f32,
}

impl GlyphOutline {
    fn new(scale: f32) -> Self {
        Self {
            builder: PathBuilder::new(),
            scale,
        }
    }

    fn build(face: &Face<'_>, glyph: GlyphId, scale: f32) -> Option<Path> {
        let mut outline = Self::new(scale);
        face.outline_glyph(glyph, &mut outline)?;
        outline.builder.finish()
    }
}

impl OutlineBuilder for GlyphOutline {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x * self.scale, -y * self.scale);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x * self.scale, -y * self.scale);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder
            .quad_to(x1 * self.scale, -y1 * self.scale, x * self.scale, -y * self.scale);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            x1 * self.scale,
            -y1 * self.scale,
            x2 * self.scale,
            -y2 * self.scale,
            x * self.scale,
            -y * self.scale,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

#[derive(Debug)]
pub struct Canvas {
    pixmap: Pixmap,
    base: Transform,
    paint: Paint<'static>,
}

impl Canvas {
    /// A transparent canvas of `width × height` logical pixels drawn at `scale`
    pub fn new(width: f32, height: f32, scale: f32, color: Rgb) -> SealResult<Self> {
        if !(scale.is_finite() && scale > 0.0 && scale <= MAX_SCALE) {
            return Err(SealError::validation(format!(
                "Scale must be in (0, {}], got {}",
                MAX_SCALE, scale
            )));
        }
        let px_width = (width * scale).ceil() as u32;
        let px_height = (height * scale).ceil() as u32;
        if u64::from(px_width) * u64::from(px_height) > MAX_CANVAS_PIXELS {
            return Err(SealError::validation(format!(
                "A {}x{} canvas exceeds the {} pixel limit",
                px_width, px_height, MAX_CANVAS_PIXELS
            )));
        }
        let pixmap = Pixmap::new(px_width, px_height).ok_or_else(|| {
            SealError::validation(format!(
                "Cannot allocate a {}x{} canvas",
                px_width, px_height
            ))
        })?;

        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, 255);
        paint.anti_alias = true;

        Ok(Self {
            pixmap,
            base: Transform::from_scale(scale, scale),
            paint,
        })
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixmap.height()
    }

    fn stroke(&mut self, path: &Path, width: f32) {
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        self.pixmap
            .stroke_path(path, &self.paint, &stroke, self.base, None);
    }

    fn fill(&mut self, path: &Path, transform: Transform) {
        self.pixmap.fill_path(
            path,
            &self.paint,
            FillRule::Winding,
            self.base.pre_concat(transform),
            None,
        );
    }

    /// Stroke an ellipse centered on `center`; the stroke straddles the outline
    pub fn stroke_ellipse(&mut self, center: Point, rx: f32, ry: f32, stroke_width: f32) {
        let Some(rect) = Rect::from_xywh(center.x - rx, center.y - ry, rx * 2.0, ry * 2.0) else {
            return;
        };
        if let Some(path) = PathBuilder::from_oval(rect) {
            self.stroke(&path, stroke_width);
        }
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, width: f32, height: f32, stroke_width: f32) {
        let Some(rect) = Rect::from_xywh(x, y, width, height) else {
            return;
        };
        let path = PathBuilder::from_rect(rect);
        self.stroke(&path, stroke_width);
    }

    pub fn fill_polygon(&mut self, points: &[Point]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(first.x, first.y);
        for p in rest {
            pb.line_to(p.x, p.y);
        }
        pb.close();
        if let Some(path) = pb.finish() {
            self.fill(&path, Transform::identity());
        }
    }

    /// Draw a run of text left-aligned at `x` on `baseline`
    pub fn draw_text(&mut self, face: &Face<'_>, text: &str, size: f32, x: f32, baseline: f32) {
        let scale = font_scale(face, size);
        let mut pen_x = x;
        for ch in text.chars() {
            let glyph = glyph_id(face, ch);
            if let Some(path) = GlyphOutline::build(face, glyph, scale) {
                self.fill(&path, Transform::from_translate(pen_x, baseline));
            }
            pen_x += f32::from(face.glyph_hor_advance(glyph).unwrap_or(0)) * scale;
        }
    }

    /// Draw `text` horizontally centered on `center_x`
    pub fn draw_text_centered(
        &mut self,
        face: &Face<'_>,
        text: &str,
        size: f32,
        center_x: f32,
        baseline: f32,
    ) {
        let width = measure_text(face, text, size).width;
        self.draw_text(face, text, size, center_x - width / 2.0, baseline);
    }

    /// Draw one glyph with its bounding-box center on `center`, rotated
    /// clockwise by `rotation_deg`
    pub fn draw_glyph_centered(
        &mut self,
        face: &Face<'_>,
        ch: char,
        size: f32,
        center: Point,
        rotation_deg: f32,
    ) {
        let glyph = glyph_id(face, ch);
        let Some(bbox) = face.glyph_bounding_box(glyph) else {
            return;
        };
        let scale = font_scale(face, size);
        let Some(path) = GlyphOutline::build(face, glyph, scale) else {
            return;
        };
        let cx = (f32::from(bbox.x_min) + f32::from(bbox.x_max)) * scale / 2.0;
        let cy = -(f32::from(bbox.y_min) + f32::from(bbox.y_max)) * scale / 2.0;
        let transform = Transform::from_translate(center.x, center.y)
            .pre_concat(Transform::from_rotate(rotation_deg))
            .pre_concat(Transform::from_translate(-cx, -cy));
        self.fill(&path, transform);
    }

    /// Un-premultiply into an RGBA image
    pub fn into_image(self) -> RgbaImage {
        let mut image = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in image.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        image
    }
}
