//! Seal image synthesis
//!
//! Produces transparent RGBA images for the three built-in templates:
//!
//! - **standard_circle**: ring border, centered star, company name on a 270°
//!   arc with glyph tops facing outward, optional straight line below the star
//! - **oval_finance**: elliptical border with two straight lines of text
//! - **square_legal**: square border with up to four characters stacked
//!   vertically
//!
//! Proportions come from [`SealCalibration`], whose defaults reproduce the
//! usual official-seal layout and can be overridden from configuration.

use crate::codec::encode_png;
use crate::fonts::{FontRegistry, WEIGHT_BOLD};
use crate::geometry::{
    center_font_size, circular_text_placement, curved_font_size, star_points, Point,
    CURVED_TEXT_ARC_DEG, CURVED_TEXT_START_DEG, STAR_INNER_RATIO,
};
use crate::surface::{measure_text, Canvas};
use image::RgbaImage;
use seal_types::{SealImageSpec, SealResult, SealTemplate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use ttf_parser::Face;

/// Tunable proportions of the seal layouts
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SealCalibration {
    /// Transparent margin added around every seal
    pub canvas_margin: f32,
    /// Round border width is `max(min_border_width, radius / border_divisor)`,
    /// never thinner than the template's own border width
    pub border_divisor: f32,
    pub min_border_width: f32,
    /// Gap between the border and the tops of curved glyphs
    pub text_margin_divisor: f32,
    pub min_text_margin: f32,
    /// Star radius is `radius / star_divisor`
    pub star_divisor: f32,
    /// Star is lifted by `max(1, radius / star_offset_divisor)`
    pub star_offset_divisor: f32,
    pub curved_font_ratio: f32,
    pub center_font_ratio: f32,
    /// Gap between the star and the center line's baseline
    pub center_text_gap: f32,
    /// Border width of oval and square seals, floored at the template's width
    pub frame_stroke: f32,
    pub oval_aspect: f32,
    pub oval_font_size: f32,
    pub square_max_chars: usize,
    pub font_weight: u16,
}

impl Default for SealCalibration {
    fn default() -> Self {
        Self {
            canvas_margin: 40.0,
            border_divisor: 38.0,
            min_border_width: 3.0,
            text_margin_divisor: 20.0,
            min_text_margin: 5.0,
            star_divisor: 3.0,
            star_offset_divisor: 75.0,
            curved_font_ratio: 0.36,
            center_font_ratio: 0.28,
            center_text_gap: 8.0,
            frame_stroke: 4.0,
            oval_aspect: 1.5,
            oval_font_size: 24.0,
            square_max_chars: 4,
            font_weight: WEIGHT_BOLD,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SealSynthesizer {
    fonts: Arc<FontRegistry>,
    calibration: SealCalibration,
}

impl SealSynthesizer {
    pub fn new(fonts: Arc<FontRegistry>) -> Self {
        Self::with_calibration(fonts, SealCalibration::default())
    }

    pub fn with_calibration(fonts: Arc<FontRegistry>, calibration: SealCalibration) -> Self {
        Self { fonts, calibration }
    }

    pub fn calibration(&self) -> &SealCalibration {
        &self.calibration
    }

    /// Render at one pixel per logical unit
    pub fn synthesize(&self, spec: &SealImageSpec) -> SealResult<RgbaImage> {
        self.synthesize_scaled(spec, 1.0)
    }

    /// Render with every dimension multiplied by `scale`
    pub fn synthesize_scaled(&self, spec: &SealImageSpec, scale: f32) -> SealResult<RgbaImage> {
        spec.validate()?;
        let mut text = spec.company_text.clone();
        if let Some(center) = &spec.center_text {
            text.push_str(center);
        }
        let font = self.fonts.resolve_for_text(
            spec.template.default_font(),
            self.calibration.font_weight,
            &text,
        );
        let face = font.parse()?;
        let size = spec.effective_size() as f32;

        let image = match spec.template {
            SealTemplate::StandardCircle => self.circle(spec, &face, size, scale)?,
            SealTemplate::OvalFinance => self.oval(spec, &face, size, scale)?,
            SealTemplate::SquareLegal => self.square(spec, &face, size, scale)?,
        };

        tracing::info!(
            template = spec.template.code(),
            width = image.width(),
            height = image.height(),
            font = font.family(),
            "Synthesized seal"
        );
        Ok(image)
    }

    pub fn synthesize_png(&self, spec: &SealImageSpec) -> SealResult<Vec<u8>> {
        encode_png(&self.synthesize(spec)?)
    }

    fn circle(
        &self,
        spec: &SealImageSpec,
        face: &Face<'_>,
        radius: f32,
        scale: f32,
    ) -> SealResult<RgbaImage> {
        let cal = &self.calibration;
        let extent = radius * 2.0 + cal.canvas_margin;
        let mut canvas = Canvas::new(extent, extent, scale, spec.color)?;
        let center = Point::new((extent / 2.0).floor(), (extent / 2.0).floor());

        let border = cal
            .min_border_width
            .max(spec.template.border_width() as f32)
            .max((radius / cal.border_divisor).floor());
        let star_radius = (radius / cal.star_divisor).floor();

        if spec.template.has_border() {
            canvas.stroke_ellipse(center, radius - border / 2.0, radius - border / 2.0, border);
        }

        if spec.template.has_star() {
            let lift = 1f32.max((radius / cal.star_offset_divisor).floor());
            let star_center = Point::new(center.x, center.y - lift);
            canvas.fill_polygon(&star_points(star_center, star_radius, STAR_INNER_RATIO));
        }

        let chars: Vec<char> = spec.company_text.chars().collect();
        let font_size = curved_font_size(radius, chars.len(), cal.curved_font_ratio);
        let top_margin = cal
            .min_text_margin
            .max((radius / cal.text_margin_divisor).floor());
        let text_radius = radius - border - top_margin - (font_size / 2.0).floor();
        let placements = circular_text_placement(
            chars.len(),
            center,
            text_radius,
            CURVED_TEXT_ARC_DEG,
            CURVED_TEXT_START_DEG,
        );
        for (ch, placement) in chars.iter().zip(&placements) {
            canvas.draw_glyph_centered(
                face,
                *ch,
                font_size,
                placement.center,
                placement.rotation_deg,
            );
        }

        if let Some(text) = &spec.center_text {
            let size = center_font_size(radius, cal.center_font_ratio);
            let baseline = center.y + star_radius + cal.center_text_gap;
            canvas.draw_text_centered(face, text, size, center.x, baseline);
        }

        Ok(canvas.into_image())
    }

    fn oval(
        &self,
        spec: &SealImageSpec,
        face: &Face<'_>,
        size: f32,
        scale: f32,
    ) -> SealResult<RgbaImage> {
        let cal = &self.calibration;
        let width = (size * cal.oval_aspect).floor();
        let height = size;
        let canvas_w = width + cal.canvas_margin;
        let canvas_h = height + cal.canvas_margin;
        let mut canvas = Canvas::new(canvas_w, canvas_h, scale, spec.color)?;
        let center = Point::new((canvas_w / 2.0).floor(), (canvas_h / 2.0).floor());

        let stroke = cal.frame_stroke.max(spec.template.border_width() as f32);
        canvas.stroke_ellipse(center, width / 2.0, height / 2.0, stroke);

        let font_size = cal.oval_font_size;
        canvas.draw_text_centered(face, &spec.company_text, font_size, center.x, center.y - 5.0);
        if let Some(text) = &spec.center_text {
            let line_height = measure_text(face, text, font_size).line_height();
            canvas.draw_text_centered(face, text, font_size, center.x, center.y + line_height);
        }

        Ok(canvas.into_image())
    }

    fn square(
        &self,
        spec: &SealImageSpec,
        face: &Face<'_>,
        size: f32,
        scale: f32,
    ) -> SealResult<RgbaImage> {
        let cal = &self.calibration;
        let extent = size + cal.canvas_margin;
        let mut canvas = Canvas::new(extent, extent, scale, spec.color)?;
        let center = (extent / 2.0).floor();
        let half = (size / 2.0).floor();

        let stroke = cal.frame_stroke.max(spec.template.border_width() as f32);
        canvas.stroke_rect(center - half, center - half, size, size, stroke);

        let font_size = (size / 3.0).floor();
        let chars: Vec<char> = spec
            .company_text
            .chars()
            .take(cal.square_max_chars)
            .collect();
        let count = chars.len() as f32;
        let char_height = (size / count.max(2.0)).floor();
        let start_y = center - (count * char_height / 2.0).floor() + (char_height / 2.0).floor();
        let ascent = measure_text(face, "", font_size).ascent;

        let mut buf = [0u8; 4];
        for (i, ch) in chars.iter().enumerate() {
            let glyph: &str = ch.encode_utf8(&mut buf);
            let baseline = start_y + i as f32 * char_height + (ascent / 2.0).floor();
            canvas.draw_text_centered(face, glyph, font_size, center, baseline);
        }

        Ok(canvas.into_image())
    }
}
