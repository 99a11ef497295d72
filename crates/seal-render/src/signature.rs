//! Personal signature images
//!
//! Two inputs are supported: a handwritten raster (raw PNG/JPEG bytes or a
//! base64 data URL from a drawing pad) and typed text set in a chosen font.

use crate::codec::{decode_base64_image, decode_image, encode_png, png_data_url};
use crate::fonts::{FontRegistry, WEIGHT_REGULAR};
use crate::surface::{measure_text, Canvas};
use image::RgbaImage;
use seal_types::{Rgb, SealError, SealResult};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Transparent padding around typed signatures
pub const SIGNATURE_PADDING: f32 = 20.0;

/// Font size used for live previews
pub const PREVIEW_FONT_SIZE: f32 = 72.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSignature {
    pub text: String,
    pub font_name: String,
    #[serde(default = "default_ink")]
    pub color: Rgb,
    pub font_size: f32,
}

fn default_ink() -> Rgb {
    Rgb::BLACK
}

impl TextSignature {
    pub fn new(text: impl Into<String>, font_name: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_name: font_name.into(),
            color: Rgb::BLACK,
            font_size,
        }
    }

    pub fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SignatureMode {
    /// Encoded PNG or JPEG bytes
    Raster(Vec<u8>),
    /// Base64 image data, with or without a `data:` prefix
    DataUrl(String),
    Text(TextSignature),
}

#[derive(Debug, Clone)]
pub struct SignatureRenderer {
    fonts: Arc<FontRegistry>,
}

impl SignatureRenderer {
    pub fn new(fonts: Arc<FontRegistry>) -> Self {
        Self { fonts }
    }

    pub fn render(&self, mode: &SignatureMode) -> SealResult<RgbaImage> {
        match mode {
            SignatureMode::Raster(bytes) => decode_image(bytes),
            SignatureMode::DataUrl(data) => decode_image(&decode_base64_image(data)?),
            SignatureMode::Text(text) => self.render_text(text),
        }
    }

    pub fn render_png(&self, mode: &SignatureMode) -> SealResult<Vec<u8>> {
        encode_png(&self.render(mode)?)
    }

    fn render_text(&self, signature: &TextSignature) -> SealResult<RgbaImage> {
        let text = signature.text.trim();
        if text.is_empty() {
            return Err(SealError::validation("Signature text must not be empty"));
        }
        if !(signature.font_size.is_finite() && signature.font_size > 0.0) {
            return Err(SealError::validation(format!(
                "Font size must be positive, got {}",
                signature.font_size
            )));
        }

        let font = self
            .fonts
            .resolve_for_text(&signature.font_name, WEIGHT_REGULAR, text);
        let face = font.parse()?;
        let metrics = measure_text(&face, text, signature.font_size);

        let width = metrics.width.ceil() + SIGNATURE_PADDING * 2.0;
        let height = metrics.height().ceil() + SIGNATURE_PADDING * 2.0;
        let mut canvas = Canvas::new(width, height, 1.0, signature.color)?;
        canvas.draw_text(
            &face,
            text,
            signature.font_size,
            SIGNATURE_PADDING,
            SIGNATURE_PADDING + metrics.ascent,
        );

        tracing::debug!(
            font = font.family(),
            width = canvas.pixel_width(),
            height = canvas.pixel_height(),
            "Rendered text signature"
        );
        Ok(canvas.into_image())
    }

    /// PNG of `text` at the preview size; nothing is written to disk
    pub fn preview_png(&self, text: &str, font_name: &str, color: Rgb) -> SealResult<Vec<u8>> {
        let signature = TextSignature {
            text: text.to_string(),
            font_name: font_name.to_string(),
            color,
            font_size: PREVIEW_FONT_SIZE,
        };
        self.render_png(&SignatureMode::Text(signature))
    }

    pub fn preview_data_url(&self, text: &str, font_name: &str, color: Rgb) -> SealResult<String> {
        Ok(png_data_url(&self.preview_png(text, font_name, color)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PNG_DATA_URL_PREFIX;
    use image::{DynamicImage, ImageFormat, Rgb as Pixel, RgbImage};
    use std::io::Cursor;

    fn renderer() -> SignatureRenderer {
        SignatureRenderer::new(Arc::new(FontRegistry::embedded().unwrap()))
    }

    #[test]
    fn test_text_signature_is_padded() {
        let r = renderer();
        let sig = TextSignature::new("Zhang San", "no-such-font", 48.0);
        let image = r.render(&SignatureMode::Text(sig)).unwrap();
        assert!(image.width() > 40 && image.height() > 40);
        // padding stays transparent
        for x in 0..image.width() {
            assert_eq!(image.get_pixel(x, 0)[3], 0);
            assert_eq!(image.get_pixel(x, 5)[3], 0);
        }
        assert!(image.pixels().any(|p| p[3] == 255 && p[0] == 0));
    }

    #[test]
    fn test_empty_text_rejected() {
        let sig = TextSignature::new("   ", "serif", 48.0);
        let err = renderer().render(&SignatureMode::Text(sig)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_opaque_jpeg_keeps_dimensions() {
        let rgb = RgbImage::from_pixel(30, 10, Pixel([255, 255, 255]));
        let mut jpeg = Vec::new();
        DynamicImage::ImageRgb8(rgb)
            .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
            .unwrap();
        let image = renderer().render(&SignatureMode::Raster(jpeg)).unwrap();
        assert_eq!(image.dimensions(), (30, 10));
        assert!(image.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_data_url_signature() {
        let src = RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 200]));
        let url = png_data_url(&encode_png(&src).unwrap());
        let image = renderer().render(&SignatureMode::DataUrl(url)).unwrap();
        assert_eq!(image, src);
    }

    #[test]
    fn test_preview_is_data_url_at_72() {
        let r = renderer();
        let url = r.preview_data_url("Li", "serif", Rgb::BLACK).unwrap();
        assert!(url.starts_with(PNG_DATA_URL_PREFIX));

        let small = r
            .render(&SignatureMode::Text(TextSignature::new("Li", "serif", 24.0)))
            .unwrap();
        let preview = decode_image(&r.preview_png("Li", "serif", Rgb::BLACK).unwrap()).unwrap();
        assert!(preview.height() > small.height());
    }
}
