//! Page rasterization for previews
//!
//! Rendering sits behind [`PageRasterizer`] so the stamping engine does not
//! depend on a native library; the Pdfium-backed implementation is enabled
//! with the `pdfium` feature.

use crate::coords::CoordinateMapper;
use crate::document::PdfDocument;
use image::RgbaImage;
use seal_types::{SealError, SealResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_PREVIEW_DPI: u32 = 150;

pub trait PageRasterizer {
    /// Render the 0-based `page_index` of `document` at `dpi`
    fn render(&self, document: &[u8], page_index: u32, dpi: u32) -> SealResult<RgbaImage>;
}

/// A rendered page plus the page size it was rendered from
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page_number: u32,
    pub image: RgbaImage,
    pub media_box: [f64; 4],
}

impl RenderedPage {
    pub fn width_pt(&self) -> f64 {
        self.media_box[2]
    }

    pub fn height_pt(&self) -> f64 {
        self.media_box[3]
    }

    pub fn mapper(&self) -> SealResult<CoordinateMapper> {
        CoordinateMapper::new(self.media_box, self.image.width(), self.image.height())
    }
}

pub fn render_page(
    rasterizer: &dyn PageRasterizer,
    document: &[u8],
    page_index: u32,
    dpi: u32,
) -> SealResult<RenderedPage> {
    if dpi == 0 {
        return Err(SealError::validation("Preview DPI must be positive"));
    }
    let pdf = PdfDocument::from_bytes(document)?;
    let page_count = pdf.page_count();
    if page_index >= page_count {
        return Err(SealError::validation(format!(
            "Page index {} out of range (document has {} pages)",
            page_index, page_count
        )));
    }
    let page_number = page_index + 1;
    let media_box = pdf.media_box(page_number)?;
    let image = rasterizer.render(document, page_index, dpi)?;
    tracing::debug!(
        page = page_number,
        dpi,
        width = image.width(),
        height = image.height(),
        "Rendered page"
    );
    Ok(RenderedPage {
        page_number,
        image,
        media_box,
    })
}

/// One page image of a preview
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagePreview {
    pub page_number: u32,
    /// Cached PNG file
    pub path: PathBuf,
    pub pixel_width: u32,
    pub pixel_height: u32,
    #[serde(skip)]
    pub png: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewResult {
    pub pages: Vec<PagePreview>,
    pub pdf_width_pt: f64,
    pub pdf_height_pt: f64,
    /// Whether the pages show the signed version
    pub signed: bool,
}

#[cfg(feature = "pdfium")]
pub use pdfium::PdfiumRasterizer;

#[cfg(feature = "pdfium")]
mod pdfium {
    use super::PageRasterizer;
    use image::RgbaImage;
    use pdfium_render::prelude::*;
    use seal_types::{SealError, SealResult};
    use std::path::Path;

    pub struct PdfiumRasterizer {
        pdfium: Pdfium,
    }

    impl PdfiumRasterizer {
        /// Bind to a Pdfium library in `library_dir`, else the system library
        pub fn new(library_dir: Option<&Path>) -> SealResult<Self> {
            let bindings = match library_dir {
                Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir))
                    .or_else(|_| Pdfium::bind_to_system_library()),
                None => Pdfium::bind_to_system_library(),
            }
            .map_err(|e| SealError::io("binding to the Pdfium library", e.to_string()))?;
            Ok(Self {
                pdfium: Pdfium::new(bindings),
            })
        }
    }

    impl PageRasterizer for PdfiumRasterizer {
        fn render(&self, document: &[u8], page_index: u32, dpi: u32) -> SealResult<RgbaImage> {
            let doc = self
                .pdfium
                .load_pdf_from_byte_slice(document, None)
                .map_err(|e| SealError::io("loading PDF into Pdfium", e.to_string()))?;
            let index = page_index
                .try_into()
                .map_err(|_| SealError::validation(format!("Page index {} too large", page_index)))?;
            let page = doc
                .pages()
                .get(index)
                .map_err(|e| SealError::io(format!("opening page {}", page_index), e.to_string()))?;

            let config = PdfRenderConfig::new().scale_page_by_factor(dpi as f32 / 72.0);
            let bitmap = page
                .render_with_config(&config)
                .map_err(|e| SealError::io(format!("rendering page {}", page_index), e.to_string()))?;
            Ok(bitmap.as_image().to_rgba8())
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use image::Rgba;
    use std::cell::Cell;

    /// Rasterizer that paints a flat page at the requested DPI and counts calls
    #[derive(Default)]
    pub struct FlatRasterizer {
        pub calls: Cell<usize>,
    }

    impl PageRasterizer for FlatRasterizer {
        fn render(&self, document: &[u8], page_index: u32, dpi: u32) -> SealResult<RgbaImage> {
            self.calls.set(self.calls.get() + 1);
            let pdf = PdfDocument::from_bytes(document)?;
            let [_, _, w, h] = pdf.media_box(page_index + 1)?;
            let scale = f64::from(dpi) / 72.0;
            Ok(RgbaImage::from_pixel(
                (w * scale).round() as u32,
                (h * scale).round() as u32,
                Rgba([255, 255, 255, 255]),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::FlatRasterizer;
    use super::*;
    use crate::document::fixtures::a4_pdf;

    #[test]
    fn test_render_reports_page_size() {
        let pdf = a4_pdf(2);
        let page = render_page(&FlatRasterizer::default(), &pdf, 1, 100).unwrap();
        assert_eq!(page.page_number, 2);
        assert_eq!((page.width_pt(), page.height_pt()), (595.0, 842.0));
        assert_eq!(page.image.dimensions(), (826, 1169));

        let mapper = page.mapper().unwrap();
        let (x, _) = mapper.pixel_to_point(826.0, 0.0);
        assert!((x - 595.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_index() {
        let pdf = a4_pdf(2);
        let rasterizer = FlatRasterizer::default();
        let err = render_page(&rasterizer, &pdf, 2, 150).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(rasterizer.calls.get(), 0);
    }
}
