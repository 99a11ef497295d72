//! Perforation (cross-page) seal slicing
//!
//! A perforation seal is cut into horizontal strips, one per page. Stacking
//! the pages edge to edge lines the strips up into the whole seal.

use image::{imageops, RgbaImage};
use seal_types::{PerforationSpec, Points, SealError, SealResult};

#[derive(Debug, Clone, PartialEq)]
pub struct ImageSlice {
    /// 0-based, top strip first
    pub index: usize,
    pub image: RgbaImage,
}

/// Where a slice lands on its page, in PDF points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlicePlacement {
    pub page_number: u32,
    pub x: Points,
    pub y: Points,
    pub width: Points,
    pub height: Points,
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSize {
    pub width: Points,
    pub height: Points,
}

impl PageSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: Points::from_f64(width),
            height: Points::from_f64(height),
        }
    }
}

fn check_page_count(page_count: usize) -> SealResult<()> {
    if page_count < 2 {
        return Err(SealError::validation(format!(
            "Perforation seals need at least 2 pages, document has {}",
            page_count
        )));
    }
    Ok(())
}

/// Cut `image` into `page_count` strips of `floor(h / n)` rows; the last strip
/// takes the remainder.
pub fn slice(image: &RgbaImage, page_count: usize) -> SealResult<Vec<ImageSlice>> {
    check_page_count(page_count)?;
    let (width, height) = image.dimensions();
    let n = u32::try_from(page_count)
        .map_err(|_| SealError::validation("Too many pages to slice across"))?;
    if height < n {
        return Err(SealError::validation(format!(
            "Seal image is {} px tall, too short to split across {} pages",
            height, page_count
        )));
    }

    let strip = height / n;
    let slices = (0..n)
        .map(|i| {
            let top = i * strip;
            let rows = if i + 1 == n { height - top } else { strip };
            ImageSlice {
                index: i as usize,
                image: imageops::crop_imm(image, 0, top, width, rows).to_image(),
            }
        })
        .collect();
    Ok(slices)
}

/// Place slice *i* on page *i + 1* straddling the right edge: `edge_margin`
/// of the seal width lies inside the page, vertically centered and shifted
/// by `y_offset`.
pub fn place_slices(spec: &PerforationSpec, pages: &[PageSize]) -> SealResult<Vec<SlicePlacement>> {
    spec.validate()?;
    check_page_count(pages.len())?;
    let n = u32::try_from(pages.len())
        .map_err(|_| SealError::validation("Too many pages to slice across"))?;

    let slice_height = spec.seal_height / n;
    let edge_margin = spec.effective_edge_margin();

    Ok(pages
        .iter()
        .zip(1..)
        .map(|(page, page_number)| SlicePlacement {
            page_number,
            x: page.width - edge_margin,
            y: (page.height - slice_height) / 2 + spec.y_offset,
            width: spec.seal_width,
            height: slice_height,
        })
        .collect())
}
