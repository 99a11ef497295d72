//! Document-level stamping
//!
//! These functions take PDF bytes and return new PDF bytes. They enforce
//! only structural rules (page bounds, decodable images, enough pages for a
//! perforation seal); business state such as cancellation or disabled
//! assets is checked by [`crate::service::StampService`].
//!
//! Each call loads the document once, validates every request, and only
//! then draws and saves, so a rejected request produces no output at all.

use crate::document::PdfDocument;
use crate::xobject::{embed_image, ImageDraw};
use image::RgbaImage;
use lopdf::ObjectId;
use seal_render::{decode_image, place_slices, slice, SlicePlacement};
use seal_types::{PerforationSpec, Points, SealError, SealPosition, SealResult};
use std::collections::BTreeMap;

/// One image and every position it should be drawn at
#[derive(Debug, Clone, Copy)]
pub struct ImagePlacements<'a> {
    pub image: &'a [u8],
    pub positions: &'a [SealPosition],
}

impl<'a> ImagePlacements<'a> {
    pub fn new(image: &'a [u8], positions: &'a [SealPosition]) -> Self {
        Self { image, positions }
    }
}

/// Draws collected per page, applied in one pass per page
#[derive(Default)]
struct DrawPlan {
    pages: BTreeMap<u32, Vec<ImageDraw>>,
}

impl DrawPlan {
    fn push(&mut self, page_number: u32, draw: ImageDraw) {
        self.pages.entry(page_number).or_default().push(draw);
    }

    fn draw_count(&self) -> usize {
        self.pages.values().map(Vec::len).sum()
    }

    fn apply(self, pdf: &mut PdfDocument) -> SealResult<()> {
        for (page_number, draws) in &self.pages {
            let page_id = pdf.page_id(*page_number)?;
            pdf.draw_images(page_id, draws)?;
            tracing::debug!(page = page_number, draws = draws.len(), "Drew page stamps");
        }
        Ok(())
    }
}

fn check_positions(positions: &[SealPosition], page_count: u32) -> SealResult<()> {
    if positions.is_empty() {
        return Err(SealError::validation("At least one position is required"));
    }
    positions
        .iter()
        .try_for_each(|pos| pos.validate_against(page_count))
}

/// Draw one image at every position
pub fn stamp_document(
    source: &[u8],
    image: &[u8],
    positions: &[SealPosition],
) -> SealResult<Vec<u8>> {
    batch_stamp_document(source, &[ImagePlacements::new(image, positions)])
}

/// Draw several images in a single load/save cycle; either every placement
/// is drawn or the call fails without output
pub fn batch_stamp_document(source: &[u8], batch: &[ImagePlacements<'_>]) -> SealResult<Vec<u8>> {
    if batch.is_empty() {
        return Err(SealError::validation("Nothing to stamp"));
    }

    let mut pdf = PdfDocument::from_bytes(source)?;
    let page_count = pdf.page_count();

    let mut decoded: Vec<(RgbaImage, &[SealPosition])> = Vec::with_capacity(batch.len());
    for item in batch {
        check_positions(item.positions, page_count)?;
        decoded.push((decode_image(item.image)?, item.positions));
    }

    let mut plan = DrawPlan::default();
    for (image, positions) in &decoded {
        let image_id: ObjectId = embed_image(&mut pdf.doc, image)?;
        for pos in positions.iter() {
            plan.push(
                pos.page_number,
                ImageDraw {
                    image: image_id,
                    x: pos.x,
                    y: pos.y,
                    width: pos.width,
                    height: pos.height,
                },
            );
        }
    }

    let draws = plan.draw_count();
    let pages = plan.pages.len();
    plan.apply(&mut pdf)?;
    let output = pdf.save_to_bytes()?;

    tracing::info!(
        images = batch.len(),
        draws,
        pages,
        bytes = output.len(),
        "Stamped document"
    );
    Ok(output)
}

/// Split a seal across the right edge of every page.
///
/// Returns the new document and the placement of each slice in PDF user
/// space (offset by each page's media box origin).
pub fn perforate_document(
    source: &[u8],
    image: &[u8],
    spec: &PerforationSpec,
) -> SealResult<(Vec<u8>, Vec<SlicePlacement>)> {
    spec.validate()?;
    let mut pdf = PdfDocument::from_bytes(source)?;
    let page_count = pdf.page_count() as usize;

    let seal = decode_image(image)?;
    let slices = slice(&seal, page_count)?;
    let sizes = pdf.page_sizes()?;
    let mut placements = place_slices(spec, &sizes)?;

    let mut plan = DrawPlan::default();
    for (placement, piece) in placements.iter_mut().zip(&slices) {
        let [origin_x, origin_y, _, _] = pdf.media_box(placement.page_number)?;
        placement.x = placement.x + Points::from_f64(origin_x);
        placement.y = placement.y + Points::from_f64(origin_y);

        let image_id = embed_image(&mut pdf.doc, &piece.image)?;
        plan.push(
            placement.page_number,
            ImageDraw {
                image: image_id,
                x: placement.x,
                y: placement.y,
                width: placement.width,
                height: placement.height,
            },
        );
    }

    plan.apply(&mut pdf)?;
    let output = pdf.save_to_bytes()?;

    tracing::info!(
        pages = page_count,
        slice_height = %placements.first().map(|p| p.height).unwrap_or_default(),
        "Applied perforation seal"
    );
    Ok((output, placements))
}
