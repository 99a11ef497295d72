//! Contract-level stamping
//!
//! [`StampService`] layers business rules over the document engine: which
//! file to stamp, whether the contract and asset may be used, the
//! single-writer version token, audit records and preview invalidation.
//! Nothing is written until the engine has produced the full output, so a
//! failed call leaves both storage and the contract untouched.

use crate::cache::{PreviewCache, PreviewVariant};
use crate::document::PdfDocument;
use crate::engine::{batch_stamp_document, perforate_document, ImagePlacements};
use crate::preview::{render_page, PagePreview, PageRasterizer, PreviewResult, DEFAULT_PREVIEW_DPI};
use crate::store::DocumentStore;
use chrono::{DateTime, Utc};
use seal_render::{decode_image, encode_png};
use seal_types::{
    hash_document, AssetKind, ContractFile, Operator, PerforationSpec, SealAsset, SealError,
    SealPosition, SealRecord, SealResult, SealType,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::instrument;

/// Result of a successful stamping call. The caller persists `contract`
/// and `records`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StampOutcome {
    pub contract: ContractFile,
    pub records: Vec<SealRecord>,
    /// SHA-256 of the new signed file
    pub document_hash: String,
    #[serde(skip)]
    pub signed_bytes: Vec<u8>,
}

impl StampOutcome {
    pub fn signed_path(&self) -> Option<&std::path::Path> {
        self.contract.signed_path.as_deref()
    }
}

/// One asset and its positions within a batch
#[derive(Debug, Clone, Copy)]
pub struct BatchItem<'a> {
    pub asset: &'a SealAsset,
    pub positions: &'a [SealPosition],
    pub seal_type: SealType,
}

impl<'a> BatchItem<'a> {
    pub fn new(asset: &'a SealAsset, positions: &'a [SealPosition], seal_type: SealType) -> Self {
        Self {
            asset,
            positions,
            seal_type,
        }
    }
}

/// Asset kind a placement of `seal_type` must use
fn placement_kind(seal_type: SealType) -> SealResult<AssetKind> {
    match seal_type {
        SealType::Normal => Ok(AssetKind::Seal),
        SealType::PersonalSignature => Ok(AssetKind::Signature),
        SealType::Perforation => Err(SealError::validation(
            "Perforation seals are applied with perforation_stamp",
        )),
    }
}

fn check_asset(asset: &SealAsset, seal_type: SealType) -> SealResult<()> {
    asset.ensure_enabled()?;
    asset.ensure_kind(placement_kind(seal_type)?)
}

struct RecordContext<'a> {
    contract_id: i64,
    operator: &'a Operator,
    seal_time: DateTime<Utc>,
}

impl RecordContext<'_> {
    fn record(&self, asset_id: i64, position: &SealPosition, seal_type: SealType) -> SealRecord {
        SealRecord {
            contract_id: self.contract_id,
            seal_or_signature_id: asset_id,
            page_number: position.page_number,
            position_x: position.x,
            position_y: position.y,
            width: position.width,
            height: position.height,
            seal_type,
            operator_id: self.operator.id,
            operator_name: self.operator.name.clone(),
            seal_time: self.seal_time,
        }
    }
}

pub struct StampService<S> {
    store: S,
    previews: PreviewCache,
    dpi: u32,
}

impl<S: DocumentStore> StampService<S> {
    pub fn new(store: S, previews: PreviewCache) -> Self {
        Self {
            store,
            previews,
            dpi: DEFAULT_PREVIEW_DPI,
        }
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn previews(&self) -> &PreviewCache {
        &self.previews
    }

    /// Draw one seal or signature at every position
    #[instrument(skip_all, fields(contract_id = contract.id, asset_id = asset.id, positions = positions.len()))]
    pub fn stamp(
        &self,
        contract: &ContractFile,
        expected_version: u64,
        asset: &SealAsset,
        positions: &[SealPosition],
        seal_type: SealType,
        operator: &Operator,
    ) -> SealResult<StampOutcome> {
        self.batch_stamp(
            contract,
            expected_version,
            &[BatchItem::new(asset, positions, seal_type)],
            operator,
        )
    }

    /// Draw several assets in one signed version
    #[instrument(skip_all, fields(contract_id = contract.id, items = items.len()))]
    pub fn batch_stamp(
        &self,
        contract: &ContractFile,
        expected_version: u64,
        items: &[BatchItem<'_>],
        operator: &Operator,
    ) -> SealResult<StampOutcome> {
        contract.ensure_stampable(expected_version)?;
        if items.is_empty() {
            return Err(SealError::validation("Nothing to stamp"));
        }
        for item in items {
            check_asset(item.asset, item.seal_type)?;
            for position in item.positions {
                position.validate()?;
            }
        }

        let source = self.store.read(contract.current_source())?;
        let placements: Vec<ImagePlacements<'_>> = items
            .iter()
            .map(|item| ImagePlacements::new(&item.asset.image_bytes, item.positions))
            .collect();
        let signed = batch_stamp_document(&source, &placements)?;

        let ctx = RecordContext {
            contract_id: contract.id,
            operator,
            seal_time: Utc::now(),
        };
        let records = items
            .iter()
            .flat_map(|item| {
                item.positions
                    .iter()
                    .map(|pos| ctx.record(item.asset.id, pos, item.seal_type))
                    .collect::<Vec<_>>()
            })
            .collect();

        self.commit(contract, signed, records)
    }

    /// Split a seal across the right edge of every page
    #[instrument(skip_all, fields(contract_id = contract.id, asset_id = asset.id))]
    pub fn perforation_stamp(
        &self,
        contract: &ContractFile,
        expected_version: u64,
        asset: &SealAsset,
        spec: &PerforationSpec,
        operator: &Operator,
    ) -> SealResult<StampOutcome> {
        contract.ensure_stampable(expected_version)?;
        asset.ensure_enabled()?;
        asset.ensure_kind(AssetKind::Seal)?;
        spec.validate()?;

        let source = self.store.read(contract.current_source())?;
        let (signed, placements) = perforate_document(&source, &asset.image_bytes, spec)?;

        let ctx = RecordContext {
            contract_id: contract.id,
            operator,
            seal_time: Utc::now(),
        };
        let records = placements
            .iter()
            .map(|p| {
                let position = SealPosition {
                    page_number: p.page_number,
                    x: p.x,
                    y: p.y,
                    width: p.width,
                    height: p.height,
                };
                ctx.record(asset.id, &position, SealType::Perforation)
            })
            .collect();

        self.commit(contract, signed, records)
    }

    fn commit(
        &self,
        contract: &ContractFile,
        signed: Vec<u8>,
        records: Vec<SealRecord>,
    ) -> SealResult<StampOutcome> {
        let signed_path = self.store.write_signed(contract.id, &signed)?;
        self.previews.invalidate_signed(contract.id);

        let updated = contract.mark_signed(signed_path);
        tracing::info!(
            contract_id = contract.id,
            version = updated.version,
            records = records.len(),
            "Contract stamped"
        );
        Ok(StampOutcome {
            contract: updated,
            records,
            document_hash: hash_document(&signed),
            signed_bytes: signed,
        })
    }

    /// Render every page, or only `page` (1-based), of the current version.
    /// Cached page images are reused.
    #[instrument(skip_all, fields(contract_id = contract.id, page = ?page))]
    pub fn preview(
        &self,
        contract: &ContractFile,
        page: Option<u32>,
        rasterizer: &dyn PageRasterizer,
    ) -> SealResult<PreviewResult> {
        let variant = if contract.is_signed() {
            PreviewVariant::Signed
        } else {
            PreviewVariant::Original
        };
        let source = self.store.read(contract.current_source())?;
        let pdf = PdfDocument::from_bytes(&source)?;
        let page_count = pdf.page_count();

        let indices: Vec<u32> = match page {
            Some(number) => {
                if number == 0 || number > page_count {
                    return Err(SealError::validation(format!(
                        "Page {} out of range (document has {} pages)",
                        number, page_count
                    )));
                }
                vec![number - 1]
            }
            None => (0..page_count).collect(),
        };

        let mut pages = Vec::with_capacity(indices.len());
        for index in indices {
            pages.push(self.preview_page(contract.id, variant, &source, index, rasterizer)?);
        }

        let first = pages
            .first()
            .map(|p| p.page_number)
            .ok_or_else(|| SealError::validation("Document has no pages"))?;
        let size = pdf.page_size(first)?;

        Ok(PreviewResult {
            pages,
            pdf_width_pt: size.width.to_f64(),
            pdf_height_pt: size.height.to_f64(),
            signed: variant == PreviewVariant::Signed,
        })
    }

    fn preview_page(
        &self,
        contract_id: i64,
        variant: PreviewVariant,
        source: &[u8],
        page_index: u32,
        rasterizer: &dyn PageRasterizer,
    ) -> SealResult<PagePreview> {
        let path = self.previews.page_path(contract_id, variant, page_index, self.dpi);
        if let Some(png) = self.previews.get(contract_id, variant, page_index, self.dpi)? {
            let (pixel_width, pixel_height) = decode_image(&png)?.dimensions();
            tracing::debug!(page_index, dpi = self.dpi, "Preview cache hit");
            return Ok(PagePreview {
                page_number: page_index + 1,
                path,
                pixel_width,
                pixel_height,
                png,
            });
        }

        let rendered = render_page(rasterizer, source, page_index, self.dpi)?;
        let png = encode_png(&rendered.image)?;
        let path: PathBuf = self
            .previews
            .put(contract_id, variant, page_index, self.dpi, &png)?;
        Ok(PagePreview {
            page_number: rendered.page_number,
            path,
            pixel_width: rendered.image.width(),
            pixel_height: rendered.image.height(),
            png,
        })
    }
}
