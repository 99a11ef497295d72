//! Subcommand implementations
//!
//! Each command returns the text to print on stdout; logs go to stderr.

use crate::cli::{LocateArgs, PreviewArgs, RequestArgs, SealArgs, SignatureArgs};
use crate::request::{read_json, write_back_contract, PerforationRequest, StampRequest};
use anyhow::{bail, Context};
use seal_render::{FontRegistry, SealSynthesizer, SignatureMode, SignatureRenderer, TextSignature};
use seal_types::{ContractFile, Rgb, SealAsset, SealImageSpec};
use serde::Serialize;
use stamp_core::{
    BatchItem, CoordinateMapper, EngineConfig, FsDocumentStore, PreviewCache, StampOutcome,
    StampService,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;

fn font_registry(config: &EngineConfig) -> anyhow::Result<Arc<FontRegistry>> {
    let registry = FontRegistry::new(&config.fonts).context("Failed to load fonts")?;
    Ok(Arc::new(registry))
}

fn stamp_service(config: &EngineConfig) -> StampService<FsDocumentStore> {
    let root = &config.storage.root;
    StampService::new(FsDocumentStore::new(root), PreviewCache::new(root))
        .with_dpi(config.preview.dpi)
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<String> {
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "Wrote image");
    Ok(path.display().to_string())
}

fn to_json<T: Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

pub fn seal(config: &EngineConfig, args: &SealArgs) -> anyhow::Result<String> {
    let color = Rgb::parse_or(args.color.as_deref(), config.seal.color()?)?;
    let spec = SealImageSpec::from_request(
        &args.company,
        args.center.as_deref(),
        args.template.as_deref(),
        None,
        args.size,
    )?
    .with_color(color);

    let synthesizer =
        SealSynthesizer::with_calibration(font_registry(config)?, config.seal.calibration);
    let image = synthesizer.synthesize_scaled(&spec, args.scale)?;
    let png = seal_render::encode_png(&image)?;
    write_output(&args.output, &png)
}

pub fn signature(config: &EngineConfig, args: &SignatureArgs) -> anyhow::Result<String> {
    let renderer = SignatureRenderer::new(font_registry(config)?);
    let color = Rgb::parse_or(args.color.as_deref(), Rgb::BLACK)?;

    if args.preview {
        let text = args.text.as_deref().unwrap_or_default();
        return Ok(renderer.preview_data_url(text, &args.font, color)?);
    }

    let mode = match (&args.text, &args.image, &args.data_url) {
        (Some(text), _, _) => {
            SignatureMode::Text(TextSignature::new(text, &args.font, args.font_size).with_color(color))
        }
        (None, Some(path), _) => SignatureMode::Raster(
            fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        (None, None, Some(path)) => SignatureMode::DataUrl(
            fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
        ),
        (None, None, None) => bail!("One of --text, --image or --data-url is required"),
    };

    let Some(output) = &args.output else {
        bail!("--output is required");
    };
    write_output(output, &renderer.render_png(&mode)?)
}

pub fn fonts(config: &EngineConfig) -> anyhow::Result<String> {
    to_json(&font_registry(config)?.list_fonts())
}

fn finish(outcome: StampOutcome, args: &RequestArgs) -> anyhow::Result<String> {
    if args.update {
        write_back_contract(&args.request, &outcome.contract)?;
    }
    to_json(&outcome)
}

pub fn stamp(config: &EngineConfig, args: &RequestArgs) -> anyhow::Result<String> {
    let request: StampRequest = read_json(&args.request)?;
    let assets: Vec<SealAsset> = request
        .items
        .iter()
        .map(|item| item.asset.load())
        .collect::<anyhow::Result<_>>()?;
    let items: Vec<BatchItem<'_>> = request
        .items
        .iter()
        .zip(&assets)
        .map(|(item, asset)| BatchItem::new(asset, &item.positions, item.seal_type))
        .collect();

    let expected = request.expected_version.unwrap_or(request.contract.version);
    let outcome = stamp_service(config).batch_stamp(
        &request.contract,
        expected,
        &items,
        &request.operator,
    )?;
    finish(outcome, args)
}

pub fn perforate(config: &EngineConfig, args: &RequestArgs) -> anyhow::Result<String> {
    let request: PerforationRequest = read_json(&args.request)?;
    let asset = request.asset.load()?;
    let expected = request.expected_version.unwrap_or(request.contract.version);
    let outcome = stamp_service(config).perforation_stamp(
        &request.contract,
        expected,
        &asset,
        &request.spec,
        &request.operator,
    )?;
    finish(outcome, args)
}

pub fn preview(config: &EngineConfig, args: &PreviewArgs) -> anyhow::Result<String> {
    let contract: ContractFile = read_json(&args.contract)?;
    let rasterizer = stamp_core::PdfiumRasterizer::new(config.preview.pdfium_library.as_deref())?;
    let service = stamp_service(config).with_dpi(args.dpi.unwrap_or(config.preview.dpi));
    to_json(&service.preview(&contract, args.page, &rasterizer)?)
}

#[derive(Debug, Serialize)]
struct Location {
    x: f64,
    y: f64,
}

pub fn locate(args: &LocateArgs) -> anyhow::Result<String> {
    let mapper = CoordinateMapper::for_page(
        args.page_width,
        args.page_height,
        args.pixel_width,
        args.pixel_height,
    )?;
    let (x, y) = mapper.pixel_to_points(args.x, args.y);
    to_json(&Location {
        x: x.to_f64(),
        y: y.to_f64(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    #[test]
    fn test_seal_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("seal.png");
        let args = SealArgs {
            company: "Acme Trading Co".into(),
            center: Some("Contract Seal".into()),
            template: None,
            color: None,
            size: None,
            scale: 1.0,
            output: output.clone(),
        };
        seal(&EngineConfig::default(), &args).unwrap();
        let image = seal_render::decode_image(&fs::read(&output).unwrap()).unwrap();
        assert_eq!(image.dimensions(), (340, 340));
    }

    #[test]
    fn test_seal_rejects_bad_color() {
        let args = SealArgs {
            company: "Acme".into(),
            center: None,
            template: None,
            color: Some("#GG0000".into()),
            size: None,
            scale: 1.0,
            output: PathBuf::from("unused.png"),
        };
        assert!(seal(&EngineConfig::default(), &args).is_err());
    }

    #[test]
    fn test_locate() {
        let args = LocateArgs {
            page_width: 612.0,
            page_height: 792.0,
            pixel_width: 612,
            pixel_height: 792,
            x: 100.0,
            y: 92.0,
        };
        let value: serde_json::Value = serde_json::from_str(&locate(&args).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({ "x": 100.0, "y": 700.0 }));
    }

    #[test]
    fn test_stamp_request_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("storage");
        fs::create_dir_all(root.join("contracts")).unwrap();

        let mut config = EngineConfig::default();
        config.storage.root = root.clone();
        let seal_png = dir.path().join("seal.png");
        seal(
            &config,
            &SealArgs {
                company: "Acme".into(),
                center: None,
                template: Some("square_legal".into()),
                color: None,
                size: None,
                scale: 1.0,
                output: seal_png.clone(),
            },
        )
        .unwrap();
        fs::write(root.join("contracts/c.pdf"), one_page_pdf()).unwrap();

        let request = dir.path().join("stamp.json");
        let body = serde_json::json!({
            "contract": {
                "id": 9,
                "fileName": "c.pdf",
                "originalPath": "contracts/c.pdf",
                "pageCount": 1
            },
            "operator": { "id": 1, "name": "Ops" },
            "items": [{
                "asset": { "id": 4, "kind": "SEAL", "image": seal_png },
                "positions": [{ "pageNumber": 1, "x": 10, "y": 10 }]
            }]
        });
        fs::write(&request, body.to_string()).unwrap();

        let args = RequestArgs {
            request: request.clone(),
            update: true,
        };
        let out: serde_json::Value = serde_json::from_str(&stamp(&config, &args).unwrap()).unwrap();
        assert_eq!(out["contract"]["status"], "SIGNED");
        assert_eq!(out["records"].as_array().unwrap().len(), 1);

        // the request now carries the signed contract, so a rerun stamps on top
        let updated: StampRequest = read_json(&request).unwrap();
        assert_eq!(updated.contract.version, 1);
        let again: serde_json::Value =
            serde_json::from_str(&stamp(&config, &args).unwrap()).unwrap();
        assert_eq!(again["contract"]["version"], 2);
    }

    fn one_page_pdf() -> Vec<u8> {
        use lopdf::{dictionary, Document, Object, Stream};
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => 1,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }
}
