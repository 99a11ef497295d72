//! Contract PDFs and seal images for integration tests

use image::{Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use seal_render::encode_png;
use seal_types::{AssetKind, ContractFile, SealAsset};
use std::fs;
use std::path::Path;

/// `pages` A4 pages of text; the first page carries a link annotation
pub fn contract_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Times-Roman",
    });
    let annot_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Link",
        "Rect" => vec![72.into(), 700.into(), 200.into(), 720.into()],
    });

    let mut kids = Vec::new();
    for i in 0..pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 11.into()]),
                Operation::new("Td", vec![72.into(), 760.into()]),
                Operation::new(
                    "Tj",
                    vec![Object::string_literal(format!("Lease agreement, page {}", i + 1))],
                ),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let mut page = dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        };
        if i == 0 {
            page.set("Annots", vec![Object::Reference(annot_id)]);
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    // Media box lives on the page tree and is inherited by every page
    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
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

/// Write a contract PDF under `root` and describe it
pub fn stored_contract(root: &Path, id: i64, pages: usize) -> ContractFile {
    let relative = format!("contracts/{}.pdf", id);
    let full = root.join(&relative);
    fs::create_dir_all(full.parent().unwrap()).unwrap();
    fs::write(&full, contract_pdf(pages)).unwrap();
    ContractFile::new(id, format!("{}.pdf", id), relative, pages as u32)
}

pub fn solid_png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    encode_png(&RgbaImage::from_pixel(width, height, Rgba(color))).unwrap()
}

pub fn seal_asset(id: i64) -> SealAsset {
    SealAsset::new(id, "Finance seal", AssetKind::Seal, solid_png(80, 80, [220, 40, 40, 230]))
}

pub fn signature_asset(id: i64) -> SealAsset {
    SealAsset::new(id, "Signature", AssetKind::Signature, solid_png(120, 40, [0, 0, 0, 255]))
}

/// Names of the XObjects drawn on `page`, in drawing order
pub fn drawn_images(pdf: &[u8], page: u32) -> Vec<String> {
    let doc = Document::load_mem(pdf).unwrap();
    let page_id = doc.get_pages()[&page];
    let content = Content::decode(&doc.get_page_content(page_id).unwrap()).unwrap();
    content
        .operations
        .iter()
        .filter(|op| op.operator == "Do")
        .filter_map(|op| match op.operands.first() {
            Some(Object::Name(name)) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        })
        .collect()
}
