//! End-to-end stamping through the contract service
//!
//! Run with: cargo test -p stamp-core --test stamping

#[path = "common/fixtures.rs"]
mod fixtures;

use fixtures::*;
use lopdf::Document;
use pretty_assertions::assert_eq;
use seal_types::{
    hash_document, ContractStatus, Operator, PerforationSpec, Points, SealPosition, SealType,
};
use stamp_core::{
    BatchItem, CoordinateMapper, DocumentStore, FsDocumentStore, PreviewCache, StampService,
};
use std::fs;
use std::path::Path;

fn service(root: &Path) -> StampService<FsDocumentStore> {
    StampService::new(FsDocumentStore::new(root), PreviewCache::new(root))
}

fn clerk() -> Operator {
    Operator::new(1001, "Zhang Min")
}

// ============================================================================
// Cumulative stamping
// ============================================================================

#[test]
fn test_second_stamp_builds_on_first() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());
    let contract = stored_contract(dir.path(), 1, 3);

    let first = service
        .stamp(
            &contract,
            0,
            &seal_asset(10),
            &[SealPosition::new(3, 400.0, 80.0, 120.0, 120.0)],
            SealType::Normal,
            &clerk(),
        )
        .unwrap();
    let second = service
        .stamp(
            &first.contract,
            1,
            &signature_asset(20),
            &[SealPosition::new(3, 100.0, 80.0, 150.0, 50.0)],
            SealType::PersonalSignature,
            &clerk(),
        )
        .unwrap();

    assert_ne!(first.signed_path(), second.signed_path());
    assert_eq!(second.contract.version, 2);
    assert_eq!(second.contract.status, ContractStatus::Signed);

    // both images survive on the page, newest last
    let images = drawn_images(&second.signed_bytes, 3);
    assert_eq!(images.len(), 2);
    assert_eq!(drawn_images(&first.signed_bytes, 3), images[..1].to_vec());

    // earlier versions stay on disk
    let store = service.store();
    assert!(store.read(first.signed_path().unwrap()).is_ok());
    assert_eq!(
        store.read(second.signed_path().unwrap()).unwrap(),
        second.signed_bytes
    );
}

#[test]
fn test_annotations_and_text_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let contract = stored_contract(dir.path(), 2, 2);
    let outcome = service(dir.path())
        .stamp(
            &contract,
            0,
            &seal_asset(10),
            &[SealPosition::new(1, 300.0, 300.0, 120.0, 120.0)],
            SealType::Normal,
            &clerk(),
        )
        .unwrap();

    let doc = Document::load_mem(&outcome.signed_bytes).unwrap();
    assert_eq!(doc.get_pages().len(), 2);
    let page_id = doc.get_pages()[&1];
    let page = doc.get_dictionary(page_id).unwrap();
    assert_eq!(page.get(b"Annots").unwrap().as_array().unwrap().len(), 1);

    let content = String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned();
    assert!(content.contains("Lease agreement, page 1"));
}

// ============================================================================
// Rejections leave everything untouched
// ============================================================================

#[test]
fn test_cancelled_contract_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());
    let contract = stored_contract(dir.path(), 3, 2);
    let signed = service
        .stamp(
            &contract,
            0,
            &seal_asset(10),
            &[SealPosition::new(1, 10.0, 10.0, 60.0, 60.0)],
            SealType::Normal,
            &clerk(),
        )
        .unwrap()
        .contract;
    let cancelled = signed.cancel();

    let err = service
        .stamp(
            &cancelled,
            cancelled.version,
            &seal_asset(10),
            &[SealPosition::new(2, 10.0, 10.0, 60.0, 60.0)],
            SealType::Normal,
            &clerk(),
        )
        .unwrap_err();
    assert!(err.is_state());
    assert_eq!(cancelled.signed_path, signed.signed_path);

    let err = service
        .perforation_stamp(
            &cancelled,
            cancelled.version,
            &seal_asset(10),
            &PerforationSpec::new(120.0, 120.0),
            &clerk(),
        )
        .unwrap_err();
    assert!(err.is_state());
}

#[test]
fn test_out_of_range_page_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());
    let contract = stored_contract(dir.path(), 4, 5);
    let original = dir.path().join(&contract.original_path);
    let before = hash_document(&fs::read(&original).unwrap());

    let err = service
        .stamp(
            &contract,
            0,
            &seal_asset(10),
            &[
                SealPosition::new(1, 10.0, 10.0, 60.0, 60.0),
                SealPosition::new(99, 10.0, 10.0, 60.0, 60.0),
            ],
            SealType::Normal,
            &clerk(),
        )
        .unwrap_err();

    assert!(err.is_validation());
    assert_eq!(hash_document(&fs::read(&original).unwrap()), before);
    assert!(!dir.path().join("signed").exists());
}

#[test]
fn test_batch_is_atomic() {
    let dir = tempfile::tempdir().unwrap();
    let service = service(dir.path());
    let contract = stored_contract(dir.path(), 5, 2);
    let seal = seal_asset(10);
    let signature = signature_asset(20);
    let good = [SealPosition::new(1, 10.0, 10.0, 60.0, 60.0)];
    let bad = [SealPosition::new(3, 10.0, 10.0, 60.0, 60.0)];

    let err = service
        .batch_stamp(
            &contract,
            0,
            &[
                BatchItem::new(&seal, &good, SealType::Normal),
                BatchItem::new(&signature, &bad, SealType::PersonalSignature),
            ],
            &clerk(),
        )
        .unwrap_err();
    assert!(err.is_validation());
    assert!(!dir.path().join("signed").exists());

    let both = [
        SealPosition::new(1, 10.0, 10.0, 60.0, 60.0),
        SealPosition::new(2, 10.0, 10.0, 60.0, 60.0),
    ];
    let outcome = service
        .batch_stamp(
            &contract,
            0,
            &[
                BatchItem::new(&seal, &both, SealType::Normal),
                BatchItem::new(&signature, &good, SealType::PersonalSignature),
            ],
            &clerk(),
        )
        .unwrap();
    assert_eq!(outcome.records.len(), 3);
    assert_eq!(outcome.records[2].seal_type, SealType::PersonalSignature);
    assert_eq!(outcome.records[2].seal_or_signature_id, 20);
    assert_eq!(drawn_images(&outcome.signed_bytes, 1).len(), 2);
    assert_eq!(drawn_images(&outcome.signed_bytes, 2).len(), 1);
}

// ============================================================================
// Perforation seals
// ============================================================================

#[test]
fn test_perforation_across_four_pages() {
    let dir = tempfile::tempdir().unwrap();
    let contract = stored_contract(dir.path(), 6, 4);
    let mut spec = PerforationSpec::new(100.0, 100.0);
    spec.y_offset = Points::from_f64(-20.0);

    let outcome = service(dir.path())
        .perforation_stamp(&contract, 0, &seal_asset(10), &spec, &clerk())
        .unwrap();

    assert_eq!(outcome.records.len(), 4);
    for (i, record) in outcome.records.iter().enumerate() {
        assert_eq!(record.page_number, i as u32 + 1);
        assert_eq!(record.seal_type, SealType::Perforation);
        assert_eq!(record.position_x, Points::from_f64(545.0));
        assert_eq!(record.height, Points::from_f64(25.0));
        // (842 - 25) / 2 - 20
        assert_eq!(record.position_y, Points::from_f64(388.5));
        assert_eq!(drawn_images(&outcome.signed_bytes, i as u32 + 1).len(), 1);
    }
}

#[test]
fn test_perforation_needs_two_pages() {
    let dir = tempfile::tempdir().unwrap();
    let contract = stored_contract(dir.path(), 7, 1);
    let err = service(dir.path())
        .perforation_stamp(
            &contract,
            0,
            &seal_asset(10),
            &PerforationSpec::new(100.0, 100.0),
            &clerk(),
        )
        .unwrap_err();
    assert!(err.is_validation());
}

// ============================================================================
// Coordinates
// ============================================================================

#[test]
fn test_preview_click_maps_to_points() {
    let mapper = CoordinateMapper::for_page(595.0, 842.0, 827, 1169).unwrap();
    let (x, y) = mapper.pixel_to_point(413.0, 584.0);
    assert!((x - 297.3).abs() < 1.0);
    assert!((y - 420.8).abs() < 1.0);

    let (px, py) = mapper.point_to_pixel(x, y);
    assert!((px - 413.0).abs() < 1e-6);
    assert!((py - 584.0).abs() < 1e-6);
}
