//! Cross-document classification: universal, repeated, unique, stability.

use pretty_assertions::assert_eq;

use pdfstencil::address::PostalDirectory;
use pdfstencil::corpus::{CorpusIndex, UniversalKind};
use pdfstencil::document::{DocumentAnalysis, ImageBlock, TextBlock};
use pdfstencil::geometry::Rect;
use pdfstencil::glyph::FontDescriptor;
use pdfstencil::line::Column;

fn directory() -> PostalDirectory {
    PostalDirectory::from_json_str(r#"{"75015": [["paris", "Paris"]]}"#).unwrap()
}

fn block(text: &str, bbox: Rect) -> TextBlock {
    TextBlock {
        bbox,
        lines: text
            .split('\n')
            .map(|line| Column {
                bbox,
                text: line.to_string(),
                fonts: line.chars().map(|_| FontDescriptor::Unknown).collect(),
            })
            .collect(),
    }
}

fn doc(docid: &str, blocks: Vec<TextBlock>) -> DocumentAnalysis {
    DocumentAnalysis {
        docid: docid.to_string(),
        page_width: 595.0,
        page_height: 842.0,
        blocks,
        images: Vec::new(),
    }
}

#[test]
fn recurring_block_with_stable_position_is_universal_and_fixed() {
    let dir = directory();
    let mut index = CorpusIndex::new();
    index.add_document(
        &doc("a", vec![block("Facture", Rect::new(10.0, 800.0, 60.0, 810.0))]),
        &dir,
    );
    index.add_document(
        &doc("b", vec![block("Facture", Rect::new(10.0, 801.0, 60.0, 811.0))]),
        &dir,
    );
    index.add_document(
        &doc("c", vec![block("Facture", Rect::new(11.0, 800.0, 61.0, 810.0))]),
        &dir,
    );

    let summary = index.classify();
    assert_eq!(summary.document_count, 3);
    assert_eq!(summary.universal.len(), 1);
    let universal = &summary.universal[0];
    assert_eq!(universal.kind, UniversalKind::Text);
    assert!(universal.fixed_location);
    assert_eq!(universal.bbox, "10,800,60,810");
    assert!(summary.repeated.is_empty());
    assert!(summary.unique.is_empty());
}

#[test]
fn wandering_universal_block_is_not_fixed() {
    let dir = directory();
    let mut index = CorpusIndex::new();
    index.add_document(
        &doc("a", vec![block("Facture", Rect::new(10.0, 800.0, 60.0, 810.0))]),
        &dir,
    );
    index.add_document(
        &doc("b", vec![block("Facture", Rect::new(400.0, 100.0, 450.0, 110.0))]),
        &dir,
    );

    let summary = index.classify();
    assert_eq!(summary.universal.len(), 1);
    assert!(!summary.universal[0].fixed_location);
}

#[test]
fn one_document_indexed_twice_is_all_universal_fixed() {
    let dir = directory();
    let d = doc(
        "only",
        vec![
            block("Facture", Rect::new(10.0, 800.0, 60.0, 810.0)),
            block("Total TTC 120,00", Rect::new(300.0, 100.0, 400.0, 110.0)),
        ],
    );
    let mut index = CorpusIndex::new();
    index.add_document(&d, &dir);
    index.add_document(&d, &dir);

    let summary = index.classify();
    assert_eq!(summary.document_count, 1);
    assert_eq!(summary.universal.len(), 2);
    assert!(summary.universal.iter().all(|u| u.fixed_location));
    assert!(summary.repeated.is_empty());
    assert!(summary.unique.is_empty());
}

#[test]
fn every_hash_lands_in_exactly_one_class() {
    let dir = directory();
    let everywhere = || block("Facture", Rect::new(10.0, 800.0, 60.0, 810.0));
    let mut index = CorpusIndex::new();
    index.add_document(
        &doc("a", vec![everywhere(), block("chez a", Rect::new(0.0, 0.0, 10.0, 10.0))]),
        &dir,
    );
    index.add_document(
        &doc("b", vec![everywhere(), block("chez b et a", Rect::new(0.0, 0.0, 10.0, 10.0))]),
        &dir,
    );
    index.add_document(
        &doc(
            "c",
            vec![everywhere(), block("chez b et a", Rect::new(0.0, 20.0, 10.0, 30.0))],
        ),
        &dir,
    );

    let summary = index.classify();
    assert_eq!(summary.universal.len(), 1);
    assert_eq!(summary.repeated.len(), 1); // "chez b et a" in b and c
    assert_eq!(summary.unique.len(), 1); // "chez a" only in a
}

#[test]
fn universal_images_are_classified_too() {
    let dir = directory();
    let logo = |bbox| ImageBlock { bbox, width: 120, height: 40, hash: "f00d".repeat(16) };
    let mut index = CorpusIndex::new();
    for docid in ["a", "b"] {
        let mut d = doc(docid, vec![block("Facture", Rect::new(10.0, 800.0, 60.0, 810.0))]);
        d.images.push(logo(Rect::new(450.0, 750.0, 570.0, 790.0)));
        index.add_document(&d, &dir);
    }

    let summary = index.classify();
    assert_eq!(summary.universal.len(), 2);
    let image = summary
        .universal
        .iter()
        .find(|u| u.kind == UniversalKind::Image)
        .expect("logo is universal");
    assert!(image.fixed_location);
    assert_eq!(image.type_str, "img");
}

#[test]
fn sharded_indexing_classifies_like_sequential() {
    let dir = directory();
    let a = doc("a", vec![block("Facture", Rect::new(10.0, 800.0, 60.0, 810.0))]);
    let b = doc("b", vec![block("Facture", Rect::new(10.0, 800.0, 60.0, 810.0))]);

    let mut sequential = CorpusIndex::new();
    sequential.add_document(&a, &dir);
    sequential.add_document(&b, &dir);

    let mut shard1 = CorpusIndex::new();
    shard1.add_document(&a, &dir);
    let mut shard2 = CorpusIndex::new();
    shard2.add_document(&b, &dir);
    shard1.merge(shard2);

    assert_eq!(sequential.classify(), shard1.classify());
}

#[test]
fn colocated_addresses_emit_a_synthetic_universal_block() {
    let dir = directory();
    let mut index = CorpusIndex::new();
    // four documents, each with a *different* address text at the same spot
    for (docid, street) in [("a", "1 RUE X"), ("b", "2 RUE Y"), ("c", "3 RUE Z"), ("d", "4 RUE W")]
    {
        let text = format!("{street}, 75015 PARIS");
        index.add_document(
            &doc(docid, vec![block(&text, Rect::new(40.0, 700.0, 200.0, 720.0))]),
            &dir,
        );
    }

    let summary = index.classify();
    // no block text recurs, so nothing is universal by hash
    assert!(summary.universal.is_empty());
    // but the location carries an address in every document
    assert_eq!(summary.synthetic_address_bbox.as_deref(), Some("40,700,200,720"));
}

#[test]
fn scattered_addresses_stay_silent() {
    let dir = directory();
    let mut index = CorpusIndex::new();
    for (docid, y) in [("a", 700.0_f32), ("b", 400.0), ("c", 100.0), ("d", 250.0)] {
        let text = format!("{docid} RUE X, 75015 PARIS");
        index.add_document(
            &doc(docid, vec![block(&text, Rect::new(40.0, y - 20.0, 200.0, y))]),
            &dir,
        );
    }
    let summary = index.classify();
    assert_eq!(summary.synthetic_address_bbox, None);
}
