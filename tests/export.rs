//! XML output shape for both the per-document and the corpus reports.

use pdfstencil::address::PostalDirectory;
use pdfstencil::corpus::CorpusIndex;
use pdfstencil::document::{DocumentAnalysis, ImageBlock, TextBlock};
use pdfstencil::export::{document_xml, universal_xml};
use pdfstencil::geometry::Rect;
use pdfstencil::glyph::{FontDescriptor, Rgb};
use pdfstencil::line::Column;

fn directory() -> PostalDirectory {
    PostalDirectory::from_json_str(r#"{"75015": [["paris", "Paris"]]}"#).unwrap()
}

fn styled_block(text: &str, bbox: Rect) -> TextBlock {
    TextBlock {
        bbox,
        lines: vec![Column {
            bbox,
            text: text.to_string(),
            fonts: text
                .chars()
                .map(|_| FontDescriptor::Known {
                    family: "Helvetica-Bold".to_string(),
                    size: 12,
                    color: Rgb { r: 19, g: 108, b: 188 },
                })
                .collect(),
        }],
    }
}

fn doc(docid: &str) -> DocumentAnalysis {
    DocumentAnalysis {
        docid: docid.to_string(),
        page_width: 595.0,
        page_height: 842.0,
        blocks: vec![styled_block("Facture", Rect::new(10.0, 800.0, 60.0, 810.0))],
        images: vec![ImageBlock {
            bbox: Rect::new(450.0, 750.0, 570.0, 790.0),
            width: 120,
            height: 40,
            hash: "ab".repeat(32),
        }],
    }
}

#[test]
fn document_xml_lists_blocks_then_images() {
    let xml = document_xml(&doc("a"));
    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    let blocks_at = xml.find("<textblocks>").unwrap();
    let images_at = xml.find("<images>").unwrap();
    assert!(blocks_at < images_at);
    assert!(xml.contains("<textline bbox=\"10,800,60,810\">Facture</textline>"));
    assert!(xml.contains("bbox=\"450,750,570,790\""));
    assert!(xml.contains("width=\"120\""));
}

#[test]
fn universal_report_carries_spans_and_type() {
    let dir = directory();
    let mut index = CorpusIndex::new();
    index.add_document(&doc("a"), &dir);
    index.add_document(&doc("b"), &dir);

    let xml = universal_xml(&index.classify());
    assert!(xml.contains("<universal_blocks>"));
    assert!(xml.contains("<textblock fixedLocation=\"true\" type=\"unk\" bbox=\"10,800,60,810\">"));
    assert!(xml.contains(
        "<span fontFamily=\"Helvetica-Bold\" size=\"12\" color=\"(19,108,188)\" bbox=\"10,800,60,810\">Facture</span>"
    ));
    assert!(xml.contains("<br/>"));
    // the shared logo is universal as well and serializes its hash
    assert!(xml.contains("type=\"img\""));
    assert!(xml.contains(&"ab".repeat(32)));
}

#[test]
fn unfixed_universal_blocks_get_an_empty_bbox() {
    let dir = directory();
    let mut index = CorpusIndex::new();
    let mut a = doc("a");
    a.images.clear();
    let mut b = doc("b");
    b.images.clear();
    b.blocks[0].bbox = Rect::new(400.0, 100.0, 450.0, 110.0);
    b.blocks[0].lines[0].bbox = b.blocks[0].bbox;
    index.add_document(&a, &dir);
    index.add_document(&b, &dir);

    let xml = universal_xml(&index.classify());
    assert!(xml.contains("fixedLocation=\"false\""));
    assert!(xml.contains("bbox=\"\""));
}
