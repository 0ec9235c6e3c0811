//! Serialization of analysis results into the exchange XML format.

use xmlwriter::{Indent, Options, XmlWriter};

use crate::corpus::{CorpusSummary, UniversalKind};
use crate::document::DocumentAnalysis;
use crate::glyph::FontDescriptor;
use crate::style::InlineItem;

const XML_WRITE_OPTIONS: Options = Options {
    use_single_quote: false,
    indent: Indent::Spaces(4),
    attributes_indent: Indent::None,
};

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";

/// Per-document page structure: text blocks with their lines, then image
/// placements.
pub fn document_xml(doc: &DocumentAnalysis) -> String {
    let mut xml = XmlWriter::new(XML_WRITE_OPTIONS);
    xml.start_element("page");

    xml.start_element("textblocks");
    for block in &doc.blocks {
        xml.start_element("textblock");
        xml.write_attribute("bbox", &block.bbox.bbox_string());
        for line in &block.lines {
            xml.start_element("textline");
            xml.write_attribute("bbox", &line.bbox.bbox_string());
            xml.write_text(&line.text);
            xml.end_element();
        }
        xml.end_element();
    }
    xml.end_element();

    xml.start_element("images");
    for image in &doc.images {
        xml.start_element("image");
        xml.write_attribute("bbox", &image.bbox.bbox_string());
        xml.write_attribute("width", &image.width);
        xml.write_attribute("height", &image.height);
        xml.end_element();
    }
    xml.end_element();

    format!("{XML_DECLARATION}{}", xml.end_document())
}

/// Corpus universal-block report. Blocks without a fixed location get an
/// empty bbox attribute.
pub fn universal_xml(summary: &CorpusSummary) -> String {
    let mut xml = XmlWriter::new(XML_WRITE_OPTIONS);
    xml.start_element("page");
    xml.start_element("universal_blocks");

    for block in &summary.universal {
        let bbox = if block.fixed_location { block.bbox.as_str() } else { "" };
        match block.kind {
            UniversalKind::Image => {
                xml.start_element("image");
                xml.write_attribute("fixedLocation", &block.fixed_location);
                xml.write_attribute("type", block.type_str);
                xml.write_attribute("bbox", bbox);
                xml.write_text(&block.hash);
                xml.end_element();
            }
            UniversalKind::Text => {
                xml.start_element("textblock");
                xml.write_attribute("fixedLocation", &block.fixed_location);
                xml.write_attribute("type", block.type_str);
                xml.write_attribute("bbox", bbox);
                write_inline_items(&mut xml, &block.content);
                xml.end_element();
            }
        }
    }

    if let Some(bbox) = &summary.synthetic_address_bbox {
        xml.start_element("textblock");
        xml.write_attribute("fixedLocation", &true);
        xml.write_attribute("type", "address");
        xml.write_attribute("bbox", bbox);
        xml.end_element();
    }

    format!("{XML_DECLARATION}{}", xml.end_document())
}

fn write_inline_items(xml: &mut XmlWriter, items: &[InlineItem]) {
    for item in items {
        match item {
            InlineItem::Break => {
                xml.start_element("br");
                xml.end_element();
            }
            InlineItem::Span(span) => {
                let (family, size, color) = span_attributes(&span.font);
                xml.start_element("span");
                xml.write_attribute("fontFamily", &family);
                xml.write_attribute("size", &size);
                xml.write_attribute("color", &color);
                xml.write_attribute("bbox", &span.bbox.bbox_string());
                xml.write_text(&span.text);
                xml.end_element();
            }
        }
    }
}

/// A span with an unresolved font serializes with empty style attributes.
fn span_attributes(font: &FontDescriptor) -> (String, String, String) {
    match font {
        FontDescriptor::Unknown => (String::new(), String::new(), String::new()),
        FontDescriptor::Known { family, size, color } => {
            (family.clone(), size.to_string(), color.to_triple_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{ImageBlock, TextBlock};
    use crate::geometry::Rect;
    use crate::glyph::FontDescriptor;
    use crate::line::Column;

    fn sample_doc() -> DocumentAnalysis {
        DocumentAnalysis {
            docid: "invoice_001".into(),
            page_width: 595.0,
            page_height: 842.0,
            blocks: vec![TextBlock {
                bbox: Rect::new(10.0, 800.0, 60.0, 810.0),
                lines: vec![Column {
                    bbox: Rect::new(10.0, 800.0, 60.0, 810.0),
                    text: "Facture <n°1>".into(),
                    fonts: vec![FontDescriptor::Unknown; 13],
                }],
            }],
            images: vec![ImageBlock {
                bbox: Rect::new(400.0, 700.0, 500.0, 780.0),
                width: 200,
                height: 160,
                hash: "deadbeef".into(),
            }],
        }
    }

    #[test]
    fn document_xml_nests_blocks_and_images() {
        let xml = document_xml(&sample_doc());
        assert!(xml.starts_with(XML_DECLARATION));
        assert!(xml.contains("<textblock bbox=\"10,800,60,810\">"));
        assert!(xml.contains("<textline bbox=\"10,800,60,810\">"));
        assert!(xml.contains("width=\"200\""));
        assert!(xml.contains("height=\"160\""));
    }

    #[test]
    fn text_content_is_escaped() {
        let xml = document_xml(&sample_doc());
        assert!(xml.contains("Facture &lt;"));
        assert!(!xml.contains("<n°1>"));
    }
}
