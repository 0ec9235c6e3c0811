//! Run-length encoding of per-character font descriptors into inline spans.

use smallvec::SmallVec;

use crate::document::TextBlock;
use crate::geometry::Rect;
use crate::glyph::FontDescriptor;
use crate::line::Column;

/// One styled run within a line. The bbox is the parent line's bbox.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub bbox: Rect,
    pub font: FontDescriptor,
    pub text: String,
}

/// A span or an explicit line break, in reading order.
#[derive(Debug, Clone, PartialEq)]
pub enum InlineItem {
    Span(Span),
    Break,
}

/// Encodes one line into maximal spans of equal font descriptor. Most lines
/// carry a single style, hence the small inline capacity.
pub fn encode_line(line: &Column) -> SmallVec<[Span; 4]> {
    let mut spans: SmallVec<[Span; 4]> = SmallVec::new();
    let chars: Vec<char> = line.text.chars().collect();
    debug_assert_eq!(chars.len(), line.fonts.len());

    let mut start = 0;
    while start < chars.len() {
        let font = &line.fonts[start];
        let mut end = start + 1;
        while end < chars.len() && line.fonts[end] == *font {
            end += 1;
        }
        spans.push(Span {
            bbox: line.bbox,
            font: font.clone(),
            text: chars[start..end].iter().collect(),
        });
        start = end;
    }
    spans
}

/// Encodes a whole block: the spans of each line followed by a line break.
pub fn encode_block(block: &TextBlock) -> Vec<InlineItem> {
    let mut items = Vec::new();
    for line in &block.lines {
        items.extend(encode_line(line).into_iter().map(InlineItem::Span));
        items.push(InlineItem::Break);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::Rgb;

    fn font(family: &str) -> FontDescriptor {
        FontDescriptor::Known { family: family.into(), size: 10, color: Rgb::BLACK }
    }

    #[test]
    fn runs_split_on_font_change() {
        let line = Column {
            bbox: Rect::new(0.0, 0.0, 50.0, 10.0),
            text: "Total 12".into(),
            fonts: [
                vec![font("Bold"); 5],
                vec![font("Regular"); 3],
            ]
            .concat(),
        };
        let spans = encode_line(&line);
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Total");
        assert_eq!(spans[1].text, " 12");
        assert!(spans.iter().all(|s| s.bbox == line.bbox));
    }

    #[test]
    fn single_style_line_is_one_span() {
        let line = Column {
            bbox: Rect::new(0.0, 0.0, 10.0, 10.0),
            text: "abc".into(),
            fonts: vec![FontDescriptor::Unknown; 3],
        };
        assert_eq!(encode_line(&line).len(), 1);
    }

    #[test]
    fn every_line_ends_with_a_break() {
        let block = TextBlock {
            bbox: Rect::new(0.0, 0.0, 10.0, 20.0),
            lines: vec![
                Column {
                    bbox: Rect::new(0.0, 10.0, 10.0, 20.0),
                    text: "a".into(),
                    fonts: vec![FontDescriptor::Unknown],
                },
                Column {
                    bbox: Rect::new(0.0, 0.0, 10.0, 10.0),
                    text: "b".into(),
                    fonts: vec![FontDescriptor::Unknown],
                },
            ],
        };
        let items = encode_block(&block);
        assert_eq!(items.len(), 4);
        assert_eq!(items[1], InlineItem::Break);
        assert_eq!(items[3], InlineItem::Break);
    }
}
