//! Per-document analysis results.

use crate::geometry::Rect;
use crate::line::Column;

/// A cluster of lines separated from the rest of the page by vertical and
/// horizontal gaps. Each line of a block is a single column run.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub bbox: Rect,
    pub lines: Vec<Column>,
}

impl TextBlock {
    /// Raw block text: line texts joined by newlines. This is what gets
    /// hashed for corpus identity and what the semantic taggers see.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&line.text);
        }
        out
    }

    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.text.split_whitespace().count()).sum()
    }
}

/// An embedded raster image on the page. The raw byte stream is not retained
/// here; it lives only long enough to be persisted under its hash.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBlock {
    pub bbox: Rect,
    pub width: u32,
    pub height: u32,
    /// SHA-256 of the raw byte stream, lowercase hex. The image's identity.
    pub hash: String,
}

/// The reconstructed first page of one document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAnalysis {
    /// Stable document id: the source file's basename without extension.
    pub docid: String,
    pub page_width: f32,
    pub page_height: f32,
    /// Text blocks, ordered top-down by descending `y1`.
    pub blocks: Vec<TextBlock>,
    pub images: Vec<ImageBlock>,
}
