//! Reconstruction of text lines and intra-line columns from loose glyphs.
//!
//! Glyphs sharing an exact baseline (`y0`) form one line; within a line, a
//! horizontal gap wider than five times the width of the line's first glyph
//! opens a new column. Columns are accreted left to right through
//! [`ColumnBuilder`] and frozen into immutable [`Column`] snapshots once the
//! super/subscript merge pass is done.

use crate::geometry::Rect;
use crate::glyph::{FontDescriptor, Glyph};

/// Gap threshold for opening a new column, as a multiple of the width of the
/// first glyph on the baseline.
const COLUMN_SPLIT_FACTOR: f32 = 5.0;

/// Gap threshold for inserting a word space, as a multiple of the width of
/// the incoming glyph.
const WORD_GAP_FACTOR: f32 = 0.2;

/// A run of glyphs between two intra-line gaps.
///
/// `fonts` carries one descriptor per code point of `text`; the two sequences
/// always have equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub bbox: Rect,
    pub text: String,
    pub fonts: Vec<FontDescriptor>,
}

impl Column {
    pub fn height(&self) -> f32 {
        self.bbox.height()
    }
}

/// Mutable accretion state for one column. Frozen into a [`Column`] once all
/// merge passes are finished, which is what upholds the text/fonts length
/// invariant for downstream consumers.
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    pub bbox: Rect,
    text: String,
    fonts: Vec<FontDescriptor>,
}

impl ColumnBuilder {
    pub fn seeded_with(glyph: &Glyph) -> Self {
        let mut fonts = Vec::new();
        for _ in glyph.text.chars() {
            fonts.push(glyph.font.clone());
        }
        ColumnBuilder { bbox: glyph.bbox, text: glyph.text.clone(), fonts }
    }

    /// Appends a glyph on the right. A gap wider than 0.2 times the glyph's
    /// own width first inserts a single space, styled like the last glyph
    /// already in the column.
    pub fn push(&mut self, glyph: &Glyph) {
        if glyph.bbox.x0 - self.bbox.x1 > WORD_GAP_FACTOR * glyph.bbox.width() {
            let space_font = self.fonts.last().cloned().unwrap_or(FontDescriptor::Unknown);
            self.text.push(' ');
            self.fonts.push(space_font);
        }
        self.text.push_str(&glyph.text);
        for _ in glyph.text.chars() {
            self.fonts.push(glyph.font.clone());
        }
        self.bbox = self.bbox.union(&glyph.bbox);
    }

    /// Merges a whole column on the right, with the same word-gap rule as
    /// [`ColumnBuilder::push`]. Used by the super/subscript pass.
    pub fn absorb(&mut self, other: ColumnBuilder) {
        if other.bbox.x0 - self.bbox.x1 > WORD_GAP_FACTOR * other.bbox.width() {
            let space_font = self.fonts.last().cloned().unwrap_or(FontDescriptor::Unknown);
            self.text.push(' ');
            self.fonts.push(space_font);
        }
        self.text.push_str(&other.text);
        self.fonts.extend(other.fonts);
        self.bbox = self.bbox.union(&other.bbox);
    }

    pub fn freeze(self) -> Column {
        debug_assert_eq!(self.text.chars().count(), self.fonts.len());
        Column { bbox: self.bbox, text: self.text, fonts: self.fonts }
    }
}

/// One baseline under construction: its shared `y0` and its columns in
/// ascending `x0` order.
#[derive(Debug, Clone)]
pub struct BaselineBuilder {
    pub y0: f32,
    /// Width of the first glyph seen on this baseline; the column-split
    /// threshold stays anchored to it even as columns grow.
    first_glyph_width: f32,
    pub columns: Vec<ColumnBuilder>,
}

/// A reconstructed text line: the columns of one baseline, left to right.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub columns: Vec<Column>,
}

/// Groups glyphs into baselines and folds each baseline into columns.
///
/// Glyphs land in the same baseline only when their `y0` coordinates are
/// exactly equal; any difference, however small, separates them. The result
/// is ordered top-down (descending `y0`).
pub fn build_baselines(glyphs: &[Glyph]) -> Vec<BaselineBuilder> {
    let mut sorted: Vec<&Glyph> = glyphs.iter().collect();
    sorted.sort_by(|a, b| {
        b.bbox
            .y0
            .total_cmp(&a.bbox.y0)
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut baselines: Vec<BaselineBuilder> = Vec::new();
    for glyph in sorted {
        let same_baseline = baselines
            .last()
            .map(|b| b.y0 == glyph.bbox.y0)
            .unwrap_or(false);
        if !same_baseline {
            baselines.push(BaselineBuilder {
                y0: glyph.bbox.y0,
                first_glyph_width: glyph.bbox.width(),
                columns: vec![ColumnBuilder::seeded_with(glyph)],
            });
            continue;
        }
        let line = baselines.last_mut().unwrap();
        let first_width = line.first_glyph_width;
        let last = line.columns.last_mut().unwrap();
        if glyph.bbox.x0 - last.bbox.x1 > COLUMN_SPLIT_FACTOR * first_width {
            line.columns.push(ColumnBuilder::seeded_with(glyph));
        } else {
            last.push(glyph);
        }
    }
    baselines
}

/// Freezes merged baselines into immutable lines, preserving order.
pub fn freeze_lines(baselines: Vec<BaselineBuilder>) -> Vec<Line> {
    baselines
        .into_iter()
        .map(|b| Line {
            columns: b.columns.into_iter().map(ColumnBuilder::freeze).collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::Glyph;

    fn glyph(text: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> Glyph {
        Glyph {
            bbox: Rect::new(x0, y0, x1, y1),
            text: text.to_string(),
            font: FontDescriptor::Unknown,
        }
    }

    #[test]
    fn wide_gap_opens_a_new_column() {
        // first glyph width 8 => split threshold 40
        let glyphs = vec![
            glyph("A", 0.0, 100.0, 8.0, 110.0),
            glyph("B", 8.0, 100.0, 16.0, 110.0),
            glyph("C", 60.0, 100.0, 68.0, 110.0),
        ];
        let lines = freeze_lines(build_baselines(&glyphs));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].columns.len(), 2);
        assert_eq!(lines[0].columns[0].text, "AB");
        assert_eq!(lines[0].columns[1].text, "C");
    }

    #[test]
    fn nearby_baselines_stay_separate() {
        let glyphs = vec![
            glyph("A", 0.0, 100.0, 8.0, 110.0),
            glyph("B", 8.0, 100.01, 16.0, 110.0),
        ];
        let lines = freeze_lines(build_baselines(&glyphs));
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn word_gap_inserts_one_space() {
        let glyphs = vec![
            glyph("A", 0.0, 100.0, 8.0, 110.0),
            glyph("B", 12.0, 100.0, 20.0, 110.0),
        ];
        let lines = freeze_lines(build_baselines(&glyphs));
        let col = &lines[0].columns[0];
        assert_eq!(col.text, "A B");
        assert_eq!(col.fonts.len(), 3);
        assert_eq!(col.bbox, Rect::new(0.0, 100.0, 20.0, 110.0));
    }

    #[test]
    fn multi_char_cluster_repeats_the_font() {
        let f = FontDescriptor::from_raw(Some("F1"), Some(10.0), None);
        let mut g = glyph("ffi", 0.0, 0.0, 10.0, 10.0);
        g.font = f.clone();
        let lines = freeze_lines(build_baselines(&[g]));
        let col = &lines[0].columns[0];
        assert_eq!(col.text.chars().count(), col.fonts.len());
        assert!(col.fonts.iter().all(|d| *d == f));
    }
}
