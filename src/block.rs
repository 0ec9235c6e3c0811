//! Grouping of reconstructed lines into text blocks.
//!
//! Two passes. Pass Y walks the column units top-down and closes a
//! provisional block whenever the vertical gap to the previous unit exceeds
//! `line_gap_ratio` times the unit's height. Pass X then re-sorts each
//! provisional block by `x0` and splits it into sub-blocks separated by a
//! horizontal column gap, so that side-by-side regions sharing baselines
//! (a sender block next to a recipient block, say) come apart.

use crate::document::TextBlock;
use crate::line::{Column, Line};

/// Vertical gap threshold between consecutive lines of one block, as a
/// multiple of the current line's height.
pub const DEFAULT_LINE_GAP_RATIO: f32 = 2.5;

/// Horizontal gap threshold between the column regions of one provisional
/// block, as a multiple of the incoming line's height.
pub const DEFAULT_COLUMN_GAP_RATIO: f32 = 3.0;

/// Splits lines into text blocks. `lines` must be ordered top-down; the
/// grouping unit is the individual column, so one baseline can contribute to
/// several blocks. Returned blocks are ordered by descending `y1`, their
/// lines by descending `y1` then ascending `x0`.
pub fn group_blocks(lines: Vec<Line>, line_gap_ratio: f32, column_gap_ratio: f32) -> Vec<TextBlock> {
    let units: Vec<Column> = lines.into_iter().flat_map(|l| l.columns).collect();
    if units.is_empty() {
        return Vec::new();
    }

    // Pass Y: provisional split on vertical gaps.
    let mut groups: Vec<Vec<Column>> = Vec::new();
    let mut current: Vec<Column> = Vec::new();
    let mut last_y0 = units[0].bbox.y0;
    for unit in units {
        if (last_y0 - unit.bbox.y0) > line_gap_ratio * unit.height() && !current.is_empty() {
            groups.push(std::mem::take(&mut current));
        }
        last_y0 = unit.bbox.y0;
        current.push(unit);
    }
    if !current.is_empty() {
        groups.push(current);
    }

    // Pass X: split each provisional group into column sub-blocks.
    let mut blocks: Vec<TextBlock> = Vec::new();
    for mut group in groups {
        group.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));

        let mut subs: Vec<TextBlock> = Vec::new();
        for unit in group {
            let target = subs.iter().position(|sub| {
                unit.bbox.x_overlaps(&sub.bbox) || !sub.bbox.column_gap(&unit.bbox, column_gap_ratio)
            });
            match target {
                Some(i) => {
                    subs[i].bbox = subs[i].bbox.union(&unit.bbox);
                    subs[i].lines.push(unit);
                }
                None => subs.push(TextBlock { bbox: unit.bbox, lines: vec![unit] }),
            }
        }
        blocks.extend(subs);
    }

    for block in blocks.iter_mut() {
        block
            .lines
            .sort_by(|a, b| b.bbox.y1.total_cmp(&a.bbox.y1).then(a.bbox.x0.total_cmp(&b.bbox.x0)));
    }
    blocks.sort_by(|a, b| b.bbox.y1.total_cmp(&a.bbox.y1));
    blocks
}
