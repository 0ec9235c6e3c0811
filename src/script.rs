//! Folding of hanging baselines (superscripts and subscripts) into their
//! neighbor line.
//!
//! A PDF renders `x²` as two baselines: the `x` on the text baseline and the
//! `2` slightly above it, on a baseline of its own. This pass absorbs such
//! single-column stub lines into the last column of the adjacent baseline
//! when the geometry is consistent with super- or subscript placement.

use crate::line::BaselineBuilder;

/// Merges super/subscript baselines. `baselines` must be ordered top-down;
/// the returned list keeps that order, minus the absorbed stubs.
///
/// A baseline is a candidate when it carries exactly one column `c` and has a
/// neighbor. Against the last column `n` of the *next lower* baseline, `c` is
/// a superscript iff `n.y0 < c.y0 < n.y1` and `n.x1 - 1 <= c.x0 < n.x1 + 4`;
/// against the *previous upper* baseline the test is symmetric with `c.y1`.
/// The absorbing column keeps its word-gap rule, so a spaced superscript
/// still reads as a separate word.
pub fn merge_hanging_lines(mut baselines: Vec<BaselineBuilder>) -> Vec<BaselineBuilder> {
    let n = baselines.len();
    let mut absorbed = vec![false; n];

    for i in 0..n {
        if baselines[i].columns.len() != 1 {
            continue;
        }
        let cur = baselines[i].columns[0].bbox;

        // Superscript: hangs above the next lower baseline.
        if i + 1 < n {
            let nb = baselines[i + 1].columns.last().expect("baseline has columns").bbox;
            if nb.y0 < cur.y0
                && cur.y0 < nb.y1
                && nb.x1 - 1.0 <= cur.x0
                && cur.x0 < nb.x1 + 4.0
            {
                let stub = baselines[i].columns[0].clone();
                baselines[i + 1]
                    .columns
                    .last_mut()
                    .expect("baseline has columns")
                    .absorb(stub);
                absorbed[i] = true;
                continue;
            }
        }

        // Subscript: hangs below the previous upper baseline.
        if i > 0 {
            let nb = baselines[i - 1].columns.last().expect("baseline has columns").bbox;
            if nb.y0 < cur.y1
                && cur.y1 < nb.y1
                && nb.x1 - 1.0 <= cur.x0
                && cur.x0 < nb.x1 + 4.0
            {
                let stub = baselines[i].columns[0].clone();
                baselines[i - 1]
                    .columns
                    .last_mut()
                    .expect("baseline has columns")
                    .absorb(stub);
                absorbed[i] = true;
            }
        }
    }

    baselines
        .into_iter()
        .zip(absorbed)
        .filter(|(_, was_absorbed)| !*was_absorbed)
        .map(|(b, _)| b)
        .collect()
}
