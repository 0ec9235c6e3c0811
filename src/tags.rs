//! Semantic classification of text blocks.
//!
//! Three independent recognizers over the raw block text. A block may carry
//! several tags at once; where the universal-block report must commit to a
//! single type, [`BlockTag::priority`] ranks them `page > date > address`.

use smallvec::SmallVec;

use crate::address::{ends_with_postal_pattern, PostalDirectory};
use crate::date::find_dates;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlockTag {
    /// Pagination marker ("Page 1 / 2").
    Page,
    /// Contains at least one normalizable French date.
    Date,
    /// Ends in a known code-postal + city pair.
    Address,
}

impl BlockTag {
    /// Export label for this tag.
    pub fn type_str(self) -> &'static str {
        match self {
            BlockTag::Page => "page",
            BlockTag::Date => "date",
            BlockTag::Address => "address",
        }
    }

    /// Lower ranks win when the exporter must pick one type.
    pub fn priority(self) -> u8 {
        match self {
            BlockTag::Page => 0,
            BlockTag::Date => 1,
            BlockTag::Address => 2,
        }
    }
}

/// Runs the three classifiers over a block's text.
pub fn classify_block(text: &str, directory: &PostalDirectory) -> SmallVec<[BlockTag; 2]> {
    let mut tags = SmallVec::new();
    let words = text.split_whitespace().count();
    let lowered = text.to_lowercase();

    if 1 < words && words < 5 && lowered.contains("page") {
        tags.push(BlockTag::Page);
    }
    if 3 < words && words < 10 && find_dates(&lowered).iter().any(|d| d.normalized.is_some()) {
        tags.push(BlockTag::Date);
    }
    if ends_with_postal_pattern(text, directory) {
        tags.push(BlockTag::Address);
    }
    tags
}
