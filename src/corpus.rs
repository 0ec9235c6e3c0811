//! Corpus-wide block identity: inverse indices, equivalence classes and
//! positional stability.
//!
//! Documents can be indexed in any order (or sharded and merged); the
//! classification only depends on the final index contents. Text and image
//! hashes live in disjoint domains, utf-8 text on one side and raw bytes on
//! the other.

use std::collections::{BTreeMap, BTreeSet};

use crate::address::PostalDirectory;
use crate::document::DocumentAnalysis;
use crate::geometry::Rect;
use crate::hash::text_hash;
use crate::style::{encode_block, InlineItem};
use crate::tags::{classify_block, BlockTag};

/// Mean per-axis deviation below which a universal block counts as sitting
/// at a fixed location, in layout units.
const FIXED_LOCATION_TOLERANCE: f32 = 5.0;

/// Share of the corpus that must carry an address block in one coarse
/// position bucket before a synthetic universal address block is emitted.
const ADDRESS_BUCKET_QUORUM: f32 = 0.75;

type InverseIndex = BTreeMap<String, BTreeMap<String, Vec<String>>>;

#[derive(Debug, Default, Clone)]
pub struct CorpusIndex {
    /// text hash -> docid -> bbox strings, in insertion order per document.
    text_index: InverseIndex,
    /// image hash -> docid -> bbox strings.
    image_index: InverseIndex,
    /// coarse `(x0, y1)` bucket -> text hashes seen there.
    position_bucket: BTreeMap<(i64, i64), BTreeSet<String>>,
    with_page: BTreeSet<String>,
    with_date: BTreeSet<String>,
    with_address: BTreeSet<String>,
    /// First-seen span encoding per text hash, for the universal report.
    first_content: BTreeMap<String, Vec<InlineItem>>,
    documents: BTreeSet<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UniversalKind {
    Text,
    Image,
}

/// One hash that occurs in every document of the corpus.
#[derive(Debug, Clone, PartialEq)]
pub struct UniversalBlock {
    pub hash: String,
    pub kind: UniversalKind,
    /// Whether the occurrence positions are stable across documents.
    pub fixed_location: bool,
    /// First observed bbox string; the report leaves the bbox empty when the
    /// location is not fixed.
    pub bbox: String,
    /// `page`, `date`, `address`, `img` or `unk`.
    pub type_str: &'static str,
    /// Span encoding of the block (empty for images).
    pub content: Vec<InlineItem>,
}

/// The corpus-level classification of every indexed hash.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CorpusSummary {
    pub document_count: usize,
    pub universal: Vec<UniversalBlock>,
    /// Hashes present in at least two documents but not all.
    pub repeated: BTreeSet<String>,
    /// Hashes present in exactly one document.
    pub unique: BTreeSet<String>,
    /// Bbox of the synthetic universal address block, when one location on
    /// the page carries an address in enough documents.
    pub synthetic_address_bbox: Option<String>,
}

impl CorpusIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Indexes one analyzed document: every text block lands in the text
    /// index, the position buckets and the tag sets; every image block in
    /// the image index.
    pub fn add_document(&mut self, doc: &DocumentAnalysis, directory: &PostalDirectory) {
        self.documents.insert(doc.docid.clone());

        for block in &doc.blocks {
            let text = block.text();
            let hash = text_hash(&text);
            let bbox = block.bbox.bbox_string();

            self.text_index
                .entry(hash.clone())
                .or_default()
                .entry(doc.docid.clone())
                .or_default()
                .push(bbox);
            self.position_bucket
                .entry(block.bbox.position_key())
                .or_default()
                .insert(hash.clone());
            self.first_content
                .entry(hash.clone())
                .or_insert_with(|| encode_block(block));

            for tag in classify_block(&text, directory) {
                match tag {
                    BlockTag::Page => self.with_page.insert(hash.clone()),
                    BlockTag::Date => self.with_date.insert(hash.clone()),
                    BlockTag::Address => self.with_address.insert(hash.clone()),
                };
            }
        }

        for image in &doc.images {
            self.image_index
                .entry(image.hash.clone())
                .or_default()
                .entry(doc.docid.clone())
                .or_default()
                .push(image.bbox.bbox_string());
        }
    }

    /// Folds another index into this one. Merging is associative and
    /// commutative up to the first-seen span content, so shards can be
    /// combined in any order.
    pub fn merge(&mut self, other: CorpusIndex) {
        for (hash, docs) in other.text_index {
            let entry = self.text_index.entry(hash).or_default();
            for (docid, bboxes) in docs {
                entry.entry(docid).or_default().extend(bboxes);
            }
        }
        for (hash, docs) in other.image_index {
            let entry = self.image_index.entry(hash).or_default();
            for (docid, bboxes) in docs {
                entry.entry(docid).or_default().extend(bboxes);
            }
        }
        for (key, hashes) in other.position_bucket {
            self.position_bucket.entry(key).or_default().extend(hashes);
        }
        self.with_page.extend(other.with_page);
        self.with_date.extend(other.with_date);
        self.with_address.extend(other.with_address);
        for (hash, content) in other.first_content {
            self.first_content.entry(hash).or_insert(content);
        }
        self.documents.extend(other.documents);
    }

    /// Classifies every hash as universal, repeated or unique and derives
    /// the universal-block report.
    pub fn classify(&self) -> CorpusSummary {
        let n = self.documents.len();
        let mut summary = CorpusSummary { document_count: n, ..Default::default() };
        if n == 0 {
            return summary;
        }

        for (hash, docs) in &self.text_index {
            if docs.len() == n {
                summary.universal.push(self.universal_text_block(hash, docs));
            } else if docs.len() > 1 {
                summary.repeated.insert(hash.clone());
            } else {
                summary.unique.insert(hash.clone());
            }
        }
        for (hash, docs) in &self.image_index {
            if docs.len() == n {
                summary.universal.push(UniversalBlock {
                    hash: hash.clone(),
                    kind: UniversalKind::Image,
                    fixed_location: stable_position(docs),
                    bbox: first_bbox(docs),
                    type_str: "img",
                    content: Vec::new(),
                });
            } else if docs.len() > 1 {
                summary.repeated.insert(hash.clone());
            } else {
                summary.unique.insert(hash.clone());
            }
        }

        summary.synthetic_address_bbox = self.address_quorum_bbox(n);
        summary
    }

    fn universal_text_block(
        &self,
        hash: &str,
        docs: &BTreeMap<String, Vec<String>>,
    ) -> UniversalBlock {
        let type_str = [
            (BlockTag::Page, &self.with_page),
            (BlockTag::Date, &self.with_date),
            (BlockTag::Address, &self.with_address),
        ]
        .into_iter()
        .find(|(_, set)| set.contains(hash))
        .map(|(tag, _)| tag.type_str())
        .unwrap_or("unk");

        UniversalBlock {
            hash: hash.to_string(),
            kind: UniversalKind::Text,
            fixed_location: stable_position(docs),
            bbox: first_bbox(docs),
            type_str,
            content: self.first_content.get(hash).cloned().unwrap_or_default(),
        }
    }

    /// Looks for a coarse location where address-tagged blocks pile up in
    /// more than [`ADDRESS_BUCKET_QUORUM`] of the documents.
    fn address_quorum_bbox(&self, n: usize) -> Option<String> {
        for hash in &self.with_address {
            let Some(docs) = self.text_index.get(hash) else { continue };
            let bbox = first_bbox(docs);
            let Some(key) = Rect::from_bbox_string(&bbox).map(|r| r.position_key()) else {
                continue;
            };
            let Some(bucket) = self.position_bucket.get(&key) else { continue };
            let colocated = bucket.intersection(&self.with_address).count();
            if colocated as f32 > ADDRESS_BUCKET_QUORUM * n as f32 {
                return Some(bbox);
            }
        }
        None
    }
}

/// First bbox of the first document, the report's canonical position.
fn first_bbox(docs: &BTreeMap<String, Vec<String>>) -> String {
    docs.values()
        .next()
        .and_then(|bboxes| bboxes.first())
        .cloned()
        .unwrap_or_default()
}

/// Whether the first occurrence per document stays put: the mean of the four
/// per-axis standard deviations is below the tolerance.
fn stable_position(docs: &BTreeMap<String, Vec<String>>) -> bool {
    let boxes: Vec<Rect> = docs
        .values()
        .filter_map(|bboxes| bboxes.first())
        .filter_map(|s| Rect::from_bbox_string(s))
        .collect();
    if boxes.is_empty() {
        return false;
    }
    let axes = [
        boxes.iter().map(|r| r.x0).collect::<Vec<_>>(),
        boxes.iter().map(|r| r.y0).collect::<Vec<_>>(),
        boxes.iter().map(|r| r.x1).collect::<Vec<_>>(),
        boxes.iter().map(|r| r.y1).collect::<Vec<_>>(),
    ];
    let mean_deviation: f32 =
        axes.iter().map(|axis| std_deviation(axis)).sum::<f32>() / axes.len() as f32;
    mean_deviation < FIXED_LOCATION_TOLERANCE
}

/// Population standard deviation.
fn std_deviation(values: &[f32]) -> f32 {
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deviation_of_constant_values_is_zero() {
        assert_eq!(std_deviation(&[4.0, 4.0, 4.0]), 0.0);
    }

    #[test]
    fn near_identical_positions_are_stable() {
        let mut docs = BTreeMap::new();
        docs.insert("a".to_string(), vec!["10,800,60,810".to_string()]);
        docs.insert("b".to_string(), vec!["10,801,60,811".to_string()]);
        docs.insert("c".to_string(), vec!["11,800,61,810".to_string()]);
        assert!(stable_position(&docs));
    }

    #[test]
    fn scattered_positions_are_not_stable() {
        let mut docs = BTreeMap::new();
        docs.insert("a".to_string(), vec!["10,800,60,810".to_string()]);
        docs.insert("b".to_string(), vec!["300,100,350,110".to_string()]);
        assert!(!stable_position(&docs));
    }

    #[test]
    fn duplicate_occurrences_take_the_first_bbox() {
        let mut docs = BTreeMap::new();
        docs.insert(
            "a".to_string(),
            vec!["10,800,60,810".to_string(), "400,50,450,60".to_string()],
        );
        docs.insert("b".to_string(), vec!["10,800,60,810".to_string()]);
        assert!(stable_position(&docs));
    }
}
