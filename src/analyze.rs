//! The corpus driver: decode every document, reconstruct its first page,
//! persist image artifacts, export the per-document XML and finally the
//! universal-block report.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use walkdir::WalkDir;

use crate::address::PostalDirectory;
use crate::block::{group_blocks, DEFAULT_COLUMN_GAP_RATIO, DEFAULT_LINE_GAP_RATIO};
use crate::corpus::{CorpusIndex, CorpusSummary};
use crate::decode::{DecodedPage, LopdfDecoder, PageDecoder};
use crate::document::{DocumentAnalysis, ImageBlock};
use crate::error::Error;
use crate::export;
use crate::glyph::Glyph;
use crate::hash::bytes_hash;
use crate::line::{build_baselines, freeze_lines};
use crate::script::merge_hanging_lines;
use crate::store::ImageStore;

/// Tunable thresholds and inputs of a corpus run.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzeOptions {
    pub line_gap_ratio: f32,
    pub column_gap_ratio: f32,
    /// JSON code-postal dictionary replacing the built-in subset.
    pub postal_dictionary: Option<PathBuf>,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        AnalyzeOptions {
            line_gap_ratio: DEFAULT_LINE_GAP_RATIO,
            column_gap_ratio: DEFAULT_COLUMN_GAP_RATIO,
            postal_dictionary: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub analyzed: usize,
    pub skipped: usize,
    pub universal_blocks: usize,
}

/// Runs the whole layout pipeline over one decoded page. A page with zero
/// glyphs yields an empty block list, not an error.
pub fn reconstruct_page(
    docid: &str,
    page: &DecodedPage,
    options: &AnalyzeOptions,
) -> DocumentAnalysis {
    let glyphs: Vec<Glyph> = page.glyphs.iter().filter_map(Glyph::from_raw).collect();
    let baselines = merge_hanging_lines(build_baselines(&glyphs));
    let lines = freeze_lines(baselines);
    let blocks = group_blocks(lines, options.line_gap_ratio, options.column_gap_ratio);
    let images = page
        .images
        .iter()
        .map(|raw| ImageBlock {
            bbox: raw.bbox,
            width: raw.width,
            height: raw.height,
            hash: bytes_hash(&raw.bytes),
        })
        .collect();

    DocumentAnalysis {
        docid: docid.to_string(),
        page_width: page.page_bbox.x1,
        page_height: page.page_bbox.y1,
        blocks,
        images,
    }
}

/// Analyzes every `*.pdf` in `input_dir` and writes, into `output_dir`, one
/// `<docid>.blocks.xml` per document, one deduplicated artifact per distinct
/// image, and the corpus report `struct.xml`.
///
/// Documents the decoder refuses or cannot parse are skipped with a warning;
/// I/O failures and an unreadable postal dictionary abort the run.
pub fn analyze_corpus(
    input_dir: &Path,
    output_dir: &Path,
    options: &AnalyzeOptions,
) -> Result<RunSummary, Error> {
    let directory = match &options.postal_dictionary {
        Some(path) => PostalDirectory::from_json_file(path)?,
        None => PostalDirectory::builtin().clone(),
    };

    // surface a missing input directory as an I/O error up front
    fs::metadata(input_dir)?;
    fs::create_dir_all(output_dir)?;

    let store = ImageStore::new(output_dir);
    let decoder = LopdfDecoder;
    let mut index = CorpusIndex::new();
    let mut summary = RunSummary::default();

    for path in pdf_paths(input_dir) {
        let docid = match path.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => continue,
        };
        debug!("analyzing {docid}");

        let bytes = fs::read(&path)?;
        let page = match decoder.decode_first_page(&bytes) {
            Ok(page) => page,
            Err(err) => {
                warn!("skipping {}: {err}", path.display());
                summary.skipped += 1;
                continue;
            }
        };

        let doc = reconstruct_page(&docid, &page, options);
        for (raw, image) in page.images.iter().zip(&doc.images) {
            store.put_if_absent(&image.hash, &raw.bytes)?;
        }
        fs::write(
            output_dir.join(format!("{docid}.blocks.xml")),
            export::document_xml(&doc),
        )?;
        index.add_document(&doc, &directory);
        summary.analyzed += 1;
    }

    let classification: CorpusSummary = index.classify();
    summary.universal_blocks = classification.universal.len();
    fs::write(output_dir.join("struct.xml"), export::universal_xml(&classification))?;

    info!(
        "analyzed {} documents ({} skipped), {} universal blocks",
        summary.analyzed, summary.skipped, summary.universal_blocks
    );
    Ok(summary)
}

/// The `*.pdf` files directly inside `dir`, in stable name order.
fn pdf_paths(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    paths.sort();
    paths
}
