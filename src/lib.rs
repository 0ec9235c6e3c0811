//! # pdfstencil
//!
//! pdfstencil analyzes a corpus of PDF documents cut from the same template
//! (invoices, statements) and reconstructs, per document, the logical page
//! structure (text blocks, lines and inline style runs) from the loose
//! character glyphs a PDF actually contains. Across the corpus it then
//! identifies *universal* blocks: content that appears in every document,
//! optionally at a fixed location, tagged as pagination marker, date or
//! postal address where recognizable.
//!
//! The pipeline, per document:
//!
//! 1. [`decode`] materializes the first page as positioned glyphs and image
//!    placements.
//! 2. [`line`] groups glyphs sharing a baseline into columns, [`script`]
//!    folds super/subscript stubs back into their line.
//! 3. [`block`] splits the lines into blocks on vertical and horizontal
//!    gaps, [`style`] run-length encodes each line's fonts into spans.
//! 4. [`corpus`] indexes every block by content hash and classifies hashes
//!    as universal, repeated or unique; [`export`] serializes the results.
//!
//! ```no_run
//! use pdfstencil::{analyze_corpus, AnalyzeOptions};
//! use std::path::Path;
//!
//! let summary = analyze_corpus(
//!     Path::new("invoices/"),
//!     Path::new("out/"),
//!     &AnalyzeOptions::default(),
//! )?;
//! println!("{} universal blocks", summary.universal_blocks);
//! # Ok::<(), pdfstencil::Error>(())
//! ```

pub mod address;
pub mod analyze;
pub mod block;
pub mod corpus;
pub mod date;
pub mod decode;
pub mod document;
pub mod error;
pub mod export;
pub mod geometry;
pub mod glyph;
pub mod hash;
pub mod line;
pub mod script;
pub mod store;
pub mod style;
pub mod tags;

pub use crate::address::{CityEntry, PostalDirectory};
pub use crate::analyze::{analyze_corpus, reconstruct_page, AnalyzeOptions, RunSummary};
pub use crate::corpus::{CorpusIndex, CorpusSummary, UniversalBlock, UniversalKind};
pub use crate::decode::{Color, DecodeError, DecodedPage, LopdfDecoder, PageDecoder, RawGlyph, RawImage};
pub use crate::document::{DocumentAnalysis, ImageBlock, TextBlock};
pub use crate::error::Error;
pub use crate::geometry::Rect;
pub use crate::glyph::{FontDescriptor, Glyph, Rgb};
pub use crate::line::{Column, Line};
pub use crate::style::{InlineItem, Span};
pub use crate::tags::BlockTag;
