//! The decoder boundary: what the layout pipeline expects from a PDF
//! backend, plus a best-effort `lopdf` implementation.
//!
//! The pipeline itself only consumes [`DecodedPage`] values; any backend that
//! can produce positioned glyphs and raster placements plugs in through
//! [`PageDecoder`]. The built-in [`LopdfDecoder`] walks the first page's
//! content stream and approximates glyph boxes from the font's `Widths`
//! array. It handles simple (8-bit) fonts and untangled text matrices, which
//! covers the invoice/statement template families this tool targets.

use std::fmt;

use lopdf::{Dictionary as LopdfDictionary, Document as LopdfDocument, Object};

use crate::geometry::Rect;

/// A decoder fill color, components in `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Color {
    Gray(f32),
    Rgb(f32, f32, f32),
}

/// One positioned character (or short cluster) as delivered by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RawGlyph {
    pub bbox: Rect,
    pub text: String,
    pub font_name: Option<String>,
    pub font_size: Option<f32>,
    pub color: Option<Color>,
}

/// One embedded raster image placement.
#[derive(Debug, Clone, PartialEq)]
pub struct RawImage {
    pub bbox: Rect,
    /// Pixel dimensions of the underlying image resource.
    pub width: u32,
    pub height: u32,
    /// The resource's raw byte stream. Hashed for identity and persisted
    /// once per distinct content.
    pub bytes: Vec<u8>,
}

/// The first page of a document, fully materialized.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPage {
    pub page_bbox: Rect,
    pub glyphs: Vec<RawGlyph>,
    pub images: Vec<RawImage>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// The document prohibits text extraction.
    Refused,
    /// The document could not be parsed.
    Malformed(String),
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeError::Refused => write!(f, "document prohibits text extraction"),
            DecodeError::Malformed(msg) => write!(f, "malformed document: {msg}"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// A PDF backend able to materialize the first page of a document.
pub trait PageDecoder {
    fn decode_first_page(&self, bytes: &[u8]) -> Result<DecodedPage, DecodeError>;
}

/// Content-stream walking decoder built on `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfDecoder;

/// Per-font metrics needed to advance the text cursor.
struct FontMetrics {
    base_name: String,
    first_char: i64,
    widths: Vec<f32>,
}

impl FontMetrics {
    /// Glyph width in text space units (already divided by 1000). Falls back
    /// to half an em when the font carries no usable `Widths`.
    fn width(&self, code: u8) -> f32 {
        let index = code as i64 - self.first_char;
        if index >= 0 {
            if let Some(w) = self.widths.get(index as usize) {
                if *w > 0.0 {
                    return w / 1000.0;
                }
            }
        }
        0.5
    }
}

/// A 2D affine matrix `[a b c d e f]`, PDF column convention.
type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

fn transform(m: &Matrix, x: f32, y: f32) -> (f32, f32) {
    (m[0] * x + m[2] * y + m[4], m[1] * x + m[3] * y + m[5])
}

struct ContentState {
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    leading: f32,
    font: Option<String>,
    font_size: f32,
    fill_color: Option<Color>,
}

impl Default for ContentState {
    fn default() -> Self {
        ContentState {
            ctm: IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            leading: 0.0,
            font: None,
            font_size: 0.0,
            fill_color: None,
        }
    }
}

impl PageDecoder for LopdfDecoder {
    fn decode_first_page(&self, bytes: &[u8]) -> Result<DecodedPage, DecodeError> {
        let doc = LopdfDocument::load_mem(bytes)
            .map_err(|e| DecodeError::Malformed(format!("failed to load PDF: {e}")))?;
        if doc.is_encrypted() {
            return Err(DecodeError::Refused);
        }

        let (_, page_id) = doc
            .get_pages()
            .into_iter()
            .next()
            .ok_or_else(|| DecodeError::Malformed("document has no pages".to_string()))?;
        let page = doc
            .get_object(page_id)
            .and_then(|o| o.as_dict())
            .map_err(|e| DecodeError::Malformed(format!("page object is not a dictionary: {e}")))?;

        let page_bbox = media_box(page, &doc)
            .unwrap_or(Rect::new(0.0, 0.0, 612.0, 792.0));

        let resources = resolve_dict(page.get(b"Resources").ok(), &doc);
        let fonts = font_metrics(resources.as_ref(), &doc);
        let rasters = raster_resources(resources.as_ref(), &doc);

        let content_data = page_content(page, &doc)?;
        let content = lopdf::content::Content::decode(&content_data)
            .map_err(|e| DecodeError::Malformed(format!("failed to decode content stream: {e}")))?;

        let mut state = ContentState::default();
        let mut glyphs = Vec::new();
        let mut images = Vec::new();

        for op in &content.operations {
            match op.operator.as_str() {
                "q" => state.ctm_stack.push(state.ctm),
                "Q" => {
                    state.ctm = state.ctm_stack.pop().unwrap_or(IDENTITY);
                }
                "cm" if op.operands.len() == 6 => {
                    let m = operand_matrix(&op.operands);
                    state.ctm = multiply(&m, &state.ctm);
                }
                "BT" => {
                    state.text_matrix = IDENTITY;
                    state.line_matrix = IDENTITY;
                }
                "ET" => {}
                "Tf" if op.operands.len() == 2 => {
                    state.font = as_name(&op.operands[0]);
                    state.font_size = to_f32(&op.operands[1]);
                }
                "TL" if op.operands.len() == 1 => {
                    state.leading = to_f32(&op.operands[0]);
                }
                "Td" if op.operands.len() == 2 => {
                    move_text_cursor(&mut state, to_f32(&op.operands[0]), to_f32(&op.operands[1]));
                }
                "TD" if op.operands.len() == 2 => {
                    state.leading = -to_f32(&op.operands[1]);
                    move_text_cursor(&mut state, to_f32(&op.operands[0]), to_f32(&op.operands[1]));
                }
                "Tm" if op.operands.len() == 6 => {
                    let m = operand_matrix(&op.operands);
                    state.text_matrix = m;
                    state.line_matrix = m;
                }
                "T*" => {
                    let leading = state.leading;
                    move_text_cursor(&mut state, 0.0, -leading);
                }
                "Tj" => {
                    if let Some(Object::String(text, _)) = op.operands.first() {
                        show_text(text, &mut state, &fonts, &mut glyphs);
                    }
                }
                "'" => {
                    let leading = state.leading;
                    move_text_cursor(&mut state, 0.0, -leading);
                    if let Some(Object::String(text, _)) = op.operands.first() {
                        show_text(text, &mut state, &fonts, &mut glyphs);
                    }
                }
                "\"" => {
                    let leading = state.leading;
                    move_text_cursor(&mut state, 0.0, -leading);
                    if let Some(Object::String(text, _)) = op.operands.get(2) {
                        show_text(text, &mut state, &fonts, &mut glyphs);
                    }
                }
                "TJ" => {
                    if let Some(Object::Array(parts)) = op.operands.first() {
                        for part in parts {
                            match part {
                                Object::String(text, _) => {
                                    show_text(text, &mut state, &fonts, &mut glyphs)
                                }
                                Object::Integer(_) | Object::Real(_) => {
                                    // kerning adjustment, thousandths of an em
                                    let shift = -to_f32(part) / 1000.0 * state.font_size;
                                    advance_text(&mut state, shift);
                                }
                                _ => {}
                            }
                        }
                    }
                }
                "rg" if op.operands.len() == 3 => {
                    state.fill_color = Some(Color::Rgb(
                        to_f32(&op.operands[0]),
                        to_f32(&op.operands[1]),
                        to_f32(&op.operands[2]),
                    ));
                }
                "g" if op.operands.len() == 1 => {
                    state.fill_color = Some(Color::Gray(to_f32(&op.operands[0])));
                }
                "Do" => {
                    if let Some(name) = op.operands.first().and_then(as_name) {
                        if let Some((w, h, bytes)) = rasters.get(&name) {
                            images.push(RawImage {
                                bbox: placement_bbox(&state.ctm),
                                width: *w,
                                height: *h,
                                bytes: bytes.clone(),
                            });
                        }
                    }
                }
                _ => {}
            }
        }

        Ok(DecodedPage { page_bbox, glyphs, images })
    }
}

/// `Td`/`TD`/`T*`: translate the line matrix, reset the text matrix to it.
fn move_text_cursor(state: &mut ContentState, tx: f32, ty: f32) {
    let translate = [1.0, 0.0, 0.0, 1.0, tx, ty];
    state.line_matrix = multiply(&translate, &state.line_matrix);
    state.text_matrix = state.line_matrix;
}

/// Advances the text cursor by `dx` text-space units.
fn advance_text(state: &mut ContentState, dx: f32) {
    state.text_matrix[4] += dx * state.text_matrix[0];
    state.text_matrix[5] += dx * state.text_matrix[1];
}

/// Emits one glyph per shown byte. Bytes are read as Latin-1, which is
/// faithful for the standard simple-font encodings this decoder supports;
/// whitespace advances the cursor without emitting a glyph, the layout pass
/// re-synthesizes word gaps geometrically.
fn show_text(
    bytes: &[u8],
    state: &mut ContentState,
    fonts: &std::collections::HashMap<String, FontMetrics>,
    glyphs: &mut Vec<RawGlyph>,
) {
    let metrics = state.font.as_ref().and_then(|f| fonts.get(f));
    let scale_x = state.text_matrix[0] * state.ctm[0];
    let scale_y = state.text_matrix[3] * state.ctm[3];
    let size = state.font_size;

    for &code in bytes {
        let width = metrics.map(|m| m.width(code)).unwrap_or(0.5) * size;
        let ch = code as char;
        if !ch.is_whitespace() {
            let (x0, y0) = transform(&state.ctm, state.text_matrix[4], state.text_matrix[5]);
            glyphs.push(RawGlyph {
                bbox: Rect::new(x0, y0, x0 + width * scale_x, y0 + size * scale_y),
                text: ch.to_string(),
                font_name: metrics.map(|m| m.base_name.clone()).or_else(|| state.font.clone()),
                font_size: Some(size * state.text_matrix[3]),
                color: state.fill_color,
            });
        }
        advance_text(state, width);
    }
}

/// Unit square under the current transform, normalized to a positive box.
fn placement_bbox(ctm: &Matrix) -> Rect {
    let (ax, ay) = transform(ctm, 0.0, 0.0);
    let (bx, by) = transform(ctm, 1.0, 1.0);
    Rect::new(ax.min(bx), ay.min(by), ax.max(bx), ay.max(by))
}

fn operand_matrix(operands: &[Object]) -> Matrix {
    [
        to_f32(&operands[0]),
        to_f32(&operands[1]),
        to_f32(&operands[2]),
        to_f32(&operands[3]),
        to_f32(&operands[4]),
        to_f32(&operands[5]),
    ]
}

/// Concatenated, decompressed content streams of the page.
fn page_content(page: &LopdfDictionary, doc: &LopdfDocument) -> Result<Vec<u8>, DecodeError> {
    let contents = match page.get(b"Contents") {
        Ok(obj) => obj,
        Err(_) => return Ok(Vec::new()), // blank page
    };
    let mut data = Vec::new();
    let mut append_stream = |obj: &Object| -> Result<(), DecodeError> {
        let stream = resolve(obj, doc)
            .as_stream()
            .map_err(|e| DecodeError::Malformed(format!("content is not a stream: {e}")))?;
        let decoded = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        data.extend(decoded);
        data.push(b'\n');
        Ok(())
    };
    match contents {
        Object::Array(parts) => {
            for part in parts {
                append_stream(part)?;
            }
        }
        other => append_stream(other)?,
    }
    Ok(data)
}

/// MediaBox of the page, following the `Parent` chain when inherited. The
/// chain is capped so a cyclic page tree cannot hang the decoder.
fn media_box(page: &LopdfDictionary, doc: &LopdfDocument) -> Option<Rect> {
    let mut node = page.clone();
    for _ in 0..32 {
        if let Ok(obj) = node.get(b"MediaBox") {
            return parse_rect(resolve(obj, doc));
        }
        let parent = node.get(b"Parent").ok()?.as_reference().ok()?;
        node = doc.get_object(parent).ok()?.as_dict().ok()?.clone();
    }
    None
}

fn parse_rect(obj: &Object) -> Option<Rect> {
    if let Object::Array(arr) = obj {
        if arr.len() == 4 {
            return Some(Rect::new(
                to_f32(&arr[0]),
                to_f32(&arr[1]),
                to_f32(&arr[2]),
                to_f32(&arr[3]),
            ));
        }
    }
    None
}

/// Font resource name to metrics, from the page's `Resources`.
fn font_metrics(
    resources: Option<&LopdfDictionary>,
    doc: &LopdfDocument,
) -> std::collections::HashMap<String, FontMetrics> {
    let mut out = std::collections::HashMap::new();
    let Some(fonts) = resources.and_then(|r| resolve_dict(r.get(b"Font").ok(), doc)) else {
        return out;
    };
    for (name, obj) in fonts.iter() {
        let Some(font) = resolve_dict(Some(obj), doc) else { continue };
        let resource_name = String::from_utf8_lossy(name).to_string();
        let base_name = font
            .get(b"BaseFont")
            .ok()
            .and_then(as_name)
            .map(strip_subset_prefix)
            .unwrap_or_else(|| resource_name.clone());
        let first_char = font
            .get(b"FirstChar")
            .ok()
            .and_then(|o| o.as_i64().ok())
            .unwrap_or(0);
        let widths = match font.get(b"Widths").ok().map(|o| resolve(o, doc)) {
            Some(Object::Array(arr)) => arr.iter().map(to_f32).collect(),
            _ => Vec::new(),
        };
        out.insert(resource_name, FontMetrics { base_name, first_char, widths });
    }
    out
}

/// Image XObject name to `(width, height, raw bytes)`.
fn raster_resources(
    resources: Option<&LopdfDictionary>,
    doc: &LopdfDocument,
) -> std::collections::HashMap<String, (u32, u32, Vec<u8>)> {
    let mut out = std::collections::HashMap::new();
    let Some(xobjects) = resources.and_then(|r| resolve_dict(r.get(b"XObject").ok(), doc)) else {
        return out;
    };
    for (name, obj) in xobjects.iter() {
        let resolved = resolve(obj, doc);
        let Ok(stream) = resolved.as_stream() else { continue };
        let is_image = stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(as_name)
            .is_some_and(|s| s == "Image");
        if !is_image {
            continue;
        }
        let width = stream.dict.get(b"Width").ok().map(to_f32).unwrap_or(0.0) as u32;
        let height = stream.dict.get(b"Height").ok().map(to_f32).unwrap_or(0.0) as u32;
        out.insert(
            String::from_utf8_lossy(name).to_string(),
            (width, height, stream.content.clone()),
        );
    }
    out
}

/// Chases a reference to its target object; non-references pass through.
fn resolve<'a>(obj: &'a Object, doc: &'a LopdfDocument) -> &'a Object {
    match obj {
        Object::Reference(r) => doc.get_object(*r).unwrap_or(obj),
        other => other,
    }
}

fn resolve_dict(obj: Option<&Object>, doc: &LopdfDocument) -> Option<LopdfDictionary> {
    obj.map(|o| resolve(o, doc)).and_then(|o| o.as_dict().ok()).cloned()
}

/// `ABCDEF+Helvetica` subset names collapse to the bare family.
fn strip_subset_prefix(name: String) -> String {
    match name.split_once('+') {
        Some((prefix, rest)) if prefix.len() == 6 && prefix.chars().all(|c| c.is_ascii_uppercase()) => {
            rest.to_string()
        }
        _ => name,
    }
}

fn to_f32(obj: &Object) -> f32 {
    match obj {
        Object::Integer(i) => *i as f32,
        Object::Real(r) => *r,
        _ => 0.0,
    }
}

fn as_name(obj: &Object) -> Option<String> {
    if let Object::Name(bytes) = obj {
        Some(String::from_utf8_lossy(bytes).to_string())
    } else {
        None
    }
}
