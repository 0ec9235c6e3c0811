//! Character glyphs and the font identity used for inline styling.

use crate::decode::{Color, RawGlyph};
use crate::geometry::Rect;

/// A normalized 8-bit RGB color.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// `(r,g,b)` with components in `0..=255`, the form used in the XML
    /// output.
    pub fn to_triple_string(self) -> String {
        format!("({},{},{})", self.r, self.g, self.b)
    }
}

impl From<Color> for Rgb {
    /// Decoder color components are in `[0, 1]`; they are scaled by 255 and
    /// floored. A grayscale scalar of zero is plain black.
    fn from(c: Color) -> Rgb {
        fn channel(v: f32) -> u8 {
            (v.clamp(0.0, 1.0) * 255.0) as u8
        }
        match c {
            Color::Gray(v) => {
                let g = channel(v);
                Rgb { r: g, g, b: g }
            }
            Color::Rgb(r, g, b) => Rgb { r: channel(r), g: channel(g), b: channel(b) },
        }
    }
}

/// The identity under which glyphs are grouped into style runs.
///
/// Two glyphs belong to the same run iff their descriptors are structurally
/// equal; a glyph whose font the decoder could not resolve carries
/// [`FontDescriptor::Unknown`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FontDescriptor {
    Unknown,
    Known {
        family: String,
        /// Font size rounded to the nearest integer.
        size: i32,
        color: Rgb,
    },
}

impl FontDescriptor {
    pub fn from_raw(name: Option<&str>, size: Option<f32>, color: Option<Color>) -> Self {
        match name {
            None => FontDescriptor::Unknown,
            Some(family) => FontDescriptor::Known {
                family: family.to_string(),
                size: size.map(|s| s.round() as i32).unwrap_or(0),
                color: color.map(Rgb::from).unwrap_or(Rgb::BLACK),
            },
        }
    }
}

/// A positioned character (or short cluster) with its style identity.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub bbox: Rect,
    pub text: String,
    pub font: FontDescriptor,
}

impl Glyph {
    /// Normalizes one decoder glyph. Glyphs with empty text carry no layout
    /// information and are dropped by returning `None`.
    pub fn from_raw(raw: &RawGlyph) -> Option<Glyph> {
        if raw.text.is_empty() {
            return None;
        }
        Some(Glyph {
            bbox: raw.bbox,
            text: raw.text.clone(),
            font: FontDescriptor::from_raw(raw.font_name.as_deref(), raw.font_size, raw.color),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_components_are_floored() {
        // ncolour="(0.075, 0.424, 0.741)" style input
        let rgb = Rgb::from(Color::Rgb(0.075, 0.424, 0.741));
        assert_eq!(rgb, Rgb { r: 19, g: 108, b: 188 });
    }

    #[test]
    fn gray_zero_is_black() {
        assert_eq!(Rgb::from(Color::Gray(0.0)), Rgb::BLACK);
    }

    #[test]
    fn descriptor_equality_is_structural() {
        let a = FontDescriptor::from_raw(Some("Helvetica"), Some(11.6), None);
        let b = FontDescriptor::from_raw(Some("Helvetica"), Some(12.4), None);
        assert_eq!(a, b); // both round to 12
        assert_ne!(a, FontDescriptor::Unknown);
    }
}
