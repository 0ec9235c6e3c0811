//! Recognition of French postal-address tails.
//!
//! A block "ends with a postal pattern" when its rightmost code-postal match
//! is a known 5-digit code and the text after it names one of the cities
//! registered for that code, with at most two stray tokens of slack. City
//! comparison is insensitive to case, accents, digits, hyphens, apostrophes
//! and `St`/`Ste`/`Saint`/`Sainte` prefixes.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_derive::Deserialize;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::Error;

/// `<2-digit><optional space/hyphen><3-digit>`, preceded by a space or comma.
static CODE_POSTAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ ,](\d{2}[ -]?\d{3})").unwrap());
static CITY_CLEAN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+|-|'|\b(?:sainte?|ste?)\b").unwrap());
static MULTISPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Curated default directory; `--postal-dict` swaps in a complete dataset.
static BUILTIN: Lazy<PostalDirectory> = Lazy::new(|| {
    PostalDirectory::from_json_str(include_str!("../assets/codepostal_villes.json"))
        .expect("embedded postal dictionary is valid JSON")
});

/// One city registered under a postal code, as a `["short", "Full"]` pair in
/// the JSON dataset.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityEntry(String, String);

impl CityEntry {
    /// Short postal-register name, the form matched inside address tails.
    pub fn short_name(&self) -> &str {
        &self.0
    }

    /// Full display name.
    pub fn full_name(&self) -> &str {
        &self.1
    }
}

/// The code-postal lookup table: 5-digit code to registered cities.
/// Read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct PostalDirectory {
    entries: HashMap<String, Vec<CityEntry>>,
}

impl PostalDirectory {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let entries: HashMap<String, Vec<CityEntry>> = serde_json::from_str(json)?;
        Ok(PostalDirectory { entries })
    }

    /// Loads a directory from disk. Failure here is fatal for the run.
    pub fn from_json_file(path: &Path) -> Result<Self, Error> {
        let json = fs::read_to_string(path)?;
        Ok(Self::from_json_str(&json)?)
    }

    /// The dictionary embedded in the binary.
    pub fn builtin() -> &'static PostalDirectory {
        &BUILTIN
    }

    pub fn cities(&self, code: &str) -> &[CityEntry] {
        self.entries.get(code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Lowercases, folds accents away and strips digits, hyphens, apostrophes
/// and `St`/`Ste`/`Saint`/`Sainte` words, collapsing the result to single
/// spaces. Applied to both city names and address tails so the comparison is
/// symmetric.
pub fn normalize_city_name(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    let cleaned = CITY_CLEAN_RE.replace_all(&folded, " ");
    MULTISPACE_RE.replace_all(&cleaned, " ").trim().to_string()
}

/// All code-postal occurrences whose code is known and whose tail names one
/// of the code's cities. Returns `(code, full city name)` pairs in order of
/// appearance.
pub fn find_postal_codes(text: &str, directory: &PostalDirectory) -> Vec<(String, String)> {
    let flat = flatten(text);
    let mut found = Vec::new();
    for (code, end) in candidate_codes(&flat, directory) {
        let tail = normalize_city_name(&flat[end..]);
        for entry in directory.cities(&code) {
            let city = normalize_city_name(entry.short_name());
            if !city.is_empty() && tail.contains(&city) {
                found.push((code, entry.full_name().to_string()));
                break;
            }
        }
    }
    found
}

/// Whether the text ends in `<code postal> <city>` with at most two tokens
/// of slack after the city.
pub fn ends_with_postal_pattern(text: &str, directory: &PostalDirectory) -> bool {
    let flat = flatten(text);
    let Some((code, end)) = candidate_codes(&flat, directory).into_iter().next_back() else {
        return false;
    };
    let tail = normalize_city_name(&flat[end..]);
    let tail_tokens = tail.split_whitespace().count();
    for entry in directory.cities(&code) {
        let city = normalize_city_name(entry.short_name());
        if city.is_empty() {
            continue;
        }
        if tail.contains(&city) && tail_tokens <= city.split_whitespace().count() + 2 {
            return true;
        }
    }
    false
}

fn flatten(text: &str) -> String {
    MULTISPACE_RE.replace_all(&text.replace('\n', " "), " ").into_owned()
}

/// Dictionary-known code matches as `(compact code, byte offset after the
/// match)`, left to right.
fn candidate_codes(flat: &str, directory: &PostalDirectory) -> Vec<(String, usize)> {
    let mut codes = Vec::new();
    for caps in CODE_POSTAL_RE.captures_iter(flat) {
        let m = caps.get(1).expect("code group");
        // a longer digit run is not a postal code
        if flat[m.end()..].chars().next().is_some_and(|c| c.is_ascii_digit()) {
            continue;
        }
        let compact: String = m.as_str().chars().filter(|c| c.is_ascii_digit()).collect();
        if !directory.cities(&compact).is_empty() {
            codes.push((compact, m.end()));
        }
    }
    codes
}
