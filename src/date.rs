//! Recognition and normalization of French calendar dates.
//!
//! Four separator grammars (`/`, `-`, `.`, space) bind a day (1–31 with an
//! optional ordinal marker), a month (numeric or a French month name or its
//! short prefix) and a two- or four-digit year. Matches are normalized to
//! `dd/MM/YYYY`; day, month and year are not semantically validated, so
//! February 30th passes.

use log::warn;
use once_cell::sync::Lazy;
use regex::Regex;

const DAY: &str = r"(?:0?[1-9]|[12][0-9]|3[01])(?:(?:[eè]re?)|e|è)?";
const MONTH_NAME: &str = "jan(?:vier)?|f[ée]v(?:rier)?|mar(?:s)?|avr(?:il)?|mai|jui(?:n)?|jul(?:liet)?|ao[uû]t|sept?(?:embre)?|oct(?:obre)?|nov(?:embre)?|d[eé]c(?:embre)?";

fn separated(sep: &str) -> Regex {
    let pattern =
        format!(r"{DAY}{sep}(?:0?[1-9]|1[012]|{MONTH_NAME}){sep}(\d{{2,4}})");
    Regex::new(&pattern).expect("date pattern compiles")
}

static DATE_SLASH_RE: Lazy<Regex> = Lazy::new(|| separated("/"));
static DATE_HYPHEN_RE: Lazy<Regex> = Lazy::new(|| separated("-"));
static DATE_POINT_RE: Lazy<Regex> = Lazy::new(|| separated(r"\."));
// The space form only accepts written-out months, optionally dotted.
static DATE_SPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"{DAY} (?:{MONTH_NAME})\.? (\d{{2,4}})"))
        .expect("date pattern compiles")
});

static NON_ALPHANUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").unwrap());
static ORDINAL_CHARS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[eérè]").unwrap());

/// One date literal found in a text.
#[derive(Debug, Clone, PartialEq)]
pub struct DateMatch {
    /// Byte span of the literal in the input.
    pub start: usize,
    pub end: usize,
    /// The literal as it appears in the text.
    pub text: String,
    /// `dd/MM/YYYY` form, or `None` when the literal defeats normalization.
    pub normalized: Option<String>,
}

/// Finds all date literals in `text`, in order of appearance.
///
/// Callers that feed block text should lowercase it first; the month names
/// are matched in lowercase only.
pub fn find_dates(text: &str) -> Vec<DateMatch> {
    let regexes = [&*DATE_SLASH_RE, &*DATE_SPACE_RE, &*DATE_HYPHEN_RE, &*DATE_POINT_RE];
    let mut out = Vec::new();
    for re in regexes {
        for caps in re.captures_iter(text) {
            let m = caps.get(0).expect("group 0 always present");
            if !digit_bounded(text, m.start(), m.end()) {
                continue;
            }
            let year = caps.get(1).expect("year group").as_str();
            // YY, or YYYY in the current millennium; anything else is a
            // number that merely looks date-shaped (SIREN tails, meter
            // readings).
            if !(year.len() == 2 || (year.len() == 4 && year.starts_with("20"))) {
                continue;
            }
            out.push(DateMatch {
                start: m.start(),
                end: m.end(),
                text: m.as_str().to_string(),
                normalized: uniform_date(m.as_str()),
            });
        }
    }
    out.sort_by_key(|d| (d.start, d.end));
    out
}

/// True when the match is not glued to surrounding digits.
fn digit_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !matches!(before, Some(c) if c.is_ascii_digit())
        && !matches!(after, Some(c) if c.is_ascii_digit())
}

/// Normalizes any `(day, month, year)` literal to `dd/MM/YYYY`. Returns
/// `None` when the literal does not decompose into exactly three parts or
/// the month is neither numeric nor a known French name.
pub fn uniform_date(raw: &str) -> Option<String> {
    let parts: Vec<&str> = NON_ALPHANUM_RE.split(raw).collect();
    if parts.len() != 3 {
        warn!("date normalization failed, expected day/month/year in {raw:?}");
        return None;
    }
    let day: u32 = match ORDINAL_CHARS_RE.replace_all(parts[0], "").parse() {
        Ok(d) => d,
        Err(_) => {
            warn!("date normalization failed, bad day in {raw:?}");
            return None;
        }
    };
    let month: u32 = match month_number(parts[1]) {
        Some(m) => m,
        None => match parts[1].parse() {
            Ok(m) if !parts[1].is_empty() => m,
            _ => {
                warn!("date normalization failed, bad month in {raw:?}");
                return None;
            }
        },
    };
    let mut year: i32 = parts[2].parse().ok()?;
    if year <= 99 {
        year += 2000;
    }
    Some(format!("{day:02}/{month:02}/{year}"))
}

/// Month number for a French month name or recognized short form.
fn month_number(name: &str) -> Option<u32> {
    Some(match name {
        "janvier" | "jan" => 1,
        "février" | "fevrier" | "fev" | "fév" => 2,
        "mars" | "mar" => 3,
        "avril" | "avr" => 4,
        "mai" => 5,
        "juin" | "jui" => 6,
        "julliet" | "jul" => 7,
        "août" | "aout" => 8,
        "septembre" | "sept" | "sep" => 9,
        "octobre" | "oct" => 10,
        "novembre" | "nov" => 11,
        "décembre" | "decembre" | "dec" | "déc" => 12,
        _ => return None,
    })
}
