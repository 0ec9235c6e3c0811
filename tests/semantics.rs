//! Date, pagination and address recognition over block text.

use pretty_assertions::assert_eq;

use pdfstencil::address::{ends_with_postal_pattern, PostalDirectory};
use pdfstencil::date::{find_dates, uniform_date};
use pdfstencil::tags::{classify_block, BlockTag};

fn directory() -> PostalDirectory {
    PostalDirectory::from_json_str(r#"{"75015": [["paris", "Paris"]]}"#).unwrap()
}

#[test]
fn invoice_header_is_date_but_not_pagination() {
    // five words: outside the (1,5) pagination window, inside (3,10) for dates
    let tags = classify_block("Facture du 25/12/19 page 1", &directory());
    assert_eq!(tags.as_slice(), &[BlockTag::Date]);

    let found = find_dates("facture du 25/12/19 page 1");
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].normalized.as_deref(), Some("25/12/2019"));
}

#[test]
fn short_page_marker_is_pagination() {
    assert_eq!(
        classify_block("Page 1 / 2", &directory()).as_slice(),
        &[BlockTag::Page]
    );
}

#[test]
fn dantzig_address_is_recognized() {
    let dir = directory();
    assert!(ends_with_postal_pattern("192 RUE DE DANTZIG, 75015 PARIS", &dir));
    assert!(classify_block("AS DU BATIMENT\n192 RUE DE DANTZIG, 75015 PARIS", &dir)
        .contains(&BlockTag::Address));
}

#[test]
fn address_recognition_ignores_case_and_accents() {
    let dir = directory();
    assert!(ends_with_postal_pattern("192 rue de dantzig, 75015 pârís", &dir));
    assert!(ends_with_postal_pattern("192 RUE DE DANTZIG, 75015 PARIS", &dir));
}

#[test]
fn date_normalization_is_idempotent() {
    for raw in ["25/12/19", "1er janvier 2020", "19-mai-19", "3.4.21"] {
        let once = uniform_date(raw).expect("normalizes");
        assert_eq!(uniform_date(&once).as_deref(), Some(once.as_str()));
    }
}

#[test]
fn date_grammar_accepts_all_four_separators() {
    assert_eq!(find_dates("le 25/12/2019").len(), 1);
    assert_eq!(find_dates("le 25-12-2019").len(), 1);
    assert_eq!(find_dates("le 25.12.2019").len(), 1);
    assert_eq!(find_dates("le 25 décembre 2019").len(), 1);
}

#[test]
fn dates_glued_to_digits_are_rejected() {
    assert!(find_dates("R>111.92m19/13/2019").is_empty());
    assert!(find_dates("23/01/9219").is_empty());
}

#[test]
fn impossible_calendar_dates_still_normalize() {
    // day/month/year are not semantically validated
    assert_eq!(uniform_date("30/02/19").as_deref(), Some("30/02/2019"));
}

#[test]
fn multiple_dates_come_back_in_text_order() {
    let found = find_dates("du 23/01/2019 au 19-mai-19 inclus");
    let normalized: Vec<_> = found.iter().filter_map(|d| d.normalized.as_deref()).collect();
    assert_eq!(normalized, vec!["23/01/2019", "19/05/2019"]);
}
