//! End-to-end checks of the OCR text to hymn record pipeline.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use hymnscan::extract::{
    clean_verse_text, normalize, segment, ExtractionFailure, Heuristics, HymnExtractor, Verse,
};
use hymnscan::ocr::RawPage;
use hymnscan::types::{HymnalCode, LanguageCode};

const AMAZING_GRACE: &str = "Amazing Grace\n1. Amazing grace how sweet\nthe sound\n2. That saved a wretch\nlike me";

fn extractor() -> HymnExtractor {
    HymnExtractor::new(HymnalCode::from("SDAH"), LanguageCode::from("en"))
}

fn verse(number: u32, text: &str) -> Verse {
    Verse { number, text: text.to_string() }
}

#[test]
fn amazing_grace_page_becomes_a_record() {
    let record = extractor().extract_hymn(108, &RawPage::new(AMAZING_GRACE)).unwrap();

    assert_eq!(record.number, 108);
    assert_eq!(record.title, "Amazing Grace");
    assert_eq!(record.language.as_str(), "en");
    assert_eq!(
        record.verses,
        vec![verse(1, "Amazing grace how sweet the sound"), verse(2, "That saved a wretch like me")]
    );
}

#[test]
fn extraction_is_repeatable_byte_for_byte() {
    let page = RawPage::new(format!("{AMAZING_GRACE}\n3. T'was grace that taught ~~ my heart to fear\n|| ^^"));
    let first = serde_json::to_vec(&extractor().extract_hymn(12, &page).unwrap()).unwrap();
    let second = serde_json::to_vec(&extractor().extract_hymn(12, &page).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn normalization_never_adds_lines() {
    let heuristics = Heuristics::default();
    let pages = [
        "",
        "\n\n\n",
        AMAZING_GRACE,
        "a\nbb\n  spaced    out   line  \nAbc\n1. verse text here",
        "Holy, Holy, Holy\r\n1. Lord God Almighty\r\n\tearly in the morning",
    ];
    for page in pages {
        let lines = normalize(page, &heuristics);
        assert!(lines.len() <= page.lines().count(), "{page:?} grew to {} lines", lines.len());
        assert!(lines.iter().all(|l| !l.as_str().contains("  ")));
    }
}

#[test]
fn segmented_verses_follow_markers_and_are_never_empty() {
    let heuristics = Heuristics::default();
    let text = "Title Line Here\n1. first verse words\ncontinued here\n2. %%% ###\n3. third verse words\n4.\n5. fifth verse words";
    let lines = normalize(text, &heuristics);
    let markers: Vec<u32> = lines
        .iter()
        .filter_map(|l| heuristics.verse_marker(l.as_str()).map(|(n, _)| n))
        .collect();

    let verses = segment(&lines, &heuristics);

    let numbers: Vec<u32> = verses.iter().map(|v| v.number).collect();
    assert_eq!(numbers, vec![1, 3, 5]);
    assert!(numbers.windows(2).all(|w| w[0] <= w[1]));
    let mut remaining = markers.iter();
    assert!(numbers.iter().all(|n| remaining.any(|m| m == n)));
    assert!(verses.iter().all(|v| !v.text.is_empty()));
}

#[test]
fn noise_only_page_is_empty_normalization() {
    let page = RawPage::new("a\n--\n|\n~~\n\n 1 \nIV");
    assert_eq!(extractor().extract_hymn(3, &page), Err(ExtractionFailure::EmptyNormalization));
}

#[test]
fn single_letter_tokens_are_dropped_except_words() {
    assert_eq!(clean_verse_text("x y O z a", &Heuristics::default()), "O a");
}

#[test]
fn verses_without_title_do_not_make_a_record() {
    let heuristics = Heuristics::default();
    let text = "3. sing to him\nwith cheerful voice";
    assert_eq!(segment(&normalize(text, &heuristics), &heuristics).len(), 1);

    assert_eq!(extractor().extract_hymn(40, &RawPage::new(text)), Err(ExtractionFailure::MissingTitle));
}

#[test]
fn title_without_verses_is_no_verses() {
    let page = RawPage::new("Holy Spirit Descend\nwords with no marker at all");
    assert_eq!(extractor().extract_hymn(41, &page), Err(ExtractionFailure::NoVerses));
}

#[test]
fn tuned_heuristics_change_what_is_noise() {
    let heuristics: Heuristics = serde_json::from_str(r#"{ "noise_max_len": 0, "short_line_max": 0 }"#).unwrap();
    let lines = normalize("ab\nabc", &heuristics);
    assert_eq!(lines.len(), 2);
}
