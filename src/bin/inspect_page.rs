//! Debug tool to run one page through every extraction stage.
//!
//! Usage:
//!   `cargo run --bin inspect_page -- <page.txt> [--number N]`
//!   `cargo run --bin inspect_page -- <page.png> [--number N]`
//!
//! Text files are treated as OCR output; images are recognised with Tesseract
//! first. Prints the normalized lines, detection, verses and the final record
//! so heuristic misses can be traced to a stage.

use std::env;
use std::path::Path;

use anyhow::Context;

use hymnscan::config::Config;
use hymnscan::extract::{detect, normalize, segment, HymnExtractor};
use hymnscan::ocr::{OcrEngine, PageRef, RawPage, TesseractOcr};
use hymnscan::types::HymnalCode;

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <page.txt | page.png> [--number N]", args[0]);
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    let number: u32 = args
        .iter()
        .position(|a| a == "--number")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);

    // Neutral hymnal when HYMNAL_CODE is unset; other settings still apply
    let config = Config::load_or(&HymnalCode::from("DEBUG")).context("Failed to load config")?;
    let page = load_page(path, number, &config)?;
    let heuristics = &config.heuristics;

    println!("== RAW ({} lines)", page.text().lines().count());
    for line in page.text().lines() {
        println!("   | {line}");
    }

    let lines = normalize(page.text(), heuristics);
    println!("\n== NORMALIZED ({} lines)", lines.len());
    for line in &lines {
        let marker = heuristics.verse_marker(line.as_str()).map_or(String::from("  "), |(n, _)| format!("{n}."));
        println!("{marker} | {line}");
    }

    let detection = detect(&lines, heuristics);
    println!("\n== DETECTION");
    println!("├─ Title: {:?}", detection.title);
    println!("└─ Leading verse: {:?}", detection.leading_verse);

    let verses = segment(&lines, heuristics);
    println!("\n== VERSES ({})", verses.len());
    for verse in &verses {
        println!("{:>2}. {}", verse.number, verse.text);
    }

    let extractor = HymnExtractor::with_heuristics(
        config.hymnal.clone(),
        config.language.clone(),
        heuristics.clone(),
    );
    println!("\n== RECORD");
    match extractor.extract_hymn(number, &page) {
        Ok(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        Err(reason) => println!("No record: {reason}"),
    }
    Ok(())
}

fn load_page(path: &Path, number: u32, config: &Config) -> anyhow::Result<RawPage> {
    if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("txt")) {
        let text = fs_err::read_to_string(path)?;
        return Ok(RawPage::new(text));
    }
    let ocr = TesseractOcr::new(&config.tesseract_path);
    ocr.run_ocr(&PageRef::new(number, path))
        .with_context(|| format!("OCR failed for {}", path.display()))
}
