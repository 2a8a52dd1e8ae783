//! `hymnscan` - batch converter for one hymnal volume.
//!
//! Usage:
//!   `hymnscan extract <start> <end> [--skip-existing]`
//!   `hymnscan templates <start> <end>`
//!   `hymnscan drafts <fixture.json> <page>...`
//!   `hymnscan coverage [--expected N] [<start>-<end>]...`
//!   `hymnscan stats --expected N`
//!   `hymnscan metadata`
//!
//! The hymnal and directories come from the environment (see `.env`).

use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{anyhow, bail, Context};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hymnscan::config::Config;
use hymnscan::coverage::{gaps, missing_numbers, CoverageReport, ProcessingStats};
use hymnscan::drafts::FixtureContentSource;
use hymnscan::driver::BatchDriver;
use hymnscan::index::MetadataIndex;
use hymnscan::ocr::TesseractOcr;
use hymnscan::store::HymnStore;

const USAGE: &str = "Usage:
  hymnscan extract <start> <end> [--skip-existing]
  hymnscan templates <start> <end>
  hymnscan drafts <fixture.json> <page>...
  hymnscan coverage [--expected N] [<start>-<end>]...
  hymnscan stats --expected N
  hymnscan metadata";

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("hymnscan=info".parse()?))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some((command, rest)) = args.split_first() else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Hymnal {} ({}) under {}", config.hymnal, config.language, config.base_dir.display());

    match command.as_str() {
        "extract" => extract(&config, rest),
        "templates" => templates(&config, rest),
        "drafts" => drafts(&config, rest),
        "coverage" => coverage(&config, rest),
        "stats" => stats(&config, rest),
        "metadata" => metadata(&config),
        other => bail!("Unknown command {other:?}\n{USAGE}"),
    }
}

fn store(config: &Config) -> HymnStore {
    HymnStore::new(config.output_dir(), config.hymnal.clone(), config.language.clone())
}

fn extract(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let pages = page_range(args)?;
    let skip_existing = args.iter().any(|a| a == "--skip-existing");

    let driver = BatchDriver::from_config(TesseractOcr::new(&config.tesseract_path), config)
        .skip_existing(skip_existing);
    let summary = driver.run(pages);

    println!("Saved: {}", summary.saved.len());
    println!("Not extracted: {}", summary.not_extracted.len());
    for (page, reason) in &summary.not_extracted {
        println!("  {page:>4}: {reason}");
    }
    if skip_existing {
        println!("Already extracted: {}", summary.already_extracted.len());
    }
    println!("Missing images: {}", summary.missing_images.len());
    println!("Failed: {}", summary.failed.len());
    for (page, message) in &summary.failed {
        println!("  {page:>4}: {message}");
    }
    Ok(())
}

fn templates(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let pages = page_range(args)?;
    let created = store(config).create_missing_templates(pages.clone(), config.year)?;
    println!("Range {}-{}: {} hymns created", pages.start(), pages.end(), created.len());
    Ok(())
}

fn drafts(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let (fixture, pages) = args.split_first().ok_or_else(|| anyhow!("drafts needs a fixture file\n{USAGE}"))?;
    let source = FixtureContentSource::from_file(Path::new(fixture))
        .with_context(|| format!("Failed to load drafts from {fixture}"))?;

    let pages: Vec<u32> = if pages.is_empty() {
        source.pages().collect()
    } else {
        pages
            .iter()
            .map(|p| p.parse().with_context(|| format!("Invalid page number {p:?}")))
            .collect::<anyhow::Result<_>>()?
    };

    let updated = store(config).apply_drafts(&source, &pages)?;
    println!("Extracted content for {} sample hymns", updated.len());
    Ok(())
}

fn coverage(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let store = store(config);
    let expected = flag_value(args, "--expected")?;

    let mut ranges: Vec<RangeInclusive<u32>> = args
        .iter()
        .filter(|a| a.contains('-') && !a.starts_with("--"))
        .map(|a| parse_range(a))
        .collect::<anyhow::Result<_>>()?;
    if ranges.is_empty() {
        let total = expected.or_else(|| store.existing_numbers().last().copied()).unwrap_or(0);
        if total == 0 {
            bail!("No hymns found in {} and no --expected total given", store.dir().display());
        }
        ranges.push(1..=total);
    }

    let report = CoverageReport::analyze(&store, &ranges);
    println!("{} EXTRACTION COVERAGE", config.hymnal);
    println!("{:<12} {:>6} {:>8} {:>8} {:>9} {:>8}", "Range", "Total", "Exists", "Content", "Template", "Missing");
    for r in &report.ranges {
        println!(
            "{:<12} {:>6} {:>8} {:>8} {:>9} {:>8}",
            format!("{}-{}", r.start, r.end),
            r.total(),
            r.existing,
            r.content_extracted,
            r.templates,
            r.missing.len()
        );
    }
    println!();
    println!("Total hymns:        {}", report.total());
    println!("Existing:           {} ({:.1}%)", report.existing(), report.existing_percent());
    println!("Content extracted:  {} ({:.1}%)", report.content_extracted(), report.content_percent());
    println!("Templates:          {}", report.templates());

    let missing = report.missing();
    if !missing.is_empty() {
        println!("Missing hymns: {missing:?}");
    }

    if let Some(total) = expected {
        let missing = missing_numbers(&store, total);
        println!("Missing against expected total {total}: {missing:?}");
        for gap in gaps(&store.existing_numbers()) {
            println!("  gap {}-{}", gap.start(), gap.end());
        }
    }

    let path = report.write_to(&config.indices_dir())?;
    println!("Report saved to: {}", path.display());
    Ok(())
}

fn stats(config: &Config, args: &[String]) -> anyhow::Result<()> {
    let expected = flag_value(args, "--expected")?.ok_or_else(|| anyhow!("stats needs --expected N\n{USAGE}"))?;
    let stats = ProcessingStats::collect(&store(config), expected);
    let path = stats.write_to(&config.indices_dir())?;

    println!("=== Processing Statistics ===");
    println!("Expected hymns: {}", stats.total_hymns_expected);
    println!("Successfully processed: {}", stats.total_hymns_processed);
    println!("Success rate: {:.1}%", stats.success_rate);
    println!("Statistics saved to: {}", path.display());
    Ok(())
}

fn metadata(config: &Config) -> anyhow::Result<()> {
    let store = store(config);
    let index = MetadataIndex::build(&store, config.year);
    if index.collection.hymns.is_empty() {
        bail!("No hymns found in {}", store.dir().display());
    }
    for path in index.write_to(&config.metadata_dir(), &config.hymnals_dir())? {
        println!("Saved: {}", path.display());
    }

    println!("\n=== Metadata Generation Summary ===");
    println!("Total hymns processed: {}", index.collection.metadata.total_hymns);
    println!("Authors found: {}", index.authors.len());
    println!("Themes identified: {}", index.themes.len());
    println!("First lines indexed: {}", index.first_lines.len());
    Ok(())
}

fn page_range(args: &[String]) -> anyhow::Result<RangeInclusive<u32>> {
    let mut numbers = args.iter().filter(|a| !a.starts_with("--"));
    let (Some(start), Some(end)) = (numbers.next(), numbers.next()) else {
        bail!("Expected <start> <end>\n{USAGE}");
    };
    let start: u32 = start.parse().with_context(|| format!("Invalid start {start:?}"))?;
    let end: u32 = end.parse().with_context(|| format!("Invalid end {end:?}"))?;
    if start > end {
        bail!("Start {start} is after end {end}");
    }
    Ok(start..=end)
}

fn parse_range(arg: &str) -> anyhow::Result<RangeInclusive<u32>> {
    let (start, end) = arg.split_once('-').ok_or_else(|| anyhow!("Invalid range {arg:?}"))?;
    let start: u32 = start.trim().parse().with_context(|| format!("Invalid range {arg:?}"))?;
    let end: u32 = end.trim().parse().with_context(|| format!("Invalid range {arg:?}"))?;
    Ok(start..=end)
}

fn flag_value(args: &[String], flag: &str) -> anyhow::Result<Option<u32>> {
    args.iter()
        .position(|a| a == flag)
        .map(|i| {
            let value = args.get(i + 1).ok_or_else(|| anyhow!("{flag} needs a value"))?;
            value.parse().with_context(|| format!("Invalid {flag} value {value:?}"))
        })
        .transpose()
}
