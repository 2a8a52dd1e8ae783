//! Extraction coverage reports.
//!
//! Answers "which hymns do we have, and how many are real content rather than
//! templates?" for a store, over explicit number ranges or an expected total.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::constants::batch::{COVERAGE_FILE, STATS_FILE};
use crate::error::Result;
use crate::store::{write_json, ExtractionStatus, HymnStore};

/// Coverage of one range of hymn numbers.
///
/// Serialized with the derived `range`, `total` and `coverage_percent` fields
/// alongside the counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RangeEntry", from = "RangeEntry")]
pub struct RangeCoverage {
    /// First hymn number.
    pub start: u32,
    /// Last hymn number.
    pub end: u32,
    /// Hymns with a file.
    pub existing: usize,
    /// Hymns marked `content_extracted`.
    pub content_extracted: usize,
    /// Hymns marked `template_created`.
    pub templates: usize,
    /// Hymns whose file failed to parse.
    pub unreadable: usize,
    /// Numbers without a file.
    pub missing: Vec<u32>,
}

impl RangeCoverage {
    /// Hymns in the range.
    pub const fn total(&self) -> usize {
        (self.end - self.start) as usize + 1
    }

    /// Percentage of the range with a file.
    pub fn existing_percent(&self) -> f64 {
        percent(self.existing, self.total())
    }

    /// Percentage of the range with extracted content.
    pub fn content_percent(&self) -> f64 {
        percent(self.content_extracted, self.total())
    }
}

/// On-disk shape of a [`RangeCoverage`].
#[derive(Serialize, Deserialize)]
struct RangeEntry {
    range: String,
    start: u32,
    end: u32,
    total: usize,
    existing: usize,
    content_extracted: usize,
    templates_created: usize,
    #[serde(default)]
    unreadable: usize,
    missing: usize,
    missing_list: Vec<u32>,
    coverage_percent: f64,
}

impl From<RangeCoverage> for RangeEntry {
    fn from(r: RangeCoverage) -> Self {
        Self {
            range: format!("{}-{}", r.start, r.end),
            start: r.start,
            end: r.end,
            total: r.total(),
            existing: r.existing,
            content_extracted: r.content_extracted,
            templates_created: r.templates,
            unreadable: r.unreadable,
            missing: r.missing.len(),
            coverage_percent: r.existing_percent(),
            missing_list: r.missing,
        }
    }
}

impl From<RangeEntry> for RangeCoverage {
    fn from(e: RangeEntry) -> Self {
        Self {
            start: e.start,
            end: e.end,
            existing: e.existing,
            content_extracted: e.content_extracted,
            templates: e.templates_created,
            unreadable: e.unreadable,
            missing: e.missing_list,
        }
    }
}

/// Coverage over several ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageReport {
    /// Per-range breakdown in the order requested.
    pub ranges: Vec<RangeCoverage>,
}

/// Report file contents: the ranges plus overall totals.
#[derive(Serialize)]
struct CoverageFile<'a> {
    extraction_date: String,
    #[serde(flatten)]
    report: &'a CoverageReport,
    total_hymns_processed: usize,
    total_content_extracted: usize,
    total_templates_created: usize,
    total_missing: usize,
    overall_coverage_percent: f64,
}

impl CoverageReport {
    /// Inspect every hymn in `ranges`.
    pub fn analyze(store: &HymnStore, ranges: &[RangeInclusive<u32>]) -> Self {
        let existing = store.existing_numbers();
        let ranges = ranges
            .iter()
            .filter(|r| r.start() <= r.end())
            .map(|range| analyze_range(store, &existing, range))
            .collect();
        Self { ranges }
    }

    /// Hymns across all ranges.
    pub fn total(&self) -> usize {
        self.ranges.iter().map(RangeCoverage::total).sum()
    }

    /// Hymns with a file across all ranges.
    pub fn existing(&self) -> usize {
        self.ranges.iter().map(|r| r.existing).sum()
    }

    /// Hymns with extracted content across all ranges.
    pub fn content_extracted(&self) -> usize {
        self.ranges.iter().map(|r| r.content_extracted).sum()
    }

    /// Template hymns across all ranges.
    pub fn templates(&self) -> usize {
        self.ranges.iter().map(|r| r.templates).sum()
    }

    /// Missing numbers across all ranges, ascending.
    pub fn missing(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = self.ranges.iter().flat_map(|r| r.missing.iter().copied()).collect();
        set.into_iter().collect()
    }

    /// Overall percentage with a file.
    pub fn existing_percent(&self) -> f64 {
        percent(self.existing(), self.total())
    }

    /// Overall percentage with extracted content.
    pub fn content_percent(&self) -> f64 {
        percent(self.content_extracted(), self.total())
    }

    /// Write the report as `extraction_coverage_report.json` inside `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(COVERAGE_FILE);
        let file = CoverageFile {
            extraction_date: Local::now().format("%Y-%m-%d").to_string(),
            report: self,
            total_hymns_processed: self.existing(),
            total_content_extracted: self.content_extracted(),
            total_templates_created: self.templates(),
            total_missing: self.missing().len(),
            overall_coverage_percent: self.existing_percent(),
        };
        write_json(&path, &file)?;
        Ok(path)
    }
}

fn analyze_range(store: &HymnStore, existing: &BTreeSet<u32>, range: &RangeInclusive<u32>) -> RangeCoverage {
    let mut coverage = RangeCoverage { start: *range.start(), end: *range.end(), ..RangeCoverage::default() };

    for number in range.clone() {
        if !existing.contains(&number) {
            coverage.missing.push(number);
            continue;
        }
        coverage.existing += 1;
        match store.status_of(number) {
            Ok(Some(ExtractionStatus::ContentExtracted)) => coverage.content_extracted += 1,
            Ok(Some(ExtractionStatus::TemplateCreated)) => coverage.templates += 1,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!("Could not read hymn {number}: {e}");
                coverage.unreadable += 1;
            }
        }
    }

    coverage
}

/// Numbers in `1..=expected_total` without a file.
pub fn missing_numbers(store: &HymnStore, expected_total: u32) -> Vec<u32> {
    let existing = store.existing_numbers();
    (1..=expected_total).filter(|n| !existing.contains(n)).collect()
}

/// Contiguous runs of numbers absent from `numbers`, below its maximum.
pub fn gaps(numbers: &BTreeSet<u32>) -> Vec<RangeInclusive<u32>> {
    let mut gaps = Vec::new();
    let mut expected = 1;
    for &n in numbers {
        if n > expected {
            gaps.push(expected..=n - 1);
        }
        expected = n.saturating_add(1);
    }
    gaps
}

/// Summary written after a processing run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingStats {
    /// Hymns the hymnal should contain.
    pub total_hymns_expected: u32,
    /// Hymn files present.
    pub total_hymns_processed: usize,
    /// `processed / expected` as a percentage.
    pub success_rate: f64,
    /// Local date of the report (`YYYY-MM-DD`).
    pub processing_date: String,
    /// File names present, sorted.
    pub processed_files: Vec<String>,
}

impl ProcessingStats {
    /// Collect statistics for a store.
    pub fn collect(store: &HymnStore, expected_total: u32) -> Self {
        let processed_files: Vec<String> = store
            .existing_numbers()
            .into_iter()
            .map(|n| store.id_for(n).file_name())
            .collect();
        let processed = processed_files.len();
        Self {
            total_hymns_expected: expected_total,
            total_hymns_processed: processed,
            success_rate: percent(processed, expected_total as usize),
            processing_date: Local::now().format("%Y-%m-%d").to_string(),
            processed_files,
        }
    }

    /// Write the statistics as `processing-stats.json` inside `dir`.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(STATS_FILE);
        write_json(&path, self)?;
        Ok(path)
    }
}

#[allow(clippy::cast_precision_loss)]
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
