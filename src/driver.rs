//! Batch driver.
//!
//! Walks a range of pages one at a time: resolve the image, run OCR, extract,
//! persist. A page that fails for any reason is logged and skipped; nothing is
//! retried and the rest of the batch carries on. Drafts are merged by
//! [`HymnStore::apply_drafts`], which needs no OCR.

use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::PathBuf;

use crate::config::{page_image_path, Config};
use crate::error::Result;
use crate::extract::{ExtractionFailure, HymnExtractor};
use crate::ocr::{OcrEngine, PageRef};
use crate::store::{ExtractionStatus, HymnStore};
use crate::types::HymnId;

/// What happened to one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// A record was extracted and written.
    Saved(HymnId),
    /// OCR ran but no record could be built.
    NotExtracted(ExtractionFailure),
    /// The hymn already has extracted content and was left alone.
    AlreadyExtracted,
    /// No image exists for the page.
    MissingImage(PathBuf),
}

/// Tally of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    /// Hymns written.
    pub saved: Vec<u32>,
    /// Pages that produced no record, with the reason.
    pub not_extracted: BTreeMap<u32, ExtractionFailure>,
    /// Pages skipped because they were already extracted.
    pub already_extracted: Vec<u32>,
    /// Pages without an image.
    pub missing_images: Vec<u32>,
    /// Pages whose OCR or storage failed, with the error message.
    pub failed: BTreeMap<u32, String>,
}

impl BatchSummary {
    /// Number of pages looked at.
    pub fn pages_seen(&self) -> usize {
        self.saved.len()
            + self.not_extracted.len()
            + self.already_extracted.len()
            + self.missing_images.len()
            + self.failed.len()
    }

    fn record(&mut self, page: u32, outcome: Result<PageOutcome>) {
        match outcome {
            Ok(PageOutcome::Saved(id)) => {
                tracing::info!("Saved {id}");
                self.saved.push(page);
            }
            Ok(PageOutcome::NotExtracted(reason)) => {
                tracing::warn!("Could not extract hymn {page}: {reason}");
                self.not_extracted.insert(page, reason);
            }
            Ok(PageOutcome::AlreadyExtracted) => {
                tracing::debug!("Hymn {page} already extracted, skipping");
                self.already_extracted.push(page);
            }
            Ok(PageOutcome::MissingImage(path)) => {
                tracing::warn!("Image not found: {}", path.display());
                self.missing_images.push(page);
            }
            Err(e) => {
                tracing::warn!("Failed to process hymn {page}: {e}");
                self.failed.insert(page, e.to_string());
            }
        }
    }
}

/// Drives OCR, extraction and storage over a range of pages.
pub struct BatchDriver<E: OcrEngine> {
    engine: E,
    extractor: HymnExtractor,
    store: HymnStore,
    images_dir: PathBuf,
    page_prefix: String,
    batch_size: u32,
    year: Option<u16>,
    skip_existing: bool,
}

impl<E: OcrEngine> BatchDriver<E> {
    /// Create a driver reading images from `images_dir` and writing to `store`.
    pub fn new(engine: E, extractor: HymnExtractor, store: HymnStore, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            extractor,
            store,
            images_dir: images_dir.into(),
            page_prefix: String::new(),
            batch_size: crate::constants::batch::DEFAULT_BATCH_SIZE,
            year: None,
            skip_existing: false,
        }
    }

    /// Create a driver wired from configuration.
    pub fn from_config(engine: E, config: &Config) -> Self {
        let extractor = HymnExtractor::with_heuristics(
            config.hymnal.clone(),
            config.language.clone(),
            config.heuristics.clone(),
        );
        let store = HymnStore::new(config.output_dir(), config.hymnal.clone(), config.language.clone());
        Self::new(engine, extractor, store, config.images_dir())
            .with_page_prefix(config.page_prefix.clone())
            .with_batch_size(config.batch_size)
            .with_year(config.year)
    }

    /// Page image file name prefix.
    #[must_use]
    pub fn with_page_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.page_prefix = prefix.into();
        self
    }

    /// Pages per logged batch. Zero is treated as one.
    #[must_use]
    pub fn with_batch_size(mut self, size: u32) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Year written into new hymn metadata.
    #[must_use]
    pub const fn with_year(mut self, year: Option<u16>) -> Self {
        self.year = year;
        self
    }

    /// Leave hymns that already have extracted content untouched.
    #[must_use]
    pub const fn skip_existing(mut self, skip: bool) -> Self {
        self.skip_existing = skip;
        self
    }

    /// The store written to.
    pub const fn store(&self) -> &HymnStore {
        &self.store
    }

    /// Process pages `start..=end` in order.
    pub fn run(&self, pages: RangeInclusive<u32>) -> BatchSummary {
        let mut summary = BatchSummary::default();
        let (start, end) = (*pages.start(), *pages.end());
        tracing::info!("Processing hymns {start}-{end} with {}", self.engine.name());

        let mut batch_start = start;
        while batch_start <= end {
            let batch_end = batch_start.saturating_add(self.batch_size - 1).min(end);
            tracing::info!("=== Processing batch {batch_start}-{batch_end} ===");
            for page in batch_start..=batch_end {
                summary.record(page, self.process_page(page));
            }
            match batch_end.checked_add(1) {
                Some(next) => batch_start = next,
                None => break,
            }
        }

        tracing::info!(
            "Batch complete: {} saved, {} not extracted, {} missing images, {} failed",
            summary.saved.len(),
            summary.not_extracted.len(),
            summary.missing_images.len(),
            summary.failed.len()
        );
        summary
    }

    /// Process a single page. Errors are OCR or storage failures for that page only.
    pub fn process_page(&self, page: u32) -> Result<PageOutcome> {
        if self.skip_existing {
            match self.store.status_of(page) {
                Ok(Some(ExtractionStatus::ContentExtracted)) => return Ok(PageOutcome::AlreadyExtracted),
                Ok(_) => {}
                Err(e) => tracing::warn!("Stored hymn {page} is unreadable, extracting again: {e}"),
            }
        }

        let image = page_image_path(&self.images_dir, &self.page_prefix, page);
        if !image.is_file() {
            return Ok(PageOutcome::MissingImage(image));
        }

        tracing::info!("Processing hymn {page}: {}", image.display());
        let raw = self.engine.run_ocr(&PageRef::new(page, image))?;
        if raw.is_blank() {
            tracing::debug!("{} returned no text for page {page}", self.engine.name());
        }

        match self.extractor.extract_hymn(page, &raw) {
            Ok(record) => {
                self.store.save_record(&record, self.year)?;
                Ok(PageOutcome::Saved(record.id))
            }
            Err(reason) => Ok(PageOutcome::NotExtracted(reason)),
        }
    }
}
