//! JSON-per-hymn storage.
//!
//! Each hymn lives in `{dir}/{hymnal}-{language}-{number:03}.json`. Files carry
//! the extracted record plus bookkeeping metadata, most importantly whether the
//! content was really extracted or is still a placeholder template.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::constants::batch::{DEFAULT_COPYRIGHT, TEMPLATE_TITLE, TEMPLATE_VERSE};
use crate::drafts::{ContentSource, HymnDraft};
use crate::error::{Error, Result};
use crate::extract::{HymnRecord, Verse};
use crate::types::{HymnId, HymnalCode, LanguageCode};

/// How far extraction got for a stored hymn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStatus {
    /// Title and verses came from a real extraction.
    ContentExtracted,
    /// Placeholder written so the hymn number exists.
    TemplateCreated,
    /// Written by an older tool without a status.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Bookkeeping stored alongside a hymn.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HymnMetadata {
    /// Publication year of the hymnal.
    pub year: Option<u16>,
    /// Copyright notice.
    pub copyright: Option<String>,
    /// Subject themes.
    pub themes: Vec<String>,
    /// Related scripture references.
    pub scripture_references: Vec<String>,
    /// Where the tune was taken from.
    pub tune_source: Option<String>,
    /// Language the hymn was first written in.
    pub original_language: Option<LanguageCode>,
    /// Extraction progress.
    pub extraction_status: ExtractionStatus,
}

impl HymnMetadata {
    fn new(language: &LanguageCode, status: ExtractionStatus, year: Option<u16>) -> Self {
        Self {
            year,
            copyright: Some(DEFAULT_COPYRIGHT.to_string()),
            original_language: Some(language.clone()),
            extraction_status: status,
            ..Self::default()
        }
    }
}

/// On-disk shape of a hymn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredHymn {
    /// Stable identifier.
    pub id: HymnId,
    /// Hymn number.
    pub number: u32,
    /// Title.
    pub title: String,
    /// Text author.
    #[serde(default)]
    pub author: Option<String>,
    /// Tune composer.
    #[serde(default)]
    pub composer: Option<String>,
    /// Tune name.
    #[serde(default)]
    pub tune: Option<String>,
    /// Metrical pattern.
    #[serde(default)]
    pub meter: Option<String>,
    /// Language of the text.
    pub language: LanguageCode,
    /// Verses in order.
    pub verses: Vec<Verse>,
    /// Bookkeeping.
    #[serde(default)]
    pub metadata: HymnMetadata,
}

impl StoredHymn {
    /// Wrap a pipeline record as extracted content.
    pub fn from_record(record: &HymnRecord, year: Option<u16>) -> Self {
        Self {
            id: record.id.clone(),
            number: record.number,
            title: record.title.clone(),
            author: None,
            composer: None,
            tune: None,
            meter: None,
            language: record.language.clone(),
            verses: record.verses.clone(),
            metadata: HymnMetadata::new(&record.language, ExtractionStatus::ContentExtracted, year),
        }
    }

    /// Placeholder for a hymn whose content has not been extracted yet.
    pub fn template(id: HymnId, number: u32, language: &LanguageCode, year: Option<u16>) -> Self {
        Self {
            id,
            number,
            title: TEMPLATE_TITLE.replace("{n}", &number.to_string()),
            author: None,
            composer: None,
            tune: None,
            meter: None,
            language: language.clone(),
            verses: vec![Verse { number: 1, text: TEMPLATE_VERSE.to_string() }],
            metadata: HymnMetadata::new(language, ExtractionStatus::TemplateCreated, year),
        }
    }

    /// Merge draft content over this hymn. Fields the draft leaves empty are kept.
    pub fn apply_draft(&mut self, draft: &HymnDraft) {
        self.title.clone_from(&draft.title);
        overwrite(&mut self.author, draft.author.as_deref());
        overwrite(&mut self.composer, draft.composer.as_deref());
        overwrite(&mut self.tune, draft.tune.as_deref());
        overwrite(&mut self.meter, draft.meter.as_deref());
        if !draft.verses.is_empty() {
            self.verses.clone_from(&draft.verses);
        }
        if !draft.themes.is_empty() {
            self.metadata.themes.clone_from(&draft.themes);
        }
        if let (Some(tune), Some(composer)) = (&draft.tune, &draft.composer) {
            self.metadata.tune_source = Some(format!("{tune}, {composer}"));
        }
        self.metadata.extraction_status = ExtractionStatus::ContentExtracted;
    }
}

fn overwrite(field: &mut Option<String>, value: Option<&str>) {
    if let Some(value) = value {
        *field = Some(value.to_string());
    }
}

/// Directory of hymn JSON files for one hymnal and language.
#[derive(Debug, Clone)]
pub struct HymnStore {
    dir: PathBuf,
    hymnal: HymnalCode,
    language: LanguageCode,
}

impl HymnStore {
    /// Open a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>, hymnal: HymnalCode, language: LanguageCode) -> Self {
        Self { dir: dir.into(), hymnal, language }
    }

    /// Root directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Hymnal code of the stored hymns.
    pub const fn hymnal(&self) -> &HymnalCode {
        &self.hymnal
    }

    /// Language of the stored hymns.
    pub const fn language(&self) -> &LanguageCode {
        &self.language
    }

    /// Identifier for a hymn number.
    pub fn id_for(&self, number: u32) -> HymnId {
        HymnId::new(&self.hymnal, &self.language, number)
    }

    /// File path for a hymn number.
    pub fn path_for(&self, number: u32) -> PathBuf {
        self.dir.join(self.id_for(number).file_name())
    }

    /// Write a hymn, replacing any existing file.
    pub fn save(&self, hymn: &StoredHymn) -> Result<PathBuf> {
        let path = self.path_for(hymn.number);
        write_json(&path, hymn)?;
        Ok(path)
    }

    /// Write a pipeline record as extracted content.
    pub fn save_record(&self, record: &HymnRecord, year: Option<u16>) -> Result<PathBuf> {
        self.save(&StoredHymn::from_record(record, year))
    }

    /// Read a hymn, or `None` when no file exists for the number.
    pub fn load(&self, number: u32) -> Result<Option<StoredHymn>> {
        let path = self.path_for(number);
        if !path.is_file() {
            return Ok(None);
        }
        let data = fs_err::read_to_string(&path)?;
        serde_json::from_str(&data)
            .map(Some)
            .map_err(|e| Error::parse(e.to_string(), path))
    }

    /// Every readable hymn, in number order. Unreadable files are logged and skipped.
    pub fn load_all(&self) -> Vec<StoredHymn> {
        self.existing_numbers()
            .into_iter()
            .filter_map(|number| match self.load(number) {
                Ok(hymn) => hymn,
                Err(e) => {
                    tracing::warn!("Skipping hymn {number}: {e}");
                    None
                }
            })
            .collect()
    }

    /// Hymn numbers that have a file, judged by file name alone.
    pub fn existing_numbers(&self) -> BTreeSet<u32> {
        let prefix = format!("{}-{}-", self.hymnal, self.language);
        WalkDir::new(&self.dir)
            .max_depth(1)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                let name = e.file_name().to_str()?;
                let digits = name.strip_prefix(&prefix)?.strip_suffix(".json")?;
                if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                digits.parse().ok()
            })
            .collect()
    }

    /// Extraction status of a stored hymn.
    pub fn status_of(&self, number: u32) -> Result<Option<ExtractionStatus>> {
        Ok(self.load(number)?.map(|h| h.metadata.extraction_status))
    }

    /// Write placeholder hymns for every number in `range` without a file.
    ///
    /// Returns the numbers that were created.
    pub fn create_missing_templates(&self, range: RangeInclusive<u32>, year: Option<u16>) -> Result<Vec<u32>> {
        let existing = self.existing_numbers();
        let mut created = Vec::new();
        for number in range.filter(|n| !existing.contains(n)) {
            self.save(&StoredHymn::template(self.id_for(number), number, &self.language, year))?;
            tracing::info!("Created template for hymn {number}");
            created.push(number);
        }
        Ok(created)
    }

    /// Merge a draft into the stored hymn with the same number.
    ///
    /// Returns `false` when no file exists for that number.
    pub fn apply_draft(&self, draft: &HymnDraft) -> Result<bool> {
        let Some(mut hymn) = self.load(draft.number)? else {
            tracing::warn!("Hymn file {} does not exist", self.id_for(draft.number).file_name());
            return Ok(false);
        };
        hymn.apply_draft(draft);
        self.save(&hymn)?;
        tracing::info!("Updated hymn {} with extracted content", draft.number);
        Ok(true)
    }

    /// Merge drafts from `source` for each page into existing hymn files.
    ///
    /// Returns the hymn numbers that were updated.
    pub fn apply_drafts(&self, source: &dyn ContentSource, pages: &[u32]) -> Result<Vec<u32>> {
        let mut updated = Vec::new();
        for &page in pages {
            for draft in source.drafts_for_page(page)? {
                if self.apply_draft(&draft)? {
                    updated.push(draft.number);
                }
            }
        }
        tracing::info!("Extracted content for {} hymns", updated.len());
        Ok(updated)
    }
}

/// Write `value` as pretty JSON, creating parent directories as needed.
pub(crate) fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Store(format!("Failed to serialize {}: {e}", path.display())))?;
    fs_err::write(path, json)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;

    fn store(dir: &Path) -> HymnStore {
        HymnStore::new(dir, HymnalCode::from("HT1886"), LanguageCode::from("en"))
    }

    fn record(number: u32) -> HymnRecord {
        HymnRecord {
            id: HymnId::new(&HymnalCode::from("HT1886"), &LanguageCode::from("en"), number),
            number,
            title: "Rock of Ages".to_string(),
            language: LanguageCode::from("en"),
            verses: vec![Verse { number: 1, text: "Rock of ages cleft for me".to_string() }],
        }
    }

    fn draft(number: u32) -> HymnDraft {
        HymnDraft {
            number,
            title: "All People That on Earth Do Dwell".to_string(),
            author: Some("William Kethe".to_string()),
            composer: None,
            tune: Some("Old Hundredth".to_string()),
            meter: Some("L.M.".to_string()),
            verses: vec![Verse {
                number: 1,
                text: "All people that on earth do dwell,\nSing to the Lord with cheerful voice;".to_string(),
            }],
            themes: vec!["praise".to_string()],
        }
    }

    #[test]
    fn saves_and_loads_record() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        let path = store.save_record(&record(470), Some(1886)).unwrap();
        assert!(path.ends_with("HT1886-en-470.json"));

        let hymn = store.load(470).unwrap().unwrap();
        assert_eq!(hymn.title, "Rock of Ages");
        assert_eq!(hymn.metadata.year, Some(1886));
        assert_eq!(hymn.metadata.extraction_status, ExtractionStatus::ContentExtracted);
    }

    #[test]
    fn status_tag_is_snake_case_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let path = store.save_record(&record(5), None).unwrap();

        let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["metadata"]["extraction_status"], "content_extracted");
        assert_eq!(json["id"], "HT1886-en-005");
    }

    #[test]
    fn load_missing_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(dir.path()).load(1).unwrap().is_none());
    }

    #[test]
    fn loads_files_without_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        std::fs::write(
            store.path_for(12),
            r#"{"id":"HT1886-en-012","number":12,"title":"Holy Night","language":"en","verses":[]}"#,
        )
        .unwrap();

        let hymn = store.load(12).unwrap().unwrap();
        assert_eq!(hymn.metadata.extraction_status, ExtractionStatus::Unknown);
    }

    #[test]
    fn existing_numbers_reads_file_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        for name in ["HT1886-en-001.json", "HT1886-en-042.json", "HT1886-de-003.json", "SDAH-en-004.json", "HT1886-en-x.json", "notes.txt"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        assert_eq!(store.existing_numbers().into_iter().collect::<Vec<_>>(), vec![1, 42]);
    }

    #[test]
    fn existing_numbers_of_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(&dir.path().join("absent")).existing_numbers().is_empty());
    }

    #[test]
    fn templates_fill_only_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.save_record(&record(2), None).unwrap();

        let created = store.create_missing_templates(1..=3, Some(1886)).unwrap();
        assert_eq!(created, vec![1, 3]);

        let template = store.load(3).unwrap().unwrap();
        assert_eq!(template.title, "Hymn 3 (To be extracted)");
        assert_eq!(template.metadata.extraction_status, ExtractionStatus::TemplateCreated);
        assert_eq!(store.status_of(2).unwrap(), Some(ExtractionStatus::ContentExtracted));
    }

    #[test]
    fn draft_updates_existing_template() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.create_missing_templates(350..=350, None).unwrap();

        assert!(store.apply_draft(&draft(350)).unwrap());

        let hymn = store.load(350).unwrap().unwrap();
        assert_eq!(hymn.title, "All People That on Earth Do Dwell");
        assert_eq!(hymn.author.as_deref(), Some("William Kethe"));
        assert_eq!(hymn.meter.as_deref(), Some("L.M."));
        assert_eq!(hymn.metadata.themes, vec!["praise".to_string()]);
        assert_eq!(hymn.metadata.extraction_status, ExtractionStatus::ContentExtracted);
    }

    #[test]
    fn draft_without_file_is_not_applied() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!store(dir.path()).apply_draft(&draft(999)).unwrap());
    }

    #[test]
    fn drafts_are_applied_per_page() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.create_missing_templates(350..=351, None).unwrap();
        let source = crate::drafts::FixtureContentSource::from_json(
            r#"{ "120": [ { "number": 350, "title": "Old Hundredth" }, { "number": 999, "title": "Nowhere" } ] }"#,
        )
        .unwrap();

        assert_eq!(store.apply_drafts(&source, &[120, 121]).unwrap(), vec![350]);
        assert_eq!(store.status_of(350).unwrap(), Some(ExtractionStatus::ContentExtracted));
        assert_eq!(store.status_of(351).unwrap(), Some(ExtractionStatus::TemplateCreated));
    }

    #[test]
    fn load_all_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.save_record(&record(3), None).unwrap();
        store.save_record(&record(1), None).unwrap();
        std::fs::write(store.path_for(2), "{ truncated").unwrap();

        let numbers: Vec<u32> = store.load_all().iter().map(|h| h.number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn draft_keeps_fields_it_does_not_set() {
        let mut hymn = StoredHymn::from_record(&record(9), None);
        hymn.composer = Some("Thomas Hastings".to_string());
        hymn.apply_draft(&draft(9));
        assert_eq!(hymn.composer.as_deref(), Some("Thomas Hastings"));
        assert_eq!(hymn.metadata.tune_source, None);
    }

    #[test]
    fn draft_with_tune_and_composer_sets_tune_source() {
        let mut hymn = StoredHymn::from_record(&record(350), None);
        let mut d = draft(350);
        d.composer = Some("Guillaume Franc".to_string());
        hymn.apply_draft(&d);
        assert_eq!(hymn.metadata.tune_source.as_deref(), Some("Old Hundredth, Guillaume Franc"));
    }
}
