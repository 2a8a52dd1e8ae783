//! Metadata indices derived from stored hymns.
//!
//! Authors, keyword themes and first lines come from hymns with real content;
//! placeholder templates carry no text worth indexing and are left out. The
//! collection summary lists every hymn file so the volume's numbering is
//! complete.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::index::{AUTHORS_FILE, COLLECTION_SUFFIX, FIRST_LINES_FILE, THEMES_FILE, THEME_KEYWORDS};
use crate::error::Result;
use crate::extract::normalize::collapse_whitespace;
use crate::store::{write_json, ExtractionStatus, HymnStore, StoredHymn};
use crate::types::{HymnId, HymnalCode, LanguageCode};

/// An author and the hymns attributed to them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorEntry {
    /// Lowercase slug with every other character replaced by `_`.
    pub id: String,
    /// Name as written in the hymn files.
    pub name: String,
    /// Hymns by this author, in number order.
    pub hymns: Vec<HymnId>,
}

/// One line of the collection's table of contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionEntry {
    /// Hymn number.
    pub number: u32,
    /// Hymn identifier.
    pub hymn_id: HymnId,
    /// Hymn title.
    pub title: String,
}

/// Totals for a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    /// Hymn files in the collection.
    pub total_hymns: usize,
    /// Languages present.
    pub languages: Vec<LanguageCode>,
    /// Themes found by the themes index.
    pub themes: Vec<String>,
}

/// Summary of a hymnal volume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HymnalCollection {
    /// Hymnal code.
    pub id: HymnalCode,
    /// Language of the volume.
    pub language: LanguageCode,
    /// Publication year, when configured.
    pub year: Option<u16>,
    /// Hymns in number order.
    pub hymns: Vec<CollectionEntry>,
    /// Totals.
    pub metadata: CollectionMetadata,
}

/// Every index for one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataIndex {
    /// Authors keyed by name.
    pub authors: BTreeMap<String, AuthorEntry>,
    /// Hymn ids keyed by theme.
    pub themes: BTreeMap<String, Vec<HymnId>>,
    /// First phrase of each hymn's first verse.
    pub first_lines: BTreeMap<HymnId, String>,
    /// Collection summary.
    pub collection: HymnalCollection,
}

impl MetadataIndex {
    /// Build all indices from the hymns in `store`.
    pub fn build(store: &HymnStore, year: Option<u16>) -> Self {
        let hymns = store.load_all();
        let content: Vec<StoredHymn> = hymns
            .iter()
            .filter(|h| h.metadata.extraction_status != ExtractionStatus::TemplateCreated)
            .cloned()
            .collect();
        tracing::info!("Indexing {} of {} hymns (templates skipped)", content.len(), hymns.len());

        let themes = themes_index(&content);
        let collection = HymnalCollection {
            id: store.hymnal().clone(),
            language: store.language().clone(),
            year,
            hymns: hymns
                .iter()
                .map(|h| CollectionEntry { number: h.number, hymn_id: h.id.clone(), title: h.title.clone() })
                .collect(),
            metadata: CollectionMetadata {
                total_hymns: hymns.len(),
                languages: vec![store.language().clone()],
                themes: themes.keys().cloned().collect(),
            },
        };

        Self { authors: authors_index(&content), themes, first_lines: first_lines_index(&content), collection }
    }

    /// Write the author, theme and first-line indices into `metadata_dir` and
    /// the collection into `hymnals_dir`. Returns the files written.
    pub fn write_to(&self, metadata_dir: &Path, hymnals_dir: &Path) -> Result<Vec<PathBuf>> {
        let authors = metadata_dir.join(AUTHORS_FILE);
        write_json(&authors, &self.authors)?;
        let themes = metadata_dir.join(THEMES_FILE);
        write_json(&themes, &self.themes)?;
        let first_lines = metadata_dir.join(FIRST_LINES_FILE);
        write_json(&first_lines, &self.first_lines)?;
        let collection = hymnals_dir.join(format!("{}{COLLECTION_SUFFIX}", self.collection.id));
        write_json(&collection, &self.collection)?;
        Ok(vec![authors, themes, first_lines, collection])
    }
}

/// Authors keyed by trimmed name. Hymns without an author are skipped.
pub fn authors_index(hymns: &[StoredHymn]) -> BTreeMap<String, AuthorEntry> {
    let mut authors: BTreeMap<String, AuthorEntry> = BTreeMap::new();
    for hymn in hymns {
        let Some(name) = hymn.author.as_deref().map(str::trim).filter(|a| !a.is_empty()) else {
            continue;
        };
        authors
            .entry(name.to_string())
            .or_insert_with(|| AuthorEntry { id: author_slug(name), name: name.to_string(), hymns: Vec::new() })
            .hymns
            .push(hymn.id.clone());
    }
    authors
}

fn author_slug(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Hymns tagged with each theme whose keywords appear in the title or verses.
///
/// Matching is a lowercase substring search, so `"lord"` also tags `"Lordship"`.
pub fn themes_index(hymns: &[StoredHymn]) -> BTreeMap<String, Vec<HymnId>> {
    let mut themes: BTreeMap<String, Vec<HymnId>> = BTreeMap::new();
    for hymn in hymns {
        let text = searchable_text(hymn);
        for (theme, keywords) in THEME_KEYWORDS {
            if keywords.iter().any(|k| text.contains(k)) {
                themes.entry((*theme).to_string()).or_default().push(hymn.id.clone());
            }
        }
    }
    themes
}

fn searchable_text(hymn: &StoredHymn) -> String {
    let verses: Vec<&str> = hymn.verses.iter().map(|v| v.text.as_str()).collect();
    format!("{} {}", hymn.title, verses.join(" ")).to_lowercase()
}

/// First phrase of each hymn's first verse, keyed by hymn id.
pub fn first_lines_index(hymns: &[StoredHymn]) -> BTreeMap<HymnId, String> {
    hymns
        .iter()
        .filter_map(|hymn| {
            let line = first_phrase(&hymn.verses.first()?.text);
            if line.is_empty() {
                None
            } else {
                Some((hymn.id.clone(), line))
            }
        })
        .collect()
}

/// Text up to the first `,` or `;`, whitespace collapsed.
pub fn first_phrase(text: &str) -> String {
    let text = collapse_whitespace(text);
    text.split(|c: char| c == ',' || c == ';').next().unwrap_or_default().trim().to_string()
}
