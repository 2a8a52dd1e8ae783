//! Hymn content drafts from sources other than OCR.
//!
//! A [`ContentSource`] returns whatever hymn content it knows for a page, for
//! example transcriptions prepared by hand or by an external model. The only
//! implementation shipped here reads a JSON fixture.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::extract::Verse;

/// Hymn content supplied for a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HymnDraft {
    /// Hymn number the content belongs to.
    pub number: u32,
    /// Hymn title.
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
    /// Metrical pattern (e.g. `L.M.`).
    #[serde(default)]
    pub meter: Option<String>,
    /// Verses in order.
    #[serde(default)]
    pub verses: Vec<Verse>,
    /// Subject themes.
    #[serde(default)]
    pub themes: Vec<String>,
}

/// Trait for hymn content providers keyed by page.
pub trait ContentSource {
    /// Drafts for every hymn found on a page. An empty list means nothing is known.
    fn drafts_for_page(&self, page: u32) -> Result<Vec<HymnDraft>>;
}

/// Content source backed by a JSON object keyed by page number.
///
/// ```json
/// { "122": [ { "number": 351, "title": "Come, Thou Almighty King", "verses": [] } ] }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FixtureContentSource {
    pages: BTreeMap<u32, Vec<HymnDraft>>,
}

impl FixtureContentSource {
    /// Load a fixture file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs_err::read_to_string(path)?;
        Self::from_json(&data).map_err(|e| match e {
            Error::Parse { message, .. } => Error::parse(message, path.to_path_buf()),
            other => other,
        })
    }

    /// Parse fixture JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<HymnDraft>> =
            serde_json::from_str(json).map_err(|e| Error::parse(e.to_string(), None))?;

        let mut pages = BTreeMap::new();
        for (key, drafts) in raw {
            let page = key
                .trim()
                .parse::<u32>()
                .map_err(|_| Error::parse(format!("page key {key:?} is not a number"), None))?;
            pages.insert(page, drafts);
        }
        Ok(Self { pages })
    }

    /// Pages that have drafts, ascending.
    pub fn pages(&self) -> impl Iterator<Item = u32> + '_ {
        self.pages.keys().copied()
    }
}

impl ContentSource for FixtureContentSource {
    fn drafts_for_page(&self, page: u32) -> Result<Vec<HymnDraft>> {
        Ok(self.pages.get(&page).cloned().unwrap_or_default())
    }
}
