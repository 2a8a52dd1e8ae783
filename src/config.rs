//! Application configuration.
//!
//! Handles loading configuration from environment variables and .env files.

use dotenv::dotenv;
use std::env;
use std::path::{Path, PathBuf};

use crate::constants::batch::{DEFAULT_BATCH_SIZE, DEFAULT_LANGUAGE, DEFAULT_TESSERACT};
use crate::error::{Error, Result};
use crate::extract::Heuristics;
use crate::types::{HymnalCode, LanguageCode};

/// Configuration for one hymnal volume.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository root holding `data/sources` and `data/processed`
    pub base_dir: PathBuf,
    /// Hymnal being processed
    pub hymnal: HymnalCode,
    /// Language of the hymn texts
    pub language: LanguageCode,
    /// Publication year written into hymn metadata
    pub year: Option<u16>,
    /// File name prefix of page images (`{prefix}{n:03}.png`)
    pub page_prefix: String,
    /// Tesseract executable
    pub tesseract_path: PathBuf,
    /// Pages per logged batch
    pub batch_size: u32,
    /// Extraction heuristics, defaults unless overridden from a file
    pub heuristics: Heuristics,
}

impl Config {
    /// Configuration with defaults for a hymnal rooted at `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>, hymnal: HymnalCode) -> Self {
        Self {
            base_dir: base_dir.into(),
            hymnal,
            language: LanguageCode::new(DEFAULT_LANGUAGE),
            year: None,
            page_prefix: String::new(),
            tesseract_path: PathBuf::from(DEFAULT_TESSERACT),
            batch_size: DEFAULT_BATCH_SIZE,
            heuristics: Heuristics::default(),
        }
    }

    /// Load configuration from environment variables
    pub fn load() -> Result<Self> {
        // Try to load .env file if present
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`Config::load`], but uses `fallback` when `HYMNAL_CODE` is unset.
    /// Every other configuration error is still reported.
    pub fn load_or(fallback: &HymnalCode) -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(with_fallback_hymnal(|key| env::var(key).ok(), fallback))
    }

    /// Build configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let hymnal = lookup("HYMNAL_CODE")
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| Error::config("HYMNAL_CODE is not set", "Set HYMNAL_CODE to the hymnal's short code, e.g. HYMNAL_CODE=HT1886"))?;

        // Base dir: env var override, or default ~/hymnals
        let base_dir = lookup("HYMNAL_BASE_DIR").map_or_else(
            || dirs::home_dir().map_or_else(|| PathBuf::from("."), |h| h.join("hymnals")),
            |path| PathBuf::from(shellexpand::tilde(&path).to_string()),
        );

        let mut config = Self::new(base_dir, HymnalCode::new(hymnal.trim()));

        if let Some(language) = lookup("HYMNAL_LANGUAGE").filter(|l| !l.trim().is_empty()) {
            config.language = LanguageCode::new(language.trim());
        }

        if let Some(year) = lookup("HYMNAL_YEAR") {
            let year = year
                .trim()
                .parse::<u16>()
                .map_err(|_| Error::config(format!("HYMNAL_YEAR {year:?} is not a year"), "Use a four digit year, e.g. HYMNAL_YEAR=1886"))?;
            config.year = Some(year);
        }

        if let Some(prefix) = lookup("HYMNAL_PAGE_PREFIX") {
            config.page_prefix = prefix;
        }

        if let Some(path) = lookup("TESSERACT_PATH") {
            config.tesseract_path = PathBuf::from(shellexpand::tilde(&path).to_string());
        }

        // Batch size can be configured, invalid values keep the default
        if let Some(size) = lookup("BATCH_SIZE").and_then(|s| s.trim().parse::<u32>().ok()) {
            if size > 0 {
                config.batch_size = size;
            }
        }

        if let Some(path) = lookup("HYMNAL_HEURISTICS") {
            let path = PathBuf::from(shellexpand::tilde(&path).to_string());
            config.heuristics = Heuristics::from_file(&path)?;
            tracing::info!("Loaded extraction heuristics from {}", path.display());
        }

        Ok(config)
    }

    /// Directory of scanned page images.
    pub fn images_dir(&self) -> PathBuf {
        self.base_dir.join("data").join("sources").join("images").join(self.hymnal.as_str())
    }

    /// Directory of hymn JSON files.
    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join("data").join("processed").join("hymns").join(self.hymnal.as_str())
    }

    /// Directory for reports such as processing statistics.
    pub fn indices_dir(&self) -> PathBuf {
        self.base_dir.join("data").join("processed").join("indices").join(self.hymnal.as_str())
    }

    /// Directory for author, theme and first-line indices.
    pub fn metadata_dir(&self) -> PathBuf {
        self.base_dir.join("data").join("processed").join("metadata").join(self.hymnal.as_str())
    }

    /// Directory of hymnal collection summaries, shared by all hymnals.
    pub fn hymnals_dir(&self) -> PathBuf {
        self.base_dir.join("data").join("processed").join("hymnals")
    }

    /// Image path for a page number.
    pub fn page_image(&self, page: u32) -> PathBuf {
        page_image_path(&self.images_dir(), &self.page_prefix, page)
    }
}

/// Wrap `lookup` so a missing or blank `HYMNAL_CODE` resolves to `fallback`.
fn with_fallback_hymnal(
    lookup: impl Fn(&str) -> Option<String>,
    fallback: &HymnalCode,
) -> impl Fn(&str) -> Option<String> {
    let fallback = fallback.as_str().to_string();
    move |key| {
        let value = lookup(key);
        if key == "HYMNAL_CODE" && value.as_deref().is_none_or(|v| v.trim().is_empty()) {
            return Some(fallback.clone());
        }
        value
    }
}

/// `{dir}/{prefix}{page:03}.png`
pub fn page_image_path(dir: &Path, prefix: &str, page: u32) -> PathBuf {
    dir.join(format!(
        "{prefix}{page:03}.{}",
        crate::constants::batch::PAGE_IMAGE_EXTENSION
    ))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn requires_hymnal_code() {
        match Config::from_lookup(lookup(&[])) {
            Err(Error::Config { hint, .. }) => assert!(hint.contains("HYMNAL_CODE")),
            other => panic!("Expected config error, got {other:?}"),
        }
    }

    #[test]
    fn defaults_and_derived_dirs() {
        let config = Config::from_lookup(lookup(&[("HYMNAL_CODE", "HT1886"), ("HYMNAL_BASE_DIR", "/data/ah")])).unwrap();
        assert_eq!(config.language.as_str(), "en");
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
        assert_eq!(config.images_dir(), PathBuf::from("/data/ah/data/sources/images/HT1886"));
        assert_eq!(config.output_dir(), PathBuf::from("/data/ah/data/processed/hymns/HT1886"));
        assert_eq!(config.indices_dir(), PathBuf::from("/data/ah/data/processed/indices/HT1886"));
        assert_eq!(config.metadata_dir(), PathBuf::from("/data/ah/data/processed/metadata/HT1886"));
        assert_eq!(config.hymnals_dir(), PathBuf::from("/data/ah/data/processed/hymnals"));
        assert_eq!(config.page_image(7), PathBuf::from("/data/ah/data/sources/images/HT1886/007.png"));
    }

    #[test]
    fn reads_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("HYMNAL_CODE", "HSAB"),
            ("HYMNAL_BASE_DIR", "/data/ah"),
            ("HYMNAL_LANGUAGE", "de"),
            ("HYMNAL_YEAR", "1849"),
            ("HYMNAL_PAGE_PREFIX", "page-"),
            ("BATCH_SIZE", "25"),
        ]))
        .unwrap();
        assert_eq!(config.language.as_str(), "de");
        assert_eq!(config.year, Some(1849));
        assert_eq!(config.batch_size, 25);
        assert_eq!(config.page_image(121), PathBuf::from("/data/ah/data/sources/images/HSAB/page-121.png"));
    }

    #[test]
    fn invalid_year_is_config_error() {
        let result = Config::from_lookup(lookup(&[("HYMNAL_CODE", "HSAB"), ("HYMNAL_YEAR", "eighteen")]));
        assert!(matches!(result, Err(Error::Config { .. })));
    }

    #[test]
    fn zero_batch_size_keeps_default() {
        let config = Config::from_lookup(lookup(&[("HYMNAL_CODE", "HSAB"), ("BATCH_SIZE", "0")])).unwrap();
        assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn fallback_hymnal_only_replaces_missing_code() {
        let debug = HymnalCode::from("DEBUG");

        let config = Config::from_lookup(with_fallback_hymnal(lookup(&[]), &debug)).unwrap();
        assert_eq!(config.hymnal, debug);

        let config = Config::from_lookup(with_fallback_hymnal(lookup(&[("HYMNAL_CODE", "SDAH")]), &debug)).unwrap();
        assert_eq!(config.hymnal.as_str(), "SDAH");
    }

    #[test]
    fn fallback_hymnal_keeps_other_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heuristics.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = Config::from_lookup(with_fallback_hymnal(
            lookup(&[("HYMNAL_HEURISTICS", path.to_str().unwrap())]),
            &HymnalCode::from("DEBUG"),
        ));
        assert!(matches!(result, Err(Error::Parse { .. })));
    }

    #[test]
    fn heuristics_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("heuristics.json");
        std::fs::write(&path, r#"{ "title_min_len": 8 }"#).unwrap();

        let config = Config::from_lookup(lookup(&[
            ("HYMNAL_CODE", "HSAB"),
            ("HYMNAL_HEURISTICS", path.to_str().unwrap()),
        ]))
        .unwrap();
        assert_eq!(config.heuristics.title_min_len, 8);
    }
}
