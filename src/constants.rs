//! Application constants.
//!
//! Centralizes the default heuristic thresholds and batch values. The
//! extraction defaults seed [`crate::extract::Heuristics`], which can be
//! overridden per hymnal.

/// Text normalization defaults.
pub mod normalize {
    /// Lines at or below this many characters are dropped.
    pub const SHORT_LINE_MAX: usize = 2;

    /// Letter/hyphen-only lines at or below this length are OCR noise.
    pub const NOISE_MAX_LEN: usize = 3;
}

/// Number and title detection defaults.
pub mod detect {
    /// Highest digit accepted as a verse marker (`"1."` through `"5."`).
    pub const MAX_VERSE_MARKER: u32 = 5;

    /// A title candidate must be longer than this.
    pub const TITLE_MIN_LEN: usize = 5;

    /// Letter/hyphen-only candidates at or below this length are rejected.
    pub const TITLE_NOISE_MAX_LEN: usize = 5;

    /// A cleaned title must be longer than this.
    pub const TITLE_CLEAN_MIN_LEN: usize = 3;

    /// Words that mark a line as a plausible hymn title.
    pub const SACRED_VOCABULARY: &[&str] = &[
        "Praise", "Lord", "God", "Jesus", "Christ", "Holy", "Come", "King", "Heaven", "My", "Soul",
    ];
}

/// Verse text cleaning defaults.
pub mod verse {
    /// Single-character tokens that survive cleaning (compared case-insensitively).
    pub const SINGLE_LETTER_WORDS: &[char] = &['a', 'i', 'o'];
}

/// Batch driver and store defaults.
pub mod batch {
    /// Pages processed per logged batch.
    pub const DEFAULT_BATCH_SIZE: u32 = 100;

    /// Default language code for hymn records.
    pub const DEFAULT_LANGUAGE: &str = "en";

    /// Default Tesseract executable.
    pub const DEFAULT_TESSERACT: &str = "tesseract";

    /// Image file extension of scanned pages.
    pub const PAGE_IMAGE_EXTENSION: &str = "png";

    /// Title written into placeholder hymns; `{n}` is the hymn number.
    pub const TEMPLATE_TITLE: &str = "Hymn {n} (To be extracted)";

    /// Verse text written into placeholder hymns.
    pub const TEMPLATE_VERSE: &str = "[Verse text to be extracted from image]";

    /// Copyright written into new hymn metadata.
    pub const DEFAULT_COPYRIGHT: &str = "Public Domain";

    /// File name of the processing statistics report.
    pub const STATS_FILE: &str = "processing-stats.json";

    /// File name of the extraction coverage report.
    pub const COVERAGE_FILE: &str = "extraction_coverage_report.json";
}

/// Metadata index files and keywords.
pub mod index {
    /// Authors index file name.
    pub const AUTHORS_FILE: &str = "authors.json";

    /// Themes index file name.
    pub const THEMES_FILE: &str = "themes.json";

    /// First lines index file name.
    pub const FIRST_LINES_FILE: &str = "first-lines.json";

    /// Suffix of the collection summary, after the hymnal code.
    pub const COLLECTION_SUFFIX: &str = "-collection.json";

    /// Themes and the lowercase keywords that tag a hymn with them.
    pub const THEME_KEYWORDS: &[(&str, &[&str])] = &[
        ("praise", &["praise", "glory", "honor", "worship", "adore", "exalt"]),
        ("salvation", &["salvation", "saved", "grace", "redemption", "forgiveness"]),
        ("jesus", &["jesus", "christ", "savior", "lord"]),
        ("god", &["god", "father", "almighty", "creator"]),
        ("holy_spirit", &["spirit", "holy ghost", "comforter"]),
        ("christmas", &["christmas", "bethlehem", "nativity", "born", "manger"]),
        ("easter", &["easter", "resurrection", "risen", "cross", "calvary"]),
        ("prayer", &["prayer", "pray", "commune", "talk"]),
        ("peace", &["peace", "rest", "calm", "quiet"]),
        ("love", &["love", "beloved", "dear"]),
        ("heaven", &["heaven", "eternal", "home", "glory"]),
        ("faith", &["faith", "trust", "believe", "confidence"]),
        ("hope", &["hope", "anchor", "future"]),
        ("service", &["service", "work", "labor", "mission"]),
        ("guidance", &["guide", "lead", "direction", "path", "way"]),
        ("creation", &["creation", "nature", "earth", "sky", "mountains"]),
    ];
}
