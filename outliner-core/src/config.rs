use anyhow::Context;
use regex::Regex;

/// Phrases that only ever show up in running headers, footers and letterheads
/// of the reference corpus. Matched case-insensitively anywhere in a line.
const BOILERPLATE_PATTERNS: &[&str] = &[
    r"boscha{0,1}\s+north\s+america",
    r"mutual\s+nda",
    r"rev\.\s*\d{4}\.\d{2}\.\d{2}",
    r"gretchen whitmer",
    r"by the governor",
    r"secretary of state",
    r"\d{1,3}\s+(?:south|north|east|west)?\s*capitol",
    r"george w\. romney building",
    r"printed in-house",
    r"rfp:\s+to\s+develop\s+the\s+ontario\s+digital\s+library\s+business\s+plan\s+march\s+\d{4}",
    r"ontario's\s+libraries",
    r"working\s+together",
    r"connecting\s+ontarians!",
];

/// Page numbers, URLs, status and metadata markers, separator rules.
const NON_CONTENT_PATTERNS: &[&str] = &[
    r"^\s*\d+\s*$",
    r"^\s*-\s*\d+\s*-\s*$",
    r"^\s*page\s+\d+\s*$",
    r"^\s*page\s+\d+\s+of\s+\d+\s*$",
    r"^\s*([ivxlcdm]+|[a-z])\s*$",
    r"www\.",
    r"\.gov",
    r"\.org",
    r"\.com",
    r"confidential",
    r"proprietar",
    r"draft",
    r"author",
    r"doi:",
    r"copyright",
    r"version\s*\d",
    r"all\s+rights\s+reserved",
    r"contact\s+information",
    r"revision\s+history",
    r"document\s+id",
    r"file\s+id",
    r"^\s*[*#\-_=\s]{3,}$",
    r"^\s*(?:p\.?|pg\.?)\s*\d+\s*$",
];

const HEADING_PATTERNS: &[&str] = &[
    // Chapter 1, Section II, Appendix 3.2
    r"(?i)^\s*(?:Chapter|Section|Part|Appendix)\s+(?:\d+|[IVXLCDM]+)(?:\.\d+)*\s*[:.]?$",
    // 1. Introduction, 2.1 Main Point
    r"(?i)^\s*\d+(\.\d+)*\.?\s*[A-Z].*?[:.]?$",
    // II General Provisions
    r"(?i)^\s*[IVXLCDM]+\s+[A-Z].*?[:.]?$",
    // ALL CAPS runs
    r"(?i)^[A-Z][A-Z\s]{5,}\s*$",
    // Title Case
    r"(?i)^[A-Z][a-z]+(?:\s+[A-Z][a-z]*)*\s*[:.]?$",
    // (a) Sub-item
    r"(?i)^\s*\([a-z]\)\s+[A-Z].*?[:.]?$",
    // a. Sub-item
    r"(?i)^\s*[a-z]\.\s+[A-Z].*?[:.]?$",
];

const CUE_WORDS: &[&str] = &[
    "introduction",
    "conclusion",
    "summary",
    "overview",
    "background",
    "methodology",
    "results",
    "discussion",
    "references",
    "appendix",
    "chapter",
    "section",
    "abstract",
    "acknowledgments",
    "bibliography",
    "annex",
    "preface",
    "foreword",
    "table of contents",
    "list of figures",
    "list of tables",
    "definitions",
    "scope",
    "purpose",
    "policy",
    "procedure",
    "executive summary",
    "terms and conditions",
    "legal",
    "analysis",
    "findings",
    "evaluation",
    "award",
    "timeline",
    "milestones",
    "approach",
    "requirements",
    "principles",
    "access",
    "guidance",
    "training",
    "purchasing",
    "technological",
    "mean",
    "developed",
    "criteria",
    "process",
    "membership",
    "chair",
    "meetings",
    "accountability",
    "communication",
    "financial",
    "administrative",
    "policies",
    "preamble",
    "terms of reference",
];

fn compile(pattern: &str) -> anyhow::Result<Regex> {
    Regex::new(pattern).with_context(|| format!("invalid pattern {pattern:?}"))
}

fn compile_all<'a>(
    patterns: impl IntoIterator<Item = &'a str>,
    case_insensitive: bool,
) -> anyhow::Result<Vec<Regex>> {
    patterns
        .into_iter()
        .map(|p| {
            if case_insensitive {
                compile(&format!("(?i){p}"))
            } else {
                compile(p)
            }
        })
        .collect()
}

/// Every regular expression the pipeline uses, compiled once.
#[derive(Debug, Clone)]
pub struct Patterns {
    pub non_content: Vec<Regex>,
    pub heading: Vec<Regex>,
    pub cue_words: Vec<String>,
    /// Leading enumeration token: `1.`, `1.1`, `A.`, `(a)`, `1)`.
    pub enumeration: Regex,
    /// Short tokens kept even though they are under the minimum length.
    pub short_token: Regex,
    pub whitespace: Regex,
    pub hf_trailing_counter: Regex,
    pub hf_date: Regex,
    pub hf_hash: Regex,
    /// Text ending in `<digits>.`, i.e. a period that closes an enumeration.
    pub enumeration_period: Regex,
    pub bare_number: Regex,
    pub level_three_part: Regex,
    pub level_two_part: Regex,
    pub level_single: Regex,
    pub level_roman: Regex,
    pub level_letter_paren: Regex,
    pub level_letter_dot: Regex,
}

impl Patterns {
    pub fn new(extra_boilerplate: &[&str]) -> anyhow::Result<Self> {
        let non_content = compile_all(
            NON_CONTENT_PATTERNS
                .iter()
                .chain(BOILERPLATE_PATTERNS)
                .chain(extra_boilerplate)
                .copied(),
            true,
        )?;

        Ok(Self {
            non_content,
            heading: compile_all(HEADING_PATTERNS.iter().copied(), false)?,
            cue_words: CUE_WORDS.iter().map(|w| w.to_string()).collect(),
            enumeration: compile(r"^\s*(\d+(\.\d+)*\.?|[A-Z][a-zA-Z]*\.|\([a-zA-Z]\)|\d+\))\s*")?,
            short_token: compile(r"^\s*(\d+\.?|\([a-zA-Z]\)|\w\.|\s*[*+-]\s*)$")?,
            whitespace: compile(r"\s+")?,
            hf_trailing_counter: compile(r"(\d+\s*of\s*\d+|\s*page\s*\d+\s*|-\s*\d+\s*-|\d+)$")?,
            hf_date: compile(r"\d{4}-\d{2}-\d{2}")?,
            hf_hash: compile(r"[0-9a-f]{32}")?,
            enumeration_period: compile(r".*\d+\.$")?,
            bare_number: compile(r"^\d+\.?$")?,
            level_three_part: compile(r"^\s*\d+\.\d+\.\d+(\.\d+)*\s+")?,
            level_two_part: compile(r"^\s*\d+\.\d+\s+")?,
            level_single: compile(r"^\s*\d+\s+")?,
            level_roman: compile(r"^\s*[IVXLCDM]+\s+")?,
            level_letter_paren: compile(r"^\s*[a-zA-Z]\.?\s*\)")?,
            level_letter_dot: compile(r"^\s*[a-zA-Z]\s*\.\s+")?,
        })
    }

    /// Search on the trimmed, lower-cased text.
    pub fn is_non_content(&self, text: &str) -> bool {
        let lowered = text.trim().to_lowercase();
        self.non_content.iter().any(|p| p.is_match(&lowered))
    }

    pub fn has_cue_word(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        self.cue_words.iter().any(|w| lowered.contains(w.as_str()))
    }

    pub fn matches_heading_pattern(&self, text: &str) -> bool {
        self.heading.iter().any(|p| p.is_match(text))
    }

    /// Collapse whitespace runs to one space and trim.
    pub fn collapse_whitespace(&self, text: &str) -> String {
        self.whitespace.replace_all(text, " ").trim().to_owned()
    }
}

/// Tunables and compiled patterns of the outline pipeline.
///
/// Built once and passed by reference to every stage; nothing in the pipeline
/// reads global state.
#[derive(Debug, Clone)]
pub struct OutlineConfig {
    /// Header zone: top fraction of the page height.
    pub hf_top_zone_ratio: f64,
    /// Footer zone: bottom fraction of the page height.
    pub hf_bottom_zone_ratio: f64,
    /// A header/footer must repeat on at least this many pages...
    pub hf_min_pages: usize,
    /// ...and on at least this fraction of all pages.
    pub hf_repetition_ratio: f64,
    /// Only the first pages feed the repetition census.
    pub hf_scan_pages: usize,
    pub hf_y_bucket: f32,
    /// Normalized header/footer texts of this length or shorter are ignored.
    pub hf_min_text_len: usize,
    /// Lines shorter than this (trimmed) are dropped unless they are an accepted short token.
    pub min_line_len: usize,

    pub heading_score_threshold: f32,
    pub min_heading_font_ratio: f64,
    pub max_heading_word_count: usize,
    pub max_headings: usize,
    /// Accepted headings shorter than this after normalization are rejected.
    pub min_heading_len: usize,

    pub default_font_size: f32,
    pub default_page_width: f32,
    pub default_page_height: f32,

    /// Title lines must start above this y.
    pub title_region: f32,
    pub placeholder_title: String,

    pub patterns: Patterns,
}

impl OutlineConfig {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_boilerplate(&[])
    }

    /// Same defaults, with extra case-insensitive non-content patterns.
    pub fn with_boilerplate(extra: &[&str]) -> anyhow::Result<Self> {
        Ok(Self {
            hf_top_zone_ratio: 0.06,
            hf_bottom_zone_ratio: 0.06,
            hf_min_pages: 3,
            hf_repetition_ratio: 0.75,
            hf_scan_pages: 10,
            hf_y_bucket: 5.0,
            hf_min_text_len: 3,
            min_line_len: 5,
            heading_score_threshold: 75.0,
            min_heading_font_ratio: 1.3,
            max_heading_word_count: 18,
            max_headings: 150,
            min_heading_len: 5,
            default_font_size: 12.0,
            default_page_width: 595.0,
            default_page_height: 842.0,
            title_region: 200.0,
            placeholder_title: "Document".to_owned(),
            patterns: Patterns::new(extra).context("can't compile outline patterns")?,
        })
    }
}
