use serde::{Deserialize, Serialize};

pub type PageID = usize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    #[inline(always)]
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    #[inline(always)]
    pub fn merge(&mut self, other: &Self) {
        self.x0 = self.x0.min(other.x0);
        self.y0 = self.y0.min(other.y0);
        self.x1 = self.x1.max(other.x1);
        self.y1 = self.y1.max(other.y1);
    }

    #[inline(always)]
    pub fn overlap_x(&self, other: &Self) -> f32 {
        f32::max(
            0f32,
            f32::min(self.x1, other.x1) - f32::max(self.x0, other.x0),
        )
    }

    /// Distance of the box's horizontal center from the middle of a page of width `page_width`.
    #[inline(always)]
    pub fn center_offset(&self, page_width: f32) -> f64 {
        ((self.x0 as f64 + self.x1 as f64) / 2.0 - page_width as f64 / 2.0).abs()
    }
}

/// Page geometry, indexed by 0-based page id.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct PageInfo {
    pub width: f32,
    pub height: f32,
}

/// One logical text line with every feature the heuristics look at.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub text: String,
    /// 1-based page number.
    pub page: usize,
    pub bbox: BBox,
    /// Left edge of the first fragment. Merging widens `bbox` but keeps this.
    pub x_pos: f32,
    pub font_size: f32,
    pub font_name: String,
    pub is_bold: bool,
    pub is_italic: bool,
    pub color: u32,
    pub rel_font_size: f64,
    pub whitespace_above: f64,
    pub seq_idx: usize,
    pub word_count: usize,
    pub cap_ratio: f64,
    pub ends_with_period: bool,
    pub ends_with_colon: bool,
    pub has_enumeration: bool,
    pub has_cue_word: bool,
    pub heading_score: f32,
}

impl Line {
    #[inline(always)]
    pub fn y_pos(&self) -> f32 {
        self.bbox.y0
    }

    /// Ordering key used by every spatial sort: page, then top edge.
    pub(crate) fn spatial_cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.page
            .cmp(&other.page)
            .then(self.y_pos().total_cmp(&other.y_pos()))
    }
}

/// Uppercase letters over total length, rounded to two decimals.
pub(crate) fn cap_ratio(text: &str) -> f64 {
    let len = text.chars().count().max(1);
    let upper = text.chars().filter(|c| c.is_uppercase()).count();
    round2(upper as f64 / len as f64)
}

#[inline(always)]
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontStatistics {
    pub mean_font_size: f64,
    pub median_font_size: f64,
    /// Modal font size: the reference size of normal text.
    pub body_font_size: f32,
}

impl FontStatistics {
    /// Statistics over the positive font sizes of `lines`, `None` when there are none.
    pub fn from_lines(lines: &[Line]) -> Option<Self> {
        let sizes: Vec<f32> = lines
            .iter()
            .map(|l| l.font_size)
            .filter(|&s| s > 0f32)
            .collect();
        if sizes.is_empty() {
            return None;
        }

        let mean_font_size = sizes.iter().map(|&s| s as f64).sum::<f64>() / sizes.len() as f64;

        let mut sorted = sizes.clone();
        sorted.sort_by(f32::total_cmp);
        let mid = sorted.len() / 2;
        let median_font_size = if sorted.len() % 2 == 0 {
            (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
        } else {
            sorted[mid] as f64
        };

        // (size, count) in first-seen order so ties go to the earliest size
        let mut counts: Vec<(f32, usize)> = Vec::new();
        for size in &sizes {
            match counts.iter_mut().find(|(s, _)| s == size) {
                Some((_, count)) => *count += 1,
                None => counts.push((*size, 1)),
            }
        }
        let body_font_size = counts
            .iter()
            .fold(None::<(f32, usize)>, |best, &(size, count)| match best {
                Some((_, best_count)) if best_count >= count => best,
                _ => Some((size, count)),
            })
            .map(|(size, _)| size)
            .unwrap_or(sorted[0]);

        Some(Self {
            mean_font_size,
            median_font_size,
            body_font_size,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    /// One step down the hierarchy; H3 stays H3.
    pub fn demote(self) -> Self {
        match self {
            HeadingLevel::H1 => HeadingLevel::H2,
            HeadingLevel::H2 | HeadingLevel::H3 => HeadingLevel::H3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Heading {
    pub line: Line,
    pub level: HeadingLevel,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    /// 0-based page index.
    pub page: PageID,
}

impl From<&Heading> for OutlineEntry {
    fn from(heading: &Heading) -> Self {
        Self {
            level: heading.level,
            text: heading.line.text.trim().to_owned(),
            page: heading.line.page.saturating_sub(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DocumentOutline {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
}

impl DocumentOutline {
    pub fn placeholder(title: &str) -> Self {
        Self {
            title: title.to_owned(),
            outline: Vec::new(),
        }
    }
}
