//! Relevance scoring for image candidates
//!
//! A plain heuristic: keyword overlap dominates, then layout and resolution
//! nudge the ranking. Point values are fixed.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::{ImageCandidate, UsedUrls};

pub const TITLE_MATCH: i32 = 10;
pub const DESCRIPTION_MATCH: i32 = 5;
pub const LANDSCAPE_BONUS: i32 = 3;
pub const HIGH_RES_BONUS: i32 = 2;
pub const LOW_RES_PENALTY: i32 = -2;
pub const CAMERA_FILENAME_PENALTY: i32 = -3;
pub const DUPLICATE_PENALTY: i32 = -1000;

pub const HIGH_RES_WIDTH: u32 = 1200;
pub const LOW_RES_WIDTH: u32 = 800;

/// Titles like `IMG_2041` or `DSCN0012` straight off a camera
static CAMERA_FILENAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(IMG|DSC|P\d|DSCN)").unwrap());

/// Score a candidate against lowercase keywords.
pub fn score(candidate: &ImageCandidate, keywords: &[String]) -> i32 {
    let title = candidate.title.to_lowercase();
    let description = candidate.description.to_lowercase();

    let mut score = 0;

    for keyword in keywords {
        let keyword = keyword.to_lowercase();
        if title.contains(&keyword) {
            score += TITLE_MATCH;
        }
        if description.contains(&keyword) {
            score += DESCRIPTION_MATCH;
        }
    }

    if candidate.width > candidate.height {
        score += LANDSCAPE_BONUS;
    }
    if candidate.width >= HIGH_RES_WIDTH {
        score += HIGH_RES_BONUS;
    }
    if candidate.width < LOW_RES_WIDTH {
        score += LOW_RES_PENALTY;
    }
    if CAMERA_FILENAME_RE.is_match(&candidate.title) {
        score += CAMERA_FILENAME_PENALTY;
    }

    score
}

/// [`score`] plus the duplicate penalty for URLs already used in this run.
pub fn score_with_used(candidate: &ImageCandidate, keywords: &[String], used: &UsedUrls) -> i32 {
    let base = score(candidate, keywords);
    if used.contains(&candidate.url) {
        base + DUPLICATE_PENALTY
    } else {
        base
    }
}
