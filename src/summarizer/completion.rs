//! Rule deciding whether a player END event counts as completing the content.

use crate::content::MimeType;
use crate::telemetry::SummaryEntry;

/// Content types whose completion requires a graded attempt rather than playback.
const ASSESSMENT_GATED_TYPES: [&str; 2] = ["selfassess", "onboardingresource"];

const VIDEO_MIME_TYPES: [&str; 3] = [MimeType::YOUTUBE, MimeType::VIDEO, MimeType::WEBM];
const INTERACTIVE_MIME_TYPES: [&str; 2] = [MimeType::H5P, MimeType::HTML];

const VIDEO_MIN_PROGRESS: f64 = 20.0;
const INTERACTIVE_MIN_PROGRESS: f64 = 0.0;
const FULL_PROGRESS: f64 = 100.0;

pub fn is_assessment_gated(content_type: &str) -> bool {
    ASSESSMENT_GATED_TYPES
        .iter()
        .any(|gated| gated.eq_ignore_ascii_case(content_type))
}

fn reaches(summary: &[SummaryEntry], required: f64) -> bool {
    summary
        .iter()
        .any(|entry| entry.progress.is_some_and(|p| p >= required))
}

/// `captured` is whether an attempt-correlated assessment was seen for the course attempt.
pub fn is_valid_completion(
    mime_type: &str,
    content_type: &str,
    captured: bool,
    summary: &[SummaryEntry],
) -> bool {
    if captured && is_assessment_gated(content_type) {
        return false;
    }
    if VIDEO_MIME_TYPES.contains(&mime_type) && reaches(summary, VIDEO_MIN_PROGRESS) {
        return true;
    }
    if INTERACTIVE_MIME_TYPES.contains(&mime_type) && reaches(summary, INTERACTIVE_MIN_PROGRESS) {
        return true;
    }
    reaches(summary, FULL_PROGRESS)
}
