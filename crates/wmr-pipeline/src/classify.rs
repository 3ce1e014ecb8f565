//! Classification of free-text detector answers.

use std::sync::LazyLock;

use regex_lite::Regex;
use wmr_models::WatermarkPosition;

/// A negation in front of "watermark", optionally through a verb and
/// determiners: "no watermark", "don't see any watermark", "isn't a watermark".
static NEGATED_WATERMARK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:\bno|\bnot|\bcannot|\bwithout|\bnever|n['’]t)\s+(?:(?:see|contain|contains|have|has|be|detect|find|notice|spot)\s+)?(?:(?:a|an|any|visible|obvious|apparent)\s+)*watermarks?",
    )
    .expect("valid negation pattern")
});

/// Checked in order; the first matching row wins.
const POSITION_SYNONYMS: &[(WatermarkPosition, &[&str])] = &[
    (
        WatermarkPosition::TopRight,
        &["top-right", "upper-right", "top right", "upper right"],
    ),
    (
        WatermarkPosition::TopLeft,
        &["top-left", "upper-left", "top left", "upper left"],
    ),
    (
        WatermarkPosition::BottomRight,
        &["bottom-right", "lower-right", "bottom right", "lower right"],
    ),
    (
        WatermarkPosition::BottomLeft,
        &["bottom-left", "lower-left", "bottom left", "lower left"],
    ),
    (WatermarkPosition::Center, &["center", "centre", "middle"]),
];

/// Map a detector answer to a watermark position.
///
/// `None` means the answer does not report a watermark. A reported watermark
/// without a recognisable location falls back to bottom-right.
pub fn classify(text: &str) -> Option<WatermarkPosition> {
    let text = text.to_lowercase();

    let mentions = text.contains("watermark") && !NEGATED_WATERMARK.is_match(&text);
    if !mentions {
        return None;
    }

    let position = POSITION_SYNONYMS
        .iter()
        .find(|(_, synonyms)| synonyms.iter().any(|s| text.contains(s)))
        .map(|(position, _)| *position)
        .unwrap_or_default();

    Some(position)
}
