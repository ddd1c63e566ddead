//! Repair of model output into a [`ProposalSkeleton`].
//!
//! Models wrap JSON in Markdown fences, typeset quotes, or add prose around the
//! object. Each repair step is a pure `&str -> String` transform; [`parse_skeleton`]
//! composes them before the structured parse. Output that still isn't JSON is an
//! error; nothing is fabricated.

use thiserror::Error;

use crate::models::ProposalSkeleton;

/// Characters of raw output quoted in user-facing diagnostics.
pub const EXCERPT_CHARS: usize = 300;

const FENCE: &str = "```";

/// Model output that could not be coerced into a skeleton.
///
/// Carries the full raw text for logs; `Display` only quotes a bounded excerpt.
#[derive(Debug, Clone, Error)]
#[error("{reason}; raw output: {}", excerpt(.raw, EXCERPT_CHARS))]
pub struct ParseError {
    pub reason: String,
    pub raw: String,
}

impl ParseError {
    fn new(reason: impl Into<String>, raw: &str) -> Self {
        Self {
            reason: reason.into(),
            raw: raw.to_string(),
        }
    }
}

/// First `max` characters of `raw`, with an ellipsis when cut.
pub fn excerpt(raw: &str, max: usize) -> String {
    match raw.char_indices().nth(max) {
        Some((byte, _)) => format!("{}…", &raw[..byte]),
        None => raw.to_string(),
    }
}

/// Remove Markdown code fences, including a `json` language tag after an
/// opening fence.
pub fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(FENCE) {
        out.push_str(&rest[..pos]);
        rest = &rest[pos + FENCE.len()..];
        if rest.len() >= 4 && rest.is_char_boundary(4) && rest[..4].eq_ignore_ascii_case("json") {
            rest = &rest[4..];
        }
    }
    out.push_str(rest);
    out.trim().to_string()
}

/// Replace typographic quotes with their ASCII equivalents.
pub fn normalize_quotes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => '\'',
            other => other,
        })
        .collect()
}

/// Slice from the first `{` to the last `}`, dropping surrounding prose.
///
/// Returns `None` when the text holds no brace-delimited span.
pub fn isolate_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Repair and parse raw model output into a skeleton.
pub fn parse_skeleton(raw: &str) -> Result<ProposalSkeleton, ParseError> {
    let cleaned = normalize_quotes(&strip_code_fences(raw));
    let object = isolate_object(&cleaned)
        .ok_or_else(|| ParseError::new("Model output contains no JSON object", raw))?;

    let skeleton: ProposalSkeleton = serde_json::from_str(object)
        .map_err(|e| ParseError::new(format!("Model output is not a valid skeleton: {}", e), raw))?;

    let skeleton = ProposalSkeleton {
        title: skeleton.title.trim().to_string(),
        summary: skeleton.summary.trim().to_string(),
        key_points: skeleton
            .key_points
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
    };

    if skeleton.title.is_empty() {
        return Err(ParseError::new("Model output has an empty title", raw));
    }
    Ok(skeleton)
}
