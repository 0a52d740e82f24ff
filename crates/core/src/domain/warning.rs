use serde::{Deserialize, Serialize};
use std::fmt;

/// Non-fatal diagnostics produced while parsing model output.
///
/// These never change control flow; they travel with the parsed result so
/// callers (and tests) can see which degraded paths were taken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParseWarning {
    NoSections,
    DroppedRecommendation {
        excerpt: String,
        missing: Vec<String>,
    },
    AllocationsCleared {
        reason: ClearReason,
    },
    AllocationsRescaled {
        original_sum: f64,
    },
    DroppedInsight {
        excerpt: String,
    },
    EmptyResult,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum ClearReason {
    /// At least one recommendation had no usable allocation.
    Incomplete,
    /// All allocations were present but summed too far from 100.
    OutOfTolerance { sum: f64 },
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSections => write!(f, "no SECTION markers found"),
            Self::DroppedRecommendation { excerpt, missing } => write!(
                f,
                "dropped recommendation missing {}: {excerpt}",
                missing.join(", ")
            ),
            Self::AllocationsCleared { reason } => match reason {
                ClearReason::Incomplete => {
                    write!(f, "allocations cleared: not every recommendation had one")
                }
                ClearReason::OutOfTolerance { sum } => {
                    write!(f, "allocations cleared: total {sum}% is too far from 100%")
                }
            },
            Self::AllocationsRescaled { original_sum } => {
                write!(f, "allocations rescaled from a total of {original_sum}%")
            }
            Self::DroppedInsight { excerpt } => write!(f, "dropped empty insight: {excerpt}"),
            Self::EmptyResult => write!(f, "no usable records extracted"),
        }
    }
}

/// Shortens `text` to at most `max_chars` characters for logs and errors.
pub fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_respects_char_boundaries() {
        assert_eq!(excerpt("삼성전자 주가", 4), "삼성전자...");
        assert_eq!(excerpt("  short  ", 10), "short");
    }

    #[test]
    fn warnings_serialize_with_kind_tag() {
        let v = serde_json::to_value(ParseWarning::AllocationsCleared {
            reason: ClearReason::OutOfTolerance { sum: 70.0 },
        })
        .unwrap();
        assert_eq!(v["kind"], "allocations_cleared");
        assert_eq!(v["reason"]["reason"], "out_of_tolerance");
        assert_eq!(v["reason"]["sum"], 70.0);
    }
}
