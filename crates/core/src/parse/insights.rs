use crate::domain::recommendation::KeyInsight;
use crate::domain::warning::{excerpt, ParseWarning};
use crate::llm::prompts::END_OF_RESPONSE;
use crate::parse::Extraction;
use regex::Regex;
use std::sync::OnceLock;

const ENTRY_MARKER: &str = "- Insight:";

fn source_details_regex() -> &'static Regex {
    static SOURCE_DETAILS_RE: OnceLock<Regex> = OnceLock::new();
    SOURCE_DETAILS_RE.get_or_init(|| {
        Regex::new(r"(?m)^[ \t]*(?:-[ \t]*)?(?:\(Optional\)[ \t]*)?SourceDetails[ \t]*:")
            .expect("source details regex must compile")
    })
}

/// Parses the body of a `KeyInsights` section.
pub fn extract_insights(body: &str) -> Extraction<KeyInsight> {
    let body = body
        .find(END_OF_RESPONSE)
        .map_or(body, |end| &body[..end]);

    let mut out = Extraction::default();
    for chunk in body.split(ENTRY_MARKER).skip(1) {
        let (insight, source_details) = match source_details_regex().find(chunk) {
            Some(label) => (&chunk[..label.start()], Some(&chunk[label.end()..])),
            None => (chunk, None),
        };

        let insight = insight.trim();
        if insight.is_empty() {
            let chunk_excerpt = excerpt(chunk, 80);
            tracing::debug!(chunk = %chunk_excerpt, "skipping insight without text");
            out.warnings.push(ParseWarning::DroppedInsight {
                excerpt: chunk_excerpt,
            });
            continue;
        }

        out.records.push(KeyInsight {
            insight: insight.to_string(),
            source_details: source_details
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        });
    }

    out
}
