use crate::domain::recommendation::StockRecommendation;
use crate::domain::warning::{excerpt, ParseWarning};
use crate::parse::Extraction;
use regex::Regex;
use std::sync::OnceLock;

const ENTRY_MARKER: &str = "- Ticker:";
const RATIONALE_LABEL: &str = "Rationale:";

fn ticker_regex() -> &'static Regex {
    static TICKER_RE: OnceLock<Regex> = OnceLock::new();
    TICKER_RE.get_or_init(|| {
        Regex::new(r"^(?P<ticker>\w[\w.-]*)").expect("ticker regex must compile")
    })
}

fn company_name_label_regex() -> &'static Regex {
    static COMPANY_NAME_RE: OnceLock<Regex> = OnceLock::new();
    COMPANY_NAME_RE.get_or_init(|| {
        Regex::new(r"CompanyName[ \t]*:").expect("company name regex must compile")
    })
}

fn field_label_regex() -> &'static Regex {
    static FIELD_LABEL_RE: OnceLock<Regex> = OnceLock::new();
    FIELD_LABEL_RE.get_or_init(|| {
        Regex::new(
            r"^(?:-[ \t]*)?(?:Ticker|CompanyName|Rationale|ConfidenceScore|AllocationPercentage)[ \t]*:",
        )
        .expect("field label regex must compile")
    })
}

fn rationale_end_regex() -> &'static Regex {
    static RATIONALE_END_RE: OnceLock<Regex> = OnceLock::new();
    RATIONALE_END_RE.get_or_init(|| {
        Regex::new(r"(?:ConfidenceScore|AllocationPercentage)[ \t]*:")
            .expect("rationale end regex must compile")
    })
}

fn confidence_regex() -> &'static Regex {
    static CONFIDENCE_RE: OnceLock<Regex> = OnceLock::new();
    CONFIDENCE_RE.get_or_init(|| {
        Regex::new(r"ConfidenceScore:\s*(?P<score>\d+)").expect("confidence regex must compile")
    })
}

fn allocation_regex() -> &'static Regex {
    static ALLOCATION_RE: OnceLock<Regex> = OnceLock::new();
    ALLOCATION_RE.get_or_init(|| {
        Regex::new(r"AllocationPercentage:\s*(?P<pct>\d+(?:\.\d+)?)")
            .expect("allocation regex must compile")
    })
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Value written after a label: the rest of the label's line, or the next
/// line when the label's own line is empty and the next one is not another
/// label.
fn labelled_value(rest: &str) -> Option<&str> {
    let (line, remainder) = rest.split_once('\n').unwrap_or((rest, ""));
    let line = line.trim();
    if !line.is_empty() {
        return Some(line);
    }

    let next = remainder.lines().next()?.trim();
    (!next.is_empty() && !field_label_regex().is_match(next)).then_some(next)
}

pub fn ticker(chunk: &str) -> Option<String> {
    let value = labelled_value(chunk)?;
    ticker_regex()
        .captures(value)
        .and_then(|c| c.name("ticker"))
        .map(|m| m.as_str().to_string())
}

pub fn company_name(chunk: &str) -> Option<String> {
    let label = company_name_label_regex().find(chunk)?;
    labelled_value(&chunk[label.end()..]).map(str::to_string)
}

/// Text after `Rationale:` up to the next score/allocation label.
pub fn rationale(chunk: &str) -> Option<String> {
    let start = chunk.find(RATIONALE_LABEL)? + RATIONALE_LABEL.len();
    let rest = &chunk[start..];
    let Some(label) = rationale_end_regex().find(rest) else {
        return non_empty(rest);
    };

    // Labels are usually written as "- ConfidenceScore:"; drop only the dash
    // that opens the label's own line.
    let before = rest[..label.start()].trim_end_matches([' ', '\t']);
    let text = match before.strip_suffix('-') {
        Some(head) if head.trim_end_matches([' ', '\t']).ends_with('\n') => head,
        Some(head) if head.trim().is_empty() => head,
        _ => before,
    };
    non_empty(text)
}

pub fn confidence_score(chunk: &str) -> Option<u8> {
    let raw = confidence_regex().captures(chunk)?.name("score")?.as_str();
    match raw.parse::<u8>() {
        Ok(score) if score <= 100 => Some(score),
        _ => {
            tracing::debug!(raw, "ignoring out-of-range confidence score");
            None
        }
    }
}

pub fn allocation_percentage(chunk: &str) -> Option<f64> {
    allocation_regex()
        .captures(chunk)?
        .name("pct")?
        .as_str()
        .parse::<f64>()
        .ok()
}

/// Parses the body of a `StockRecommendations` section.
///
/// Entries missing a ticker, company name or rationale are dropped with a
/// warning; allocations are returned exactly as written (see
/// [`crate::parse::allocation`] for reconciliation).
pub fn extract_recommendations(body: &str) -> Extraction<StockRecommendation> {
    let mut out = Extraction::default();

    for chunk in body.split(ENTRY_MARKER).skip(1) {
        let ticker = ticker(chunk);
        let company_name = company_name(chunk);
        let rationale = rationale(chunk);

        match (ticker, company_name, rationale) {
            (Some(ticker), Some(company_name), Some(rationale)) => {
                out.records.push(StockRecommendation {
                    ticker,
                    company_name,
                    rationale,
                    confidence_score: confidence_score(chunk),
                    allocation_percentage: allocation_percentage(chunk),
                });
            }
            (ticker, company_name, rationale) => {
                let missing: Vec<String> = [
                    ("ticker", ticker.is_none()),
                    ("companyName", company_name.is_none()),
                    ("rationale", rationale.is_none()),
                ]
                .into_iter()
                .filter(|(_, is_missing)| *is_missing)
                .map(|(field, _)| field.to_string())
                .collect();

                let chunk_excerpt = excerpt(chunk, 80);
                tracing::warn!(
                    missing = ?missing,
                    chunk = %chunk_excerpt,
                    "skipping stock recommendation with missing fields"
                );
                out.warnings.push(ParseWarning::DroppedRecommendation {
                    excerpt: chunk_excerpt,
                    missing,
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_admits_exchange_suffix_and_hyphen() {
        assert_eq!(ticker(" 005930.KS\nCompanyName: x").as_deref(), Some("005930.KS"));
        assert_eq!(ticker(" BRK-B\n").as_deref(), Some("BRK-B"));
        assert_eq!(ticker(" \nCompanyName: Orphan"), None);
    }

    #[test]
    fn company_name_runs_to_end_of_line() {
        assert_eq!(
            company_name(" AAA\n- CompanyName:  Alpha Corp \n- Rationale: r").as_deref(),
            Some("Alpha Corp")
        );
        assert_eq!(company_name(" AAA\nCompanyName:\nRationale: r"), None);
    }

    #[test]
    fn rationale_stops_at_next_label() {
        let chunk = " AAA\nCompanyName: Alpha\nRationale: Strong quarter.\nBeat estimates.\n- ConfidenceScore: 80\n- AllocationPercentage: 60\n";
        assert_eq!(
            rationale(chunk).as_deref(),
            Some("Strong quarter.\nBeat estimates.")
        );

        let inline = " AAA\nRationale: Cheap. AllocationPercentage: 20";
        assert_eq!(rationale(inline).as_deref(), Some("Cheap."));

        let tail = " AAA\nRationale: Runs to the end.  \n";
        assert_eq!(rationale(tail).as_deref(), Some("Runs to the end."));
    }

    #[test]
    fn values_may_sit_on_the_line_after_their_label() {
        let chunk = "\nAAPL\n- CompanyName:\nApple Inc.\n- Rationale: Services.\n";
        assert_eq!(ticker(chunk).as_deref(), Some("AAPL"));
        assert_eq!(company_name(chunk).as_deref(), Some("Apple Inc."));

        assert_eq!(ticker("\n- CompanyName: Apple Inc.\n"), None);
        assert_eq!(company_name(" AAA\n- CompanyName:\n- Rationale: r"), None);
        assert_eq!(company_name(" AAA\nCompanyName:\n\nApple Inc."), None);
    }

    #[test]
    fn keeps_dash_that_belongs_to_the_rationale() {
        let chunk = " AAA\nRationale: Hedge via long-short -\n- AllocationPercentage: 100";
        assert_eq!(rationale(chunk).as_deref(), Some("Hedge via long-short -"));

        let inline = " AAA\nRationale: Pairs trade - ConfidenceScore: 70";
        assert_eq!(rationale(inline).as_deref(), Some("Pairs trade -"));

        let trailing = " AAA\nRationale: Ends with a dash -";
        assert_eq!(rationale(trailing).as_deref(), Some("Ends with a dash -"));
    }

    #[test]
    fn numeric_fields_are_optional() {
        let chunk = " AAA\nConfidenceScore: 80\nAllocationPercentage: 33.5";
        assert_eq!(confidence_score(chunk), Some(80));
        assert_eq!(allocation_percentage(chunk), Some(33.5));

        assert_eq!(confidence_score(" AAA\nConfidenceScore: n/a"), None);
        assert_eq!(confidence_score(" AAA\nConfidenceScore: 250"), None);
        assert_eq!(allocation_percentage(" AAA\n"), None);
    }

    #[test]
    fn first_label_occurrence_wins() {
        let chunk = " AAA\nAllocationPercentage: 40\nAllocationPercentage: 10";
        assert_eq!(allocation_percentage(chunk), Some(40.0));
    }

    #[test]
    fn extracts_entries_in_order_and_ignores_preamble() {
        let body = "Here are my picks:\n- Ticker: AAPL\n- CompanyName: Apple Inc.\n- Rationale: Services growth.\n- ConfidenceScore: 75\n- AllocationPercentage: 50\n- Ticker: 005930.KS\n- CompanyName: Samsung Electronics\n- Rationale: Memory upcycle.\n- AllocationPercentage: 50\n";
        let out = extract_recommendations(body);
        assert!(out.warnings.is_empty());
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.records[0].ticker, "AAPL");
        assert_eq!(out.records[0].confidence_score, Some(75));
        assert_eq!(out.records[1].ticker, "005930.KS");
        assert_eq!(out.records[1].company_name, "Samsung Electronics");
        assert_eq!(out.records[1].confidence_score, None);
        assert_eq!(out.records[1].allocation_percentage, Some(50.0));
    }

    #[test]
    fn drops_entry_without_company_name() {
        let body = "- Ticker: AAA\nRationale: No name given.\nConfidenceScore: 90\nAllocationPercentage: 100\n- Ticker: BBB\nCompanyName: Beta Inc\nRationale: Fine.\n";
        let out = extract_recommendations(body);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].ticker, "BBB");
        assert_eq!(
            out.warnings,
            vec![ParseWarning::DroppedRecommendation {
                excerpt: "AAA\nRationale: No name given.\nConfidenceScore: 90\nAllocationPercentage: 100"
                    .to_string(),
                missing: vec!["companyName".to_string()],
            }]
        );
    }

    #[test]
    fn next_line_layout_keeps_the_record() {
        let out = extract_recommendations(
            "- Ticker:\nAAPL\n- CompanyName:\nApple Inc.\n- Rationale: Services.\n",
        );
        assert!(out.warnings.is_empty());
        assert_eq!(
            out.records,
            vec![StockRecommendation {
                ticker: "AAPL".to_string(),
                company_name: "Apple Inc.".to_string(),
                rationale: "Services.".to_string(),
                confidence_score: None,
                allocation_percentage: None,
            }]
        );
    }

    #[test]
    fn body_without_markers_yields_nothing() {
        let out = extract_recommendations("No recommendations today.");
        assert!(out.records.is_empty());
        assert!(out.warnings.is_empty());
    }
}
