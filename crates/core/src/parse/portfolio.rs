use crate::domain::recommendation::PortfolioResult;
use crate::domain::warning::ParseWarning;
use crate::parse::allocation::reconcile_allocations;
use crate::parse::insights::extract_insights;
use crate::parse::sections::{bodies_named, split_sections};
use crate::parse::stocks::extract_recommendations;

pub const SUMMARY_SECTION: &str = "PortfolioSummary";
pub const RECOMMENDATIONS_SECTION: &str = "StockRecommendations";
pub const INSIGHTS_SECTION: &str = "KeyInsights";

/// Removes a stray ```` ```json ```` opener and a trailing ```` ``` ```` that
/// the model sometimes wraps section text in despite being told not to.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
        .unwrap_or(text);
    text.strip_suffix("```").unwrap_or(text).trim()
}

/// Parses a sectioned portfolio response.
///
/// Never fails: missing sections simply leave their part of the result
/// empty, and every degraded path is recorded in `warnings`. Citation
/// sources are attached by the caller.
pub fn parse_portfolio_text(text: &str) -> PortfolioResult {
    let sections = split_sections(strip_code_fence(text));
    let mut result = PortfolioResult::default();

    if sections.is_empty() {
        tracing::warn!(
            response_len = text.len(),
            "portfolio response has no SECTION markers"
        );
        result.warnings.push(ParseWarning::NoSections);
    }

    if let Some(summary) = bodies_named(&sections, SUMMARY_SECTION).next() {
        result.summary = summary.to_string();
    }

    for body in bodies_named(&sections, RECOMMENDATIONS_SECTION) {
        let extraction = extract_recommendations(body);
        result.recommendations.extend(extraction.records);
        result.warnings.extend(extraction.warnings);
    }

    for body in bodies_named(&sections, INSIGHTS_SECTION) {
        let extraction = extract_insights(body);
        result.insights.extend(extraction.records);
        result.warnings.extend(extraction.warnings);
    }

    let outcome = reconcile_allocations(&mut result.recommendations);
    result.warnings.extend(outcome.warning());

    if result.recommendations.is_empty() && result.insights.is_empty() {
        tracing::warn!("portfolio response yielded no recommendations or insights");
        result.warnings.push(ParseWarning::EmptyResult);
    }

    tracing::debug!(
        recommendations = result.recommendations.len(),
        insights = result.insights.len(),
        warnings = result.warnings.len(),
        "parsed portfolio response"
    );

    result
}
