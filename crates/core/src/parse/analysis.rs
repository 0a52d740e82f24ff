use crate::domain::analysis::{AnalysisSection, AnalysisTopic, StockAnalysis};
use crate::domain::warning::ParseWarning;
use crate::llm::prompts::END_OF_RESPONSE;
use crate::parse::sections::split_sections;

/// Parses a sectioned single-stock analysis. Unknown section names are kept
/// as [`AnalysisTopic::Other`]; empty sections are skipped.
pub fn parse_stock_analysis(ticker: &str, company_name: &str, text: &str) -> StockAnalysis {
    let text = text
        .find(END_OF_RESPONSE)
        .map_or(text, |end| &text[..end]);
    let sections = split_sections(text);

    let mut warnings = Vec::new();
    if sections.is_empty() {
        tracing::warn!(ticker, response_len = text.len(), "analysis response has no SECTION markers");
        warnings.push(ParseWarning::NoSections);
    }

    let sections: Vec<AnalysisSection> = sections
        .into_iter()
        .filter(|s| !s.body.is_empty())
        .map(|s| {
            let topic = AnalysisTopic::from_section_name(&s.name);
            AnalysisSection {
                title: topic.title().to_string(),
                topic,
                body: s.body,
            }
        })
        .collect();

    let missing: Vec<String> = AnalysisTopic::REQUESTED
        .into_iter()
        .filter(|topic| !sections.iter().any(|s| &s.topic == topic))
        .map(|topic| topic.section_name().to_string())
        .collect();
    if !missing.is_empty() {
        tracing::debug!(ticker, ?missing, "analysis response is missing topics");
    }

    if sections.is_empty() {
        warnings.push(ParseWarning::EmptyResult);
    }

    StockAnalysis {
        ticker: ticker.to_string(),
        company_name: company_name.to_string(),
        sections,
        sources: Vec::new(),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_sections_to_topics() {
        let text = "SECTION: FinancialHealthSummary\nSolid balance sheet.\n\
SECTION: RiskFactors\nCustomer concentration.\n\
SECTION: ValuationNotes\nTrades at a premium.\n\
---END OF RESPONSE---";
        let analysis = parse_stock_analysis("NVDA", "NVIDIA", text);

        assert_eq!(analysis.ticker, "NVDA");
        assert_eq!(analysis.sections.len(), 3);
        assert_eq!(analysis.sections[0].topic, AnalysisTopic::FinancialHealthSummary);
        assert_eq!(analysis.sections[0].title, "Financial health");
        assert_eq!(analysis.sections[1].body, "Customer concentration.");
        assert_eq!(
            analysis.sections[2].topic,
            AnalysisTopic::Other("ValuationNotes".to_string())
        );
        assert_eq!(analysis.sections[2].title, "ValuationNotes");
        assert!(analysis.warnings.is_empty());
    }

    #[test]
    fn skips_empty_sections() {
        let text = "SECTION: GrowthPotential\n\nSECTION: RecentNewsImpact\nNew product launch.";
        let analysis = parse_stock_analysis("AAPL", "Apple", text);
        assert_eq!(analysis.sections.len(), 1);
        assert_eq!(analysis.sections[0].topic, AnalysisTopic::RecentNewsImpact);
    }

    #[test]
    fn unstructured_text_is_flagged() {
        let analysis = parse_stock_analysis("AAPL", "Apple", "No data.");
        assert!(analysis.sections.is_empty());
        assert_eq!(
            analysis.warnings,
            vec![ParseWarning::NoSections, ParseWarning::EmptyResult]
        );
    }
}
