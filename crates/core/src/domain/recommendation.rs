use crate::domain::warning::ParseWarning;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockRecommendation {
    pub ticker: String,
    pub company_name: String,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_percentage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyInsight {
    pub insight: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_details: Option<String>,
}

/// A web page the backend reported as grounding for its answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationSource {
    pub title: String,
    pub uri: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioResult {
    pub summary: String,
    pub recommendations: Vec<StockRecommendation>,
    pub insights: Vec<KeyInsight>,
    pub sources: Vec<CitationSource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ParseWarning>,
}

impl PortfolioResult {
    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.recommendations.is_empty() && self.insights.is_empty()
    }

    pub fn with_sources(mut self, sources: Vec<CitationSource>) -> Self {
        self.sources = sources;
        self
    }
}
