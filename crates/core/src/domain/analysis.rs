use crate::domain::recommendation::CitationSource;
use crate::domain::warning::ParseWarning;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockAnalysis {
    pub ticker: String,
    pub company_name: String,
    pub sections: Vec<AnalysisSection>,
    pub sources: Vec<CitationSource>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ParseWarning>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub topic: AnalysisTopic,
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisTopic {
    FinancialHealthSummary,
    GrowthPotential,
    RiskFactors,
    AnalystSentimentOverview,
    RecentNewsImpact,
    Other(String),
}

impl AnalysisTopic {
    pub const REQUESTED: [Self; 5] = [
        Self::FinancialHealthSummary,
        Self::GrowthPotential,
        Self::RiskFactors,
        Self::AnalystSentimentOverview,
        Self::RecentNewsImpact,
    ];

    pub fn from_section_name(name: &str) -> Self {
        match name {
            "FinancialHealthSummary" => Self::FinancialHealthSummary,
            "GrowthPotential" => Self::GrowthPotential,
            "RiskFactors" => Self::RiskFactors,
            "AnalystSentimentOverview" => Self::AnalystSentimentOverview,
            "RecentNewsImpact" => Self::RecentNewsImpact,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn section_name(&self) -> &str {
        match self {
            Self::FinancialHealthSummary => "FinancialHealthSummary",
            Self::GrowthPotential => "GrowthPotential",
            Self::RiskFactors => "RiskFactors",
            Self::AnalystSentimentOverview => "AnalystSentimentOverview",
            Self::RecentNewsImpact => "RecentNewsImpact",
            Self::Other(name) => name,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::FinancialHealthSummary => "Financial health",
            Self::GrowthPotential => "Growth potential",
            Self::RiskFactors => "Risk factors",
            Self::AnalystSentimentOverview => "Analyst sentiment",
            Self::RecentNewsImpact => "Recent news impact",
            Self::Other(name) => name,
        }
    }
}
