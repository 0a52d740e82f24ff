use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_NEWS_URL: &str = "#";
pub const DEFAULT_SOURCE_NAME: &str = "unknown";
pub const DEFAULT_PUBLISHED_DATE_TEXT: &str = "recent";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub url: String,
    pub source_name: String,
    pub published_date_text: String,
    pub category: NewsCategory,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    Technology,
    Finance,
    GlobalEconomy,
    IndustryTrends,
    MarketAnalysis,
    RealEstate,
    Energy,
    CompanyNews,
    #[default]
    Other,
}

impl NewsCategory {
    /// Categories the model may choose from for market-wide news.
    pub const MARKET: [Self; 7] = [
        Self::Technology,
        Self::Finance,
        Self::GlobalEconomy,
        Self::IndustryTrends,
        Self::MarketAnalysis,
        Self::RealEstate,
        Self::Energy,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Technology => "Technology",
            Self::Finance => "Finance",
            Self::GlobalEconomy => "Global Economy",
            Self::IndustryTrends => "Industry Trends",
            Self::MarketAnalysis => "Market Analysis",
            Self::RealEstate => "Real Estate",
            Self::Energy => "Energy",
            Self::CompanyNews => "Company News",
            Self::Other => "Other",
        }
    }

    fn korean_label(self) -> Option<&'static str> {
        match self {
            Self::Technology => Some("기술"),
            Self::Finance => Some("금융"),
            Self::GlobalEconomy => Some("글로벌 경제"),
            Self::IndustryTrends => Some("산업 동향"),
            Self::MarketAnalysis => Some("시장 분석"),
            Self::RealEstate => Some("부동산"),
            Self::Energy => Some("에너지"),
            Self::CompanyNews => Some("기업 뉴스"),
            Self::Other => None,
        }
    }

    /// Maps a free-form label returned by the model onto a known category.
    /// Unrecognized or missing labels fall back to [`NewsCategory::Other`].
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::Other;
        };

        Self::MARKET
            .into_iter()
            .chain([Self::CompanyNews])
            .find(|c| {
                c.label().eq_ignore_ascii_case(label)
                    || c.label().replace(' ', "_").eq_ignore_ascii_case(label)
                    || c.korean_label() == Some(label)
            })
            .unwrap_or(Self::Other)
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
