//! Shapes the model is asked to emit as JSON, and their validation into
//! domain records.

use crate::domain::financials::{FinancialIndicator, IndicatorValue};
use crate::domain::news::{
    NewsArticle, NewsCategory, DEFAULT_NEWS_URL, DEFAULT_PUBLISHED_DATE_TEXT, DEFAULT_SOURCE_NAME,
};
use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmNewsItem {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub source_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub published_date_text: Option<String>,
}

/// Top-level financial indicator payload. Indicators are kept as raw values
/// so one malformed entry does not sink the whole snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmFinancials {
    pub indicators: Vec<serde_json::Value>,
    #[serde(default)]
    pub data_as_of: Option<String>,
    #[serde(default)]
    pub data_comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmIndicator {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub value: Option<IndicatorValue>,
    #[serde(default)]
    pub notes: Option<String>,
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl LlmNewsItem {
    pub fn validate_and_into_article(
        self,
        id: String,
        forced_category: Option<NewsCategory>,
    ) -> anyhow::Result<NewsArticle> {
        let title = non_blank(self.title).context("news item has no title")?;

        let category = forced_category
            .unwrap_or_else(|| NewsCategory::from_label(self.category.as_deref()));

        Ok(NewsArticle {
            id,
            title,
            summary: non_blank(self.summary).unwrap_or_default(),
            url: non_blank(self.url).unwrap_or_else(|| DEFAULT_NEWS_URL.to_string()),
            source_name: non_blank(self.source_name)
                .unwrap_or_else(|| DEFAULT_SOURCE_NAME.to_string()),
            published_date_text: non_blank(self.published_date_text)
                .unwrap_or_else(|| DEFAULT_PUBLISHED_DATE_TEXT.to_string()),
            category,
        })
    }
}

impl LlmIndicator {
    pub fn validate_and_into_indicator(self) -> anyhow::Result<FinancialIndicator> {
        let name = non_blank(self.name).context("indicator has no name")?;

        let value = match self.value {
            Some(IndicatorValue::Text(s)) => {
                let s = s.trim().to_string();
                ensure!(!s.is_empty(), "indicator '{name}' has an empty value");
                IndicatorValue::Text(s)
            }
            Some(v @ IndicatorValue::Number(_)) => v,
            None => anyhow::bail!("indicator '{name}' has no value"),
        };

        let id = non_blank(self.id).unwrap_or_else(|| slug(&name));

        Ok(FinancialIndicator {
            id,
            name,
            value,
            notes: non_blank(self.notes),
        })
    }
}

fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('_') {
            out.push('_');
        }
    }
    out.trim_matches('_').to_string()
}
