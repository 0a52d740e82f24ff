use crate::domain::contract::LlmNewsItem;
use crate::domain::news::{NewsArticle, NewsCategory};
use crate::error::InsightError;
use crate::parse::json::parse_payload;
use serde_json::Value;
use uuid::Uuid;

pub const MARKET_NEWS_ID_PREFIX: &str = "news";

#[derive(Debug, Clone)]
pub struct NewsParseOptions {
    pub id_prefix: String,
    /// Overrides whatever category the model assigned.
    pub forced_category: Option<NewsCategory>,
}

impl Default for NewsParseOptions {
    fn default() -> Self {
        Self {
            id_prefix: MARKET_NEWS_ID_PREFIX.to_string(),
            forced_category: None,
        }
    }
}

impl NewsParseOptions {
    pub fn for_stock(ticker: &str) -> Self {
        Self {
            id_prefix: format!("stock-news-{ticker}"),
            forced_category: Some(NewsCategory::CompanyNews),
        }
    }
}

/// Parses a market news response using the default id prefix.
pub fn parse_news_json(text: &str) -> Result<Vec<NewsArticle>, InsightError> {
    parse_news_json_with(text, &NewsParseOptions::default())
}

/// Parses a JSON array of news items.
///
/// Entries that are not objects or have no title are dropped; the rest get
/// defaults for missing fields and an id unique to this call.
pub fn parse_news_json_with(
    text: &str,
    options: &NewsParseOptions,
) -> Result<Vec<NewsArticle>, InsightError> {
    let (payload, value) = parse_payload(text)?;
    let Value::Array(items) = value else {
        return Err(InsightError::malformed(
            "expected a JSON array of news items",
            payload,
        ));
    };

    let batch = Uuid::new_v4().simple().to_string();
    let total = items.len();
    let mut articles = Vec::with_capacity(total);

    for (index, item) in items.into_iter().enumerate() {
        let article = serde_json::from_value::<LlmNewsItem>(item)
            .map_err(anyhow::Error::from)
            .and_then(|item| {
                let id = format!("{}-{batch}-{index}", options.id_prefix);
                item.validate_and_into_article(id, options.forced_category)
            });

        match article {
            Ok(article) => articles.push(article),
            Err(e) => {
                tracing::warn!(index, error = %e, "dropping malformed news item");
            }
        }
    }

    tracing::debug!(
        kept = articles.len(),
        dropped = total - articles.len(),
        prefix = %options.id_prefix,
        "parsed news response"
    );

    Ok(articles)
}
