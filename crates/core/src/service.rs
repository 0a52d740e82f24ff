use crate::domain::analysis::StockAnalysis;
use crate::domain::financials::FinancialSnapshot;
use crate::domain::news::NewsArticle;
use crate::domain::profile::UserProfile;
use crate::domain::recommendation::PortfolioResult;
use crate::error::InsightError;
use crate::llm::credential::CredentialCell;
use crate::llm::{prompts, Completion, CompletionBackend, CompletionRequest};
use crate::parse::{
    parse_financial_json, parse_news_json, parse_news_json_with, parse_portfolio_text,
    parse_stock_analysis, NewsParseOptions,
};
use std::sync::Arc;

/// Runs one grounded completion per operation and turns the answer into
/// domain records.
///
/// Cloning is cheap; clones share the backend and the credential cell, so a
/// credential set through one handle is used by every other handle's next
/// call.
#[derive(Clone)]
pub struct InsightService {
    backend: Arc<dyn CompletionBackend>,
    credential: Arc<CredentialCell>,
}

impl InsightService {
    pub fn new(backend: Arc<dyn CompletionBackend>, credential: Arc<CredentialCell>) -> Self {
        Self {
            backend,
            credential,
        }
    }

    pub fn credential(&self) -> &CredentialCell {
        &self.credential
    }

    async fn complete(&self, operation: &'static str, prompt: String) -> Result<Completion, InsightError> {
        let credential = self.credential.current().ok_or(InsightError::Credential)?;

        let started = std::time::Instant::now();
        let completion = self
            .backend
            .complete(
                &credential,
                CompletionRequest {
                    prompt,
                    enable_retrieval: true,
                },
            )
            .await
            .map_err(|e| {
                tracing::warn!(operation, error = %e, "completion request failed");
                InsightError::Backend(e)
            })?;

        tracing::info!(
            operation,
            provider = ?self.backend.provider(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            response_len = completion.text.len(),
            citations = completion.citations.len(),
            "completion finished"
        );
        Ok(completion)
    }

    pub async fn portfolio_recommendations(
        &self,
        profile: &UserProfile,
    ) -> Result<PortfolioResult, InsightError> {
        let completion = self
            .complete("portfolio", prompts::portfolio_prompt(profile))
            .await?;
        Ok(parse_portfolio_text(&completion.text).with_sources(completion.citations))
    }

    /// Latest market news. Each article carries its own `url`, so the
    /// completion's grounding citations are not attached to the result.
    pub async fn recent_news(&self) -> Result<Vec<NewsArticle>, InsightError> {
        let completion = self
            .complete("market_news", prompts::market_news_prompt())
            .await?;
        skip_citations("market_news", &completion);
        parse_news_json(&completion.text)
    }

    /// News about one company. As with [`Self::recent_news`], grounding
    /// citations are not attached.
    pub async fn stock_news(
        &self,
        ticker: &str,
        company_name: &str,
    ) -> Result<Vec<NewsArticle>, InsightError> {
        let completion = self
            .complete("stock_news", prompts::stock_news_prompt(ticker, company_name))
            .await?;
        skip_citations("stock_news", &completion);
        parse_news_json_with(&completion.text, &NewsParseOptions::for_stock(ticker))
    }

    pub async fn financial_indicators(
        &self,
        ticker: &str,
        company_name: &str,
    ) -> Result<FinancialSnapshot, InsightError> {
        let completion = self
            .complete(
                "financial_indicators",
                prompts::financial_indicators_prompt(ticker, company_name),
            )
            .await?;
        let mut snapshot = parse_financial_json(&completion.text)?;
        snapshot.sources = completion.citations;
        Ok(snapshot)
    }

    pub async fn stock_analysis(
        &self,
        ticker: &str,
        company_name: &str,
    ) -> Result<StockAnalysis, InsightError> {
        let completion = self
            .complete(
                "stock_analysis",
                prompts::stock_analysis_prompt(ticker, company_name),
            )
            .await?;
        let mut analysis = parse_stock_analysis(ticker, company_name, &completion.text);
        analysis.sources = completion.citations;
        Ok(analysis)
    }
}

fn skip_citations(operation: &'static str, completion: &Completion) {
    if !completion.citations.is_empty() {
        tracing::debug!(
            operation,
            citations = completion.citations.len(),
            "news articles carry their own urls; not attaching grounding citations"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::news::NewsCategory;
    use crate::domain::profile::{InvestmentGoal, InvestmentStrategy, MarketPreference, RiskAppetite};
    use crate::domain::recommendation::CitationSource;
    use crate::llm::credential::Credential;
    use crate::llm::error::{BackendError, BackendErrorKind};
    use crate::llm::Provider;
    use std::sync::Mutex;

    struct StubBackend {
        reply: Result<Completion, BackendError>,
        calls: Mutex<Vec<(String, CompletionRequest)>>,
    }

    impl StubBackend {
        fn replying(text: &str, citations: Vec<CitationSource>) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(Completion {
                    text: text.to_string(),
                    citations,
                }),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: BackendError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(error),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<(String, CompletionRequest)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl CompletionBackend for StubBackend {
        fn provider(&self) -> Provider {
            Provider::Gemini
        }

        async fn complete(
            &self,
            credential: &Credential,
            request: CompletionRequest,
        ) -> Result<Completion, BackendError> {
            self.calls
                .lock()
                .unwrap()
                .push((credential.expose().to_string(), request));
            self.reply.clone()
        }
    }

    fn service(backend: Arc<StubBackend>, key: Option<&str>) -> InsightService {
        InsightService::new(backend, Arc::new(CredentialCell::new(key)))
    }

    fn source(n: u32) -> CitationSource {
        CitationSource {
            title: format!("source {n}"),
            uri: format!("https://example.com/{n}"),
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            investment_goal: InvestmentGoal::LongTermGrowth,
            risk_appetite: RiskAppetite::Medium,
            market_preference: MarketPreference::Us,
            investment_strategy: InvestmentStrategy::Undefined,
        }
    }

    #[tokio::test]
    async fn missing_credential_fails_without_calling_backend() {
        let backend = StubBackend::replying("[]", Vec::new());
        let svc = service(backend.clone(), None);

        let err = svc.recent_news().await.unwrap_err();
        assert!(matches!(err, InsightError::Credential));
        let err = svc.portfolio_recommendations(&profile()).await.unwrap_err();
        assert!(matches!(err, InsightError::Credential));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn portfolio_attaches_citations_in_order() {
        let text = "SECTION: PortfolioSummary\nStay the course.\nSECTION: StockRecommendations\n- Ticker: VOO\nCompanyName: Vanguard S&P 500 ETF\nRationale: Broad exposure.\nAllocationPercentage: 100\n";
        let backend = StubBackend::replying(text, vec![source(1), source(2)]);
        let svc = service(backend.clone(), Some("key-1"));

        let result = svc.portfolio_recommendations(&profile()).await.unwrap();
        assert_eq!(result.summary, "Stay the course.");
        assert_eq!(result.recommendations.len(), 1);
        assert_eq!(result.sources, vec![source(1), source(2)]);

        let calls = backend.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "key-1");
        assert!(calls[0].1.enable_retrieval);
        assert!(calls[0].1.prompt.contains("SECTION: StockRecommendations"));
    }

    #[tokio::test]
    async fn credential_update_applies_to_next_call() {
        let backend = StubBackend::replying(r#"[{"title": "t"}]"#, Vec::new());
        let svc = service(backend.clone(), None);
        let other_handle = svc.clone();

        assert!(other_handle.credential().set(Some("  fresh-key  ")));
        svc.recent_news().await.unwrap();
        assert_eq!(backend.calls()[0].0, "fresh-key");
    }

    #[tokio::test]
    async fn stock_news_is_company_news() {
        let backend = StubBackend::replying(r#"[{"title": "Guidance raised", "category": "Finance"}]"#, Vec::new());
        let svc = service(backend, Some("k"));

        let articles = svc.stock_news("TSLA", "Tesla").await.unwrap();
        assert_eq!(articles[0].category, NewsCategory::CompanyNews);
        assert!(articles[0].id.starts_with("stock-news-TSLA-"));
    }

    #[tokio::test]
    async fn news_keeps_article_urls_when_citations_are_present() {
        let backend = StubBackend::replying(
            r#"[{"title": "Fed holds", "url": "https://example.com/fed"}]"#,
            vec![source(1), source(2)],
        );
        let svc = service(backend, Some("k"));

        let articles = svc.recent_news().await.unwrap();
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].url, "https://example.com/fed");

        let articles = svc.stock_news("TSLA", "Tesla").await.unwrap();
        assert_eq!(articles[0].url, "https://example.com/fed");
    }

    #[tokio::test]
    async fn financial_indicators_carry_sources() {
        let backend = StubBackend::replying(
            r#"{"indicators": [{"id": "pe", "name": "P/E", "value": 30}]}"#,
            vec![source(7)],
        );
        let svc = service(backend, Some("k"));

        let snapshot = svc.financial_indicators("MSFT", "Microsoft").await.unwrap();
        assert_eq!(snapshot.indicators.len(), 1);
        assert_eq!(snapshot.sources, vec![source(7)]);
    }

    #[tokio::test]
    async fn stock_analysis_carries_sources() {
        let backend = StubBackend::replying("SECTION: RiskFactors\nSupply chain.", vec![source(3)]);
        let svc = service(backend, Some("k"));

        let analysis = svc.stock_analysis("AAPL", "Apple").await.unwrap();
        assert_eq!(analysis.company_name, "Apple");
        assert_eq!(analysis.sections.len(), 1);
        assert_eq!(analysis.sources, vec![source(3)]);
    }

    #[tokio::test]
    async fn backend_and_payload_errors_are_classified() {
        let quota = BackendError::new(Provider::Gemini, BackendErrorKind::Quota, "quota exceeded")
            .with_status(429);
        let svc = service(StubBackend::failing(quota), Some("k"));
        let err = svc.recent_news().await.unwrap_err();
        assert_eq!(err.code(), "backend_error");

        let svc = service(StubBackend::replying("no json here", Vec::new()), Some("k"));
        let err = svc.financial_indicators("X", "X Corp").await.unwrap_err();
        assert_eq!(err.code(), "missing_payload");
    }
}
