use crate::domain::analysis::AnalysisTopic;
use crate::domain::news::NewsCategory;
use crate::domain::profile::{InvestmentStrategy, MarketPreference, UserProfile};

pub const END_OF_RESPONSE: &str = "---END OF RESPONSE---";

const NO_FENCES: &str = "Do not use markdown code fences such as ```json.";

const ESCAPE_QUOTES: &str = "If a JSON string value contains a double quote (\"), escape it with a backslash (\\\").";

pub fn portfolio_prompt(profile: &UserProfile) -> String {
    let (market_instruction, ticker_example) = match profile.market_preference {
        MarketPreference::Kr => (
            "Recommend mainly Korean stocks (KOSPI, KOSDAQ).",
            "005930.KS, 035720.KS (Korean stocks)",
        ),
        MarketPreference::Us => (
            "Recommend mainly US stocks (NYSE, NASDAQ).",
            "AAPL, MSFT (US stocks)",
        ),
        MarketPreference::Both => (
            "Recommend a mix of US and Korean stocks.",
            "AAPL (US stock), 005930.KS (Korean stock)",
        ),
    };

    let strategy_instruction = match profile.investment_strategy {
        InvestmentStrategy::Undefined => "The user has not chosen a specific investment strategy. \
Base the recommendations on overall market conditions and the user profile."
            .to_string(),
        strategy => format!(
            "The user's main investment strategy is '{}'. Prefer stocks that fit this strategy \
and mention how each one relates to it in the rationale.",
            strategy.label()
        ),
    };

    [
        "You are InsightPick, a professional financial advisory AI.".to_string(),
        "User profile:".to_string(),
        format!("- Investment goal: {}", profile.investment_goal.label()),
        format!("- Risk appetite: {}", profile.risk_appetite.label()),
        format!("- Preferred market: {}", profile.market_preference.label()),
        format!("- Investment strategy: {}", profile.investment_strategy.label()),
        String::new(),
        market_instruction.to_string(),
        strategy_instruction,
        "Base your answer on the latest economic indicators, market trends and financial news \
found with Google Search."
            .to_string(),
        String::new(),
        "Label every section exactly as shown below.".to_string(),
        NO_FENCES.to_string(),
        String::new(),
        "SECTION: PortfolioSummary".to_string(),
        "[A short overall summary of the portfolio strategy (at most 3 sentences) and why it \
fits the user's goal, risk appetite and strategy.]"
            .to_string(),
        String::new(),
        "SECTION: StockRecommendations".to_string(),
        "[3-5 stock recommendations matching the market preference and strategy. Every \
recommendation must start with \"- Ticker:\". Give each one an AllocationPercentage; all \
AllocationPercentage values must add up to 100. If you cannot suggest an allocation, omit the \
field.]"
            .to_string(),
        format!("- Ticker: [ticker symbol, e.g. {ticker_example}]"),
        "- CompanyName: [full company name]".to_string(),
        "- Rationale: [concise rationale tied to current conditions, news and the user's \
strategy; at most 2 sentences]"
            .to_string(),
        "- ConfidenceScore: [a number from 0 to 100, if it can be estimated]".to_string(),
        "- AllocationPercentage: [portfolio share in percent, e.g. 30 means 30%]".to_string(),
        String::new(),
        "SECTION: KeyInsights".to_string(),
        "[2-3 key market insights or news snippets that shaped these recommendations.]"
            .to_string(),
        "- Insight: [insight or news summary]".to_string(),
        "- (Optional) SourceDetails: [short mention of the source if taken from search results]"
            .to_string(),
        String::new(),
        END_OF_RESPONSE.to_string(),
    ]
    .join("\n")
}

pub fn market_news_prompt() -> String {
    let categories = NewsCategory::MARKET
        .iter()
        .map(|c| c.label())
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a financial news aggregator AI. Use Google Search to find the 5 most important \
financial news articles from the last 24-48 hours.\n\
Respond with a perfectly valid JSON array where each element has these fields. {ESCAPE_QUOTES}\n\
[\n\
  {{\n\
    \"title\": \"article title\",\n\
    \"summary\": \"2-3 sentence summary\",\n\
    \"url\": \"the real article URL from the search results\",\n\
    \"sourceName\": \"publisher or site name (e.g. 'Reuters', 'Bloomberg', 'yna.co.kr')\",\n\
    \"category\": \"one of: {categories}\",\n\
    \"publishedDateText\": \"publication date, or 'recent' if unknown\"\n\
  }}\n\
]\n\
The response must contain only the JSON array from start to end and nothing else. Every URL \
must be a real, reachable URL confirmed through Google Search. {NO_FENCES}"
    )
}

pub fn stock_news_prompt(ticker: &str, company_name: &str) -> String {
    format!(
        "You are a news aggregation AI. Use Google Search to find 2-3 news articles about \
{company_name} (ticker: {ticker}) from the last 3 months.\n\
Respond with a perfectly valid JSON array whose objects contain \"title\", \"summary\" (2-3 \
sentences), \"url\" (from the search results), \"sourceName\" and \"publishedDateText\". \
{ESCAPE_QUOTES}\n\
Always set \"category\" to \"{company_news}\".\n\
Example:\n\
[\n\
  {{\n\
    \"title\": \"{company_name} announces new product\",\n\
    \"summary\": \"{company_name} announced an innovative product today...\",\n\
    \"url\": \"https://example.com/news/article1\",\n\
    \"sourceName\": \"Example News Provider\",\n\
    \"publishedDateText\": \"2024-07-28\",\n\
    \"category\": \"{company_news}\"\n\
  }}\n\
]\n\
Make sure every URL is valid and taken directly from the search results. If no relevant news \
can be found, return an empty array []. The response must contain only the JSON array. \
{NO_FENCES}",
        company_news = NewsCategory::CompanyNews.label(),
    )
}

pub fn financial_indicators_prompt(ticker: &str, company_name: &str) -> String {
    format!(
        "You are a financial data analysis AI. Use Google Search to find the latest key \
financial indicators for {company_name} (ticker: {ticker}).\n\
For each indicator provide 'id', 'name', 'value' and, where possible, 'notes' (e.g. TTM, \
latest quarter) as a perfectly valid JSON object. {ESCAPE_QUOTES}\n\
The response must use this format and contain only the JSON object. {NO_FENCES}\n\
{{\n\
  \"indicators\": [\n\
    {{ \"id\": \"pe_ratio\", \"name\": \"P/E ratio\", \"value\": \"value\", \"notes\": \"details\" }},\n\
    {{ \"id\": \"eps\", \"name\": \"Earnings per share (EPS)\", \"value\": \"value USD\", \"notes\": \"details\" }}\n\
  ],\n\
  \"dataAsOf\": \"YYYY-MM-DD or 'latest available'\",\n\
  \"dataComment\": \"optional comment on data freshness and accuracy\"\n\
}}\n\
All figures should reflect the most recent information available. Indicators without data may \
be omitted."
    )
}

pub fn stock_analysis_prompt(ticker: &str, company_name: &str) -> String {
    let instructions = |topic: &AnalysisTopic| -> String {
        match topic {
            AnalysisTopic::FinancialHealthSummary => "[Brief overview of financial health: general \
trends in revenue, profitability and debt from public information. Do not invent figures that \
were not found through search.]"
                .to_string(),
            AnalysisTopic::GrowthPotential => "[Potential growth drivers such as new products, \
market expansion or competitive advantages, based on recent news or announcements.]"
                .to_string(),
            AnalysisTopic::RiskFactors => "[Key risk factors: industry risks, company-specific \
challenges and exposure to market volatility, referencing recent developments.]"
                .to_string(),
            AnalysisTopic::AnalystSentimentOverview => "[General summary of analyst sentiment \
(e.g. \"generally optimistic\", \"mixed\", \"cautious after recent events\") if identifiable \
from recent search results. Avoid specific price targets unless widely reported.]"
                .to_string(),
            AnalysisTopic::RecentNewsImpact => format!(
                "[Short summary of the potential impact of 1-2 significant recent news items \
specifically about {company_name}.]"
            ),
            AnalysisTopic::Other(_) => String::new(),
        }
    };

    let mut lines = vec![
        format!(
            "You are a professional financial analyst AI. Provide a detailed analysis of \
{company_name} (ticker: {ticker})."
        ),
        "Focus on information discoverable through Google Search and structure the answer \
clearly."
            .to_string(),
        NO_FENCES.to_string(),
        String::new(),
    ];
    for topic in &AnalysisTopic::REQUESTED {
        lines.push(format!("SECTION: {}", topic.section_name()));
        lines.push(instructions(topic));
        lines.push(String::new());
    }
    lines.push(END_OF_RESPONSE.to_string());
    lines.join("\n")
}
