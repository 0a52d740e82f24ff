use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use insightpick_core::domain::profile::{
    InvestmentGoal, InvestmentStrategy, MarketPreference, RiskAppetite, UserProfile,
};
use insightpick_core::llm::credential::CredentialCell;
use insightpick_core::llm::gemini::GeminiClient;
use insightpick_core::parse;
use insightpick_core::service::InsightService;

#[derive(Debug, Parser)]
#[command(name = "insightpick")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Ask the model for a portfolio matching an investor profile.
    Portfolio {
        #[arg(long, default_value = "balanced")]
        goal: InvestmentGoal,
        #[arg(long, default_value = "medium")]
        risk: RiskAppetite,
        #[arg(long, default_value = "both")]
        market: MarketPreference,
        #[arg(long, default_value = "undefined")]
        strategy: InvestmentStrategy,
    },
    /// Latest market-wide news.
    News,
    /// News about one company.
    StockNews(StockArgs),
    /// Key financial indicators for one company.
    Indicators(StockArgs),
    /// Sectioned analysis of one company.
    Analysis(StockArgs),
    /// Run a parser over a saved model response without calling the backend.
    Parse {
        kind: ParseKind,
        file: PathBuf,
    },
}

#[derive(Debug, clap::Args)]
struct StockArgs {
    ticker: String,
    /// Company name used in the prompt. Defaults to the ticker.
    #[arg(long)]
    company: Option<String>,
}

impl StockArgs {
    fn company(&self) -> &str {
        self.company.as_deref().unwrap_or(&self.ticker)
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ParseKind {
    Portfolio,
    News,
    Financials,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = insightpick_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(args.command, &settings).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "command failed");
    }
    result
}

fn connect(settings: &insightpick_core::config::Settings) -> anyhow::Result<InsightService> {
    let key = settings.require_gemini_api_key()?;
    let backend = GeminiClient::from_settings(settings)?;
    tracing::debug!(model = backend.model(), "using Gemini backend");
    Ok(InsightService::new(
        Arc::new(backend),
        Arc::new(CredentialCell::new(Some(key))),
    ))
}

async fn run(
    command: Command,
    settings: &insightpick_core::config::Settings,
) -> anyhow::Result<()> {
    let output = match command {
        Command::Portfolio {
            goal,
            risk,
            market,
            strategy,
        } => {
            let profile = UserProfile {
                investment_goal: goal,
                risk_appetite: risk,
                market_preference: market,
                investment_strategy: strategy,
            };
            tracing::info!(%profile, "requesting portfolio");
            let result = connect(settings)?
                .portfolio_recommendations(&profile)
                .await?;
            for warning in &result.warnings {
                tracing::warn!(%warning, "portfolio parse warning");
            }
            serde_json::to_value(result)?
        }
        Command::News => serde_json::to_value(connect(settings)?.recent_news().await?)?,
        Command::StockNews(stock) => serde_json::to_value(
            connect(settings)?
                .stock_news(&stock.ticker, stock.company())
                .await?,
        )?,
        Command::Indicators(stock) => serde_json::to_value(
            connect(settings)?
                .financial_indicators(&stock.ticker, stock.company())
                .await?,
        )?,
        Command::Analysis(stock) => serde_json::to_value(
            connect(settings)?
                .stock_analysis(&stock.ticker, stock.company())
                .await?,
        )?,
        Command::Parse { kind, file } => parse_saved_response(kind, &file)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn parse_saved_response(
    kind: ParseKind,
    file: &std::path::Path,
) -> anyhow::Result<serde_json::Value> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;

    let value = match kind {
        ParseKind::Portfolio => serde_json::to_value(parse::parse_portfolio_text(&text))?,
        ParseKind::News => serde_json::to_value(parse::parse_news_json(&text)?)?,
        ParseKind::Financials => serde_json::to_value(parse::parse_financial_json(&text)?)?,
    };
    Ok(value)
}

fn init_sentry(settings: &insightpick_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
