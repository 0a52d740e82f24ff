use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use insightpick_core::domain::analysis::StockAnalysis;
use insightpick_core::domain::financials::FinancialSnapshot;
use insightpick_core::domain::news::NewsArticle;
use insightpick_core::domain::profile::UserProfile;
use insightpick_core::domain::recommendation::PortfolioResult;
use insightpick_core::error::InsightError;
use insightpick_core::llm::credential::CredentialCell;
use insightpick_core::llm::error::BackendErrorKind;
use insightpick_core::llm::gemini::GeminiClient;
use insightpick_core::market::{self, EconomicIndicator, VolatilityAlert, VolatilityIndex};
use insightpick_core::service::InsightService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = insightpick_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let credential = match settings.require_gemini_api_key() {
        Ok(key) => CredentialCell::new(Some(key)),
        Err(e) => {
            tracing::warn!(error = %e, "starting API without a credential; set one via PUT /credential");
            CredentialCell::default()
        }
    };

    let backend = GeminiClient::from_settings(&settings)?;
    tracing::info!(model = backend.model(), "using Gemini backend");

    let state = AppState {
        insights: InsightService::new(Arc::new(backend), Arc::new(credential)),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/credential", put(put_credential))
        .route("/portfolio", post(post_portfolio))
        .route("/news", get(get_news))
        .route("/stocks/:ticker/news", get(get_stock_news))
        .route("/stocks/:ticker/indicators", get(get_stock_indicators))
        .route("/stocks/:ticker/analysis", get(get_stock_analysis))
        .route("/market/indicators", get(get_economic_indicators))
        .route("/market/volatility", get(get_volatility))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    insights: InsightService,
}

#[derive(Debug, Serialize)]
struct ApiErrorBody {
    error: &'static str,
    message: String,
    retryable: bool,
}

struct ApiError(InsightError);

impl From<InsightError> for ApiError {
    fn from(e: InsightError) -> Self {
        Self(e)
    }
}

fn status_for(err: &InsightError) -> StatusCode {
    match err {
        InsightError::Credential => StatusCode::UNAUTHORIZED,
        InsightError::Backend(e) => match e.kind {
            BackendErrorKind::Auth => StatusCode::UNAUTHORIZED,
            BackendErrorKind::Quota => StatusCode::TOO_MANY_REQUESTS,
            BackendErrorKind::Transport => StatusCode::GATEWAY_TIMEOUT,
            BackendErrorKind::Http | BackendErrorKind::Decode => StatusCode::BAD_GATEWAY,
        },
        InsightError::MalformedPayload { .. } | InsightError::MissingPayload { .. } => {
            StatusCode::BAD_GATEWAY
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        let body = error_body(&self.0);

        if status.is_server_error() {
            let err = anyhow::Error::new(self.0);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, %status, "insight request failed");
        } else {
            tracing::warn!(error = %self.0, %status, "insight request rejected");
        }

        (status, Json(body)).into_response()
    }
}

fn error_body(err: &InsightError) -> ApiErrorBody {
    ApiErrorBody {
        error: err.code(),
        message: err.to_string(),
        retryable: matches!(err, InsightError::Backend(e) if e.is_retryable()),
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialUpdate {
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct CredentialStatus {
    usable: bool,
}

async fn put_credential(
    State(state): State<AppState>,
    Json(update): Json<CredentialUpdate>,
) -> Json<CredentialStatus> {
    let usable = state.insights.credential().set(update.api_key.as_deref());
    Json(CredentialStatus { usable })
}

async fn post_portfolio(
    State(state): State<AppState>,
    Json(profile): Json<UserProfile>,
) -> Result<Json<PortfolioResult>, ApiError> {
    tracing::info!(%profile, "portfolio requested");
    Ok(Json(state.insights.portfolio_recommendations(&profile).await?))
}

async fn get_news(State(state): State<AppState>) -> Result<Json<Vec<NewsArticle>>, ApiError> {
    Ok(Json(state.insights.recent_news().await?))
}

#[derive(Debug, Deserialize)]
struct CompanyQuery {
    company: Option<String>,
}

impl CompanyQuery {
    /// Falls back to the ticker when the dashboard did not send a name.
    fn name_or<'a>(&'a self, ticker: &'a str) -> &'a str {
        self.company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(ticker)
    }
}

async fn get_stock_news(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<Vec<NewsArticle>>, ApiError> {
    let company = query.name_or(&ticker);
    Ok(Json(state.insights.stock_news(&ticker, company).await?))
}

async fn get_stock_indicators(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<FinancialSnapshot>, ApiError> {
    let company = query.name_or(&ticker);
    Ok(Json(
        state.insights.financial_indicators(&ticker, company).await?,
    ))
}

async fn get_stock_analysis(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<StockAnalysis>, ApiError> {
    let company = query.name_or(&ticker);
    Ok(Json(state.insights.stock_analysis(&ticker, company).await?))
}

async fn get_economic_indicators() -> Json<Vec<EconomicIndicator>> {
    Json(market::economic_indicators())
}

#[derive(Debug, Serialize)]
struct VolatilityResponse {
    international: VolatilityAlert,
    domestic: VolatilityAlert,
}

async fn get_volatility() -> Json<VolatilityResponse> {
    let mut rng = rand::thread_rng();
    Json(VolatilityResponse {
        international: market::sample_volatility(VolatilityIndex::Vix, &mut rng),
        domestic: market::sample_volatility(VolatilityIndex::Vkospi, &mut rng),
    })
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
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

#[cfg(test)]
mod tests {
    use super::*;
    use insightpick_core::llm::error::BackendError;
    use insightpick_core::llm::Provider;

    #[test]
    fn maps_errors_to_statuses() {
        assert_eq!(status_for(&InsightError::Credential), StatusCode::UNAUTHORIZED);

        let quota = BackendError::new(Provider::Gemini, BackendErrorKind::Quota, "slow down");
        assert_eq!(
            status_for(&InsightError::Backend(quota)),
            StatusCode::TOO_MANY_REQUESTS
        );

        let http = BackendError::new(Provider::Gemini, BackendErrorKind::Http, "boom").with_status(500);
        assert_eq!(status_for(&InsightError::Backend(http)), StatusCode::BAD_GATEWAY);

        assert_eq!(
            status_for(&InsightError::missing_payload("prose")),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn error_body_flags_retryable_backend_failures() {
        let quota = BackendError::new(Provider::Gemini, BackendErrorKind::Quota, "slow down");
        let body = error_body(&InsightError::Backend(quota));
        assert_eq!(body.error, "backend_error");
        assert!(body.retryable);

        let body = error_body(&InsightError::Credential);
        assert_eq!(body.error, "credential_missing");
        assert!(!body.retryable);
    }

    #[test]
    fn company_defaults_to_ticker() {
        let q = CompanyQuery { company: None };
        assert_eq!(q.name_or("AAPL"), "AAPL");
        let q = CompanyQuery {
            company: Some(" Apple Inc. ".to_string()),
        };
        assert_eq!(q.name_or("AAPL"), "Apple Inc.");
    }
}
