use crate::config::Settings;
use crate::domain::recommendation::CitationSource;
use crate::llm::credential::Credential;
use crate::llm::error::{BackendError, BackendErrorKind};
use crate::llm::{Completion, CompletionBackend, CompletionRequest, Provider};
use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let base_url = settings
            .gemini_base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let model = settings
            .gemini_model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            http,
            base_url,
            model,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    fn error(kind: BackendErrorKind, detail: impl Into<String>) -> BackendError {
        BackendError::new(Provider::Gemini, kind, detail)
    }

    async fn generate_content(
        &self,
        credential: &Credential,
        req: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, BackendError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(credential.expose()).map_err(|_| {
            Self::error(
                BackendErrorKind::Auth,
                "API key contains characters that are not valid in a header",
            )
        })?;
        headers.insert("x-goog-api-key", key);

        let res = self
            .http
            .post(self.url())
            .headers(headers)
            .json(req)
            .send()
            .await
            .map_err(|e| Self::error(BackendErrorKind::Transport, format!("request failed: {e}")))?;

        let status = res.status();
        let text = res.text().await.map_err(|e| {
            Self::error(
                BackendErrorKind::Transport,
                format!("failed to read response body: {e}"),
            )
        })?;

        if !status.is_success() {
            return Err(map_http_error(status, text));
        }

        serde_json::from_str::<GenerateContentResponse>(&text).map_err(|e| {
            Self::error(
                BackendErrorKind::Decode,
                format!("failed to decode generateContent response: {e}"),
            )
            .with_status(status.as_u16())
            .with_raw_output(text)
        })
    }
}

#[async_trait::async_trait]
impl CompletionBackend for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    async fn complete(
        &self,
        credential: &Credential,
        request: CompletionRequest,
    ) -> Result<Completion, BackendError> {
        let body = GenerateContentRequest::new(request.prompt, request.enable_retrieval);
        let res = self.generate_content(credential, &body).await?;

        if let Some(reason) = res.prompt_feedback.as_ref().and_then(|f| f.block_reason.as_deref())
        {
            return Err(Self::error(
                BackendErrorKind::Http,
                format!("prompt was blocked: {reason}"),
            ));
        }

        let Some(candidate) = res.candidates.into_iter().next() else {
            tracing::warn!(model = %self.model, "Gemini returned no candidates");
            return Ok(Completion::default());
        };

        if matches!(candidate.finish_reason.as_deref(), Some("MAX_TOKENS")) {
            tracing::warn!(model = %self.model, "Gemini stopped at max tokens; output may be truncated");
        }

        Ok(Completion {
            text: candidate.text(),
            citations: candidate.citations(),
        })
    }
}

fn map_http_error(status: StatusCode, body: String) -> BackendError {
    let api_error = serde_json::from_str::<ErrorWrapper>(&body).ok().map(|w| w.error);
    let message = api_error
        .as_ref()
        .and_then(|e| e.message.clone())
        .unwrap_or_else(|| format!("status={status}"));
    let api_status = api_error.and_then(|e| e.status).unwrap_or_default();

    let kind = match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => BackendErrorKind::Auth,
        StatusCode::TOO_MANY_REQUESTS => BackendErrorKind::Quota,
        // Invalid keys come back as 400 INVALID_ARGUMENT.
        StatusCode::BAD_REQUEST if message.contains("API key") => BackendErrorKind::Auth,
        _ if api_status == "RESOURCE_EXHAUSTED" => BackendErrorKind::Quota,
        _ => BackendErrorKind::Http,
    };

    let detail = if api_status.is_empty() {
        message
    } else {
        format!("{api_status}: {message}")
    };

    BackendError::new(Provider::Gemini, kind, detail)
        .with_status(status.as_u16())
        .with_raw_output(body)
}

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
}

impl GenerateContentRequest {
    fn new(prompt: String, enable_retrieval: bool) -> Self {
        let tools = if enable_retrieval {
            vec![Tool {
                google_search: serde_json::json!({}),
            }]
        } else {
            Vec::new()
        };

        Self {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            tools,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

impl Candidate {
    fn text(&self) -> String {
        let mut out = String::new();
        let parts = self.content.iter().flat_map(|c| c.parts.iter());
        for text in parts.filter_map(|p| p.text.as_deref()) {
            out.push_str(text);
        }
        out
    }

    fn citations(&self) -> Vec<CitationSource> {
        let Some(meta) = &self.grounding_metadata else {
            return Vec::new();
        };
        meta.grounding_chunks
            .iter()
            .filter_map(|chunk| chunk.web.as_ref())
            .filter_map(|web| match (&web.uri, &web.title) {
                (Some(uri), Some(title)) if !uri.is_empty() && !title.is_empty() => {
                    Some(CitationSource {
                        title: title.clone(),
                        uri: uri.clone(),
                    })
                }
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Clone, Deserialize)]
struct PartResponse {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Clone, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Clone, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_enables_google_search_tool() {
        let req = GenerateContentRequest::new("hello".to_string(), true);
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(
            v,
            json!({
                "contents": [{"role": "user", "parts": [{"text": "hello"}]}],
                "tools": [{"googleSearch": {}}],
            })
        );

        let plain = serde_json::to_value(GenerateContentRequest::new("hi".to_string(), false))
            .unwrap();
        assert!(plain.get("tools").is_none());
    }

    #[test]
    fn decodes_text_and_grounding_chunks_in_order() {
        let raw = json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "SECTION: "}, {"text": "PortfolioSummary\nok"}]},
                "finishReason": "STOP",
                "groundingMetadata": {
                    "groundingChunks": [
                        {"web": {"uri": "https://b.example/2", "title": "Second"}},
                        {"web": {"uri": "https://a.example/1"}},
                        {"web": {"uri": "https://a.example/1", "title": "First"}},
                        {"retrievedContext": {"uri": "gs://ignored"}}
                    ]
                }
            }]
        });

        let res: GenerateContentResponse = serde_json::from_value(raw).unwrap();
        let candidate = &res.candidates[0];
        assert_eq!(candidate.text(), "SECTION: PortfolioSummary\nok");

        let citations = candidate.citations();
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].title, "Second");
        assert_eq!(citations[1].uri, "https://a.example/1");
    }

    #[test]
    fn maps_http_errors_to_kinds() {
        let body = json!({"error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}}).to_string();
        let err = map_http_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.kind, BackendErrorKind::Auth);
        assert_eq!(err.status, Some(400));
        assert!(err.detail.starts_with("INVALID_ARGUMENT: API key not valid"));

        let body = json!({"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}).to_string();
        assert_eq!(
            map_http_error(StatusCode::TOO_MANY_REQUESTS, body).kind,
            BackendErrorKind::Quota
        );

        let err = map_http_error(StatusCode::BAD_GATEWAY, "<html>oops</html>".to_string());
        assert_eq!(err.kind, BackendErrorKind::Http);
        assert_eq!(err.raw_output.as_deref(), Some("<html>oops</html>"));
    }
}
