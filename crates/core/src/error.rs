use crate::domain::warning::excerpt;
use crate::llm::error::BackendError;

/// Attempted payloads are cut to this many characters in errors.
pub const PAYLOAD_EXCERPT_CHARS: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum InsightError {
    #[error("no usable API credential is configured; set one before requesting insights")]
    Credential,

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("malformed model payload: {detail} (attempted: '{excerpt}')")]
    MalformedPayload { detail: String, excerpt: String },

    #[error("model response contains no JSON payload (response: '{excerpt}')")]
    MissingPayload { excerpt: String },
}

impl InsightError {
    pub fn malformed(detail: impl Into<String>, attempted: &str) -> Self {
        Self::MalformedPayload {
            detail: detail.into(),
            excerpt: excerpt(attempted, PAYLOAD_EXCERPT_CHARS),
        }
    }

    pub fn missing_payload(response: &str) -> Self {
        Self::MissingPayload {
            excerpt: excerpt(response, PAYLOAD_EXCERPT_CHARS),
        }
    }

    /// Short machine-readable classification for outer surfaces.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Credential => "credential_missing",
            Self::Backend(_) => "backend_error",
            Self::MalformedPayload { .. } => "malformed_payload",
            Self::MissingPayload { .. } => "missing_payload",
        }
    }
}
