use crate::llm::Provider;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// The request never produced an HTTP response (DNS, TLS, timeout, ...).
    Transport,
    /// The credential was rejected.
    Auth,
    /// Rate limit or quota exhausted.
    Quota,
    /// Any other non-success status.
    Http,
    /// A success status whose body could not be decoded.
    Decode,
}

#[derive(Debug, Clone)]
pub struct BackendError {
    pub provider: Provider,
    pub kind: BackendErrorKind,
    pub status: Option<u16>,
    pub detail: String,
    pub raw_output: Option<String>,
}

impl BackendError {
    pub fn new(provider: Provider, kind: BackendErrorKind, detail: impl Into<String>) -> Self {
        Self {
            provider,
            kind,
            status: None,
            detail: detail.into(),
            raw_output: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_raw_output(mut self, raw: impl Into<String>) -> Self {
        self.raw_output = Some(raw.into());
        self
    }

    pub fn is_retryable(&self) -> bool {
        match self.kind {
            BackendErrorKind::Transport | BackendErrorKind::Quota => true,
            BackendErrorKind::Http => matches!(self.status, Some(500..=599)),
            BackendErrorKind::Auth | BackendErrorKind::Decode => false,
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LLM backend error (provider={:?}, kind={:?}",
            self.provider, self.kind
        )?;
        if let Some(status) = self.status {
            write!(f, ", status={status}")?;
        }
        write!(f, "): {}", self.detail)
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_status_when_known() {
        let err = BackendError::new(Provider::Gemini, BackendErrorKind::Quota, "quota exceeded")
            .with_status(429);
        assert_eq!(
            err.to_string(),
            "LLM backend error (provider=Gemini, kind=Quota, status=429): quota exceeded"
        );
        assert!(err.is_retryable());
    }

    #[test]
    fn auth_failures_are_not_retryable() {
        let err = BackendError::new(Provider::Gemini, BackendErrorKind::Auth, "bad key");
        assert!(!err.is_retryable());
    }
}
