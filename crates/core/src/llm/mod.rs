pub mod credential;
pub mod error;
pub mod gemini;
pub mod prompts;

use crate::domain::recommendation::CitationSource;
use crate::llm::credential::Credential;
use crate::llm::error::BackendError;

#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    /// Let the model ground its answer with web search.
    pub enable_retrieval: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Completion {
    pub text: String,
    /// Grounding metadata, in the order the backend reported it.
    pub citations: Vec<CitationSource>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
}

#[async_trait::async_trait]
pub trait CompletionBackend: Send + Sync {
    fn provider(&self) -> Provider;

    async fn complete(
        &self,
        credential: &Credential,
        request: CompletionRequest,
    ) -> Result<Completion, BackendError>;
}
