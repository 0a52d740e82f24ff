pub mod domain;
pub mod error;
pub mod llm;
pub mod market;
pub mod parse;
pub mod service;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub gemini_api_key: Option<String>,
        pub gemini_base_url: Option<String>,
        pub gemini_model: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                gemini_api_key: std::env::var("GEMINI_API_KEY")
                    .or_else(|_| std::env::var("API_KEY"))
                    .ok(),
                gemini_base_url: std::env::var("GEMINI_BASE_URL").ok(),
                gemini_model: std::env::var("GEMINI_MODEL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }

        pub fn require_gemini_api_key(&self) -> anyhow::Result<&str> {
            self.gemini_api_key
                .as_deref()
                .filter(|k| crate::llm::credential::Credential::parse(k).is_some())
                .context("GEMINI_API_KEY is required")
        }
    }
}
