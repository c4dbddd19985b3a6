//! LLM provider clients and the factory that selects between them.
//!
//! The set of providers is a closed enum, so dispatch stays exhaustively
//! checkable; the `CommentGenerator` trait is the seam mocks implement in
//! tests.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{CommentError, ConfigError};
use crate::prompt::PromptArgs;
use common::{LlmSettings, Provider};

pub mod gemini;
pub mod openai;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Capability of turning prompt inputs into one generated comment.
#[async_trait]
pub trait CommentGenerator: Send + Sync {
    /// Generate a single comment for `args`, optionally with a
    /// user-configured prompt template.
    async fn generate_comment(
        &self,
        args: &PromptArgs,
        template: Option<&str>,
    ) -> Result<String, CommentError>;
}

/// The configured provider client. Stateless aside from credentials,
/// model id and host.
#[derive(Debug)]
pub enum LlmService {
    OpenAi(OpenAiClient),
    Gemini(GeminiClient),
}

#[async_trait]
impl CommentGenerator for LlmService {
    async fn generate_comment(
        &self,
        args: &PromptArgs,
        template: Option<&str>,
    ) -> Result<String, CommentError> {
        match self {
            LlmService::OpenAi(client) => client.generate_comment(args, template).await,
            LlmService::Gemini(client) => client.generate_comment(args, template).await,
        }
    }
}

/// Build the client matching `settings.provider`. Pure construction: no
/// network I/O happens here, so a misconfiguration fails before any call.
pub fn create_service(settings: &LlmSettings) -> Result<LlmService, ConfigError> {
    let provider = settings.provider.ok_or(ConfigError::NoProvider)?;
    match provider {
        Provider::OpenAi => {
            let block = settings.openai.clone().unwrap_or_default();
            let api_key = require_api_key(block.api_key, provider)?;
            Ok(LlmService::OpenAi(OpenAiClient::new(
                api_key,
                block.api_host,
                block.model,
            )))
        }
        Provider::Gemini => {
            let block = settings.gemini.clone().unwrap_or_default();
            let api_key = require_api_key(block.api_key, provider)?;
            Ok(LlmService::Gemini(GeminiClient::new(
                api_key,
                block.api_host,
                block.model,
            )))
        }
    }
}

fn require_api_key(key: Option<String>, provider: Provider) -> Result<String, ConfigError> {
    key.filter(|k| !k.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey {
            provider: provider.name(),
        })
}

// Error payload shape shared by both providers:
// { "error": { "message": "..." } }
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: Option<String>,
}

/// Turn a non-success HTTP response into a `CommentError::Provider`,
/// preferring the provider's own error message and falling back to the
/// status text when the body is unparseable.
pub(crate) async fn provider_error(
    provider: &'static str,
    response: reqwest::Response,
) -> CommentError {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error.and_then(|e| e.message),
        Err(_) => None,
    }
    .unwrap_or_else(|| status.to_string());

    CommentError::Provider { provider, message }
}
