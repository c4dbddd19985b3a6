//! Gemini-compatible generate-content client.
//!
//! Unlike the OpenAI variant, authentication travels as a query-string key
//! and the endpoint path embeds the model id.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{provider_error, CommentGenerator};
use crate::error::CommentError;
use crate::prompt::{build_prompt, PromptArgs, SYSTEM_PROMPT};

const DEFAULT_API_HOST: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-pro";
const PROVIDER: &str = "Gemini";

#[derive(Debug)]
pub struct GeminiClient {
    api_key: String,
    api_endpoint: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: String, api_host: Option<String>, model: Option<String>) -> Self {
        let host = api_host
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_HOST.to_string());
        let model = model
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        Self {
            api_key,
            api_endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                host.trim_end_matches('/'),
                model
            ),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CommentGenerator for GeminiClient {
    async fn generate_comment(
        &self,
        args: &PromptArgs,
        template: Option<&str>,
    ) -> Result<String, CommentError> {
        let prompt = build_prompt(args, template);

        let req_body = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: SYSTEM_PROMPT.to_string(),
                }],
            },
            generation_config: GenerationConfig {
                temperature: 0.7,
                max_output_tokens: 500,
                top_p: 0.95,
                top_k: 40,
            },
        };

        debug!(endpoint = %self.api_endpoint, lang = %args.langcode, "sending Gemini generate-content request");

        let response = self
            .client
            .post(&self.api_endpoint)
            .query(&[("key", self.api_key.as_str())])
            .header("Content-Type", "application/json")
            .json(&req_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(PROVIDER, response).await);
        }

        let resp_body: GenerateResponse =
            response.json().await.map_err(|e| CommentError::Provider {
                provider: PROVIDER,
                message: format!("failed to parse response: {e}"),
            })?;

        let text = resp_body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| CommentError::Provider {
                provider: PROVIDER,
                message: "response has no candidates".to_string(),
            })?;

        Ok(text.trim().to_string())
    }
}

// Gemini API request/response structures
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    system_instruction: Content,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}
