//! OpenAI-compatible chat-completion client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{provider_error, CommentGenerator};
use crate::error::CommentError;
use crate::prompt::{build_prompt, PromptArgs, SYSTEM_PROMPT};

const DEFAULT_API_HOST: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";
const PROVIDER: &str = "OpenAI";

#[derive(Debug)]
pub struct OpenAiClient {
    api_key: String,
    api_host: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: String, api_host: Option<String>, model: Option<String>) -> Self {
        Self {
            api_key,
            api_host: api_host
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_HOST.to_string()),
            model: model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl CommentGenerator for OpenAiClient {
    async fn generate_comment(
        &self,
        args: &PromptArgs,
        template: Option<&str>,
    ) -> Result<String, CommentError> {
        let prompt = build_prompt(args, template);
        let url = format!("{}/chat/completions", self.api_host.trim_end_matches('/'));

        let req_body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            temperature: 0.7,
            max_tokens: 500,
        };

        debug!(model = %self.model, lang = %args.langcode, "sending OpenAI chat completion request");

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&req_body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(PROVIDER, response).await);
        }

        let resp_body: ChatResponse =
            response.json().await.map_err(|e| CommentError::Provider {
                provider: PROVIDER,
                message: format!("failed to parse response: {e}"),
            })?;

        let text = resp_body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CommentError::Provider {
                provider: PROVIDER,
                message: "response has no choices".to_string(),
            })?;

        Ok(text.trim().to_string())
    }
}

// OpenAI API request/response structures
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}
