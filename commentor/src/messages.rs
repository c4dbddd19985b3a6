//! The action-tagged message contract between surfaces, rendered as serde
//! shapes plus an async dispatcher. Suitable for driving the engine from a
//! native-messaging host: one JSON request in, one JSON response out.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::extraction;
use common::ExtractedContent;

/// Incoming request, discriminated by its `action` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    ExtractContent { url: String },
    GetPageLanguage { url: String },
    Ping,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ExtractedContent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LanguageResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Handle one request. Failures come back as `{ success: false, error }`;
/// this function never panics on collaborator errors.
pub async fn dispatch(request: Request) -> serde_json::Value {
    debug!(?request, "dispatching message");
    match request {
        Request::ExtractContent { url } => {
            let response = match extraction::extract_content(&url).await {
                Ok(data) => ExtractResponse {
                    success: true,
                    data: Some(data),
                    error: None,
                },
                Err(e) => ExtractResponse {
                    success: false,
                    data: None,
                    error: Some(e.to_string()),
                },
            };
            to_value(&response)
        }
        Request::GetPageLanguage { url } => {
            let response = match extraction::fetch_page(&url).await {
                Ok(html) => LanguageResponse {
                    success: true,
                    lang: Some(extraction::detect_language(&html)),
                    error: None,
                },
                Err(e) => LanguageResponse {
                    success: false,
                    lang: None,
                    error: Some(e.to_string()),
                },
            };
            to_value(&response)
        }
        Request::Ping => json!({ "success": true, "message": "commentor is ready" }),
    }
}

fn to_value<T: Serialize>(response: &T) -> serde_json::Value {
    serde_json::to_value(response)
        .unwrap_or_else(|e| json!({ "success": false, "error": e.to_string() }))
}
