/*!
common/src/lib.rs

Shared data shapes and the settings store for Commentor.

This file provides:
- Settings data structures (LLM provider selection + credentials)
- Keyword entries used for link injection into generated comments
- The extracted-article shape produced by the extraction pipeline
- A JSON-file-backed key-value store with a load-once / save-on-mutation
  lifecycle, wire-compatible with the browser extension's exported storage
  (camelCase keys, `llmSettings` and `keywords` at the top level)
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

/// Which LLM backend is configured. Absent (`None` in `LlmSettings.provider`)
/// means the user has not picked one yet; that is a configuration error at
/// generation time, not a silent default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Gemini,
}

impl Provider {
    pub fn name(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Gemini => "Gemini",
        }
    }
}

/// Credentials block for an OpenAI-compatible endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    /// Base URL override, e.g. for a proxy or a compatible local server.
    pub api_host: Option<String>,
    pub model: Option<String>,
}

/// Credentials block for a Gemini-compatible endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub api_host: Option<String>,
    pub model: Option<String>,
}

/// Persisted LLM configuration (storage key `llmSettings`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmSettings {
    #[serde(default)]
    pub provider: Option<Provider>,
    /// Optional override for the built-in prompt template. Recognized
    /// placeholders: {content}, {keywords}, {lang}, {word_count}.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<OpenAiSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini: Option<GeminiSettings>,
}

fn default_enabled() -> bool {
    true
}

/// A user-configured (keyword, url, enabled) tuple (storage key `keywords`).
/// Keywords are matched as whole words, case-insensitively; disabled entries
/// are skipped by both the link rewriter and the highlighter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordEntry {
    pub keyword: String,
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl KeywordEntry {
    pub fn new(keyword: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            keyword: keyword.into(),
            url: url.into(),
            enabled: true,
        }
    }
}

/// Readable article content extracted from a web page. All fields are
/// best-effort; extraction failure is reported as an error, never as a
/// partially-filled record pretending to be complete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    pub title: String,
    /// Plain-text article body.
    pub content: String,
    pub excerpt: String,
    pub byline: String,
    pub site_name: String,
    pub url: String,
}

/// Everything the store persists, as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredState {
    #[serde(default)]
    pub llm_settings: LlmSettings,
    #[serde(default)]
    pub keywords: Vec<KeywordEntry>,
}

/// JSON-file-backed settings store.
///
/// Reads the whole document on every get and rewrites it on every set.
/// Writes are serialized behind a mutex so two concurrent mutations cannot
/// interleave into a lost update; a missing file reads as defaults.
pub struct SettingsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full persisted state. A missing file is not an error.
    pub async fn load(&self) -> Result<StoredState> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) => serde_json::from_str(&data).with_context(|| {
                format!("failed to parse settings file: {}", self.path.display())
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "settings file not found, using defaults");
                Ok(StoredState::default())
            }
            Err(e) => Err(e).with_context(|| {
                format!("failed to read settings file: {}", self.path.display())
            }),
        }
    }

    async fn save(&self, state: &StoredState) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("failed to create settings directory: {}", parent.display())
                })?;
            }
        }
        let data = serde_json::to_string_pretty(state).context("failed to serialize settings")?;
        tokio::fs::write(&self.path, data).await.with_context(|| {
            format!("failed to write settings file: {}", self.path.display())
        })?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    pub async fn llm_settings(&self) -> Result<LlmSettings> {
        Ok(self.load().await?.llm_settings)
    }

    pub async fn save_llm_settings(&self, settings: &LlmSettings) -> Result<()> {
        let mut state = self.load().await?;
        state.llm_settings = settings.clone();
        self.save(&state).await
    }

    pub async fn keywords(&self) -> Result<Vec<KeywordEntry>> {
        Ok(self.load().await?.keywords)
    }

    pub async fn save_keywords(&self, keywords: &[KeywordEntry]) -> Result<()> {
        let mut state = self.load().await?;
        state.keywords = keywords.to_vec();
        self.save(&state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_parse_extension_export() {
        // Shape produced by the browser extension's storage export
        let json = r#"{
            "llmSettings": {
                "provider": "openai",
                "promptTemplate": "Comment on: {content}",
                "openai": { "apiKey": "sk-test", "model": "gpt-4o" }
            },
            "keywords": [
                { "keyword": "rust", "url": "https://rust-lang.org" },
                { "keyword": "tokio", "url": "https://tokio.rs", "enabled": false }
            ]
        }"#;

        let state: StoredState = serde_json::from_str(json).expect("parse state");
        assert_eq!(state.llm_settings.provider, Some(Provider::OpenAi));
        assert_eq!(
            state.llm_settings.openai.as_ref().and_then(|o| o.api_key.as_deref()),
            Some("sk-test")
        );
        // `enabled` defaults to true when absent
        assert!(state.keywords[0].enabled);
        assert!(!state.keywords[1].enabled);
    }

    #[test]
    fn extracted_content_uses_camel_case() {
        let content = ExtractedContent {
            title: "T".into(),
            site_name: "Example".into(),
            ..Default::default()
        };
        let json = serde_json::to_string(&content).expect("serialize");
        assert!(json.contains("\"siteName\":\"Example\""));
    }

    #[tokio::test]
    async fn store_roundtrip_and_missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SettingsStore::new(dir.path().join("settings.json"));

        // Missing file reads as defaults
        let state = store.load().await.expect("load defaults");
        assert!(state.llm_settings.provider.is_none());
        assert!(state.keywords.is_empty());

        let keywords = vec![KeywordEntry::new("rust", "https://rust-lang.org")];
        store.save_keywords(&keywords).await.expect("save keywords");

        let settings = LlmSettings {
            provider: Some(Provider::Gemini),
            ..Default::default()
        };
        store.save_llm_settings(&settings).await.expect("save settings");

        // Saving one key must not clobber the other
        let state = store.load().await.expect("reload");
        assert_eq!(state.keywords, keywords);
        assert_eq!(state.llm_settings.provider, Some(Provider::Gemini));
    }
}
