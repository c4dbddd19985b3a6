//! Readable-article extraction and page-language detection.
//!
//! Readability pulls the main article out of the page HTML; the result is
//! converted to plain text for LLM input, with page metadata filled in
//! best-effort from meta tags.

use anyhow::{Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use std::io::Cursor;
use tracing::{info, warn};

use common::ExtractedContent;

const USER_AGENT: &str = "Commentor/0.1.0";
const EXCERPT_CHARS: usize = 200;

/// Fetch the raw HTML of a page.
pub async fn fetch_page(url: &str) -> Result<String> {
    let client = Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build reqwest client")?;

    let response = client
        .get(url)
        .send()
        .await
        .context("failed to fetch page")?;

    let status = response.status();
    if !status.is_success() {
        return Err(anyhow::anyhow!("page fetch failed with status: {}", status));
    }

    response.text().await.context("failed to read page body")
}

/// Fetch a page and extract its readable article content.
pub async fn extract_content(url: &str) -> Result<ExtractedContent> {
    let html = fetch_page(url).await?;
    extract_from_html(&html, url)
}

/// Extract the readable article from already-fetched HTML.
pub fn extract_from_html(html: &str, url: &str) -> Result<ExtractedContent> {
    let url_obj = url::Url::parse(url).context("failed to parse page URL")?;

    let mut reader = Cursor::new(html.as_bytes());
    let product = readability::extractor::extract(&mut reader, &url_obj)
        .map_err(|e| anyhow::anyhow!("readability extraction failed: {}", e))?;

    // Convert the article HTML to plain text for LLM input; fall back to
    // readability's own text rendering if the conversion fails
    let content = match html2text::from_read(product.content.as_bytes(), 80) {
        Ok(text) => text,
        Err(e) => {
            warn!("failed to convert extracted HTML to text: {}", e);
            product.text.clone()
        }
    };

    let excerpt = meta_content(html, &["description", "og:description"])
        .unwrap_or_else(|| truncate_chars(content.trim(), EXCERPT_CHARS));

    let extracted = ExtractedContent {
        title: product.title,
        content,
        excerpt,
        byline: meta_content(html, &["author", "article:author"]).unwrap_or_default(),
        site_name: meta_content(html, &["og:site_name"]).unwrap_or_default(),
        url: url.to_string(),
    };

    info!(
        url = %url,
        title = %extracted.title,
        chars = extracted.content.len(),
        "extracted article content"
    );
    Ok(extracted)
}

/// Primary language subtag of the document's `<html lang>` attribute,
/// lowercased ("zh-CN" becomes "zh"). Empty when the page declares none;
/// callers treat an empty code as English.
pub fn detect_language(html: &str) -> String {
    let document = Html::parse_document(html);
    let Ok(selector) = Selector::parse("html") else {
        return String::new();
    };
    document
        .select(&selector)
        .next()
        .and_then(|root| root.value().attr("lang"))
        .map(primary_subtag)
        .unwrap_or_default()
}

fn primary_subtag(lang: &str) -> String {
    lang.split(['-', '_'])
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

// First matching <meta name=...> or <meta property=...> content attribute.
fn meta_content(html: &str, names: &[&str]) -> Option<String> {
    let document = Html::parse_document(html);
    for name in names {
        let selector = format!("meta[name=\"{name}\"], meta[property=\"{name}\"]");
        let Ok(selector) = Selector::parse(&selector) else {
            continue;
        };
        let value = document
            .select(&selector)
            .find_map(|el| el.value().attr("content"))
            .map(str::trim)
            .filter(|v| !v.is_empty());
        if let Some(value) = value {
            return Some(value.to_string());
        }
    }
    None
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut.trim_end())
    }
}
