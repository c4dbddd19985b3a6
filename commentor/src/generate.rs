//! Dual-language generation: one English comment always, plus a
//! local-language sibling when the page is not in English.

use tracing::info;

use crate::error::CommentError;
use crate::llm::{create_service, CommentGenerator};
use crate::prompt::PromptArgs;
use common::{ExtractedContent, LlmSettings};

const ENGLISH: &str = "en";

/// Generate the comment(s) for one extracted page.
///
/// A non-English `langcode` yields two comments ordered `[english, local]`;
/// an English or undetected page yields exactly one. Configuration errors
/// fail before any network call is attempted.
pub async fn generate_comments(
    page: &ExtractedContent,
    langcode: &str,
    keywords: &[String],
    settings: &LlmSettings,
) -> Result<Vec<String>, CommentError> {
    let service = create_service(settings)?;
    generate_with(
        &service,
        page,
        langcode,
        keywords,
        settings.prompt_template.as_deref(),
    )
    .await
}

/// Same as [`generate_comments`] but with an injected generator, so the
/// orchestration is testable without a configured provider.
pub async fn generate_with<G>(
    service: &G,
    page: &ExtractedContent,
    langcode: &str,
    keywords: &[String],
    template: Option<&str>,
) -> Result<Vec<String>, CommentError>
where
    G: CommentGenerator + ?Sized,
{
    let block = format!("# {}\n\n{}", page.title, page.content);

    let english_args = PromptArgs {
        content: block.clone(),
        keywords: keywords.to_vec(),
        langcode: ENGLISH.to_string(),
        word_count: None,
    };

    if !langcode.is_empty() && langcode != ENGLISH {
        info!(lang = %langcode, "generating english + local-language comments");
        let local_args = PromptArgs {
            content: block,
            keywords: keywords.to_vec(),
            langcode: langcode.to_string(),
            word_count: None,
        };
        // try_join keeps the result in request order and aborts the whole
        // operation on the first failure; the sibling result is discarded.
        let (english, local) = tokio::try_join!(
            service.generate_comment(&english_args, template),
            service.generate_comment(&local_args, template),
        )?;
        Ok(vec![english, local])
    } else {
        info!("generating english comment");
        let comment = service.generate_comment(&english_args, template).await?;
        Ok(vec![comment])
    }
}
