use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use commentor::error::CommentError;
use commentor::generate::generate_with;
use commentor::llm::CommentGenerator;
use commentor::prompt::PromptArgs;
use common::ExtractedContent;

/// Generator that answers from a script, with per-language artificial delay
/// so completion order can be forced to disagree with request order.
struct ScriptedGenerator {
    english_delay_ms: u64,
    local_delay_ms: u64,
    fail_langs: Vec<String>,
    calls: Mutex<Vec<PromptArgs>>,
}

impl ScriptedGenerator {
    fn new(english_delay_ms: u64, local_delay_ms: u64) -> Self {
        Self {
            english_delay_ms,
            local_delay_ms,
            fail_langs: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn failing_for(mut self, lang: &str) -> Self {
        self.fail_langs.push(lang.to_string());
        self
    }

    fn calls(&self) -> Vec<PromptArgs> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommentGenerator for ScriptedGenerator {
    async fn generate_comment(
        &self,
        args: &PromptArgs,
        _template: Option<&str>,
    ) -> Result<String, CommentError> {
        self.calls.lock().unwrap().push(args.clone());

        let delay = if args.langcode == "en" {
            self.english_delay_ms
        } else {
            self.local_delay_ms
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;

        if self.fail_langs.contains(&args.langcode) {
            return Err(CommentError::Provider {
                provider: "Mock",
                message: format!("scripted failure for {}", args.langcode),
            });
        }
        Ok(format!("comment-{}", args.langcode))
    }
}

fn page() -> ExtractedContent {
    ExtractedContent {
        title: "Big News".into(),
        content: "Something happened.".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn non_english_page_yields_two_comments_in_role_order() {
    // English is slow, local is fast: completion order is local-first,
    // result order must still be [english, local]
    let generator = ScriptedGenerator::new(50, 0);

    let comments = generate_with(&generator, &page(), "fr", &[], None)
        .await
        .expect("generate");

    assert_eq!(comments, vec!["comment-en", "comment-fr"]);

    let langs: Vec<String> = generator.calls().into_iter().map(|a| a.langcode).collect();
    assert_eq!(langs.len(), 2);
    assert!(langs.contains(&"en".to_string()));
    assert!(langs.contains(&"fr".to_string()));
}

#[tokio::test]
async fn english_page_yields_exactly_one_comment() {
    let generator = ScriptedGenerator::new(0, 0);

    let comments = generate_with(&generator, &page(), "en", &[], None)
        .await
        .expect("generate");

    assert_eq!(comments, vec!["comment-en"]);
    assert_eq!(generator.calls().len(), 1);
}

#[tokio::test]
async fn undetected_language_is_treated_as_english() {
    let generator = ScriptedGenerator::new(0, 0);

    let comments = generate_with(&generator, &page(), "", &[], None)
        .await
        .expect("generate");

    assert_eq!(comments, vec!["comment-en"]);
    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].langcode, "en");
}

#[tokio::test]
async fn one_failing_call_aborts_the_whole_operation() {
    // The english call succeeds quickly; its result must be discarded
    let generator = ScriptedGenerator::new(0, 20).failing_for("de");

    let err = generate_with(&generator, &page(), "de", &[], None)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("scripted failure for de"));
    assert_eq!(generator.calls().len(), 2);
}

#[tokio::test]
async fn content_block_joins_title_and_body() {
    let generator = ScriptedGenerator::new(0, 0);

    generate_with(&generator, &page(), "en", &[], None)
        .await
        .expect("generate");

    let call = generator.calls().into_iter().next().expect("one call");
    assert_eq!(call.content, "# Big News\n\nSomething happened.");
}

#[tokio::test]
async fn keywords_reach_both_language_requests() {
    let generator = ScriptedGenerator::new(0, 0);
    let keywords = vec!["seo".to_string(), "rust".to_string()];

    generate_with(&generator, &page(), "ja", &keywords, None)
        .await
        .expect("generate");

    let calls = generator.calls();
    assert_eq!(calls.len(), 2);
    for call in calls {
        assert_eq!(call.keywords, keywords);
    }
}
