//! Prompt assembly: a template with named placeholders, filled in a single
//! non-recursive pass.

/// Fixed provider-level instruction sent with every request. Not
/// user-configurable in this version.
pub const SYSTEM_PROMPT: &str = "You are a professional content commentator who writes short, \
insightful comments on articles. You will be given an article (title and body) together with \
writing requirements. Reply with the comment text only: no preamble, no quoting of the article, \
no markdown fences.";

/// Built-in template used when the user has not configured one.
pub const DEFAULT_TEMPLATE: &str = "\
Write a comment on the following article.

Requirements:
- Write in the language with ISO 639-1 code \"{lang}\".
- Aim for about {word_count} words.
- Naturally work in these keywords where they fit: {keywords}
- Sound like a genuine reader sharing a reaction, not an advertisement.

Article:
{content}";

const DEFAULT_LANGCODE: &str = "en";
const DEFAULT_WORD_COUNT: u32 = 60;

/// Inputs to prompt assembly for one (content, language) pair.
#[derive(Debug, Clone, Default)]
pub struct PromptArgs {
    /// Text block to comment on (title + body, concatenated by the caller).
    pub content: String,
    /// Enabled keyword strings, caller's insertion order.
    pub keywords: Vec<String>,
    /// ISO-639-1-ish two-letter code; empty means "en".
    pub langcode: String,
    /// Target comment length; defaults when the template asks for it.
    pub word_count: Option<u32>,
}

/// Fill the template's recognized placeholders ({content}, {keywords},
/// {lang}, {word_count}) from `args`.
///
/// Substitution is single-pass: a placeholder token inside a substituted
/// value is left as-is, never expanded again. Unrecognized `{...}` text
/// passes through untouched. No escaping is performed.
pub fn build_prompt(args: &PromptArgs, template: Option<&str>) -> String {
    let template = template
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_TEMPLATE);

    let mut out = String::with_capacity(template.len() + args.content.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match placeholder_value(tail, args) {
            Some((token_len, value)) => {
                out.push_str(&value);
                rest = &tail[token_len..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn placeholder_value(tail: &str, args: &PromptArgs) -> Option<(usize, String)> {
    const TOKENS: [&str; 4] = ["{content}", "{keywords}", "{lang}", "{word_count}"];
    let token = TOKENS.iter().find(|t| tail.starts_with(**t))?;
    let value = match *token {
        "{content}" => args.content.clone(),
        "{keywords}" => args.keywords.join(", "),
        "{lang}" => {
            if args.langcode.is_empty() {
                DEFAULT_LANGCODE.to_string()
            } else {
                args.langcode.clone()
            }
        }
        "{word_count}" => args
            .word_count
            .unwrap_or(DEFAULT_WORD_COUNT)
            .to_string(),
        _ => unreachable!(),
    };
    Some((token.len(), value))
}
