/*
commentor - CLI entrypoint
The headless stand-in for the extension UI: extracts articles, generates
comments and manages the stored keyword list.
*/

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use commentor::extraction;
use commentor::generate::generate_comments;
use commentor::keywords::{apply_keyword_links, LinkFormat};
use commentor::messages::{self, Request};
use common::{KeywordEntry, SettingsStore};

#[derive(Parser, Debug)]
#[command(name = "commentor", about = "Commentor: article extraction + LLM comment generation")]
struct Args {
    /// Path to the settings file (llm settings + keywords)
    #[arg(long, value_name = "FILE", default_value = "settings.json")]
    config: PathBuf,

    /// Override log level (info, debug, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the readable article from a page and print it
    Extract { url: String },

    /// Generate comment(s) for a page, optionally rewriting keywords as links
    Comment {
        url: String,

        /// Output syntax for keyword links (html, markdown or bbcode);
        /// omitted means plain text with no link rewriting
        #[arg(long)]
        format: Option<LinkFormat>,

        /// Force the page language code instead of detecting it
        #[arg(long)]
        lang: Option<String>,
    },

    /// Manage the stored keyword list
    Keywords {
        #[command(subcommand)]
        action: KeywordAction,
    },

    /// Read one JSON request from stdin, write the JSON response to stdout
    Respond,
}

#[derive(Subcommand, Debug)]
enum KeywordAction {
    List,
    Add { keyword: String, url: String },
    Remove { keyword: String },
    Enable { keyword: String },
    Disable { keyword: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let store = SettingsStore::new(&args.config);

    match args.command {
        Command::Extract { url } => run_extract(&url).await,
        Command::Comment { url, format, lang } => run_comment(&store, &url, format, lang).await,
        Command::Keywords { action } => run_keywords(&store, action).await,
        Command::Respond => run_respond().await,
    }
}

async fn run_extract(url: &str) -> Result<()> {
    let page = extraction::extract_content(url).await?;

    println!("Title:    {}", page.title);
    if !page.byline.is_empty() {
        println!("Byline:   {}", page.byline);
    }
    if !page.site_name.is_empty() {
        println!("Site:     {}", page.site_name);
    }
    println!("Excerpt:  {}", page.excerpt);
    println!("\n{}", page.content);
    Ok(())
}

async fn run_comment(
    store: &SettingsStore,
    url: &str,
    format: Option<LinkFormat>,
    lang: Option<String>,
) -> Result<()> {
    let settings = store.llm_settings().await?;
    let entries = store.keywords().await?;

    let html = extraction::fetch_page(url).await?;
    let page = extraction::extract_from_html(&html, url)?;

    let langcode = match lang {
        Some(code) => code,
        None => extraction::detect_language(&html),
    };
    info!(url = %url, lang = %langcode, "generating comments");

    let keyword_strings: Vec<String> = entries
        .iter()
        .filter(|e| e.enabled)
        .map(|e| e.keyword.clone())
        .collect();

    let comments = match generate_comments(&page, &langcode, &keyword_strings, &settings).await {
        Ok(comments) => comments,
        Err(e) => {
            error!(%e, "comment generation failed");
            return Err(e.into());
        }
    };

    for (i, comment) in comments.iter().enumerate() {
        let rendered = match format {
            Some(format) => apply_keyword_links(comment, &entries, format),
            None => comment.clone(),
        };
        if comments.len() > 1 {
            let role = if i == 0 { "english" } else { "local" };
            println!("--- comment {} ({role}) ---", i + 1);
        }
        println!("{rendered}");
    }
    Ok(())
}

async fn run_keywords(store: &SettingsStore, action: KeywordAction) -> Result<()> {
    let mut entries = store.keywords().await?;

    match action {
        KeywordAction::List => {
            if entries.is_empty() {
                println!("no keywords configured");
            }
            for entry in &entries {
                let state = if entry.enabled { "enabled" } else { "disabled" };
                println!("{:10} {} -> {}", state, entry.keyword, entry.url);
            }
            return Ok(());
        }
        KeywordAction::Add { keyword, url } => {
            entries.push(KeywordEntry::new(keyword, url));
        }
        KeywordAction::Remove { keyword } => {
            let before = entries.len();
            entries.retain(|e| e.keyword != keyword);
            if entries.len() == before {
                return Err(anyhow::anyhow!("no keyword entry named '{}'", keyword));
            }
        }
        KeywordAction::Enable { keyword } => set_enabled(&mut entries, &keyword, true)?,
        KeywordAction::Disable { keyword } => set_enabled(&mut entries, &keyword, false)?,
    }

    store.save_keywords(&entries).await?;
    info!(count = entries.len(), "keyword list saved");
    Ok(())
}

fn set_enabled(entries: &mut [KeywordEntry], keyword: &str, enabled: bool) -> Result<()> {
    let mut found = false;
    for entry in entries.iter_mut().filter(|e| e.keyword == keyword) {
        entry.enabled = enabled;
        found = true;
    }
    if !found {
        return Err(anyhow::anyhow!("no keyword entry named '{}'", keyword));
    }
    Ok(())
}

async fn run_respond() -> Result<()> {
    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .context("failed to read request from stdin")?;

    let request: Request =
        serde_json::from_str(&input).context("failed to parse request JSON")?;
    let response = messages::dispatch(request).await;

    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}
