//! On-demand article summarization.
//!
//! [`ContentSummarizer`] scrapes an article page and asks a
//! [`TextGenerator`] for a short summary. [`SummaryCoordinator`] tracks one
//! summarization at a time as a [`SummaryState`] published on a `watch`
//! channel:
//!
//! ```text
//! Idle ──summarize──▶ Loading ──▶ Success(text) | Error(message)
//!   ▲                    ▲                  │
//!   └──── dismiss ───────┴── summarize ─────┘
//! ```
//!
//! Starting a new summarization abandons tracking of the previous one. The
//! previous request keeps running but its result is dropped.

use crate::error::{Error, Result};
use crate::generative::TextGenerator;
use crate::models::Article;
use crate::page::PageScraper;
use crate::utils::truncate_chars;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

/// Characters of article text sent to the model.
pub const DEFAULT_CHAR_BUDGET: usize = 8000;

pub const NO_URL_MESSAGE: &str = "Article has no URL to summarize.";
pub const UNAVAILABLE_MESSAGE: &str = "Summary is currently unavailable.";

const PROMPT_HEADER: &str = "Summarize the following news article in 2–3 clear and concise sentences.\n\
Keep the summary factual and neutral.\n\nArticle:\n";

/// Wrap already truncated article text in the fixed summary instruction.
///
/// # Arguments
///
/// * `article_text` - Paragraph text, already cut to the character budget
///
/// # Returns
///
/// The full prompt sent to the model.
pub fn build_prompt(article_text: &str) -> String {
    format!("{PROMPT_HEADER}{article_text}")
}

/// Anything that can turn an article url into a summary.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize the page at `url`.
    ///
    /// # Errors
    ///
    /// Any scrape or generation failure, or `Error::NoArticleText` when the
    /// page has no paragraph text.
    async fn summarize_url(&self, url: &str) -> Result<String>;
}

/// Scrape-then-generate summarizer.
pub struct ContentSummarizer {
    scraper: PageScraper,
    generator: Arc<dyn TextGenerator>,
    char_budget: usize,
}

impl ContentSummarizer {
    pub fn new(scraper: PageScraper, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            scraper,
            generator,
            char_budget: DEFAULT_CHAR_BUDGET,
        }
    }

    pub fn char_budget(mut self, chars: usize) -> Self {
        self.char_budget = chars;
        self
    }
}

#[async_trait]
impl Summarizer for ContentSummarizer {
    #[instrument(level = "info", skip(self))]
    async fn summarize_url(&self, url: &str) -> Result<String> {
        let text = self.scraper.paragraph_text(url).await?;
        if text.trim().is_empty() {
            warn!("No paragraph text on page");
            return Err(Error::NoArticleText);
        }

        let safe_text = truncate_chars(&text, self.char_budget);
        debug!(chars = safe_text.chars().count(), "Sending article text to model");
        let summary = self.generator.generate(&build_prompt(safe_text)).await?;
        Ok(summary.unwrap_or_else(|| UNAVAILABLE_MESSAGE.to_string()))
    }
}

/// Observable state of the summary surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SummaryState {
    #[default]
    Idle,
    Loading,
    Success(String),
    Error(String),
}

impl SummaryState {
    pub fn is_loading(&self) -> bool {
        matches!(self, SummaryState::Loading)
    }
}

/// Tracks a single summarization at a time.
pub struct SummaryCoordinator {
    summarizer: Arc<dyn Summarizer>,
    state_tx: Arc<watch::Sender<SummaryState>>,
    ticket: Arc<AtomicU64>,
}

impl SummaryCoordinator {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        let (state_tx, _) = watch::channel(SummaryState::Idle);
        Self {
            summarizer,
            state_tx: Arc::new(state_tx),
            ticket: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Subscribe to state changes.
    pub fn state(&self) -> watch::Receiver<SummaryState> {
        self.state_tx.subscribe()
    }

    pub fn current(&self) -> SummaryState {
        self.state_tx.borrow().clone()
    }

    /// Summarize `article`, replacing whatever was tracked before.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn summarize_article(&self, article: &Article) {
        let ticket = self.ticket.fetch_add(1, Ordering::SeqCst) + 1;
        self.state_tx.send_replace(SummaryState::Loading);

        let Some(url) = article
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
        else {
            info!(ticket, "Article has no url; not summarizing");
            self.state_tx
                .send_replace(SummaryState::Error(NO_URL_MESSAGE.to_string()));
            return;
        };

        let summarizer = Arc::clone(&self.summarizer);
        let state_tx = Arc::clone(&self.state_tx);
        let current = Arc::clone(&self.ticket);
        tokio::spawn(async move {
            let next = match summarizer.summarize_url(&url).await {
                Ok(summary) => SummaryState::Success(summary),
                Err(e) => {
                    warn!(ticket, %url, error = %e, "Summarization failed");
                    SummaryState::Error(format!("Error: {e}"))
                }
            };
            let applied = state_tx.send_if_modified(|state| {
                if current.load(Ordering::SeqCst) != ticket {
                    return false;
                }
                *state = next;
                true
            });
            debug!(ticket, applied, "Summarization finished");
        });
    }

    /// Return to `Idle` and stop tracking any summarization in flight.
    pub fn dismiss(&self) {
        self.ticket.fetch_add(1, Ordering::SeqCst);
        self.state_tx.send_replace(SummaryState::Idle);
    }

    /// Wait until the tracked summarization leaves `Loading`.
    pub async fn settled(&self) -> SummaryState {
        let mut rx = self.state();
        match rx.wait_for(|s| !s.is_loading()).await {
            Ok(state) => state.clone(),
            // The sender lives in `self`, so this only happens during teardown.
            Err(_) => self.current(),
        }
    }
}
