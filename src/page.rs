//! Article page scraping.
//!
//! Fetches an arbitrary article page and pulls out the readable body by
//! collecting the text of every `<p>` element. No site-specific selectors:
//! the summarizer only needs a rough plain-text rendition.

use crate::error::Result;
use crate::utils::normalize_whitespace;
use once_cell::sync::Lazy;
use ::scraper::{Html, Selector};
use std::time::Instant;
use tracing::{info, instrument};
use url::Url;

static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

/// Extract all paragraph text from an HTML document.
///
/// Text nodes inside one `<p>` are concatenated as-is, so inline markup such
/// as `H<sub>2</sub>O` or a link before punctuation stays contiguous. Each
/// paragraph is then whitespace-normalized.
///
/// # Arguments
///
/// * `html` - A full HTML document
///
/// # Returns
///
/// The non-empty paragraphs joined with a single space, or an empty string
/// when the document has no paragraph text.
pub fn extract_paragraph_text(html: &str) -> String {
    let document = Html::parse_document(html);
    document
        .select(&PARAGRAPH)
        .map(|p| normalize_whitespace(&p.text().collect::<String>()))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Downloads pages and extracts their paragraph text.
#[derive(Debug, Clone)]
pub struct PageScraper {
    http: reqwest::Client,
}

impl PageScraper {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }

    /// Fetch `url` and return its paragraph text.
    ///
    /// # Returns
    ///
    /// The text from [`extract_paragraph_text`], possibly empty.
    ///
    /// # Errors
    ///
    /// `Error::Url` for an unparseable url, `Error::Http` for transport
    /// failures and non-success status codes.
    #[instrument(level = "info", skip(self))]
    pub async fn paragraph_text(&self, url: &str) -> Result<String> {
        let url = Url::parse(url)?;
        let t0 = Instant::now();
        let body = self
            .http
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        let text = extract_paragraph_text(&body);
        info!(
            html_bytes = body.len(),
            text_chars = text.chars().count(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Scraped article page"
        );
        Ok(text)
    }
}
