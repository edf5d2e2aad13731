//! Crate-wide error type.
//!
//! Every fallible operation in the library returns [`Result`]. Transport
//! failures from the news API, the page scraper and the model endpoint are
//! all funnelled through here so the coordinators can downgrade them to an
//! empty list or an `Error` summary state.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("News API error ({code}): {message}")]
    NewsApi { code: String, message: String },

    #[error("Stored bookmarks are not valid JSON: {0}")]
    CorruptBookmarks(#[source] serde_json::Error),

    #[error("Could not extract article content from the URL.")]
    NoArticleText,

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Unsupported country code: {0}")]
    UnsupportedCountry(String),

    #[error("Unsupported language code: {0}")]
    UnsupportedLanguage(String),

    #[error("Missing API key: {0}")]
    MissingApiKey(&'static str),
}

pub type Result<T> = std::result::Result<T, Error>;
