//! Data models for news articles, bookmarks and the selectable options.
//!
//! This module defines the core data structures used throughout the crate:
//! - [`Article`]: Read-only article record as returned by the news API
//! - [`BookmarkedArticle`]: Minimal projection of an article the user saved
//! - [`Category`]: The fixed set of headline categories
//! - [`COUNTRIES`] / [`LANGUAGES`]: Locale options offered to the user
//!
//! Wire-facing structs use camelCase field names to match the NewsAPI JSON
//! schema and the persisted bookmark layout.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The publisher block nested inside every NewsAPI article.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleSource {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// A news article as returned by the news API.
///
/// Every field is optional on the wire; the API regularly omits images,
/// authors and even urls for removed stories.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    #[serde(default)]
    pub source: Option<ArticleSource>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub url_to_image: Option<String>,
    /// ISO-8601 timestamp, formatted for display by [`crate::dates`].
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Article {
    /// The publisher's display name, if the API supplied one.
    pub fn source_name(&self) -> Option<&str> {
        self.source.as_ref().and_then(|s| s.name.as_deref())
    }
}

/// A user-saved article, keyed by `url` inside a bookmark collection.
///
/// Bookmarks are never edited in place: replacing one means removing it and
/// adding the new record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkedArticle {
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
    pub source: Option<String>,
}

impl BookmarkedArticle {
    /// Promote a displayed article into a bookmark.
    ///
    /// Returns `None` when the article has no url, since the url is the
    /// bookmark's identity.
    pub fn from_article(article: &Article) -> Option<Self> {
        let url = article.url.as_deref().filter(|u| !u.trim().is_empty())?;
        Some(Self {
            title: article
                .title
                .clone()
                .unwrap_or_else(|| "No Title".to_string()),
            url: url.to_string(),
            image_url: article.url_to_image.clone(),
            source: article.source_name().map(str::to_string),
        })
    }
}

/// Headline categories understood by the news API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    General,
    Business,
    Entertainment,
    Health,
    Science,
    Sports,
    Technology,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::General,
        Category::Business,
        Category::Entertainment,
        Category::Health,
        Category::Science,
        Category::Sports,
        Category::Technology,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::General => "general",
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::Technology => "technology",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownCategory(s.to_string()))
    }
}

/// Countries offered in settings, as `(code, display name)`.
pub const COUNTRIES: &[(&str, &str)] = &[
    ("us", "United States"),
    ("gb", "United Kingdom"),
    ("in", "India"),
    ("ca", "Canada"),
    ("au", "Australia"),
    ("de", "Germany"),
    ("fr", "France"),
];

/// Languages offered in settings, as `(code, display name)`.
pub const LANGUAGES: &[(&str, &str)] = &[
    ("ar", "Arabic"),
    ("de", "German"),
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("he", "Hebrew"),
    ("it", "Italian"),
    ("nl", "Dutch"),
    ("no", "Norwegian"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("sv", "Swedish"),
    ("ud", "Urdu"),
    ("zh", "Chinese"),
];

/// Normalize and check a country code against [`COUNTRIES`].
pub fn validate_country(code: &str) -> Result<String> {
    let code = code.trim().to_lowercase();
    if COUNTRIES.iter().any(|(c, _)| *c == code) {
        Ok(code)
    } else {
        Err(Error::UnsupportedCountry(code))
    }
}

/// Normalize and check a language code against [`LANGUAGES`].
pub fn validate_language(code: &str) -> Result<String> {
    let code = code.trim().to_lowercase();
    if LANGUAGES.iter().any(|(c, _)| *c == code) {
        Ok(code)
    } else {
        Err(Error::UnsupportedLanguage(code))
    }
}
