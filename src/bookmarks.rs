//! Codec for the bookmark collection stored under `bookmarked_articles`.
//!
//! The whole collection lives in one preference entry as a JSON array, so
//! every change is a decode, an in-memory edit and a re-encode. The edit
//! helpers report whether anything changed so callers can skip redundant
//! writes.

use crate::error::{Error, Result};
use crate::models::BookmarkedArticle;
use itertools::Itertools;

/// Decode a stored collection. Missing or blank input is an empty list.
///
/// Entries sharing a url are collapsed to the first one, so hand-edited or
/// legacy data still honours the one-record-per-url rule.
///
/// # Errors
///
/// `Error::CorruptBookmarks` when the text is not a JSON array of bookmarks.
pub fn decode(raw: Option<&str>) -> Result<Vec<BookmarkedArticle>> {
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(Vec::new()),
        Some(raw) => raw,
    };
    let list: Vec<BookmarkedArticle> = serde_json::from_str(raw).map_err(Error::CorruptBookmarks)?;
    Ok(list.into_iter().unique_by(|b| b.url.clone()).collect())
}

/// Encode a collection as the JSON array stored under `bookmarked_articles`.
pub fn encode(bookmarks: &[BookmarkedArticle]) -> Result<String> {
    Ok(serde_json::to_string(bookmarks)?)
}

/// Append `article` unless its url is already present.
///
/// # Returns
///
/// `true` if the collection changed.
pub fn insert(bookmarks: &mut Vec<BookmarkedArticle>, article: BookmarkedArticle) -> bool {
    if bookmarks.iter().any(|b| b.url == article.url) {
        return false;
    }
    bookmarks.push(article);
    true
}

/// Drop every entry whose url equals `url`.
///
/// # Returns
///
/// `true` if at least one entry was removed.
pub fn remove(bookmarks: &mut Vec<BookmarkedArticle>, url: &str) -> bool {
    let before = bookmarks.len();
    bookmarks.retain(|b| b.url != url);
    bookmarks.len() != before
}
