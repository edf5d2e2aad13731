//! Typed access to the user's settings and bookmarks.
//!
//! [`SettingsRepository`] is a cheap, cloneable handle over a shared
//! [`PreferenceStore`]. Construct one per store and hand clones to every
//! coordinator that needs it.

use crate::bookmarks;
use crate::error::Result;
use crate::models::BookmarkedArticle;
use crate::store::{PrefKey, PrefValue, PreferenceStore};
use futures::StreamExt;
use futures::stream::BoxStream;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub const DEFAULT_COUNTRY: &str = "us";
pub const DEFAULT_LANGUAGE: &str = "en";
pub const DEFAULT_DARK_MODE: bool = false;

/// Settings and bookmarks over a shared [`PreferenceStore`].
///
/// Every getter and stream falls back to the defaults (`"us"`, `"en"`, dark
/// mode off, no bookmarks) when nothing was stored yet.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    store: Arc<PreferenceStore>,
}

fn text_or(value: Option<PrefValue>, default: &str) -> String {
    value
        .as_ref()
        .and_then(PrefValue::as_text)
        .map(str::to_string)
        .unwrap_or_else(|| default.to_string())
}

fn bool_or(value: Option<PrefValue>, default: bool) -> bool {
    value.as_ref().and_then(PrefValue::as_bool).unwrap_or(default)
}

/// Decode for observers: corrupt data reads as an empty list.
fn bookmarks_or_empty(value: Option<PrefValue>) -> Vec<BookmarkedArticle> {
    match bookmarks::decode(value.as_ref().and_then(PrefValue::as_text)) {
        Ok(list) => list,
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable bookmark collection");
            Vec::new()
        }
    }
}

impl SettingsRepository {
    /// Wrap `store`. Clones of the repository share it.
    pub fn new(store: Arc<PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<PreferenceStore> {
        &self.store
    }

    // --- Observable settings ---

    /// Observe the preferred country code.
    ///
    /// # Returns
    ///
    /// A stream that yields the current code (default `"us"`) at once and
    /// then every newly committed code.
    pub fn preferred_country(&self) -> BoxStream<'static, String> {
        self.store
            .read(PrefKey::PreferredCountry)
            .map(|v| text_or(v, DEFAULT_COUNTRY))
            .boxed()
    }

    /// Observe the preferred language code, default `"en"`.
    pub fn preferred_language(&self) -> BoxStream<'static, String> {
        self.store
            .read(PrefKey::PreferredLanguage)
            .map(|v| text_or(v, DEFAULT_LANGUAGE))
            .boxed()
    }

    /// Observe the dark-mode flag, default off.
    pub fn dark_mode_enabled(&self) -> BoxStream<'static, bool> {
        self.store
            .read(PrefKey::DarkModeEnabled)
            .map(|v| bool_or(v, DEFAULT_DARK_MODE))
            .boxed()
    }

    /// Observe the bookmark collection.
    ///
    /// A stored collection that cannot be decoded is logged and observed as
    /// an empty list; use [`SettingsRepository::bookmarks`] to see the error.
    pub fn bookmarked_articles(&self) -> BoxStream<'static, Vec<BookmarkedArticle>> {
        self.store
            .read(PrefKey::BookmarkedArticles)
            .map(bookmarks_or_empty)
            .boxed()
    }

    // --- Snapshots ---

    /// Preferred country code right now, `"us"` if unset.
    pub fn country(&self) -> String {
        text_or(self.store.get(PrefKey::PreferredCountry), DEFAULT_COUNTRY)
    }

    /// Preferred language code right now, `"en"` if unset.
    pub fn language(&self) -> String {
        text_or(self.store.get(PrefKey::PreferredLanguage), DEFAULT_LANGUAGE)
    }

    /// Dark-mode flag right now, `false` if unset.
    pub fn dark_mode(&self) -> bool {
        bool_or(self.store.get(PrefKey::DarkModeEnabled), DEFAULT_DARK_MODE)
    }

    /// Current bookmarks.
    ///
    /// # Errors
    ///
    /// `Error::CorruptBookmarks` when the stored collection cannot be
    /// decoded. The stream hides this case; this getter does not.
    pub fn bookmarks(&self) -> Result<Vec<BookmarkedArticle>> {
        let value = self.store.get(PrefKey::BookmarkedArticles);
        bookmarks::decode(value.as_ref().and_then(PrefValue::as_text))
    }

    /// Whether `url` is saved. Corrupt data answers `false`.
    pub fn is_bookmarked(&self, url: &str) -> bool {
        self.bookmarks()
            .map(|list| list.iter().any(|b| b.url == url))
            .unwrap_or(false)
    }

    // --- Setters ---

    /// Store `country` as the preferred country. The code is not validated
    /// here; see [`crate::models::validate_country`].
    ///
    /// # Errors
    ///
    /// Returns the store's I/O error; the previous value stays in place.
    #[instrument(level = "info", skip(self))]
    pub async fn set_preferred_country(&self, country: &str) -> Result<()> {
        self.store.write(PrefKey::PreferredCountry, country).await
    }

    /// Store `language` as the preferred language.
    #[instrument(level = "info", skip(self))]
    pub async fn set_preferred_language(&self, language: &str) -> Result<()> {
        self.store.write(PrefKey::PreferredLanguage, language).await
    }

    /// Turn dark mode on or off.
    #[instrument(level = "info", skip(self))]
    pub async fn set_dark_mode_enabled(&self, enabled: bool) -> Result<()> {
        self.store.write(PrefKey::DarkModeEnabled, enabled).await
    }

    // --- Bookmarks ---

    /// Save `article` unless a bookmark with the same url exists.
    ///
    /// # Returns
    ///
    /// `true` if the collection changed, `false` for an already saved url
    /// (nothing is written).
    ///
    /// # Errors
    ///
    /// `Error::CorruptBookmarks` without writing when the stored collection
    /// cannot be decoded; I/O errors from the store.
    #[instrument(level = "info", skip_all, fields(url = %article.url))]
    pub async fn add_bookmark(&self, article: BookmarkedArticle) -> Result<bool> {
        let added = self
            .store
            .update(PrefKey::BookmarkedArticles, move |current| {
                let mut list = bookmarks::decode(current.and_then(PrefValue::as_text))?;
                if !bookmarks::insert(&mut list, article) {
                    return Ok(None);
                }
                Ok(Some(PrefValue::Text(bookmarks::encode(&list)?)))
            })
            .await?;
        info!(added, "Bookmark add handled");
        Ok(added)
    }

    /// Remove every bookmark with `url`. Writes only if one was removed.
    #[instrument(level = "info", skip(self))]
    pub async fn remove_bookmark(&self, url: &str) -> Result<bool> {
        let removed = self
            .store
            .update(PrefKey::BookmarkedArticles, |current| {
                let mut list = bookmarks::decode(current.and_then(PrefValue::as_text))?;
                if !bookmarks::remove(&mut list, url) {
                    return Ok(None);
                }
                Ok(Some(PrefValue::Text(bookmarks::encode(&list)?)))
            })
            .await?;
        info!(removed, "Bookmark remove handled");
        Ok(removed)
    }
}
