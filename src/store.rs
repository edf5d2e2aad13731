//! Durable, observable key-value storage for user preferences.
//!
//! The store persists a flat JSON object to a single file and keeps one
//! [`tokio::sync::watch`] channel per [`PrefKey`]. Readers get a stream that
//! replays the current value on subscription and then follows every committed
//! write.
//!
//! # Write model
//!
//! All writes go through one writer lock (a FIFO `tokio::sync::Mutex`), so:
//! - writes to the same key apply in arrival order, last write wins
//! - writes to different keys never observe each other's partial state
//! - [`PreferenceStore::update`] gives read-modify-write callers a real
//!   single-writer section instead of relying on sequential callers
//!
//! Each commit writes a uniquely named sibling temporary file, syncs it and
//! renames it over the target, so concurrent processes sharing the file never
//! rename a mixed write into place. The in-memory snapshot and the observers only change after the
//! rename succeeded, so a failed write leaves everything as it was.

use crate::error::Result;
use crate::utils::ensure_writable_dir;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, instrument, warn};

/// The fixed set of persisted settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    PreferredCountry,
    PreferredLanguage,
    DarkModeEnabled,
    BookmarkedArticles,
}

impl PrefKey {
    pub const ALL: [PrefKey; 4] = [
        PrefKey::PreferredCountry,
        PrefKey::PreferredLanguage,
        PrefKey::DarkModeEnabled,
        PrefKey::BookmarkedArticles,
    ];

    /// Name of the entry in the persisted file.
    pub fn name(&self) -> &'static str {
        match self {
            PrefKey::PreferredCountry => "preferred_country",
            PrefKey::PreferredLanguage => "preferred_language",
            PrefKey::DarkModeEnabled => "dark_mode_enabled",
            PrefKey::BookmarkedArticles => "bookmarked_articles",
        }
    }

    fn index(&self) -> usize {
        match self {
            PrefKey::PreferredCountry => 0,
            PrefKey::PreferredLanguage => 1,
            PrefKey::DarkModeEnabled => 2,
            PrefKey::BookmarkedArticles => 3,
        }
    }
}

/// A stored scalar.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Text(String),
}

impl PrefValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PrefValue::Text(s) => Some(s),
            PrefValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrefValue::Bool(b) => Some(*b),
            PrefValue::Text(_) => None,
        }
    }
}

impl From<String> for PrefValue {
    fn from(s: String) -> Self {
        PrefValue::Text(s)
    }
}

impl From<&str> for PrefValue {
    fn from(s: &str) -> Self {
        PrefValue::Text(s.to_string())
    }
}

impl From<bool> for PrefValue {
    fn from(b: bool) -> Self {
        PrefValue::Bool(b)
    }
}

type Snapshot = BTreeMap<String, PrefValue>;

/// File-backed preference storage with one observable channel per key.
#[derive(Debug)]
pub struct PreferenceStore {
    path: PathBuf,
    /// Last committed file contents. Holding the lock is holding the writer slot.
    committed: Mutex<Snapshot>,
    channels: [watch::Sender<Option<PrefValue>>; 4],
}

impl PreferenceStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty store; the file itself is only created by
    /// the first write. Entries with names this crate does not know are kept
    /// and written back untouched. A file that does not parse (a truncated
    /// write, a hand-edited value that is neither a string nor a bool) is
    /// renamed to `<file>.corrupt` and the store starts from defaults.
    ///
    /// # Errors
    ///
    /// Fails when the parent directory cannot be created or written, or when
    /// the file exists but cannot be read or moved aside.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_writable_dir(parent).await?;
        }

        let snapshot: Snapshot = match fs::read_to_string(&path).await {
            Ok(raw) if raw.trim().is_empty() => Snapshot::new(),
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    let aside = sibling(&path, "corrupt");
                    warn!(
                        error = %e,
                        moved_to = %aside.display(),
                        "Preference file unreadable; starting from defaults"
                    );
                    fs::rename(&path, &aside).await?;
                    Snapshot::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preference file yet; starting empty");
                Snapshot::new()
            }
            Err(e) => return Err(e.into()),
        };

        let channels = PrefKey::ALL.map(|key| watch::Sender::new(snapshot.get(key.name()).cloned()));
        info!(entries = snapshot.len(), "Preference store opened");

        Ok(Self {
            path,
            committed: Mutex::new(snapshot),
            channels,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current value of `key`, if one was ever written.
    pub fn get(&self, key: PrefKey) -> Option<PrefValue> {
        self.channels[key.index()].borrow().clone()
    }

    /// Observe `key`.
    ///
    /// The stream yields the current value immediately, then the new value
    /// after each committed write. Bursts of writes may be coalesced into the
    /// latest value. The stream ends only when the store is dropped.
    pub fn read(&self, key: PrefKey) -> BoxStream<'static, Option<PrefValue>> {
        let mut rx = self.channels[key.index()].subscribe();
        rx.mark_changed();
        stream::unfold(rx, |mut rx| async move {
            rx.changed().await.ok()?;
            let value = rx.borrow_and_update().clone();
            Some((value, rx))
        })
        .boxed()
    }

    /// Replace the value stored under `key`.
    #[instrument(level = "debug", skip_all, fields(key = key.name()))]
    pub async fn write(&self, key: PrefKey, value: impl Into<PrefValue>) -> Result<()> {
        let value = value.into();
        let mut committed = self.committed.lock().await;
        self.commit(&mut committed, key, value).await
    }

    /// Read-modify-write `key` while holding the writer slot.
    ///
    /// `f` sees the committed value and returns `Some(new)` to store it or
    /// `None` to leave the key untouched, in which case nothing is written
    /// and observers are not notified. Returns whether a write happened.
    pub async fn update<F>(&self, key: PrefKey, f: F) -> Result<bool>
    where
        F: FnOnce(Option<&PrefValue>) -> Result<Option<PrefValue>>,
    {
        let mut committed = self.committed.lock().await;
        match f(committed.get(key.name()))? {
            Some(value) => {
                self.commit(&mut committed, key, value).await?;
                Ok(true)
            }
            None => {
                debug!(key = key.name(), "Update left value unchanged");
                Ok(false)
            }
        }
    }

    async fn commit(&self, committed: &mut Snapshot, key: PrefKey, value: PrefValue) -> Result<()> {
        let mut next = committed.clone();
        next.insert(key.name().to_string(), value.clone());

        if let Err(e) = self.persist(&next).await {
            warn!(key = key.name(), error = %e, "Failed to persist preferences");
            return Err(e);
        }

        *committed = next;
        self.channels[key.index()].send_replace(Some(value));
        debug!(key = key.name(), "Preference committed");
        Ok(())
    }

    /// Write `snapshot` to a fresh temp file beside the target, flush it to
    /// disk and rename it over the target.
    async fn persist(&self, snapshot: &Snapshot) -> Result<()> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        let tmp = sibling(
            &self.path,
            &format!("{}.{:08x}.tmp", std::process::id(), rng().random::<u32>()),
        );
        let written = async {
            let mut file = fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&tmp)
                .await?;
            file.write_all(&json).await?;
            file.sync_all().await?;
            fs::rename(&tmp, &self.path).await?;
            Ok::<_, std::io::Error>(())
        }
        .await;
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }
}

/// `path` with `.{suffix}` appended to its file name.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(suffix);
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::time::timeout;

    async fn open_in(dir: &TempDir) -> PreferenceStore {
        PreferenceStore::open(dir.path().join("settings.json")).await.unwrap()
    }

    #[tokio::test]
    async fn test_empty_store_reads_none() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;
        for key in PrefKey::ALL {
            assert_eq!(store.get(key), None);
        }
        let mut s = store.read(PrefKey::PreferredCountry);
        assert_eq!(s.next().await, Some(None));
    }

    #[tokio::test]
    async fn test_read_replays_current_then_follows_writes() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;
        store.write(PrefKey::PreferredCountry, "gb").await.unwrap();

        let mut s = store.read(PrefKey::PreferredCountry);
        assert_eq!(s.next().await, Some(Some(PrefValue::from("gb"))));

        store.write(PrefKey::PreferredCountry, "de").await.unwrap();
        let next = timeout(Duration::from_secs(1), s.next()).await.unwrap();
        assert_eq!(next, Some(Some(PrefValue::from("de"))));
    }

    #[tokio::test]
    async fn test_streams_are_per_key() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;
        let mut country = store.read(PrefKey::PreferredCountry);
        assert_eq!(country.next().await, Some(None));

        store.write(PrefKey::DarkModeEnabled, true).await.unwrap();
        assert!(timeout(Duration::from_millis(50), country.next()).await.is_err());
    }

    #[tokio::test]
    async fn test_stream_ends_when_store_dropped() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;
        let mut s = store.read(PrefKey::PreferredLanguage);
        assert_eq!(s.next().await, Some(None));
        drop(store);
        assert_eq!(s.next().await, None);
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        {
            let store = open_in(&dir).await;
            store.write(PrefKey::DarkModeEnabled, true).await.unwrap();
            store.write(PrefKey::PreferredLanguage, "fr").await.unwrap();
        }
        let store = open_in(&dir).await;
        assert_eq!(store.get(PrefKey::DarkModeEnabled), Some(PrefValue::Bool(true)));
        assert_eq!(store.get(PrefKey::PreferredLanguage), Some(PrefValue::from("fr")));
    }

    #[tokio::test]
    async fn test_file_layout_is_flat_object() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;
        store.write(PrefKey::PreferredCountry, "in").await.unwrap();
        store.write(PrefKey::DarkModeEnabled, false).await.unwrap();

        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["preferred_country"], "in");
        assert_eq!(value["dark_mode_enabled"], false);
    }

    #[tokio::test]
    async fn test_unknown_entries_are_preserved() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"font_scale":"large","preferred_country":"ca"}"#).unwrap();

        let store = PreferenceStore::open(&path).await.unwrap();
        assert_eq!(store.get(PrefKey::PreferredCountry), Some(PrefValue::from("ca")));
        store.write(PrefKey::PreferredCountry, "au").await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("font_scale"));
        assert!(raw.contains("\"au\""));
    }

    fn temp_leftovers(dir: &TempDir) -> Vec<String> {
        std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[tokio::test]
    async fn test_failed_write_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;
        store.write(PrefKey::PreferredCountry, "us").await.unwrap();
        let mut s = store.read(PrefKey::PreferredCountry);
        assert_eq!(s.next().await, Some(Some(PrefValue::from("us"))));

        // A non-empty directory in place of the file makes the rename fail.
        std::fs::remove_file(store.path()).unwrap();
        std::fs::create_dir(store.path()).unwrap();
        std::fs::write(store.path().join("keep"), "x").unwrap();

        assert!(store.write(PrefKey::PreferredCountry, "gb").await.is_err());
        assert_eq!(store.get(PrefKey::PreferredCountry), Some(PrefValue::from("us")));
        assert!(store.path().join("keep").exists());
        assert!(temp_leftovers(&dir).is_empty());
        assert!(timeout(Duration::from_millis(50), s.next()).await.is_err());
    }

    #[tokio::test]
    async fn test_truncated_file_is_moved_aside() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        let raw = r#"{"preferred_country":"gb","#;
        std::fs::write(&path, raw).unwrap();

        let store = PreferenceStore::open(&path).await.unwrap();
        for key in PrefKey::ALL {
            assert_eq!(store.get(key), None);
        }
        assert!(!path.exists());
        assert_eq!(std::fs::read_to_string(dir.path().join("settings.json.corrupt")).unwrap(), raw);

        store.write(PrefKey::PreferredCountry, "de").await.unwrap();
        drop(store);
        let reopened = PreferenceStore::open(&path).await.unwrap();
        assert_eq!(reopened.get(PrefKey::PreferredCountry), Some(PrefValue::from("de")));
    }

    #[tokio::test]
    async fn test_unsupported_value_type_is_moved_aside() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"preferred_country":7}"#).unwrap();

        let store = PreferenceStore::open(&path).await.unwrap();
        assert_eq!(store.get(PrefKey::PreferredCountry), None);
        assert!(dir.path().join("settings.json.corrupt").exists());
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;
        for code in ["us", "gb", "fr"] {
            store.write(PrefKey::PreferredCountry, code).await.unwrap();
        }
        assert!(temp_leftovers(&dir).is_empty());
    }

    #[tokio::test]
    async fn test_two_stores_on_one_file_never_tear_it() {
        let dir = TempDir::new().unwrap();
        let a = Arc::new(open_in(&dir).await);
        let b = Arc::new(open_in(&dir).await);

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let store = if i % 2 == 0 { Arc::clone(&a) } else { Arc::clone(&b) };
                tokio::spawn(async move {
                    let value = "x".repeat(i * 50);
                    store.write(PrefKey::PreferredLanguage, value).await
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap().unwrap();
        }

        let raw = std::fs::read_to_string(a.path()).unwrap();
        let parsed: Snapshot = serde_json::from_str(&raw).unwrap();
        let value = parsed["preferred_language"].as_text().unwrap().to_string();
        assert!(value.chars().all(|c| c == 'x'));
        assert!(temp_leftovers(&dir).is_empty());
    }

    #[tokio::test]
    async fn test_update_without_change_does_not_write() {
        let dir = TempDir::new().unwrap();
        let store = open_in(&dir).await;
        let wrote = store
            .update(PrefKey::BookmarkedArticles, |current| {
                assert!(current.is_none());
                Ok(None)
            })
            .await
            .unwrap();
        assert!(!wrote);
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn test_concurrent_updates_do_not_lose_writes() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(open_in(&dir).await);

        let handles: Vec<_> = (0..32)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .update(PrefKey::BookmarkedArticles, |current| {
                            let mut s = current
                                .and_then(|v| v.as_text())
                                .unwrap_or_default()
                                .to_string();
                            s.push_str(&format!("{i},"));
                            Ok(Some(PrefValue::Text(s)))
                        })
                        .await
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.await.unwrap();
        }

        let value = store.get(PrefKey::BookmarkedArticles).unwrap();
        let parts: Vec<_> = value.as_text().unwrap().split(',').filter(|s| !s.is_empty()).collect();
        assert_eq!(parts.len(), 32);
    }

    #[tokio::test]
    async fn test_concurrent_writes_to_different_keys() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(open_in(&dir).await);
        let a = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.write(PrefKey::PreferredCountry, "fr").await })
        };
        let b = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.write(PrefKey::PreferredLanguage, "de").await })
        };
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        drop(store);
        let reopened = open_in(&dir).await;
        assert_eq!(reopened.get(PrefKey::PreferredCountry), Some(PrefValue::from("fr")));
        assert_eq!(reopened.get(PrefKey::PreferredLanguage), Some(PrefValue::from("de")));
    }
}
