//! News-list coordinator.
//!
//! A [`NewsFeed`] owns one driver task that follows the preferred country,
//! the preferred language and the selected category. Any change to that
//! triple supersedes the fetch in flight and issues a newly routed one. A
//! submitted search supersedes it the same way.
//!
//! Results are published on a `watch` channel as whole-list replacements.
//! Only the newest fetch may publish: superseded tasks are aborted, and a
//! generation check under the channel lock catches one that had already
//! finished its request.

use crate::models::{Article, Category};
use crate::news::{NewsQuery, NewsSource, route};
use crate::settings::SettingsRepository;
use futures::StreamExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument};

/// Aborts the wrapped task when dropped.
struct AbortOnDrop(JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Handle to a running news-list coordinator.
///
/// Dropping the handle stops the driver and any fetch in flight.
pub struct NewsFeed {
    category_tx: watch::Sender<Category>,
    search_tx: mpsc::UnboundedSender<String>,
    articles_rx: watch::Receiver<Vec<Article>>,
    driver: AbortOnDrop,
}

impl NewsFeed {
    /// Start following `settings` and fetch from `source`.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start(source: Arc<dyn NewsSource>, settings: SettingsRepository) -> Self {
        Self::start_with_category(source, settings, Category::default())
    }

    /// Like [`NewsFeed::start`], but the first fetch already uses `category`.
    pub fn start_with_category(
        source: Arc<dyn NewsSource>,
        settings: SettingsRepository,
        category: Category,
    ) -> Self {
        let (category_tx, category_rx) = watch::channel(category);
        let (search_tx, search_rx) = mpsc::unbounded_channel();
        let (articles_tx, articles_rx) = watch::channel(Vec::new());

        let driver = Driver {
            source,
            settings,
            articles_tx: Arc::new(articles_tx),
            latest: Arc::new(AtomicU64::new(0)),
            inflight: None,
        };
        let handle = tokio::spawn(driver.run(category_rx, search_rx));

        Self {
            category_tx,
            search_tx,
            articles_rx,
            driver: AbortOnDrop(handle),
        }
    }

    /// Switch the headline category. Selecting the current one is a no-op.
    pub fn select_category(&self, category: Category) {
        self.category_tx.send_if_modified(|current| {
            let changed = *current != category;
            *current = category;
            changed
        });
    }

    /// The category the feed currently fetches for.
    pub fn selected_category(&self) -> Category {
        *self.category_tx.borrow()
    }

    /// Run a keyword search in the current preferred language.
    pub fn search(&self, query: impl Into<String>) {
        let query = query.into();
        if self.search_tx.send(query).is_err() {
            error!("News feed driver is gone; search dropped");
        }
    }

    /// The published article list. Starts empty until the first fetch lands.
    pub fn articles(&self) -> watch::Receiver<Vec<Article>> {
        self.articles_rx.clone()
    }

    /// Stop the driver and abandon any fetch in flight.
    pub fn shutdown(self) {
        drop(self);
    }

    /// `false` once the driver task has exited.
    pub fn is_running(&self) -> bool {
        !self.driver.0.is_finished()
    }
}

struct Driver {
    source: Arc<dyn NewsSource>,
    settings: SettingsRepository,
    articles_tx: Arc<watch::Sender<Vec<Article>>>,
    latest: Arc<AtomicU64>,
    inflight: Option<AbortOnDrop>,
}

impl Driver {
    async fn run(
        mut self,
        mut category_rx: watch::Receiver<Category>,
        mut searches: mpsc::UnboundedReceiver<String>,
    ) {
        let mut countries = self.settings.preferred_country().fuse();
        let mut languages = self.settings.preferred_language().fuse();

        let (Some(mut country), Some(mut language)) = (countries.next().await, languages.next().await)
        else {
            return;
        };
        let mut category = *category_rx.borrow_and_update();
        self.launch(route(&country, &language, category));

        loop {
            let query = tokio::select! {
                Some(next) = countries.next() => {
                    if next == country {
                        continue;
                    }
                    country = next;
                    route(&country, &language, category)
                }
                Some(next) = languages.next() => {
                    if next == language {
                        continue;
                    }
                    language = next;
                    route(&country, &language, category)
                }
                changed = category_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    let next = *category_rx.borrow_and_update();
                    if next == category {
                        continue;
                    }
                    category = next;
                    route(&country, &language, category)
                }
                Some(query) = searches.recv() => NewsQuery::Everything {
                    query,
                    language: self.settings.language(),
                },
                else => break,
            };
            self.launch(query);
        }
        debug!("News feed driver stopped");
    }

    fn launch(&mut self, query: NewsQuery) {
        // Abort first so the superseded task cannot publish after this point.
        drop(self.inflight.take());
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        let task = tokio::spawn(fetch_and_publish(
            Arc::clone(&self.source),
            query,
            generation,
            Arc::clone(&self.latest),
            Arc::clone(&self.articles_tx),
        ));
        self.inflight = Some(AbortOnDrop(task));
    }
}

#[instrument(level = "info", skip(source, latest, articles_tx))]
async fn fetch_and_publish(
    source: Arc<dyn NewsSource>,
    query: NewsQuery,
    generation: u64,
    latest: Arc<AtomicU64>,
    articles_tx: Arc<watch::Sender<Vec<Article>>>,
) {
    let articles = match source.fetch(&query).await {
        Ok(articles) => articles,
        Err(e) => {
            error!(error = %e, "Failed to fetch articles; publishing empty list");
            Vec::new()
        }
    };

    let count = articles.len();
    let published = articles_tx.send_if_modified(|current| {
        if latest.load(Ordering::SeqCst) != generation {
            return false;
        }
        *current = articles;
        true
    });
    if published {
        info!(count, "Published articles");
    } else {
        debug!("Discarded superseded result");
    }
}
