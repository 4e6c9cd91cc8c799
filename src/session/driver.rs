//! Session Driver
//!
//! Async glue between the sans-io `TagSession` and a real network and
//! clock: runs the debounce timer with tokio and feeds load results
//! back with their generation, so stale work is discarded by the
//! session itself. Each event method is independent; embedders spawn
//! them from their event loop.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use super::{LoadRequest, TagSession};
use crate::tags::{Intent, TagRequest, TagResponse};
use crate::types::Result;

/// Network dependency of the driver; the HTTP client in production,
/// a canned responder in tests.
#[async_trait]
pub trait TagFetcher: Send + Sync {
    async fn fetch(&self, request: &TagRequest) -> Result<TagResponse>;
}

/// Drives a shared `TagSession` with real timers and fetches
pub struct SessionDriver<F: TagFetcher> {
    session: Arc<Mutex<TagSession>>,
    fetcher: Arc<F>,
    debounce: Duration,
}

// Manual impl: the derive would require F: Clone, but only the Arcs
// are cloned
impl<F: TagFetcher> Clone for SessionDriver<F> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            fetcher: Arc::clone(&self.fetcher),
            debounce: self.debounce,
        }
    }
}

impl<F: TagFetcher> SessionDriver<F> {
    pub fn new(session: TagSession, fetcher: Arc<F>, debounce: Duration) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
            fetcher,
            debounce,
        }
    }

    pub fn session(&self) -> Arc<Mutex<TagSession>> {
        Arc::clone(&self.session)
    }

    /// Handle a topic keystroke: debounce, then load if this keystroke
    /// is still the latest when the window elapses.
    pub async fn type_topic(&self, topic: &str) {
        let ticket = self.session.lock().await.topic_input(topic);
        let Some(ticket) = ticket else { return };

        tokio::time::sleep(self.debounce).await;

        let load = self.session.lock().await.debounce_fired(ticket);
        if let Some(load) = load {
            self.run_load(load).await;
        }
    }

    /// Handle an intent selection; loads immediately when the topic is
    /// already valid.
    pub async fn choose_intent(&self, intent: Intent) {
        let load = self.session.lock().await.set_intent(intent);
        if let Some(load) = load {
            self.run_load(load).await;
        }
    }

    /// Toggle a tag; the first selection kicks off the follow-up fetch.
    pub async fn toggle_tag(&self, id: u64) {
        let load = self.session.lock().await.toggle_tag(id);
        if let Some(load) = load {
            self.run_load(load).await;
        }
    }

    async fn run_load(&self, load: LoadRequest) {
        let stage = load.request.stage;
        match self.fetcher.fetch(&load.request).await {
            Ok(response) => {
                self.session
                    .lock()
                    .await
                    .apply_response(load.generation, stage, &response);
            }
            Err(e) => {
                debug!("tag load failed: {}", e);
                self.session.lock().await.load_failed(load.generation);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use crate::session::SessionPhase;
    use crate::tags::{Persona, TagCategory, TagGroups};
    use crate::types::LoomError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct MockFetcher {
        fail: bool,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TagFetcher for MockFetcher {
        async fn fetch(&self, _request: &TagRequest) -> Result<TagResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LoomError::Server("connection refused".to_string()));
            }
            let mut groups = TagGroups::new();
            groups.insert(
                TagCategory::Task,
                vec![
                    "Explain Key Concepts Simply".to_string(),
                    "Use Bullet Point Lists".to_string(),
                    "Think Step By Step".to_string(),
                ],
            );
            Ok(TagResponse::generated(groups))
        }
    }

    fn driver(fail: bool) -> (SessionDriver<MockFetcher>, Arc<MockFetcher>) {
        let fetcher = Arc::new(MockFetcher {
            fail,
            calls: AtomicUsize::new(0),
        });
        let session = TagSession::new(Persona::Student, &SessionConfig::default());
        (
            SessionDriver::new(session, Arc::clone(&fetcher), Duration::from_millis(500)),
            fetcher,
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounced_load_populates_session() {
        let (driver, fetcher) = driver(false);

        driver.choose_intent(Intent::Learn).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);

        driver.type_topic("Photosynthesis").await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            driver.session().lock().await.phase(),
            SessionPhase::Loaded
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_topic_skips_network() {
        let (driver, fetcher) = driver(false);

        driver.choose_intent(Intent::Learn).await;
        driver.type_topic("abc").await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            driver.session().lock().await.phase(),
            SessionPhase::TopicTooShort
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_keystroke_never_loads() {
        let (driver, fetcher) = driver(false);
        driver.choose_intent(Intent::Learn).await;

        // Second keystroke lands inside the first debounce window
        let first = driver.clone();
        let handle = tokio::spawn(async move { first.type_topic("Photosynth").await });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = driver.clone();
        let handle2 = tokio::spawn(async move { second.type_topic("Photosynthesis").await });

        handle.await.unwrap();
        handle2.await.unwrap();

        // Only the last keystroke reached the network
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        assert_eq!(
            driver.session().lock().await.topic(),
            "Photosynthesis"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_falls_back() {
        let (driver, _) = driver(true);

        driver.type_topic("Photosynthesis").await;
        driver.choose_intent(Intent::Learn).await;
        assert_eq!(
            driver.session().lock().await.phase(),
            SessionPhase::Fallback
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_toggle_fetches_follow_up() {
        let (driver, fetcher) = driver(false);

        driver.choose_intent(Intent::Learn).await;
        driver.type_topic("Photosynthesis").await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);

        let id = {
            let session = driver.session();
            let guard = session.lock().await;
            guard.visible_tags()[0].id
        };
        driver.toggle_tag(id).await;
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
