//! Per-consumer loading with latest-request-wins semantics.
//!
//! Each consumer (an image view, a list cell) owns one [`FetchCoordinator`].
//! Issuing a new request re-targets the consumer: requests still in flight
//! keep running and still populate the caches, but only the result of the
//! most recent request is shown or passed to a completion.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace};
use url::Url;

use crate::error::{CacheError, Result};
use crate::loader::CacheService;

/// Callback receiving the final asset of a request that was not superseded.
pub type Completion<A> = Box<dyn FnOnce(Option<A>) + Send + 'static>;

// == Request Options ==
#[derive(Debug, Clone)]
pub struct RequestOptions<A> {
    /// Consult and populate the disk tier
    pub storing: bool,
    /// Shown immediately, before any lookup
    pub placeholder: Option<A>,
}

impl<A> Default for RequestOptions<A> {
    fn default() -> Self {
        Self {
            storing: true,
            placeholder: None,
        }
    }
}

impl<A> RequestOptions<A> {
    pub fn memory_only() -> Self {
        Self {
            storing: false,
            ..Self::default()
        }
    }

    pub fn with_placeholder(mut self, placeholder: A) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}

// == Consumer State ==
/// What one consumer last asked for and what it currently shows.
struct ConsumerState<A> {
    pending: Mutex<String>,
    displayed: watch::Sender<Option<A>>,
}

impl<A: Clone> ConsumerState<A> {
    fn pending(&self) -> MutexGuard<'_, String> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Re-targets the consumer and shows the placeholder in one step.
    fn start(&self, key: &str, placeholder: Option<A>) {
        let mut pending = self.pending();
        pending.clear();
        pending.push_str(key);
        if placeholder.is_some() {
            self.displayed.send_replace(placeholder);
        }
    }

    fn show(&self, asset: Option<A>) {
        let _pending = self.pending();
        self.displayed.send_replace(asset);
    }

    /// Shows `asset` if `key` is still the latest request. `None` leaves the
    /// current asset in place.
    fn apply_if_current(&self, key: &str, asset: Option<&A>) -> bool {
        let pending = self.pending();
        if *pending != key {
            return false;
        }
        if let Some(asset) = asset {
            self.displayed.send_replace(Some(asset.clone()));
        }
        true
    }
}

// == Fetch Coordinator ==
/// Loads assets for a single consumer through the shared [`CacheService`].
pub struct FetchCoordinator<A> {
    service: Arc<CacheService<A>>,
    state: Arc<ConsumerState<A>>,
}

impl<A: Clone + Send + Sync + 'static> FetchCoordinator<A> {
    pub fn new(service: Arc<CacheService<A>>) -> Self {
        let (displayed, _) = watch::channel(None);
        Self {
            service,
            state: Arc::new(ConsumerState {
                pending: Mutex::new(String::new()),
                displayed,
            }),
        }
    }

    /// Currently shown asset.
    pub fn displayed(&self) -> Option<A> {
        self.state.displayed.borrow().clone()
    }

    /// Receiver notified every time the shown asset changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<A>> {
        self.state.displayed.subscribe()
    }

    /// Key of the most recent request, empty before the first one.
    pub fn pending_key(&self) -> String {
        self.state.pending().clone()
    }

    /// Starts loading `key` and returns immediately.
    ///
    /// The placeholder, if any, is shown before this returns. The returned
    /// handle resolves to `Err` when the key is not a URL, the remote fetch
    /// fails, or the disk tier reports something other than a miss. A
    /// superseded request resolves `Ok(())` without calling `completion`.
    ///
    /// # Panics
    ///
    /// Panics if called from outside of a Tokio runtime, as the load is
    /// spawned with [`tokio::spawn`].
    pub fn request(
        &self,
        key: impl Into<String>,
        options: RequestOptions<A>,
        completion: Option<Completion<A>>,
    ) -> JoinHandle<Result<()>> {
        let key = key.into();
        let RequestOptions {
            storing,
            placeholder,
        } = options;

        let url = match Url::parse(&key) {
            Ok(url) => url,
            Err(err) => {
                debug!(key, error = %err, "rejecting key that is not a URL");
                if placeholder.is_some() {
                    self.state.show(placeholder);
                }
                return tokio::spawn(async move { Err(CacheError::InvalidKey(key)) });
            }
        };

        self.state.start(&key, placeholder);
        trace!(key, storing, "load started");

        let load = Load {
            service: Arc::clone(&self.service),
            state: Arc::clone(&self.state),
            key,
            url,
        };
        tokio::spawn(async move {
            if storing {
                load.run_storing(completion).await
            } else {
                load.run_memory_only(completion).await
            }
        })
    }
}

// == Load ==
/// One in-flight request.
struct Load<A> {
    service: Arc<CacheService<A>>,
    state: Arc<ConsumerState<A>>,
    key: String,
    url: Url,
}

impl<A: Clone + Send + Sync + 'static> Load<A> {
    async fn run_memory_only(self, completion: Option<Completion<A>>) -> Result<()> {
        if let Some(asset) = self.memory_hit().await {
            self.apply(Some(asset), completion);
            return Ok(());
        }

        let bytes = self
            .service
            .fetcher()
            .fetch_bytes(&self.url)
            .await
            .map_err(|source| self.fetch_failed(source))?;

        let asset = self.decode(&bytes);
        self.service.memory().put(asset.clone(), &self.key).await;
        self.apply(asset, completion);
        Ok(())
    }

    async fn run_storing(self, completion: Option<Completion<A>>) -> Result<()> {
        if let Some(asset) = self.memory_hit().await {
            self.apply(Some(asset), completion);
            return Ok(());
        }

        match self.service.disk().get(&self.key).await {
            Ok(asset) => {
                trace!(key = self.key, "disk hit");
                self.service
                    .memory()
                    .put(Some(asset.clone()), &self.key)
                    .await;
                self.apply(Some(asset), completion);
                return Ok(());
            }
            Err(err) if err.is_miss() => trace!(key = self.key, error = %err, "disk miss"),
            Err(err) => {
                debug!(key = self.key, error = %err, "disk tier lookup failed");
                return Err(err);
            }
        }

        let fetcher = self.service.fetcher();
        let location = fetcher
            .download_to_temp(&self.url)
            .await
            .map_err(|source| self.fetch_failed(source))?;
        let bytes = fetcher.read_bytes(&location).await;
        if let Err(err) = tokio::fs::remove_file(&location).await {
            trace!(path = %location.display(), error = %err, "temporary download not removed");
        }
        let bytes = bytes.map_err(|source| self.fetch_failed(source))?;

        let asset = self.decode(&bytes);
        self.service.memory().put(asset.clone(), &self.key).await;
        let stored = asset.clone();
        self.apply(asset, completion);
        self.service.disk().put(stored, &self.key).await;
        Ok(())
    }

    async fn memory_hit(&self) -> Option<A> {
        let asset = self.service.memory().get(&self.key).await.ok();
        if asset.is_some() {
            trace!(key = self.key, "memory hit");
        }
        asset
    }

    fn decode(&self, bytes: &[u8]) -> Option<A> {
        match self.service.codec().decode(bytes) {
            Ok(asset) => Some(asset),
            Err(err) => {
                debug!(key = self.key, error = %err, "fetched payload did not decode");
                None
            }
        }
    }

    /// Shows the result and runs the completion, unless superseded.
    fn apply(&self, asset: Option<A>, completion: Option<Completion<A>>) {
        if !self.state.apply_if_current(&self.key, asset.as_ref()) {
            debug!(key = self.key, "discarding result of superseded request");
            return;
        }
        if let Some(completion) = completion {
            completion(asset);
        }
    }

    fn fetch_failed(&self, source: anyhow::Error) -> CacheError {
        debug!(key = self.key, error = %source, "remote fetch failed");
        CacheError::RemoteFetch {
            key: self.key.clone(),
            source,
        }
    }
}
