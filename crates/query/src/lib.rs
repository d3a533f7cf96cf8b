//! Tagged query cache
//!
//! Caches async query results by key, shares one request between concurrent
//! callers of the same key, and drops freshness for every entry carrying a
//! tag when a mutation on that entity type succeeds.
//!
//! # Features
//!
//! - `query`: cached read with in-flight deduplication
//! - `subscribe`: watch an entry; subscribed entries refetch after invalidation
//! - `mutate`: run a write and invalidate tags on success
//! - `refetch`, `state`, `clear`

mod key;
mod state;

pub use key::{QueryKey, Tag};
pub use state::{QueryState, QueryStatus};

use futures_util::future::{BoxFuture, FutureExt, Shared};
use log::{debug, trace, warn};
use std::collections::hash_map::{self, HashMap};
use std::error::Error as StdError;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex};

/// Query outcome handed to every caller; the error is shared between them.
pub type SharedResult<V, E> = Result<V, Arc<E>>;

/// Produces a fresh request for an entry. Kept so invalidation can refetch.
pub type Fetcher<V, E> = Arc<dyn Fn() -> BoxFuture<'static, Result<V, E>> + Send + Sync>;

type InFlight<V, E> = Shared<BoxFuture<'static, SharedResult<V, E>>>;

/// Wrap an async closure as a [`Fetcher`]
pub fn fetcher<V, E, F, Fut>(f: F) -> Fetcher<V, E>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

struct Entry<V, E> {
    tags: Vec<Tag>,
    fetcher: Fetcher<V, E>,
    state: watch::Sender<QueryState<V, E>>,
    in_flight: Option<(u64, InFlight<V, E>)>,
    // Bumped on every invalidation; a request started under an older
    // generation lands stale.
    generation: u64,
    stale: bool,
}

impl<V: Clone, E> Entry<V, E> {
    fn new(tags: Vec<Tag>, fetcher: Fetcher<V, E>) -> Self {
        let (state, _) = watch::channel(QueryState::uninitialized());
        Self {
            tags,
            fetcher,
            state,
            in_flight: None,
            generation: 0,
            stale: false,
        }
    }

    fn fresh_data(&self) -> Option<V> {
        let state = self.state.borrow();
        if state.is_success() && !self.stale {
            state.data.clone()
        } else {
            None
        }
    }

    fn is_subscribed(&self) -> bool {
        self.state.receiver_count() > 0
    }

    fn has_tag(&self, tags: &[Tag]) -> bool {
        self.tags.iter().any(|tag| tags.contains(tag))
    }
}

/// Keyed cache of query results
pub struct QueryCache<V, E> {
    entries: Arc<Mutex<HashMap<QueryKey, Entry<V, E>>>>,
    next_fetch: Arc<AtomicU64>,
}

impl<V, E> Clone for QueryCache<V, E> {
    fn clone(&self) -> Self {
        Self {
            entries: Arc::clone(&self.entries),
            next_fetch: Arc::clone(&self.next_fetch),
        }
    }
}

impl<V, E> Default for QueryCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: StdError + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<V, E> QueryCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: StdError + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
            next_fetch: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Return fresh cached data for `key`, or wait for the (possibly shared) request.
    pub async fn query(
        &self,
        key: QueryKey,
        tags: &[Tag],
        fetcher: Fetcher<V, E>,
    ) -> SharedResult<V, E> {
        let request = {
            let mut entries = self.entries.lock().await;
            let entry = register(&mut entries, &key, tags, fetcher);
            if let Some(data) = entry.fresh_data() {
                trace!("Cache hit for {}", key);
                return Ok(data);
            }
            self.ensure_fetch(&key, entry)
        };
        request.await
    }

    /// Watch `key`, starting a request when there is no fresh data yet.
    pub async fn subscribe(
        &self,
        key: QueryKey,
        tags: &[Tag],
        fetcher: Fetcher<V, E>,
    ) -> QuerySubscription<V, E> {
        let mut entries = self.entries.lock().await;
        let entry = register(&mut entries, &key, tags, fetcher);
        let receiver = entry.state.subscribe();
        if entry.fresh_data().is_none() {
            let _ = self.ensure_fetch(&key, entry);
        }
        QuerySubscription { key, receiver }
    }

    /// Run `mutation`; on success call `on_success` and mark every entry tagged
    /// with one of `invalidates` stale.
    ///
    /// The write and its follow-up run on a spawned task, so they complete even
    /// when the caller stops waiting.
    pub async fn mutate<R, F, S>(
        &self,
        invalidates: &[Tag],
        mutation: F,
        on_success: S,
    ) -> Result<R, E>
    where
        R: Send + 'static,
        F: Future<Output = Result<R, E>> + Send + 'static,
        S: FnOnce(&R) + Send + 'static,
    {
        let cache = self.clone();
        let invalidates = invalidates.to_vec();
        let task = tokio::spawn(async move {
            match mutation.await {
                Ok(value) => {
                    on_success(&value);
                    cache.invalidate_tags(&invalidates).await;
                    Ok(value)
                }
                Err(err) => {
                    warn!("Mutation failed, nothing invalidated: {}", err);
                    Err(err)
                }
            }
        });

        // The task is never aborted, so a join error carries a panic.
        match task.await {
            Ok(result) => result,
            Err(err) => std::panic::resume_unwind(err.into_panic()),
        }
    }

    /// Mark every entry carrying one of `tags` stale and refetch the subscribed ones.
    pub async fn invalidate_tags(&self, tags: &[Tag]) {
        let mut entries = self.entries.lock().await;
        for (key, entry) in entries.iter_mut().filter(|(_, entry)| entry.has_tag(tags)) {
            entry.generation += 1;
            entry.stale = true;
            if entry.is_subscribed() {
                debug!("Invalidated {}, refetching in background", key);
                let _ = self.ensure_fetch(key, entry);
            } else {
                debug!("Invalidated {}", key);
            }
        }
    }

    /// Force a request for `key`, joining one already in flight.
    ///
    /// Returns `None` when nothing was ever queried under `key`.
    pub async fn refetch(&self, key: &QueryKey) -> Option<SharedResult<V, E>> {
        let request = {
            let mut entries = self.entries.lock().await;
            let entry = entries.get_mut(key)?;
            self.ensure_fetch(key, entry)
        };
        Some(request.await)
    }

    pub async fn state(&self, key: &QueryKey) -> Option<QueryState<V, E>> {
        let entries = self.entries.lock().await;
        entries.get(key).map(|entry| entry.state.borrow().clone())
    }

    /// Drop every entry. Subscribers see their channel close; requests still
    /// in flight finish but their results are discarded.
    pub async fn clear(&self) {
        let mut entries = self.entries.lock().await;
        debug!("Tearing down {} cache entries", entries.len());
        entries.clear();
    }

    fn ensure_fetch(&self, key: &QueryKey, entry: &mut Entry<V, E>) -> InFlight<V, E> {
        if let Some((_, request)) = &entry.in_flight {
            trace!("Joining in-flight request for {}", key);
            return request.clone();
        }

        let fetch_id = self.next_fetch.fetch_add(1, Ordering::SeqCst);
        let generation = entry.generation;
        let fetch = (entry.fetcher)();
        let cache = self.clone();
        let settle_key = key.clone();

        let request = async move {
            let result = fetch.await.map_err(Arc::new);
            cache.settle(&settle_key, fetch_id, generation, &result).await;
            result
        }
        .boxed()
        .shared();

        entry.state.send_modify(|state| state.status = QueryStatus::Loading);
        entry.in_flight = Some((fetch_id, request.clone()));

        // Runs to completion even if every caller goes away.
        tokio::spawn(request.clone());
        request
    }

    async fn settle(
        &self,
        key: &QueryKey,
        fetch_id: u64,
        generation: u64,
        result: &SharedResult<V, E>,
    ) {
        let mut entries = self.entries.lock().await;
        let Some(entry) = entries.get_mut(key) else {
            trace!("Entry {} was torn down, dropping result", key);
            return;
        };
        if !matches!(entry.in_flight, Some((id, _)) if id == fetch_id) {
            trace!("Result for {} belongs to a replaced request", key);
            return;
        }
        entry.in_flight = None;

        match result {
            Ok(data) => {
                entry.stale = entry.generation != generation;
                entry.state.send_modify(|state| {
                    state.status = QueryStatus::Success;
                    state.data = Some(data.clone());
                    state.error = None;
                });
                if entry.stale && entry.is_subscribed() {
                    debug!("{} was invalidated mid-flight, refetching", key);
                    let _ = self.ensure_fetch(key, entry);
                }
            }
            Err(err) => {
                warn!("Query {} failed: {}", key, err);
                entry.state.send_modify(|state| {
                    state.status = QueryStatus::Error;
                    state.error = Some(Arc::clone(err));
                });
            }
        }
    }
}

fn register<'a, V: Clone, E>(
    entries: &'a mut HashMap<QueryKey, Entry<V, E>>,
    key: &QueryKey,
    tags: &[Tag],
    fetcher: Fetcher<V, E>,
) -> &'a mut Entry<V, E> {
    match entries.entry(key.clone()) {
        hash_map::Entry::Occupied(occupied) => {
            let entry = occupied.into_mut();
            entry.fetcher = fetcher;
            entry
        }
        hash_map::Entry::Vacant(vacant) => vacant.insert(Entry::new(tags.to_vec(), fetcher)),
    }
}

/// Live view of one cache entry
pub struct QuerySubscription<V, E> {
    key: QueryKey,
    receiver: watch::Receiver<QueryState<V, E>>,
}

impl<V: Clone, E> QuerySubscription<V, E> {
    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Current state without waiting
    pub fn state(&self) -> QueryState<V, E> {
        self.receiver.borrow().clone()
    }

    /// Wait for the next state change. Returns `false` once the entry is torn down.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }

    /// Wait until the entry is no longer loading and return that state.
    pub async fn settled(&mut self) -> QueryState<V, E> {
        loop {
            let state = self.receiver.borrow_and_update().clone();
            if state.is_settled() || self.receiver.changed().await.is_err() {
                return state;
            }
        }
    }
}
