//! Remote-synced collections.
//!
//! A [`RemoteCollection`] mirrors one backend collection into a reactive
//! in-memory cache:
//!
//! - the cache is fully replaced by every [`fetch_all`];
//! - it is cleared when the session is not authenticated;
//! - it is reloaded on every login/logout transition;
//! - every successful mutation patches it and is then followed by a full
//!   [`fetch_all`] before the call returns.
//!
//! Operations never return errors: failures are logged and, for mutations,
//! surfaced through the [`Notifier`].
//!
//!  [`fetch_all`]: RemoteCollection::fetch_all
//!  [`Notifier`]: crate::toast::Notifier
use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use api_types::RecordIds;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::watch;

use crate::{api::ApiError, auth::Subscription, context::TrackerContext};

/// Describes one backend collection.
pub trait Resource: Send + Sync + 'static {
    /// Path segment under the API base URL.
    const PATH: &'static str;
    const SINGULAR: &'static str;
    const PLURAL: &'static str;

    /// Record as sent by the backend.
    type Wire: DeserializeOwned + Send;
    /// Record as held in the cache.
    type Record: Clone + Send + Sync + 'static;
    /// Body of `POST /{PATH}`.
    type New: Serialize + Send + Sync;
    /// Body of `PUT /{PATH}/{id}`.
    type Patch: Serialize + Send + Sync;

    fn from_wire(wire: Self::Wire) -> Self::Record;

    fn ids(record: &Self::Record) -> &RecordIds;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mutation {
    Add,
    Edit,
    Delete,
}

impl Mutation {
    fn verb(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }

    fn past(self) -> &'static str {
        match self {
            Self::Add => "added",
            Self::Edit => "updated",
            Self::Delete => "deleted",
        }
    }
}

pub struct RemoteCollection<R: Resource> {
    pub(crate) shared: Arc<Shared<R>>,
    _subscription: Subscription,
}

pub(crate) struct Shared<R: Resource> {
    pub(crate) ctx: TrackerContext,
    pub(crate) cache: watch::Sender<Vec<R::Record>>,
    loading: AtomicBool,
}

impl<R: Resource> RemoteCollection<R> {
    /// Builds the collection, subscribes it to auth transitions and performs
    /// the initial load.
    pub async fn new(ctx: TrackerContext) -> Self {
        let (cache, _rx) = watch::channel(Vec::new());
        let shared = Arc::new(Shared {
            ctx,
            cache,
            loading: AtomicBool::new(false),
        });

        let handler_shared = Arc::clone(&shared);
        let subscription = shared.ctx.auth.subscribe(move |authenticated| {
            let shared = Arc::clone(&handler_shared);
            async move {
                tracing::debug!(authenticated, "auth changed, reloading {}", R::PLURAL);
                shared.fetch_all().await;
            }
        });

        shared.fetch_all().await;
        Self {
            shared,
            _subscription: subscription,
        }
    }

    /// Replaces the cache with the backend state, or clears it when logged
    /// out. On failure the cache keeps its previous content.
    pub async fn fetch_all(&self) {
        self.shared.fetch_all().await;
    }

    pub async fn add(&self, new: impl Into<R::New>) {
        let shared = &self.shared;
        if !shared.require_auth(Mutation::Add) {
            return;
        }
        let new = new.into();
        let call = shared.ctx.api.create::<_, R::Wire>(R::PATH, &new);
        shared
            .commit(Mutation::Add, call, |records, created| {
                records.push(R::from_wire(created));
            })
            .await;
    }

    /// Sends `patch` for the record addressed by `id` and swaps the cached
    /// copy (matched on either identifier) for the server response.
    pub async fn update(&self, id: &str, patch: impl Into<R::Patch>) {
        let shared = &self.shared;
        if !shared.require_auth(Mutation::Edit) {
            return;
        }
        let patch = patch.into();
        let call = shared.ctx.api.update::<_, R::Wire>(R::PATH, id, &patch);
        shared
            .commit(Mutation::Edit, call, |records, updated| {
                if let Some(slot) = records.iter_mut().find(|r| R::ids(r).matches(id)) {
                    *slot = R::from_wire(updated);
                }
            })
            .await;
    }

    /// Deletes `id` on the backend and drops every cached record carrying it
    /// in either identifier field.
    pub async fn remove(&self, id: &str) {
        let shared = &self.shared;
        if !shared.require_auth(Mutation::Delete) {
            return;
        }
        let call = shared.ctx.api.delete(R::PATH, id);
        shared
            .commit(Mutation::Delete, call, |records, ()| {
                records.retain(|r| !R::ids(r).matches(id));
            })
            .await;
    }

    pub fn records(&self) -> Vec<R::Record> {
        self.shared.cache.borrow().clone()
    }

    pub fn find(&self, id: &str) -> Option<R::Record> {
        self.shared
            .cache
            .borrow()
            .iter()
            .find(|r| R::ids(r).matches(id))
            .cloned()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<R::Record>> {
        self.shared.cache.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.loading.load(Ordering::SeqCst)
    }

    pub(crate) fn filtered<F>(&self, predicate: F) -> Vec<R::Record>
    where
        F: Fn(&R::Record) -> bool,
    {
        self.shared
            .cache
            .borrow()
            .iter()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }
}

impl<R: Resource> Shared<R> {
    fn require_auth(&self, mutation: Mutation) -> bool {
        self.ctx
            .require_auth(&format!("{} {}", mutation.verb(), R::PLURAL))
    }

    async fn fetch_all(&self) {
        self.loading.store(true, Ordering::SeqCst);
        if !self.ctx.auth.is_authenticated() {
            self.cache.send_if_modified(|records| {
                let had_records = !records.is_empty();
                records.clear();
                had_records
            });
            self.loading.store(false, Ordering::SeqCst);
            return;
        }

        match self.ctx.api.list::<R::Wire>(R::PATH).await {
            Ok(items) => {
                let records: Vec<_> = items.into_iter().map(R::from_wire).collect();
                tracing::debug!("fetched {} {}", records.len(), R::PLURAL);
                self.cache.send_replace(records);
            }
            Err(err) => tracing::error!("failed to fetch {}: {err}", R::PLURAL),
        }
        self.loading.store(false, Ordering::SeqCst);
    }

    /// Runs a backend mutation and reconciles the cache.
    ///
    /// On success `apply` patches the cache, a success toast is shown and
    /// the whole collection is reloaded before returning. On failure the
    /// cache is left as is and an error toast is shown.
    async fn commit<T, Fut, F>(&self, mutation: Mutation, call: Fut, apply: F)
    where
        Fut: Future<Output = Result<T, ApiError>>,
        F: FnOnce(&mut Vec<R::Record>, T),
    {
        match call.await {
            Ok(value) => {
                self.cache.send_modify(|records| apply(records, value));
                self.ctx.notifier.success(format!(
                    "{} {}!",
                    capitalize(R::SINGULAR),
                    mutation.past()
                ));
                self.fetch_all().await;
            }
            Err(err) => {
                tracing::error!("failed to {} {}: {err}", mutation.verb(), R::SINGULAR);
                self.ctx
                    .notifier
                    .error(format!("Failed to {} {}.", mutation.verb(), R::SINGULAR));
            }
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
