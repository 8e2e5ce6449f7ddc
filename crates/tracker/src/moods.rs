use std::{
    collections::BTreeMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use api_types::mood::{MoodNew, MoodValue, MoodView};
use tokio::sync::watch;

use crate::{auth::Subscription, context::TrackerContext};

const PATH: &str = "moods";

/// One mood per day, keyed by `YYYY-MM-DD`.
///
/// Loads like the other collections, but [`MoodCollection::set_mood`]
/// applies the server response directly and does not reload.
pub struct MoodCollection {
    shared: Arc<MoodShared>,
    _subscription: Subscription,
}

struct MoodShared {
    ctx: TrackerContext,
    cache: watch::Sender<BTreeMap<String, MoodValue>>,
    loading: AtomicBool,
}

impl MoodCollection {
    pub async fn new(ctx: TrackerContext) -> Self {
        let (cache, _rx) = watch::channel(BTreeMap::new());
        let shared = Arc::new(MoodShared {
            ctx,
            cache,
            loading: AtomicBool::new(false),
        });

        let handler_shared = Arc::clone(&shared);
        let subscription = shared.ctx.auth.subscribe(move |authenticated| {
            let shared = Arc::clone(&handler_shared);
            async move {
                tracing::debug!(authenticated, "auth changed, reloading moods");
                shared.fetch_all().await;
            }
        });

        shared.fetch_all().await;
        Self {
            shared,
            _subscription: subscription,
        }
    }

    pub async fn fetch_all(&self) {
        self.shared.fetch_all().await;
    }

    pub fn get_mood(&self, date: &str) -> Option<MoodValue> {
        self.shared.cache.borrow().get(date).cloned()
    }

    pub fn moods(&self) -> BTreeMap<String, MoodValue> {
        self.shared.cache.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BTreeMap<String, MoodValue>> {
        self.shared.cache.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.loading.load(Ordering::SeqCst)
    }

    pub async fn set_mood(&self, date: &str, value: impl Into<MoodValue>) {
        let shared = &self.shared;
        if !shared.ctx.require_auth("set your mood") {
            return;
        }
        let body = MoodNew {
            date: date.to_string(),
            value: value.into(),
        };
        match shared.ctx.api.create::<_, MoodView>(PATH, &body).await {
            Ok(saved) => {
                shared.cache.send_modify(|moods| {
                    moods.insert(date.to_string(), saved.value);
                });
                shared.ctx.notifier.success("Mood saved!");
            }
            Err(err) => {
                tracing::error!("failed to set mood: {err}");
                shared.ctx.notifier.error("Failed to set mood.");
            }
        }
    }
}

impl MoodShared {
    async fn fetch_all(&self) {
        self.loading.store(true, Ordering::SeqCst);
        if !self.ctx.auth.is_authenticated() {
            self.cache.send_if_modified(|moods| {
                let had_moods = !moods.is_empty();
                moods.clear();
                had_moods
            });
            self.loading.store(false, Ordering::SeqCst);
            return;
        }

        match self.ctx.api.list::<MoodView>(PATH).await {
            Ok(items) => {
                // Later entries for the same day win.
                let moods: BTreeMap<_, _> = items
                    .into_iter()
                    .map(|mood| (mood.date, mood.value))
                    .collect();
                tracing::debug!("fetched {} moods", moods.len());
                self.cache.send_replace(moods);
            }
            Err(err) => tracing::error!("failed to fetch moods: {err}"),
        }
        self.loading.store(false, Ordering::SeqCst);
    }
}
