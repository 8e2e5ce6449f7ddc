use std::{fmt, future::Future, sync::Arc};

use tokio::{sync::watch, task::JoinHandle};

/// Authentication state shared by the API client and every collection.
///
/// The session only knows whether a bearer token is present. Collections
/// register a handler with [`AuthSession::subscribe`] and get called back on
/// each login/logout transition.
#[derive(Clone)]
pub struct AuthSession {
    token: Arc<watch::Sender<Option<String>>>,
}

impl AuthSession {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { token: Arc::new(tx) }
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        let session = Self::new();
        session.login(token);
        session
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.borrow().is_some()
    }

    pub fn token(&self) -> Option<String> {
        self.token.borrow().clone()
    }

    pub fn login(&self, token: impl Into<String>) {
        let token = token.into();
        tracing::debug!("auth session logged in");
        self.token.send_modify(|current| *current = Some(token));
    }

    pub fn logout(&self) {
        let changed = self.token.send_if_modified(|current| current.take().is_some());
        if changed {
            tracing::debug!("auth session logged out");
        }
    }

    /// Runs `handler` every time the authenticated flag flips.
    ///
    /// Replacing a token while already logged in is not a transition. The
    /// handler runs on a spawned task, so this must be called from within a
    /// Tokio runtime. Dropping the returned [`Subscription`] unregisters it.
    pub fn subscribe<F, Fut>(&self, mut handler: F) -> Subscription
    where
        F: FnMut(bool) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut rx = self.token.subscribe();
        let mut last = rx.borrow_and_update().is_some();
        let task = tokio::spawn(async move {
            while rx.changed().await.is_ok() {
                let now = rx.borrow_and_update().is_some();
                if now == last {
                    continue;
                }
                last = now;
                handler(now).await;
            }
        });
        Subscription { task }
    }
}

impl Default for AuthSession {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

/// Registration handle returned by [`AuthSession::subscribe`].
#[derive(Debug)]
pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}
