use std::{
    sync::{
        Arc, Mutex,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle};

pub const DEFAULT_TOAST_DURATION: Duration = Duration::from_millis(2500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

impl ToastLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    seq: u64,
}

/// The single user-facing status line.
///
/// Built once and cloned into every collection. A new toast replaces the
/// visible one and restarts the dismissal timer.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

struct NotifierInner {
    current: Arc<watch::Sender<Option<ToastState>>>,
    dismiss: Mutex<Option<JoinHandle<()>>>,
    seq: AtomicU64,
}

impl Notifier {
    pub fn new() -> Self {
        let (current, _rx) = watch::channel(None);
        Self {
            inner: Arc::new(NotifierInner {
                current: Arc::new(current),
                dismiss: Mutex::new(None),
                seq: AtomicU64::new(0),
            }),
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.display(message, ToastLevel::Success, DEFAULT_TOAST_DURATION);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.display(message, ToastLevel::Error, DEFAULT_TOAST_DURATION);
    }

    /// Shows `message` for `duration`, replacing any visible toast.
    ///
    /// Outside a Tokio runtime the toast stays until replaced or cleared.
    pub fn display(&self, message: impl Into<String>, level: ToastLevel, duration: Duration) {
        let seq = self.inner.seq.fetch_add(1, Ordering::Relaxed) + 1;
        let toast = ToastState {
            message: message.into(),
            level,
            seq,
        };
        tracing::debug!(level = level.as_str(), "toast: {}", toast.message);
        self.inner.current.send_replace(Some(toast));

        let timer = match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let current = Arc::clone(&self.inner.current);
                Some(handle.spawn(async move {
                    tokio::time::sleep(duration).await;
                    current.send_if_modified(|toast| {
                        if toast.as_ref().is_some_and(|toast| toast.seq == seq) {
                            *toast = None;
                            return true;
                        }
                        false
                    });
                }))
            }
            Err(_) => {
                tracing::warn!("no runtime available, toast will not auto-dismiss");
                None
            }
        };

        let previous = match self.inner.dismiss.lock() {
            Ok(mut pending) => std::mem::replace(&mut *pending, timer),
            Err(poisoned) => std::mem::replace(&mut *poisoned.into_inner(), timer),
        };
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub fn clear(&self) {
        self.inner.current.send_replace(None);
    }

    pub fn current(&self) -> Option<ToastState> {
        self.inner.current.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ToastState>> {
        self.inner.current.subscribe()
    }

    /// Number of toasts displayed since the notifier was built.
    pub fn displayed(&self) -> u64 {
        self.inner.seq.load(Ordering::Relaxed)
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("current", &self.current())
            .finish()
    }
}
