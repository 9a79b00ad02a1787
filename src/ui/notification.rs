//! Transient notifications: one at a time, optionally auto-dismissed.
//!
//! Showing a notification aborts the previous auto-close timer before a new
//! one is armed. Each notification gets an id and a firing timer only
//! dismisses the notification it was armed for.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::AbortHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Warning,
    Error,
    Info,
}

impl NotificationKind {
    #[must_use]
    pub fn default_title(self) -> &'static str {
        match self {
            Self::Success => "Éxito",
            Self::Warning => "Advertencia",
            Self::Error => "Error",
            Self::Info => "Información",
        }
    }

    #[must_use]
    pub fn default_delay(self) -> Duration {
        match self {
            Self::Success => Duration::from_millis(4000),
            Self::Warning => Duration::from_millis(6000),
            Self::Error => Duration::from_millis(7000),
            Self::Info => Duration::from_millis(5000),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub dismissible: bool,
    /// `None` keeps the notification until it is hidden or replaced.
    pub auto_close: Option<Duration>,
}

impl Notification {
    /// A notification with the kind's default title and auto-close delay.
    #[must_use]
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            id: 0,
            kind,
            title: kind.default_title().to_owned(),
            message: message.into(),
            dismissible: true,
            auto_close: Some(kind.default_delay()),
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn persistent(mut self) -> Self {
        self.auto_close = None;
        self
    }
}

struct Inner {
    current: watch::Sender<Option<Notification>>,
    timer: Mutex<Option<AbortHandle>>,
    next_id: AtomicU64,
}

impl Inner {
    fn cancel_timer(&self) {
        if let Some(handle) = self.timer.lock().unwrap_or_else(PoisonError::into_inner).take() {
            handle.abort();
        }
    }

    fn dismiss_if_current(&self, id: u64) {
        self.current.send_if_modified(|current| {
            if current.as_ref().is_some_and(|n| n.id == id) {
                *current = None;
                true
            } else {
                false
            }
        });
    }
}

#[derive(Clone)]
pub struct NotificationService {
    inner: Arc<Inner>,
}

impl Default for NotificationService {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationService {
    #[must_use]
    pub fn new() -> Self {
        let (current, _rx) = watch::channel(None);
        Self { inner: Arc::new(Inner { current, timer: Mutex::new(None), next_id: AtomicU64::new(1) }) }
    }

    /// Replace the current notification. Returns the id assigned to it.
    pub fn show(&self, mut notification: Notification) -> u64 {
        self.inner.cancel_timer();
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        notification.id = id;
        let delay = notification.auto_close;
        tracing::debug!(kind = ?notification.kind, message = %notification.message, "notification shown");
        self.inner.current.send_replace(Some(notification));

        if let Some(delay) = delay {
            self.arm_auto_close(id, delay);
        }
        id
    }

    pub fn show_success(&self, message: impl Into<String>) -> u64 {
        self.show(Notification::new(NotificationKind::Success, message))
    }

    pub fn show_warning(&self, message: impl Into<String>) -> u64 {
        self.show(Notification::new(NotificationKind::Warning, message))
    }

    pub fn show_error(&self, message: impl Into<String>) -> u64 {
        self.show(Notification::new(NotificationKind::Error, message))
    }

    pub fn show_info(&self, message: impl Into<String>) -> u64 {
        self.show(Notification::new(NotificationKind::Info, message))
    }

    pub fn hide(&self) {
        self.inner.cancel_timer();
        self.inner.current.send_replace(None);
    }

    #[must_use]
    pub fn current(&self) -> Option<Notification> {
        self.inner.current.borrow().clone()
    }

    #[must_use]
    pub fn has_notification(&self) -> bool {
        self.inner.current.borrow().is_some()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.current.subscribe()
    }

    fn arm_auto_close(&self, id: u64, delay: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let inner = Arc::clone(&self.inner);
        let task = runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            inner.dismiss_if_current(id);
        });
        *self.inner.timer.lock().unwrap_or_else(PoisonError::into_inner) = Some(task.abort_handle());
    }
}

#[cfg(test)]
#[path = "notification_test.rs"]
mod tests;
